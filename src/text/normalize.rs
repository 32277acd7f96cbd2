use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Canonicalize free text into a comparable key.
///
/// Applies compatibility decomposition, drops combining marks (accents),
/// lowercases, and trims surrounding whitespace. The result is re-decomposed
/// after lowercasing so that case mappings which introduce combining marks
/// (e.g. `İ`) still fold, keeping the function idempotent.
///
/// # Examples
///
/// ```
/// use crm_resolve::text::normalize;
///
/// assert_eq!(normalize("  Lefèvre "), "lefevre");
/// assert_eq!(normalize(""), "");
/// ```
#[must_use]
pub fn normalize(s: &str) -> String {
    let lowered: String = s
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect();

    let folded: String = lowered.nfkd().filter(|c| !is_combining_mark(*c)).collect();
    folded.trim().to_string()
}
