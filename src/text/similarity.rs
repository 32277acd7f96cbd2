/// Edit-distance ratio between two pre-normalized strings.
///
/// Computed as `1 - levenshtein(a, b) / max(len(a), len(b), 1)` over Unicode
/// scalar values. Symmetric, reflexive (`similarity(a, a) == 1.0`) and
/// bounded in [0.0, 1.0].
///
/// # Examples
///
/// ```
/// use crm_resolve::text::similarity;
///
/// assert_eq!(similarity("nextera", "nextera"), 1.0);
/// assert!(similarity("nextra", "nextera") > 0.8);
/// ```
#[must_use]
pub fn similarity(a: &str, b: &str) -> f32 {
    let ratio = strsim::normalized_levenshtein(a, b);
    #[allow(clippy::cast_possible_truncation)]
    let ratio = ratio as f32;
    ratio.clamp(0.0, 1.0)
}

/// Returns true when `similarity(a, b)` is strictly above `floor`.
#[must_use]
pub fn similarity_exceeds(a: &str, b: &str, floor: f32) -> bool {
    similarity(a, b) > floor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reflexive() {
        for s in ["", "a", "nextera", "pierre lefevre"] {
            assert_eq!(similarity(s, s), 1.0);
        }
    }

    #[test]
    fn symmetric() {
        let pairs = [
            ("nextera", "nextra"),
            ("pierre", "pierre dubois"),
            ("", "occurent"),
            ("techcorp", "techcorp international"),
        ];
        for (a, b) in pairs {
            assert_eq!(similarity(a, b), similarity(b, a));
        }
    }

    #[test]
    fn bounded() {
        assert_eq!(similarity("", "abc"), 0.0);
        assert_eq!(similarity("abc", "xyz"), 0.0);
        let s = similarity("nextera", "techcorp");
        assert!((0.0..=1.0).contains(&s));
    }

    #[test]
    fn non_increasing_with_edit_distance() {
        let base = "occurent";
        let one_edit = similarity(base, "occurents");
        let two_edits = similarity(base, "occurentsx");
        let three_edits = similarity(base, "occurentsxy");
        assert!(one_edit >= two_edits);
        assert!(two_edits >= three_edits);
    }

    #[test]
    fn known_ratio() {
        // One deletion over seven characters.
        let s = similarity("nextra", "nextera");
        assert!((s - (1.0 - 1.0 / 7.0)).abs() < 1e-6);
        assert!(similarity_exceeds("nextra", "nextera", 0.8));
        assert!(!similarity_exceeds("nextera", "techcorp international", 0.8));
    }

    #[test]
    fn floor_is_strict_on_the_unrounded_ratio() {
        // 49 edits over 250 characters: 0.804, which a whole-percent
        // comparison would round down to the floor.
        let a = "a".repeat(250);
        let b = format!("{}{}", "a".repeat(201), "b".repeat(49));
        assert!((similarity(&a, &b) - 0.804).abs() < 1e-4);
        assert!(similarity_exceeds(&a, &b, 0.8));

        // Exactly at the floor is not above it.
        let c = format!("{}{}", "a".repeat(200), "b".repeat(50));
        assert!(!similarity_exceeds(&a, &c, 0.8));
    }
}
