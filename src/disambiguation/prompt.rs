use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::confidence::Confidence;
use crate::entity::{EntityKind, RecordId, RepositoryRecord};
use crate::resolve::{MatchedEntity, ScoredCandidate};

/// One selectable record in a prompt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionView {
    /// Record id.
    pub id: RecordId,
    /// Record display name.
    pub name: String,
    /// Match confidence.
    pub confidence: Confidence,
    /// Email of a contact.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Role of a contact.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Company of a contact or opportunity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

impl From<&ScoredCandidate> for OptionView {
    fn from(scored: &ScoredCandidate) -> Self {
        let (email, role) = match &scored.record {
            RepositoryRecord::Contact(c) => (c.email.clone(), c.role.clone()),
            RepositoryRecord::Company(_) | RepositoryRecord::Opportunity(_) => (None, None),
        };
        let company = match &scored.record {
            RepositoryRecord::Company(_) => None,
            other => other.company_name().map(str::to_string),
        };
        Self {
            id: scored.record.id().clone(),
            name: scored.record.display_name().to_string(),
            confidence: scored.confidence,
            email,
            role,
            company,
        }
    }
}

fn detail(entity: &MatchedEntity, key: &str) -> Option<String> {
    match entity.details().get(key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// What a reviewer sees for one entity awaiting validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisambiguationPrompt {
    /// Kind of the pending entity.
    pub kind: EntityKind,
    /// The candidate as written in the notes.
    pub mention: String,
    /// The current top pick.
    pub selected: OptionView,
    /// Runner-ups, indexed as accepted by `Decision::SelectAlternative`.
    pub alternatives: Vec<OptionView>,
}

impl DisambiguationPrompt {
    /// Builds the prompt, or `None` if `entity` is not awaiting validation.
    #[must_use]
    pub fn for_entity(entity: &MatchedEntity) -> Option<Self> {
        if !entity.needs_validation() {
            return None;
        }
        let id = entity.entity_id()?.clone();
        let company = match entity.entity_type() {
            EntityKind::Company => None,
            EntityKind::Contact | EntityKind::Opportunity => detail(entity, "company_name"),
        };
        Some(Self {
            kind: entity.entity_type(),
            mention: entity.mention().to_string(),
            selected: OptionView {
                id,
                name: entity.name().to_string(),
                confidence: entity.confidence(),
                email: detail(entity, "email"),
                role: detail(entity, "role"),
                company,
            },
            alternatives: entity.alternatives().iter().map(OptionView::from).collect(),
        })
    }

    /// Number of records to choose from, the top pick included.
    #[must_use]
    pub fn option_count(&self) -> usize {
        self.alternatives.len() + 1
    }

    /// One-line question for the reviewer.
    #[must_use]
    pub fn headline(&self) -> String {
        let n = self.option_count();
        let company = self.selected.company.as_deref().unwrap_or("unknown company");
        match self.kind {
            EntityKind::Company => format!("Found {n} companies matching \"{}\". Which one?", self.mention),
            EntityKind::Contact => format!(
                "Found {n} contacts named \"{}\" at {company}. Which one?",
                self.mention
            ),
            EntityKind::Opportunity => format!("Found {n} opportunities for {company}. Which one?"),
        }
    }
}

fn percent(confidence: Confidence) -> String {
    format!("{:.0}%", confidence.value() * 100.0)
}

fn write_hints(f: &mut fmt::Formatter<'_>, option: &OptionView, indent: &str) -> fmt::Result {
    if let Some(email) = &option.email {
        writeln!(f, "{indent}Email: {email}")?;
    }
    if let Some(role) = &option.role {
        writeln!(f, "{indent}Role: {role}")?;
    }
    if let Some(company) = &option.company {
        writeln!(f, "{indent}Company: {company}")?;
    }
    Ok(())
}

impl fmt::Display for DisambiguationPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[DISAMBIGUATION] \"{}\"", self.mention)?;
        if let Some(role) = &self.selected.role {
            write!(f, " - {role}")?;
        }
        writeln!(f)?;
        writeln!(f, "{}", self.headline())?;
        writeln!(
            f,
            "  Selected: {} [{}] ({})",
            self.selected.name,
            self.selected.id,
            percent(self.selected.confidence)
        )?;
        write_hints(f, &self.selected, "    ")?;
        for (i, alt) in self.alternatives.iter().enumerate() {
            writeln!(f, "  {i}. {} [{}] ({})", alt.name, alt.id, percent(alt.confidence))?;
            write_hints(f, alt, "     ")?;
        }
        Ok(())
    }
}
