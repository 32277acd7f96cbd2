//! Candidate entities produced by the extraction stage.
//!
//! Candidates are immutable once produced and are read-only to resolution.
//! They are validated before dispatch; invalid ones never reach scoring.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::kind::EntityKind;
use super::stage::OpportunityStage;
use crate::error::ValidationError;
use crate::text::normalize;

/// Upper bound on any free-text candidate field, in characters.
pub const MAX_FIELD_LENGTH: usize = 512;

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
    })
}

fn domain_regex() -> &'static Regex {
    static DOMAIN: OnceLock<Regex> = OnceLock::new();
    DOMAIN.get_or_init(|| {
        Regex::new(r"(?i)^(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,}$")
            .expect("domain pattern is valid")
    })
}

fn check_name(kind: EntityKind, field: &str, value: &str) -> Result<(), ValidationError> {
    if normalize(value).is_empty() {
        return Err(ValidationError::EmptyName { kind });
    }
    check_length(field, value)
}

fn check_length(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.chars().count() > MAX_FIELD_LENGTH {
        return Err(ValidationError::FieldTooLong {
            field: field.to_string(),
            max_length: MAX_FIELD_LENGTH,
        });
    }
    Ok(())
}

fn check_optional(field: &str, value: Option<&str>) -> Result<(), ValidationError> {
    value.map_or(Ok(()), |v| check_length(field, v))
}

/// A company mentioned in the notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateCompany {
    /// Company name as mentioned.
    pub name: String,
    /// Web domain, e.g. `nextera.com`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// Industry label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
}

impl CandidateCompany {
    /// Candidate with only a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domain: None,
            industry: None,
        }
    }

    /// Checks the candidate schema.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_name(EntityKind::Company, "name", &self.name)?;
        check_optional("industry", self.industry.as_deref())?;
        if let Some(domain) = self.domain.as_deref() {
            check_length("domain", domain)?;
            if !domain_regex().is_match(domain.trim()) {
                return Err(ValidationError::InvalidDomain {
                    value: domain.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// A meeting participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateContact {
    /// Contact name as mentioned, possibly partial.
    pub name: String,
    /// Email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Role or title mentioned in the notes. Carried as context only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Company the participant was said to belong to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
}

impl CandidateContact {
    /// Candidate with only a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
            role: None,
            company_name: None,
        }
    }

    /// Sets the company hint.
    #[must_use]
    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company_name = Some(company.into());
        self
    }

    /// Sets the role hint.
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Checks the candidate schema.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_name(EntityKind::Contact, "name", &self.name)?;
        check_optional("role", self.role.as_deref())?;
        check_optional("company_name", self.company_name.as_deref())?;
        if let Some(email) = self.email.as_deref() {
            check_length("email", email)?;
            if !email_regex().is_match(email.trim()) {
                return Err(ValidationError::InvalidEmail {
                    value: email.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// A deal discussed in the notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateOpportunity {
    /// Deal title as mentioned.
    pub title: String,
    /// Stage inferred from the notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<OpportunityStage>,
    /// Company the deal belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    /// Deal amount.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    /// Expected close date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_close_date: Option<DateTime<Utc>>,
    /// Names of the participants involved.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contacts: Vec<String>,
}

impl CandidateOpportunity {
    /// Candidate with only a title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            stage: None,
            company_name: None,
            amount: None,
            expected_close_date: None,
            contacts: Vec::new(),
        }
    }

    /// Sets the stage.
    #[must_use]
    pub fn with_stage(mut self, stage: OpportunityStage) -> Self {
        self.stage = Some(stage);
        self
    }

    /// Sets the owning company.
    #[must_use]
    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company_name = Some(company.into());
        self
    }

    /// Search keywords: the title, then the stage label.
    #[must_use]
    pub fn keywords(&self) -> Vec<String> {
        let mut keywords = Vec::with_capacity(2);
        if !self.title.trim().is_empty() {
            keywords.push(self.title.clone());
        }
        if let Some(stage) = self.stage {
            keywords.push(stage.as_str().to_string());
        }
        keywords
    }

    /// Checks the candidate schema.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_name(EntityKind::Opportunity, "title", &self.title)?;
        check_optional("company_name", self.company_name.as_deref())?;
        if let Some(amount) = self.amount {
            if !amount.is_finite() || amount < 0.0 {
                return Err(ValidationError::InvalidAmount { value: amount });
            }
        }
        for contact in &self.contacts {
            check_length("contacts", contact)?;
        }
        Ok(())
    }
}

/// Structured output of the extraction service for one batch of notes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// When the meeting took place.
    #[serde(default)]
    pub meeting_date: Option<DateTime<Utc>>,
    /// People who attended or were mentioned.
    #[serde(default)]
    pub participants: Vec<CandidateContact>,
    /// Companies mentioned.
    #[serde(default)]
    pub companies: Vec<CandidateCompany>,
    /// Deals mentioned.
    #[serde(default)]
    pub opportunities: Vec<CandidateOpportunity>,
    /// Notable points from the notes.
    #[serde(default)]
    pub key_points: Vec<String>,
    /// Overall sentiment label.
    #[serde(default)]
    pub sentiment: Option<String>,
}

impl ExtractionResult {
    /// Total number of candidate entities across kinds.
    #[must_use]
    pub fn candidate_count(&self) -> usize {
        self.participants.len() + self.companies.len() + self.opportunities.len()
    }

    /// Company context for opportunities that carry none of their own.
    #[must_use]
    pub fn primary_company(&self) -> Option<&str> {
        self.companies.first().map(|c| c.name.as_str())
    }
}

/// Seam for the external extraction service (notes to candidates).
pub trait CandidateExtractor: Send + Sync {
    /// Error reported by the service.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Extracts candidate entities from raw meeting notes.
    fn extract(&self, notes: &str) -> Result<ExtractionResult, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_names_are_rejected() {
        let err = CandidateCompany::new("  ").validate().unwrap_err();
        assert_eq!(
            err,
            ValidationError::EmptyName {
                kind: EntityKind::Company
            }
        );
        assert!(CandidateOpportunity::new("").validate().is_err());
        // Nothing left after accent stripping.
        assert!(CandidateContact::new("\u{0301}").validate().is_err());
    }

    #[test]
    fn email_and_domain_syntax() {
        let mut contact = CandidateContact::new("Sophie Martin");
        contact.email = Some("sophie.martin@occurent.com".to_string());
        assert!(contact.validate().is_ok());
        contact.email = Some("sophie at occurent".to_string());
        assert!(matches!(contact.validate(), Err(ValidationError::InvalidEmail { .. })));

        let mut company = CandidateCompany::new("Occurent Systems");
        company.domain = Some("occurent.com".to_string());
        assert!(company.validate().is_ok());
        company.domain = Some("not a domain".to_string());
        assert!(matches!(company.validate(), Err(ValidationError::InvalidDomain { .. })));
    }

    #[test]
    fn negative_amount_is_rejected() {
        let mut opp = CandidateOpportunity::new("Marketing automation");
        opp.amount = Some(-10.0);
        assert!(matches!(opp.validate(), Err(ValidationError::InvalidAmount { .. })));
    }

    #[test]
    fn overlong_fields_are_rejected() {
        let contact = CandidateContact::new("x".repeat(MAX_FIELD_LENGTH + 1));
        assert!(matches!(contact.validate(), Err(ValidationError::FieldTooLong { .. })));
    }

    #[test]
    fn keywords_are_title_then_stage() {
        let opp = CandidateOpportunity::new("CRM Implementation").with_stage(OpportunityStage::Proposal);
        assert_eq!(opp.keywords(), vec!["CRM Implementation".to_string(), "proposal".to_string()]);
    }

    #[test]
    fn extraction_result_deserializes_with_defaults() {
        let json = r#"{
            "participants": [{"name": "Pierre", "role": "IT Director"}],
            "companies": [{"name": "Nextera"}],
            "opportunities": [{"title": "Marketing automation", "stage": "approach"}]
        }"#;
        let extraction: ExtractionResult = serde_json::from_str(json).unwrap();
        assert_eq!(extraction.candidate_count(), 3);
        assert_eq!(extraction.primary_company(), Some("Nextera"));
        assert_eq!(extraction.opportunities[0].stage, Some(OpportunityStage::Approach));
        assert!(extraction.key_points.is_empty());
    }
}
