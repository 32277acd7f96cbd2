//! Canonical records held by the entity repository.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::kind::EntityKind;
use super::stage::OpportunityStage;

/// Stable repository identifier (e.g. `comp_123`).
///
/// Ids are opaque strings owned by the system of record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Wraps an existing identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Builds a generated id for `kind` from a sequence number.
    #[must_use]
    pub fn generated(kind: EntityKind, seq: u64) -> Self {
        Self(format!("{}_{seq}", kind.id_prefix()))
    }

    /// Borrowed id text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Stored company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    /// Repository id.
    pub id: RecordId,
    /// Company name.
    pub name: String,
    /// Web domain.
    #[serde(default)]
    pub domain: Option<String>,
    /// Industry label.
    #[serde(default)]
    pub industry: Option<String>,
}

/// Stored contact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactRecord {
    /// Repository id.
    pub id: RecordId,
    /// Full name.
    pub name: String,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Job title.
    #[serde(default)]
    pub role: Option<String>,
    /// Employer id.
    #[serde(default)]
    pub company_id: Option<RecordId>,
    /// Denormalized affiliation, used for company-context boosts.
    #[serde(default)]
    pub company_name: Option<String>,
}

/// Stored deal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpportunityRecord {
    /// Repository id.
    pub id: RecordId,
    /// Deal title.
    pub title: String,
    /// Owning company id.
    #[serde(default)]
    pub company_id: Option<RecordId>,
    /// Owning company name.
    #[serde(default)]
    pub company_name: Option<String>,
    /// Pipeline stage.
    pub stage: OpportunityStage,
    /// Deal amount.
    #[serde(default)]
    pub amount: Option<f64>,
    /// Expected close date.
    #[serde(default)]
    pub expected_close_date: Option<DateTime<Utc>>,
    /// Ids of the contacts involved in the deal.
    #[serde(default)]
    pub contacts: Vec<RecordId>,
    /// Last recorded interaction.
    #[serde(default)]
    pub last_activity: Option<DateTime<Utc>>,
}

/// A stored record of any kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RepositoryRecord {
    /// A company.
    Company(CompanyRecord),
    /// A contact.
    Contact(ContactRecord),
    /// An opportunity.
    Opportunity(OpportunityRecord),
}

impl RepositoryRecord {
    /// Kind of the wrapped record.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::Company(_) => EntityKind::Company,
            Self::Contact(_) => EntityKind::Contact,
            Self::Opportunity(_) => EntityKind::Opportunity,
        }
    }

    /// Repository id of the wrapped record.
    #[must_use]
    pub const fn id(&self) -> &RecordId {
        match self {
            Self::Company(r) => &r.id,
            Self::Contact(r) => &r.id,
            Self::Opportunity(r) => &r.id,
        }
    }

    /// Name for companies and contacts, title for opportunities.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self {
            Self::Company(r) => &r.name,
            Self::Contact(r) => &r.name,
            Self::Opportunity(r) => &r.title,
        }
    }

    /// Affiliated company name, if the record carries one.
    #[must_use]
    pub fn company_name(&self) -> Option<&str> {
        match self {
            Self::Company(r) => Some(&r.name),
            Self::Contact(r) => r.company_name.as_deref(),
            Self::Opportunity(r) => r.company_name.as_deref(),
        }
    }
}

impl From<CompanyRecord> for RepositoryRecord {
    fn from(value: CompanyRecord) -> Self {
        Self::Company(value)
    }
}

impl From<ContactRecord> for RepositoryRecord {
    fn from(value: ContactRecord) -> Self {
        Self::Contact(value)
    }
}

impl From<OpportunityRecord> for RepositoryRecord {
    fn from(value: OpportunityRecord) -> Self {
        Self::Opportunity(value)
    }
}
