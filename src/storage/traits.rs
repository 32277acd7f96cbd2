//! Abstract repository traits.
//!
//! These traits define the contract that repository backends must implement.
//! Lookups are full scans in this design: every `find_*` returns all records
//! of the kind and scoring happens in the resolvers.

use thiserror::Error;

use crate::entity::{
    CandidateCompany, CandidateContact, CandidateOpportunity, CompanyRecord, ContactRecord,
    EntityKind, OpportunityRecord, OpportunityStage, RecordId,
};

/// Errors that can occur during repository operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// Record not found.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Kind looked up.
        kind: EntityKind,
        /// Missing id.
        id: RecordId,
    },

    /// Key already exists.
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// The repository cannot be reached at all.
    #[error("Repository unavailable: {0}")]
    Unavailable(String),

    /// Transient backend failure for a single request.
    #[error("Repository backend error: {0}")]
    Backend(String),
}

impl RepositoryError {
    /// Returns true if retrying the same request may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Backend(_))
    }
}

/// Read side of the system of record.
///
/// Hints are passed through so remote backends can use them; the contract
/// is still to return every record of the kind.
pub trait EntityRepository: Send + Sync {
    /// All company records.
    fn find_companies(&self, name: &str) -> Result<Vec<CompanyRecord>, RepositoryError>;

    /// All contact records.
    fn find_contacts(
        &self,
        name: &str,
        role_hint: Option<&str>,
        company_hint: Option<&str>,
    ) -> Result<Vec<ContactRecord>, RepositoryError>;

    /// All opportunity records.
    fn find_opportunities(
        &self,
        keywords: &[String],
        company_hint: Option<&str>,
        stage_hint: Option<&str>,
    ) -> Result<Vec<OpportunityRecord>, RepositoryError>;
}

/// Field changes applied by [`RepositoryWriter::update_opportunity`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpportunityUpdate {
    /// New stage.
    pub stage: Option<OpportunityStage>,
    /// New amount.
    pub amount: Option<f64>,
}

/// Write side of the system of record. Never called during resolution.
pub trait RepositoryWriter: Send + Sync {
    /// Stores a new company and returns its id.
    fn create_company(&self, company: CandidateCompany) -> Result<RecordId, RepositoryError>;

    /// Stores a new contact, optionally affiliated with `company_id`.
    fn create_contact(
        &self,
        contact: CandidateContact,
        company_id: Option<RecordId>,
    ) -> Result<RecordId, RepositoryError>;

    /// Stores a new opportunity under `company_id`.
    fn create_opportunity(
        &self,
        opportunity: CandidateOpportunity,
        company_id: RecordId,
    ) -> Result<RecordId, RepositoryError>;

    /// Applies `update` to an existing opportunity.
    ///
    /// # Errors
    /// - `NotFound`: if no opportunity has this id
    fn update_opportunity(
        &self,
        id: &RecordId,
        update: OpportunityUpdate,
    ) -> Result<OpportunityRecord, RepositoryError>;
}
