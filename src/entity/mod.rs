//! Entity layer.
//!
//! Candidate entities come out of extraction; records live in the
//! repository. Both are split into the three CRM kinds.

mod candidate;
mod kind;
mod record;
mod stage;

pub use candidate::{
    CandidateCompany, CandidateContact, CandidateExtractor, CandidateOpportunity,
    ExtractionResult, MAX_FIELD_LENGTH,
};
pub use kind::EntityKind;
pub use record::{CompanyRecord, ContactRecord, OpportunityRecord, RecordId, RepositoryRecord};
pub use stage::OpportunityStage;
