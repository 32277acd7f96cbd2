//! # crm-resolve - Entity Resolution for Meeting Notes
//!
//! crm-resolve reconciles the companies, contacts and opportunities
//! mentioned in meeting notes against the canonical records of a CRM. Each
//! candidate is scored against every stored record of its kind and assigned
//! an action: reuse the record, ask a reviewer to confirm it, or create a
//! new one.
//!
//! ## Core Concepts
//!
//! - **Candidate**: an extracted, unresolved mention of a CRM entity
//! - **Confidence**: a [0, 1] score quantifying match strength
//! - **Action**: `use_existing`, `validate` or `create`
//! - **ResolutionReport**: every matched entity of one batch, with warnings
//!   for each candidate that could not be resolved
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use crm_resolve::{
//!     demo_repository, Action, AutoSelectTop, CandidateContact, DisambiguationGate,
//!     ExtractionResult, ResolutionEngine,
//! };
//!
//! let engine = ResolutionEngine::new(Arc::new(demo_repository()));
//! let batch = ExtractionResult {
//!     participants: vec![CandidateContact::new("Pierre").with_company("Nextera")],
//!     ..ExtractionResult::default()
//! };
//!
//! let mut report = engine.resolve_batch(&batch);
//! assert!(report.needs_validation);
//!
//! DisambiguationGate::new(AutoSelectTop).run(&mut report);
//! assert_eq!(report.contacts[0].action(), Action::UseExisting);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Scoring primitives
pub mod action;
pub mod confidence;
pub mod error;
pub mod text;

// Entities and the system of record
pub mod config;
pub mod entity;
pub mod storage;

// Resolution
pub mod disambiguation;
pub mod engine;
pub mod report;
pub mod resolve;

// Downstream planning
pub mod plan;

// Re-export primary types at crate root for convenience
pub use action::{classify, Action, CREATION_THRESHOLD, DEFAULT_HIGH_THRESHOLD};
pub use confidence::Confidence;
pub use config::{ResolutionConfig, Thresholds};
pub use disambiguation::{
    AutoSelectTop, CallbackPolicy, Decision, DeferAll, DisambiguationGate, DisambiguationPolicy,
    DisambiguationPrompt, GateOutcome,
};
pub use engine::ResolutionEngine;
pub use entity::{
    CandidateCompany, CandidateContact, CandidateExtractor, CandidateOpportunity, CompanyRecord,
    ContactRecord, EntityKind, ExtractionResult, OpportunityRecord, OpportunityStage, RecordId,
    RepositoryRecord,
};
pub use error::{
    CrmError, CrmResult, DisambiguationError, PlanError, ResolutionError, ValidationError,
};
pub use plan::{ActionItem, ActionParams, ActionPlan, ActionPlanner, ActionStatus, IdRef};
pub use report::{BatchId, ResolutionReport, ResolutionWarning, WarningReason};
pub use resolve::{
    CompanyResolver, ContactResolver, MatchPolicy, MatchedEntity, OpportunityQuery,
    OpportunityResolver, Resolver, ScoredCandidate,
};
pub use storage::{
    demo_repository, EntityRepository, InMemoryRepository, OpportunityUpdate, RepositoryError,
    RepositoryWriter,
};
