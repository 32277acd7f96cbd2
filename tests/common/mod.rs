#![allow(dead_code)]

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crm_resolve::{
    demo_repository, CandidateCompany, CandidateContact, CandidateOpportunity, CompanyRecord,
    ContactRecord, EntityRepository, ExtractionResult, InMemoryRepository, OpportunityRecord,
    OpportunityStage, RepositoryError,
};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// The batch extracted from the Nextera kickoff notes.
pub fn nextera_batch() -> ExtractionResult {
    ExtractionResult {
        participants: vec![
            CandidateContact::new("Pierre").with_company("Nextera").with_role("CTO"),
            CandidateContact::new("Marie Laurent").with_company("TechCorp International"),
        ],
        companies: vec![CandidateCompany::new("Nextera")],
        opportunities: vec![
            CandidateOpportunity::new("CRM Implementation").with_stage(OpportunityStage::Proposal)
        ],
        key_points: vec!["Proposal review next week".to_string()],
        ..ExtractionResult::default()
    }
}

/// Which finder calls a [`FaultyRepository`] should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// `Backend` error for every contact lookup of this name.
    ContactBackend(&'static str),
    /// `Unavailable` for every opportunity lookup.
    OpportunitiesUnavailable,
    /// Panic inside company lookups of this name.
    CompanyPanic(&'static str),
    /// Sleep before answering contact lookups.
    SlowContacts(Duration),
}

/// Demo data behind an injectable fault.
pub struct FaultyRepository {
    inner: InMemoryRepository,
    fault: Fault,
}

impl FaultyRepository {
    pub fn new(fault: Fault) -> Arc<Self> {
        Arc::new(Self {
            inner: demo_repository(),
            fault,
        })
    }
}

impl EntityRepository for FaultyRepository {
    fn find_companies(&self, name: &str) -> Result<Vec<CompanyRecord>, RepositoryError> {
        if matches!(self.fault, Fault::CompanyPanic(failing) if failing == name) {
            panic!("company index corrupted at {name}");
        }
        self.inner.find_companies(name)
    }

    fn find_contacts(
        &self,
        name: &str,
        role_hint: Option<&str>,
        company_hint: Option<&str>,
    ) -> Result<Vec<ContactRecord>, RepositoryError> {
        match self.fault {
            Fault::ContactBackend(failing) if failing == name => {
                return Err(RepositoryError::Backend(format!("lookup of {name} failed")));
            }
            Fault::SlowContacts(delay) => thread::sleep(delay),
            _ => {}
        }
        self.inner.find_contacts(name, role_hint, company_hint)
    }

    fn find_opportunities(
        &self,
        keywords: &[String],
        company_hint: Option<&str>,
        stage_hint: Option<&str>,
    ) -> Result<Vec<OpportunityRecord>, RepositoryError> {
        if self.fault == Fault::OpportunitiesUnavailable {
            return Err(RepositoryError::Unavailable("crm.example.com unreachable".to_string()));
        }
        self.inner.find_opportunities(keywords, company_hint, stage_hint)
    }
}
