//! In-memory repository backend.
//!
//! Thread-safe and order-preserving: records are returned in insertion
//! order, which is the tie-break order used by ranking. Intended for
//! embedded usage, tests, and as a reference implementation.

use std::sync::RwLock;

use chrono::Utc;

use crate::entity::{
    CandidateCompany, CandidateContact, CandidateOpportunity, CompanyRecord, ContactRecord,
    EntityKind, OpportunityRecord, OpportunityStage, RecordId,
};
use crate::storage::traits::{EntityRepository, OpportunityUpdate, RepositoryError, RepositoryWriter};

/// First sequence number handed out for generated ids.
const FIRST_GENERATED_SEQ: u64 = 1000;

fn lock_err(context: &'static str) -> RepositoryError {
    RepositoryError::Backend(format!("poisoned lock: {context}"))
}

#[derive(Debug)]
struct RepositoryState {
    companies: Vec<CompanyRecord>,
    contacts: Vec<ContactRecord>,
    opportunities: Vec<OpportunityRecord>,
    next_seq: u64,
}

impl Default for RepositoryState {
    fn default() -> Self {
        Self {
            companies: Vec::new(),
            contacts: Vec::new(),
            opportunities: Vec::new(),
            next_seq: FIRST_GENERATED_SEQ,
        }
    }
}

impl RepositoryState {
    fn contains_id(&self, id: &RecordId) -> bool {
        self.companies.iter().any(|r| &r.id == id)
            || self.contacts.iter().any(|r| &r.id == id)
            || self.opportunities.iter().any(|r| &r.id == id)
    }

    fn next_id(&mut self, kind: EntityKind) -> RecordId {
        loop {
            let id = RecordId::generated(kind, self.next_seq);
            self.next_seq += 1;
            if !self.contains_id(&id) {
                return id;
            }
        }
    }

    fn company_name(&self, id: &RecordId) -> Option<String> {
        self.companies
            .iter()
            .find(|c| &c.id == id)
            .map(|c| c.name.clone())
    }
}

/// Thread-safe in-memory entity repository.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    state: RwLock<RepositoryState>,
}

impl InMemoryRepository {
    /// Create a new empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a repository from known-unique records.
    pub(crate) fn from_records(
        companies: Vec<CompanyRecord>,
        contacts: Vec<ContactRecord>,
        opportunities: Vec<OpportunityRecord>,
    ) -> Self {
        Self {
            state: RwLock::new(RepositoryState {
                companies,
                contacts,
                opportunities,
                next_seq: FIRST_GENERATED_SEQ,
            }),
        }
    }

    /// Insert a company record with a caller-chosen id.
    ///
    /// # Errors
    /// - `DuplicateKey`: if any record already uses the id
    pub fn insert_company(&self, record: CompanyRecord) -> Result<(), RepositoryError> {
        let mut state = self.state.write().map_err(|_| lock_err("company.insert"))?;
        if state.contains_id(&record.id) {
            return Err(RepositoryError::DuplicateKey(record.id.to_string()));
        }
        state.companies.push(record);
        Ok(())
    }

    /// Insert a contact record with a caller-chosen id.
    ///
    /// # Errors
    /// - `DuplicateKey`: if any record already uses the id
    pub fn insert_contact(&self, record: ContactRecord) -> Result<(), RepositoryError> {
        let mut state = self.state.write().map_err(|_| lock_err("contact.insert"))?;
        if state.contains_id(&record.id) {
            return Err(RepositoryError::DuplicateKey(record.id.to_string()));
        }
        state.contacts.push(record);
        Ok(())
    }

    /// Insert an opportunity record with a caller-chosen id.
    ///
    /// # Errors
    /// - `DuplicateKey`: if any record already uses the id
    pub fn insert_opportunity(&self, record: OpportunityRecord) -> Result<(), RepositoryError> {
        let mut state = self.state.write().map_err(|_| lock_err("opportunity.insert"))?;
        if state.contains_id(&record.id) {
            return Err(RepositoryError::DuplicateKey(record.id.to_string()));
        }
        state.opportunities.push(record);
        Ok(())
    }

    /// Number of records per kind: `(companies, contacts, opportunities)`.
    ///
    /// # Errors
    /// - `Backend`: if the lock is poisoned
    pub fn counts(&self) -> Result<(usize, usize, usize), RepositoryError> {
        let state = self.state.read().map_err(|_| lock_err("counts"))?;
        Ok((
            state.companies.len(),
            state.contacts.len(),
            state.opportunities.len(),
        ))
    }
}

impl EntityRepository for InMemoryRepository {
    fn find_companies(&self, _name: &str) -> Result<Vec<CompanyRecord>, RepositoryError> {
        let state = self.state.read().map_err(|_| lock_err("company.find"))?;
        Ok(state.companies.clone())
    }

    fn find_contacts(
        &self,
        _name: &str,
        _role_hint: Option<&str>,
        _company_hint: Option<&str>,
    ) -> Result<Vec<ContactRecord>, RepositoryError> {
        let state = self.state.read().map_err(|_| lock_err("contact.find"))?;
        Ok(state.contacts.clone())
    }

    fn find_opportunities(
        &self,
        _keywords: &[String],
        _company_hint: Option<&str>,
        _stage_hint: Option<&str>,
    ) -> Result<Vec<OpportunityRecord>, RepositoryError> {
        let state = self.state.read().map_err(|_| lock_err("opportunity.find"))?;
        Ok(state.opportunities.clone())
    }
}

impl RepositoryWriter for InMemoryRepository {
    fn create_company(&self, company: CandidateCompany) -> Result<RecordId, RepositoryError> {
        let mut state = self.state.write().map_err(|_| lock_err("company.create"))?;
        let id = state.next_id(EntityKind::Company);
        state.companies.push(CompanyRecord {
            id: id.clone(),
            name: company.name,
            domain: company.domain,
            industry: company.industry,
        });
        Ok(id)
    }

    fn create_contact(
        &self,
        contact: CandidateContact,
        company_id: Option<RecordId>,
    ) -> Result<RecordId, RepositoryError> {
        let mut state = self.state.write().map_err(|_| lock_err("contact.create"))?;
        let company_name = match company_id.as_ref() {
            Some(cid) => Some(state.company_name(cid).ok_or_else(|| RepositoryError::NotFound {
                kind: EntityKind::Company,
                id: cid.clone(),
            })?),
            None => contact.company_name,
        };

        let id = state.next_id(EntityKind::Contact);
        state.contacts.push(ContactRecord {
            id: id.clone(),
            name: contact.name,
            email: contact.email,
            role: contact.role,
            company_id,
            company_name,
        });
        Ok(id)
    }

    fn create_opportunity(
        &self,
        opportunity: CandidateOpportunity,
        company_id: RecordId,
    ) -> Result<RecordId, RepositoryError> {
        let mut state = self.state.write().map_err(|_| lock_err("opportunity.create"))?;
        let company_name = state.company_name(&company_id).ok_or_else(|| RepositoryError::NotFound {
            kind: EntityKind::Company,
            id: company_id.clone(),
        })?;

        let id = state.next_id(EntityKind::Opportunity);
        state.opportunities.push(OpportunityRecord {
            id: id.clone(),
            title: opportunity.title,
            company_id: Some(company_id),
            company_name: Some(company_name),
            stage: opportunity.stage.unwrap_or(OpportunityStage::Approach),
            amount: opportunity.amount,
            expected_close_date: opportunity.expected_close_date,
            contacts: Vec::new(),
            last_activity: Some(Utc::now()),
        });
        Ok(id)
    }

    fn update_opportunity(
        &self,
        id: &RecordId,
        update: OpportunityUpdate,
    ) -> Result<OpportunityRecord, RepositoryError> {
        let mut state = self.state.write().map_err(|_| lock_err("opportunity.update"))?;
        let record = state
            .opportunities
            .iter_mut()
            .find(|o| &o.id == id)
            .ok_or_else(|| RepositoryError::NotFound {
                kind: EntityKind::Opportunity,
                id: id.clone(),
            })?;

        if let Some(stage) = update.stage {
            record.stage = stage;
        }
        if let Some(amount) = update.amount {
            record.amount = Some(amount);
        }
        record.last_activity = Some(Utc::now());
        Ok(record.clone())
    }
}
