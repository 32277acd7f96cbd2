//! Demo dataset: three companies, four contacts, two opportunities.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::entity::{CompanyRecord, ContactRecord, OpportunityRecord, OpportunityStage, RecordId};
use crate::storage::memory::InMemoryRepository;

fn date(year: i32, month: u32, day: u32) -> Option<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn company(id: &str, name: &str, domain: &str, industry: &str) -> CompanyRecord {
    CompanyRecord {
        id: id.into(),
        name: name.to_string(),
        domain: Some(domain.to_string()),
        industry: Some(industry.to_string()),
    }
}

fn contact(id: &str, name: &str, email: &str, role: &str, company: (&str, &str)) -> ContactRecord {
    ContactRecord {
        id: id.into(),
        name: name.to_string(),
        email: Some(email.to_string()),
        role: Some(role.to_string()),
        company_id: Some(company.0.into()),
        company_name: Some(company.1.to_string()),
    }
}

/// Repository seeded with the demo CRM dataset.
///
/// Contacts are inserted so that "Pierre Lefevre" precedes "Pierre Dubois";
/// equal scores between them rank in that order.
#[must_use]
pub fn demo_repository() -> InMemoryRepository {
    let nextera = ("comp_123", "Nextera");
    let techcorp = ("comp_125", "TechCorp International");

    let companies = vec![
        company("comp_123", "Nextera", "nextera.com", "Technology"),
        company("comp_124", "Occurent Systems", "occurent.com", "Software"),
        company("comp_125", "TechCorp International", "techcorp.com", "Technology"),
    ];

    let contacts = vec![
        contact("cont_456", "Patrick Dubois", "patrick.dubois@nextera.com", "Sales Director", nextera),
        contact("cont_789", "Pierre Lefevre", "pierre.lefevre@nextera.com", "IT Director", nextera),
        contact("cont_790", "Pierre Dubois", "pierre.dubois@nextera.com", "Technical Lead", nextera),
        contact("cont_791", "Marie Laurent", "marie.laurent@techcorp.com", "CEO", techcorp),
    ];

    let now = Utc::now();
    let opportunities = vec![
        OpportunityRecord {
            id: "opp_321".into(),
            title: "Nextera - CRM Implementation 2026".to_string(),
            company_id: Some(nextera.0.into()),
            company_name: Some(nextera.1.to_string()),
            stage: OpportunityStage::Proposal,
            amount: Some(150_000.0),
            expected_close_date: date(2026, 3, 31),
            contacts: vec![RecordId::new("cont_456"), RecordId::new("cont_789")],
            last_activity: Some(now - Duration::days(14)),
        },
        OpportunityRecord {
            id: "opp_322".into(),
            title: "TechCorp - Digital Transformation".to_string(),
            company_id: Some(techcorp.0.into()),
            company_name: Some(techcorp.1.to_string()),
            stage: OpportunityStage::Negotiate,
            amount: Some(500_000.0),
            expected_close_date: date(2026, 6, 30),
            contacts: vec![RecordId::new("cont_791")],
            last_activity: Some(now - Duration::days(5)),
        },
    ];

    InMemoryRepository::from_records(companies, contacts, opportunities)
}
