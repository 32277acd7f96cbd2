mod common;

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::sync::Arc;

use crm_resolve::plan::{
    CreateCompanyParams, CreateContactParams, CreateOpportunityParams, LogMeetingParams,
};
use crm_resolve::{
    Action, ActionItem, ActionParams, ActionPlan, ActionPlanner, ActionStatus, AutoSelectTop,
    CandidateCompany, CandidateContact, CandidateOpportunity, DisambiguationGate,
    EntityRepository, ExtractionResult, IdRef, InMemoryRepository, OpportunityStage,
    RecordId, RepositoryWriter, ResolutionEngine, ResolutionReport,
};

use common::init_tracing;

/// Creates whatever resolution could not match, then logs the meeting.
struct CreateMissingPlanner;

impl ActionPlanner for CreateMissingPlanner {
    type Error = Infallible;

    fn plan(
        &self,
        extraction: &ExtractionResult,
        report: &ResolutionReport,
    ) -> Result<ActionPlan, Infallible> {
        let mut actions = Vec::new();
        let mut next_id = 1;

        let company = &report.companies[0];
        let company_ref = if let Some(id) = company.entity_id() {
            IdRef::Id(id.clone())
        } else {
            actions.push(ActionItem::new(
                next_id,
                ActionParams::CreateCompany(CreateCompanyParams {
                    name: company.name().to_string(),
                    domain: None,
                    industry: None,
                }),
                "Company not in CRM",
            ));
            next_id += 1;
            IdRef::DependsOn(next_id - 1)
        };

        let mut participants = Vec::new();
        for contact in &report.contacts {
            if let Some(id) = contact.entity_id() {
                participants.push(IdRef::Id(id.clone()));
                continue;
            }
            let mut item = ActionItem::new(
                next_id,
                ActionParams::CreateContact(CreateContactParams {
                    name: contact.name().to_string(),
                    company_id: company_ref.clone(),
                    role: None,
                    email: None,
                }),
                "Participant not in CRM",
            );
            if let Some(dep) = company_ref.dependency() {
                item = item.depends_on(dep);
            }
            actions.push(item);
            participants.push(IdRef::DependsOn(next_id));
            next_id += 1;
        }

        for opp in &report.opportunities {
            if opp.action() == Action::Create {
                let mut item = ActionItem::new(
                    next_id,
                    ActionParams::CreateOpportunity(CreateOpportunityParams {
                        title: opp.name().to_string(),
                        company_id: company_ref.clone(),
                        stage: OpportunityStage::Approach,
                        amount: None,
                    }),
                    "New deal discussed",
                );
                if let Some(dep) = company_ref.dependency() {
                    item = item.depends_on(dep);
                }
                actions.push(item);
                next_id += 1;
            }
        }

        let mut log = ActionItem::new(
            next_id,
            ActionParams::LogMeetingInteraction(LogMeetingParams {
                date: "2026-01-15".to_string(),
                participants,
                company_id: company_ref,
                opportunity_id: None,
                notes: extraction.key_points.join("; "),
            }),
            "Record the meeting",
        );
        for earlier in 1..next_id {
            log = log.depends_on(earlier);
        }
        actions.push(log);
        Ok(ActionPlan::new(actions))
    }
}

fn execute(plan: &mut ActionPlan, writer: &dyn RepositoryWriter) -> BTreeMap<u32, RecordId> {
    let mut outputs = BTreeMap::new();
    let order: Vec<u32> = plan
        .execution_order()
        .unwrap()
        .iter()
        .map(|a| a.action_id)
        .collect();

    for action_id in order {
        let action = plan.get_mut(action_id).unwrap();
        let params = action.params.substitute(&outputs).unwrap();
        let produced = match params {
            ActionParams::CreateCompany(p) => Some(
                writer
                    .create_company(CandidateCompany {
                        domain: p.domain,
                        industry: p.industry,
                        ..CandidateCompany::new(p.name)
                    })
                    .unwrap(),
            ),
            ActionParams::CreateContact(p) => {
                let IdRef::Id(company_id) = p.company_id else {
                    panic!("unbound company for contact {}", p.name);
                };
                Some(
                    writer
                        .create_contact(CandidateContact::new(p.name), Some(company_id))
                        .unwrap(),
                )
            }
            ActionParams::CreateOpportunity(p) => {
                let IdRef::Id(company_id) = p.company_id else {
                    panic!("unbound company for opportunity {}", p.title);
                };
                Some(
                    writer
                        .create_opportunity(
                            CandidateOpportunity::new(p.title).with_stage(p.stage),
                            company_id,
                        )
                        .unwrap(),
                )
            }
            ActionParams::LogMeetingInteraction(p) => {
                assert!(p.participants.iter().all(|r| r.dependency().is_none()));
                assert!(p.company_id.dependency().is_none());
                None
            }
            other => panic!("unexpected action {}", other.action_type()),
        };
        if let Some(id) = produced {
            outputs.insert(action_id, id);
        }
        action.status = ActionStatus::Executed;
    }
    outputs
}

#[test]
fn plan_creates_missing_records_in_dependency_order() {
    init_tracing();
    let repo = Arc::new(InMemoryRepository::new());
    repo.insert_company(crm_resolve::CompanyRecord {
        id: "comp_123".into(),
        name: "Nextera".to_string(),
        domain: None,
        industry: None,
    })
    .unwrap();

    let extraction = ExtractionResult {
        companies: vec![CandidateCompany::new("Zylphor Dynamics")],
        participants: vec![CandidateContact::new("Ana Costa")],
        opportunities: vec![CandidateOpportunity::new("Launch Telemetry")],
        key_points: vec!["Pilot in Q2".to_string()],
        ..ExtractionResult::default()
    };

    let engine = ResolutionEngine::new(Arc::clone(&repo) as Arc<dyn EntityRepository>);
    let mut report = engine.resolve_batch(&extraction);
    DisambiguationGate::new(AutoSelectTop).run(&mut report);
    assert_eq!(report.count_by_action(Action::Create), 3);

    let mut plan = CreateMissingPlanner.plan(&extraction, &report).unwrap();
    plan.validate().unwrap();
    assert_eq!(plan.len(), 4);

    let outputs = execute(&mut plan, repo.as_ref());
    assert_eq!(outputs.len(), 3);
    assert!(plan.actions().iter().all(|a| a.status == ActionStatus::Executed));
    assert_eq!(repo.counts().unwrap(), (2, 1, 1));

    // A second pass now finds the created records.
    let report = engine.resolve_batch(&extraction);
    assert_eq!(report.count_by_action(Action::Create), 0);
    assert_eq!(report.companies[0].entity_id(), outputs.get(&1));
}

#[test]
fn planner_json_round_trips_and_validates() {
    init_tracing();
    let raw = r#"[
        {"action_id": 1, "action_type": "create_company", "tool_name": "create_company",
         "params": {"name": "Zylphor Dynamics"}, "rationale": "new prospect"},
        {"action_id": 2, "action_type": "create_follow_up_task", "tool_name": "create_follow_up_task",
         "params": {"title": "Send deck", "description": "Share the pilot deck", "opportunity_id": "[DEPENDS_ON:1]"},
         "rationale": "agreed next step", "dependencies": [1]},
        {"action_id": 3, "action_type": "notify_slack", "tool_name": "notify",
         "params": {"channel": "sales"}, "rationale": "heads-up"}
    ]"#;
    let plan: ActionPlan = serde_json::from_str(raw).unwrap();
    plan.validate().unwrap();
    assert_eq!(plan.get(3).unwrap().action_type(), "notify_slack");
    assert_eq!(plan.get(2).unwrap().status, ActionStatus::Pending);

    let back: ActionPlan = serde_json::from_str(&serde_json::to_string(&plan).unwrap()).unwrap();
    assert_eq!(back, plan);
}
