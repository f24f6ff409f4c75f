//! Integration tests for the `ApprovalWorkflow` controller.
//!
//! Uses the in-memory repositories so no database is needed.

mod common;

use contractflow_core::domain::approval::{Approval, ApprovalOutcome, ApprovalStatus, Decision};
use contractflow_core::domain::contract::{ContractError, ContractStatus, HistoryAction};
use contractflow_core::domain::directory::UserId;
use contractflow_core::domain::notification::NotificationKind;
use contractflow_core::domain::workflow::{ApprovalMode, ApproverSpec, WorkflowError, WorkflowStep};

use common::{FlakyApprovals, TestEnv, gated_step, role_step};

// ── Helpers ──────────────────────────────────────────────────────────────────

async fn pending_for(env: &TestEnv, user: &UserId) -> Vec<Approval> {
    env.state
        .workflow
        .pending_for(user)
        .await
        .expect("pending approvals should list")
}

async fn approve(env: &TestEnv, approval: &Approval) -> ApprovalOutcome {
    env.state
        .workflow
        .decide(&approval.id, approval.approver_id, Decision::Approve, None)
        .await
        .expect("approval should succeed")
        .outcome
}

// ── Submission ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_submit_opens_first_stage_and_notifies_approvers() {
    let env = TestEnv::new().await;
    let workflow = env.standard_workflow().await;
    let contract = env.create_contract(5_000_000).await;

    let submitted = env
        .state
        .workflow
        .submit(&contract.id, env.creator.id)
        .await
        .expect("submit should succeed");

    assert_eq!(submitted.status, ContractStatus::PendingApproval);
    assert_eq!(submitted.workflow_id, Some(workflow.id));

    let approvals = env
        .state
        .workflow
        .list_for_contract(&contract.id)
        .await
        .unwrap();
    assert_eq!(approvals.len(), 3);
    assert!(approvals.iter().all(|a| a.round == 1));

    let legal = approvals.iter().find(|a| a.approver_id == env.legal.id).unwrap();
    assert_eq!(legal.status, ApprovalStatus::Pending);
    assert!(
        approvals
            .iter()
            .filter(|a| a.step_order == 2)
            .all(|a| a.status == ApprovalStatus::Waiting)
    );

    assert!(
        env.has_notification(&env.legal.id, NotificationKind::ApprovalRequested)
            .await
    );
    assert!(
        !env.has_notification(&env.finance_a.id, NotificationKind::ApprovalRequested)
            .await
    );
}

#[tokio::test]
async fn test_only_creator_can_submit() {
    let env = TestEnv::new().await;
    env.standard_workflow().await;
    let contract = env.create_contract(1_000).await;

    let result = env.state.workflow.submit(&contract.id, env.legal.id).await;
    assert!(matches!(result, Err(ContractError::PermissionDenied { .. })));
}

#[tokio::test]
async fn test_submit_without_workflow_fails() {
    let env = TestEnv::new().await;
    let contract = env.create_contract(1_000).await;

    let result = env.state.workflow.submit(&contract.id, env.creator.id).await;
    assert!(matches!(
        result,
        Err(ContractError::Workflow(
            WorkflowError::NoApplicableWorkflow { .. }
        ))
    ));

    let unchanged = env.state.services.contracts.get(&contract.id).await.unwrap();
    assert_eq!(unchanged.status, ContractStatus::Draft);
}

#[tokio::test]
async fn test_plan_without_applicable_steps_approves_immediately() {
    let env = TestEnv::new().await;
    env.create_workflow(
        "Large deals only",
        vec![gated_step(1, "Board review", "legal", 100_000_000)],
    )
    .await;
    let contract = env.create_contract(10_000).await;

    let submitted = env
        .state
        .workflow
        .submit(&contract.id, env.creator.id)
        .await
        .unwrap();

    assert_eq!(submitted.status, ContractStatus::Approved);
    assert!(
        env.has_notification(&env.creator.id, NotificationKind::ContractApproved)
            .await
    );
}

#[tokio::test]
async fn test_creator_is_never_their_own_approver() {
    let env = TestEnv::new().await;
    env.create_workflow(
        "Self review",
        vec![WorkflowStep {
            step_order: 1,
            name: "Requester check".to_string(),
            approvers: vec![ApproverSpec::User {
                user_id: env.creator.id,
            }],
            mode: ApprovalMode::All,
            condition: None,
        }],
    )
    .await;
    let contract = env.create_contract(1_000).await;

    let result = env.state.workflow.submit(&contract.id, env.creator.id).await;
    assert!(matches!(
        result,
        Err(ContractError::Workflow(WorkflowError::UnresolvableStep { step: 1, .. }))
    ));
}

// ── Decisions ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_full_approval_moves_contract_to_approved() {
    let env = TestEnv::new().await;
    env.standard_workflow().await;
    let contract = env.create_contract(5_000_000).await;
    env.state
        .workflow
        .submit(&contract.id, env.creator.id)
        .await
        .unwrap();

    let legal = pending_for(&env, &env.legal.id).await.remove(0);
    let outcome = approve(&env, &legal).await;
    assert_eq!(outcome, ApprovalOutcome::InProgress { current_step: 2 });

    // Stage two opened for both finance approvers
    assert_eq!(pending_for(&env, &env.finance_a.id).await.len(), 1);
    assert_eq!(pending_for(&env, &env.finance_b.id).await.len(), 1);
    assert!(
        env.has_notification(&env.finance_b.id, NotificationKind::ApprovalRequested)
            .await
    );

    let finance = pending_for(&env, &env.finance_a.id).await.remove(0);
    let outcome = approve(&env, &finance).await;
    assert_eq!(outcome, ApprovalOutcome::Approved);

    let approved = env.state.services.contracts.get(&contract.id).await.unwrap();
    assert_eq!(approved.status, ContractStatus::Approved);

    // Any-mode stage: the second finance approver is no longer asked
    assert!(pending_for(&env, &env.finance_b.id).await.is_empty());
    let records = env
        .state
        .workflow
        .list_for_contract(&contract.id)
        .await
        .unwrap();
    let skipped = records
        .iter()
        .find(|a| a.approver_id == env.finance_b.id)
        .unwrap();
    assert_eq!(skipped.status, ApprovalStatus::Skipped);

    assert!(
        env.has_notification(&env.creator.id, NotificationKind::ContractApproved)
            .await
    );

    let actions = env
        .state
        .services
        .contracts
        .history(&contract.id)
        .await
        .unwrap()
        .into_iter()
        .map(|h| h.action)
        .collect::<Vec<_>>();
    assert_eq!(
        actions,
        vec![
            HistoryAction::Created,
            HistoryAction::Submitted,
            HistoryAction::StepApproved,
            HistoryAction::StepApproved,
            HistoryAction::Approved,
        ]
    );
}

#[tokio::test]
async fn test_rejection_cancels_open_approvals() {
    let env = TestEnv::new().await;
    env.standard_workflow().await;
    let contract = env.create_contract(5_000_000).await;
    env.state
        .workflow
        .submit(&contract.id, env.creator.id)
        .await
        .unwrap();

    let legal = pending_for(&env, &env.legal.id).await.remove(0);
    let result = env
        .state
        .workflow
        .decide(
            &legal.id,
            env.legal.id,
            Decision::Reject,
            Some("Liability cap missing".to_string()),
        )
        .await
        .unwrap();

    assert_eq!(result.outcome, ApprovalOutcome::Rejected { step: 1 });
    assert_eq!(result.contract_status, ContractStatus::Rejected);
    assert_eq!(result.approval.comment.as_deref(), Some("Liability cap missing"));

    let records = env
        .state
        .workflow
        .list_for_contract(&contract.id)
        .await
        .unwrap();
    assert!(
        records
            .iter()
            .filter(|a| a.step_order == 2)
            .all(|a| a.status == ApprovalStatus::Cancelled)
    );

    let rejected = env
        .notifications_for(&env.creator.id)
        .await
        .into_iter()
        .find(|n| n.kind == NotificationKind::ContractRejected)
        .expect("creator should hear about the rejection");
    assert!(rejected.message.contains("Liability cap missing"));
}

#[tokio::test]
async fn test_rejection_requires_comment() {
    let env = TestEnv::new().await;
    env.standard_workflow().await;
    let contract = env.create_contract(5_000_000).await;
    env.state
        .workflow
        .submit(&contract.id, env.creator.id)
        .await
        .unwrap();

    let legal = pending_for(&env, &env.legal.id).await.remove(0);
    let result = env
        .state
        .workflow
        .decide(&legal.id, env.legal.id, Decision::Reject, Some("   ".to_string()))
        .await;

    assert!(matches!(result, Err(ContractError::Validation { .. })));
    assert_eq!(pending_for(&env, &env.legal.id).await.len(), 1);
}

#[tokio::test]
async fn test_any_stage_stays_open_until_everyone_rejects() {
    let env = TestEnv::new().await;
    env.create_workflow(
        "Finance only",
        vec![role_step(1, "Finance sign-off", "finance", ApprovalMode::Any)],
    )
    .await;
    let contract = env.create_contract(20_000).await;
    env.state
        .workflow
        .submit(&contract.id, env.creator.id)
        .await
        .unwrap();

    let first = pending_for(&env, &env.finance_a.id).await.remove(0);
    let result = env
        .state
        .workflow
        .decide(
            &first.id,
            env.finance_a.id,
            Decision::Reject,
            Some("Over budget".to_string()),
        )
        .await
        .unwrap();
    assert_eq!(result.outcome, ApprovalOutcome::InProgress { current_step: 1 });
    assert_eq!(result.contract_status, ContractStatus::PendingApproval);

    let second = pending_for(&env, &env.finance_b.id).await.remove(0);
    let outcome = approve(&env, &second).await;
    assert_eq!(outcome, ApprovalOutcome::Approved);
}

#[tokio::test]
async fn test_decide_checks_assignee_and_state() {
    let env = TestEnv::new().await;
    env.standard_workflow().await;
    let contract = env.create_contract(5_000_000).await;
    env.state
        .workflow
        .submit(&contract.id, env.creator.id)
        .await
        .unwrap();

    let legal = pending_for(&env, &env.legal.id).await.remove(0);
    let wrong_user = env
        .state
        .workflow
        .decide(&legal.id, env.finance_a.id, Decision::Approve, None)
        .await;
    assert!(matches!(
        wrong_user,
        Err(ContractError::PermissionDenied { .. })
    ));

    approve(&env, &legal).await;
    let again = env
        .state
        .workflow
        .decide(&legal.id, env.legal.id, Decision::Approve, None)
        .await;
    assert!(matches!(
        again,
        Err(ContractError::ApprovalNotActionable { .. })
    ));
}

// ── Withdrawal and resubmission ──────────────────────────────────────────────

#[tokio::test]
async fn test_withdraw_cancels_round_and_resubmit_starts_new_one() {
    let env = TestEnv::new().await;
    env.standard_workflow().await;
    let contract = env.create_contract(5_000_000).await;
    env.state
        .workflow
        .submit(&contract.id, env.creator.id)
        .await
        .unwrap();
    let stale = pending_for(&env, &env.legal.id).await.remove(0);

    let withdrawn = env
        .state
        .workflow
        .withdraw(&contract.id, env.creator.id)
        .await
        .unwrap();
    assert_eq!(withdrawn.status, ContractStatus::Draft);
    assert!(pending_for(&env, &env.legal.id).await.is_empty());

    // Decisions on the withdrawn round are refused
    let late = env
        .state
        .workflow
        .decide(&stale.id, env.legal.id, Decision::Approve, None)
        .await;
    assert!(matches!(late, Err(ContractError::ApprovalNotActionable { .. })));

    env.state
        .workflow
        .submit(&contract.id, env.creator.id)
        .await
        .unwrap();
    let fresh = pending_for(&env, &env.legal.id).await;
    assert_eq!(fresh.len(), 1);
    assert_eq!(fresh[0].round, 2);

    let all = env
        .state
        .workflow
        .list_for_contract(&contract.id)
        .await
        .unwrap();
    assert!(
        all.iter()
            .filter(|a| a.round == 1)
            .all(|a| a.status == ApprovalStatus::Cancelled)
    );
}

#[tokio::test]
async fn test_withdraw_requires_pending_approval() {
    let env = TestEnv::new().await;
    let contract = env.create_contract(1_000).await;

    let result = env.state.workflow.withdraw(&contract.id, env.creator.id).await;
    assert!(matches!(
        result,
        Err(ContractError::InvalidTransition {
            from: ContractStatus::Draft,
            ..
        })
    ));
}

#[tokio::test]
async fn test_department_head_routing_uses_contract_department() {
    let env = TestEnv::new().await;
    env.create_workflow(
        "Department sign-off",
        vec![WorkflowStep {
            step_order: 1,
            name: "Head of department".to_string(),
            approvers: vec![ApproverSpec::DepartmentHead],
            mode: ApprovalMode::All,
            condition: None,
        }],
    )
    .await;
    let contract = env.create_contract(1_000).await;
    env.state
        .workflow
        .submit(&contract.id, env.creator.id)
        .await
        .unwrap();

    let pending = pending_for(&env, &env.ops_head.id).await;
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].contract_id, contract.id);
}

// ── Failure and concurrency ──────────────────────────────────────────────────

#[tokio::test]
async fn test_failed_approval_insert_leaves_contract_in_draft() {
    let env = TestEnv::new().await;
    env.standard_workflow().await;
    let contract = env.create_contract(250_000).await;
    let workflow = env.workflow_with(FlakyApprovals::refusing_inserts(
        env.state.repositories.approvals.clone(),
    ));

    let err = workflow
        .submit(&contract.id, env.creator.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ContractError::DatabaseError { .. }));

    let stored = env.state.services.contracts.get(&contract.id).await.unwrap();
    assert_eq!(stored.status, ContractStatus::Draft);
    assert!(
        env.state
            .services
            .contracts
            .history(&contract.id)
            .await
            .unwrap()
            .iter()
            .all(|h| h.action != HistoryAction::Submitted)
    );
    assert!(pending_for(&env, &env.legal.id).await.is_empty());

    // The same contract can be submitted once storage recovers
    let submitted = env
        .state
        .workflow
        .submit(&contract.id, env.creator.id)
        .await
        .unwrap();
    assert_eq!(submitted.status, ContractStatus::PendingApproval);
}

#[tokio::test]
async fn test_concurrent_decisions_on_all_stage_open_next_stage() {
    let env = TestEnv::new().await;
    env.create_workflow(
        "Finance first",
        vec![
            role_step(1, "Finance sign-off", "finance", ApprovalMode::All),
            role_step(2, "Legal review", "legal", ApprovalMode::All),
        ],
    )
    .await;
    let contract = env.create_contract(250_000).await;
    let workflow = env.workflow_with(FlakyApprovals::yielding(
        env.state.repositories.approvals.clone(),
    ));
    workflow.submit(&contract.id, env.creator.id).await.unwrap();

    let first = pending_for(&env, &env.finance_a.id).await.remove(0);
    let second = pending_for(&env, &env.finance_b.id).await.remove(0);

    let (a, b) = tokio::join!(
        workflow.decide(&first.id, env.finance_a.id, Decision::Approve, None),
        workflow.decide(&second.id, env.finance_b.id, Decision::Approve, None),
    );
    let mut outcomes = vec![a.unwrap().outcome, b.unwrap().outcome];
    outcomes.sort_by_key(|o| format!("{o:?}"));
    assert_eq!(
        outcomes,
        vec![
            ApprovalOutcome::InProgress { current_step: 1 },
            ApprovalOutcome::InProgress { current_step: 2 },
        ]
    );

    let legal = pending_for(&env, &env.legal.id).await;
    assert_eq!(legal.len(), 1);
    assert_eq!(legal[0].step_order, 2);
    assert!(legal[0].opened_at.is_some());
    assert!(
        env.has_notification(&env.legal.id, NotificationKind::ApprovalRequested)
            .await
    );
}

#[tokio::test]
async fn test_opened_stage_waits_from_its_opening() {
    let env = TestEnv::new().await;
    env.standard_workflow().await;
    let contract = env.create_contract(250_000).await;
    env.state
        .workflow
        .submit(&contract.id, env.creator.id)
        .await
        .unwrap();

    let legal = pending_for(&env, &env.legal.id).await.remove(0);
    let decided = env
        .state
        .workflow
        .decide(&legal.id, env.legal.id, Decision::Approve, None)
        .await
        .unwrap();
    let decided_at = decided.approval.decided_at.unwrap();

    let finance = pending_for(&env, &env.finance_a.id).await.remove(0);
    assert_eq!(finance.created_at, legal.created_at);
    assert!(finance.opened_at.unwrap() >= decided_at);
    assert_eq!(finance.pending_since(), finance.opened_at.unwrap());
}
