//! Aggregate outcome derivation
//!
//! Both functions are pure and only look at the records they are given, so
//! callers pass a single submission round (see [`super::current_round`]).

use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::domain::workflow::ApprovalMode;

use super::entities::Approval;
use super::value_objects::{ApprovalId, ApprovalStatus};

/// Where a submission stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ApprovalOutcome {
    InProgress { current_step: u32 },
    Approved,
    Rejected { step: u32 },
}

/// A status change the engine wants applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub approval_id: ApprovalId,
    pub status: ApprovalStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StageState {
    Open,
    Approved,
    Rejected,
}

fn stages(approvals: &[Approval]) -> BTreeMap<u32, Vec<&Approval>> {
    let mut grouped: BTreeMap<u32, Vec<&Approval>> = BTreeMap::new();
    for approval in approvals {
        grouped.entry(approval.step_order).or_default().push(approval);
    }
    grouped
}

fn stage_state(stage: &[&Approval]) -> StageState {
    let live = stage
        .iter()
        .filter(|a| a.status != ApprovalStatus::Cancelled)
        .collect::<Vec<_>>();
    if live.is_empty() {
        return StageState::Open;
    }

    let mode = live[0].mode;
    let approved = live
        .iter()
        .filter(|a| a.status == ApprovalStatus::Approved)
        .count();
    let rejected = live
        .iter()
        .filter(|a| a.status == ApprovalStatus::Rejected)
        .count();

    match mode {
        ApprovalMode::All if rejected > 0 => StageState::Rejected,
        ApprovalMode::All if approved == live.len() => StageState::Approved,
        ApprovalMode::Any if approved > 0 => StageState::Approved,
        ApprovalMode::Any
            if live
                .iter()
                .all(|a| matches!(a.status, ApprovalStatus::Rejected | ApprovalStatus::Skipped))
                && rejected > 0 =>
        {
            StageState::Rejected
        }
        _ => StageState::Open,
    }
}

/// Derive the aggregate outcome of one submission round.
///
/// Stages are walked in `step_order`: the first rejected stage rejects the
/// contract, the first unfinished stage is the current one, and a round
/// whose stages are all approved (or that has no stages) is approved.
pub fn derive_outcome(approvals: &[Approval]) -> ApprovalOutcome {
    for (step, stage) in stages(approvals) {
        match stage_state(&stage) {
            StageState::Approved => continue,
            StageState::Rejected => return ApprovalOutcome::Rejected { step },
            StageState::Open => return ApprovalOutcome::InProgress { current_step: step },
        }
    }
    ApprovalOutcome::Approved
}

/// Status changes that bring the records in line with the derived outcome.
///
/// A rejection cancels everything still open. An approved `any` stage skips
/// its remaining pending approvers. Once a stage is approved the next one
/// is opened by turning its waiting records pending.
pub fn advance(approvals: &[Approval]) -> Vec<StatusChange> {
    let mut changes = Vec::new();

    if let ApprovalOutcome::Rejected { .. } = derive_outcome(approvals) {
        changes.extend(
            approvals
                .iter()
                .filter(|a| a.status.is_open())
                .map(|a| StatusChange {
                    approval_id: a.id,
                    status: ApprovalStatus::Cancelled,
                }),
        );
        return changes;
    }

    for stage in stages(approvals).into_values() {
        match stage_state(&stage) {
            StageState::Approved => {
                changes.extend(
                    stage
                        .iter()
                        .filter(|a| a.status.is_open())
                        .map(|a| StatusChange {
                            approval_id: a.id,
                            status: ApprovalStatus::Skipped,
                        }),
                );
            }
            StageState::Open => {
                let has_pending = stage.iter().any(|a| a.status == ApprovalStatus::Pending);
                if !has_pending {
                    changes.extend(
                        stage
                            .iter()
                            .filter(|a| a.status == ApprovalStatus::Waiting)
                            .map(|a| StatusChange {
                                approval_id: a.id,
                                status: ApprovalStatus::Pending,
                            }),
                    );
                }
                break;
            }
            StageState::Rejected => break,
        }
    }

    changes
}

/// Apply changes produced by [`advance`] to a set of records.
///
/// Records turning pending are stamped with the time they opened.
pub fn apply_changes(approvals: &mut [Approval], changes: &[StatusChange]) {
    let now = Utc::now();
    for change in changes {
        if let Some(approval) = approvals.iter_mut().find(|a| a.id == change.approval_id) {
            if change.status == ApprovalStatus::Pending && approval.status != ApprovalStatus::Pending {
                approval.opened_at = Some(now);
            }
            approval.status = change.status;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::approval::{Decision, materialize};
    use crate::domain::contract::ContractId;
    use crate::domain::directory::UserId;
    use crate::domain::workflow::{ApprovalPlan, PlannedStage, WorkflowId};
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn plan(stages: &[(ApprovalMode, usize)]) -> ApprovalPlan {
        ApprovalPlan {
            workflow_id: WorkflowId::generate(),
            workflow_name: "Test".to_string(),
            stages: stages
                .iter()
                .enumerate()
                .map(|(i, (mode, count))| PlannedStage {
                    step_order: (i as u32 + 1) * 10,
                    name: format!("Stage {}", i + 1),
                    mode: *mode,
                    approvers: (0..*count).map(|_| UserId::generate()).collect(),
                })
                .collect(),
        }
    }

    fn decide(approvals: &mut [Approval], index: usize, decision: Decision) {
        let comment = Some("noted".to_string());
        approvals[index].decide(decision, comment).unwrap();
        let changes = advance(approvals);
        apply_changes(approvals, &changes);
    }

    fn statuses(approvals: &[Approval]) -> Vec<ApprovalStatus> {
        approvals.iter().map(|a| a.status).collect()
    }

    #[test]
    fn test_empty_round_is_approved() {
        assert_eq!(derive_outcome(&[]), ApprovalOutcome::Approved);
        assert!(advance(&[]).is_empty());
    }

    #[test]
    fn test_all_mode_needs_every_approver() {
        let mut approvals = materialize(
            &plan(&[(ApprovalMode::All, 2), (ApprovalMode::All, 1)]),
            ContractId::generate(),
            1,
        );
        assert_eq!(
            derive_outcome(&approvals),
            ApprovalOutcome::InProgress { current_step: 10 }
        );

        decide(&mut approvals, 0, Decision::Approve);
        assert_eq!(
            derive_outcome(&approvals),
            ApprovalOutcome::InProgress { current_step: 10 }
        );
        assert_eq!(approvals[2].status, ApprovalStatus::Waiting);

        decide(&mut approvals, 1, Decision::Approve);
        assert_eq!(
            derive_outcome(&approvals),
            ApprovalOutcome::InProgress { current_step: 20 }
        );
        assert_eq!(approvals[2].status, ApprovalStatus::Pending);

        decide(&mut approvals, 2, Decision::Approve);
        assert_eq!(derive_outcome(&approvals), ApprovalOutcome::Approved);
    }

    #[test]
    fn test_opened_stage_is_stamped_when_it_opens() {
        let mut approvals = materialize(
            &plan(&[(ApprovalMode::All, 1), (ApprovalMode::All, 1)]),
            ContractId::generate(),
            1,
        );
        let submitted_at = approvals[1].created_at;
        assert_eq!(approvals[1].opened_at, None);

        decide(&mut approvals, 0, Decision::Approve);

        let decided_at = approvals[0].decided_at.unwrap();
        let opened_at = approvals[1].opened_at.unwrap();
        assert!(opened_at >= decided_at);
        assert!(opened_at >= submitted_at);
        assert_eq!(approvals[1].pending_since(), opened_at);
        assert_eq!(approvals[1].created_at, submitted_at);
    }

    #[test]
    fn test_any_mode_skips_siblings() {
        let mut approvals = materialize(
            &plan(&[(ApprovalMode::Any, 3), (ApprovalMode::All, 1)]),
            ContractId::generate(),
            1,
        );

        decide(&mut approvals, 1, Decision::Approve);
        assert_eq!(
            statuses(&approvals),
            vec![
                ApprovalStatus::Skipped,
                ApprovalStatus::Approved,
                ApprovalStatus::Skipped,
                ApprovalStatus::Pending,
            ]
        );
    }

    #[test]
    fn test_any_mode_rejects_only_when_everyone_rejects() {
        let mut approvals = materialize(
            &plan(&[(ApprovalMode::Any, 2), (ApprovalMode::All, 1)]),
            ContractId::generate(),
            1,
        );

        decide(&mut approvals, 0, Decision::Reject);
        assert_eq!(
            derive_outcome(&approvals),
            ApprovalOutcome::InProgress { current_step: 10 }
        );

        decide(&mut approvals, 1, Decision::Reject);
        assert_eq!(
            derive_outcome(&approvals),
            ApprovalOutcome::Rejected { step: 10 }
        );
        assert_eq!(approvals[2].status, ApprovalStatus::Cancelled);
    }

    #[test]
    fn test_all_mode_rejection_cancels_open_records() {
        let mut approvals = materialize(
            &plan(&[(ApprovalMode::All, 2), (ApprovalMode::All, 2)]),
            ContractId::generate(),
            1,
        );

        decide(&mut approvals, 0, Decision::Reject);
        assert_eq!(
            derive_outcome(&approvals),
            ApprovalOutcome::Rejected { step: 10 }
        );
        assert_eq!(
            statuses(&approvals),
            vec![
                ApprovalStatus::Rejected,
                ApprovalStatus::Cancelled,
                ApprovalStatus::Cancelled,
                ApprovalStatus::Cancelled,
            ]
        );
    }

    #[test]
    fn test_withdrawn_round_is_not_approved() {
        let mut approvals = materialize(
            &plan(&[(ApprovalMode::All, 1)]),
            ContractId::generate(),
            1,
        );
        approvals[0].status = ApprovalStatus::Cancelled;
        assert_eq!(
            derive_outcome(&approvals),
            ApprovalOutcome::InProgress { current_step: 10 }
        );
    }

    fn arb_status() -> impl Strategy<Value = ApprovalStatus> {
        prop::sample::select(ApprovalStatus::ALL.to_vec())
    }

    fn arb_shape() -> impl Strategy<Value = Vec<(ApprovalMode, usize)>> {
        let mode = prop::sample::select(vec![ApprovalMode::All, ApprovalMode::Any]);
        prop::collection::vec((mode, 1..4usize), 1..4)
    }

    fn arb_approvals() -> impl Strategy<Value = Vec<Approval>> {
        let stage = (prop::bool::ANY, prop::collection::vec(arb_status(), 1..4));
        prop::collection::vec(stage, 0..4).prop_map(|stages| {
            let shape = stages
                .iter()
                .map(|(any, statuses)| {
                    let mode = if *any {
                        ApprovalMode::Any
                    } else {
                        ApprovalMode::All
                    };
                    (mode, statuses.len())
                })
                .collect::<Vec<_>>();
            let mut approvals = materialize(&plan(&shape), ContractId::generate(), 1);
            let flat = stages.into_iter().flat_map(|(_, s)| s);
            for (approval, status) in approvals.iter_mut().zip(flat) {
                approval.status = status;
            }
            approvals
        })
    }

    proptest! {
        #[test]
        fn outcome_ignores_record_order(approvals in arb_approvals(), seed in any::<u64>()) {
            let mut shuffled = approvals.clone();
            let len = shuffled.len();
            if len > 1 {
                let mut state = seed;
                for i in (1..len).rev() {
                    state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                    let j = (state >> 33) as usize % (i + 1);
                    shuffled.swap(i, j);
                }
            }
            prop_assert_eq!(derive_outcome(&approvals), derive_outcome(&shuffled));
        }

        #[test]
        fn advancing_keeps_outcome_and_touches_only_open_records(approvals in arb_approvals()) {
            let before = derive_outcome(&approvals);
            let mut advanced = approvals.clone();
            let changes = advance(&advanced);
            apply_changes(&mut advanced, &changes);

            prop_assert_eq!(derive_outcome(&advanced), before);

            for change in &changes {
                let original = approvals.iter().find(|a| a.id == change.approval_id).unwrap();
                prop_assert!(original.status.is_open());
            }

            if let ApprovalOutcome::Rejected { .. } = before {
                prop_assert!(advanced.iter().all(|a| !a.status.is_open()));
            }
        }

        #[test]
        fn replayed_decisions_keep_a_single_pending_stage(
            shape in arb_shape(),
            decisions in prop::collection::vec((any::<usize>(), prop::bool::ANY), 0..16),
        ) {
            let mut approvals = materialize(&plan(&shape), ContractId::generate(), 1);

            for (pick, approve) in decisions {
                let pending = approvals
                    .iter()
                    .enumerate()
                    .filter(|(_, a)| a.status == ApprovalStatus::Pending)
                    .map(|(i, _)| i)
                    .collect::<Vec<_>>();
                if pending.is_empty() {
                    break;
                }
                let decision = if approve { Decision::Approve } else { Decision::Reject };
                decide(&mut approvals, pending[pick % pending.len()], decision);

                let pending_steps = approvals
                    .iter()
                    .filter(|a| a.status == ApprovalStatus::Pending)
                    .map(|a| a.step_order)
                    .collect::<BTreeSet<_>>();
                prop_assert!(pending_steps.len() <= 1, "pending in stages {:?}", pending_steps);
                prop_assert!(advance(&approvals).is_empty());

                match derive_outcome(&approvals) {
                    ApprovalOutcome::InProgress { current_step } => {
                        prop_assert_eq!(pending_steps.into_iter().collect::<Vec<_>>(), vec![current_step]);
                        prop_assert!(approvals
                            .iter()
                            .filter(|a| a.step_order < current_step)
                            .all(|a| !a.status.is_open()));
                    }
                    ApprovalOutcome::Approved | ApprovalOutcome::Rejected { .. } => {
                        prop_assert!(approvals.iter().all(|a| !a.status.is_open()));
                    }
                }
            }
        }
    }
}
