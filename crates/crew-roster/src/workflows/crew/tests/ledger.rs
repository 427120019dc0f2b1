use super::common::*;

use crate::workflows::crew::domain::{PendingAssignment, PersonId};
use crate::workflows::crew::ledger::AssignmentLedger;
use crate::workflows::crew::repository::RosterRepository;

fn pending(person: &str, position: &str) -> PendingAssignment {
    PendingAssignment {
        person_id: PersonId::new(person),
        position: position.to_string(),
        vehicle_name: "LF 10".to_string(),
        assigned_for: target_date(),
    }
}

#[test]
fn flush_writes_history_and_metrics_in_order() {
    let repository = MemoryRepository::default();
    let report = AssignmentLedger::new(&repository, 3).flush(
        vec![pending("a", "Maschinist"), pending("b", "Melder"), pending("a", "Melder")],
        now(),
    );

    assert!(report.is_complete());
    assert_eq!(report.recorded, 3);

    let history = repository.history();
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].position, "Maschinist");
    assert!(history.iter().all(|record| record.created_at == now()));

    let metrics = repository
        .fairness_metrics(&PersonId::new("a"))
        .expect("read")
        .expect("metrics created");
    assert_eq!(metrics.total_assignments, 2);
    assert_eq!(metrics.count_for("Melder"), 1);
    assert_eq!(metrics.last_position.as_deref(), Some("Melder"));
}

#[test]
fn transient_failures_are_retried() {
    let repository = FlakyRepository::failing_first(2);
    let report = AssignmentLedger::new(&repository, 3).flush(vec![pending("a", "Melder")], now());

    assert!(report.is_complete());
    assert_eq!(repository.write_attempts(), 3);
    assert_eq!(repository.inner.history().len(), 1);
}

#[test]
fn exhausted_retries_are_reported_and_skip_metrics() {
    let repository = FlakyRepository::rejecting("a");
    let report = AssignmentLedger::new(&repository, 2).flush(
        vec![pending("a", "Melder"), pending("b", "Maschinist")],
        now(),
    );

    assert_eq!(report.recorded, 1);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].person_id, PersonId::new("a"));
    assert!(report.failed[0].error.contains("write rejected"));
    assert_eq!(repository.write_attempts(), 3);
    assert!(repository
        .fairness_metrics(&PersonId::new("a"))
        .expect("read")
        .is_none());
}

#[test]
fn zero_attempts_still_tries_once() {
    let repository = MemoryRepository::default();
    let report = AssignmentLedger::new(&repository, 0).flush(vec![pending("a", "Melder")], now());

    assert_eq!(report.recorded, 1);
}
