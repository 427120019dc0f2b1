use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::crew::domain::{
    AssignmentRecord, FairnessMetrics, HistoryWindow, Person, PersonId, PersonRole,
    RosterSettings, Slot, VehicleConfiguration,
};
use crate::workflows::crew::repository::{RepositoryError, RosterRepository};
use crate::workflows::crew::roster::CurrentAssignment;
use crate::workflows::crew::service::{CrewAssignmentService, EngineOptions};

pub(super) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub(super) fn target_date() -> NaiveDate {
    date(2025, 6, 14)
}

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 14, 7, 30, 0).unwrap()
}

pub(super) fn member(id: &str, quals: &[&str]) -> Person {
    Person::new(id, id.to_uppercase(), PersonRole::Member, quals.iter().copied())
}

pub(super) fn codes(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

pub(super) fn slot(position: &str, requires: &[&str]) -> Slot {
    Slot {
        requires: codes(requires),
        ..Slot::new(position)
    }
}

pub(super) fn vehicle(name: &str, slots: Vec<Slot>) -> VehicleConfiguration {
    VehicleConfiguration::new(name, "LF", slots)
}

pub(super) fn record(person: &str, position: &str, assigned_for: NaiveDate) -> AssignmentRecord {
    AssignmentRecord {
        person_id: PersonId::new(person),
        position: position.to_string(),
        vehicle_name: "LF 10".to_string(),
        assigned_for,
        created_at: now(),
    }
}

pub(super) fn metrics(person: &str, total: u32) -> FairnessMetrics {
    FairnessMetrics {
        total_assignments: total,
        ..FairnessMetrics::new(PersonId::new(person))
    }
}

#[derive(Default)]
struct MemoryState {
    history: Vec<AssignmentRecord>,
    metrics: BTreeMap<PersonId, FairnessMetrics>,
    settings: RosterSettings,
    roster: Vec<CurrentAssignment>,
}

/// Repository backed by process memory that counts reads.
#[derive(Default)]
pub(super) struct MemoryRepository {
    state: Mutex<MemoryState>,
    history_reads: AtomicUsize,
    metric_reads: AtomicUsize,
}

impl MemoryRepository {
    pub(super) fn with_history(records: Vec<AssignmentRecord>) -> Self {
        let repository = Self::default();
        repository.state.lock().expect("state mutex poisoned").history = records;
        repository
    }

    pub(super) fn insert_metrics(&self, metrics: FairnessMetrics) {
        self.state
            .lock()
            .expect("state mutex poisoned")
            .metrics
            .insert(metrics.person_id.clone(), metrics);
    }

    pub(super) fn set_settings(&self, settings: RosterSettings) {
        self.state.lock().expect("state mutex poisoned").settings = settings;
    }

    pub(super) fn history(&self) -> Vec<AssignmentRecord> {
        self.state.lock().expect("state mutex poisoned").history.clone()
    }

    pub(super) fn reads(&self) -> usize {
        self.history_reads.load(Ordering::SeqCst) + self.metric_reads.load(Ordering::SeqCst)
    }
}

impl RosterRepository for MemoryRepository {
    fn assignment_history(
        &self,
        person_id: &PersonId,
        window: HistoryWindow,
    ) -> Result<Vec<AssignmentRecord>, RepositoryError> {
        self.history_reads.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().expect("state mutex poisoned");
        Ok(state
            .history
            .iter()
            .filter(|record| &record.person_id == person_id && window.contains(record.assigned_for))
            .cloned()
            .collect())
    }

    fn fairness_metrics(
        &self,
        person_id: &PersonId,
    ) -> Result<Option<FairnessMetrics>, RepositoryError> {
        self.metric_reads.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().expect("state mutex poisoned");
        Ok(state.metrics.get(person_id).cloned())
    }

    fn all_fairness_metrics(&self) -> Result<Vec<FairnessMetrics>, RepositoryError> {
        let state = self.state.lock().expect("state mutex poisoned");
        Ok(state.metrics.values().cloned().collect())
    }

    fn create_assignment_history(&self, record: AssignmentRecord) -> Result<(), RepositoryError> {
        self.state
            .lock()
            .expect("state mutex poisoned")
            .history
            .push(record);
        Ok(())
    }

    fn update_fairness_metrics(
        &self,
        person_id: &PersonId,
        position: &str,
        recorded_at: DateTime<Utc>,
    ) -> Result<FairnessMetrics, RepositoryError> {
        let mut state = self.state.lock().expect("state mutex poisoned");
        let entry = state
            .metrics
            .entry(person_id.clone())
            .or_insert_with(|| FairnessMetrics::new(person_id.clone()));
        entry.record(position, recorded_at);
        Ok(entry.clone())
    }

    fn settings(&self) -> Result<RosterSettings, RepositoryError> {
        Ok(self.state.lock().expect("state mutex poisoned").settings.clone())
    }

    fn save_current_roster(&self, roster: Vec<CurrentAssignment>) -> Result<(), RepositoryError> {
        self.state.lock().expect("state mutex poisoned").roster = roster;
        Ok(())
    }

    fn current_roster(&self) -> Result<Vec<CurrentAssignment>, RepositoryError> {
        Ok(self.state.lock().expect("state mutex poisoned").roster.clone())
    }
}

pub(super) struct UnavailableRepository;

impl RosterRepository for UnavailableRepository {
    fn assignment_history(
        &self,
        _person_id: &PersonId,
        _window: HistoryWindow,
    ) -> Result<Vec<AssignmentRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fairness_metrics(
        &self,
        _person_id: &PersonId,
    ) -> Result<Option<FairnessMetrics>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn all_fairness_metrics(&self) -> Result<Vec<FairnessMetrics>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn create_assignment_history(&self, _record: AssignmentRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update_fairness_metrics(
        &self,
        _person_id: &PersonId,
        _position: &str,
        _recorded_at: DateTime<Utc>,
    ) -> Result<FairnessMetrics, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn settings(&self) -> Result<RosterSettings, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn save_current_roster(&self, _roster: Vec<CurrentAssignment>) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn current_roster(&self) -> Result<Vec<CurrentAssignment>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Reads succeed from memory; history writes fail a set number of times first, or forever
/// for persons listed in `rejected`.
#[derive(Default)]
pub(super) struct FlakyRepository {
    pub(super) inner: MemoryRepository,
    failures_left: AtomicUsize,
    rejected: Vec<PersonId>,
    write_attempts: AtomicUsize,
}

impl FlakyRepository {
    pub(super) fn failing_first(failures: usize) -> Self {
        Self {
            failures_left: AtomicUsize::new(failures),
            ..Self::default()
        }
    }

    pub(super) fn rejecting(person: &str) -> Self {
        Self {
            rejected: vec![PersonId::new(person)],
            ..Self::default()
        }
    }

    pub(super) fn write_attempts(&self) -> usize {
        self.write_attempts.load(Ordering::SeqCst)
    }
}

impl RosterRepository for FlakyRepository {
    fn assignment_history(
        &self,
        person_id: &PersonId,
        window: HistoryWindow,
    ) -> Result<Vec<AssignmentRecord>, RepositoryError> {
        self.inner.assignment_history(person_id, window)
    }

    fn fairness_metrics(
        &self,
        person_id: &PersonId,
    ) -> Result<Option<FairnessMetrics>, RepositoryError> {
        self.inner.fairness_metrics(person_id)
    }

    fn all_fairness_metrics(&self) -> Result<Vec<FairnessMetrics>, RepositoryError> {
        self.inner.all_fairness_metrics()
    }

    fn create_assignment_history(&self, record: AssignmentRecord) -> Result<(), RepositoryError> {
        self.write_attempts.fetch_add(1, Ordering::SeqCst);
        if self.rejected.contains(&record.person_id) {
            return Err(RepositoryError::Unavailable("write rejected".to_string()));
        }
        let outstanding = self.failures_left.load(Ordering::SeqCst);
        if outstanding > 0 {
            self.failures_left.store(outstanding - 1, Ordering::SeqCst);
            return Err(RepositoryError::Unavailable("write timed out".to_string()));
        }
        self.inner.create_assignment_history(record)
    }

    fn update_fairness_metrics(
        &self,
        person_id: &PersonId,
        position: &str,
        recorded_at: DateTime<Utc>,
    ) -> Result<FairnessMetrics, RepositoryError> {
        self.inner
            .update_fairness_metrics(person_id, position, recorded_at)
    }

    fn settings(&self) -> Result<RosterSettings, RepositoryError> {
        self.inner.settings()
    }

    fn save_current_roster(&self, roster: Vec<CurrentAssignment>) -> Result<(), RepositoryError> {
        self.inner.save_current_roster(roster)
    }

    fn current_roster(&self) -> Result<Vec<CurrentAssignment>, RepositoryError> {
        self.inner.current_roster()
    }
}

pub(super) fn options() -> EngineOptions {
    EngineOptions::default()
}

pub(super) fn build_service(
    repository: MemoryRepository,
) -> (Arc<CrewAssignmentService<MemoryRepository>>, Arc<MemoryRepository>) {
    let repository = Arc::new(repository);
    let service = Arc::new(CrewAssignmentService::new(repository.clone(), options()));
    (service, repository)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
