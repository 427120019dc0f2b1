use chrono::{DateTime, NaiveDate, Utc};
use crew_roster::workflows::crew::{
    AssignmentRecord, CurrentAssignment, FairnessMetrics, HistoryWindow, PersonId,
    RepositoryError, RosterRepository, RosterSettings,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
struct RosterStore {
    history: Vec<AssignmentRecord>,
    metrics: BTreeMap<PersonId, FairnessMetrics>,
    settings: RosterSettings,
    roster: Vec<CurrentAssignment>,
}

/// Process-local roster storage for the API service and CLI runs.
#[derive(Default, Clone)]
pub(crate) struct InMemoryRosterRepository {
    store: Arc<Mutex<RosterStore>>,
}

impl InMemoryRosterRepository {
    pub(crate) fn with_settings(settings: RosterSettings) -> Self {
        let repository = Self::default();
        repository
            .store
            .lock()
            .expect("repository mutex poisoned")
            .settings = settings;
        repository
    }
}

impl RosterRepository for InMemoryRosterRepository {
    fn assignment_history(
        &self,
        person_id: &PersonId,
        window: HistoryWindow,
    ) -> Result<Vec<AssignmentRecord>, RepositoryError> {
        let guard = self.store.lock().expect("repository mutex poisoned");
        Ok(guard
            .history
            .iter()
            .filter(|record| &record.person_id == person_id && window.contains(record.assigned_for))
            .cloned()
            .collect())
    }

    fn assignment_histories(
        &self,
        person_ids: &[PersonId],
        window: HistoryWindow,
    ) -> Result<BTreeMap<PersonId, Vec<AssignmentRecord>>, RepositoryError> {
        let guard = self.store.lock().expect("repository mutex poisoned");
        let mut histories: BTreeMap<PersonId, Vec<AssignmentRecord>> = person_ids
            .iter()
            .map(|id| (id.clone(), Vec::new()))
            .collect();
        for record in guard
            .history
            .iter()
            .filter(|record| window.contains(record.assigned_for))
        {
            if let Some(entries) = histories.get_mut(&record.person_id) {
                entries.push(record.clone());
            }
        }
        Ok(histories)
    }

    fn fairness_metrics(
        &self,
        person_id: &PersonId,
    ) -> Result<Option<FairnessMetrics>, RepositoryError> {
        let guard = self.store.lock().expect("repository mutex poisoned");
        Ok(guard.metrics.get(person_id).cloned())
    }

    fn all_fairness_metrics(&self) -> Result<Vec<FairnessMetrics>, RepositoryError> {
        let guard = self.store.lock().expect("repository mutex poisoned");
        Ok(guard.metrics.values().cloned().collect())
    }

    fn create_assignment_history(&self, record: AssignmentRecord) -> Result<(), RepositoryError> {
        let mut guard = self.store.lock().expect("repository mutex poisoned");
        guard.history.push(record);
        Ok(())
    }

    fn update_fairness_metrics(
        &self,
        person_id: &PersonId,
        position: &str,
        recorded_at: DateTime<Utc>,
    ) -> Result<FairnessMetrics, RepositoryError> {
        let mut guard = self.store.lock().expect("repository mutex poisoned");
        let metrics = guard
            .metrics
            .entry(person_id.clone())
            .or_insert_with(|| FairnessMetrics::new(person_id.clone()));
        metrics.record(position, recorded_at);
        Ok(metrics.clone())
    }

    fn settings(&self) -> Result<RosterSettings, RepositoryError> {
        let guard = self.store.lock().expect("repository mutex poisoned");
        Ok(guard.settings.clone())
    }

    fn save_current_roster(&self, roster: Vec<CurrentAssignment>) -> Result<(), RepositoryError> {
        let mut guard = self.store.lock().expect("repository mutex poisoned");
        guard.roster = roster;
        Ok(())
    }

    fn current_roster(&self) -> Result<Vec<CurrentAssignment>, RepositoryError> {
        let guard = self.store.lock().expect("repository mutex poisoned");
        Ok(guard.roster.clone())
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
