use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::domain::{AssignmentRecord, FairnessMetrics, HistoryWindow, PersonId, RosterSettings};
use super::roster::CurrentAssignment;

/// Storage abstraction consumed by the engine; persistence technology is left to adapters.
///
/// Runs against one repository are expected to be serialized by the caller. Interleaved
/// runs may interleave their history writes.
pub trait RosterRepository: Send + Sync {
    fn assignment_history(
        &self,
        person_id: &PersonId,
        window: HistoryWindow,
    ) -> Result<Vec<AssignmentRecord>, RepositoryError>;

    /// Batch variant used by preload. Adapters with a real backend should override this with a
    /// single query.
    fn assignment_histories(
        &self,
        person_ids: &[PersonId],
        window: HistoryWindow,
    ) -> Result<BTreeMap<PersonId, Vec<AssignmentRecord>>, RepositoryError> {
        person_ids
            .iter()
            .map(|id| Ok((id.clone(), self.assignment_history(id, window)?)))
            .collect()
    }

    fn fairness_metrics(&self, person_id: &PersonId)
        -> Result<Option<FairnessMetrics>, RepositoryError>;

    /// Batch variant used by preload; persons without metrics are absent from the map.
    fn fairness_metrics_batch(
        &self,
        person_ids: &[PersonId],
    ) -> Result<BTreeMap<PersonId, FairnessMetrics>, RepositoryError> {
        let mut found = BTreeMap::new();
        for id in person_ids {
            if let Some(metrics) = self.fairness_metrics(id)? {
                found.insert(id.clone(), metrics);
            }
        }
        Ok(found)
    }

    fn all_fairness_metrics(&self) -> Result<Vec<FairnessMetrics>, RepositoryError>;

    fn create_assignment_history(&self, record: AssignmentRecord) -> Result<(), RepositoryError>;

    /// Increments totals and per-position counts for one new assignment.
    fn update_fairness_metrics(
        &self,
        person_id: &PersonId,
        position: &str,
        recorded_at: DateTime<Utc>,
    ) -> Result<FairnessMetrics, RepositoryError>;

    fn settings(&self) -> Result<RosterSettings, RepositoryError>;

    fn save_current_roster(&self, roster: Vec<CurrentAssignment>) -> Result<(), RepositoryError>;

    fn current_roster(&self) -> Result<Vec<CurrentAssignment>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
