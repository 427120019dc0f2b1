use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use super::domain::{PendingAssignment, PersonId};
use super::repository::{RepositoryError, RosterRepository};

/// A pending assignment that could not be written after every attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlushFailure {
    pub person_id: PersonId,
    pub position: String,
    pub error: String,
}

/// Outcome of writing a run's assignments to storage.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlushReport {
    pub recorded: usize,
    pub failed: Vec<FlushFailure>,
}

impl FlushReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Writes queued assignments in order with a bounded number of attempts per write.
pub struct AssignmentLedger<'r, R: ?Sized> {
    repository: &'r R,
    attempts: u32,
}

impl<'r, R> AssignmentLedger<'r, R>
where
    R: RosterRepository + ?Sized,
{
    pub fn new(repository: &'r R, attempts: u32) -> Self {
        Self {
            repository,
            attempts: attempts.max(1),
        }
    }

    /// Failures are logged and reported, never returned as errors. The metrics update is
    /// skipped when the history write for the same record failed.
    pub fn flush(&self, pending: Vec<PendingAssignment>, recorded_at: DateTime<Utc>) -> FlushReport {
        let mut report = FlushReport::default();

        for assignment in pending {
            let person_id = assignment.person_id.clone();
            let position = assignment.position.clone();

            let history = self.retry(|| {
                self.repository
                    .create_assignment_history(assignment.clone().into_record(recorded_at))
            });
            let outcome = history.and_then(|()| {
                self.retry(|| {
                    self.repository
                        .update_fairness_metrics(&person_id, &position, recorded_at)
                        .map(|_| ())
                })
            });

            match outcome {
                Ok(()) => report.recorded += 1,
                Err(error) => {
                    warn!(
                        person = %person_id,
                        position = %position,
                        error = %error,
                        "failed to record assignment"
                    );
                    report.failed.push(FlushFailure {
                        person_id,
                        position,
                        error: error.to_string(),
                    });
                }
            }
        }

        debug!(
            recorded = report.recorded,
            failed = report.failed.len(),
            "assignment flush finished"
        );
        report
    }

    fn retry<F>(&self, mut write: F) -> Result<(), RepositoryError>
    where
        F: FnMut() -> Result<(), RepositoryError>,
    {
        let mut attempt = 1;
        loop {
            match write() {
                Ok(()) => return Ok(()),
                Err(RepositoryError::NotFound) => return Err(RepositoryError::NotFound),
                Err(error) if attempt >= self.attempts => return Err(error),
                Err(error) => {
                    debug!(attempt, error = %error, "retrying assignment write");
                    attempt += 1;
                }
            }
        }
    }
}
