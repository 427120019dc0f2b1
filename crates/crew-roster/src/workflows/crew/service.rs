use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::domain::{FairnessMetrics, Person, PersonId, RotationSettings, VehicleConfiguration};
use super::ledger::{AssignmentLedger, FlushReport};
use super::orchestrator::{AssignmentError, AssignmentOrchestrator, RunLimits};
use super::outcome::AssignmentRunResult;
use super::repository::{RepositoryError, RosterRepository};
use super::roster::{current_roster, CurrentAssignment};
use crate::config::RosterConfig;

/// Engine knobs taken from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    pub default_window_weeks: u32,
    pub limits: RunLimits,
    pub flush_attempts: u32,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self::from(&RosterConfig::default())
    }
}

impl From<&RosterConfig> for EngineOptions {
    fn from(config: &RosterConfig) -> Self {
        Self {
            default_window_weeks: config.rotation_window_weeks,
            limits: RunLimits {
                max_personnel: config.max_personnel,
                max_slots: config.max_slots,
            },
            flush_attempts: config.flush_attempts,
        }
    }
}

/// Input of one assignment run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRequest {
    pub personnel: Vec<Person>,
    pub vehicle_configs: Vec<VehicleConfiguration>,
    /// Vehicle names to staff; all configured vehicles when absent.
    #[serde(default)]
    pub vehicles: Option<Vec<String>>,
    /// Overrides the stored rotation settings.
    #[serde(default)]
    pub rotation_settings: Option<RotationSettings>,
    /// Defaults to the current date.
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
}

impl AssignmentRequest {
    pub fn new(personnel: Vec<Person>, vehicle_configs: Vec<VehicleConfiguration>) -> Self {
        Self {
            personnel,
            vehicle_configs,
            vehicles: None,
            rotation_settings: None,
            target_date: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentResponse {
    #[serde(flatten)]
    pub result: AssignmentRunResult,
    pub target_date: NaiveDate,
    pub persistence: FlushReport,
    pub roster_saved: bool,
}

/// Facade running the assignment engine against a roster repository.
pub struct CrewAssignmentService<R> {
    repository: Arc<R>,
    options: EngineOptions,
    run_guard: Mutex<()>,
}

impl<R> CrewAssignmentService<R>
where
    R: RosterRepository + 'static,
{
    pub fn new(repository: Arc<R>, options: EngineOptions) -> Self {
        Self {
            repository,
            options,
            run_guard: Mutex::new(()),
        }
    }

    pub fn assign(&self, request: AssignmentRequest) -> Result<AssignmentResponse, CrewServiceError> {
        self.assign_at(request, Utc::now())
    }

    /// Runs, flushes, and saves the current roster. Runs through one service are serialized.
    pub fn assign_at(
        &self,
        request: AssignmentRequest,
        now: DateTime<Utc>,
    ) -> Result<AssignmentResponse, CrewServiceError> {
        let _running = self.run_guard.lock().unwrap_or_else(PoisonError::into_inner);

        let target_date = request.target_date.unwrap_or_else(|| now.date_naive());
        let rotation = match request.rotation_settings {
            Some(rotation) => rotation,
            None => self
                .repository
                .settings()?
                .resolve(self.options.default_window_weeks),
        };

        let (vehicles, filter_warning) =
            select_vehicles(request.vehicle_configs, request.vehicles.as_deref());

        let orchestrator = AssignmentOrchestrator::new(self.repository.as_ref(), self.options.limits);
        let plan = orchestrator.run(request.personnel, &vehicles, &rotation, target_date)?;
        let mut result = plan.result;
        if let Some(warning) = filter_warning {
            result.warnings.insert(0, warning);
        }

        let ledger = AssignmentLedger::new(self.repository.as_ref(), self.options.flush_attempts);
        let persistence = ledger.flush(plan.pending, now);

        let roster_saved = match self
            .repository
            .save_current_roster(current_roster(&result, target_date))
        {
            Ok(()) => true,
            Err(error) => {
                warn!(error = %error, "failed to save current roster");
                false
            }
        };

        info!(
            target_date = %target_date,
            recorded = persistence.recorded,
            failed = persistence.failed.len(),
            roster_saved,
            "assignment request handled"
        );

        Ok(AssignmentResponse {
            result,
            target_date,
            persistence,
            roster_saved,
        })
    }

    pub fn current_roster(&self) -> Result<Vec<CurrentAssignment>, CrewServiceError> {
        Ok(self.repository.current_roster()?)
    }

    pub fn fairness_metrics(
        &self,
        person_id: &PersonId,
    ) -> Result<Option<FairnessMetrics>, CrewServiceError> {
        Ok(self.repository.fairness_metrics(person_id)?)
    }

    pub fn all_fairness_metrics(&self) -> Result<Vec<FairnessMetrics>, CrewServiceError> {
        Ok(self.repository.all_fairness_metrics()?)
    }
}

/// Applies the optional vehicle filter. A filter matching nothing falls back to every vehicle.
fn select_vehicles(
    configs: Vec<VehicleConfiguration>,
    filter: Option<&[String]>,
) -> (Vec<VehicleConfiguration>, Option<String>) {
    let names = match filter {
        Some(names) if !names.is_empty() => names,
        _ => return (configs, None),
    };

    let selected: Vec<VehicleConfiguration> = configs
        .iter()
        .filter(|config| names.contains(&config.vehicle))
        .cloned()
        .collect();
    if !selected.is_empty() {
        return (selected, None);
    }

    warn!(requested = ?names, "vehicle filter matched nothing, staffing all vehicles");
    let warning = format!(
        "no configured vehicle matches [{}], staffing all vehicles",
        names.join(", ")
    );
    (configs, Some(warning))
}

/// Error raised by the crew assignment service.
#[derive(Debug, thiserror::Error)]
pub enum CrewServiceError {
    #[error(transparent)]
    Assignment(#[from] AssignmentError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl CrewServiceError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Assignment(error) if error.is_validation())
    }
}
