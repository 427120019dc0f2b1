//! Crew assignment for vehicle duty rosters.
//!
//! A run walks vehicles and slots in input order, filters the remaining personnel through the
//! qualification matcher, ranks candidates by rotation fairness, and greedily fills each slot.
//! Finished vehicles are checked against their aggregate staffing rules. Storage writes happen
//! after all decisions are made, so a run never observes its own assignments.

pub mod constraints;
pub mod domain;
pub mod fairness;
pub mod import;
pub mod ledger;
pub mod matching;
pub mod orchestrator;
pub mod outcome;
pub(crate) mod pool;
pub mod repository;
pub mod roster;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use constraints::{ConstraintChecker, ConstraintReport, ConstraintRule};
pub use domain::{
    AssignmentRecord, FairnessMetrics, HistoryWindow, PendingAssignment, Person, PersonId,
    PersonRole, RosterSettings, RotationSettings, Slot, VehicleConfiguration,
};
pub use fairness::{FairnessBreakdown, FairnessError, FairnessScorer, ScoringContext};
pub use import::{ImportReport, PersonnelImportError, PersonnelImporter};
pub use ledger::{AssignmentLedger, FlushFailure, FlushReport};
pub use matching::QualificationMatcher;
pub use orchestrator::{AssignmentError, AssignmentOrchestrator, AssignmentPlan, RunLimits};
pub use outcome::{AssignmentRunResult, SelectionTrace, SlotAssignment, VehicleAssignment};
pub use repository::{RepositoryError, RosterRepository};
pub use roster::{current_roster, CurrentAssignment};
pub use router::crew_router;
pub use service::{
    AssignmentRequest, AssignmentResponse, CrewAssignmentService, CrewServiceError, EngineOptions,
};
