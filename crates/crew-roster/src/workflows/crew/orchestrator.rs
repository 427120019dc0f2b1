use chrono::NaiveDate;
use tracing::{debug, info, warn};

use super::constraints::ConstraintChecker;
use super::domain::{
    HistoryWindow, PendingAssignment, Person, PersonId, RotationSettings, Slot,
    VehicleConfiguration,
};
use super::fairness::{FairnessError, FairnessScorer, ScoringContext};
use super::matching::QualificationMatcher;
use super::outcome::{AssignmentRunResult, SelectionTrace, SlotAssignment, VehicleAssignment};
use super::pool::{PersonHandle, PersonnelPool};
use super::repository::RosterRepository;

/// Weight of the fairness penalty against the qualification bonus.
const FAIRNESS_FACTOR: f64 = 0.5;

/// Upper bounds on the size of a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunLimits {
    pub max_personnel: usize,
    pub max_slots: usize,
}

impl Default for RunLimits {
    fn default() -> Self {
        Self {
            max_personnel: 500,
            max_slots: 500,
        }
    }
}

/// Errors that abort a run before any slot is filled.
#[derive(Debug, thiserror::Error)]
pub enum AssignmentError {
    #[error("run has {count} persons, limit is {limit}")]
    TooManyPersonnel { count: usize, limit: usize },
    #[error("run has {count} slots, limit is {limit}")]
    TooManySlots { count: usize, limit: usize },
    #[error(transparent)]
    Fairness(#[from] FairnessError),
}

impl AssignmentError {
    /// Input problems the caller can correct, as opposed to storage failures.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::TooManyPersonnel { .. } | Self::TooManySlots { .. }
        )
    }
}

/// Result of the decision phase plus the assignments still to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentPlan {
    pub result: AssignmentRunResult,
    pub pending: Vec<PendingAssignment>,
}

/// Greedy single-pass crew assignment over vehicles and slots in input order.
pub struct AssignmentOrchestrator<'r, R: ?Sized> {
    repository: &'r R,
    limits: RunLimits,
}

struct Candidate<'p> {
    handle: PersonHandle,
    person: &'p Person,
    qualification_score: f64,
}

struct Pick {
    handle: PersonHandle,
    trace: SelectionTrace,
}

impl<'r, R> AssignmentOrchestrator<'r, R>
where
    R: RosterRepository + ?Sized,
{
    pub fn new(repository: &'r R, limits: RunLimits) -> Self {
        Self { repository, limits }
    }

    /// Decides every slot against a frozen fairness snapshot. Nothing is written to storage;
    /// the returned plan carries the assignments to flush.
    pub fn run(
        &self,
        personnel: Vec<Person>,
        vehicles: &[VehicleConfiguration],
        rotation: &RotationSettings,
        target_date: NaiveDate,
    ) -> Result<AssignmentPlan, AssignmentError> {
        let assignable: Vec<Person> = personnel
            .into_iter()
            .filter(|person| person.role.is_assignable())
            .collect();
        self.validate(assignable.len(), vehicles)?;

        let person_ids: Vec<PersonId> = assignable.iter().map(|person| person.id.clone()).collect();
        let mut scorer = FairnessScorer::new();
        scorer.preload(
            self.repository,
            &person_ids,
            HistoryWindow::new(rotation.window_weeks, target_date),
        )?;

        let mut pool = PersonnelPool::new(assignable);
        let mut result = AssignmentRunResult {
            total_vehicles: vehicles.len(),
            ..AssignmentRunResult::default()
        };

        for vehicle in vehicles {
            let mut slots = Vec::with_capacity(vehicle.slots.len());
            for slot in &vehicle.slots {
                let mut outcome = SlotAssignment::open(slot);
                match select(&scorer, &pool, vehicle, slot, rotation, target_date)? {
                    Some(pick) => {
                        if let Some(person) = pool.take(pick.handle) {
                            debug!(
                                vehicle = %vehicle.vehicle,
                                position = %slot.position,
                                person = %person.id,
                                combined = pick.trace.combined_score,
                                eligible = pick.trace.eligible_candidates,
                                "slot filled"
                            );
                            scorer.record_assignment(
                                &person.id,
                                &slot.position,
                                &vehicle.vehicle,
                                target_date,
                            );
                            outcome.assigned_user = Some(person);
                            outcome.selection = Some(pick.trace);
                        }
                    }
                    None => {
                        warn!(
                            vehicle = %vehicle.vehicle,
                            position = %slot.position,
                            "no eligible person for slot"
                        );
                    }
                }
                slots.push(outcome);
            }

            let fulfilled = slots.iter().all(SlotAssignment::is_filled);
            let report = ConstraintChecker::check(vehicle, &slots);
            if fulfilled {
                result.total_fulfilled += 1;
            }
            result.warnings.extend(report.warnings.iter().cloned());
            result.assignments.push(VehicleAssignment {
                vehicle: vehicle.vehicle.clone(),
                vehicle_type: vehicle.vehicle_type.clone(),
                slots,
                fulfilled,
                constraints_met: report.met,
                warnings: report.warnings,
            });
        }

        result.unassigned_users = pool.into_remaining();
        info!(
            vehicles = result.total_vehicles,
            fulfilled = result.total_fulfilled,
            unassigned = result.unassigned_users.len(),
            warnings = result.warnings.len(),
            "assignment run complete"
        );

        Ok(AssignmentPlan {
            result,
            pending: scorer.take_pending(),
        })
    }

    fn validate(&self, personnel: usize, vehicles: &[VehicleConfiguration]) -> Result<(), AssignmentError> {
        if personnel > self.limits.max_personnel {
            return Err(AssignmentError::TooManyPersonnel {
                count: personnel,
                limit: self.limits.max_personnel,
            });
        }

        let slots: usize = vehicles.iter().map(|vehicle| vehicle.slots.len()).sum();
        if slots > self.limits.max_slots {
            return Err(AssignmentError::TooManySlots {
                count: slots,
                limit: self.limits.max_slots,
            });
        }
        Ok(())
    }
}

/// Highest combined score wins; exact ties go to the smallest person id.
fn select(
    scorer: &FairnessScorer,
    pool: &PersonnelPool,
    vehicle: &VehicleConfiguration,
    slot: &Slot,
    rotation: &RotationSettings,
    target_date: NaiveDate,
) -> Result<Option<Pick>, FairnessError> {
    if pool.is_empty() {
        return Ok(None);
    }

    let candidates: Vec<Candidate<'_>> = pool
        .available()
        .filter_map(|(handle, person)| {
            QualificationMatcher::evaluate(person, slot).map(|qualification_score| Candidate {
                handle,
                person,
                qualification_score,
            })
        })
        .collect();
    if candidates.is_empty() {
        return Ok(None);
    }

    let people: Vec<&Person> = candidates.iter().map(|candidate| candidate.person).collect();
    let context = ScoringContext {
        position: &slot.position,
        vehicle_name: &vehicle.vehicle,
        required_quals: &slot.requires,
        target_date,
        rotation_window_weeks: rotation.window_weeks,
        position_weights: &rotation.position_weights,
        pool_size: pool.len(),
    };
    let scored = scorer.score_candidates(&people, &context)?;

    let best = candidates
        .iter()
        .filter_map(|candidate| {
            let fairness = scored
                .iter()
                .find(|entry| entry.person.id == candidate.person.id)?;
            let combined =
                candidate.qualification_score - fairness.score() * FAIRNESS_FACTOR;
            Some((candidate, fairness, combined))
        })
        .max_by(|(a, _, a_score), (b, _, b_score)| {
            a_score
                .total_cmp(b_score)
                .then_with(|| b.person.id.cmp(&a.person.id))
        });

    Ok(best.map(|(candidate, fairness, combined)| Pick {
        handle: candidate.handle,
        trace: SelectionTrace {
            qualification_score: candidate.qualification_score,
            fairness: fairness.breakdown.clone(),
            combined_score: combined,
            eligible_candidates: candidates.len(),
        },
    }))
}
