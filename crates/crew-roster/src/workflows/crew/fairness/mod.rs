//! Rotation fairness: who should get a position next, given who held it recently.
//!
//! Scores are penalties; lower means higher priority.

mod cache;
mod scoring;
mod weights;

pub use cache::FairnessCache;
pub use scoring::{recency_penalty, scarcity_bonus};
pub use weights::{position_weight, DEFAULT_POSITION_WEIGHTS};

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{HistoryWindow, PendingAssignment, Person, PersonId};
use super::repository::{RosterRepository, RepositoryError};

/// Inputs shared by every candidate of one slot.
#[derive(Debug, Clone)]
pub struct ScoringContext<'a> {
    pub position: &'a str,
    pub vehicle_name: &'a str,
    pub required_quals: &'a [String],
    pub target_date: NaiveDate,
    pub rotation_window_weeks: u32,
    pub position_weights: &'a BTreeMap<String, f64>,
    /// Remaining pool size the scarcity ratio is measured against.
    pub pool_size: usize,
}

/// Components of a fairness score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FairnessBreakdown {
    pub recency_penalty: f64,
    pub scarcity_bonus: f64,
    pub position_weight: f64,
    pub total_assignments: u32,
    pub final_score: f64,
}

#[derive(Debug, Clone)]
pub struct ScoredCandidate<'p> {
    pub person: &'p Person,
    pub breakdown: FairnessBreakdown,
}

impl ScoredCandidate<'_> {
    pub fn score(&self) -> f64 {
        self.breakdown.final_score
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FairnessError {
    #[error("fairness data must be preloaded before scoring")]
    NotPreloaded,
    #[error("failed to preload fairness data: {0}")]
    Repository(#[from] RepositoryError),
}

/// Scores candidates from a preloaded snapshot and queues assignments for later persistence.
#[derive(Debug, Default)]
pub struct FairnessScorer {
    cache: FairnessCache,
    pending: Vec<PendingAssignment>,
}

impl FairnessScorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads history and metrics for `person_ids` in one batch per kind. Calling it again
    /// replaces the snapshot.
    pub fn preload<R>(
        &mut self,
        repository: &R,
        person_ids: &[PersonId],
        window: HistoryWindow,
    ) -> Result<(), FairnessError>
    where
        R: RosterRepository + ?Sized,
    {
        let histories = repository.assignment_histories(person_ids, window)?;
        let metrics = repository.fairness_metrics_batch(person_ids)?;
        debug!(
            persons = person_ids.len(),
            with_metrics = metrics.len(),
            window_weeks = window.weeks,
            "fairness data preloaded"
        );
        self.cache.replace(window, histories, metrics);
        Ok(())
    }

    pub fn cache(&self) -> &FairnessCache {
        &self.cache
    }

    /// Scores candidates that hold every code in `required_quals`, lowest (best) first.
    /// Equal scores keep ascending person id order.
    pub fn score_candidates<'p>(
        &self,
        candidates: &[&'p Person],
        context: &ScoringContext<'_>,
    ) -> Result<Vec<ScoredCandidate<'p>>, FairnessError> {
        if !self.cache.is_loaded() {
            return Err(FairnessError::NotPreloaded);
        }

        let qualified: Vec<&'p Person> = candidates
            .iter()
            .copied()
            .filter(|person| person.holds_all(context.required_quals))
            .collect();
        if qualified.is_empty() {
            return Ok(Vec::new());
        }

        let scarcity = scarcity_bonus(qualified.len(), context.pool_size);
        let weight = position_weight(context.position, context.position_weights);

        let mut scored: Vec<ScoredCandidate<'p>> = qualified
            .into_iter()
            .map(|person| {
                let recency = recency_penalty(
                    self.cache.history(&person.id),
                    context.position,
                    context.target_date,
                    context.rotation_window_weeks,
                );
                let total_assignments = self.cache.total_assignments(&person.id);
                let final_score = f64::from(total_assignments) + recency * weight - scarcity;

                ScoredCandidate {
                    person,
                    breakdown: FairnessBreakdown {
                        recency_penalty: recency,
                        scarcity_bonus: scarcity,
                        position_weight: weight,
                        total_assignments,
                        final_score,
                    },
                }
            })
            .collect();

        scored.sort_by(|a, b| {
            a.score()
                .total_cmp(&b.score())
                .then_with(|| a.person.id.cmp(&b.person.id))
        });
        Ok(scored)
    }

    /// Queues one history record and metrics increment. The snapshot used for scoring is not
    /// touched, so later slots in the same run see the preloaded state.
    pub fn record_assignment(
        &mut self,
        person_id: &PersonId,
        position: &str,
        vehicle_name: &str,
        target_date: NaiveDate,
    ) {
        self.pending.push(PendingAssignment {
            person_id: person_id.clone(),
            position: position.to_string(),
            vehicle_name: vehicle_name.to_string(),
            assigned_for: target_date,
        });
    }

    pub fn pending(&self) -> &[PendingAssignment] {
        &self.pending
    }

    /// Hands queued assignments to the flush phase.
    pub fn take_pending(&mut self) -> Vec<PendingAssignment> {
        std::mem::take(&mut self.pending)
    }
}
