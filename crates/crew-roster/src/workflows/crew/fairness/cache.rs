use std::collections::BTreeMap;

use crate::workflows::crew::domain::{AssignmentRecord, FairnessMetrics, HistoryWindow, PersonId};

/// Frozen snapshot of history and metrics for one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FairnessCache {
    window: Option<HistoryWindow>,
    histories: BTreeMap<PersonId, Vec<AssignmentRecord>>,
    metrics: BTreeMap<PersonId, FairnessMetrics>,
}

impl FairnessCache {
    pub(crate) fn replace(
        &mut self,
        window: HistoryWindow,
        histories: BTreeMap<PersonId, Vec<AssignmentRecord>>,
        metrics: BTreeMap<PersonId, FairnessMetrics>,
    ) {
        // Records outside the window are dropped so adapters may over-fetch.
        self.histories = histories
            .into_iter()
            .map(|(id, records)| {
                let bounded = records
                    .into_iter()
                    .filter(|record| window.contains(record.assigned_for))
                    .collect();
                (id, bounded)
            })
            .collect();
        self.metrics = metrics;
        self.window = Some(window);
    }

    pub fn is_loaded(&self) -> bool {
        self.window.is_some()
    }

    pub fn history(&self, person_id: &PersonId) -> &[AssignmentRecord] {
        self.histories
            .get(person_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn metrics(&self, person_id: &PersonId) -> Option<&FairnessMetrics> {
        self.metrics.get(person_id)
    }

    pub fn total_assignments(&self, person_id: &PersonId) -> u32 {
        self.metrics(person_id)
            .map(|metrics| metrics.total_assignments)
            .unwrap_or(0)
    }
}
