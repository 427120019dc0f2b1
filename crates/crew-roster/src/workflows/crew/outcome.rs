use serde::{Deserialize, Serialize};

use super::domain::{Person, PersonId, Slot};
use super::fairness::FairnessBreakdown;

/// Why a candidate won a slot, kept for transparent audits of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionTrace {
    pub qualification_score: f64,
    pub fairness: FairnessBreakdown,
    pub combined_score: f64,
    pub eligible_candidates: usize,
}

/// A slot as it left the run, filled or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotAssignment {
    pub position: String,
    pub assigned_user: Option<Person>,
    pub required: Vec<String>,
    pub requires_any: Vec<String>,
    pub prefer: Vec<String>,
    pub addons_required: Vec<String>,
    pub allow_fallback: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<SelectionTrace>,
}

impl SlotAssignment {
    pub fn open(slot: &Slot) -> Self {
        Self {
            position: slot.position.clone(),
            assigned_user: None,
            required: slot.requires.clone(),
            requires_any: slot.requires_any.clone(),
            prefer: slot.prefer.clone(),
            addons_required: slot.addons_required.clone(),
            allow_fallback: slot.allow_fallback,
            selection: None,
        }
    }

    pub fn is_filled(&self) -> bool {
        self.assigned_user.is_some()
    }

    pub fn assignee_id(&self) -> Option<&PersonId> {
        self.assigned_user.as_ref().map(|person| &person.id)
    }
}

/// Per-vehicle outcome of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleAssignment {
    pub vehicle: String,
    #[serde(rename = "type")]
    pub vehicle_type: String,
    pub slots: Vec<SlotAssignment>,
    /// Every slot has an assignee. Independent of `constraints_met`.
    pub fulfilled: bool,
    pub constraints_met: bool,
    pub warnings: Vec<String>,
}

impl VehicleAssignment {
    pub fn open_slots(&self) -> impl Iterator<Item = &SlotAssignment> {
        self.slots.iter().filter(|slot| !slot.is_filled())
    }
}

/// Complete roster produced by one orchestrator run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRunResult {
    pub assignments: Vec<VehicleAssignment>,
    pub unassigned_users: Vec<Person>,
    pub total_fulfilled: usize,
    pub total_vehicles: usize,
    pub warnings: Vec<String>,
}

impl AssignmentRunResult {
    pub fn vehicle(&self, name: &str) -> Option<&VehicleAssignment> {
        self.assignments
            .iter()
            .find(|assignment| assignment.vehicle == name)
    }

    /// Ids of every assignee in vehicle/slot order.
    pub fn assigned_person_ids(&self) -> Vec<&PersonId> {
        self.assignments
            .iter()
            .flat_map(|vehicle| vehicle.slots.iter())
            .filter_map(SlotAssignment::assignee_id)
            .collect()
    }

    pub fn filled_slot_count(&self) -> usize {
        self.assigned_person_ids().len()
    }
}
