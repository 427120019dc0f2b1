use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::PersonId;
use super::outcome::{AssignmentRunResult, VehicleAssignment};

/// One seat of the roster currently in effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentAssignment {
    pub person_id: PersonId,
    pub vehicle: String,
    pub position: String,
    /// Partner in the same two-person team, when the position belongs to one.
    pub trupp_partner: Option<PersonId>,
    pub effective_from: NaiveDate,
}

/// Flattens a run into the roster rows that replace the current roster.
pub fn current_roster(result: &AssignmentRunResult, effective_from: NaiveDate) -> Vec<CurrentAssignment> {
    result
        .assignments
        .iter()
        .flat_map(|vehicle| vehicle_rows(vehicle, effective_from))
        .collect()
}

fn vehicle_rows(vehicle: &VehicleAssignment, effective_from: NaiveDate) -> Vec<CurrentAssignment> {
    vehicle
        .slots
        .iter()
        .filter_map(|slot| {
            let person_id = slot.assignee_id()?.clone();
            Some(CurrentAssignment {
                person_id,
                vehicle: vehicle.vehicle.clone(),
                position: slot.position.clone(),
                trupp_partner: trupp_partner(vehicle, &slot.position),
                effective_from,
            })
        })
        .collect()
}

/// Team members (labels containing "trupp" but not "führer") pair with another filled slot
/// whose label contains the same team name.
fn trupp_partner(vehicle: &VehicleAssignment, position: &str) -> Option<PersonId> {
    let label = position.to_lowercase();
    if !label.contains("trupp") || label.contains("führer") {
        return None;
    }

    let team = strip_qualifier(position);
    vehicle
        .slots
        .iter()
        .filter(|other| other.position != position && other.position.contains(team.as_str()))
        .find_map(|other| other.assignee_id().cloned())
}

/// Drops the first parenthesized qualifier, e.g. "Angriffstrupp (AGT)" -> "Angriffstrupp".
fn strip_qualifier(position: &str) -> String {
    let Some(open) = position.find('(') else {
        return position.to_string();
    };
    let Some(close) = position[open..].find(')') else {
        return position.to_string();
    };

    let head = position[..open].trim_end();
    let tail = &position[open + close + 1..];
    format!("{head}{tail}")
}
