use serde::Serialize;
use tracing::warn;

use super::domain::VehicleConfiguration;
use super::outcome::SlotAssignment;

/// Aggregate staffing rules understood by the checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintRule {
    MinAgtTotal,
    MinAgtWatertrupp,
    MinMaschinistTotal,
    MinGfTotal,
    MinFunkTotal,
    PreferThTotal,
    PreferFueassTotal,
    MinCbrnErkkwTotal,
}

impl ConstraintRule {
    /// Evaluation order; warnings come out in this order.
    pub const fn ordered() -> [Self; 8] {
        [
            Self::MinAgtTotal,
            Self::MinAgtWatertrupp,
            Self::MinMaschinistTotal,
            Self::MinGfTotal,
            Self::MinFunkTotal,
            Self::PreferThTotal,
            Self::PreferFueassTotal,
            Self::MinCbrnErkkwTotal,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::MinAgtTotal => "min_agt_total",
            Self::MinAgtWatertrupp => "min_agt_watertrupp",
            Self::MinMaschinistTotal => "min_maschinist_total",
            Self::MinGfTotal => "min_gf_total",
            Self::MinFunkTotal => "min_funk_total",
            Self::PreferThTotal => "prefer_th_total",
            Self::PreferFueassTotal => "prefer_fueass_total",
            Self::MinCbrnErkkwTotal => "min_cbrn_erkkw_total",
        }
    }

    pub const fn qualification(self) -> &'static str {
        match self {
            Self::MinAgtTotal | Self::MinAgtWatertrupp => "AGT",
            Self::MinMaschinistTotal => "MASCH",
            Self::MinGfTotal => "GF",
            Self::MinFunkTotal => "FUNK",
            Self::PreferThTotal => "TH",
            Self::PreferFueassTotal => "FUEASS",
            Self::MinCbrnErkkwTotal => "CBRN_ERKKW",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ordered().into_iter().find(|rule| rule.key() == key)
    }

    /// Whether a slot's assignee counts toward this rule.
    pub fn applies_to(self, position: &str) -> bool {
        match self {
            Self::MinAgtWatertrupp => is_water_supply_position(position),
            _ => true,
        }
    }

    fn shortfall_message(self, count: usize, threshold: f64, vehicle: &str) -> String {
        let qualification = self.qualification();
        match self {
            Self::MinAgtWatertrupp => format!(
                "not enough {qualification} in water-supply teams: {count}/{threshold} ({vehicle})"
            ),
            Self::PreferThTotal | Self::PreferFueassTotal => format!(
                "recommended {threshold} {qualification}, currently {count} ({vehicle})"
            ),
            _ => format!("not enough {qualification}: {count}/{threshold} ({vehicle})"),
        }
    }
}

/// Water and attack team labels, full names or WT*/AT* abbreviations.
pub fn is_water_supply_position(position: &str) -> bool {
    let label = position.trim().to_lowercase();
    label.contains("wassertrupp")
        || label.contains("angriffstrupp")
        || label.starts_with("wt")
        || label.starts_with("at")
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ConstraintReport {
    pub met: bool,
    pub warnings: Vec<String>,
}

/// Post-hoc check of a vehicle's filled slots against its aggregate rules.
pub struct ConstraintChecker;

impl ConstraintChecker {
    pub fn check(vehicle: &VehicleConfiguration, slots: &[SlotAssignment]) -> ConstraintReport {
        for key in vehicle.constraints.keys() {
            if ConstraintRule::from_key(key).is_none() {
                warn!(vehicle = %vehicle.vehicle, key = %key, "ignoring unknown constraint");
            }
        }

        let mut warnings = Vec::new();
        for rule in ConstraintRule::ordered() {
            let Some(raw) = vehicle.constraints.get(rule.key()) else {
                continue;
            };
            let Some(threshold) = raw
                .as_f64()
                .filter(|value| value.is_finite() && *value >= 0.0)
            else {
                warn!(
                    vehicle = %vehicle.vehicle,
                    key = rule.key(),
                    value = %raw,
                    "ignoring malformed constraint threshold"
                );
                continue;
            };

            let count = slots
                .iter()
                .filter(|slot| rule.applies_to(&slot.position))
                .filter_map(|slot| slot.assigned_user.as_ref())
                .filter(|person| person.holds(rule.qualification()))
                .count();

            if (count as f64) < threshold {
                warnings.push(rule.shortfall_message(count, threshold, &vehicle.vehicle));
            }
        }

        ConstraintReport {
            met: warnings.is_empty(),
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::crew::domain::{Person, PersonRole, Slot};

    fn filled(position: &str, quals: &[&str]) -> SlotAssignment {
        let mut slot = SlotAssignment::open(&Slot::new(position));
        slot.assigned_user = Some(Person::new(
            format!("p-{position}"),
            position,
            PersonRole::Member,
            quals.iter().copied(),
        ));
        slot
    }

    fn vehicle() -> VehicleConfiguration {
        VehicleConfiguration::new("HLF 20", "HLF", Vec::new())
    }

    #[test]
    fn no_constraints_always_met() {
        let report = ConstraintChecker::check(&vehicle(), &[filled("Melder", &[])]);
        assert_eq!(report, ConstraintReport { met: true, warnings: Vec::new() });
    }

    #[test]
    fn gf_shortfall_reports_count_and_vehicle() {
        let config = vehicle().with_constraint("min_gf_total", 1);
        let report = ConstraintChecker::check(&config, &[filled("Gruppenführer", &["ZF"])]);

        assert!(!report.met);
        assert_eq!(report.warnings, vec!["not enough GF: 0/1 (HLF 20)".to_string()]);

        let satisfied = ConstraintChecker::check(&config, &[filled("Gruppenführer", &["GF"])]);
        assert!(satisfied.met);
    }

    #[test]
    fn watertrupp_rule_counts_only_team_positions() {
        let config = vehicle().with_constraint("min_agt_watertrupp", 2);
        let slots = [
            filled("Wassertruppführer", &["AGT"]),
            filled("Maschinist", &["AGT", "MASCH"]),
            filled("ATM", &["TM"]),
        ];

        let report = ConstraintChecker::check(&config, &slots);

        assert!(!report.met);
        assert!(report.warnings[0].contains("1/2"));
        assert!(report.warnings[0].contains("water-supply"));
    }

    #[test]
    fn unfilled_slots_do_not_count() {
        let config = vehicle().with_constraint("min_maschinist_total", 1);
        let open = SlotAssignment::open(&Slot::new("Maschinist"));
        let report = ConstraintChecker::check(&config, &[open]);
        assert!(!report.met);
    }

    #[test]
    fn preference_rules_use_recommendation_wording() {
        let config = vehicle().with_constraint("prefer_th_total", 2);
        let report = ConstraintChecker::check(&config, &[filled("Melder", &["TH"])]);
        assert_eq!(
            report.warnings,
            vec!["recommended 2 TH, currently 1 (HLF 20)".to_string()]
        );
    }

    #[test]
    fn malformed_and_unknown_keys_are_skipped() {
        let mut config = vehicle().with_constraint("min_sanitaeter_total", 3);
        config
            .constraints
            .insert("min_agt_total".to_string(), serde_json::json!("two"));

        let report = ConstraintChecker::check(&config, &[filled("Melder", &[])]);
        assert!(report.met);
    }

    #[test]
    fn water_supply_labels() {
        assert!(is_water_supply_position("Wassertrupp (AGT)"));
        assert!(is_water_supply_position("WTF"));
        assert!(is_water_supply_position("Angriffstruppmann"));
        assert!(!is_water_supply_position("Schlauchtrupp"));
    }
}
