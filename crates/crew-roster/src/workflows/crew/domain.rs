use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for roster personnel.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(pub String);

impl PersonId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Account role as maintained by the personnel directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PersonRole {
    /// Technical operator account; never placed on a vehicle.
    SystemAdministrator,
    #[serde(alias = "admin")]
    Administrator,
    Moderator,
    Member,
}

impl PersonRole {
    pub const fn label(self) -> &'static str {
        match self {
            Self::SystemAdministrator => "system-administrator",
            Self::Administrator => "administrator",
            Self::Moderator => "moderator",
            Self::Member => "member",
        }
    }

    pub const fn is_assignable(self) -> bool {
        !matches!(self, Self::SystemAdministrator)
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "system-administrator" | "sysadmin" => Some(Self::SystemAdministrator),
            "administrator" | "admin" => Some(Self::Administrator),
            "moderator" => Some(Self::Moderator),
            "member" => Some(Self::Member),
            _ => None,
        }
    }
}

/// A member of the personnel pool with the qualification codes they hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    #[serde(default)]
    pub name: String,
    pub role: PersonRole,
    #[serde(default)]
    pub qualifications: BTreeSet<String>,
}

impl Person {
    pub fn new<I, Q>(id: impl Into<String>, name: impl Into<String>, role: PersonRole, quals: I) -> Self
    where
        I: IntoIterator<Item = Q>,
        Q: Into<String>,
    {
        Self {
            id: PersonId::new(id),
            name: name.into(),
            role,
            qualifications: quals.into_iter().map(Into::into).collect(),
        }
    }

    pub fn holds(&self, code: &str) -> bool {
        self.qualifications.contains(code)
    }

    pub fn holds_all(&self, codes: &[String]) -> bool {
        codes.iter().all(|code| self.holds(code))
    }

    pub fn holds_any(&self, codes: &[String]) -> bool {
        codes.iter().any(|code| self.holds(code))
    }
}

fn default_allow_fallback() -> bool {
    true
}

/// One staffing position on a vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub position: String,
    #[serde(default)]
    pub requires: Vec<String>,
    #[serde(default)]
    pub requires_any: Vec<String>,
    #[serde(default, alias = "prefers")]
    pub prefer: Vec<String>,
    #[serde(default)]
    pub addons_required: Vec<String>,
    /// When false, `addons_required` gates eligibility instead of only adding score.
    #[serde(default = "default_allow_fallback")]
    pub allow_fallback: bool,
}

impl Slot {
    pub fn new(position: impl Into<String>) -> Self {
        Self {
            position: position.into(),
            requires: Vec::new(),
            requires_any: Vec::new(),
            prefer: Vec::new(),
            addons_required: Vec::new(),
            allow_fallback: true,
        }
    }
}

/// Immutable description of a vehicle's crew layout and aggregate staffing rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleConfiguration {
    pub vehicle: String,
    #[serde(rename = "type", default)]
    pub vehicle_type: String,
    #[serde(default)]
    pub slots: Vec<Slot>,
    /// Raw rule thresholds keyed by rule name; values are validated by the constraint checker.
    #[serde(default)]
    pub constraints: BTreeMap<String, serde_json::Value>,
}

impl VehicleConfiguration {
    pub fn new(vehicle: impl Into<String>, vehicle_type: impl Into<String>, slots: Vec<Slot>) -> Self {
        Self {
            vehicle: vehicle.into(),
            vehicle_type: vehicle_type.into(),
            slots,
            constraints: BTreeMap::new(),
        }
    }

    pub fn with_constraint(mut self, key: impl Into<String>, threshold: u32) -> Self {
        self.constraints
            .insert(key.into(), serde_json::Value::from(threshold));
        self
    }
}

/// Absolute distance between two calendar dates in whole days.
pub fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    a.signed_duration_since(b).num_days().abs()
}

/// Trailing rotation window anchored on the date a roster is planned for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryWindow {
    pub weeks: u32,
    pub reference: NaiveDate,
}

impl HistoryWindow {
    pub fn new(weeks: u32, reference: NaiveDate) -> Self {
        Self { weeks, reference }
    }

    pub fn days(&self) -> i64 {
        i64::from(self.weeks) * 7
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        days_between(date, self.reference) < self.days()
    }
}

/// Append-only record of one filled slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentRecord {
    pub person_id: PersonId,
    pub position: String,
    pub vehicle_name: String,
    pub assigned_for: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// An assignment decided during a run and not yet written to storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAssignment {
    pub person_id: PersonId,
    pub position: String,
    pub vehicle_name: String,
    pub assigned_for: NaiveDate,
}

impl PendingAssignment {
    pub fn into_record(self, created_at: DateTime<Utc>) -> AssignmentRecord {
        AssignmentRecord {
            person_id: self.person_id,
            position: self.position,
            vehicle_name: self.vehicle_name,
            assigned_for: self.assigned_for,
            created_at,
        }
    }
}

const ROLLING_SCORE_DECAY: f64 = 0.9;

/// Accumulated per-person assignment statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FairnessMetrics {
    pub person_id: PersonId,
    pub total_assignments: u32,
    #[serde(default)]
    pub position_counts: BTreeMap<String, u32>,
    pub last_position: Option<String>,
    pub last_assigned_at: Option<DateTime<Utc>>,
    /// Exponentially decayed assignment count.
    pub rolling_score: f64,
}

impl FairnessMetrics {
    pub fn new(person_id: PersonId) -> Self {
        Self {
            person_id,
            total_assignments: 0,
            position_counts: BTreeMap::new(),
            last_position: None,
            last_assigned_at: None,
            rolling_score: 0.0,
        }
    }

    pub fn record(&mut self, position: &str, at: DateTime<Utc>) {
        self.total_assignments += 1;
        *self.position_counts.entry(position.to_string()).or_insert(0) += 1;
        self.last_position = Some(position.to_string());
        self.last_assigned_at = Some(at);
        self.rolling_score = self.rolling_score * ROLLING_SCORE_DECAY + 1.0;
    }

    pub fn count_for(&self, position: &str) -> u32 {
        self.position_counts.get(position).copied().unwrap_or(0)
    }
}

/// Rotation policy applied to one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RotationSettings {
    pub window_weeks: u32,
    /// Overrides for the built-in position weights.
    #[serde(default)]
    pub position_weights: BTreeMap<String, f64>,
}

impl RotationSettings {
    pub fn new(window_weeks: u32) -> Self {
        Self {
            window_weeks,
            position_weights: BTreeMap::new(),
        }
    }
}

impl Default for RotationSettings {
    fn default() -> Self {
        Self::new(4)
    }
}

/// Stored roster settings; missing values fall back to configured defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RosterSettings {
    pub rotation_window: Option<u32>,
    pub rotation_weights: Option<BTreeMap<String, f64>>,
}

impl RosterSettings {
    pub fn resolve(&self, default_window_weeks: u32) -> RotationSettings {
        RotationSettings {
            window_weeks: self.rotation_window.unwrap_or(default_window_weeks),
            position_weights: self.rotation_weights.clone().unwrap_or_default(),
        }
    }
}
