use chrono::NaiveDate;

use crate::workflows::crew::domain::{days_between, AssignmentRecord};

const MAX_RECENCY_PENALTY: f64 = 10.0;
const REPEAT_SURCHARGE: f64 = 2.0;

/// Penalty for holding `position` recently, decaying linearly from 10 to 0 over the window
/// from the latest dated assignment, plus 2 for every extra same-position assignment inside it.
///
/// History is matched on the position label only; assignments on other vehicles count.
pub fn recency_penalty(
    history: &[AssignmentRecord],
    position: &str,
    target_date: NaiveDate,
    window_weeks: u32,
) -> f64 {
    let window_days = i64::from(window_weeks) * 7;
    if window_days == 0 {
        return 0.0;
    }

    let held: Vec<&AssignmentRecord> = history
        .iter()
        .filter(|record| record.position == position)
        .collect();

    let Some(latest) = held.iter().map(|record| record.assigned_for).max() else {
        return 0.0;
    };
    let days_since = days_between(latest, target_date);
    if days_since >= window_days {
        return 0.0;
    }

    let decay = MAX_RECENCY_PENALTY * (1.0 - days_since as f64 / window_days as f64);
    let in_window = held
        .iter()
        .filter(|record| days_between(record.assigned_for, target_date) < window_days)
        .count();

    decay + REPEAT_SURCHARGE * (in_window as f64 - 1.0)
}

/// Priority relief for candidates of slots few people can fill.
pub fn scarcity_bonus(eligible_count: usize, pool_size: usize) -> f64 {
    if pool_size == 0 {
        return 0.0;
    }

    let ratio = eligible_count as f64 / pool_size as f64;
    if ratio < 0.3 {
        3.0
    } else if ratio < 0.5 {
        1.5
    } else {
        0.0
    }
}
