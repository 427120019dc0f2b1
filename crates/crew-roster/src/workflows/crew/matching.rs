use super::domain::{Person, Slot};

const PREFER_POINTS: f64 = 10.0;
const ADDON_POINTS: f64 = 5.0;

/// Stateless slot eligibility and qualification scoring.
pub struct QualificationMatcher;

impl QualificationMatcher {
    /// Mandatory requirements: every `requires`, one of `requires_any`, and every
    /// `addons_required` code once fallback is disallowed.
    pub fn is_eligible(person: &Person, slot: &Slot) -> bool {
        if !slot.requires.is_empty() && !person.holds_all(&slot.requires) {
            return false;
        }

        if !slot.requires_any.is_empty() && !person.holds_any(&slot.requires_any) {
            return false;
        }

        if !slot.allow_fallback
            && !slot.addons_required.is_empty()
            && !person.holds_all(&slot.addons_required)
        {
            return false;
        }

        true
    }

    /// Bonus for preferred and addon codes. Addons count even when optional.
    pub fn qualification_score(person: &Person, slot: &Slot) -> f64 {
        let preferred = slot.prefer.iter().filter(|code| person.holds(code)).count();
        let addons = slot
            .addons_required
            .iter()
            .filter(|code| person.holds(code))
            .count();

        preferred as f64 * PREFER_POINTS + addons as f64 * ADDON_POINTS
    }

    /// Score for eligible persons, `None` otherwise.
    pub fn evaluate(person: &Person, slot: &Slot) -> Option<f64> {
        Self::is_eligible(person, slot).then(|| Self::qualification_score(person, slot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::crew::domain::PersonRole;

    fn codes(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn person(quals: &[&str]) -> Person {
        Person::new("p-1", "Test Person", PersonRole::Member, quals.iter().copied())
    }

    #[test]
    fn requires_every_listed_code() {
        let slot = Slot {
            requires: codes(&["AGT", "TM"]),
            ..Slot::new("Angriffstrupp")
        };

        assert!(QualificationMatcher::is_eligible(&person(&["AGT", "TM", "FUNK"]), &slot));
        assert!(!QualificationMatcher::is_eligible(&person(&["AGT"]), &slot));
    }

    #[test]
    fn requires_any_needs_one_match() {
        let slot = Slot {
            requires_any: codes(&["GF", "ZF"]),
            ..Slot::new("Gruppenführer")
        };

        assert!(QualificationMatcher::is_eligible(&person(&["ZF"]), &slot));
        assert!(!QualificationMatcher::is_eligible(&person(&["TM"]), &slot));
    }

    #[test]
    fn addons_gate_only_without_fallback() {
        let strict = Slot {
            requires: codes(&["MASCH"]),
            addons_required: codes(&["MZ"]),
            allow_fallback: false,
            ..Slot::new("Maschinist")
        };
        let lenient = Slot {
            allow_fallback: true,
            ..strict.clone()
        };
        let operator = person(&["MASCH"]);

        assert!(!QualificationMatcher::is_eligible(&operator, &strict));
        assert!(QualificationMatcher::is_eligible(&operator, &lenient));
        assert_eq!(QualificationMatcher::evaluate(&operator, &strict), None);
    }

    #[test]
    fn empty_slot_accepts_anyone() {
        assert_eq!(
            QualificationMatcher::evaluate(&person(&[]), &Slot::new("Melder")),
            Some(0.0)
        );
    }

    #[test]
    fn scores_preferred_and_addon_codes() {
        let slot = Slot {
            prefer: codes(&["FUNK", "TH"]),
            addons_required: codes(&["MZ"]),
            ..Slot::new("Maschinist")
        };

        assert_eq!(
            QualificationMatcher::qualification_score(&person(&["FUNK", "TH", "MZ"]), &slot),
            25.0
        );
        assert_eq!(
            QualificationMatcher::qualification_score(&person(&["MZ"]), &slot),
            5.0
        );
        assert_eq!(
            QualificationMatcher::qualification_score(&person(&["AGT"]), &slot),
            0.0
        );
    }
}
