use super::domain::Person;

/// Stable index of a person inside a [`PersonnelPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PersonHandle(usize);

/// Depleting arena of available personnel for one run.
///
/// Persons are never removed from storage, only marked consumed, so handles stay valid and a
/// handle can be consumed at most once.
#[derive(Debug, Clone)]
pub struct PersonnelPool {
    people: Vec<Person>,
    consumed: Vec<bool>,
    remaining: usize,
}

impl PersonnelPool {
    pub fn new(people: Vec<Person>) -> Self {
        let remaining = people.len();
        Self {
            consumed: vec![false; remaining],
            people,
            remaining,
        }
    }

    pub fn len(&self) -> usize {
        self.remaining
    }

    pub fn is_empty(&self) -> bool {
        self.remaining == 0
    }

    /// Available persons in input order.
    pub fn available(&self) -> impl Iterator<Item = (PersonHandle, &Person)> {
        self.people
            .iter()
            .enumerate()
            .filter(|(index, _)| !self.consumed[*index])
            .map(|(index, person)| (PersonHandle(index), person))
    }

    pub fn get(&self, handle: PersonHandle) -> Option<&Person> {
        if self.consumed.get(handle.0).copied().unwrap_or(true) {
            return None;
        }
        self.people.get(handle.0)
    }

    /// Marks the person consumed and returns a copy, or `None` if already taken.
    pub fn take(&mut self, handle: PersonHandle) -> Option<Person> {
        let person = self.get(handle)?.clone();
        self.consumed[handle.0] = true;
        self.remaining -= 1;
        Some(person)
    }

    pub fn into_remaining(self) -> Vec<Person> {
        self.people
            .into_iter()
            .zip(self.consumed)
            .filter(|(_, consumed)| !consumed)
            .map(|(person, _)| person)
            .collect()
    }
}
