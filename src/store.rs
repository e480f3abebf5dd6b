//! Immutable in-memory record store.
//!
//! The store is built once and never mutated afterwards. Cloning a store
//! shares the same underlying records.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::{StoreError, StoreResult};
use crate::person::Person;

/// The fixed set of people every default store starts with, in store order.
pub fn seed_people() -> Vec<Person> {
    vec![
        Person::new(1, "Michael", "Weston"),
        Person::new(2, "Fiona", "Glenanne"),
        Person::new(3, "Sam", "Axe"),
        Person::new(4, "Jesse", "Porter"),
        Person::new(5, "Madeline", "Westen"),
        Person::new(6, "Nate", "Westen"),
    ]
}

/// An ordered, read-only collection of people with pairwise-distinct ids.
///
/// # Example
///
/// ```rust
/// use reactive_people::PersonStore;
///
/// let store = PersonStore::new();
/// assert_eq!(store.len(), 6);
/// assert_eq!(store.find(3).map(|p| p.first_name.as_str()), Some("Sam"));
/// assert!(store.find(8).is_none());
/// ```
#[derive(Debug, Clone)]
pub struct PersonStore {
    records: Arc<[Person]>,
}

impl PersonStore {
    /// Create a store holding the seed data.
    pub fn new() -> Self {
        Self {
            records: seed_people().into(),
        }
    }

    /// Create a store from caller-supplied records.
    ///
    /// Fails if two records share an id.
    pub fn from_records(records: Vec<Person>) -> StoreResult<Self> {
        let mut seen = HashSet::with_capacity(records.len());
        for person in &records {
            if !seen.insert(person.id) {
                return Err(StoreError::DuplicateId(person.id));
            }
        }
        Ok(Self {
            records: records.into(),
        })
    }

    /// First record whose id equals `id`.
    pub fn find(&self, id: i32) -> Option<&Person> {
        self.records.iter().find(|p| p.id == id)
    }

    /// All records in store order.
    pub fn records(&self) -> &[Person] {
        &self.records
    }

    /// Shared handle to the records, for producers that outlive a borrow.
    pub(crate) fn shared(&self) -> Arc<[Person]> {
        Arc::clone(&self.records)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over the records in store order.
    pub fn iter(&self) -> impl Iterator<Item = &Person> {
        self.records.iter()
    }
}

impl Default for PersonStore {
    fn default() -> Self {
        Self::new()
    }
}
