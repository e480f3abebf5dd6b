//! The person record served by the repository.

use std::fmt;

/// A person record: an id unique within its store plus a name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Person {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
}

impl Person {
    /// Create a record.
    pub fn new(id: i32, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    /// "First Last"
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} (#{})", self.first_name, self.last_name, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let person = Person::new(2, "Fiona", "Glenanne");
        assert_eq!(person.to_string(), "Fiona Glenanne (#2)");
        assert_eq!(person.full_name(), "Fiona Glenanne");
    }
}
