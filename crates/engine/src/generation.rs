use std::fmt;
use uuid::Uuid;

/// Identifies one contiguous replication history on a replica.
///
/// Identifiers are UUIDv7 in simple form, so lexical order is creation order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(String);

impl Generation {
    pub fn new() -> Self {
        Self(Uuid::now_v7().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Generation {
    fn default() -> Self {
        Self::new()
    }
}

impl From<String> for Generation {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for Generation {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_generations_sort_by_creation() {
        let first = Generation::new();
        let second = Generation::new();
        assert!(first < second);
        assert_eq!(first.as_str().len(), 32);
    }
}
