//! Parse-time variable visibility

use std::collections::BTreeSet;

/// Names visible as variables at the current parse position.
///
/// The set only ever grows. The statement parser declares a line's names
/// after that line's expressions are parsed, so `置 x x` still reads the
/// right-hand `x` as a string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownNames {
    names: BTreeSet<String>,
}

impl KnownNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !name.is_empty() {
            self.names.insert(name);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for KnownNames {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut known = KnownNames::new();
        for name in iter {
            known.declare(name);
        }
        known
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declare_and_lookup() {
        let mut known = KnownNames::new();
        assert!(!known.contains("x"));
        known.declare("x");
        known.declare("x");
        known.declare("");
        assert!(known.contains("x"));
        assert_eq!(known.len(), 1);
    }

    #[test]
    fn test_from_iter() {
        let known: KnownNames = ["a", "b"].into_iter().collect();
        assert_eq!(known.iter().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
