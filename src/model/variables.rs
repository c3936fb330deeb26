//! Variable name registry.

use std::collections::HashMap;

/// Bidirectional mapping between variable names and dense indices.
///
/// Names are registered on first use and receive indices 0, 1, 2, … in
/// insertion order. Once assigned, an index never changes, so constraint
/// and objective terms can refer to variables by index for the lifetime
/// of the problem.
#[derive(Debug, Clone, Default)]
pub struct VarTable {
    index_of: HashMap<String, usize>,
    names: Vec<String>,
}

impl VarTable {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered variables.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no variables have been registered yet.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Returns the index for `name`, registering it if unseen.
    pub fn intern(&mut self, name: &str) -> usize {
        if let Some(&idx) = self.index_of.get(name) {
            return idx;
        }
        let idx = self.names.len();
        self.index_of.insert(name.to_string(), idx);
        self.names.push(name.to_string());
        idx
    }

    /// Returns the index of an already-registered name.
    pub fn index(&self, name: &str) -> Option<usize> {
        self.index_of.get(name).copied()
    }

    /// Returns the name registered for `index`.
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Iterates over registered names in index order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order() {
        let mut vars = VarTable::new();
        assert_eq!(vars.intern("x"), 0);
        assert_eq!(vars.intern("y"), 1);
        assert_eq!(vars.intern("z"), 2);
        assert_eq!(vars.len(), 3);
    }

    #[test]
    fn test_first_seen_wins() {
        let mut vars = VarTable::new();
        let first = vars.intern("x");
        let second = vars.intern("x");
        assert_eq!(first, second);
        assert_eq!(vars.len(), 1);
    }

    #[test]
    fn test_name_lookup() {
        let mut vars = VarTable::new();
        vars.intern("alpha");
        vars.intern("beta");
        assert_eq!(vars.name(0), Some("alpha"));
        assert_eq!(vars.name(1), Some("beta"));
        assert_eq!(vars.name(2), None);
        assert_eq!(vars.index("beta"), Some(1));
        assert_eq!(vars.index("gamma"), None);
    }

    #[test]
    fn test_iter_order() {
        let mut vars = VarTable::new();
        vars.intern("c");
        vars.intern("a");
        vars.intern("b");
        let names: Vec<&str> = vars.iter().collect();
        assert_eq!(names, ["c", "a", "b"]);
    }
}
