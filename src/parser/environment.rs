//! Lexically scoped name table
//!
//! Maps label names to whatever the caller attaches to them. Each
//! [`Environment::nest`] opens a scope and [`Environment::unnest`] discards it
//! along with every name defined inside, so block-local names never leak to
//! the enclosing code. The outermost scope is never discarded.

use rustc_hash::FxHashMap;

#[derive(Debug, Clone)]
pub struct Environment<T> {
    scopes: Vec<FxHashMap<String, T>>,
}

impl<T> Environment<T> {
    pub fn new() -> Self {
        Environment {
            scopes: vec![FxHashMap::default()],
        }
    }

    /// Enter a nested scope
    pub fn nest(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    /// Leave the innermost scope. The outermost one stays.
    pub fn unnest(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Bind `name` in the innermost scope, replacing any earlier binding there
    pub fn define(&mut self, name: impl Into<String>, value: T) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.into(), value);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Innermost binding of `name`
    pub fn get(&self, name: &str) -> Option<&T> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Every visible name, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .scopes
            .iter()
            .flat_map(|scope| scope.keys().map(String::as_str))
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    pub fn depth(&self) -> usize {
        self.scopes.len() - 1
    }

    pub fn len(&self) -> usize {
        self.names().len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.iter().all(|scope| scope.is_empty())
    }
}

impl<T> Default for Environment<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_names_do_not_leak() {
        let mut env = Environment::new();
        env.define("main", 1);

        env.nest();
        env.define("local", 2);
        assert!(env.contains("main"));
        assert!(env.contains("local"));
        assert_eq!(env.depth(), 1);
        env.unnest();

        assert!(env.contains("main"));
        assert!(!env.contains("local"));
        assert_eq!(env.depth(), 0);
    }

    #[test]
    fn test_shadowing_is_undone() {
        let mut env = Environment::new();
        env.define("f", "outer");
        env.nest();
        env.define("f", "inner");
        assert_eq!(env.get("f"), Some(&"inner"));
        env.unnest();
        assert_eq!(env.get("f"), Some(&"outer"));
    }

    #[test]
    fn test_redefinition_replaces() {
        let mut env = Environment::new();
        env.define("f", None);
        env.define("f", Some(3));
        assert_eq!(env.get("f"), Some(&Some(3)));
        assert_eq!(env.len(), 1);
    }

    #[test]
    fn test_outermost_scope_survives_unnest() {
        let mut env: Environment<()> = Environment::new();
        env.define("keep", ());
        env.unnest();
        env.unnest();
        assert!(env.contains("keep"));
        assert_eq!(env.names(), vec!["keep"]);
    }
}
