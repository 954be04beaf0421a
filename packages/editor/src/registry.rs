//! # Reference Registry
//!
//! Maps component names to the section currently holding them. Operations
//! address components by name, so lookups survive reordering; the registry
//! never owns a component, it only records where to find one.

use std::collections::HashMap;

#[derive(Debug, Default, Clone)]
pub struct Registry {
    entries: HashMap<String, String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `name` as living in `section`; returns the previous section
    pub fn register(
        &mut self,
        name: impl Into<String>,
        section: impl Into<String>,
    ) -> Option<String> {
        self.entries.insert(name.into(), section.into())
    }

    pub fn deregister(&mut self, name: &str) -> Option<String> {
        self.entries.remove(name)
    }

    /// Section holding `name`, if registered
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let mut registry = Registry::new();
        registry.register("c1", "s1");

        assert_eq!(registry.lookup("c1"), Some("s1"));
        assert!(registry.contains("c1"));
        assert_eq!(registry.lookup("missing"), None);
    }

    #[test]
    fn test_deregister() {
        let mut registry = Registry::new();
        registry.register("c1", "s1");

        assert_eq!(registry.deregister("c1"), Some("s1".to_string()));
        assert_eq!(registry.deregister("c1"), None);
        assert!(!registry.contains("c1"));
    }
}
