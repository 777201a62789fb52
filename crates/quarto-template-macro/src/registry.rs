/*
 * registry.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Registry of named macro bodies.
//!
//! Names are matched case-insensitively. The registry is an ordinary value:
//! create one, register the macros produced by the parser, and share it
//! (typically behind an `Arc`) with whoever renders templates. Lookups may
//! run concurrently; registration takes an exclusive lock.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::ast::MacroBody;
use crate::error::{MacroError, MacroResult};

#[derive(Debug)]
struct RegisteredMacro {
    /// Name as given at registration.
    name: String,
    body: MacroBody,
}

/// Name → body mapping for macros.
#[derive(Debug, Default)]
pub struct MacroRegistry {
    macros: RwLock<HashMap<String, RegisteredMacro>>,
}

fn key(name: &str) -> String {
    name.to_lowercase()
}

impl MacroRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, RegisteredMacro>> {
        self.macros.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, RegisteredMacro>> {
        self.macros.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register `body` under `name`, replacing any macro already registered
    /// under the same name (compared case-insensitively).
    ///
    /// # Errors
    /// - [`MacroError::InvalidName`] if `name` is empty.
    /// - [`MacroError::EmptyBody`] if `body` has no statements.
    pub fn register(&self, name: impl Into<String>, body: MacroBody) -> MacroResult<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(MacroError::InvalidName);
        }
        if body.is_empty() {
            return Err(MacroError::EmptyBody { name });
        }

        let mut macros = self.write();
        let key = key(&name);
        // Drop the old body before storing the new one.
        if let Some(previous) = macros.remove(&key) {
            tracing::debug!(name = %name, previous = %previous.name, "Replacing macro definition");
        } else {
            tracing::debug!(name = %name, statements = body.len(), "Registering macro");
        }
        macros.insert(key, RegisteredMacro { name, body });
        Ok(())
    }

    /// A copy of the body registered under `name`, if any.
    ///
    /// The copy is owned by the caller, which is expected to expand it in
    /// place with [`crate::rewrite`].
    pub fn get(&self, name: &str) -> Option<MacroBody> {
        self.read().get(&key(name)).map(|m| m.body.clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().contains_key(&key(name))
    }

    /// Snapshot of all registered macros, sorted by name.
    pub fn entries(&self) -> Vec<(String, MacroBody)> {
        let mut entries: Vec<(String, MacroBody)> = self
            .read()
            .values()
            .map(|m| (m.name.clone(), m.body.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Names of all registered macros, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().values().map(|m| m.name.clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ContentNode, TemplateNode};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn body(text: &str) -> MacroBody {
        vec![TemplateNode::text([ContentNode::text(text)])]
    }

    #[test]
    fn test_register_and_get() {
        let registry = MacroRegistry::new();
        registry.register("BOLD", body("<b>")).unwrap();
        assert_eq!(registry.get("BOLD"), Some(body("<b>")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = MacroRegistry::new();
        registry.register("Bold", body("<b>")).unwrap();
        assert_eq!(registry.get("BOLD"), Some(body("<b>")));
        assert_eq!(registry.get("bold"), Some(body("<b>")));
        assert!(registry.contains("bOlD"));
    }

    #[test]
    fn test_missing_macro() {
        let registry = MacroRegistry::new();
        assert!(registry.get("NOPE").is_none());
        assert!(!registry.contains("NOPE"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_reregister_replaces_body() {
        let registry = MacroRegistry::new();
        registry.register("M", body("first")).unwrap();
        registry.register("m", body("second")).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("M"), Some(body("second")));
        assert_eq!(registry.names(), vec!["m".to_string()]);
    }

    #[test]
    fn test_get_returns_independent_copy() {
        let registry = MacroRegistry::new();
        registry.register("M", body("stored")).unwrap();
        let mut copy = registry.get("M").unwrap();
        copy.clear();
        assert_eq!(registry.get("M"), Some(body("stored")));
    }

    #[test]
    fn test_empty_body_is_rejected() {
        let registry = MacroRegistry::new();
        assert_eq!(
            registry.register("M", Vec::new()),
            Err(MacroError::EmptyBody {
                name: "M".to_string()
            })
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let registry = MacroRegistry::new();
        assert_eq!(registry.register("", body("x")), Err(MacroError::InvalidName));
    }

    #[test]
    fn test_entries_sorted_snapshot() {
        let registry = MacroRegistry::new();
        registry.register("ZETA", body("z")).unwrap();
        registry.register("ALPHA", body("a")).unwrap();

        let entries = registry.entries();
        assert_eq!(
            entries,
            vec![
                ("ALPHA".to_string(), body("a")),
                ("ZETA".to_string(), body("z")),
            ]
        );

        // Snapshot is not affected by later registrations.
        registry.register("BETA", body("b")).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_concurrent_readers_and_writer() {
        let registry = Arc::new(MacroRegistry::new());
        registry.register("SHARED", body("v")).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    registry.register(format!("M{i}"), body("x")).unwrap();
                    registry.get("shared")
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), Some(body("v")));
        }
        assert_eq!(registry.len(), 5);
    }
}
