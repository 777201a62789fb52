/*
 * scope.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Local bindings collected during one expansion.
//!
//! A `@@SET@@` statement binds a name for everything traversed after it in
//! depth-first, textual order. That includes statements nested inside later
//! conditional branches or tables: bindings are not block-scoped. One
//! [`ScopeMap`] is therefore shared by the whole walk of a macro body.

use std::collections::HashMap;

use crate::ast::{Binding, Definition};

/// Order-sensitive map from local alias names to their definitions.
///
/// Names are case-sensitive. Redefining a name replaces the earlier
/// definition.
#[derive(Debug, Default)]
pub(crate) struct ScopeMap {
    definitions: HashMap<String, Definition>,
}

impl ScopeMap {
    /// Create an empty scope.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `definition`, replacing any earlier binding.
    pub(crate) fn define(&mut self, name: impl Into<String>, definition: Definition) {
        let name = name.into();
        tracing::trace!(name = %name, ?definition, "Binding local alias");
        self.definitions.insert(name, definition);
    }

    /// Take over the definition of a removed `@@SET@@` statement.
    pub(crate) fn bind(&mut self, binding: Binding) {
        self.define(binding.name, binding.definition);
    }

    /// Look up the definition bound to `name`.
    pub(crate) fn get(&self, name: &str) -> Option<&Definition> {
        self.definitions.get(name)
    }

    /// Drop every definition still held, returning how many were released.
    pub(crate) fn release(self) -> usize {
        let released = self.definitions.len();
        tracing::trace!(released, "Releasing local definitions");
        released
    }
}
