/*
 * config.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Tag delimiter configuration.

use serde::{Deserialize, Serialize};

/// The delimiters surrounding a variable tag in template source.
///
/// Used wherever a reference has to be written back as text, most notably
/// by the undefined-macro fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagConfig {
    /// Opening delimiter, `@_` by default.
    pub begin: String,
    /// Closing delimiter, `_@` by default.
    pub end: String,
}

impl TagConfig {
    pub fn new(begin: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            begin: begin.into(),
            end: end.into(),
        }
    }
}

impl Default for TagConfig {
    fn default() -> Self {
        Self::new("@_", "_@")
    }
}
