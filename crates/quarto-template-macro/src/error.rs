/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for macro registration.
//!
//! Expansion itself has no error surface: missing macros, missing arguments
//! and unresolved names are all handled as part of normal rewriting.

use thiserror::Error;

/// Errors that can occur when registering macros.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MacroError {
    /// A macro was registered without a body.
    #[error("Macro '{name}' has an empty body")]
    EmptyBody { name: String },

    /// A macro was registered under an empty name.
    #[error("Macro name must not be empty")]
    InvalidName,
}

/// Result type for macro operations.
pub type MacroResult<T> = Result<T, MacroError>;
