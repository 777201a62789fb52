/*
 * translate.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Seam to the filter/translation subsystem.
//!
//! When a value is injected into a condition operand, the filters attached to
//! the original reference must still apply to it. The rewriter does not know
//! how to run filters; it hands the reference and the raw text to a
//! [`Translator`].

use crate::ast::VariableRef;

/// Applies the filters of a variable reference to a raw value.
pub trait Translator {
    /// Translate `value` as if it were the value of `var`.
    fn translate(&self, var: &VariableRef, value: &str) -> String;
}

/// Translator that returns the value unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTranslator;

impl Translator for IdentityTranslator {
    fn translate(&self, _var: &VariableRef, value: &str) -> String {
        value.to_string()
    }
}

impl<F> Translator for F
where
    F: Fn(&VariableRef, &str) -> String,
{
    fn translate(&self, var: &VariableRef, value: &str) -> String {
        self(var, value)
    }
}
