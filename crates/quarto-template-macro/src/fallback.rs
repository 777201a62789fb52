/*
 * fallback.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Output for calls to macros that have no registered body.
//!
//! Instead of failing, the renderer asks an [`UndefinedMacroHandler`] what to
//! emit. The default, [`VerbatimCall`], writes the call back as it appeared
//! in the template, which makes an undefined macro easy to spot in the output.

use crate::config::TagConfig;

/// Renders a call to a macro that is not registered.
pub trait UndefinedMacroHandler: Send + Sync {
    /// Produce the output for `name` called with textual `arguments`.
    fn render_undefined(&self, name: &str, arguments: &[String]) -> String;
}

/// Reproduces the call syntax verbatim: `@_NAME(arg1,arg2)_@`.
#[derive(Debug, Clone, Default)]
pub struct VerbatimCall {
    tags: TagConfig,
}

impl VerbatimCall {
    pub fn new(tags: TagConfig) -> Self {
        Self { tags }
    }
}

impl UndefinedMacroHandler for VerbatimCall {
    fn render_undefined(&self, name: &str, arguments: &[String]) -> String {
        format!(
            "{}{}({}){}",
            self.tags.begin,
            name,
            arguments.join(","),
            self.tags.end
        )
    }
}

impl<F> UndefinedMacroHandler for F
where
    F: Fn(&str, &[String]) -> String + Send + Sync,
{
    fn render_undefined(&self, name: &str, arguments: &[String]) -> String {
        self(name, arguments)
    }
}
