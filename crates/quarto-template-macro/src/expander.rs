/*
 * expander.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Call-site expansion for the renderer.
//!
//! [`MacroExpander`] is what a renderer holds on to: for every macro call it
//! meets, it either gets back an expanded copy of the registered body or the
//! text produced by the undefined-macro handler.

use std::sync::Arc;

use crate::ast::{ContentNode, MacroBody, VariableRef};
use crate::config::TagConfig;
use crate::fallback::{UndefinedMacroHandler, VerbatimCall};
use crate::registry::MacroRegistry;
use crate::rewrite::rewrite_with;
use crate::translate::{IdentityTranslator, Translator};

/// Result of expanding one macro call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MacroExpansion {
    /// The registered body, rewritten against the call's arguments.
    Body(MacroBody),

    /// No macro is registered under the name; this is the text to emit.
    Undefined(String),
}

/// Expands macro calls against a [`MacroRegistry`].
pub struct MacroExpander {
    registry: Arc<MacroRegistry>,
    handler: Box<dyn UndefinedMacroHandler>,
    translator: Box<dyn Translator + Send + Sync>,
    tags: TagConfig,
}

impl MacroExpander {
    /// Create an expander with the default tags, the verbatim fallback and
    /// no value translation.
    pub fn new(registry: Arc<MacroRegistry>) -> Self {
        Self {
            registry,
            handler: Box::new(VerbatimCall::default()),
            translator: Box::new(IdentityTranslator),
            tags: TagConfig::default(),
        }
    }

    /// Use `tags` when writing references back as text.
    ///
    /// This also resets the undefined-macro handler to a [`VerbatimCall`]
    /// using the same tags; call [`Self::with_handler`] afterwards to
    /// override it.
    pub fn with_tags(mut self, tags: TagConfig) -> Self {
        self.handler = Box::new(VerbatimCall::new(tags.clone()));
        self.tags = tags;
        self
    }

    /// Replace the undefined-macro handler.
    pub fn with_handler(mut self, handler: impl UndefinedMacroHandler + 'static) -> Self {
        self.handler = Box::new(handler);
        self
    }

    /// Replace the translator applied to values injected into conditions.
    pub fn with_translator(
        mut self,
        translator: impl Translator + Send + Sync + 'static,
    ) -> Self {
        self.translator = Box::new(translator);
        self
    }

    /// Expand a call to `name` with the given call-site arguments.
    pub fn expand(&self, name: &str, arguments: &[Option<ContentNode>]) -> MacroExpansion {
        match self.registry.get(name) {
            Some(mut body) => {
                rewrite_with(&mut body, arguments, self.translator.as_ref());
                MacroExpansion::Body(body)
            }
            None => {
                tracing::debug!(name, arguments = arguments.len(), "Macro is not defined");
                let arguments: Vec<String> = arguments
                    .iter()
                    .map(|argument| {
                        argument
                            .as_ref()
                            .map_or_else(String::new, |node| node.to_template_string(&self.tags))
                    })
                    .collect();
                MacroExpansion::Undefined(self.handler.render_undefined(name, &arguments))
            }
        }
    }

    /// Expand a macro call reference.
    ///
    /// Returns `None` if `var` is not a macro call.
    pub fn expand_call(&self, var: &VariableRef) -> Option<MacroExpansion> {
        let call = var.macro_call.as_ref()?;
        Some(self.expand(&var.name, &call.arguments))
    }
}
