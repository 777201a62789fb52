/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Macro registry and call-site expansion for text templates.
//!
//! A macro is a named, parameterized template body registered ahead of use.
//! Each call site (`@_NAME(arg1,arg2)_@`) is expanded by rewriting a copy of
//! the body against the call's arguments:
//!
//! - Positional references: `@_$1_@`, `@_$2_@`, ...
//! - Local aliases: `@@SET@@ NAME = value`, `@@SET@@ NAME = $1`,
//!   `@@SET@@ NAME = $1 | default`
//! - Condition operands of `@@IF@@` and arguments of `@@INCLUDE@@` /
//!   `@@EXTENDS@@`
//! - Nested macro calls, expanded against the enclosing call's arguments
//!
//! # Architecture
//!
//! This crate neither parses nor renders. The parser hands it trees built
//! from the [`ast`] types; the renderer asks a [`MacroExpander`] for each
//! call and walks the result. Filters on injected condition values are run
//! through a [`Translator`] supplied by the caller, and calls to unknown
//! macros are turned into text by an [`UndefinedMacroHandler`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use quarto_template_macro::{
//!     ContentNode, MacroExpander, MacroExpansion, MacroRegistry, TemplateNode, VariableRef,
//! };
//!
//! let registry = Arc::new(MacroRegistry::new());
//! registry
//!     .register(
//!         "BOLD",
//!         vec![TemplateNode::text([
//!             ContentNode::text("<b>"),
//!             ContentNode::var(VariableRef::positional(1)),
//!             ContentNode::text("</b>"),
//!         ])],
//!     )
//!     .unwrap();
//!
//! let expander = MacroExpander::new(registry);
//! let expansion = expander.expand("bold", &[Some(ContentNode::text("hi"))]);
//! assert_eq!(
//!     expansion,
//!     MacroExpansion::Body(vec![TemplateNode::text([
//!         ContentNode::text("<b>"),
//!         ContentNode::text("hi"),
//!         ContentNode::text("</b>"),
//!     ])])
//! );
//! ```

pub mod ast;
mod condition;
pub mod config;
pub mod error;
pub mod expander;
pub mod fallback;
mod include;
pub mod registry;
pub mod rewrite;
mod scope;
pub mod translate;

// Re-export main types at crate root
pub use ast::{
    BinaryOp, Binding, Condition, ContentNode, Definition, Filter, IncludeParameters,
    MAX_INCLUDE_PARAMETERS, MacroBody, MacroCall, Parameters, TemplateNode, UnaryOp, VariableRef,
};
pub use config::TagConfig;
pub use error::{MacroError, MacroResult};
pub use expander::{MacroExpander, MacroExpansion};
pub use fallback::{UndefinedMacroHandler, VerbatimCall};
pub use registry::MacroRegistry;
pub use rewrite::{rewrite, rewrite_with};
pub use translate::{IdentityTranslator, Translator};
