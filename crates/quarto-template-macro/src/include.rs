/*
 * include.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Rewriting of `@@INCLUDE@@` and `@@EXTENDS@@` arguments.
//!
//! Only two kinds of references are resolved in an inclusion slot: positional
//! references, and local aliases bound to a plain positional reference
//! (`@@SET@@ X = $1`). Constant aliases and aliases with a default are not
//! honored here. Unresolved slots keep their reference.

use crate::ast::{ContentNode, Definition, IncludeParameters, parameter};
use crate::rewrite::Rewriter;

impl Rewriter<'_> {
    pub(crate) fn rewrite_include_parameters(&self, parameters: &mut IncludeParameters) {
        for slot in parameters.slots_mut() {
            let Some(ContentNode::Var(var)) = slot else {
                continue;
            };
            if var.is_macro_call() {
                continue;
            }

            let position = match var.position {
                Some(position) => Some(position),
                None => match self.scope.get(&var.name) {
                    Some(Definition::Ref(position)) => Some(*position),
                    _ => None,
                },
            };

            if let Some(argument) = position.and_then(|p| parameter(self.parameters, p)) {
                *slot = Some(argument.clone());
            }
        }
    }
}
