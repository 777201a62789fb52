/*
 * condition.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Rewriting of `@@IF@@` condition operands.
//!
//! Operands are substituted the same way as content fragments, with two
//! differences: injected text goes through the [`Translator`] first so the
//! filters of the original reference still apply, and a local alias defined
//! with a default value (`@@SET@@ X = $1 | default`) is left unresolved.
//!
//! [`Translator`]: crate::translate::Translator

use std::num::NonZeroUsize;

use crate::ast::{Condition, ContentNode, Definition, VariableRef, parameter};
use crate::rewrite::Rewriter;

impl Rewriter<'_> {
    /// Rewrite the operands of a condition tree in place.
    pub(crate) fn rewrite_condition(&self, condition: &mut Condition) {
        match condition {
            Condition::Value(_) => {}
            Condition::Var(var) => {
                if let Some(replacement) = self.substitute_operand(var) {
                    *condition = replacement;
                }
            }
            Condition::Binary { left, right, .. } => {
                self.rewrite_condition(left);
                self.rewrite_condition(right);
            }
            Condition::Unary { operand, .. } => self.rewrite_condition(operand),
        }
    }

    fn substitute_operand(&self, var: &VariableRef) -> Option<Condition> {
        if var.is_macro_call() {
            return None;
        }

        if let Some(position) = var.position {
            return Some(self.injected_operand(var, position));
        }

        match self.scope.get(&var.name)? {
            Definition::Const(value) => {
                Some(Condition::Value(self.translator.translate(var, value)))
            }
            Definition::Ref(position) => Some(self.injected_operand(var, *position)),
            Definition::RefWithDefault { .. } => None,
        }
    }

    /// The operand replacing `var` when it stands for the argument at
    /// `position`.
    fn injected_operand(&self, var: &VariableRef, position: NonZeroUsize) -> Condition {
        match parameter(self.parameters, position) {
            Some(ContentNode::Text(value)) => {
                Condition::Value(self.translator.translate(var, value))
            }
            Some(ContentNode::Var(argument)) => {
                // Still unresolved: keep the reference, wrapped in the filters
                // of the operand it replaces.
                let mut injected = argument.clone();
                injected.filters = var
                    .filters
                    .iter()
                    .cloned()
                    .chain(injected.filters)
                    .collect();
                Condition::Var(injected)
            }
            None => Condition::Value(String::new()),
        }
    }
}
