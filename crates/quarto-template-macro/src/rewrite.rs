/*
 * rewrite.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Macro body expansion.
//!
//! [`rewrite`] instantiates a macro body against the actual arguments of one
//! call site. The body is mutated in place:
//!
//! - positional references (`@_$1_@`) are replaced by a copy of the matching
//!   argument, or removed when no argument is bound at that position;
//! - `@@SET@@` statements are removed and their definitions recorded in a
//!   scope map shared by the rest of the walk;
//! - references to those local aliases are replaced according to their
//!   definition;
//! - nested macro calls are expanded against the same arguments;
//! - every other reference is left for the renderer to resolve.
//!
//! Condition operands and inclusion arguments follow slightly different
//! rules, implemented alongside in `condition.rs` and `include.rs`.

use std::num::NonZeroUsize;

use crate::ast::{
    ContentNode, Definition, MacroBody, Parameters, TemplateNode, VariableRef, parameter,
};
use crate::scope::ScopeMap;
use crate::translate::{IdentityTranslator, Translator};

/// Expand `body` in place against `parameters`.
///
/// Values injected into condition operands are passed through unchanged.
pub fn rewrite(body: &mut MacroBody, parameters: &Parameters) {
    rewrite_with(body, parameters, &IdentityTranslator);
}

/// Expand `body` in place against `parameters`, running values injected into
/// condition operands through `translator`.
pub fn rewrite_with(body: &mut MacroBody, parameters: &Parameters, translator: &dyn Translator) {
    let mut rewriter = Rewriter::new(parameters, translator);
    rewriter.rewrite_nodes(body);
    rewriter.finish();
}

/// What happens to a variable fragment of a content run.
enum Substitution {
    Keep,
    Replace(ContentNode),
    Delete,
}

/// State of one expansion: the call's arguments and the local bindings seen
/// so far.
pub(crate) struct Rewriter<'a> {
    pub(crate) parameters: &'a Parameters,
    pub(crate) translator: &'a dyn Translator,
    pub(crate) scope: ScopeMap,
}

impl<'a> Rewriter<'a> {
    pub(crate) fn new(parameters: &'a Parameters, translator: &'a dyn Translator) -> Self {
        Self {
            parameters,
            translator,
            scope: ScopeMap::new(),
        }
    }

    /// Release the definitions collected during the walk.
    pub(crate) fn finish(self) {
        self.scope.release();
    }

    /// Rewrite a statement sequence, consuming its `@@SET@@` statements.
    pub(crate) fn rewrite_nodes(&mut self, nodes: &mut Vec<TemplateNode>) {
        let original = std::mem::take(nodes);
        nodes.reserve(original.len());

        for node in original {
            match node {
                TemplateNode::Set(binding) => self.scope.bind(binding),
                mut other => {
                    self.rewrite_node(&mut other);
                    nodes.push(other);
                }
            }
        }
    }

    fn rewrite_node(&mut self, node: &mut TemplateNode) {
        match node {
            TemplateNode::Text(run) => self.rewrite_content(run),

            TemplateNode::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                self.rewrite_condition(condition);
                self.rewrite_nodes(then_branch);
                self.rewrite_nodes(else_branch);
            }

            // Consumed by rewrite_nodes before reaching here.
            TemplateNode::Set(_) => {}

            TemplateNode::Table { body }
            | TemplateNode::Section { body }
            | TemplateNode::Inline { body, .. } => self.rewrite_nodes(body),

            TemplateNode::Block { common, sections } => {
                self.rewrite_nodes(common);
                self.rewrite_nodes(sections);
            }

            TemplateNode::Include { parameters } => self.rewrite_include_parameters(parameters),

            TemplateNode::Extends { parameters, body } => {
                self.rewrite_include_parameters(parameters);
                self.rewrite_nodes(body);
            }

            TemplateNode::Info(_) | TemplateNode::CacheInfo { .. } => {}
        }
    }

    /// Rewrite one content run.
    pub(crate) fn rewrite_content(&self, run: &mut Vec<ContentNode>) {
        let original = std::mem::take(run);
        run.reserve(original.len());

        for node in original {
            match node {
                ContentNode::Var(mut var) => match self.substitute_content(&mut var) {
                    Substitution::Keep => run.push(ContentNode::Var(var)),
                    Substitution::Replace(replacement) => {
                        tracing::trace!(name = %var.name, "Substituted variable");
                        run.push(replacement);
                    }
                    Substitution::Delete => {
                        tracing::trace!(name = %var.name, "Removed unbound positional reference");
                    }
                },
                text => run.push(text),
            }
        }
    }

    fn substitute_content(&self, var: &mut VariableRef) -> Substitution {
        if let Some(call) = &mut var.macro_call {
            // Nested calls see the enclosing call's arguments, with a scope of
            // their own.
            if let Some(body) = &mut call.body {
                rewrite_with(body, self.parameters, self.translator);
            }
            return Substitution::Keep;
        }

        if let Some(position) = var.position {
            return match parameter(self.parameters, position) {
                Some(argument) => Substitution::Replace(argument.clone()),
                None => Substitution::Delete,
            };
        }

        match self.scope.get(&var.name) {
            Some(Definition::Const(value)) => {
                Substitution::Replace(ContentNode::text(value.clone()))
            }
            Some(Definition::Ref(position)) => {
                Substitution::Replace(self.argument_or(*position, String::new()))
            }
            Some(Definition::RefWithDefault { position, default }) => {
                Substitution::Replace(self.argument_or(*position, default.clone()))
            }
            None => Substitution::Keep,
        }
    }

    /// A copy of the argument at `position`, or literal `fallback` text.
    fn argument_or(&self, position: NonZeroUsize, fallback: String) -> ContentNode {
        parameter(self.parameters, position)
            .cloned()
            .unwrap_or(ContentNode::Text(fallback))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Condition, IncludeParameters};
    use pretty_assertions::assert_eq;

    fn pos(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    fn text(value: &str) -> ContentNode {
        ContentNode::text(value)
    }

    fn var(name: &str) -> ContentNode {
        ContentNode::var(VariableRef::named(name))
    }

    fn positional(n: usize) -> ContentNode {
        ContentNode::var(VariableRef::positional(n))
    }

    fn args(values: &[&str]) -> Vec<Option<ContentNode>> {
        values.iter().map(|v| Some(text(v))).collect()
    }

    // ========================================================================
    // Positional parameters
    // ========================================================================

    #[test]
    fn test_positional_substitution() {
        let mut body = vec![TemplateNode::text([positional(1), text("-"), positional(2)])];
        rewrite(&mut body, &args(&["A", "B"]));
        assert_eq!(body, vec![TemplateNode::text([text("A"), text("-"), text("B")])]);
    }

    #[test]
    fn test_positional_argument_can_be_a_variable() {
        let mut body = vec![TemplateNode::text([text("<"), positional(1), text(">")])];
        let parameters = vec![Some(var("TITLE"))];
        rewrite(&mut body, &parameters);
        assert_eq!(body, vec![TemplateNode::text([text("<"), var("TITLE"), text(">")])]);
    }

    #[test]
    fn test_positional_without_parameters_is_removed() {
        let mut body = vec![TemplateNode::text([
            positional(1),
            text("kept"),
            positional(2),
            positional(3),
        ])];
        rewrite(&mut body, &[]);
        assert_eq!(body, vec![TemplateNode::text([text("kept")])]);
    }

    #[test]
    fn test_absent_positional_is_removed() {
        let mut body = vec![TemplateNode::text([text("a"), positional(2), text("b")])];
        let parameters = vec![Some(text("first")), None];
        rewrite(&mut body, &parameters);
        assert_eq!(body, vec![TemplateNode::text([text("a"), text("b")])]);
    }

    #[test]
    fn test_empty_text_argument_is_not_absent() {
        let mut body = vec![TemplateNode::text([positional(1)])];
        rewrite(&mut body, &args(&[""]));
        assert_eq!(body, vec![TemplateNode::text([text("")])]);
    }

    #[test]
    fn test_same_argument_spliced_twice() {
        let mut body = vec![TemplateNode::text([positional(1), positional(1)])];
        rewrite(&mut body, &args(&["x"]));

        let TemplateNode::Text(run) = &mut body[0] else {
            panic!("expected text");
        };
        run[0] = text("changed");
        assert_eq!(run[1], text("x"));
    }

    #[test]
    fn test_unresolved_variable_is_kept() {
        let mut body = vec![TemplateNode::text([var("GLOBAL"), positional(1)])];
        rewrite(&mut body, &args(&["v"]));
        assert_eq!(body, vec![TemplateNode::text([var("GLOBAL"), text("v")])]);
    }

    // ========================================================================
    // Local bindings
    // ========================================================================

    #[test]
    fn test_set_statement_is_removed() {
        let mut body = vec![
            TemplateNode::set("x", Definition::Const("hi".to_string())),
            TemplateNode::text([var("x")]),
        ];
        rewrite(&mut body, &[]);
        assert_eq!(body, vec![TemplateNode::text([text("hi")])]);
    }

    #[test]
    fn test_consecutive_set_statements() {
        let mut body = vec![
            TemplateNode::set("a", Definition::Const("1".to_string())),
            TemplateNode::set("b", Definition::Const("2".to_string())),
            TemplateNode::text([var("a"), var("b")]),
        ];
        rewrite(&mut body, &[]);
        assert_eq!(body, vec![TemplateNode::text([text("1"), text("2")])]);
    }

    #[test]
    fn test_binding_only_applies_after_definition() {
        let mut body = vec![
            TemplateNode::text([var("x")]),
            TemplateNode::set("x", Definition::Const("late".to_string())),
            TemplateNode::text([var("x")]),
        ];
        rewrite(&mut body, &[]);
        assert_eq!(
            body,
            vec![TemplateNode::text([var("x")]), TemplateNode::text([text("late")])]
        );
    }

    #[test]
    fn test_binding_visible_in_later_branch() {
        let mut body = vec![
            TemplateNode::set("x", Definition::Const("hi".to_string())),
            TemplateNode::Conditional {
                condition: Condition::value("TRUE"),
                then_branch: vec![TemplateNode::text([var("x")])],
                else_branch: vec![],
            },
        ];
        rewrite(&mut body, &[]);
        assert_eq!(
            body,
            vec![TemplateNode::Conditional {
                condition: Condition::value("TRUE"),
                then_branch: vec![TemplateNode::text([text("hi")])],
                else_branch: vec![],
            }]
        );
    }

    #[test]
    fn test_binding_inside_branch_leaks_to_following_statements() {
        let mut body = vec![
            TemplateNode::Conditional {
                condition: Condition::value("TRUE"),
                then_branch: vec![TemplateNode::set("x", Definition::Const("then".to_string()))],
                else_branch: vec![TemplateNode::text([var("x")])],
            },
            TemplateNode::text([var("x")]),
        ];
        rewrite(&mut body, &[]);
        assert_eq!(
            body,
            vec![
                TemplateNode::Conditional {
                    condition: Condition::value("TRUE"),
                    then_branch: vec![],
                    else_branch: vec![TemplateNode::text([text("then")])],
                },
                TemplateNode::text([text("then")]),
            ]
        );
    }

    #[test]
    fn test_redefinition_last_write_wins() {
        let mut body = vec![
            TemplateNode::set("x", Definition::Const("one".to_string())),
            TemplateNode::text([var("x")]),
            TemplateNode::set("x", Definition::Const("two".to_string())),
            TemplateNode::text([var("x")]),
        ];
        rewrite(&mut body, &[]);
        assert_eq!(
            body,
            vec![TemplateNode::text([text("one")]), TemplateNode::text([text("two")])]
        );
    }

    #[test]
    fn test_ref_binding() {
        let mut body = vec![
            TemplateNode::set("label", Definition::Ref(pos(2))),
            TemplateNode::text([var("label")]),
        ];
        rewrite(&mut body, &args(&["a", "b"]));
        assert_eq!(body, vec![TemplateNode::text([text("b")])]);
    }

    #[test]
    fn test_ref_binding_absent_is_empty_text() {
        let mut body = vec![
            TemplateNode::set("label", Definition::Ref(pos(2))),
            TemplateNode::text([var("label")]),
        ];
        rewrite(&mut body, &args(&["a"]));
        assert_eq!(body, vec![TemplateNode::text([text("")])]);
    }

    #[test]
    fn test_ref_with_default_uses_argument() {
        let mut body = vec![
            TemplateNode::set(
                "label",
                Definition::RefWithDefault {
                    position: pos(1),
                    default: "fallback".to_string(),
                },
            ),
            TemplateNode::text([var("label")]),
        ];
        rewrite(&mut body, &args(&["given"]));
        assert_eq!(body, vec![TemplateNode::text([text("given")])]);
    }

    #[test]
    fn test_ref_with_default_falls_back() {
        let mut body = vec![
            TemplateNode::set(
                "label",
                Definition::RefWithDefault {
                    position: pos(1),
                    default: "fallback".to_string(),
                },
            ),
            TemplateNode::text([var("label")]),
        ];
        rewrite(&mut body, &[None]);
        assert_eq!(body, vec![TemplateNode::text([text("fallback")])]);
    }

    // ========================================================================
    // Nested structures
    // ========================================================================

    #[test]
    fn test_nested_macro_uses_enclosing_arguments() {
        let inner = vec![TemplateNode::text([text("["), positional(1), text("]")])];
        let call = VariableRef::macro_call("INNER", vec![Some(text("ignored"))], Some(inner));
        let mut body = vec![TemplateNode::text([ContentNode::var(call)])];

        rewrite(&mut body, &args(&["outer"]));

        let TemplateNode::Text(run) = &body[0] else {
            panic!("expected text");
        };
        let ContentNode::Var(var) = &run[0] else {
            panic!("expected macro call to be kept");
        };
        let call = var.macro_call.as_ref().unwrap();
        assert_eq!(
            call.body,
            Some(vec![TemplateNode::text([text("["), text("outer"), text("]")])])
        );
        assert_eq!(call.arguments, vec![Some(text("ignored"))]);
    }

    #[test]
    fn test_nested_macro_has_its_own_scope() {
        let inner = vec![
            TemplateNode::set("x", Definition::Const("inner".to_string())),
            TemplateNode::text([var("x")]),
        ];
        let call = VariableRef::macro_call("INNER", vec![], Some(inner));
        let mut body = vec![
            TemplateNode::text([ContentNode::var(call)]),
            TemplateNode::text([var("x")]),
        ];
        rewrite(&mut body, &[]);
        assert_eq!(body[1], TemplateNode::text([var("x")]));
    }

    #[test]
    fn test_undefined_nested_macro_is_kept() {
        let call = VariableRef::macro_call("MISSING", vec![Some(positional(1))], None);
        let mut body = vec![TemplateNode::text([ContentNode::var(call.clone())])];
        rewrite(&mut body, &args(&["a"]));
        assert_eq!(body, vec![TemplateNode::text([ContentNode::var(call)])]);
    }

    #[test]
    fn test_recurses_into_wrappers() {
        let mut body = vec![
            TemplateNode::Table {
                body: vec![TemplateNode::Section {
                    body: vec![TemplateNode::text([positional(1)])],
                }],
            },
            TemplateNode::Block {
                common: vec![TemplateNode::text([positional(1)])],
                sections: vec![TemplateNode::text([positional(2)])],
            },
            TemplateNode::Inline {
                begin: "(".to_string(),
                separator: ",".to_string(),
                end: ")".to_string(),
                body: vec![TemplateNode::text([positional(2)])],
            },
        ];
        rewrite(&mut body, &args(&["a", "b"]));
        assert_eq!(
            body,
            vec![
                TemplateNode::Table {
                    body: vec![TemplateNode::Section {
                        body: vec![TemplateNode::text([text("a")])],
                    }],
                },
                TemplateNode::Block {
                    common: vec![TemplateNode::text([text("a")])],
                    sections: vec![TemplateNode::text([text("b")])],
                },
                TemplateNode::Inline {
                    begin: "(".to_string(),
                    separator: ",".to_string(),
                    end: ")".to_string(),
                    body: vec![TemplateNode::text([text("b")])],
                },
            ]
        );
    }

    #[test]
    fn test_extends_rewrites_parameters_and_body() {
        let mut body = vec![TemplateNode::Extends {
            parameters: IncludeParameters::with_arguments(
                text("base.tmplt"),
                [Some(positional(1))],
            ),
            body: vec![TemplateNode::text([positional(2)])],
        }];
        rewrite(&mut body, &args(&["a", "b"]));
        assert_eq!(
            body,
            vec![TemplateNode::Extends {
                parameters: IncludeParameters::with_arguments(
                    text("base.tmplt"),
                    [Some(text("a"))],
                ),
                body: vec![TemplateNode::text([text("b")])],
            }]
        );
    }

    #[test]
    fn test_informational_nodes_untouched() {
        let mut body = vec![
            TemplateNode::Info("page.tmplt".to_string()),
            TemplateNode::CacheInfo { used: 3 },
        ];
        let expected = body.clone();
        rewrite(&mut body, &args(&["a"]));
        assert_eq!(body, expected);
    }

    #[test]
    fn test_text_only_body_untouched() {
        let mut body = vec![TemplateNode::text([text("plain"), text(" text")])];
        let expected = body.clone();
        rewrite(&mut body, &args(&["a"]));
        assert_eq!(body, expected);
    }
}
