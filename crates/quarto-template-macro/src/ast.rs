/*
 * ast.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Template tree types consumed and rewritten by macro expansion.
//!
//! Three tree shapes are involved:
//!
//! - **Content runs** ([`ContentNode`]): ordered text/variable fragments
//!   making up the literal output of one template region.
//! - **Conditions** ([`Condition`]): the operand trees of `@@IF@@` statements.
//! - **Statements** ([`TemplateNode`]): the structure of a template body.
//!
//! Every node is owned by exactly one parent slot. Runs and sequences are
//! plain `Vec`s, so removing a node from a run drops only that node, while
//! dropping a run drops everything it owns. A cloned node never carries its
//! former siblings along.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::config::TagConfig;

/// The number of inclusion arguments a statement can carry (slot 0 excluded).
pub const MAX_INCLUDE_PARAMETERS: usize = 20;

/// A macro body: the statement sequence stored in the registry.
pub type MacroBody = Vec<TemplateNode>;

/// Call-site arguments of a macro, addressed 1-based.
///
/// `None` means no argument is bound at that position, which is distinct
/// from an argument holding empty text.
pub type Parameters = [Option<ContentNode>];

/// Look up the 1-based positional argument `position` in `parameters`.
pub fn parameter(parameters: &Parameters, position: NonZeroUsize) -> Option<&ContentNode> {
    parameters.get(position.get() - 1).and_then(Option::as_ref)
}

/// A fragment of a content run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentNode {
    /// Literal text emitted as-is.
    Text(String),

    /// A variable reference, resolved here or by the renderer.
    Var(VariableRef),
}

impl ContentNode {
    /// Create a literal text fragment.
    pub fn text(value: impl Into<String>) -> Self {
        ContentNode::Text(value.into())
    }

    /// Create a variable fragment.
    pub fn var(var: VariableRef) -> Self {
        ContentNode::Var(var)
    }

    /// The text of this fragment as it would appear in template source.
    ///
    /// Literal text is returned unchanged; variables are written back in tag
    /// form using `tags`.
    pub fn to_template_string(&self, tags: &TagConfig) -> String {
        match self {
            ContentNode::Text(value) => value.clone(),
            ContentNode::Var(var) => var.to_tag_string(tags),
        }
    }
}

/// A formatting filter attached to a variable reference (`@_UPPER:NAME_@`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    /// Filter name, e.g. `UPPER`.
    pub name: String,
    /// Optional filter argument, e.g. `10` in `@_SIZE(10):NAME_@`.
    pub argument: Option<String>,
}

impl Filter {
    /// Create a filter with no argument.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            argument: None,
        }
    }

    /// Create a filter with an argument.
    pub fn with_argument(name: impl Into<String>, argument: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            argument: Some(argument.into()),
        }
    }
}

/// The call part of a macro reference: `@_NAME(arg1,arg2)_@`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MacroCall {
    /// The actual arguments written at the call site.
    pub arguments: Vec<Option<ContentNode>>,

    /// The macro definition attached when the call was parsed.
    ///
    /// `None` when the macro was not registered at parse time; the renderer
    /// then falls back to the undefined-macro handler.
    pub body: Option<MacroBody>,
}

/// A reference to a variable, a positional parameter or a macro.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableRef {
    /// Variable name. Case-sensitive.
    pub name: String,

    /// 1-based positional parameter index (`@_$1_@`), if any.
    pub position: Option<NonZeroUsize>,

    /// Filters to apply to the resolved value, outermost first.
    pub filters: Vec<Filter>,

    /// Present iff this reference is a macro call.
    pub macro_call: Option<MacroCall>,
}

impl VariableRef {
    /// Create a reference to a named variable.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: None,
            filters: Vec::new(),
            macro_call: None,
        }
    }

    /// Create a reference to the positional parameter `position`.
    ///
    /// Position 0 is not a positional reference; the result is then a plain
    /// reference named `$0`.
    pub fn positional(position: usize) -> Self {
        Self {
            name: format!("${position}"),
            position: NonZeroUsize::new(position),
            filters: Vec::new(),
            macro_call: None,
        }
    }

    /// Create a macro call reference.
    pub fn macro_call(
        name: impl Into<String>,
        arguments: Vec<Option<ContentNode>>,
        body: Option<MacroBody>,
    ) -> Self {
        Self {
            name: name.into(),
            position: None,
            filters: Vec::new(),
            macro_call: Some(MacroCall { arguments, body }),
        }
    }

    /// Attach filters to this reference.
    pub fn with_filters(mut self, filters: Vec<Filter>) -> Self {
        self.filters = filters;
        self
    }

    /// Whether this reference calls a macro.
    pub fn is_macro_call(&self) -> bool {
        self.macro_call.is_some()
    }

    /// Render this reference back to tag form, e.g. `@_UPPER:NAME_@`.
    pub fn to_tag_string(&self, tags: &TagConfig) -> String {
        let mut out = String::new();
        out.push_str(&tags.begin);
        for filter in &self.filters {
            out.push_str(&filter.name);
            if let Some(argument) = &filter.argument {
                out.push('(');
                out.push_str(argument);
                out.push(')');
            }
            out.push(':');
        }
        out.push_str(&self.name);
        if let Some(call) = &self.macro_call {
            let arguments: Vec<String> = call
                .arguments
                .iter()
                .map(|arg| {
                    arg.as_ref()
                        .map_or_else(String::new, |node| node.to_template_string(tags))
                })
                .collect();
            out.push('(');
            out.push_str(&arguments.join(","));
            out.push(')');
        }
        out.push_str(&tags.end);
        out
    }
}

/// Binary operators of a condition expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    And,
    Or,
    Xor,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    In,
}

/// Unary operators of a condition expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Not,
}

/// A condition expression tree. Non-leaf nodes own their children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    /// Literal operand.
    Value(String),

    /// Substitutable operand.
    Var(VariableRef),

    Binary {
        op: BinaryOp,
        left: Box<Condition>,
        right: Box<Condition>,
    },

    Unary {
        op: UnaryOp,
        operand: Box<Condition>,
    },
}

impl Condition {
    pub fn value(text: impl Into<String>) -> Self {
        Condition::Value(text.into())
    }

    pub fn var(var: VariableRef) -> Self {
        Condition::Var(var)
    }

    pub fn binary(op: BinaryOp, left: Condition, right: Condition) -> Self {
        Condition::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary(op: UnaryOp, operand: Condition) -> Self {
        Condition::Unary {
            op,
            operand: Box::new(operand),
        }
    }
}

/// What a local `@@SET@@` binding associates with its name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Definition {
    /// `@@SET@@ NAME = value`
    Const(String),

    /// `@@SET@@ NAME = $n`
    Ref(NonZeroUsize),

    /// `@@SET@@ NAME = $n | default`
    RefWithDefault {
        position: NonZeroUsize,
        default: String,
    },
}

/// A local binding statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub name: String,
    pub definition: Definition,
}

impl Binding {
    pub fn new(name: impl Into<String>, definition: Definition) -> Self {
        Self {
            name: name.into(),
            definition,
        }
    }
}

/// The fixed argument array of an `@@INCLUDE@@` or `@@EXTENDS@@` statement.
///
/// Slot 0 holds the included file reference, slots `1..=MAX_INCLUDE_PARAMETERS`
/// hold the inclusion arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncludeParameters {
    slots: [Option<ContentNode>; MAX_INCLUDE_PARAMETERS + 1],
}

impl IncludeParameters {
    /// Create parameters referencing `file` with no arguments.
    pub fn new(file: ContentNode) -> Self {
        let mut slots: [Option<ContentNode>; MAX_INCLUDE_PARAMETERS + 1] =
            std::array::from_fn(|_| None);
        slots[0] = Some(file);
        Self { slots }
    }

    /// Create parameters referencing `file` with the given arguments.
    ///
    /// Arguments beyond [`MAX_INCLUDE_PARAMETERS`] are dropped.
    pub fn with_arguments(
        file: ContentNode,
        arguments: impl IntoIterator<Item = Option<ContentNode>>,
    ) -> Self {
        let mut parameters = Self::new(file);
        for (slot, argument) in parameters.slots[1..].iter_mut().zip(arguments) {
            *slot = argument;
        }
        parameters
    }

    /// The included file reference.
    pub fn file(&self) -> Option<&ContentNode> {
        self.slots[0].as_ref()
    }

    /// The 1-based inclusion argument `index`.
    pub fn argument(&self, index: usize) -> Option<&ContentNode> {
        if index == 0 {
            return None;
        }
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// All slots, file reference first.
    pub fn slots(&self) -> &[Option<ContentNode>] {
        &self.slots
    }

    pub fn slots_mut(&mut self) -> &mut [Option<ContentNode>] {
        &mut self.slots
    }
}

/// A statement of a template body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemplateNode {
    /// A run of literal text and variable fragments.
    Text(Vec<ContentNode>),

    /// `@@IF@@ ... @@ELSE@@ ... @@END_IF@@`
    Conditional {
        condition: Condition,
        then_branch: Vec<TemplateNode>,
        else_branch: Vec<TemplateNode>,
    },

    /// `@@SET@@`: removed from the sequence during expansion.
    Set(Binding),

    /// `@@TABLE@@ ... @@END_TABLE@@`
    Table { body: Vec<TemplateNode> },

    /// `@@SECTION@@` inside a table.
    Section { body: Vec<TemplateNode> },

    /// `@@BEGIN@@ ... @@END@@` block with common part and sections.
    Block {
        common: Vec<TemplateNode>,
        sections: Vec<TemplateNode>,
    },

    /// `@@INLINE(begin)(separator)(end)@@ ... @@END_INLINE@@`
    Inline {
        begin: String,
        separator: String,
        end: String,
        body: Vec<TemplateNode>,
    },

    /// `@@INCLUDE@@ file arg1 arg2 ...`
    Include { parameters: IncludeParameters },

    /// `@@EXTENDS@@ file arg1 ... @@END_EXTENDS@@`
    Extends {
        parameters: IncludeParameters,
        body: Vec<TemplateNode>,
    },

    /// Informational header carrying the template file name.
    Info(String),

    /// Cache bookkeeping: how many times the template has been used.
    CacheInfo { used: usize },
}

impl TemplateNode {
    /// Create a text statement from fragments.
    pub fn text(run: impl IntoIterator<Item = ContentNode>) -> Self {
        TemplateNode::Text(run.into_iter().collect())
    }

    /// Create a `@@SET@@` statement.
    pub fn set(name: impl Into<String>, definition: Definition) -> Self {
        TemplateNode::Set(Binding::new(name, definition))
    }
}
