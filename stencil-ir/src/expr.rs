//! Type expressions in their normalized shape.

use serde::{Deserialize, Serialize};

use crate::decl::Attr;

/// A type expression: the normalized node plus the original surface syntax,
/// retained so generated signatures can pass it through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeExpr {
    pub node: TypeNode,
    pub src: Option<String>,
}

impl TypeExpr {
    pub fn new(node: TypeNode) -> Self {
        Self { node, src: None }
    }

    pub fn with_src(mut self, src: impl Into<String>) -> Self {
        self.src = Some(src.into());
        self
    }

    /// Reference to a named (possibly parameterized) type.
    pub fn opaque(name: impl Into<String>, args: Vec<TypeExpr>) -> Self {
        Self::new(TypeNode::Opaque(name.into(), args))
    }

    /// Reference to one of the enclosing declaration's formal parameters.
    pub fn var(name: impl Into<String>) -> Self {
        Self::new(TypeNode::Var(name.into()))
    }

    pub fn tuple(elems: Vec<TypeExpr>) -> Self {
        Self::new(TypeNode::Tuple(elems))
    }

    /// An inline open-sum literal.
    pub fn polyvariant(cases: Vec<PolyCase>) -> Self {
        Self::new(TypeNode::Polyvariant(cases))
    }
}

/// Normalized shape of a type expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeNode {
    /// Named reference with type arguments.
    Opaque(String, Vec<TypeExpr>),
    /// Type-variable reference.
    Var(String),
    /// Ordered tuple.
    Tuple(Vec<TypeExpr>),
    /// Inline open-sum literal.
    Polyvariant(Vec<PolyCase>),
}

/// One case of an open sum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PolyCase {
    /// A local tag with an ordered payload.
    Construct {
        tag: String,
        attrs: Vec<Attr>,
        args: Vec<TypeExpr>,
    },
    /// Structural inclusion: imports every tag of another open-sum type.
    Inherit { name: String, args: Vec<TypeExpr> },
}

impl PolyCase {
    pub fn construct(tag: impl Into<String>, args: Vec<TypeExpr>) -> Self {
        Self::Construct {
            tag: tag.into(),
            attrs: Vec::new(),
            args,
        }
    }

    pub fn inherit(name: impl Into<String>, args: Vec<TypeExpr>) -> Self {
        Self::Inherit {
            name: name.into(),
            args,
        }
    }
}

/// An open sum is enumerated iff every local tag is payload-free and there is
/// no inclusion entry. An inherited tag set is not locally knowable, so
/// inclusion defeats the dense form.
pub fn is_enumerated_poly(cases: &[PolyCase]) -> bool {
    cases.iter().all(|case| match case {
        PolyCase::Construct { args, .. } => args.is_empty(),
        PolyCase::Inherit { .. } => false,
    })
}
