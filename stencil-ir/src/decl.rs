//! Type declarations and their shapes.

use serde::{Deserialize, Serialize};

use crate::expr::{PolyCase, TypeExpr, TypeNode};

/// Source location supplied by the front end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loc {
    pub line: u32,
    pub column: u32,
}

impl Loc {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for Loc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A passthrough attribute attached to a field or case.
///
/// The engine never interprets attributes; they ride along so callbacks can
/// (e.g. a wire-format callback honouring a rename attribute).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attr {
    pub name: String,
    pub payload: Option<String>,
}

impl Attr {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            payload: None,
        }
    }

    pub fn with_payload(name: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            payload: Some(payload.into()),
        }
    }
}

/// A named record field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub attrs: Vec<Attr>,
    pub ty: TypeExpr,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            ty,
        }
    }
}

/// One case of a closed sum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VariantCase {
    /// Positional payload, possibly empty: `Circle(float)`.
    Tuple {
        name: String,
        attrs: Vec<Attr>,
        args: Vec<TypeExpr>,
    },
    /// Field-named payload: `Rect { w: float, h: float }`.
    Record {
        name: String,
        attrs: Vec<Attr>,
        fields: Vec<Field>,
    },
}

impl VariantCase {
    pub fn tuple(name: impl Into<String>, args: Vec<TypeExpr>) -> Self {
        Self::Tuple {
            name: name.into(),
            attrs: Vec::new(),
            args,
        }
    }

    pub fn record(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self::Record {
            name: name.into(),
            attrs: Vec::new(),
            fields,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            VariantCase::Tuple { name, .. } | VariantCase::Record { name, .. } => name,
        }
    }

    pub fn attrs(&self) -> &[Attr] {
        match self {
            VariantCase::Tuple { attrs, .. } | VariantCase::Record { attrs, .. } => attrs,
        }
    }

    /// True when the case carries no payload at all.
    pub fn is_nullary(&self) -> bool {
        match self {
            VariantCase::Tuple { args, .. } => args.is_empty(),
            VariantCase::Record { fields, .. } => fields.is_empty(),
        }
    }
}

/// A sum is enumerated iff every case has zero payload fields.
///
/// Callbacks use this to pick a denser generated form (e.g. a bare string
/// instead of a tagged array). Adding a payload to any one case flips the
/// classification for the whole sum.
pub fn is_enumerated(cases: &[VariantCase]) -> bool {
    cases.iter().all(VariantCase::is_nullary)
}

/// The shape of a type declaration's body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DeclShape {
    Record(Vec<Field>),
    Variant(Vec<VariantCase>),
    /// A synonym body. When the body is literally an open-sum expression the
    /// declaration supports structural inclusion and gets special handling
    /// everywhere; see [`TypeDecl::open_sum_cases`].
    Alias(TypeExpr),
}

/// One type declaration: name, ordered formal parameters, shape, location.
///
/// The name is unique within its declaration batch; parameter names carry no
/// duplicates (both are front-end obligations).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub name: String,
    pub params: Vec<String>,
    pub shape: DeclShape,
    pub loc: Loc,
}

impl TypeDecl {
    pub fn new(name: impl Into<String>, shape: DeclShape) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            shape,
            loc: Loc::default(),
        }
    }

    pub fn with_params(mut self, params: Vec<String>) -> Self {
        self.params = params;
        self
    }

    pub fn at(mut self, loc: Loc) -> Self {
        self.loc = loc;
        self
    }

    /// The open-sum cases when this declaration's body is literally an
    /// open-sum expression, `None` for every other shape.
    pub fn open_sum_cases(&self) -> Option<&[PolyCase]> {
        match &self.shape {
            DeclShape::Alias(ty) => match &ty.node {
                TypeNode::Polyvariant(cases) => Some(cases),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn is_open_sum(&self) -> bool {
        self.open_sum_cases().is_some()
    }
}
