//! Raw declarations as supplied by a host front end.
//!
//! These mirror what a real surface syntax can express, including everything
//! the reflector rejects. Constructors default the location to `0:0`; front
//! ends attach real locations with [`RawTypeExpr::at`] / [`RawDecl::at`].

use stencil_ir::{Attr, Loc};

/// One raw type declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDecl {
    pub name: String,
    pub params: Vec<String>,
    pub loc: Loc,
    pub body: RawBody,
}

impl RawDecl {
    pub fn new(name: impl Into<String>, body: RawBody) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            loc: Loc::default(),
            body,
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
}

/// The body of a raw declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum RawBody {
    Record(Vec<RawField>),
    Variant(Vec<RawCase>),
    Alias(RawTypeExpr),
    /// An open-at-declaration-site sum (`type t += ...`). Always rejected.
    Extensible,
}

/// A raw record field.
#[derive(Debug, Clone, PartialEq)]
pub struct RawField {
    pub name: String,
    pub attrs: Vec<Attr>,
    pub ty: RawTypeExpr,
}

impl RawField {
    pub fn new(name: impl Into<String>, ty: RawTypeExpr) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            ty,
        }
    }
}

/// A raw closed-sum case.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCase {
    pub name: String,
    pub attrs: Vec<Attr>,
    pub payload: RawPayload,
}

impl RawCase {
    pub fn tuple(name: impl Into<String>, args: Vec<RawTypeExpr>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            payload: RawPayload::Tuple(args),
        }
    }

    pub fn record(name: impl Into<String>, fields: Vec<RawField>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            payload: RawPayload::Record(fields),
        }
    }
}

/// Payload of a raw closed-sum case.
#[derive(Debug, Clone, PartialEq)]
pub enum RawPayload {
    Tuple(Vec<RawTypeExpr>),
    Record(Vec<RawField>),
}

/// A raw open-sum case.
#[derive(Debug, Clone, PartialEq)]
pub enum RawPolyCase {
    Construct {
        tag: String,
        attrs: Vec<Attr>,
        args: Vec<RawTypeExpr>,
    },
    Inherit {
        name: String,
        args: Vec<RawTypeExpr>,
    },
}

impl RawPolyCase {
    pub fn construct(tag: impl Into<String>, args: Vec<RawTypeExpr>) -> Self {
        Self::Construct {
            tag: tag.into(),
            attrs: Vec::new(),
            args,
        }
    }

    pub fn inherit(name: impl Into<String>, args: Vec<RawTypeExpr>) -> Self {
        Self::Inherit {
            name: name.into(),
            args,
        }
    }
}

/// A raw type expression, locations attached per node.
#[derive(Debug, Clone, PartialEq)]
pub enum RawTypeExpr {
    /// Named, possibly parameterized reference: `int`, `list(int)`.
    Name {
        name: String,
        args: Vec<RawTypeExpr>,
        loc: Loc,
    },
    /// Type-variable reference: `'a`.
    Var { name: String, loc: Loc },
    /// Ordered tuple.
    Tuple { elems: Vec<RawTypeExpr>, loc: Loc },
    /// Open-sum literal. Only the closed form is derivable.
    Polyvariant {
        cases: Vec<RawPolyCase>,
        closed: bool,
        loc: Loc,
    },
    /// Function type. Rejected.
    Arrow {
        param: Box<RawTypeExpr>,
        ret: Box<RawTypeExpr>,
        loc: Loc,
    },
    /// Wildcard/placeholder type. Rejected.
    Any { loc: Loc },
    /// Structural object type. Rejected.
    Object { loc: Loc },
    /// Class-style type. Rejected.
    Class { name: String, loc: Loc },
    /// Higher-rank (explicitly quantified) type. Rejected.
    HigherRank {
        binders: Vec<String>,
        body: Box<RawTypeExpr>,
        loc: Loc,
    },
    /// Packaged/existential module type. Rejected.
    Package { module: String, loc: Loc },
    /// Embedded syntax extension. Rejected.
    Extension { name: String, loc: Loc },
    /// Qualified/constrained alias. Rejected.
    Constrained { body: Box<RawTypeExpr>, loc: Loc },
}

impl RawTypeExpr {
    pub fn name(name: impl Into<String>, args: Vec<RawTypeExpr>) -> Self {
        Self::Name {
            name: name.into(),
            args,
            loc: Loc::default(),
        }
    }

    pub fn var(name: impl Into<String>) -> Self {
        Self::Var {
            name: name.into(),
            loc: Loc::default(),
        }
    }

    pub fn tuple(elems: Vec<RawTypeExpr>) -> Self {
        Self::Tuple {
            elems,
            loc: Loc::default(),
        }
    }

    pub fn closed_polyvariant(cases: Vec<RawPolyCase>) -> Self {
        Self::Polyvariant {
            cases,
            closed: true,
            loc: Loc::default(),
        }
    }

    pub fn open_polyvariant(cases: Vec<RawPolyCase>) -> Self {
        Self::Polyvariant {
            cases,
            closed: false,
            loc: Loc::default(),
        }
    }

    pub fn arrow(param: RawTypeExpr, ret: RawTypeExpr) -> Self {
        Self::Arrow {
            param: Box::new(param),
            ret: Box::new(ret),
            loc: Loc::default(),
        }
    }

    pub fn any() -> Self {
        Self::Any {
            loc: Loc::default(),
        }
    }

    /// Attach a location to this node.
    pub fn at(mut self, at: Loc) -> Self {
        match &mut self {
            Self::Name { loc, .. }
            | Self::Var { loc, .. }
            | Self::Tuple { loc, .. }
            | Self::Polyvariant { loc, .. }
            | Self::Arrow { loc, .. }
            | Self::Any { loc }
            | Self::Object { loc }
            | Self::Class { loc, .. }
            | Self::HigherRank { loc, .. }
            | Self::Package { loc, .. }
            | Self::Extension { loc, .. }
            | Self::Constrained { loc, .. } => *loc = at,
        }
        self
    }

    pub fn loc(&self) -> Loc {
        match self {
            Self::Name { loc, .. }
            | Self::Var { loc, .. }
            | Self::Tuple { loc, .. }
            | Self::Polyvariant { loc, .. }
            | Self::Arrow { loc, .. }
            | Self::Any { loc }
            | Self::Object { loc }
            | Self::Class { loc, .. }
            | Self::HigherRank { loc, .. }
            | Self::Package { loc, .. }
            | Self::Extension { loc, .. }
            | Self::Constrained { loc, .. } => *loc,
        }
    }
}

fn write_args(f: &mut std::fmt::Formatter<'_>, args: &[RawTypeExpr]) -> std::fmt::Result {
    if args.is_empty() {
        return Ok(());
    }
    write!(f, "(")?;
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{arg}")?;
    }
    write!(f, ")")
}

/// Surface rendering, used by the reflector to fill the IR's `src`
/// passthrough. Total over all nodes, including rejected ones.
impl std::fmt::Display for RawTypeExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Name { name, args, .. } => {
                write!(f, "{name}")?;
                write_args(f, args)
            }
            Self::Var { name, .. } => write!(f, "'{name}"),
            Self::Tuple { elems, .. } => {
                write!(f, "(")?;
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{elem}")?;
                }
                write!(f, ")")
            }
            Self::Polyvariant { cases, closed, .. } => {
                write!(f, "[{}", if *closed { "" } else { ">" })?;
                for (i, case) in cases.iter().enumerate() {
                    if i > 0 {
                        write!(f, " |")?;
                    }
                    match case {
                        RawPolyCase::Construct { tag, args, .. } => {
                            write!(f, " `{tag}")?;
                            write_args(f, args)?;
                        }
                        RawPolyCase::Inherit { name, args } => {
                            write!(f, " {name}")?;
                            write_args(f, args)?;
                        }
                    }
                }
                write!(f, " ]")
            }
            Self::Arrow { param, ret, .. } => write!(f, "{param} => {ret}"),
            Self::Any { .. } => write!(f, "_"),
            Self::Object { .. } => write!(f, "{{..}}"),
            Self::Class { name, .. } => write!(f, "#{name}"),
            Self::HigherRank { binders, body, .. } => {
                write!(f, "'{}. {body}", binders.join(" '"))
            }
            Self::Package { module, .. } => write!(f, "(module {module})"),
            Self::Extension { name, .. } => write!(f, "[%{name}]"),
            Self::Constrained { body, .. } => write!(f, "{body} constraint _"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_supported_forms() {
        let ty = RawTypeExpr::name("list", vec![RawTypeExpr::var("a")]);
        assert_eq!(ty.to_string(), "list('a)");

        let tup = RawTypeExpr::tuple(vec![
            RawTypeExpr::name("int", vec![]),
            RawTypeExpr::name("string", vec![]),
        ]);
        assert_eq!(tup.to_string(), "(int, string)");

        let poly = RawTypeExpr::closed_polyvariant(vec![
            RawPolyCase::construct("Red", vec![]),
            RawPolyCase::inherit("base", vec![]),
        ]);
        assert_eq!(poly.to_string(), "[ `Red | base ]");
    }

    #[test]
    fn test_loc_attachment() {
        let loc = Loc::new(7, 2);
        assert_eq!(RawTypeExpr::any().at(loc).loc(), loc);
    }
}
