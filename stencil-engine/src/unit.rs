//! Generated output artifacts.

use stencil_ir::{TypeDecl, TypeExpr, TypeNode};

use crate::code::Code;

/// Declared signature of a generated value unit.
///
/// Every unit carries one so an independent checker can verify the generated
/// body without trusting the generator. `Ty` splices a model type through
/// (using its retained surface syntax when present); `Named` is an opaque
/// external type such as the wire representation.
#[derive(Debug, Clone, PartialEq)]
pub enum Sig {
    Ty(TypeExpr),
    Named(String),
    Arrow(Box<Sig>, Box<Sig>),
    Option(Box<Sig>),
}

impl Sig {
    pub fn named(name: impl Into<String>) -> Self {
        Sig::Named(name.into())
    }

    pub fn arrow(from: Sig, to: Sig) -> Self {
        Sig::Arrow(Box::new(from), Box::new(to))
    }

    pub fn option(inner: Sig) -> Self {
        Sig::Option(Box::new(inner))
    }
}

fn write_ty(f: &mut std::fmt::Formatter<'_>, ty: &TypeExpr) -> std::fmt::Result {
    if let Some(src) = &ty.src {
        return f.write_str(src);
    }
    match &ty.node {
        TypeNode::Opaque(name, args) => {
            write!(f, "{name}")?;
            if !args.is_empty() {
                write!(f, "(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write_ty(f, arg)?;
                }
                write!(f, ")")?;
            }
            Ok(())
        }
        TypeNode::Var(name) => write!(f, "'{name}"),
        TypeNode::Tuple(elems) => {
            write!(f, "(")?;
            for (i, elem) in elems.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write_ty(f, elem)?;
            }
            write!(f, ")")
        }
        TypeNode::Polyvariant(_) => write!(f, "[..]"),
    }
}

impl std::fmt::Display for Sig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sig::Ty(ty) => write_ty(f, ty),
            Sig::Named(name) => f.write_str(name),
            Sig::Arrow(from, to) => {
                if matches!(**from, Sig::Arrow(..)) {
                    write!(f, "({from}) => {to}")
                } else {
                    write!(f, "{from} => {to}")
                }
            }
            Sig::Option(inner) => write!(f, "option({inner})"),
        }
    }
}

/// One generated value unit: a named function or constant with its declared
/// signature.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedUnit {
    /// The derivation that produced this unit (`of_json_poly` for probes).
    pub derivation: String,
    /// The declaration it belongs to, `None` in bare-expression mode.
    pub decl: Option<String>,
    /// Emitted identifier, per the naming contract.
    pub ident: String,
    pub sig: Sig,
    pub body: Code,
}

/// One generated item.
#[derive(Debug, Clone, PartialEq)]
pub enum Generated {
    Value(GeneratedUnit),
    /// A mirrored type declaration from the type-level engine.
    Type(TypeDecl),
}

impl Generated {
    pub fn ident(&self) -> &str {
        match self {
            Generated::Value(unit) => &unit.ident,
            Generated::Type(decl) => &decl.name,
        }
    }

    pub fn as_value(&self) -> Option<&GeneratedUnit> {
        match self {
            Generated::Value(unit) => Some(unit),
            Generated::Type(_) => None,
        }
    }

    pub fn as_type(&self) -> Option<&TypeDecl> {
        match self {
            Generated::Value(_) => None,
            Generated::Type(decl) => Some(decl),
        }
    }
}
