//! The arity-0 engine: every type maps to an expression with no runtime
//! input.
//!
//! Default-value and skeleton generators run here. Without an input to
//! thread, child positions are derived eagerly and hooks receive finished
//! code instead of derivable thunks.

use stencil_ir::{Attr, Batch, DeclShape, Field, PolyCase, TypeDecl, TypeExpr, TypeNode, VariantCase};

use super::Env;
use crate::code::Code;
use crate::error::Result;
use crate::naming;
use crate::unit::{Generated, GeneratedUnit, Sig};

/// An arity-0 generation strategy.
pub trait ConstDerive {
    fn derivation(&self) -> &str;

    fn on_tuple(&self, walker: &ConstWalker, elems: &[Code]) -> Result<Code>;

    fn on_record(&self, walker: &ConstWalker, fields: &[ConstField]) -> Result<Code>;

    fn on_variant(&self, walker: &ConstWalker, cases: &[ConstCase]) -> Result<Code>;

    fn on_open_sum(&self, walker: &ConstWalker, cases: &[ConstPoly]) -> Result<Code>;

    fn signature(&self, decl: &TypeDecl) -> Sig;

    fn expr_signature(&self, ty: &TypeExpr) -> Sig;
}

/// A record field with its derived expression.
pub struct ConstField<'w> {
    pub name: &'w str,
    pub attrs: &'w [Attr],
    pub code: Code,
}

/// A closed-sum case with derived payload expressions.
pub struct ConstCase<'w> {
    pub name: &'w str,
    pub attrs: &'w [Attr],
    pub payload: ConstPayload<'w>,
}

pub enum ConstPayload<'w> {
    Tuple(Vec<Code>),
    Record(Vec<ConstField<'w>>),
}

/// One open-sum entry. Inclusion is pre-derived as a reference to the
/// included sum's unit.
pub enum ConstPoly<'w> {
    Construct {
        tag: &'w str,
        attrs: &'w [Attr],
        args: Vec<Code>,
    },
    Inherit {
        name: &'w str,
        code: Code,
    },
}

/// The input-less walk over one declaration.
pub struct ConstWalker<'a> {
    pub env: Env<'a>,
    strategy: &'a dyn ConstDerive,
}

impl<'a> ConstWalker<'a> {
    pub fn new(env: Env<'a>, strategy: &'a dyn ConstDerive) -> Self {
        Self { env, strategy }
    }

    pub fn expr(&self, ty: &TypeExpr) -> Result<Code> {
        match &ty.node {
            TypeNode::Var(name) => Ok(Code::ident(naming::param_handler(name))),
            TypeNode::Opaque(name, args) => self.reference(name, args),
            TypeNode::Tuple(elems) => {
                let elems = self.exprs(elems)?;
                self.strategy.on_tuple(self, &elems)
            }
            TypeNode::Polyvariant(cases) => {
                let cases = self.poly_views(cases)?;
                self.strategy.on_open_sum(self, &cases)
            }
        }
    }

    /// A reference to the derived unit for a named type. Zero-parameter
    /// references stay bare identifiers so constants need no application.
    pub fn reference(&self, name: &str, args: &[TypeExpr]) -> Result<Code> {
        let ident = Code::ident(self.env.unit_ident(name));
        if args.is_empty() {
            Ok(ident)
        } else {
            let args = self.exprs(args)?;
            Ok(Code::apply(ident, args))
        }
    }

    fn exprs(&self, tys: &[TypeExpr]) -> Result<Vec<Code>> {
        tys.iter().map(|ty| self.expr(ty)).collect()
    }

    pub fn const_fields<'w>(&self, fields: &'w [Field]) -> Result<Vec<ConstField<'w>>> {
        fields
            .iter()
            .map(|field| {
                Ok(ConstField {
                    name: &field.name,
                    attrs: &field.attrs,
                    code: self.expr(&field.ty)?,
                })
            })
            .collect()
    }

    pub fn const_cases<'w>(&self, cases: &'w [VariantCase]) -> Result<Vec<ConstCase<'w>>> {
        cases
            .iter()
            .map(|case| {
                Ok(ConstCase {
                    name: case.name(),
                    attrs: case.attrs(),
                    payload: match case {
                        VariantCase::Tuple { args, .. } => ConstPayload::Tuple(self.exprs(args)?),
                        VariantCase::Record { fields, .. } => {
                            ConstPayload::Record(self.const_fields(fields)?)
                        }
                    },
                })
            })
            .collect()
    }

    fn poly_views<'w>(&self, cases: &'w [PolyCase]) -> Result<Vec<ConstPoly<'w>>> {
        cases
            .iter()
            .map(|case| match case {
                PolyCase::Construct { tag, attrs, args } => Ok(ConstPoly::Construct {
                    tag,
                    attrs,
                    args: self.exprs(args)?,
                }),
                PolyCase::Inherit { name, args } => Ok(ConstPoly::Inherit {
                    name,
                    code: self.reference(name, args)?,
                }),
            })
            .collect()
    }
}

/// Run an arity-0 strategy over a whole batch, in declared order.
pub fn run(strategy: &dyn ConstDerive, batch: &Batch) -> Result<Vec<Generated>> {
    let mut out = Vec::new();
    for decl in batch.iter() {
        let env = Env {
            derivation: strategy.derivation(),
            batch,
            current: Some(&decl.name),
        };
        let walker = ConstWalker::new(env, strategy);
        let body = match &decl.shape {
            DeclShape::Record(fields) => {
                let fields = walker.const_fields(fields)?;
                strategy.on_record(&walker, &fields)?
            }
            DeclShape::Variant(cases) => {
                let cases = walker.const_cases(cases)?;
                strategy.on_variant(&walker, &cases)?
            }
            DeclShape::Alias(ty) => walker.expr(ty)?,
        };
        let body = if decl.params.is_empty() {
            body
        } else {
            let params: Vec<String> = decl.params.iter().map(|p| naming::param_handler(p)).collect();
            Code::lambda(params, body)
        };
        out.push(Generated::Value(GeneratedUnit {
            derivation: strategy.derivation().to_string(),
            decl: Some(decl.name.clone()),
            ident: naming::unit_ident(strategy.derivation(), &decl.name),
            sig: strategy.signature(decl),
            body,
        }));
    }
    Ok(out)
}

/// Run an arity-0 strategy over one bare type expression.
pub fn run_expr(strategy: &dyn ConstDerive, batch: &Batch, ty: &TypeExpr) -> Result<GeneratedUnit> {
    let env = Env {
        derivation: strategy.derivation(),
        batch,
        current: None,
    };
    let walker = ConstWalker::new(env, strategy);
    Ok(GeneratedUnit {
        derivation: strategy.derivation().to_string(),
        decl: None,
        ident: strategy.derivation().to_string(),
        sig: strategy.expr_signature(ty),
        body: walker.expr(ty)?,
    })
}
