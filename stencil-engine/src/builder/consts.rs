//! The arity-0 combinator, for default values and other input-less units.

use stencil_ir::{Batch, TypeDecl, TypeExpr};
use stencil_reflect::raw::{RawDecl, RawTypeExpr};
use stencil_reflect::{reflect_batch, reflect_expr};

use super::require;
use crate::code::Code;
use crate::derive::Derive;
use crate::engine::arity0::{
    self, ConstCase, ConstDerive, ConstField, ConstPoly, ConstWalker,
};
use crate::error::Result;
use crate::unit::{Generated, Sig};

type TupleHook = Box<dyn Fn(&[Code]) -> Code>;
type RecordHook = Box<dyn Fn(&[ConstField]) -> Code>;
type VariantHook = Box<dyn Fn(&[ConstCase]) -> Code>;
type OpenSumHook = Box<dyn Fn(&[ConstPoly]) -> Code>;

/// Builds an arity-0 derivation from per-shape callbacks. Child positions
/// arrive already derived; sum callbacks see every case and pick one.
pub struct ConstBuilder {
    name: String,
    tuple: Option<TupleHook>,
    record: Option<RecordHook>,
    variant: Option<VariantHook>,
    open_sum: Option<OpenSumHook>,
}

impl ConstBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tuple: None,
            record: None,
            variant: None,
            open_sum: None,
        }
    }

    pub fn tuple(mut self, f: impl Fn(&[Code]) -> Code + 'static) -> Self {
        self.tuple = Some(Box::new(f));
        self
    }

    pub fn record(mut self, f: impl Fn(&[ConstField]) -> Code + 'static) -> Self {
        self.record = Some(Box::new(f));
        self
    }

    pub fn variant(mut self, f: impl Fn(&[ConstCase]) -> Code + 'static) -> Self {
        self.variant = Some(Box::new(f));
        self
    }

    pub fn open_sum(mut self, f: impl Fn(&[ConstPoly]) -> Code + 'static) -> Self {
        self.open_sum = Some(Box::new(f));
        self
    }
}

impl ConstDerive for ConstBuilder {
    fn derivation(&self) -> &str {
        &self.name
    }

    fn on_tuple(&self, _walker: &ConstWalker, elems: &[Code]) -> Result<Code> {
        Ok(require(&self.name, &self.tuple, "tuple")?(elems))
    }

    fn on_record(&self, _walker: &ConstWalker, fields: &[ConstField]) -> Result<Code> {
        Ok(require(&self.name, &self.record, "record")?(fields))
    }

    fn on_variant(&self, _walker: &ConstWalker, cases: &[ConstCase]) -> Result<Code> {
        Ok(require(&self.name, &self.variant, "variant")?(cases))
    }

    fn on_open_sum(&self, _walker: &ConstWalker, cases: &[ConstPoly]) -> Result<Code> {
        Ok(require(&self.name, &self.open_sum, "open_sum")?(cases))
    }

    fn signature(&self, decl: &TypeDecl) -> Sig {
        decl.params.iter().rev().fold(
            Sig::Ty(super::decl_ty(decl)),
            |acc, param| Sig::arrow(Sig::Ty(TypeExpr::var(param.clone())), acc),
        )
    }

    fn expr_signature(&self, ty: &TypeExpr) -> Sig {
        Sig::Ty(ty.clone())
    }
}

impl Derive for ConstBuilder {
    fn name(&self) -> &str {
        &self.name
    }

    fn derive_batch(&self, decls: &[RawDecl]) -> Result<Vec<Generated>> {
        let batch = reflect_batch(decls)?;
        arity0::run(self, &batch)
    }

    fn derive_expr(&self, expr: &RawTypeExpr) -> Result<Vec<Generated>> {
        let ty = reflect_expr(expr)?;
        let batch = Batch::new();
        Ok(vec![Generated::Value(arity0::run_expr(self, &batch, &ty)?)])
    }
}
