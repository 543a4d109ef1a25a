//! The public derivation surface.

use stencil_reflect::raw::{RawDecl, RawTypeExpr};

use crate::diagnostic::Diagnostic;
use crate::error::Result;
use crate::unit::Generated;

/// A named derivation: one generation strategy a host registers and invokes
/// once per declaration batch.
///
/// Reflection happens inside [`Derive::derive_batch`]; it is the single
/// validation boundary, and any failure aborts the whole batch.
pub trait Derive {
    /// The derivation name, e.g. `to_json`.
    fn name(&self) -> &str;

    /// Generate units for a declaration batch, in declared order.
    fn derive_batch(&self, decls: &[RawDecl]) -> Result<Vec<Generated>>;

    /// "Apply inline, unnamed" mode: generate for one bare type expression.
    /// The emitted identifier is the derivation name alone.
    fn derive_expr(&self, expr: &RawTypeExpr) -> Result<Vec<Generated>>;

    /// Like [`Derive::derive_batch`], but with the failure policy applied:
    /// on error the entire output is replaced by one inert diagnostic.
    fn generate(&self, decls: &[RawDecl]) -> Output {
        match self.derive_batch(decls) {
            Ok(items) => Output::Units(items),
            Err(err) => Output::Failed(Diagnostic::from_error(self.name(), &err)),
        }
    }
}

/// Outcome of one generation request: all units, or one diagnostic.
#[derive(Debug, Clone)]
pub enum Output {
    Units(Vec<Generated>),
    Failed(Diagnostic),
}

impl Output {
    pub fn is_failed(&self) -> bool {
        matches!(self, Output::Failed(_))
    }

    /// The generated items, empty when the batch failed.
    pub fn items(&self) -> &[Generated] {
        match self {
            Output::Units(items) => items,
            Output::Failed(_) => &[],
        }
    }

    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            Output::Units(_) => None,
            Output::Failed(diag) => Some(diag),
        }
    }
}
