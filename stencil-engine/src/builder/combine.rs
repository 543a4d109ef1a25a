//! Composition of derivations under one name.

use stencil_reflect::raw::{RawDecl, RawTypeExpr};

use crate::derive::Derive;
use crate::error::Result;
use crate::unit::Generated;

/// Several derivations invoked as one: outputs concatenate in registration
/// order, and a failure in any part fails the whole request.
pub struct Combined {
    name: String,
    parts: Vec<Box<dyn Derive>>,
}

impl Combined {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parts: Vec::new(),
        }
    }

    pub fn with(mut self, part: impl Derive + 'static) -> Self {
        self.parts.push(Box::new(part));
        self
    }
}

impl Derive for Combined {
    fn name(&self) -> &str {
        &self.name
    }

    fn derive_batch(&self, decls: &[RawDecl]) -> Result<Vec<Generated>> {
        let mut out = Vec::new();
        for part in &self.parts {
            out.extend(part.derive_batch(decls)?);
        }
        Ok(out)
    }

    fn derive_expr(&self, expr: &RawTypeExpr) -> Result<Vec<Generated>> {
        let mut out = Vec::new();
        for part in &self.parts {
            out.extend(part.derive_expr(expr)?);
        }
        Ok(out)
    }
}
