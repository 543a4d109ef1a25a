//! The type-level combinator, deriving mirrored type declarations.

use stencil_ir::{DeclShape, Field, TypeDecl, TypeExpr};
use stencil_reflect::raw::{RawDecl, RawTypeExpr};
use stencil_reflect::{reflect_batch, reflect_expr};

use crate::derive::Derive;
use crate::engine::typelevel::{self, TypeHooks};
use crate::engine::Env;
use crate::error::Result;
use crate::unit::Generated;

/// Builds a type-mirroring derivation. With no hooks the mirror is purely
/// structural: same shapes, references renamed by the unit rule.
pub struct TypeMirror {
    name: String,
    hooks: TypeHooks,
}

impl TypeMirror {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hooks: TypeHooks::default(),
        }
    }

    /// Replace selected opaque references; return `None` to keep the
    /// renaming default.
    pub fn opaque(mut self, f: impl Fn(&str, &[TypeExpr]) -> Option<TypeExpr> + 'static) -> Self {
        self.hooks.opaque = Some(Box::new(f));
        self
    }

    pub fn tuple(mut self, f: impl Fn(Vec<TypeExpr>) -> TypeExpr + 'static) -> Self {
        self.hooks.tuple = Some(Box::new(f));
        self
    }

    pub fn field(mut self, f: impl Fn(&Field, TypeExpr) -> TypeExpr + 'static) -> Self {
        self.hooks.field = Some(Box::new(f));
        self
    }
}

impl Derive for TypeMirror {
    fn name(&self) -> &str {
        &self.name
    }

    fn derive_batch(&self, decls: &[RawDecl]) -> Result<Vec<Generated>> {
        let batch = reflect_batch(decls)?;
        Ok(typelevel::run(&self.name, &self.hooks, &batch))
    }

    fn derive_expr(&self, expr: &RawTypeExpr) -> Result<Vec<Generated>> {
        let ty = reflect_expr(expr)?;
        let batch = stencil_ir::Batch::new();
        let env = Env {
            derivation: &self.name,
            batch: &batch,
            current: None,
        };
        let mirrored = typelevel::mirror_expr(&env, &self.hooks, &ty);
        Ok(vec![Generated::Type(TypeDecl::new(
            self.name.clone(),
            DeclShape::Alias(mirrored),
        ))])
    }
}

#[cfg(test)]
mod tests {
    use stencil_reflect::raw::RawTypeExpr;

    use super::*;
    use stencil_ir::TypeNode;

    #[test]
    fn test_bare_expr_mirror_named_by_derivation() {
        let mirror = TypeMirror::new("wire");
        let raw = RawTypeExpr::name("list", vec![RawTypeExpr::name("point", vec![])]);
        let out = mirror.derive_expr(&raw).unwrap();
        let decl = out[0].as_type().unwrap();
        assert_eq!(decl.name, "wire");
        match &decl.shape {
            DeclShape::Alias(ty) => match &ty.node {
                TypeNode::Opaque(name, args) => {
                    assert_eq!(name, "wire_list");
                    assert_eq!(args[0], TypeExpr::opaque("wire_point", vec![]));
                }
                other => panic!("expected opaque, got {other:?}"),
            },
            other => panic!("expected alias, got {other:?}"),
        }
    }
}
