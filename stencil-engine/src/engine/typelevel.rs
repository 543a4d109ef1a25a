//! The type-level engine: every declaration maps to a mirrored declaration.
//!
//! The mirror keeps shape, field names, case tags and parameters, and
//! renames every named-type reference by the unit naming rule, so a batch of
//! mirrored declarations refers to itself consistently. Hooks can override
//! how opaque references, tuples and fields are mirrored.

use stencil_ir::{
    Batch, DeclShape, Field, PolyCase, TypeDecl, TypeExpr, TypeNode, VariantCase,
};

use super::Env;
use crate::unit::Generated;

type OpaqueHook = Box<dyn Fn(&str, &[TypeExpr]) -> Option<TypeExpr>>;
type TupleHook = Box<dyn Fn(Vec<TypeExpr>) -> TypeExpr>;
type FieldHook = Box<dyn Fn(&Field, TypeExpr) -> TypeExpr>;

/// Overrides for the mirror walk. Every hook is optional; the default walk
/// renames references and keeps everything else structural.
#[derive(Default)]
pub struct TypeHooks {
    /// Replace an opaque reference outright. Returning `None` falls back to
    /// the renaming default.
    pub opaque: Option<OpaqueHook>,
    /// Rebuild a tuple from its mirrored elements.
    pub tuple: Option<TupleHook>,
    /// Wrap a field's mirrored type (the original field is passed for its
    /// name and attributes).
    pub field: Option<FieldHook>,
}

/// Mirror one type expression. The mirrored tree drops retained surface
/// syntax since the reference names have changed.
pub fn mirror_expr(env: &Env, hooks: &TypeHooks, ty: &TypeExpr) -> TypeExpr {
    match &ty.node {
        TypeNode::Var(name) => TypeExpr::var(name.clone()),
        TypeNode::Opaque(name, args) => {
            if let Some(hook) = &hooks.opaque {
                if let Some(replaced) = hook(name, args) {
                    return replaced;
                }
            }
            let args = args.iter().map(|arg| mirror_expr(env, hooks, arg)).collect();
            TypeExpr::opaque(env.unit_ident(name), args)
        }
        TypeNode::Tuple(elems) => {
            let elems: Vec<TypeExpr> = elems
                .iter()
                .map(|elem| mirror_expr(env, hooks, elem))
                .collect();
            match &hooks.tuple {
                Some(hook) => hook(elems),
                None => TypeExpr::tuple(elems),
            }
        }
        TypeNode::Polyvariant(cases) => {
            TypeExpr::polyvariant(cases.iter().map(|case| mirror_case(env, hooks, case)).collect())
        }
    }
}

fn mirror_case(env: &Env, hooks: &TypeHooks, case: &PolyCase) -> PolyCase {
    match case {
        PolyCase::Construct { tag, attrs, args } => PolyCase::Construct {
            tag: tag.clone(),
            attrs: attrs.clone(),
            args: args.iter().map(|arg| mirror_expr(env, hooks, arg)).collect(),
        },
        PolyCase::Inherit { name, args } => PolyCase::Inherit {
            name: env.unit_ident(name),
            args: args.iter().map(|arg| mirror_expr(env, hooks, arg)).collect(),
        },
    }
}

fn mirror_field(env: &Env, hooks: &TypeHooks, field: &Field) -> Field {
    let ty = mirror_expr(env, hooks, &field.ty);
    let ty = match &hooks.field {
        Some(hook) => hook(field, ty),
        None => ty,
    };
    Field {
        name: field.name.clone(),
        attrs: field.attrs.clone(),
        ty,
    }
}

fn mirror_shape(env: &Env, hooks: &TypeHooks, shape: &DeclShape) -> DeclShape {
    match shape {
        DeclShape::Record(fields) => DeclShape::Record(
            fields
                .iter()
                .map(|field| mirror_field(env, hooks, field))
                .collect(),
        ),
        DeclShape::Variant(cases) => DeclShape::Variant(
            cases
                .iter()
                .map(|case| match case {
                    VariantCase::Tuple { name, attrs, args } => VariantCase::Tuple {
                        name: name.clone(),
                        attrs: attrs.clone(),
                        args: args.iter().map(|arg| mirror_expr(env, hooks, arg)).collect(),
                    },
                    VariantCase::Record {
                        name,
                        attrs,
                        fields,
                    } => VariantCase::Record {
                        name: name.clone(),
                        attrs: attrs.clone(),
                        fields: fields
                            .iter()
                            .map(|field| mirror_field(env, hooks, field))
                            .collect(),
                    },
                })
                .collect(),
        ),
        DeclShape::Alias(ty) => DeclShape::Alias(mirror_expr(env, hooks, ty)),
    }
}

/// Mirror a whole batch, one declaration per declaration in declared order.
pub fn run(derivation: &str, hooks: &TypeHooks, batch: &Batch) -> Vec<Generated> {
    let mut out = Vec::new();
    for decl in batch.iter() {
        // The mirrored declaration is named by the unit rule, so references
        // to it from elsewhere in the batch resolve by construction. Bare
        // self-reference never applies at the type level.
        let env = Env {
            derivation,
            batch,
            current: None,
        };
        let mirrored = TypeDecl {
            name: env.unit_ident(&decl.name),
            params: decl.params.clone(),
            shape: mirror_shape(&env, hooks, &decl.shape),
            loc: decl.loc,
        };
        out.push(Generated::Type(mirrored));
    }
    out
}
