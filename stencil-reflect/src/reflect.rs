//! Lowering from the raw AST into the canonical IR.

use stencil_ir::{Batch, DeclShape, Field, PolyCase, TypeDecl, TypeExpr, VariantCase};

use crate::error::{Error, Result, ShapeCategory};
use crate::raw::{RawBody, RawCase, RawDecl, RawField, RawPayload, RawPolyCase, RawTypeExpr};

/// Reflect a whole declaration batch. Any failure anywhere aborts the entire
/// batch; a partial or mixed result is never produced.
pub fn reflect_batch(decls: &[RawDecl]) -> Result<Batch> {
    decls.iter().map(reflect_decl).collect()
}

/// Reflect one raw declaration.
pub fn reflect_decl(raw: &RawDecl) -> Result<TypeDecl> {
    let shape = match &raw.body {
        RawBody::Record(fields) => DeclShape::Record(reflect_fields(fields)?),
        RawBody::Variant(cases) => DeclShape::Variant(
            cases
                .iter()
                .map(reflect_case)
                .collect::<Result<Vec<_>>>()?,
        ),
        RawBody::Alias(ty) => DeclShape::Alias(reflect_expr(ty)?),
        RawBody::Extensible => {
            return Err(Error::unsupported(raw.loc, ShapeCategory::ExtensibleVariant));
        }
    };
    Ok(TypeDecl {
        name: raw.name.clone(),
        params: raw.params.clone(),
        shape,
        loc: raw.loc,
    })
}

/// Reflect one bare type expression, retaining its surface syntax for
/// signature passthrough.
pub fn reflect_expr(raw: &RawTypeExpr) -> Result<TypeExpr> {
    let expr = match raw {
        RawTypeExpr::Name { name, args, .. } => {
            TypeExpr::opaque(name.clone(), reflect_exprs(args)?)
        }
        RawTypeExpr::Var { name, .. } => TypeExpr::var(name.clone()),
        RawTypeExpr::Tuple { elems, .. } => TypeExpr::tuple(reflect_exprs(elems)?),
        RawTypeExpr::Polyvariant {
            cases,
            closed: true,
            ..
        } => TypeExpr::polyvariant(
            cases
                .iter()
                .map(reflect_poly_case)
                .collect::<Result<Vec<_>>>()?,
        ),
        RawTypeExpr::Polyvariant { closed: false, loc, .. } => {
            return Err(Error::unsupported(*loc, ShapeCategory::OpenVariant));
        }
        RawTypeExpr::Arrow { loc, .. } => {
            return Err(Error::unsupported(*loc, ShapeCategory::FunctionType));
        }
        RawTypeExpr::Any { loc } => {
            return Err(Error::unsupported(*loc, ShapeCategory::WildcardType));
        }
        RawTypeExpr::Object { loc } => {
            return Err(Error::unsupported(*loc, ShapeCategory::ObjectType));
        }
        RawTypeExpr::Class { loc, .. } => {
            return Err(Error::unsupported(*loc, ShapeCategory::ClassType));
        }
        RawTypeExpr::HigherRank { loc, .. } => {
            return Err(Error::unsupported(*loc, ShapeCategory::HigherRankField));
        }
        RawTypeExpr::Package { loc, .. } => {
            return Err(Error::unsupported(*loc, ShapeCategory::PackagedModule));
        }
        RawTypeExpr::Extension { loc, .. } => {
            return Err(Error::unsupported(*loc, ShapeCategory::SyntaxExtension));
        }
        RawTypeExpr::Constrained { loc, .. } => {
            return Err(Error::unsupported(*loc, ShapeCategory::ConstrainedAlias));
        }
    };
    Ok(expr.with_src(raw.to_string()))
}

fn reflect_exprs(raw: &[RawTypeExpr]) -> Result<Vec<TypeExpr>> {
    raw.iter().map(reflect_expr).collect()
}

fn reflect_fields(raw: &[RawField]) -> Result<Vec<Field>> {
    raw.iter()
        .map(|field| {
            Ok(Field {
                name: field.name.clone(),
                attrs: field.attrs.clone(),
                ty: reflect_expr(&field.ty)?,
            })
        })
        .collect()
}

fn reflect_case(raw: &RawCase) -> Result<VariantCase> {
    Ok(match &raw.payload {
        RawPayload::Tuple(args) => VariantCase::Tuple {
            name: raw.name.clone(),
            attrs: raw.attrs.clone(),
            args: reflect_exprs(args)?,
        },
        RawPayload::Record(fields) => VariantCase::Record {
            name: raw.name.clone(),
            attrs: raw.attrs.clone(),
            fields: reflect_fields(fields)?,
        },
    })
}

fn reflect_poly_case(raw: &RawPolyCase) -> Result<PolyCase> {
    Ok(match raw {
        RawPolyCase::Construct { tag, attrs, args } => PolyCase::Construct {
            tag: tag.clone(),
            attrs: attrs.clone(),
            args: reflect_exprs(args)?,
        },
        RawPolyCase::Inherit { name, args } => PolyCase::Inherit {
            name: name.clone(),
            args: reflect_exprs(args)?,
        },
    })
}

#[cfg(test)]
mod tests {
    use stencil_ir::Loc;

    use super::*;

    fn int() -> RawTypeExpr {
        RawTypeExpr::name("int", vec![])
    }

    fn unsupported_category(result: Result<TypeExpr>) -> ShapeCategory {
        match *result.unwrap_err() {
            Error::UnsupportedShape { category, .. } => category,
        }
    }

    #[test]
    fn test_record_reflects_in_order() {
        let raw = RawDecl::new(
            "point",
            RawBody::Record(vec![
                RawField::new("x", int()),
                RawField::new("y", int()),
            ]),
        );
        let decl = reflect_decl(&raw).unwrap();
        match &decl.shape {
            DeclShape::Record(fields) => {
                let names: Vec<_> = fields.iter().map(|f| f.name.as_str()).collect();
                assert_eq!(names, ["x", "y"]);
            }
            other => panic!("unexpected shape: {other:?}"),
        }
    }

    #[test]
    fn test_variant_payload_styles() {
        let raw = RawDecl::new(
            "shape",
            RawBody::Variant(vec![
                RawCase::tuple("Circle", vec![int()]),
                RawCase::record("Rect", vec![RawField::new("w", int())]),
            ]),
        );
        let decl = reflect_decl(&raw).unwrap();
        match &decl.shape {
            DeclShape::Variant(cases) => {
                assert!(matches!(&cases[0], VariantCase::Tuple { .. }));
                assert!(matches!(&cases[1], VariantCase::Record { .. }));
            }
            other => panic!("unexpected shape: {other:?}"),
        }
    }

    #[test]
    fn test_src_passthrough() {
        let raw = RawTypeExpr::name("list", vec![RawTypeExpr::var("a")]);
        let expr = reflect_expr(&raw).unwrap();
        assert_eq!(expr.src.as_deref(), Some("list('a)"));
    }

    #[test]
    fn test_function_type_rejected() {
        let raw = RawTypeExpr::arrow(int(), int()).at(Loc::new(4, 8));
        assert_eq!(
            unsupported_category(reflect_expr(&raw)),
            ShapeCategory::FunctionType
        );
    }

    #[test]
    fn test_wildcard_rejected() {
        assert_eq!(
            unsupported_category(reflect_expr(&RawTypeExpr::any())),
            ShapeCategory::WildcardType
        );
    }

    #[test]
    fn test_open_literal_rejected() {
        let raw = RawTypeExpr::open_polyvariant(vec![RawPolyCase::construct("Red", vec![])]);
        assert_eq!(
            unsupported_category(reflect_expr(&raw)),
            ShapeCategory::OpenVariant
        );
    }

    #[test]
    fn test_extensible_decl_rejected() {
        let raw = RawDecl::new("t", RawBody::Extensible).at(Loc::new(1, 1));
        let err = reflect_decl(&raw).unwrap_err();
        let Error::UnsupportedShape { loc, category } = *err;
        assert_eq!(loc, Loc::new(1, 1));
        assert_eq!(category, ShapeCategory::ExtensibleVariant);
    }

    #[test]
    fn test_nested_failure_aborts_batch() {
        let good = RawDecl::new("ok", RawBody::Alias(int()));
        let bad = RawDecl::new(
            "bad",
            RawBody::Record(vec![RawField::new(
                "f",
                RawTypeExpr::arrow(int(), int()),
            )]),
        );
        assert!(reflect_batch(&[good, bad]).is_err());
    }

    #[test]
    fn test_rejection_is_deterministic() {
        let raw = RawTypeExpr::any().at(Loc::new(2, 3));
        let first = unsupported_category(reflect_expr(&raw));
        let second = unsupported_category(reflect_expr(&raw));
        assert_eq!(first, second);
    }
}
