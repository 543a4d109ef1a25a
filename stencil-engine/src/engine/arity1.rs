//! The arity-1 engine: every type maps to a function of one runtime input.
//!
//! Encoders and decoders both run on this engine. The walk owns shape
//! dispatch, reference naming, parameter-handler plumbing and eta-expansion;
//! the strategy owns only what code each shape becomes.

use stencil_ir::{Attr, Batch, DeclShape, Field, PolyCase, TypeDecl, TypeExpr, TypeNode, VariantCase};

use super::{Env, INPUT};
use crate::code::Code;
use crate::error::Result;
use crate::naming;
use crate::unit::{Generated, GeneratedUnit, Sig};

/// An arity-1 generation strategy.
///
/// Each hook receives the walker (for recursion and environment access), a
/// shape view and the input expression, and returns the generated body.
pub trait ExprDerive {
    fn derivation(&self) -> &str;

    fn on_tuple(&self, walker: &Walker, elems: &[Child], input: Code) -> Result<Code>;

    fn on_record(&self, walker: &Walker, fields: &[FieldChild], input: Code) -> Result<Code>;

    fn on_variant(&self, walker: &Walker, cases: &[CaseView], input: Code) -> Result<Code>;

    /// An open-sum expression at a use site, inline inside a larger type.
    fn on_open_sum(&self, walker: &Walker, cases: &[PolyView], input: Code) -> Result<Code>;

    /// A declaration whose whole body is an open-sum expression. Returns the
    /// main body plus an optional companion unit emitted before it (decoders
    /// use this for the probe). Defaults to the inline treatment.
    fn on_open_sum_decl(
        &self,
        walker: &Walker,
        decl: &TypeDecl,
        cases: &[PolyView],
        input: Code,
    ) -> Result<(Code, Option<GeneratedUnit>)> {
        Ok((self.on_open_sum(walker, cases, input)?, None))
    }

    /// Declared signature for a full declaration's unit.
    fn signature(&self, decl: &TypeDecl) -> Sig;

    /// Declared signature in bare-expression mode.
    fn expr_signature(&self, ty: &TypeExpr) -> Sig;
}

/// The recursive walk over one declaration (or one bare expression).
pub struct Walker<'a> {
    pub env: Env<'a>,
    strategy: &'a dyn ExprDerive,
}

impl<'a> Walker<'a> {
    pub fn new(env: Env<'a>, strategy: &'a dyn ExprDerive) -> Self {
        Self { env, strategy }
    }

    /// Generate code for `ty` applied to `input`.
    pub fn expr(&self, ty: &TypeExpr, input: Code) -> Result<Code> {
        match &ty.node {
            TypeNode::Var(name) => Ok(Code::call(naming::param_handler(name), vec![input])),
            TypeNode::Opaque(name, args) => self.reference_call(name, args, input),
            TypeNode::Tuple(elems) => {
                let elems = self.children(elems);
                self.strategy.on_tuple(self, &elems, input)
            }
            TypeNode::Polyvariant(cases) => {
                let cases = self.poly_views(cases);
                self.strategy.on_open_sum(self, &cases, input)
            }
        }
    }

    /// Generate code for `ty` as a standalone one-argument function.
    pub fn eta(&self, ty: &TypeExpr) -> Result<Code> {
        Ok(Code::lambda(vec!["x"], self.expr(ty, Code::ident("x"))?))
    }

    /// A call to the derived unit for a named type, handler arguments first.
    pub fn reference_call(&self, name: &str, args: &[TypeExpr], input: Code) -> Result<Code> {
        let mut call_args = self.handler_args(args)?;
        call_args.push(input);
        Ok(Code::call(self.env.unit_ident(name), call_args))
    }

    /// A call to the probe unit for a named open sum.
    pub fn probe_call(&self, name: &str, args: &[TypeExpr], input: Code) -> Result<Code> {
        let mut call_args = self.handler_args(args)?;
        call_args.push(input);
        Ok(Code::call(self.env.probe_ident(name), call_args))
    }

    fn handler_args(&self, args: &[TypeExpr]) -> Result<Vec<Code>> {
        args.iter().map(|arg| self.eta(arg)).collect()
    }

    pub fn children<'w>(&'w self, elems: &'w [TypeExpr]) -> Vec<Child<'w>> {
        elems.iter().map(|ty| Child { walker: self, ty }).collect()
    }

    pub fn field_children<'w>(&'w self, fields: &'w [Field]) -> Vec<FieldChild<'w>> {
        fields
            .iter()
            .map(|field| FieldChild {
                name: &field.name,
                attrs: &field.attrs,
                child: Child {
                    walker: self,
                    ty: &field.ty,
                },
            })
            .collect()
    }

    pub fn case_views<'w>(&'w self, cases: &'w [VariantCase]) -> Vec<CaseView<'w>> {
        cases
            .iter()
            .map(|case| CaseView {
                name: case.name(),
                attrs: case.attrs(),
                payload: match case {
                    VariantCase::Tuple { args, .. } => CasePayload::Tuple(self.children(args)),
                    VariantCase::Record { fields, .. } => {
                        CasePayload::Record(self.field_children(fields))
                    }
                },
            })
            .collect()
    }

    pub fn poly_views<'w>(&'w self, cases: &'w [PolyCase]) -> Vec<PolyView<'w>> {
        cases
            .iter()
            .map(|case| match case {
                PolyCase::Construct { tag, attrs, args } => PolyView::Construct {
                    tag,
                    attrs,
                    args: self.children(args),
                },
                PolyCase::Inherit { name, args } => PolyView::Inherit { name, args },
            })
            .collect()
    }
}

/// One child type position, derivable on demand.
pub struct Child<'w> {
    walker: &'w Walker<'w>,
    pub ty: &'w TypeExpr,
}

impl Child<'_> {
    /// Derive this child applied to `input`.
    pub fn derive(&self, input: Code) -> Result<Code> {
        self.walker.expr(self.ty, input)
    }

    /// Derive this child as a standalone one-argument function.
    pub fn as_fn(&self) -> Result<Code> {
        self.walker.eta(self.ty)
    }
}

/// A named record field position.
pub struct FieldChild<'w> {
    pub name: &'w str,
    pub attrs: &'w [Attr],
    pub child: Child<'w>,
}

/// One closed-sum case with its payload positions.
pub struct CaseView<'w> {
    pub name: &'w str,
    pub attrs: &'w [Attr],
    pub payload: CasePayload<'w>,
}

impl CaseView<'_> {
    pub fn is_nullary(&self) -> bool {
        match &self.payload {
            CasePayload::Tuple(args) => args.is_empty(),
            CasePayload::Record(fields) => fields.is_empty(),
        }
    }
}

pub enum CasePayload<'w> {
    Tuple(Vec<Child<'w>>),
    Record(Vec<FieldChild<'w>>),
}

/// One open-sum case entry, in declared order.
pub enum PolyView<'w> {
    Construct {
        tag: &'w str,
        attrs: &'w [Attr],
        args: Vec<Child<'w>>,
    },
    Inherit {
        name: &'w str,
        args: &'w [TypeExpr],
    },
}

/// True when every entry is a payload-free local construct.
pub fn is_enumerated_poly(cases: &[PolyView]) -> bool {
    cases
        .iter()
        .all(|case| matches!(case, PolyView::Construct { args, .. } if args.is_empty()))
}

/// Wrap a generated body in the unit's lambda: one handler per declared
/// parameter, then the runtime input.
pub fn wrap_params(params: &[String], body: Code) -> Code {
    let mut lambda_params: Vec<String> = params.iter().map(|p| naming::param_handler(p)).collect();
    lambda_params.push(INPUT.to_string());
    Code::lambda(lambda_params, body)
}

/// Run a strategy over a whole batch, one unit per declaration in declared
/// order (probes precede their owning unit).
pub fn run(strategy: &dyn ExprDerive, batch: &Batch) -> Result<Vec<Generated>> {
    let mut out = Vec::new();
    for decl in batch.iter() {
        let env = Env {
            derivation: strategy.derivation(),
            batch,
            current: Some(&decl.name),
        };
        let walker = Walker::new(env, strategy);
        let input = Code::ident(INPUT);
        let (body, companion) = match &decl.shape {
            DeclShape::Record(fields) => {
                let fields = walker.field_children(fields);
                (strategy.on_record(&walker, &fields, input)?, None)
            }
            DeclShape::Variant(cases) => {
                let cases = walker.case_views(cases);
                (strategy.on_variant(&walker, &cases, input)?, None)
            }
            DeclShape::Alias(ty) => match &ty.node {
                TypeNode::Polyvariant(cases) => {
                    let cases = walker.poly_views(cases);
                    strategy.on_open_sum_decl(&walker, decl, &cases, input)?
                }
                _ => (walker.expr(ty, input)?, None),
            },
        };
        if let Some(probe) = companion {
            out.push(Generated::Value(probe));
        }
        out.push(Generated::Value(GeneratedUnit {
            derivation: strategy.derivation().to_string(),
            decl: Some(decl.name.clone()),
            ident: naming::unit_ident(strategy.derivation(), &decl.name),
            sig: strategy.signature(decl),
            body: wrap_params(&decl.params, body),
        }));
    }
    Ok(out)
}

/// Run a strategy over one bare type expression. The unit is named by the
/// derivation alone and belongs to no declaration.
pub fn run_expr(strategy: &dyn ExprDerive, batch: &Batch, ty: &TypeExpr) -> Result<GeneratedUnit> {
    let env = Env {
        derivation: strategy.derivation(),
        batch,
        current: None,
    };
    let walker = Walker::new(env, strategy);
    let body = walker.expr(ty, Code::ident(INPUT))?;
    Ok(GeneratedUnit {
        derivation: strategy.derivation().to_string(),
        decl: None,
        ident: strategy.derivation().to_string(),
        sig: strategy.expr_signature(ty),
        body: Code::lambda(vec![INPUT], body),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Spine;

    impl ExprDerive for Spine {
        fn derivation(&self) -> &str {
            "enc"
        }

        fn on_tuple(&self, _walker: &Walker, elems: &[Child], input: Code) -> Result<Code> {
            let mut args = vec![input];
            for elem in elems {
                args.push(elem.derive(Code::unit())?);
            }
            Ok(Code::call("tuple", args))
        }

        fn on_record(&self, _walker: &Walker, fields: &[FieldChild], input: Code) -> Result<Code> {
            let mut args = vec![input];
            for field in fields {
                args.push(field.child.derive(Code::str(field.name))?);
            }
            Ok(Code::call("record", args))
        }

        fn on_variant(&self, _walker: &Walker, _cases: &[CaseView], input: Code) -> Result<Code> {
            Ok(Code::call("variant", vec![input]))
        }

        fn on_open_sum(&self, _walker: &Walker, _cases: &[PolyView], input: Code) -> Result<Code> {
            Ok(Code::call("poly", vec![input]))
        }

        fn signature(&self, _decl: &TypeDecl) -> Sig {
            Sig::named("sig")
        }

        fn expr_signature(&self, _ty: &TypeExpr) -> Sig {
            Sig::named("sig")
        }
    }

    #[test]
    fn test_var_maps_to_param_handler() {
        let batch = Batch::new();
        let env = Env {
            derivation: "enc",
            batch: &batch,
            current: None,
        };
        let walker = Walker::new(env, &Spine);
        let code = walker.expr(&TypeExpr::var("a"), Code::ident("v")).unwrap();
        assert_eq!(code, Code::call("f_a", vec![Code::ident("v")]));
    }

    #[test]
    fn test_reference_call_threads_handlers() {
        let batch = Batch::new();
        let env = Env {
            derivation: "enc",
            batch: &batch,
            current: None,
        };
        let walker = Walker::new(env, &Spine);
        let ty = TypeExpr::opaque("list", vec![TypeExpr::var("a")]);
        let code = walker.expr(&ty, Code::ident("v")).unwrap();
        assert_eq!(
            code,
            Code::call(
                "enc_list",
                vec![
                    Code::lambda(vec!["x"], Code::call("f_a", vec![Code::ident("x")])),
                    Code::ident("v"),
                ],
            )
        );
    }

    #[test]
    fn test_self_reference_is_bare() {
        let batch: Batch = vec![TypeDecl::new(
            "items",
            DeclShape::Alias(TypeExpr::opaque(
                "pair",
                vec![
                    TypeExpr::opaque("int", vec![]),
                    TypeExpr::opaque("items", vec![]),
                ],
            )),
        )]
        .into_iter()
        .collect();
        let out = run(&Spine, &batch).unwrap();
        assert_eq!(out.len(), 1);
        let unit = out[0].as_value().unwrap();
        assert_eq!(unit.ident, "enc_items");
        assert!(unit.body.mentions("enc"));
        assert!(unit.body.mentions("enc_pair"));
        assert!(unit.body.mentions("enc_int"));
        assert!(!unit.body.mentions("enc_items"));
    }

    #[test]
    fn test_params_become_leading_handlers() {
        let batch: Batch = vec![TypeDecl::new(
            "pair",
            DeclShape::Record(vec![
                Field::new("first", TypeExpr::var("a")),
                Field::new("second", TypeExpr::var("b")),
            ]),
        )
        .with_params(vec!["a".into(), "b".into()])]
        .into_iter()
        .collect();
        let out = run(&Spine, &batch).unwrap();
        let unit = out[0].as_value().unwrap();
        match &unit.body {
            Code::Lambda { params, .. } => assert_eq!(params, &["f_a", "f_b", "v"]),
            other => panic!("expected lambda, got {other:?}"),
        }
    }

    #[test]
    fn test_run_expr_bare_name() {
        let batch = Batch::new();
        let ty = TypeExpr::tuple(vec![
            TypeExpr::opaque("int", vec![]),
            TypeExpr::opaque("string", vec![]),
        ]);
        let unit = run_expr(&Spine, &batch, &ty).unwrap();
        assert_eq!(unit.ident, "enc");
        assert_eq!(unit.decl, None);
    }
}
