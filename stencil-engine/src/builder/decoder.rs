//! The cascade decoder combinator: representation in, model value out.
//!
//! Case callbacks return *attempts*, expressions yielding `Some(value)` or
//! `None`, tried in declared order. The first success wins; exhaustion is a
//! typed decode failure. The same cascade yields open-sum probes for free:
//! a probe is the cascade without the failure fallback.

use stencil_ir::{Attr, Batch, TypeDecl, TypeExpr};
use stencil_reflect::raw::{RawDecl, RawTypeExpr};
use stencil_reflect::{reflect_batch, reflect_expr};

use super::{require, CaseCtx};
use crate::code::{Arm, Code, Pat};
use crate::derive::Derive;
use crate::engine::arity1::{
    self, wrap_params, CasePayload, CaseView, Child, ExprDerive, FieldChild, PolyView, Walker,
};
use crate::engine::INPUT;
use crate::error::Result;
use crate::naming;
use crate::unit::{Generated, GeneratedUnit, Sig};

/// A record field with the code that decodes it (a one-argument function).
pub struct DecodeField<'w> {
    pub name: &'w str,
    pub attrs: &'w [Attr],
    pub decoder: Code,
}

/// Payload decoders for one closed-sum case.
pub enum DecodePayload<'w> {
    Tuple(Vec<Code>),
    Record(Vec<DecodeField<'w>>),
}

/// One closed-sum case site handed to the `case` callback.
pub struct TagSite<'w> {
    pub tag: &'w str,
    pub attrs: &'w [Attr],
    pub payload: DecodePayload<'w>,
}

/// One open-sum construct site handed to the `poly_case` callback.
pub struct PolySite<'w> {
    pub tag: &'w str,
    pub attrs: &'w [Attr],
    pub args: Vec<Code>,
}

type TupleHook = Box<dyn Fn(Code, &[Code]) -> Code>;
type RecordHook = Box<dyn Fn(Code, &[DecodeField]) -> Code>;
type CaseHook = Box<dyn Fn(&TagSite, Code) -> Code>;
type EnumCaseHook = Box<dyn Fn(&CaseCtx, Code) -> Code>;
type PolyHook = Box<dyn Fn(&PolySite, Code) -> Code>;

/// Builds a decoding derivation from per-shape callbacks.
pub struct Decoder {
    name: String,
    rep: String,
    tuple: Option<TupleHook>,
    record: Option<RecordHook>,
    case: Option<CaseHook>,
    enum_case: Option<EnumCaseHook>,
    poly_case: Option<PolyHook>,
    enum_poly_case: Option<EnumCaseHook>,
}

impl Decoder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rep: "rep".to_string(),
            tuple: None,
            record: None,
            case: None,
            enum_case: None,
            poly_case: None,
            enum_poly_case: None,
        }
    }

    pub fn rep(mut self, rep: impl Into<String>) -> Self {
        self.rep = rep.into();
        self
    }

    /// Decode a tuple: the callback gets the input and one decoder function
    /// per element, in order.
    pub fn tuple(mut self, f: impl Fn(Code, &[Code]) -> Code + 'static) -> Self {
        self.tuple = Some(Box::new(f));
        self
    }

    pub fn record(mut self, f: impl Fn(Code, &[DecodeField]) -> Code + 'static) -> Self {
        self.record = Some(Box::new(f));
        self
    }

    /// Attempt one closed-sum case; must yield `Some`/`None`.
    pub fn case(mut self, f: impl Fn(&TagSite, Code) -> Code + 'static) -> Self {
        self.case = Some(Box::new(f));
        self
    }

    pub fn enum_case(mut self, f: impl Fn(&CaseCtx, Code) -> Code + 'static) -> Self {
        self.enum_case = Some(Box::new(f));
        self
    }

    /// Attempt one open-sum construct; must yield `Some`/`None`.
    pub fn poly_case(mut self, f: impl Fn(&PolySite, Code) -> Code + 'static) -> Self {
        self.poly_case = Some(Box::new(f));
        self
    }

    pub fn enum_poly_case(mut self, f: impl Fn(&CaseCtx, Code) -> Code + 'static) -> Self {
        self.enum_poly_case = Some(Box::new(f));
        self
    }

    fn payload_decoders<'w>(&self, payload: &'w CasePayload<'w>) -> Result<DecodePayload<'w>> {
        Ok(match payload {
            CasePayload::Tuple(args) => DecodePayload::Tuple(child_fns(args)?),
            CasePayload::Record(fields) => DecodePayload::Record(field_fns(fields)?),
        })
    }

    /// One attempt expression per open-sum entry; inclusions become probe
    /// calls on the included sum.
    fn poly_attempts(&self, walker: &Walker, cases: &[PolyView], input: &Code) -> Result<Vec<Code>> {
        let enumerated = arity1::is_enumerated_poly(cases) && self.enum_poly_case.is_some();
        cases
            .iter()
            .map(|case| match case {
                PolyView::Construct { tag, attrs, args } => {
                    if enumerated {
                        let hook = require(&self.name, &self.enum_poly_case, "enum_poly_case")?;
                        Ok(hook(&CaseCtx { tag, attrs }, input.clone()))
                    } else {
                        let hook = require(&self.name, &self.poly_case, "poly_case")?;
                        let site = PolySite {
                            tag,
                            attrs,
                            args: child_fns(args)?,
                        };
                        Ok(hook(&site, input.clone()))
                    }
                }
                PolyView::Inherit { name, args } => {
                    walker.probe_call(name, args, input.clone())
                }
            })
            .collect()
    }
}

fn child_fns(args: &[Child]) -> Result<Vec<Code>> {
    args.iter().map(Child::as_fn).collect()
}

fn field_fns<'w>(fields: &'w [FieldChild<'w>]) -> Result<Vec<DecodeField<'w>>> {
    fields
        .iter()
        .map(|field| {
            Ok(DecodeField {
                name: field.name,
                attrs: field.attrs,
                decoder: field.child.as_fn()?,
            })
        })
        .collect()
}

/// Chain attempts into a value: the first `Some` unwraps, exhaustion hits
/// the fallback.
pub(crate) fn fold_attempts(attempts: Vec<Code>, fallback: Code) -> Code {
    attempts.into_iter().rev().fold(fallback, |rest, attempt| {
        Code::match_(
            attempt,
            vec![
                Arm::new(Pat::some(Pat::bind("r")), Code::ident("r")),
                Arm::new(Pat::none(), rest),
            ],
        )
    })
}

/// Chain attempts into an option: the first `Some` is the answer, exhaustion
/// is `None`.
pub(crate) fn fold_probe(attempts: Vec<Code>) -> Code {
    attempts.into_iter().rev().fold(Code::none(), |rest, attempt| {
        Code::match_(
            attempt,
            vec![
                Arm::new(Pat::some(Pat::bind("r")), Code::some(Code::ident("r"))),
                Arm::new(Pat::none(), rest),
            ],
        )
    })
}

/// Message for a decode cascade that ran out of attempts.
pub(crate) fn no_match_message(walker: &Walker) -> String {
    match walker.env.current {
        Some(name) => format!("no case of {name} matched"),
        None => "no case matched".to_string(),
    }
}

/// Wrap a declaration-level open sum around its probe: emit the probe as a
/// named companion unit and make the main unit delegate to it.
pub(crate) fn probe_and_main(
    walker: &Walker,
    decl: &TypeDecl,
    rep: &str,
    probe_body: Code,
    input: Code,
) -> (Code, GeneratedUnit) {
    let probe_derivation = naming::probe_derivation(walker.env.derivation);
    let probe = GeneratedUnit {
        derivation: probe_derivation.clone(),
        decl: Some(decl.name.clone()),
        ident: naming::unit_ident(&probe_derivation, &decl.name),
        sig: super::probe_sig(decl, rep),
        body: wrap_params(&decl.params, probe_body),
    };
    let mut call_args: Vec<Code> = decl
        .params
        .iter()
        .map(|p| Code::ident(naming::param_handler(p)))
        .collect();
    call_args.push(input);
    // Self-reference: the main unit calls its own probe by bare name.
    let main = Code::match_(
        Code::call(walker.env.probe_ident(&decl.name), call_args),
        vec![
            Arm::new(Pat::some(Pat::bind("r")), Code::ident("r")),
            Arm::new(
                Pat::none(),
                Code::fail(format!("no case of {} matched", decl.name)),
            ),
        ],
    );
    (main, probe)
}

impl ExprDerive for Decoder {
    fn derivation(&self) -> &str {
        &self.name
    }

    fn on_tuple(&self, _walker: &Walker, elems: &[Child], input: Code) -> Result<Code> {
        let hook = require(&self.name, &self.tuple, "tuple")?;
        Ok(hook(input, &child_fns(elems)?))
    }

    fn on_record(&self, _walker: &Walker, fields: &[FieldChild], input: Code) -> Result<Code> {
        let hook = require(&self.name, &self.record, "record")?;
        Ok(hook(input, &field_fns(fields)?))
    }

    fn on_variant(&self, walker: &Walker, cases: &[CaseView], input: Code) -> Result<Code> {
        let enumerated = cases.iter().all(CaseView::is_nullary) && self.enum_case.is_some();
        let attempts = cases
            .iter()
            .map(|case| {
                let ctx = CaseCtx {
                    tag: case.name,
                    attrs: case.attrs,
                };
                if enumerated {
                    let hook = require(&self.name, &self.enum_case, "enum_case")?;
                    Ok(hook(&ctx, input.clone()))
                } else {
                    let hook = require(&self.name, &self.case, "case")?;
                    let site = TagSite {
                        tag: case.name,
                        attrs: case.attrs,
                        payload: self.payload_decoders(&case.payload)?,
                    };
                    Ok(hook(&site, input.clone()))
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(fold_attempts(
            attempts,
            Code::fail(no_match_message(walker)),
        ))
    }

    fn on_open_sum(&self, walker: &Walker, cases: &[PolyView], input: Code) -> Result<Code> {
        let attempts = self.poly_attempts(walker, cases, &input)?;
        Ok(fold_attempts(
            attempts,
            Code::fail(no_match_message(walker)),
        ))
    }

    fn on_open_sum_decl(
        &self,
        walker: &Walker,
        decl: &TypeDecl,
        cases: &[PolyView],
        input: Code,
    ) -> Result<(Code, Option<GeneratedUnit>)> {
        let attempts = self.poly_attempts(walker, cases, &Code::ident(INPUT))?;
        let probe_body = fold_probe(attempts);
        let (main, probe) = probe_and_main(walker, decl, &self.rep, probe_body, input);
        Ok((main, Some(probe)))
    }

    fn signature(&self, decl: &TypeDecl) -> Sig {
        super::decode_sig(decl, &self.rep)
    }

    fn expr_signature(&self, ty: &TypeExpr) -> Sig {
        Sig::arrow(Sig::named(&self.rep), Sig::Ty(ty.clone()))
    }
}

impl Derive for Decoder {
    fn name(&self) -> &str {
        &self.name
    }

    fn derive_batch(&self, decls: &[RawDecl]) -> Result<Vec<Generated>> {
        let batch = reflect_batch(decls)?;
        arity1::run(self, &batch)
    }

    fn derive_expr(&self, expr: &RawTypeExpr) -> Result<Vec<Generated>> {
        let ty = reflect_expr(expr)?;
        let batch = Batch::new();
        Ok(vec![Generated::Value(arity1::run_expr(self, &batch, &ty)?)])
    }
}

#[cfg(test)]
mod tests {
    use stencil_ir::{DeclShape, PolyCase};

    use super::*;
    use crate::engine::arity1::run;

    fn json_decoder() -> Decoder {
        Decoder::new("of_json")
            .rep("json")
            .tuple(|input, elems| {
                Code::tuple(
                    elems
                        .iter()
                        .enumerate()
                        .map(|(i, dec)| {
                            Code::apply(
                                dec.clone(),
                                vec![Code::call(
                                    "json.nth",
                                    vec![input.clone(), Code::int(i as i64)],
                                )],
                            )
                        })
                        .collect(),
                )
            })
            .record(|input, fields| {
                Code::record(
                    fields
                        .iter()
                        .map(|f| {
                            (
                                f.name.to_string(),
                                Code::apply(
                                    f.decoder.clone(),
                                    vec![Code::call(
                                        "json.get",
                                        vec![input.clone(), Code::str(f.name)],
                                    )],
                                ),
                            )
                        })
                        .collect(),
                )
            })
            .poly_case(|site, input| {
                Code::if_(
                    Code::call("json.is_tag", vec![input.clone(), Code::str(site.tag)]),
                    Code::some(Code::poly(site.tag, vec![])),
                    Code::none(),
                )
            })
    }

    #[test]
    fn test_open_sum_decl_emits_probe_first() {
        let batch: Batch = vec![TypeDecl::new(
            "color",
            DeclShape::Alias(TypeExpr::polyvariant(vec![
                PolyCase::construct("Red", vec![]),
                PolyCase::construct("Green", vec![]),
            ])),
        )]
        .into_iter()
        .collect();
        let out = run(&json_decoder(), &batch).unwrap();
        assert_eq!(out.len(), 2);
        let probe = out[0].as_value().unwrap();
        assert_eq!(probe.ident, "of_json_poly_color");
        assert_eq!(probe.derivation, "of_json_poly");
        assert_eq!(probe.sig.to_string(), "json => option(color)");
        let main = out[1].as_value().unwrap();
        assert_eq!(main.ident, "of_json_color");
        assert!(main.body.mentions("of_json_poly"));
        assert!(!main.body.mentions("of_json_poly_color"));
    }

    #[test]
    fn test_inherit_delegates_to_included_probe() {
        let batch: Batch = vec![
            TypeDecl::new(
                "base",
                DeclShape::Alias(TypeExpr::polyvariant(vec![PolyCase::construct(
                    "B",
                    vec![],
                )])),
            ),
            TypeDecl::new(
                "full",
                DeclShape::Alias(TypeExpr::polyvariant(vec![
                    PolyCase::construct("F", vec![]),
                    PolyCase::inherit("base", vec![]),
                ])),
            ),
        ]
        .into_iter()
        .collect();
        let out = run(&json_decoder(), &batch).unwrap();
        let probe = out[2].as_value().unwrap();
        assert_eq!(probe.ident, "of_json_poly_full");
        assert!(probe.body.mentions("of_json_poly_base"));
    }

    #[test]
    fn test_cascade_falls_through_to_failure() {
        let batch: Batch = vec![TypeDecl::new(
            "pair",
            DeclShape::Alias(TypeExpr::tuple(vec![
                TypeExpr::opaque("int", vec![]),
                TypeExpr::opaque("string", vec![]),
            ])),
        )]
        .into_iter()
        .collect();
        let out = run(&json_decoder(), &batch).unwrap();
        let unit = out[0].as_value().unwrap();
        assert!(unit.body.mentions("of_json_int"));
        assert!(unit.body.mentions("of_json_string"));
    }

    #[test]
    fn test_fold_attempts_order() {
        let chained = fold_attempts(
            vec![Code::ident("first"), Code::ident("second")],
            Code::fail("out"),
        );
        match &chained {
            Code::Match { scrutinee, arms } => {
                assert_eq!(**scrutinee, Code::ident("first"));
                match &arms[1].body {
                    Code::Match { scrutinee, arms } => {
                        assert_eq!(**scrutinee, Code::ident("second"));
                        assert_eq!(arms[1].body, Code::fail("out"));
                    }
                    other => panic!("expected nested match, got {other:?}"),
                }
            }
            other => panic!("expected match, got {other:?}"),
        }
    }
}
