//! The direct-match decoder combinator.
//!
//! Same walk as the cascade decoder, different rendering: the input (or a
//! discriminant projected from it) is matched once and each case becomes an
//! arm. A wildcard arm carries the decode failure. Open-sum declarations
//! still get a probe; its body is built from grouped matches so declared
//! interleaving with inclusions is preserved.

use stencil_ir::{Batch, TypeDecl, TypeExpr};
use stencil_reflect::raw::{RawDecl, RawTypeExpr};
use stencil_reflect::{reflect_batch, reflect_expr};

use super::decoder::{no_match_message, probe_and_main, DecodeField, DecodePayload, PolySite, TagSite};
use super::{require, CaseCtx};
use crate::code::{Arm, Code, Pat};
use crate::derive::Derive;
use crate::engine::arity1::{
    self, CasePayload, CaseView, Child, ExprDerive, FieldChild, PolyView, Walker,
};
use crate::engine::INPUT;
use crate::error::Result;
use crate::unit::{Generated, GeneratedUnit, Sig};

type TupleHook = Box<dyn Fn(Code, &[Code]) -> Code>;
type RecordHook = Box<dyn Fn(Code, &[DecodeField]) -> Code>;
type ScrutineeHook = Box<dyn Fn(Code) -> Code>;
type CaseArmHook = Box<dyn Fn(&TagSite, Code) -> (Pat, Code)>;
type EnumCaseArmHook = Box<dyn Fn(&CaseCtx) -> (Pat, Code)>;
type PolyArmHook = Box<dyn Fn(&PolySite, Code) -> (Pat, Code)>;

/// Builds a direct-match decoding derivation.
///
/// The `scrutinee` callback projects the matched discriminant out of the
/// input (e.g. the tag slot of a tagged array); arm callbacks return the
/// pattern it must match together with the decoded value.
pub struct MatchDecoder {
    name: String,
    rep: String,
    tuple: Option<TupleHook>,
    record: Option<RecordHook>,
    scrutinee: Option<ScrutineeHook>,
    case_arm: Option<CaseArmHook>,
    enum_case_arm: Option<EnumCaseArmHook>,
    poly_arm: Option<PolyArmHook>,
}

impl MatchDecoder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rep: "rep".to_string(),
            tuple: None,
            record: None,
            scrutinee: None,
            case_arm: None,
            enum_case_arm: None,
            poly_arm: None,
        }
    }

    pub fn rep(mut self, rep: impl Into<String>) -> Self {
        self.rep = rep.into();
        self
    }

    pub fn tuple(mut self, f: impl Fn(Code, &[Code]) -> Code + 'static) -> Self {
        self.tuple = Some(Box::new(f));
        self
    }

    pub fn record(mut self, f: impl Fn(Code, &[DecodeField]) -> Code + 'static) -> Self {
        self.record = Some(Box::new(f));
        self
    }

    pub fn scrutinee(mut self, f: impl Fn(Code) -> Code + 'static) -> Self {
        self.scrutinee = Some(Box::new(f));
        self
    }

    pub fn case_arm(mut self, f: impl Fn(&TagSite, Code) -> (Pat, Code) + 'static) -> Self {
        self.case_arm = Some(Box::new(f));
        self
    }

    pub fn enum_case_arm(mut self, f: impl Fn(&CaseCtx) -> (Pat, Code) + 'static) -> Self {
        self.enum_case_arm = Some(Box::new(f));
        self
    }

    pub fn poly_arm(mut self, f: impl Fn(&PolySite, Code) -> (Pat, Code) + 'static) -> Self {
        self.poly_arm = Some(Box::new(f));
        self
    }

    fn poly_arm_for(&self, tag: &str, attrs: &[stencil_ir::Attr], args: &[Child], input: &Code) -> Result<(Pat, Code)> {
        let hook = require(&self.name, &self.poly_arm, "poly_arm")?;
        let site = PolySite {
            tag,
            attrs,
            args: args.iter().map(Child::as_fn).collect::<Result<Vec<_>>>()?,
        };
        Ok(hook(&site, input.clone()))
    }

    /// Probe body over grouped matches. Consecutive local constructs share
    /// one match; each inclusion breaks the run and chains through the
    /// included sum's probe, keeping declared order.
    fn probe_by_match(&self, walker: &Walker, cases: &[PolyView], input: &Code) -> Result<Code> {
        let scrutinee = require(&self.name, &self.scrutinee, "scrutinee")?;
        enum Segment {
            Locals(Vec<(Pat, Code)>),
            Probe(Code),
        }
        let mut segments: Vec<Segment> = Vec::new();
        for case in cases {
            match case {
                PolyView::Construct { tag, attrs, args } => {
                    let arm = self.poly_arm_for(tag, attrs, args, input)?;
                    match segments.last_mut() {
                        Some(Segment::Locals(arms)) => arms.push(arm),
                        _ => segments.push(Segment::Locals(vec![arm])),
                    }
                }
                PolyView::Inherit { name, args } => {
                    segments.push(Segment::Probe(walker.probe_call(name, args, input.clone())?));
                }
            }
        }
        let mut rest = Code::none();
        for segment in segments.into_iter().rev() {
            rest = match segment {
                Segment::Locals(arms) => {
                    let mut match_arms: Vec<Arm> = arms
                        .into_iter()
                        .map(|(pat, body)| Arm::new(pat, Code::some(body)))
                        .collect();
                    match_arms.push(Arm::new(Pat::Wild, rest));
                    Code::match_(scrutinee(input.clone()), match_arms)
                }
                Segment::Probe(probe) => Code::match_(
                    probe,
                    vec![
                        Arm::new(Pat::some(Pat::bind("r")), Code::some(Code::ident("r"))),
                        Arm::new(Pat::none(), rest),
                    ],
                ),
            };
        }
        Ok(rest)
    }
}

impl ExprDerive for MatchDecoder {
    fn derivation(&self) -> &str {
        &self.name
    }

    fn on_tuple(&self, _walker: &Walker, elems: &[Child], input: Code) -> Result<Code> {
        let hook = require(&self.name, &self.tuple, "tuple")?;
        let decoders = elems.iter().map(Child::as_fn).collect::<Result<Vec<_>>>()?;
        Ok(hook(input, &decoders))
    }

    fn on_record(&self, _walker: &Walker, fields: &[FieldChild], input: Code) -> Result<Code> {
        let hook = require(&self.name, &self.record, "record")?;
        let decoders = fields
            .iter()
            .map(|field| {
                Ok(DecodeField {
                    name: field.name,
                    attrs: field.attrs,
                    decoder: field.child.as_fn()?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(hook(input, &decoders))
    }

    fn on_variant(&self, walker: &Walker, cases: &[CaseView], input: Code) -> Result<Code> {
        let scrutinee = require(&self.name, &self.scrutinee, "scrutinee")?;
        let enumerated = cases.iter().all(CaseView::is_nullary) && self.enum_case_arm.is_some();
        let mut arms = Vec::with_capacity(cases.len() + 1);
        for case in cases {
            let (pat, body) = if enumerated {
                let hook = require(&self.name, &self.enum_case_arm, "enum_case_arm")?;
                hook(&CaseCtx {
                    tag: case.name,
                    attrs: case.attrs,
                })
            } else {
                let hook = require(&self.name, &self.case_arm, "case_arm")?;
                let site = TagSite {
                    tag: case.name,
                    attrs: case.attrs,
                    payload: match &case.payload {
                        CasePayload::Tuple(args) => DecodePayload::Tuple(
                            args.iter().map(Child::as_fn).collect::<Result<Vec<_>>>()?,
                        ),
                        CasePayload::Record(fields) => DecodePayload::Record(
                            fields
                                .iter()
                                .map(|field| {
                                    Ok(DecodeField {
                                        name: field.name,
                                        attrs: field.attrs,
                                        decoder: field.child.as_fn()?,
                                    })
                                })
                                .collect::<Result<Vec<_>>>()?,
                        ),
                    },
                };
                hook(&site, input.clone())
            };
            arms.push(Arm::new(pat, body));
        }
        arms.push(Arm::new(Pat::Wild, Code::fail(no_match_message(walker))));
        Ok(Code::match_(scrutinee(input), arms))
    }

    fn on_open_sum(&self, walker: &Walker, cases: &[PolyView], input: Code) -> Result<Code> {
        let probed = self.probe_by_match(walker, cases, &input)?;
        Ok(Code::match_(
            probed,
            vec![
                Arm::new(Pat::some(Pat::bind("r")), Code::ident("r")),
                Arm::new(Pat::none(), Code::fail(no_match_message(walker))),
            ],
        ))
    }

    fn on_open_sum_decl(
        &self,
        walker: &Walker,
        decl: &TypeDecl,
        cases: &[PolyView],
        input: Code,
    ) -> Result<(Code, Option<GeneratedUnit>)> {
        let probe_body = self.probe_by_match(walker, cases, &Code::ident(INPUT))?;
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

impl Derive for MatchDecoder {
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
