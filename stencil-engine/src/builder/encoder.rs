//! The encoder combinator: model value in, representation out.

use stencil_ir::{Batch, TypeDecl, TypeExpr};
use stencil_reflect::raw::{RawDecl, RawTypeExpr};
use stencil_reflect::{reflect_batch, reflect_expr};

use super::{positional_binds, require, CaseCtx};
use crate::code::{Arm, Code, Pat};
use crate::derive::Derive;
use crate::engine::arity1::{
    self, CasePayload, CaseView, Child, ExprDerive, FieldChild, PolyView, Walker,
};
use crate::error::Result;
use crate::unit::{Generated, Sig};

/// A record field with the code that encodes its bound value.
pub struct EncodedField<'w> {
    pub name: &'w str,
    pub attrs: &'w [stencil_ir::Attr],
    pub code: Code,
}

type TupleHook = Box<dyn Fn(&[Code]) -> Code>;
type RecordHook = Box<dyn Fn(&[EncodedField]) -> Code>;
type CaseTupleHook = Box<dyn Fn(&CaseCtx, &[Code]) -> Code>;
type CaseRecordHook = Box<dyn Fn(&CaseCtx, &[EncodedField]) -> Code>;
type EnumCaseHook = Box<dyn Fn(&CaseCtx) -> Code>;

/// Builds an encoding derivation from per-shape callbacks.
///
/// The engine destructures the input (match on cases, binders for payload
/// slots) and hands callbacks the already-encoded pieces; callbacks only
/// assemble the representation. Enumerated callbacks are optional denser
/// forms used when every case of a sum is payload-free.
pub struct Encoder {
    name: String,
    rep: String,
    tuple: Option<TupleHook>,
    record: Option<RecordHook>,
    case_tuple: Option<CaseTupleHook>,
    case_record: Option<CaseRecordHook>,
    enum_case: Option<EnumCaseHook>,
    poly_case: Option<CaseTupleHook>,
    enum_poly_case: Option<EnumCaseHook>,
}

impl Encoder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rep: "rep".to_string(),
            tuple: None,
            record: None,
            case_tuple: None,
            case_record: None,
            enum_case: None,
            poly_case: None,
            enum_poly_case: None,
        }
    }

    /// Name of the representation type used in signatures.
    pub fn rep(mut self, rep: impl Into<String>) -> Self {
        self.rep = rep.into();
        self
    }

    pub fn tuple(mut self, f: impl Fn(&[Code]) -> Code + 'static) -> Self {
        self.tuple = Some(Box::new(f));
        self
    }

    pub fn record(mut self, f: impl Fn(&[EncodedField]) -> Code + 'static) -> Self {
        self.record = Some(Box::new(f));
        self
    }

    pub fn case_tuple(mut self, f: impl Fn(&CaseCtx, &[Code]) -> Code + 'static) -> Self {
        self.case_tuple = Some(Box::new(f));
        self
    }

    pub fn case_record(mut self, f: impl Fn(&CaseCtx, &[EncodedField]) -> Code + 'static) -> Self {
        self.case_record = Some(Box::new(f));
        self
    }

    pub fn enum_case(mut self, f: impl Fn(&CaseCtx) -> Code + 'static) -> Self {
        self.enum_case = Some(Box::new(f));
        self
    }

    pub fn poly_case(mut self, f: impl Fn(&CaseCtx, &[Code]) -> Code + 'static) -> Self {
        self.poly_case = Some(Box::new(f));
        self
    }

    pub fn enum_poly_case(mut self, f: impl Fn(&CaseCtx) -> Code + 'static) -> Self {
        self.enum_poly_case = Some(Box::new(f));
        self
    }

    fn encode_tuple_payload(&self, args: &[Child]) -> Result<(Vec<Pat>, Vec<Code>)> {
        let binds = positional_binds(args.len());
        let encoded = args
            .iter()
            .zip(&binds)
            .map(|(arg, bind)| arg.derive(Code::ident(bind.clone())))
            .collect::<Result<Vec<_>>>()?;
        Ok((binds.into_iter().map(Pat::Bind).collect(), encoded))
    }

    fn encode_record_payload<'w>(
        &self,
        fields: &'w [FieldChild<'w>],
    ) -> Result<(Vec<(String, Pat)>, Vec<EncodedField<'w>>)> {
        let pats = fields
            .iter()
            .map(|field| (field.name.to_string(), Pat::bind(field.name)))
            .collect();
        let encoded = fields
            .iter()
            .map(|field| {
                Ok(EncodedField {
                    name: field.name,
                    attrs: field.attrs,
                    code: field.child.derive(Code::ident(field.name))?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok((pats, encoded))
    }
}

impl ExprDerive for Encoder {
    fn derivation(&self) -> &str {
        &self.name
    }

    fn on_tuple(&self, _walker: &Walker, elems: &[Child], input: Code) -> Result<Code> {
        let hook = require(&self.name, &self.tuple, "tuple")?;
        let (pats, encoded) = self.encode_tuple_payload(elems)?;
        Ok(Code::match_(
            input,
            vec![Arm::new(Pat::Tuple(pats), hook(&encoded))],
        ))
    }

    fn on_record(&self, _walker: &Walker, fields: &[FieldChild], input: Code) -> Result<Code> {
        let hook = require(&self.name, &self.record, "record")?;
        let (pats, encoded) = self.encode_record_payload(fields)?;
        Ok(Code::match_(
            input,
            vec![Arm::new(Pat::Record(pats), hook(&encoded))],
        ))
    }

    fn on_variant(&self, _walker: &Walker, cases: &[CaseView], input: Code) -> Result<Code> {
        let enumerated = cases.iter().all(CaseView::is_nullary) && self.enum_case.is_some();
        let mut arms = Vec::with_capacity(cases.len());
        for case in cases {
            let ctx = CaseCtx {
                tag: case.name,
                attrs: case.attrs,
            };
            let (pat, body) = if enumerated {
                let hook = require(&self.name, &self.enum_case, "enum_case")?;
                (nullary_pat(case), hook(&ctx))
            } else {
                match &case.payload {
                    CasePayload::Tuple(args) => {
                        let hook = require(&self.name, &self.case_tuple, "case_tuple")?;
                        let (pats, encoded) = self.encode_tuple_payload(args)?;
                        (Pat::case(case.name, pats), hook(&ctx, &encoded))
                    }
                    CasePayload::Record(fields) => {
                        let hook = require(&self.name, &self.case_record, "case_record")?;
                        let (pats, encoded) = self.encode_record_payload(fields)?;
                        (
                            Pat::CaseRecord {
                                tag: case.name.to_string(),
                                fields: pats,
                            },
                            hook(&ctx, &encoded),
                        )
                    }
                }
            };
            arms.push(Arm::new(pat, body));
        }
        Ok(Code::match_(input, arms))
    }

    fn on_open_sum(&self, walker: &Walker, cases: &[PolyView], input: Code) -> Result<Code> {
        let enumerated = arity1::is_enumerated_poly(cases) && self.enum_poly_case.is_some();
        let mut arms = Vec::with_capacity(cases.len());
        for (i, case) in cases.iter().enumerate() {
            let arm = match case {
                PolyView::Construct { tag, attrs, args } => {
                    let ctx = CaseCtx { tag, attrs };
                    if enumerated {
                        let hook = require(&self.name, &self.enum_poly_case, "enum_poly_case")?;
                        Arm::new(Pat::poly(*tag, vec![]), hook(&ctx))
                    } else {
                        let hook = require(&self.name, &self.poly_case, "poly_case")?;
                        let (pats, encoded) = self.encode_tuple_payload(args)?;
                        Arm::new(Pat::poly(*tag, pats), hook(&ctx, &encoded))
                    }
                }
                // Tags covered by an inclusion delegate wholesale to the
                // included sum's encoder. First matching arm wins, so a
                // shadowed tag never reaches a later entry. When the included
                // sum's tags are unknowable the arm matches anything except
                // the local constructs still waiting in later arms.
                PolyView::Inherit { name, args } => {
                    let tags = walker.env.inherited_tags(name);
                    let excluding = if tags.is_none() {
                        later_construct_tags(&cases[i + 1..])
                    } else {
                        vec![]
                    };
                    Arm::new(
                        Pat::PolyInherit {
                            binder: "x".to_string(),
                            tags,
                            excluding,
                        },
                        walker.reference_call(name, args, Code::ident("x"))?,
                    )
                }
            };
            arms.push(arm);
        }
        Ok(Code::match_(input, arms))
    }

    fn signature(&self, decl: &TypeDecl) -> Sig {
        super::encode_sig(decl, &self.rep)
    }

    fn expr_signature(&self, ty: &TypeExpr) -> Sig {
        Sig::arrow(Sig::Ty(ty.clone()), Sig::named(&self.rep))
    }
}

impl Derive for Encoder {
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

fn later_construct_tags(cases: &[PolyView]) -> Vec<String> {
    cases
        .iter()
        .filter_map(|case| match case {
            PolyView::Construct { tag, .. } => Some(tag.to_string()),
            PolyView::Inherit { .. } => None,
        })
        .collect()
}

fn nullary_pat(case: &CaseView) -> Pat {
    match &case.payload {
        CasePayload::Tuple(_) => Pat::case(case.name, vec![]),
        CasePayload::Record(_) => Pat::CaseRecord {
            tag: case.name.to_string(),
            fields: vec![],
        },
    }
}
