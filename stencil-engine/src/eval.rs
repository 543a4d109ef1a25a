//! A small reference evaluator for generated code.
//!
//! Lets a host (and this crate's own tests) check a derivation end to end:
//! link the generated units against native leaf functions, then call them on
//! real values. Nothing here feeds production codegen; renders do.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use miette::Diagnostic;
use thiserror::Error;

use crate::code::{Arm, Code, Lit, Pat};
use crate::unit::Generated;

pub type EvalResult<T> = std::result::Result<T, EvalError>;

#[derive(Debug, Error, Diagnostic)]
pub enum EvalError {
    #[error("unbound identifier '{0}'")]
    #[diagnostic(code(stencil::eval::unbound))]
    Unbound(String),

    #[error("value is not a function")]
    #[diagnostic(code(stencil::eval::not_a_function))]
    NotAFunction,

    #[error("arity mismatch: expected {expected} arguments, got {got}")]
    #[diagnostic(code(stencil::eval::arity))]
    Arity { expected: usize, got: usize },

    #[error("no pattern matched the scrutinee")]
    #[diagnostic(code(stencil::eval::match_failed))]
    MatchFailed,

    /// A generated decoder rejected its input. Ordinary, recoverable.
    #[error("decode failed: {0}")]
    #[diagnostic(code(stencil::eval::decode))]
    Decode(String),

    #[error("type mismatch: {0}")]
    #[diagnostic(code(stencil::eval::type_mismatch))]
    Type(String),
}

type Native = Rc<dyn Fn(&[Value]) -> EvalResult<Value>>;

/// A runtime value.
#[derive(Clone)]
pub enum Value {
    Unit,
    Bool(bool),
    Int(i64),
    Str(String),
    Tuple(Vec<Value>),
    Record(Vec<(String, Value)>),
    Case { tag: String, args: Vec<Value> },
    CaseRecord {
        tag: String,
        fields: Vec<(String, Value)>,
    },
    Poly { tag: String, args: Vec<Value> },
    /// An opaque representation value, for wire-format round trips.
    Json(serde_json::Value),
    Closure {
        params: Vec<String>,
        body: Rc<Code>,
        scope: Scope,
    },
    Native(Native),
}

impl Value {
    pub fn str(v: impl Into<String>) -> Self {
        Value::Str(v.into())
    }

    pub fn case(tag: impl Into<String>, args: Vec<Value>) -> Self {
        Value::Case {
            tag: tag.into(),
            args,
        }
    }

    pub fn poly(tag: impl Into<String>, args: Vec<Value>) -> Self {
        Value::Poly {
            tag: tag.into(),
            args,
        }
    }

    pub fn record(fields: Vec<(&str, Value)>) -> Self {
        Value::Record(
            fields
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        )
    }

    pub fn some(inner: Value) -> Self {
        Value::case("Some", vec![inner])
    }

    pub fn none() -> Self {
        Value::case("None", vec![])
    }

    pub fn as_json(&self) -> EvalResult<&serde_json::Value> {
        match self {
            Value::Json(v) => Ok(v),
            other => Err(EvalError::Type(format!("expected a json value, got {other:?}"))),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => write!(f, "()"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Str(v) => write!(f, "{v:?}"),
            Value::Tuple(elems) => f.debug_list().entries(elems).finish(),
            Value::Record(fields) => {
                let mut map = f.debug_map();
                for (name, value) in fields {
                    map.entry(name, value);
                }
                map.finish()
            }
            Value::Case { tag, args } => {
                write!(f, "{tag}")?;
                if !args.is_empty() {
                    f.debug_list().entries(args).finish()?;
                }
                Ok(())
            }
            Value::CaseRecord { tag, fields } => {
                write!(f, "{tag}")?;
                let mut map = f.debug_map();
                for (name, value) in fields {
                    map.entry(name, value);
                }
                map.finish()
            }
            Value::Poly { tag, args } => {
                write!(f, "`{tag}")?;
                if !args.is_empty() {
                    f.debug_list().entries(args).finish()?;
                }
                Ok(())
            }
            Value::Json(v) => write!(f, "json({v})"),
            Value::Closure { params, .. } => write!(f, "<closure/{}>", params.len()),
            Value::Native(_) => write!(f, "<native>"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Unit, Value::Unit) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Tuple(a), Value::Tuple(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => a == b,
            (
                Value::Case { tag: ta, args: aa },
                Value::Case { tag: tb, args: ab },
            ) => ta == tb && aa == ab,
            (
                Value::CaseRecord {
                    tag: ta,
                    fields: fa,
                },
                Value::CaseRecord {
                    tag: tb,
                    fields: fb,
                },
            ) => ta == tb && fa == fb,
            (
                Value::Poly { tag: ta, args: aa },
                Value::Poly { tag: tb, args: ab },
            ) => ta == tb && aa == ab,
            (Value::Json(a), Value::Json(b)) => a == b,
            _ => false,
        }
    }
}

type Slot = Rc<RefCell<Option<Value>>>;

/// A lexical scope: an immutable chain of name/slot frames. Slots let
/// mutually recursive units see each other before every body is evaluated.
#[derive(Clone)]
pub struct Scope(Option<Rc<Frame>>);

struct Frame {
    name: String,
    slot: Slot,
    parent: Scope,
}

impl Scope {
    pub fn empty() -> Self {
        Scope(None)
    }

    fn with_slot(&self, name: impl Into<String>, slot: Slot) -> Scope {
        Scope(Some(Rc::new(Frame {
            name: name.into(),
            slot,
            parent: self.clone(),
        })))
    }

    pub fn bind(&self, name: impl Into<String>, value: Value) -> Scope {
        self.with_slot(name, Rc::new(RefCell::new(Some(value))))
    }

    fn declare(&self, name: impl Into<String>) -> (Scope, Slot) {
        let slot: Slot = Rc::new(RefCell::new(None));
        (self.with_slot(name, slot.clone()), slot)
    }

    fn lookup(&self, name: &str) -> EvalResult<Value> {
        let mut cursor = self;
        while let Some(frame) = &cursor.0 {
            if frame.name == name {
                return frame
                    .slot
                    .borrow()
                    .clone()
                    .ok_or_else(|| EvalError::Unbound(name.to_string()));
            }
            cursor = &frame.parent;
        }
        Err(EvalError::Unbound(name.to_string()))
    }
}

/// Evaluate one expression in a scope.
pub fn eval(code: &Code, scope: &Scope) -> EvalResult<Value> {
    match code {
        Code::Lit(lit) => Ok(lit_value(lit)),
        Code::Ident(name) => scope.lookup(name),
        Code::Lambda { params, body } => Ok(Value::Closure {
            params: params.clone(),
            body: Rc::new((**body).clone()),
            scope: scope.clone(),
        }),
        Code::Apply { func, args } => {
            let func = eval(func, scope)?;
            let args = args
                .iter()
                .map(|arg| eval(arg, scope))
                .collect::<EvalResult<Vec<_>>>()?;
            apply(&func, args)
        }
        Code::Let { name, value, body } => {
            let value = eval(value, scope)?;
            eval(body, &scope.bind(name.clone(), value))
        }
        Code::If {
            cond,
            then,
            otherwise,
        } => match eval(cond, scope)? {
            Value::Bool(true) => eval(then, scope),
            Value::Bool(false) => eval(otherwise, scope),
            other => Err(EvalError::Type(format!(
                "condition must be a bool, got {other:?}"
            ))),
        },
        Code::Match { scrutinee, arms } => {
            let value = eval(scrutinee, scope)?;
            eval_match(&value, arms, scope)
        }
        Code::Tuple(elems) => Ok(Value::Tuple(
            elems
                .iter()
                .map(|elem| eval(elem, scope))
                .collect::<EvalResult<Vec<_>>>()?,
        )),
        Code::Record(fields) => Ok(Value::Record(
            fields
                .iter()
                .map(|(name, value)| Ok((name.clone(), eval(value, scope)?)))
                .collect::<EvalResult<Vec<_>>>()?,
        )),
        Code::Case { tag, args } => Ok(Value::Case {
            tag: tag.clone(),
            args: args
                .iter()
                .map(|arg| eval(arg, scope))
                .collect::<EvalResult<Vec<_>>>()?,
        }),
        Code::CaseRecord { tag, fields } => Ok(Value::CaseRecord {
            tag: tag.clone(),
            fields: fields
                .iter()
                .map(|(name, value)| Ok((name.clone(), eval(value, scope)?)))
                .collect::<EvalResult<Vec<_>>>()?,
        }),
        Code::Poly { tag, args } => Ok(Value::Poly {
            tag: tag.clone(),
            args: args
                .iter()
                .map(|arg| eval(arg, scope))
                .collect::<EvalResult<Vec<_>>>()?,
        }),
        Code::Fail(message) => Err(EvalError::Decode(message.clone())),
    }
}

fn eval_match(value: &Value, arms: &[Arm], scope: &Scope) -> EvalResult<Value> {
    for arm in arms {
        let mut binds = Vec::new();
        if match_pat(&arm.pat, value, &mut binds) {
            let mut scope = scope.clone();
            for (name, bound) in binds {
                scope = scope.bind(name, bound);
            }
            return eval(&arm.body, &scope);
        }
    }
    Err(EvalError::MatchFailed)
}

/// Apply a function value.
pub fn apply(func: &Value, args: Vec<Value>) -> EvalResult<Value> {
    match func {
        Value::Closure {
            params,
            body,
            scope,
        } => {
            if params.len() != args.len() {
                return Err(EvalError::Arity {
                    expected: params.len(),
                    got: args.len(),
                });
            }
            let mut scope = scope.clone();
            for (param, arg) in params.iter().zip(args) {
                scope = scope.bind(param.clone(), arg);
            }
            eval(body, &scope)
        }
        Value::Native(f) => f(&args),
        _ => Err(EvalError::NotAFunction),
    }
}

fn lit_value(lit: &Lit) -> Value {
    match lit {
        Lit::Unit => Value::Unit,
        Lit::Bool(v) => Value::Bool(*v),
        Lit::Int(v) => Value::Int(*v),
        Lit::Str(v) => Value::Str(v.clone()),
    }
}

fn lit_matches(lit: &Lit, value: &Value) -> bool {
    match (lit, value) {
        (Lit::Unit, Value::Unit) => true,
        (Lit::Bool(a), Value::Bool(b)) => a == b,
        (Lit::Int(a), Value::Int(b)) => a == b,
        (Lit::Str(a), Value::Str(b)) => a == b,
        _ => false,
    }
}

fn match_pat(pat: &Pat, value: &Value, binds: &mut Vec<(String, Value)>) -> bool {
    match (pat, value) {
        (Pat::Wild, _) => true,
        (Pat::Bind(name), _) => {
            binds.push((name.clone(), value.clone()));
            true
        }
        (Pat::Lit(lit), _) => lit_matches(lit, value),
        (Pat::Tuple(pats), Value::Tuple(elems)) => {
            pats.len() == elems.len()
                && pats
                    .iter()
                    .zip(elems)
                    .all(|(pat, elem)| match_pat(pat, elem, binds))
        }
        (Pat::Record(pats), Value::Record(fields)) => pats.iter().all(|(name, pat)| {
            fields
                .iter()
                .find(|(field, _)| field == name)
                .is_some_and(|(_, field_value)| match_pat(pat, field_value, binds))
        }),
        (Pat::Case { tag, args: pats }, Value::Case { tag: vtag, args }) => {
            tag == vtag
                && pats.len() == args.len()
                && pats
                    .iter()
                    .zip(args)
                    .all(|(pat, arg)| match_pat(pat, arg, binds))
        }
        (
            Pat::CaseRecord { tag, fields: pats },
            Value::CaseRecord { tag: vtag, fields },
        ) => {
            tag == vtag
                && pats.iter().all(|(name, pat)| {
                    fields
                        .iter()
                        .find(|(field, _)| field == name)
                        .is_some_and(|(_, field_value)| match_pat(pat, field_value, binds))
                })
        }
        (Pat::Poly { tag, args: pats }, Value::Poly { tag: vtag, args }) => {
            tag == vtag
                && pats.len() == args.len()
                && pats
                    .iter()
                    .zip(args)
                    .all(|(pat, arg)| match_pat(pat, arg, binds))
        }
        (
            Pat::PolyInherit {
                binder,
                tags,
                excluding,
            },
            Value::Poly { tag, .. },
        ) => {
            let covered = match tags {
                Some(tags) => tags.iter().any(|t| t == tag),
                None => !excluding.iter().any(|t| t == tag),
            };
            if covered {
                binds.push((binder.clone(), value.clone()));
            }
            covered
        }
        _ => false,
    }
}

/// Links generated units against supplied globals and natives so they can be
/// called on real values.
#[derive(Default)]
pub struct Checker {
    globals: Vec<(String, Value)>,
}

impl Checker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global(mut self, name: impl Into<String>, value: Value) -> Self {
        self.globals.push((name.into(), value));
        self
    }

    pub fn native(
        self,
        name: impl Into<String>,
        f: impl Fn(&[Value]) -> EvalResult<Value> + 'static,
    ) -> Self {
        self.global(name, Value::Native(Rc::new(f)))
    }

    /// Evaluate every value unit and tie the recursive knot.
    ///
    /// All unit identifiers are declared up front, so bodies may reference
    /// any unit in the batch. Inside a unit's body the bare derivation names
    /// alias the units generated for the same declaration, honouring the
    /// self-reference rule.
    pub fn link(&self, items: &[Generated]) -> EvalResult<Linked> {
        let mut scope = Scope::empty();
        for (name, value) in &self.globals {
            scope = scope.bind(name.clone(), value.clone());
        }
        let units: Vec<_> = items.iter().filter_map(Generated::as_value).collect();
        let mut slots = Vec::with_capacity(units.len());
        for unit in &units {
            let (extended, slot) = scope.declare(&unit.ident);
            scope = extended;
            slots.push(slot);
        }
        let scopes: Vec<Scope> = units
            .iter()
            .map(|unit| {
                let mut unit_scope = scope.clone();
                if unit.decl.is_some() {
                    for (sibling, sibling_slot) in units.iter().zip(&slots) {
                        if sibling.decl == unit.decl {
                            unit_scope =
                                unit_scope.with_slot(&sibling.derivation, sibling_slot.clone());
                        }
                    }
                }
                unit_scope
            })
            .collect();
        // Lambda bodies close over their slots, so order never matters for
        // them. Constant bodies read slots immediately and may reference a
        // unit declared later in the batch; a unit hitting an unfilled slot
        // is retried after the rest of its pass. A pass that fills nothing
        // means the remaining units are genuinely unresolvable.
        let mut pending: Vec<usize> = (0..units.len()).collect();
        while !pending.is_empty() {
            let mut deferred = Vec::new();
            let mut blocked = None;
            for &i in &pending {
                match eval(&units[i].body, &scopes[i]) {
                    Ok(value) => *slots[i].borrow_mut() = Some(value),
                    Err(EvalError::Unbound(name)) => {
                        blocked = Some(EvalError::Unbound(name));
                        deferred.push(i);
                    }
                    Err(err) => return Err(err),
                }
            }
            if deferred.len() == pending.len() {
                // A full pass without progress: every deferred unit carries
                // an unbound reference nothing left to evaluate can fill.
                match blocked {
                    Some(err) => return Err(err),
                    None => break,
                }
            }
            pending = deferred;
        }
        Ok(Linked { scope })
    }
}

/// A linked batch: every unit evaluated and addressable by identifier.
pub struct Linked {
    scope: Scope,
}

impl std::fmt::Debug for Linked {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Linked").finish_non_exhaustive()
    }
}

impl Linked {
    pub fn get(&self, name: &str) -> EvalResult<Value> {
        self.scope.lookup(name)
    }

    pub fn call(&self, name: &str, args: Vec<Value>) -> EvalResult<Value> {
        let func = self.get(name)?;
        apply(&func, args)
    }
}
