//! Target-neutral generated-code expressions.
//!
//! Derivations emit [`Code`] trees instead of strings. Nodes represent the
//! *meaning* of generated code, not syntax: a host can render them into a
//! concrete target language, and the reference evaluator in [`crate::eval`]
//! can run them directly to check a derivation without trusting it.
//!
//! Options are ordinary sum values: `Some`/`None` built with [`Code::some`]
//! and [`Code::none`], matched with [`Pat::some`] and [`Pat::none`]. The
//! open-sum probe machinery leans on this.

/// A literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Lit {
    Unit,
    Bool(bool),
    Int(i64),
    Str(String),
}

/// One arm of a matching construct.
#[derive(Debug, Clone, PartialEq)]
pub struct Arm {
    pub pat: Pat,
    pub body: Code,
}

impl Arm {
    pub fn new(pat: Pat, body: Code) -> Self {
        Self { pat, body }
    }
}

/// A generated expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Code {
    Lit(Lit),
    Ident(String),
    Lambda {
        params: Vec<String>,
        body: Box<Code>,
    },
    Apply {
        func: Box<Code>,
        args: Vec<Code>,
    },
    Let {
        name: String,
        value: Box<Code>,
        body: Box<Code>,
    },
    If {
        cond: Box<Code>,
        then: Box<Code>,
        otherwise: Box<Code>,
    },
    Match {
        scrutinee: Box<Code>,
        arms: Vec<Arm>,
    },
    /// Construct a model tuple.
    Tuple(Vec<Code>),
    /// Construct a model record, fields in declared order.
    Record(Vec<(String, Code)>),
    /// Construct a closed-sum case with positional payload.
    Case { tag: String, args: Vec<Code> },
    /// Construct a closed-sum case with field-named payload.
    CaseRecord {
        tag: String,
        fields: Vec<(String, Code)>,
    },
    /// Construct an open-sum value.
    Poly { tag: String, args: Vec<Code> },
    /// A typed decode failure. Evaluates to a decode error, never a fault.
    Fail(String),
}

impl Code {
    pub fn unit() -> Self {
        Code::Lit(Lit::Unit)
    }

    pub fn bool(v: bool) -> Self {
        Code::Lit(Lit::Bool(v))
    }

    pub fn int(v: i64) -> Self {
        Code::Lit(Lit::Int(v))
    }

    pub fn str(v: impl Into<String>) -> Self {
        Code::Lit(Lit::Str(v.into()))
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Code::Ident(name.into())
    }

    pub fn lambda(params: Vec<impl Into<String>>, body: Code) -> Self {
        Code::Lambda {
            params: params.into_iter().map(Into::into).collect(),
            body: Box::new(body),
        }
    }

    pub fn apply(func: Code, args: Vec<Code>) -> Self {
        Code::Apply {
            func: Box::new(func),
            args,
        }
    }

    /// Shorthand for applying a named function.
    pub fn call(func: impl Into<String>, args: Vec<Code>) -> Self {
        Code::apply(Code::ident(func), args)
    }

    pub fn let_(name: impl Into<String>, value: Code, body: Code) -> Self {
        Code::Let {
            name: name.into(),
            value: Box::new(value),
            body: Box::new(body),
        }
    }

    pub fn if_(cond: Code, then: Code, otherwise: Code) -> Self {
        Code::If {
            cond: Box::new(cond),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        }
    }

    pub fn match_(scrutinee: Code, arms: Vec<Arm>) -> Self {
        Code::Match {
            scrutinee: Box::new(scrutinee),
            arms,
        }
    }

    pub fn tuple(elems: Vec<Code>) -> Self {
        Code::Tuple(elems)
    }

    pub fn record(fields: Vec<(String, Code)>) -> Self {
        Code::Record(fields)
    }

    pub fn case(tag: impl Into<String>, args: Vec<Code>) -> Self {
        Code::Case {
            tag: tag.into(),
            args,
        }
    }

    pub fn case_record(tag: impl Into<String>, fields: Vec<(String, Code)>) -> Self {
        Code::CaseRecord {
            tag: tag.into(),
            fields,
        }
    }

    pub fn poly(tag: impl Into<String>, args: Vec<Code>) -> Self {
        Code::Poly {
            tag: tag.into(),
            args,
        }
    }

    pub fn some(value: Code) -> Self {
        Code::case("Some", vec![value])
    }

    pub fn none() -> Self {
        Code::case("None", vec![])
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Code::Fail(message.into())
    }

    /// Depth-first walk over this expression and every sub-expression.
    pub fn visit(&self, f: &mut impl FnMut(&Code)) {
        f(self);
        match self {
            Code::Lit(_) | Code::Ident(_) | Code::Fail(_) => {}
            Code::Lambda { body, .. } => body.visit(f),
            Code::Apply { func, args } => {
                func.visit(f);
                for arg in args {
                    arg.visit(f);
                }
            }
            Code::Let { value, body, .. } => {
                value.visit(f);
                body.visit(f);
            }
            Code::If {
                cond,
                then,
                otherwise,
            } => {
                cond.visit(f);
                then.visit(f);
                otherwise.visit(f);
            }
            Code::Match { scrutinee, arms } => {
                scrutinee.visit(f);
                for arm in arms {
                    arm.body.visit(f);
                }
            }
            Code::Tuple(elems) | Code::Case { args: elems, .. } | Code::Poly { args: elems, .. } => {
                for elem in elems {
                    elem.visit(f);
                }
            }
            Code::Record(fields) | Code::CaseRecord { fields, .. } => {
                for (_, value) in fields {
                    value.visit(f);
                }
            }
        }
    }

    /// True when `name` occurs as a free-standing identifier anywhere inside.
    pub fn mentions(&self, name: &str) -> bool {
        let mut found = false;
        self.visit(&mut |code| {
            if let Code::Ident(ident) = code {
                if ident == name {
                    found = true;
                }
            }
        });
        found
    }
}

/// A pattern.
#[derive(Debug, Clone, PartialEq)]
pub enum Pat {
    Wild,
    Bind(String),
    Lit(Lit),
    Tuple(Vec<Pat>),
    /// Match a model record by field name.
    Record(Vec<(String, Pat)>),
    Case { tag: String, args: Vec<Pat> },
    CaseRecord {
        tag: String,
        fields: Vec<(String, Pat)>,
    },
    Poly { tag: String, args: Vec<Pat> },
    /// Match any open-sum value whose tag belongs to an included sum,
    /// binding the whole value. `tags` is the tag set resolved at generation
    /// time; `None` when the included sum lives outside the batch, in which
    /// case any open-sum value matches except the tags in `excluding` (the
    /// including sum's own constructs declared after the inclusion, which
    /// the external sum cannot own).
    PolyInherit {
        binder: String,
        tags: Option<Vec<String>>,
        excluding: Vec<String>,
    },
}

impl Pat {
    pub fn bind(name: impl Into<String>) -> Self {
        Pat::Bind(name.into())
    }

    pub fn str(v: impl Into<String>) -> Self {
        Pat::Lit(Lit::Str(v.into()))
    }

    pub fn case(tag: impl Into<String>, args: Vec<Pat>) -> Self {
        Pat::Case {
            tag: tag.into(),
            args,
        }
    }

    pub fn poly(tag: impl Into<String>, args: Vec<Pat>) -> Self {
        Pat::Poly {
            tag: tag.into(),
            args,
        }
    }

    pub fn some(inner: Pat) -> Self {
        Pat::case("Some", vec![inner])
    }

    pub fn none() -> Self {
        Pat::case("None", vec![])
    }
}
