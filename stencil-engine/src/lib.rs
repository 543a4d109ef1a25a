//! Type-directed code generation, independent of source and target
//! languages.
//!
//! Stencil turns type declarations into companion code: encoders, decoders,
//! default values, mirrored type declarations. A derivation is assembled
//! from small per-shape callbacks; everything systematic (recursion over
//! type structure, unit naming, generic parameters, open-sum inclusion and
//! probing) lives in the engines and is never the callback author's problem.
//!
//! # Architecture
//!
//! ```text
//! raw declarations → stencil-reflect → stencil-ir batch
//!                                          │
//!                      engines (arity-1, arity-0, type-level)
//!                                          │
//!            builders (Encoder, Decoder, MatchDecoder, ConstBuilder,
//!                      TypeMirror, Combined)
//!                                          │
//!                    generated units (Code trees + signatures)
//! ```
//!
//! Generated units can be rendered for inspection ([`render`]) or executed
//! directly by the reference evaluator ([`eval`]) to check a derivation
//! end to end.

pub mod builder;
pub mod code;
pub mod derive;
pub mod diagnostic;
pub mod engine;
pub mod error;
pub mod eval;
pub mod naming;
pub mod render;
pub mod unit;

pub use builder::{
    CaseCtx, Combined, ConstBuilder, DecodeField, DecodePayload, Decoder, EncodedField, Encoder,
    MatchDecoder, PolySite, TagSite, TypeMirror,
};
pub use code::{Arm, Code, Lit, Pat};
pub use derive::{Derive, Output};
pub use diagnostic::{Diagnostic, Severity};
pub use error::{Error, Result};
pub use eval::{Checker, EvalError, EvalResult, Linked, Value};
pub use unit::{Generated, GeneratedUnit, Sig};
