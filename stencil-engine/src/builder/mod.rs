//! Fluent builders assembling concrete derivations from callbacks.
//!
//! A host picks a builder matching the derivation's direction, supplies the
//! shape callbacks its wire format needs, and gets back a [`Derive`]
//! implementation. Callbacks see shape structure only; reference naming,
//! recursion, probes and parameter plumbing stay inside the engines.
//!
//! [`Derive`]: crate::derive::Derive

mod combine;
mod consts;
mod decoder;
mod encoder;
mod match_decoder;
mod mirror;

pub use combine::Combined;
pub use consts::ConstBuilder;
pub use decoder::{DecodeField, DecodePayload, Decoder, PolySite, TagSite};
pub use encoder::{EncodedField, Encoder};
pub use match_decoder::MatchDecoder;
pub use mirror::TypeMirror;

use stencil_ir::{Attr, TypeDecl, TypeExpr};

use crate::error::{Error, Result};
use crate::unit::Sig;

/// Case identity handed to case callbacks.
pub struct CaseCtx<'w> {
    pub tag: &'w str,
    pub attrs: &'w [Attr],
}

/// The declared type as a type expression: `name` applied to its own
/// parameters.
pub(crate) fn decl_ty(decl: &TypeDecl) -> TypeExpr {
    TypeExpr::opaque(
        decl.name.clone(),
        decl.params.iter().map(|p| TypeExpr::var(p.clone())).collect(),
    )
}

/// Encoder unit signature: one handler per parameter, then `T => rep`.
pub(crate) fn encode_sig(decl: &TypeDecl, rep: &str) -> Sig {
    let base = Sig::arrow(Sig::Ty(decl_ty(decl)), Sig::named(rep));
    wrap_handler_sig(decl, rep, base, false)
}

/// Decoder unit signature: one handler per parameter, then `rep => T`.
pub(crate) fn decode_sig(decl: &TypeDecl, rep: &str) -> Sig {
    let base = Sig::arrow(Sig::named(rep), Sig::Ty(decl_ty(decl)));
    wrap_handler_sig(decl, rep, base, true)
}

/// Probe unit signature: like a decoder's, but yielding `option(T)`.
pub(crate) fn probe_sig(decl: &TypeDecl, rep: &str) -> Sig {
    let base = Sig::arrow(Sig::named(rep), Sig::option(Sig::Ty(decl_ty(decl))));
    wrap_handler_sig(decl, rep, base, true)
}

fn wrap_handler_sig(decl: &TypeDecl, rep: &str, base: Sig, decode: bool) -> Sig {
    decl.params.iter().rev().fold(base, |acc, param| {
        let var = Sig::Ty(TypeExpr::var(param.clone()));
        let handler = if decode {
            Sig::arrow(Sig::named(rep), var)
        } else {
            Sig::arrow(var, Sig::named(rep))
        };
        Sig::arrow(handler, acc)
    })
}

/// Positional binders `x0, x1, ..` for destructuring a payload of `n` slots.
pub(crate) fn positional_binds(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("x{i}")).collect()
}

pub(crate) fn require<'h, T>(
    derivation: &str,
    hook: &'h Option<T>,
    name: &'static str,
) -> Result<&'h T> {
    hook.as_ref().ok_or_else(|| Error::callback(derivation, name))
}
