//! Canonical type representation for the Stencil derivation engine.
//!
//! This crate provides the unified shape model every derivation walks. A
//! front end hands raw declarations to `stencil-reflect`, which lowers them
//! into these types; the engines in `stencil-engine` only ever see this model.
//!
//! # Architecture
//!
//! ```text
//! raw declarations → stencil-reflect (validation) → stencil-ir → engines
//! ```
//!
//! The IR types are designed to be:
//! - Target-agnostic (no wire-format or output-language concerns)
//! - Immutable once built (one model per generation request)
//! - Self-contained plain data (serde derives for host inspection)

mod batch;
mod decl;
mod expr;

pub use batch::Batch;
pub use decl::{Attr, DeclShape, Field, Loc, TypeDecl, VariantCase, is_enumerated};
pub use expr::{PolyCase, TypeExpr, TypeNode, is_enumerated_poly};
