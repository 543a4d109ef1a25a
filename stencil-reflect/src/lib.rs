//! Shape reflection: the single validation boundary of the engine.
//!
//! A front end parses host declaration syntax and hands over the raw AST in
//! [`raw`]. The reflector lowers it into the canonical `stencil-ir` model,
//! rejecting every construct the engine cannot derive over. The
//! classification is closed and total: nothing downstream of a successful
//! reflection ever encounters an unmodeled shape.

pub mod raw;

mod error;
mod reflect;

pub use error::{Error, Result, ShapeCategory};
pub use reflect::{reflect_batch, reflect_decl, reflect_expr};
