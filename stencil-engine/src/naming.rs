//! The identifier contract for generated units.
//!
//! Cross-derivation composition depends on these rules being exact: every
//! reference the engine emits assumes the referenced unit was (or will be)
//! generated under the same names, whether or not it lives in this batch.

/// Identifier of derivation `derivation` applied to declared type `decl`.
///
/// The distinguished self-reference inside a declaration's own recursive
/// definition emits the bare derivation name instead; see
/// [`crate::engine::Env::unit_ident`].
pub fn unit_ident(derivation: &str, decl: &str) -> String {
    format!("{derivation}_{decl}")
}

/// Derivation name of the implicit optional-returning probe generated
/// alongside a decoder.
pub fn probe_derivation(derivation: &str) -> String {
    format!("{derivation}_poly")
}

/// Identifier of the handler argument bound for a formal type parameter.
///
/// One handler per parameter, in declared order, preceding the unit's own
/// input.
pub fn param_handler(param: &str) -> String {
    format!("f_{param}")
}
