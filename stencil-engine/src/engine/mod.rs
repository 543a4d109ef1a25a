//! The generic traversal/dispatch engines.
//!
//! Three strategies share one shape-dispatch pattern and differ only in what
//! they thread through the walk:
//!
//! - [`arity1`]: maps a type to a function of one input (both encode and
//!   decode)
//! - [`arity0`]: maps a type to an expression with no runtime input
//! - [`typelevel`]: maps a declaration to a mirrored declaration
//!
//! The engines depend only on capability interfaces; concrete derivations
//! (see [`crate::builder`]) supply implementing values.

pub mod arity0;
pub mod arity1;
pub mod typelevel;

use stencil_ir::{Batch, PolyCase};

use crate::naming;

/// Name of the single runtime input bound by arity-1 units.
pub(crate) const INPUT: &str = "v";

/// Resolution context for one declaration's walk.
pub struct Env<'a> {
    /// The derivation name `D`.
    pub derivation: &'a str,
    pub batch: &'a Batch,
    /// The declaration currently being generated, `None` in bare-expression
    /// mode.
    pub current: Option<&'a str>,
}

impl Env<'_> {
    /// Identifier for a reference to derivation `D` over `target`.
    ///
    /// The distinguished self-reference resolves to the bare derivation
    /// name; the emitted unit's scope binds it back to the unit itself, so
    /// recursive declarations generate recursive units without a link step.
    pub fn unit_ident(&self, target: &str) -> String {
        if self.current == Some(target) {
            self.derivation.to_string()
        } else {
            naming::unit_ident(self.derivation, target)
        }
    }

    /// Identifier for a reference to the probe derivation over `target`.
    pub fn probe_ident(&self, target: &str) -> String {
        let probe = naming::probe_derivation(self.derivation);
        if self.current == Some(target) {
            probe
        } else {
            naming::unit_ident(&probe, target)
        }
    }

    /// The full tag set of an included open sum, resolved transitively
    /// through the batch. `None` when the sum (or anything it includes)
    /// lives outside the batch.
    pub fn inherited_tags(&self, name: &str) -> Option<Vec<String>> {
        let mut tags = Vec::new();
        let mut seen = Vec::new();
        if self.collect_tags(name, &mut tags, &mut seen) {
            Some(tags)
        } else {
            None
        }
    }

    fn collect_tags(&self, name: &str, tags: &mut Vec<String>, seen: &mut Vec<String>) -> bool {
        if seen.iter().any(|s| s == name) {
            return true;
        }
        seen.push(name.to_string());
        let Some(decl) = self.batch.get(name) else {
            return false;
        };
        let Some(cases) = decl.open_sum_cases() else {
            return false;
        };
        for case in cases {
            match case {
                PolyCase::Construct { tag, .. } => tags.push(tag.clone()),
                PolyCase::Inherit { name, .. } => {
                    if !self.collect_tags(name, tags, seen) {
                        return false;
                    }
                }
            }
        }
        true
    }
}
