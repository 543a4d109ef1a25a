//! Declaration batches.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::decl::TypeDecl;

/// A declaration batch: the set of mutually-recursive declarations processed
/// together in one generation request, in declared order.
///
/// Forward references inside a batch resolve to units materialized in that
/// same batch; references to names outside the batch are assumed already
/// generated under the same naming convention.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    decls: IndexMap<String, TypeDecl>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a declaration. On a duplicate name the first insertion wins.
    pub fn push(&mut self, decl: TypeDecl) {
        self.decls.entry(decl.name.clone()).or_insert(decl);
    }

    pub fn get(&self, name: &str) -> Option<&TypeDecl> {
        self.decls.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.decls.contains_key(name)
    }

    /// Declarations in declared order.
    pub fn iter(&self) -> impl Iterator<Item = &TypeDecl> {
        self.decls.values()
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }
}

impl FromIterator<TypeDecl> for Batch {
    fn from_iter<I: IntoIterator<Item = TypeDecl>>(iter: I) -> Self {
        let mut batch = Batch::new();
        for decl in iter {
            batch.push(decl);
        }
        batch
    }
}
