/// Relation store — a set of directed, named, presence-only edges.
use std::collections::BTreeSet;

use crate::schema::noun::NounId;
use crate::schema::relation::RelationKey;

/// Every relation currently asserted in the world.
///
/// Edges are independent: asserting a reciprocal pair creates two edges,
/// and either may later be removed on its own.
#[derive(Debug, Clone, Default)]
pub struct RelationStore {
    edges: BTreeSet<RelationKey>,
}

impl RelationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assert `a -rel-> b`. Asserting an existing edge is a no-op.
    pub fn relate(&mut self, rel: &str, a: NounId, b: NounId) {
        self.edges.insert(RelationKey::new(rel, a, b));
    }

    /// Remove `a -rel-> b` if present.
    pub fn unrelate(&mut self, rel: &str, a: NounId, b: NounId) {
        self.edges.remove(&RelationKey::new(rel, a, b));
    }

    pub fn reciprocal(&mut self, rel: &str, a: NounId, b: NounId) {
        let key = RelationKey::new(rel, a, b);
        self.edges.insert(key.reversed());
        self.edges.insert(key);
    }

    pub fn unreciprocal(&mut self, rel: &str, a: NounId, b: NounId) {
        let key = RelationKey::new(rel, a, b);
        self.edges.remove(&key.reversed());
        self.edges.remove(&key);
    }

    pub fn is_related(&self, rel: &str, a: NounId, b: NounId) -> bool {
        self.edges.contains(&RelationKey::new(rel, a, b))
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// All edges in key order.
    pub fn iter(&self) -> impl Iterator<Item = &RelationKey> {
        self.edges.iter()
    }
}
