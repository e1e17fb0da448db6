//! Relationship graph
//!
//! Derives typed edges (owns, selects, mounts, references) between scanned
//! resources. Extractors are independent pure functions; their outputs are
//! unioned into one edge list. Consumers must not rely on edge order across
//! relation types.

mod crossplane;
mod extractors;

pub use crossplane::build_crossplane_relations;
pub use extractors::{
    build_mounts_relations, build_owns_relations, build_references_relations,
    build_selects_relations,
};

use crate::models::{RelationEdge, RelationType, ResourceId, ResourceRecord};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Signature shared by every extractor
pub type Extractor = fn(&[ResourceRecord]) -> Vec<RelationEdge>;

/// All extractors, in union order
pub const EXTRACTORS: &[(&str, Extractor)] = &[
    ("owns", build_owns_relations),
    ("selects", build_selects_relations),
    ("mounts", build_mounts_relations),
    ("references", build_references_relations),
    ("crossplane", build_crossplane_relations),
];

/// Run every extractor and union the results
///
/// An edge produced by more than one extractor (an ownerReference and a
/// Crossplane label describing the same link) is kept once, first one wins.
pub fn build_relations(records: &[ResourceRecord]) -> Vec<RelationEdge> {
    let mut seen = HashSet::new();
    let mut edges = Vec::new();

    for (name, extract) in EXTRACTORS {
        let extracted = extract(records);
        tracing::trace!("Extractor {} produced {} edges", name, extracted.len());
        for edge in extracted {
            let key = (edge.from.clone(), edge.to.clone(), edge.relation);
            if seen.insert(key) {
                edges.push(edge);
            }
        }
    }

    edges
}

/// Edge list with adjacency indexes
#[derive(Debug, Clone, Default)]
pub struct RelationGraph {
    pub edges: Vec<RelationEdge>,
    outgoing: HashMap<ResourceId, Vec<usize>>,
    incoming: HashMap<ResourceId, Vec<usize>>,
}

impl RelationGraph {
    pub fn new(edges: Vec<RelationEdge>) -> Self {
        let mut outgoing: HashMap<ResourceId, Vec<usize>> = HashMap::new();
        let mut incoming: HashMap<ResourceId, Vec<usize>> = HashMap::new();
        for (idx, edge) in edges.iter().enumerate() {
            outgoing.entry(edge.from.clone()).or_default().push(idx);
            incoming.entry(edge.to.clone()).or_default().push(idx);
        }
        Self {
            edges,
            outgoing,
            incoming,
        }
    }

    pub fn build(records: &[ResourceRecord]) -> Self {
        Self::new(build_relations(records))
    }

    pub fn edges_from<'a>(&'a self, id: &ResourceId) -> impl Iterator<Item = &'a RelationEdge> {
        self.indexed(self.outgoing.get(id))
    }

    pub fn edges_to<'a>(&'a self, id: &ResourceId) -> impl Iterator<Item = &'a RelationEdge> {
        self.indexed(self.incoming.get(id))
    }

    fn indexed<'a>(
        &'a self,
        indexes: Option<&'a Vec<usize>>,
    ) -> impl Iterator<Item = &'a RelationEdge> {
        indexes
            .into_iter()
            .flatten()
            .filter_map(|&idx| self.edges.get(idx))
    }

    pub fn count_by_type(&self) -> BTreeMap<RelationType, usize> {
        let mut counts = BTreeMap::new();
        for edge in &self.edges {
            *counts.entry(edge.relation).or_insert(0) += 1;
        }
        counts
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}
