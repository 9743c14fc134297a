//! Per-entity neighborhood subgraph.
//!
//! Built fresh for every request from the store's neighborhood query. Nodes
//! are the distinct subjects and objects of the selected triples; each
//! selected triple contributes exactly one directed edge labeled with its
//! predicate, so two triples sharing endpoints become parallel edges.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use super::store::TripleStore;
use super::{EdgeData, Triple};

/// Directed neighborhood graph of a single entity.
#[derive(Debug, Clone)]
pub struct Subgraph {
    /// The entity the subgraph was built around.
    entity: String,
    /// Nodes carry identifiers, edges carry predicates.
    graph: DiGraph<String, EdgeData>,
}

impl Subgraph {
    /// Select every triple touching `entity` and build its graph.
    pub fn extract(store: &TripleStore, entity: &str) -> Self {
        Self::from_triples(entity, store.neighborhood(entity))
    }

    /// Build a subgraph from already-selected triples.
    ///
    /// Triples that do not touch `entity` are skipped.
    pub fn from_triples<'a>(entity: &str, triples: impl IntoIterator<Item = &'a Triple>) -> Self {
        let mut graph = DiGraph::new();
        let mut index: HashMap<&str, NodeIndex> = HashMap::new();

        for triple in triples.into_iter().filter(|t| t.touches(entity)) {
            let subj = *index
                .entry(triple.subject.as_str())
                .or_insert_with(|| graph.add_node(triple.subject.clone()));
            let obj = *index
                .entry(triple.object.as_str())
                .or_insert_with(|| graph.add_node(triple.object.clone()));
            graph.add_edge(subj, obj, EdgeData::from(triple));
        }

        Self {
            entity: entity.to_string(),
            graph,
        }
    }

    /// The entity this subgraph is centered on.
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Underlying petgraph graph.
    pub fn graph(&self) -> &DiGraph<String, EdgeData> {
        &self.graph
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges (one per selected triple).
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Whether the subgraph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Node identifiers in insertion order.
    pub fn nodes(&self) -> Vec<&str> {
        self.graph
            .node_indices()
            .map(|idx| self.graph[idx].as_str())
            .collect()
    }

    /// Edges as `(subject, predicate, object)` triples, in insertion order.
    pub fn triples(&self) -> Vec<Triple> {
        self.graph
            .edge_references()
            .map(|e| {
                Triple::new(
                    self.graph[e.source()].as_str(),
                    e.weight().predicate.as_str(),
                    self.graph[e.target()].as_str(),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn sample() -> TripleStore {
        TripleStore::from_triples([
            Triple::new("A", "worksWith", "B"),
            Triple::new("B", "ownedBy", "C"),
            Triple::new("D", "unrelated", "E"),
        ])
    }

    #[test]
    fn neighborhood_of_b() {
        let sub = Subgraph::extract(&sample(), "B");
        let nodes: BTreeSet<&str> = sub.nodes().into_iter().collect();
        assert_eq!(nodes, BTreeSet::from(["A", "B", "C"]));
        assert_eq!(
            sub.triples(),
            vec![
                Triple::new("A", "worksWith", "B"),
                Triple::new("B", "ownedBy", "C"),
            ]
        );
    }

    #[test]
    fn unknown_entity_is_empty() {
        let sub = Subgraph::extract(&sample(), "Z");
        assert!(sub.is_empty());
        assert_eq!(sub.edge_count(), 0);
        assert_eq!(sub.entity(), "Z");
    }

    #[test]
    fn parallel_predicates_stay_distinct() {
        let store = TripleStore::from_triples([
            Triple::new("acct", "sentTo", "mule"),
            Triple::new("acct", "linkedTo", "mule"),
        ]);
        let sub = Subgraph::extract(&store, "acct");
        assert_eq!(sub.node_count(), 2);
        assert_eq!(sub.edge_count(), 2);
    }

    #[test]
    fn self_loop_is_one_node_one_edge() {
        let store = TripleStore::from_triples([Triple::new("A", "refersTo", "A")]);
        let sub = Subgraph::extract(&store, "A");
        assert_eq!(sub.node_count(), 1);
        assert_eq!(sub.edge_count(), 1);
    }

    #[test]
    fn from_triples_skips_unrelated() {
        let triples = [Triple::new("A", "p", "B"), Triple::new("C", "q", "D")];
        let sub = Subgraph::from_triples("A", &triples);
        assert_eq!(sub.edge_count(), 1);
        assert!(!sub.nodes().contains(&"C"));
    }
}
