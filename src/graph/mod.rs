//! Knowledge graph: the loaded triple set and per-entity subgraphs.
//!
//! - **Triple store** ([`TripleStore`]): parses the RDF file once via `oxigraph`
//!   and keeps an immutable, indexed snapshot of string triples
//! - **Subgraph** ([`Subgraph`]): a `petgraph` view of one entity's neighborhood,
//!   rebuilt on every request
//!
//! Both layers share the same [`Triple`] data model.

pub mod store;
pub mod subgraph;

pub use store::TripleStore;
pub use subgraph::Subgraph;

/// A triple (subject, predicate, object) in the knowledge graph.
///
/// Each position holds the string form of an RDF term: the IRI for named
/// nodes, the id for blank nodes, the lexical value for literals.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Triple {
    /// The subject of the triple.
    pub subject: String,
    /// The predicate (relation) of the triple.
    pub predicate: String,
    /// The object of the triple.
    pub object: String,
}

impl Triple {
    /// Create a new triple.
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }

    /// Whether the given entity appears as subject or object.
    pub fn touches(&self, entity: &str) -> bool {
        self.subject == entity || self.object == entity
    }
}

/// Edge data stored on petgraph edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeData {
    /// The predicate this edge was built from.
    pub predicate: String,
}

impl From<&Triple> for EdgeData {
    fn from(t: &Triple) -> Self {
        Self {
            predicate: t.predicate.clone(),
        }
    }
}
