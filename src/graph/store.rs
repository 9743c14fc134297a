//! Immutable triple store loaded once at startup.
//!
//! The RDF file is parsed into an in-memory `oxigraph` store, then snapshotted
//! into plain string triples with two lookup structures: the sorted list of
//! distinct subjects and an entity -> triple-index map for neighborhood queries.
//! Nothing mutates the store after construction, so it can be shared by
//! reference across request handlers without locking.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::io::BufReader;
use std::path::Path;

use oxigraph::io::RdfFormat;
use oxigraph::model::Term;
use oxigraph::store::Store;

use crate::error::StoreError;

use super::Triple;

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Read-only triple store with subject and neighborhood indexes.
#[derive(Debug, Clone, Default)]
pub struct TripleStore {
    /// All triples, deduplicated, in snapshot order.
    triples: Vec<Triple>,
    /// Sorted distinct subjects.
    entities: Vec<String>,
    /// Entity -> ascending indices of triples where it is subject or object.
    mentions: HashMap<String, Vec<usize>>,
}

impl TripleStore {
    /// Load a serialized RDF file.
    ///
    /// The syntax is picked from the file extension; unknown extensions are
    /// parsed as Turtle. A missing or malformed file is an error.
    pub fn load(path: &Path) -> StoreResult<Self> {
        let shown = path.display().to_string();
        if !path.is_file() {
            return Err(StoreError::NotFound { path: shown });
        }

        let format = rdf_format_for(path);
        let file = std::fs::File::open(path).map_err(|source| StoreError::Io {
            path: shown.clone(),
            source,
        })?;

        let store = Store::new().map_err(|e| StoreError::Oxigraph {
            message: format!("failed to create oxigraph store: {e}"),
        })?;
        store
            .load_from_reader(format, BufReader::new(file))
            .map_err(|e| StoreError::Parse {
                path: shown.clone(),
                format: format.name().to_string(),
                message: e.to_string(),
            })?;

        let mut triples = Vec::new();
        for quad in store.iter() {
            let quad = quad.map_err(|e| StoreError::Oxigraph {
                message: format!("failed to scan loaded quads: {e}"),
            })?;
            triples.push(Triple::new(
                term_value(&Term::from(quad.subject)),
                quad.predicate.as_str(),
                term_value(&quad.object),
            ));
        }

        let store = Self::from_triples(triples);
        tracing::info!(
            path = %shown,
            format = format.name(),
            triples = store.len(),
            entities = store.entities.len(),
            "loaded knowledge graph"
        );
        Ok(store)
    }

    /// Build a store from in-memory triples. Exact duplicates collapse to one.
    pub fn from_triples(triples: impl IntoIterator<Item = Triple>) -> Self {
        let mut seen = HashSet::new();
        let triples: Vec<Triple> = triples
            .into_iter()
            .filter(|t| seen.insert(t.clone()))
            .collect();

        let entities: Vec<String> = triples
            .iter()
            .map(|t| t.subject.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut mentions: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, t) in triples.iter().enumerate() {
            mentions.entry(t.subject.clone()).or_default().push(idx);
            if t.object != t.subject {
                mentions.entry(t.object.clone()).or_default().push(idx);
            }
        }

        Self {
            triples,
            entities,
            mentions,
        }
    }

    /// Sorted, duplicate-free list of every subject in the store.
    pub fn entities(&self) -> &[String] {
        &self.entities
    }

    /// All triples where `entity` is the subject or the object.
    ///
    /// Matching is exact and case-sensitive. Unknown or empty entities yield
    /// an empty list.
    pub fn neighborhood(&self, entity: &str) -> Vec<&Triple> {
        self.mentions
            .get(entity)
            .map(|indices| indices.iter().map(|&i| &self.triples[i]).collect())
            .unwrap_or_default()
    }

    /// All stored triples.
    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }

    /// Number of stored triples.
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// Whether the store holds no triples.
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }
}

/// Pick the RDF syntax from a file extension, defaulting to Turtle.
fn rdf_format_for(path: &Path) -> RdfFormat {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| match ext.to_ascii_lowercase().as_str() {
            "xml" => Some(RdfFormat::RdfXml),
            other => RdfFormat::from_extension(other),
        })
        .unwrap_or(RdfFormat::Turtle)
}

/// String form of an RDF term: IRI, blank node id, or literal lexical value.
fn term_value(term: &Term) -> String {
    match term {
        Term::NamedNode(n) => n.as_str().to_string(),
        Term::BlankNode(b) => b.as_str().to_string(),
        Term::Literal(l) => l.value().to_string(),
        #[allow(unreachable_patterns)]
        other => other.to_string(),
    }
}
