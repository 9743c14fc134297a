// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # kg-viewer
//!
//! A small web viewer for a fraud knowledge graph. A fixed RDF file is loaded
//! once at startup; the user picks an entity and gets a PNG of its immediate
//! neighborhood (every triple where it is subject or object).
//!
//! ## Architecture
//!
//! - **Graph store** (`graph::store`): immutable triple snapshot parsed via oxigraph
//! - **Subgraph** (`graph::subgraph`): per-request petgraph neighborhood
//! - **Rendering** (`render`): spring layout, SVG scene, resvg rasterization
//! - **Server** (`server`, feature `server`): axum routes for the page and images
//!
//! ## Library usage
//!
//! ```no_run
//! use kg_viewer::config::RenderConfig;
//! use kg_viewer::graph::{Triple, TripleStore};
//! use kg_viewer::render::Renderer;
//!
//! let store = TripleStore::from_triples([
//!     Triple::new("acct:1", "ownedBy", "person:alice"),
//!     Triple::new("person:alice", "usesDevice", "device:9"),
//! ]);
//! let renderer = Renderer::new(RenderConfig::default());
//! let png = renderer.render_entity(&store, "person:alice").unwrap();
//! assert!(png.starts_with(b"\x89PNG"));
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod render;
#[cfg(feature = "server")]
pub mod server;
