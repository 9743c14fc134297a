//! Subgraph rendering: spring layout, SVG scene, PNG rasterization.
//!
//! [`Renderer`] turns an entity's neighborhood into PNG bytes entirely in
//! memory. The scene is built as SVG ([`svg`]) after nodes are placed by the
//! force-directed layout ([`layout`]), then rasterized by `resvg` onto a
//! `tiny-skia` pixmap that is dropped when the call returns.

pub mod layout;
pub mod svg;

use std::sync::Arc;

use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg;

use crate::config::RenderConfig;
use crate::error::RenderError;
use crate::graph::{Subgraph, TripleStore};

use self::layout::SpringLayout;

/// Result type for render operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;

/// Margin around the layout, in node radii; leaves room for loops and labels.
const MARGIN_RADII: f64 = 3.0;

/// Stateless PNG renderer sharing one font database across calls.
///
/// Safe to use from many threads at once: each call owns its scene and pixmap,
/// and the font database is only read.
pub struct Renderer {
    config: RenderConfig,
    fontdb: Arc<usvg::fontdb::Database>,
}

impl Renderer {
    /// Create a renderer, loading system fonts once for label text.
    pub fn new(config: RenderConfig) -> Self {
        let mut fontdb = usvg::fontdb::Database::new();
        fontdb.load_system_fonts();
        tracing::debug!(faces = fontdb.len(), "loaded system fonts");
        Self {
            config,
            fontdb: Arc::new(fontdb),
        }
    }

    /// Render options in effect.
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Render the neighborhood of `entity` as PNG bytes.
    ///
    /// Unknown and empty entities produce a blank canvas, not an error.
    pub fn render_entity(&self, store: &TripleStore, entity: &str) -> RenderResult<Vec<u8>> {
        let subgraph = Subgraph::extract(store, entity);
        tracing::debug!(
            entity,
            nodes = subgraph.node_count(),
            edges = subgraph.edge_count(),
            "rendering subgraph"
        );
        self.render_png(&subgraph)
    }

    /// Lay out, draw and encode a subgraph.
    pub fn render_png(&self, subgraph: &Subgraph) -> RenderResult<Vec<u8>> {
        let svg = self.render_svg(subgraph)?;
        self.rasterize(&svg)
    }

    /// Lay out and draw a subgraph as an SVG document.
    pub fn render_svg(&self, subgraph: &Subgraph) -> RenderResult<String> {
        let unit = SpringLayout::from_config(&self.config).compute(subgraph);
        let margin = f64::from(self.config.node_radius) * MARGIN_RADII;
        let positions = layout::to_canvas(
            &unit,
            f64::from(self.config.width),
            f64::from(self.config.height),
            margin,
        );
        svg::build_scene(subgraph, &positions, &self.config).map_err(|e| RenderError::Svg {
            message: format!("failed to write scene: {e}"),
        })
    }

    fn rasterize(&self, svg: &str) -> RenderResult<Vec<u8>> {
        let mut options = usvg::Options::default();
        options.font_family = self.config.font_family.clone();
        options.fontdb = Arc::clone(&self.fontdb);

        let tree = usvg::Tree::from_str(svg, &options).map_err(|e| RenderError::Svg {
            message: e.to_string(),
        })?;

        let size = tree.size().to_int_size();
        let (width, height) = (size.width(), size.height());
        let mut pixmap =
            Pixmap::new(width, height).ok_or(RenderError::Surface { width, height })?;

        resvg::render(&tree, Transform::default(), &mut pixmap.as_mut());

        pixmap.encode_png().map_err(|e| RenderError::Encode {
            message: e.to_string(),
        })
    }
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("config", &self.config)
            .field("font_faces", &self.fontdb.len())
            .finish()
    }
}
