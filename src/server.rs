//! HTTP surface of the viewer.
//!
//! - `GET /` — HTML page with the entity selector and the rendered image
//! - `GET /graph?entity=<id>` — PNG of the entity's neighborhood
//! - `GET /health` — server status
//!
//! Handlers share the store and renderer through [`AppState`]; both are
//! read-only, so no locking is involved. Rendering runs on the blocking pool.

use std::fmt::Write;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::{Json, Router};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use crate::config::ViewerConfig;
use crate::error::{RenderError, ViewerResult};
use crate::graph::TripleStore;
use crate::render::Renderer;
use crate::render::svg::distinct_labels;

// ── Server state ──────────────────────────────────────────────────────────

/// Shared, immutable state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<TripleStore>,
    pub renderer: Arc<Renderer>,
}

impl AppState {
    pub fn new(store: TripleStore, renderer: Renderer) -> Self {
        Self {
            store: Arc::new(store),
            renderer: Arc::new(renderer),
        }
    }

    /// Validate the render settings and load the store named by `config`.
    pub fn from_config(config: &ViewerConfig) -> ViewerResult<Self> {
        config.render.validate()?;
        let store = TripleStore::load(&config.data_file)?;
        Ok(Self::new(store, Renderer::new(config.render.clone())))
    }
}

/// Build the router with request tracing.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/graph", get(graph_image))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ── Request / response types ──────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct GraphParams {
    #[serde(default)]
    entity: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    triples: usize,
    entities: usize,
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn index(State(state): State<AppState>) -> Html<String> {
    Html(index_page(state.store.entities()))
}

async fn graph_image(
    State(state): State<AppState>,
    Query(params): Query<GraphParams>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let entity = params.entity;
    let store = Arc::clone(&state.store);
    let renderer = Arc::clone(&state.renderer);

    let rendered = tokio::task::spawn_blocking(move || renderer.render_entity(&store, &entity))
        .await
        .map_err(|e| RenderError::Task {
            message: e.to_string(),
        })
        .and_then(|r| r);

    match rendered {
        Ok(png) => Ok(([(header::CONTENT_TYPE, "image/png")], png)),
        Err(e) => {
            tracing::error!(error = %e, "render failed");
            Err((StatusCode::INTERNAL_SERVER_ERROR, format!("{e}")))
        }
    }
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        triples: state.store.len(),
        entities: state.store.entities().len(),
    })
}

// ── Page ──────────────────────────────────────────────────────────────────

/// URL of the rendered image for an entity.
pub fn graph_url(entity: &str) -> String {
    format!("/graph?entity={}", utf8_percent_encode(entity, NON_ALPHANUMERIC))
}

/// Entity selector page; the image starts on the first entity.
pub fn index_page(entities: &[String]) -> String {
    let first = entities.first().map(String::as_str).unwrap_or_default();

    let mut options = String::new();
    for (entity, label) in entities.iter().zip(distinct_labels(entities)) {
        let value = escape_html(entity);
        options.push_str(&format!(
            "      <option value=\"{value}\" title=\"{value}\">{}</option>\n",
            escape_html(&label)
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <title>Fraud Knowledge Graph Viewer</title>
    <style>
      body {{ font-family: sans-serif; margin: 2em; }}
      select {{ min-width: 24em; }}
      img {{ display: block; margin-top: 1em; border: 1px solid #ccc; }}
    </style>
  </head>
  <body>
    <h1>Fraud Knowledge Graph</h1>
    <label for="entity">Entity</label>
    <select id="entity" onchange="document.getElementById('graph').src = '/graph?entity=' + encodeURIComponent(this.value);">
{options}    </select>
    <img id="graph" src="{src}" alt="Neighborhood of the selected entity">
  </body>
</html>
"#,
        src = escape_html(&graph_url(first)),
    )
}

/// Escape text for HTML attributes and content. Every character survives:
/// ASCII controls become numeric references so the browser hands back the
/// exact identifier.
fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c if c.is_ascii_control() && c != '\0' => {
                let _ = write!(out, "&#x{:X};", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out
}
