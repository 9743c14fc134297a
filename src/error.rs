//! Rich diagnostic error types for the viewer.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and source chains so operators know exactly
//! what went wrong at startup or during a render.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the viewer.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text, source spans) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum ViewerError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Store errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("triple file not found: {path}")]
    #[diagnostic(
        code(kgview::store::not_found),
        help(
            "The knowledge graph file must exist before the viewer can start. \
             Pass its location with `--data <file>` or set `data_file` in the config."
        )
    )]
    NotFound { path: String },

    #[error("failed to read triple file: {path}")]
    #[diagnostic(
        code(kgview::store::io),
        help("Check that the file is readable by the current user.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {format} data in {path}: {message}")]
    #[diagnostic(
        code(kgview::store::parse),
        help(
            "The RDF syntax is picked from the file extension (.ttl, .nt, .nq, .trig, .rdf, .n3). \
             Make sure the extension matches the content and the file is well-formed."
        )
    )]
    Parse {
        path: String,
        format: String,
        message: String,
    },

    #[error("oxigraph store error: {message}")]
    #[diagnostic(
        code(kgview::store::oxigraph),
        help("The in-memory RDF store could not be created or scanned.")
    )]
    Oxigraph { message: String },
}

// ---------------------------------------------------------------------------
// Render errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum RenderError {
    #[error("failed to parse generated SVG scene: {message}")]
    #[diagnostic(
        code(kgview::render::svg),
        help("The scene builder produced invalid SVG. This is a bug; please report it with the entity id.")
    )]
    Svg { message: String },

    #[error("failed to allocate {width}x{height} drawing surface")]
    #[diagnostic(
        code(kgview::render::surface),
        help("Reduce `render.width` / `render.height` in the config.")
    )]
    Surface { width: u32, height: u32 },

    #[error("failed to encode PNG output: {message}")]
    #[diagnostic(code(kgview::render::encode))]
    Encode { message: String },

    #[error("render task failed: {message}")]
    #[diagnostic(
        code(kgview::render::task),
        help("The blocking render task panicked or was cancelled.")
    )]
    Task { message: String },
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config file: {path}")]
    #[diagnostic(
        code(kgview::config::read),
        help("Ensure the config file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {path}")]
    #[diagnostic(
        code(kgview::config::parse),
        help("Check the TOML syntax in the config file. {message}")
    )]
    Parse { path: String, message: String },

    #[error("invalid configuration: {message}")]
    #[diagnostic(code(kgview::config::invalid), help("Check the [render] section. {message}"))]
    Invalid { message: String },
}

/// Convenience alias for functions returning viewer results.
pub type ViewerResult<T> = std::result::Result<T, ViewerError>;
