//! kg-viewer: serve a fraud knowledge graph as an entity picker with PNG neighborhoods.

use std::path::PathBuf;

use clap::Parser;
use miette::{IntoDiagnostic, Result};

use kg_viewer::config::ViewerConfig;
use kg_viewer::server::{self, AppState};

#[derive(Parser)]
#[command(name = "kg-viewer", version, about = "Fraud knowledge graph viewer")]
struct Cli {
    /// TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// RDF file to load (Turtle, N-Triples, N-Quads, TriG, RDF/XML, N3).
    #[arg(long)]
    data: Option<PathBuf>,

    /// Address to bind.
    #[arg(long)]
    bind: Option<String>,

    /// Port to listen on.
    #[arg(long)]
    port: Option<u16>,

    /// Fixed layout seed for reproducible images.
    #[arg(long)]
    seed: Option<u64>,
}

impl Cli {
    /// Resolve the effective config: file (or defaults), then flags.
    fn into_config(self) -> Result<ViewerConfig> {
        let mut config = match &self.config {
            Some(path) => ViewerConfig::load(path)?,
            None => ViewerConfig::default(),
        };
        if let Some(data) = self.data {
            config.data_file = data;
        }
        if let Some(bind) = self.bind {
            config.bind = bind;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if self.seed.is_some() {
            config.render.seed = self.seed;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("info,tower_http=debug")
            }),
        )
        .init();

    let config = Cli::parse().into_config()?;

    // The store must load before anything is served.
    let app = server::router(AppState::from_config(&config)?);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .into_diagnostic()?;
    tracing::info!("kg-viewer listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("kg-viewer shutting down");
        })
        .await
        .into_diagnostic()?;

    Ok(())
}
