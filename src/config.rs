//! Viewer configuration, optionally loaded from TOML.
//!
//! Every field has a default, so a config file only needs the values it
//! changes. Command-line flags are applied on top by the binary.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Top-level viewer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// RDF file loaded at startup.
    pub data_file: PathBuf,
    /// Address to bind the HTTP listener to.
    pub bind: String,
    /// Port to listen on.
    pub port: u16,
    /// Image rendering options.
    pub render: RenderConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("data/fraud_kg.ttl"),
            bind: "127.0.0.1".to_string(),
            port: 5000,
            render: RenderConfig::default(),
        }
    }
}

impl ViewerConfig {
    /// Read a TOML config file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let display = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        Self::from_toml(&text).map_err(|e| match e {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: display,
                message,
            },
            other => other,
        })
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })?;
        config.render.validate()?;
        Ok(config)
    }

    /// `bind:port` listen address.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

/// Canvas and layout options for rendered subgraphs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Node circle radius in pixels.
    pub node_radius: f32,
    /// Spring layout iterations.
    pub iterations: usize,
    /// Fixed layout seed. `None` draws a fresh layout every request.
    pub seed: Option<u64>,
    /// Canvas background color (any SVG color).
    pub background: String,
    /// Font family for node and edge labels.
    pub font_family: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 800,
            node_radius: 28.0,
            iterations: 50,
            seed: None,
            background: "white".to_string(),
            font_family: "DejaVu Sans".to_string(),
        }
    }
}

impl RenderConfig {
    /// Reject settings that cannot produce an image.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid {
                message: format!(
                    "canvas must be non-empty, got {}x{}",
                    self.width, self.height
                ),
            });
        }
        if !(self.node_radius.is_finite() && self.node_radius > 0.0) {
            return Err(ConfigError::Invalid {
                message: format!("node_radius must be > 0, got {}", self.node_radius),
            });
        }
        if self.iterations == 0 {
            return Err(ConfigError::Invalid {
                message: "iterations must be > 0".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ViewerConfig::default();
        config.render.validate().unwrap();
        assert_eq!(config.listen_addr(), "127.0.0.1:5000");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = ViewerConfig::from_toml(
            r#"
            port = 8080

            [render]
            seed = 7
            "#,
        )
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.render.seed, Some(7));
        assert_eq!(config.render.width, 1000);
        assert_eq!(config.data_file, PathBuf::from("data/fraud_kg.ttl"));
    }

    #[test]
    fn zero_canvas_is_rejected() {
        let err = ViewerConfig::from_toml("[render]\nwidth = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn bad_toml_is_parse_error() {
        let err = ViewerConfig::from_toml("port = \"not a number\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn load_reports_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("viewer.toml");
        std::fs::write(&path, "port = [").unwrap();
        match ViewerConfig::load(&path).unwrap_err() {
            ConfigError::Parse { path: p, .. } => assert!(p.ends_with("viewer.toml")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
