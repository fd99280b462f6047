//! Server configuration
//!
//! Values are layered, later sources overriding earlier ones:
//! built-in defaults, the optional YAML file, `STROKERISK__*` environment
//! variables (nested keys separated by `__`), then command-line flags
//! (which also pick up `MODEL_PATH` and `ALLOWED_ORIGINS`).

use anyhow::{ensure, Context};
use axum::http::HeaderValue;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use crate::cli::Cli;

/// Environment prefix for layered settings
pub const ENV_PREFIX: &str = "STROKERISK";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Fitted pipeline artifact, JSON or YAML
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    #[serde(default)]
    pub cors: CorsConfig,

    /// Largest accepted batch
    #[serde(default = "default_max_batch_items")]
    pub max_batch_items: usize,

    /// Largest accepted request body
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

impl ServerConfig {
    /// Load configuration from all sources, CLI last
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let mut config = Self::from_sources(Path::new(&cli.config))?;

        if let Some(model_path) = &cli.model_path {
            config.model_path = PathBuf::from(model_path);
        }

        if let Some(origins) = &cli.allowed_origins {
            config.cors.allowed_origins = origins.clone();
        }

        if let Some(listen) = &cli.listen {
            config.listen = listen.clone();
        }

        if let Some(port) = cli.port {
            config.port = port;
        }

        config.validate()?;
        Ok(config)
    }

    /// Defaults, then the file at `path` if it exists, then the environment
    pub fn from_sources(path: &Path) -> anyhow::Result<Self> {
        let path_str = path
            .to_str()
            .with_context(|| format!("config path is not valid UTF-8: {}", path.display()))?;

        Config::builder()
            .add_source(Config::try_from(&Self::default())?)
            .add_source(File::new(path_str, FileFormat::Yaml).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(|config| config.try_deserialize())
            .with_context(|| format!("failed to load configuration from {}", path.display()))
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.max_batch_items > 0, "max_batch_items must be greater than 0");
        ensure!(self.body_limit_bytes > 0, "body_limit_bytes must be greater than 0");
        self.socket_addr()?;
        self.cors.origins()?;
        Ok(())
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let ip: IpAddr = self
            .listen
            .parse()
            .with_context(|| format!("invalid listen address: {}", self.listen))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            port: default_port(),
            model_path: default_model_path(),
            cors: CorsConfig::default(),
            max_batch_items: default_max_batch_items(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

/// Cross-origin access
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorsConfig {
    /// `*`, or a comma-separated origin list
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: String,
}

/// Parsed form of [`CorsConfig::allowed_origins`]
#[derive(Debug, Clone, PartialEq)]
pub enum AllowedOrigins {
    Any,
    List(Vec<HeaderValue>),
}

impl CorsConfig {
    pub fn origins(&self) -> anyhow::Result<AllowedOrigins> {
        let entries: Vec<&str> = self
            .allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .collect();

        if entries.is_empty() || entries.contains(&"*") {
            return Ok(AllowedOrigins::Any);
        }

        let origins = entries
            .into_iter()
            .map(|origin| {
                HeaderValue::from_str(origin)
                    .with_context(|| format!("invalid CORS origin: {}", origin))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(AllowedOrigins::List(origins))
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_model_path() -> PathBuf {
    PathBuf::from("stroke_best_pipeline.json")
}

fn default_allowed_origins() -> String {
    "*".to_string()
}

fn default_max_batch_items() -> usize {
    10_000
}

/// Serialized patients run to roughly 300 bytes each, so this leaves
/// headroom for a full `max_batch_items` batch.
fn default_body_limit() -> usize {
    8 * 1024 * 1024
}
