//! StrokeRisk Server
//!
//! HTTP surface for stroke risk scoring: single and batch prediction,
//! model metadata, health, Prometheus metrics, and OpenAPI docs at `/docs`.

pub mod cli;
pub mod config;
pub mod error;
pub mod server;
pub mod state;
pub mod telemetry;

pub use cli::{Cli, LogFormat};
pub use config::{AllowedOrigins, CorsConfig, ServerConfig};
pub use error::AppError;
pub use server::build_app;
pub use state::AppState;
