use clap::{Parser, ValueEnum};

#[derive(Parser, Debug, Clone)]
#[command(name = "strokerisk-server")]
#[command(author, version, about = "Stroke risk scoring HTTP service", long_about = None)]
pub struct Cli {
    /// Configuration file path (optional; missing file means defaults)
    #[arg(short, long, default_value = "strokerisk.yaml")]
    pub config: String,

    /// Model artifact path [default: stroke_best_pipeline.json]
    #[arg(short, long, env = "MODEL_PATH")]
    pub model_path: Option<String>,

    /// Comma-separated list of allowed CORS origins, or "*" [default: *]
    #[arg(long, env = "ALLOWED_ORIGINS")]
    pub allowed_origins: Option<String>,

    /// Listen address [default: 0.0.0.0]
    #[arg(short = 'l', long)]
    pub listen: Option<String>,

    /// Listen port [default: 8000]
    #[arg(short = 'P', long)]
    pub port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per event
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["strokerisk-server"]).unwrap();
        assert_eq!(cli.config, "strokerisk.yaml");
        assert_eq!(cli.log_format, LogFormat::Text);
        assert!(cli.listen.is_none());
        assert!(cli.port.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::try_parse_from([
            "strokerisk-server",
            "--model-path",
            "models/other.yaml",
            "--allowed-origins",
            "https://a.example,https://b.example",
            "-P",
            "9000",
            "--log-format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.model_path.as_deref(), Some("models/other.yaml"));
        assert_eq!(cli.allowed_origins.as_deref(), Some("https://a.example,https://b.example"));
        assert_eq!(cli.port, Some(9000));
        assert_eq!(cli.log_format, LogFormat::Json);
    }
}
