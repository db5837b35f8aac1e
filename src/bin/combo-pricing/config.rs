//! CLI Configuration

use std::path::PathBuf;

use clap::Parser;

/// Log output format.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Price a fixture cart with combo bundles and the threshold gift rule
#[derive(Debug, Parser)]
#[command(name = "combo-pricing", about, long_about = None)]
pub struct Config {
    /// Directory holding `carts/`, `combos/` and `rules/` fixture files
    #[arg(short = 'd', long, env = "COMBO_FIXTURES_DIR", default_value = "./fixtures")]
    pub fixtures_dir: PathBuf,

    /// Fixture set name to load
    #[arg(short, long, env = "COMBO_FIXTURE_SET", default_value = "kiosk")]
    pub fixture: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}
