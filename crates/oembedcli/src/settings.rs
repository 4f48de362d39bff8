use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use oembed_service::config::Config;
use tracing::level_filters::LevelFilter;

/// The name of the configuration file in the home directory.
pub const CONFIG_RC_FILE_NAME: &str = ".oembed.yml";

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Outputs one JSON object per URL and line.
    Json,
    /// Outputs a human readable summary of each URL.
    Pretty,
}

/// Resolves URLs to their oEmbed representation.
///
/// All URLs are looked up concurrently, repeated URLs only cause a single request to their
/// provider. The exit code is non-zero if any lookup failed.
///
/// Unless `--config` is given, the configuration is read from `~/.oembed.yml` if it exists.
#[derive(Clone, Parser, Debug)]
#[command(author, version, about, long_about)]
struct Cli {
    /// The URLs to look up.
    #[arg(required = true)]
    pub urls: Vec<String>,

    /// Path to your configuration file.
    #[arg(long, short, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// The output format.
    #[arg(long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// The severity level of logging output.
    ///
    /// Possible values:
    /// off, error, warn, info, debug, trace
    #[arg(long)]
    log_level: Option<LevelFilter>,

    /// The maximum width of embedded resources.
    #[arg(long)]
    max_width: Option<u32>,

    /// The maximum height of embedded resources.
    #[arg(long)]
    max_height: Option<u32>,
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub urls: Vec<String>,
    pub config: Config,
    pub output_format: OutputFormat,
}

impl Settings {
    pub fn get() -> Result<Self> {
        Self::from_cli(Cli::parse())
    }

    fn from_cli(cli: Cli) -> Result<Self> {
        let config_path = cli.config.or_else(find_global_config_file);
        let mut config = Config::get(config_path.as_deref()).context("failed loading config")?;

        if let Some(level) = cli.log_level {
            config.logging.level = level;
        }
        if cli.max_width.is_some() {
            config.max_width = cli.max_width;
        }
        if cli.max_height.is_some() {
            config.max_height = cli.max_height;
        }

        Ok(Settings {
            urls: cli.urls,
            config,
            output_format: cli.format,
        })
    }
}

fn find_global_config_file() -> Option<PathBuf> {
    let mut path = dirs::home_dir()?;
    path.push(CONFIG_RC_FILE_NAME);
    path.exists().then_some(path)
}
