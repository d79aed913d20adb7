//! scamintel CLI - Command-line interface
//!
//! Usage:
//!   scamintel extract --text "call +44 20 7946 0958"
//!   scamintel extract --file chat.txt --type phone --type url --pretty
//!   cat chat.txt | scamintel detect-language

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use scamintel_core::{AppConfig, EntityType, ExtractionConfig, Language, LoggingConfig};
use scamintel_extractor::{ExtractionCoordinator, LanguageDetector, PrometheusObserver};

#[derive(Parser)]
#[command(name = "scamintel")]
#[command(about = "Entity extraction for scam conversations")]
#[command(version)]
struct Cli {
    /// TOML configuration file; environment variables override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract entities and print a JSON report
    Extract {
        #[command(flatten)]
        input: InputArgs,

        /// Language tag to use instead of detection (en, hi, zh, ...)
        #[arg(long)]
        language: Option<String>,

        /// Only extract these entity types (repeatable)
        #[arg(long = "type", value_name = "TYPE")]
        types: Vec<String>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,

        /// Print Prometheus metrics to stderr after extraction
        #[arg(long)]
        metrics: bool,
    },
    /// Detect the language of the input
    DetectLanguage {
        #[command(flatten)]
        input: InputArgs,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Text to analyze
    #[arg(long, conflicts_with = "file")]
    text: Option<String>,

    /// Read text from a file
    #[arg(long)]
    file: Option<PathBuf>,
}

impl InputArgs {
    /// Inline text, then file, then stdin
    fn read(self) -> anyhow::Result<String> {
        if let Some(text) = self.text {
            return Ok(text);
        }
        if let Some(path) = self.file {
            return std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()));
        }

        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read stdin")?;
        Ok(buffer)
    }
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::from_file(path)?.with_env_override()?,
        None => AppConfig::from_env()?,
    };
    Ok(config)
}

/// `--metrics` turns recording on even when the config leaves it off
fn extraction_config(mut config: ExtractionConfig, metrics: bool) -> ExtractionConfig {
    if metrics {
        config.record_metrics = true;
    }
    config
}

fn init_tracing(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if config.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config)?;
    init_tracing(&config.logging);

    match cli.command {
        Commands::Extract {
            input,
            language,
            types,
            pretty,
            metrics,
        } => {
            let text = input.read()?;
            let observer = Arc::new(PrometheusObserver::new());

            let mut coordinator =
                ExtractionCoordinator::with_config(extraction_config(config.extraction, metrics));
            if metrics {
                coordinator = coordinator.with_observer(observer.clone());
            }
            if let Some(language) = language {
                coordinator = coordinator.with_language(language.parse::<Language>()?);
            }
            if !types.is_empty() {
                let types = types
                    .iter()
                    .map(|t| t.parse::<EntityType>())
                    .collect::<Result<Vec<_>, _>>()?;
                coordinator = coordinator.with_types(types);
            }

            let report = coordinator.extract_report(&text);
            tracing::info!(total = report.entities.len(), "Extraction finished");
            println!("{}", report.to_json(pretty)?);

            if metrics {
                eprint!("{}", observer.render());
            }
        }
        Commands::DetectLanguage { input } => {
            let text = input.read()?;
            let detection = LanguageDetector::new().detect(&text);
            println!("{}", serde_json::to_string(&detection)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_flag_forces_recording() {
        let config = ExtractionConfig {
            record_metrics: false,
            ..ExtractionConfig::default()
        };

        assert!(extraction_config(config.clone(), true).record_metrics);
        assert!(!extraction_config(config, false).record_metrics);
    }
}
