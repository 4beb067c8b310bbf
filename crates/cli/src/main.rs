use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tankobon_core::{
    build_catalog, load_config, validate_config, Config, CwebpTranscoder, NameCodec, Obfuscator,
    PipelineProcessor, RunReport, SanitizedConfig, Transcoder, Upscaler, Waifu2xUpscaler,
};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "tankobon", version)]
#[command(about = "Upscale, compress and obfuscate page image titles for static publishing")]
struct Cli {
    /// Configuration file
    #[arg(long, env = "TANKOBON_CONFIG", default_value = "tankobon.toml", global = true)]
    config: PathBuf,

    /// Override the content directory from the configuration
    #[arg(long, global = true)]
    content_dir: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upscale and compress every unprocessed title
    Process {
        /// Do not check that the external tools can be spawned
        #[arg(long)]
        skip_validate: bool,
    },
    /// Encrypt titles, scramble their names and write metadata records
    Obfuscate,
    /// Print the ordered catalog of obfuscated titles as JSON
    Catalog,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.json);

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("Fatal error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so `catalog` output stays machine-readable.
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Loads and validates the configuration, applying command line overrides.
fn load_configuration(cli: &Cli) -> Result<Config> {
    info!("Loading configuration from {:?}", cli.config);
    let mut config = load_config(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;

    if let Some(content_dir) = &cli.content_dir {
        config.content_dir = content_dir.clone();
    }

    validate_config(&config).context("Configuration validation failed")?;
    Ok(config)
}

/// Runs the selected command. Returns `false` when any title failed.
async fn run(cli: Cli) -> Result<bool> {
    let config = load_configuration(&cli)?;
    info!(version = VERSION, content_dir = %config.content_dir.display(), "Configuration loaded");
    tracing::debug!(
        config = %serde_json::to_string(&SanitizedConfig::from(&config)).unwrap_or_default(),
        "Effective configuration"
    );

    match cli.command {
        Command::Process { skip_validate } => process(&config, skip_validate).await,
        Command::Obfuscate => obfuscate(&config).await,
        Command::Catalog => catalog(&config).await,
    }
}

async fn process(config: &Config, skip_validate: bool) -> Result<bool> {
    let upscaler = Waifu2xUpscaler::new(config.upscaler.clone());
    let transcoder = CwebpTranscoder::new(config.transcoder.clone());

    if !skip_validate {
        upscaler
            .validate()
            .await
            .context("Upscaler is not available")?;
        transcoder
            .validate()
            .await
            .context("Transcoder is not available")?;
        info!(
            upscaler = upscaler.name(),
            transcoder = transcoder.name(),
            "External tools available"
        );
    }

    let processor = PipelineProcessor::new(config.processor.clone(), upscaler, transcoder);
    let report = processor
        .run(&config.content_dir)
        .await
        .context("Processing run aborted")?;

    let status = processor.status();
    info!(
        upscaled = status.upscale_pool.total_processed,
        compressed = status.compress_pool.total_processed,
        "Pool totals"
    );
    Ok(summarize("process", &report))
}

async fn obfuscate(config: &Config) -> Result<bool> {
    let obfuscation = config
        .obfuscation
        .as_ref()
        .context("The [obfuscation] section is required for this command")?;
    let obfuscator = Obfuscator::from_config(obfuscation).context("Invalid obfuscation key")?;

    let report = obfuscator
        .run(&config.content_dir)
        .await
        .context("Obfuscation run aborted")?;
    Ok(summarize("obfuscate", &report))
}

async fn catalog(config: &Config) -> Result<bool> {
    let codec = config
        .obfuscation
        .as_ref()
        .map(|o| NameCodec::new(o.marker.clone()))
        .unwrap_or_default();

    let entries = build_catalog(&config.content_dir, &codec)
        .await
        .context("Failed to build catalog")?;
    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(true)
}

fn summarize(command: &str, report: &RunReport) -> bool {
    for outcome in report.titles.iter().filter(|t| t.is_failed()) {
        error!(title = %outcome.title, status = ?outcome.status, "Title failed");
    }
    println!(
        "{}: {} processed, {} skipped, {} failed",
        command,
        report.processed(),
        report.skipped(),
        report.failed()
    );
    !report.has_failures()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::io::Write;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_process_with_global_flags() {
        let cli = Cli::try_parse_from([
            "tankobon",
            "process",
            "--skip-validate",
            "--config",
            "/etc/tankobon.toml",
            "--json",
        ])
        .unwrap();

        assert!(cli.json);
        assert_eq!(cli.config, PathBuf::from("/etc/tankobon.toml"));
        assert!(matches!(
            cli.command,
            Command::Process {
                skip_validate: true
            }
        ));
    }

    #[test]
    fn test_content_dir_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "content_dir = \"from-file\"").unwrap();

        let cli = Cli::try_parse_from([
            "tankobon",
            "--config",
            file.path().to_str().unwrap(),
            "--content-dir",
            "/override",
            "catalog",
        ])
        .unwrap();

        let config = load_configuration(&cli).unwrap();
        assert_eq!(config.content_dir, PathBuf::from("/override"));
    }

    #[tokio::test]
    async fn test_obfuscate_requires_section() {
        let result = obfuscate(&Config::default()).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_summarize_reports_failures() {
        let mut report = RunReport::default();
        report.push(tankobon_core::TitleOutcome::processed("A", "/c/A"));
        assert!(summarize("process", &report));

        report.push(tankobon_core::TitleOutcome::failed(
            "B",
            "/c/B",
            tankobon_core::processor::Stage::Upscale,
            "boom",
        ));
        assert!(!summarize("process", &report));
    }
}
