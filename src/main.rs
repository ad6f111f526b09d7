//! subtrans - Subtitle translation through Google Translate
//!
//! Entry point: sets up logging, loads the configuration and dispatches the
//! command line to the library.

use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use subtrans::cli::{Args, Commands};
use subtrans::config::{Config, TranslatorKind};
use subtrans::translate::TranslatorFactory;
use subtrans::workflow::Workflow;

const DEFAULT_CONFIG_FILE: &str = "subtrans.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration, it also carries the logging defaults
    let (mut config, config_source) = match &args.config {
        Some(config_path) => (Config::from_file(config_path)?, Some(config_path.clone())),
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            (Config::from_file(DEFAULT_CONFIG_FILE)?, Some(PathBuf::from(DEFAULT_CONFIG_FILE)))
        }
        None => (Config::default(), None),
    };

    // Setup logging to the console and optionally to a file
    let log_level = args.log_level.clone().unwrap_or_else(|| config.logging.level.clone());
    let log_dir = args.log_dir.clone().or_else(|| config.logging.dir.as_ref().map(PathBuf::from));
    let _guard = setup_logging(&log_level, log_dir.as_deref())?;

    match &config_source {
        Some(path) => info!("Loaded configuration from {}", path.display()),
        None => info!("Using default configuration"),
    }

    match args.command {
        Commands::Translate(translate) => {
            translate.apply_to(&mut config)?;
            let input_type = translate.input_type()?;

            let workflow = Workflow::new(config)?;
            let language = workflow.language()?;
            println!("Translating to \"{}\".", language.full);

            workflow
                .translate_file(&translate.input, &translate.output, input_type)
                .await?;
            println!("Finished!");
        }
        Commands::Languages { translator } => {
            let kind = match translator {
                Some(name) => TranslatorKind::from_name(&name)?,
                None => config.translate.translator,
            };

            let translator = TranslatorFactory::create(kind, &config.translate)?;
            println!("Languages supported by {}:", kind.name());
            for language in translator.supported().split(", ") {
                println!("  {}", language);
            }
        }
        Commands::Separators => {
            println!("Separators, in the order they are tried:");
            for separator in &config.translate.separators {
                println!("  {:?}", separator);
            }
        }
    }

    Ok(())
}

/// Install the console layer and, when a directory is given, a daily rolling file layer.
///
/// The returned guard flushes the file writer on drop and must outlive the program.
fn setup_logging(level: &str, log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let log_level: Level = level
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid log level '{}'. Valid levels: error, warn, info, debug, trace", level))?;

    // Create console layer
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    // Create file layer
    let (file_layer, guard) = match log_dir {
        Some(log_dir) => {
            std::fs::create_dir_all(log_dir)?;
            let (non_blocking_file, guard) = non_blocking(rolling::daily(log_dir, "subtrans.log"));
            let layer = fmt::layer()
                .with_writer(non_blocking_file)
                .with_target(false)
                .with_file(true)
                .with_line_number(true)
                .with_ansi(false); // No ANSI colors in file
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    // Setup layered subscriber
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    match log_dir {
        Some(log_dir) => info!("Logging initialized - console: {}, file: {}", log_level, log_dir.join("subtrans.log").display()),
        None => info!("Logging initialized - console: {}", log_level),
    }

    Ok(guard)
}
