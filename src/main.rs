use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use validate_streams::cli::Cli;
use validate_streams::config::{Config, ConfigManager};
use validate_streams::{FileDiscovery, Output, ValidationConfig, ValidationEngine};

/// Exit status for a run that could not complete
const FATAL_EXIT: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_args();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(FATAL_EXIT)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        "validate_streams=debug"
    } else {
        "validate_streams=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<u8> {
    cli.validate().map_err(anyhow::Error::msg)?;

    let config = ConfigManager::load_config(&cli)
        .await
        .context("failed to load configuration")?;
    debug!(?config, "effective configuration");

    let discovery = FileDiscovery::new()
        .with_extensions(config.files.extensions.clone())
        .with_include_patterns(config.files.include_patterns.clone())?
        .with_exclude_patterns(config.files.exclude_patterns.clone())?
        .with_max_depth(config.files.max_depth);

    let engine = ValidationEngine::new(engine_config(&config, &cli));
    let results = engine
        .validate_path(&cli.path, &discovery)
        .await
        .with_context(|| format!("failed to validate {}", cli.path.display()))?;
    info!(
        files = results.total_files,
        valid = results.valid_files,
        "validation finished"
    );

    let output = Output::new(config.verbosity()).with_format(config.output.format);
    print!("{}", output.render(&results)?);

    Ok(results.exit_code() as u8)
}

fn engine_config(config: &Config, cli: &Cli) -> ValidationConfig {
    ValidationConfig {
        max_concurrent_validations: ConfigManager::get_thread_count(config),
        validation_timeout: Duration::from_secs(30),
        fail_fast: config.validation.fail_fast,
        check_files: config.validation.check_files,
        query_time: cli.at.clone(),
    }
}
