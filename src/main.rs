use research_agent::cli::{commands, output::Output, Cli};
use research_agent::utils::toml_config::{AgentConfig, LogFormat, LoggingConfig};
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    // Missing .env is fine
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    let (config, origin) = match AgentConfig::load_with_origin(&cli.config) {
        Ok(loaded) => loaded,
        Err(e) => {
            output.error(&e.to_string());
            return ExitCode::FAILURE;
        }
    };

    // The subscriber depends on the config, so the origin is logged after.
    init_logging(&config.logging, cli.verbose);
    origin.log();

    match commands::dispatch(cli.command, &config, &output).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            output.error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` wins over the configured level; `--verbose` wins over both.
fn init_logging(logging: &LoggingConfig, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("research_agent=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level))
    };

    let registry = tracing_subscriber::registry().with(filter);
    match logging.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init(),
    }
}
