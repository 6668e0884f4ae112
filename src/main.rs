use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bdr_outreach::{
    cli::{execute_command, Cli},
    config::{Config, LogFormat},
    engine::OutreachEngine,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);
    debug!(version = env!("CARGO_PKG_VERSION"), "bdr-outreach starting");

    let engine = match OutreachEngine::from_config(&config) {
        Ok(engine) => engine,
        Err(e) => {
            error!(error = %e, "Failed to load catalog");
            return Err(e.into());
        }
    };

    let result = execute_command(cli.command, &config, &engine).await;
    if result.exit_code == 0 {
        println!("{}", result.message);
    } else {
        eprintln!("{}", result.message);
        std::process::exit(result.exit_code);
    }
    Ok(())
}

/// Logs go to stderr so stdout stays clean JSON.
fn init_logging(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
