use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use chat_branch_tree::{
    cli::{execute_command, Commands},
    config::{Config, LogFormat},
};

/// Branching conversation tree toolkit
#[derive(Parser, Debug)]
#[command(name = "chat-branch-tree", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    init_logging(&config);

    let cli = Cli::parse();
    debug!(
        version = env!("CARGO_PKG_VERSION"),
        command = ?cli.command,
        "Running command"
    );

    let result = execute_command(cli.command, &config);
    if result.exit_code == 0 {
        println!("{}", result.message);
    } else {
        error!(exit_code = result.exit_code, "Command failed");
        eprintln!("{}", result.message);
        std::process::exit(result.exit_code);
    }
    Ok(())
}

/// Initialize tracing/logging
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
