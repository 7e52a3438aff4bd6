use anyhow::Result;
use clap::{Parser, Subcommand};

use campaigner::config::Config;
use campaigner::installer::Configurator;
use campaigner::logging;
use campaigner::rest::{self, ApiState};

#[derive(Parser)]
#[command(name = "campaigner")]
#[command(about = "Installation wizard and API server for the Campaigner platform")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default)
    Serve {
        /// Override the configured port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print installation requirement status
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;
    let _logging = logging::init_logging(&config, cli.debug)?;

    match cli.command {
        Some(Commands::Check) => run_check(&config),
        Some(Commands::Serve { port }) => run_serve(config, port).await,
        None => run_serve(config, None).await,
    }
}

async fn run_serve(config: Config, port_override: Option<u16>) -> Result<()> {
    let port = port_override.unwrap_or(config.server.port);
    let state = ApiState::new(config);
    rest::serve(state, port).await
}

fn run_check(config: &Config) -> Result<()> {
    let configurator = Configurator::from_config(config);

    println!("Requirements:");
    for requirement in configurator.requirements() {
        let mark = if requirement.satisfied { "ok" } else { "!!" };
        println!("  [{mark}] {}", requirement.label);
    }

    println!("Optional settings:");
    for setting in configurator.optional_settings() {
        let mark = if setting.satisfied { "ok" } else { "--" };
        println!("  [{mark}] {}", setting.label);
    }

    Ok(())
}
