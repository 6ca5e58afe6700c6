//! `livecfg`: inspect resolved configuration from the command line.

use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::signal;

use livecfg::observability::logging::init_tracing;
use livecfg::settings::{load_settings, ProviderBuilder};
use livecfg::{ConfigProvider, ConfigResult};

#[derive(Parser)]
#[command(name = "livecfg")]
#[command(about = "Resolve and inspect environment-scoped configuration", long_about = None)]
struct Cli {
    /// Settings file describing the source, resolvers and reload schedule
    #[arg(short, long, default_value = "livecfg.toml")]
    settings: PathBuf,

    /// Override the environment named in the settings file
    #[arg(short, long)]
    environment: Option<String>,

    /// Keep running and log every newly published snapshot
    #[arg(short, long)]
    watch: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every resolved property
    Dump {
        /// Emit a JSON object instead of key = value lines
        #[arg(long)]
        json: bool,
    },
    /// Print one resolved property
    Get {
        key: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_tracing("livecfg=info");
    let cli = Cli::parse();

    let mut settings = load_settings(&cli.settings)?;
    if let Some(environment) = cli.environment {
        settings.environment = environment;
    }

    let provider = ProviderBuilder::from_settings(&settings).build()?;
    print_command(&provider, &cli.command)?;

    if cli.watch {
        watch(&provider, &cli.command).await?;
    }
    Ok(())
}

fn print_command(provider: &ConfigProvider, command: &Commands) -> Result<(), Box<dyn Error>> {
    match command {
        Commands::Dump { json } => {
            let properties = provider.all_properties()?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&properties)?);
            } else {
                for (key, value) in properties.iter() {
                    println!("{} = {}", key, value);
                }
            }
        }
        Commands::Get { key } => {
            let value: String = provider.get_property(key)?;
            println!("{}", value);
        }
    }
    Ok(())
}

/// Poll the published generation and reprint on change until Ctrl+C.
async fn watch(provider: &ConfigProvider, command: &Commands) -> ConfigResult<()> {
    let mut seen = provider.snapshot()?.generation();
    let mut ticker = tokio::time::interval(Duration::from_millis(500));
    tracing::info!(
        environment = %provider.environment(),
        generation = seen,
        "Watching for changes"
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let generation = provider.snapshot()?.generation();
                if generation != seen {
                    seen = generation;
                    tracing::info!(generation, "New configuration published");
                    if let Err(e) = print_command(provider, command) {
                        tracing::error!(error = %e, "Failed to read configuration");
                    }
                }
            }
            _ = signal::ctrl_c() => {
                tracing::info!("Received Ctrl+C, stopping");
                return Ok(());
            }
        }
    }
}
