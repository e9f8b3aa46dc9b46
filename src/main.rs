//! paygate CLI
//!
//! Entry point for the `paygate` command-line tool.

use clap::{Parser, Subcommand};
use paygate::config::{load_config_file, parse_override, ConfigSource};
use paygate::{ConfigMap, FactoryError, GatewayFactory};
use std::path::PathBuf;
use std::process;

/// Environment variable holding the log filter
const LOG_ENV: &str = "PAYGATE_LOG";

#[derive(Parser)]
#[command(name = "paygate")]
#[command(about = "Payment gateway factory", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the effective resolved configuration
    Config {
        /// Output in human-readable format instead of JSON
        #[arg(long)]
        human: bool,

        /// Path to a TOML config file
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Override a key (KEY=VALUE, value parsed as JSON or taken as a string)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        overrides: Vec<String>,
    },

    /// Build a gateway and print its shape
    Build {
        /// Output in JSON format
        #[arg(long)]
        json: bool,

        /// Path to a TOML config file
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Override a key (KEY=VALUE, value parsed as JSON or taken as a string)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        overrides: Vec<String>,
    },
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Config {
            human,
            config,
            overrides,
        } => run_config(human, config, &overrides),
        Commands::Build {
            json,
            config,
            overrides,
        } => run_build(json, config, &overrides),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Caller layer from the optional file, then the overrides in order
fn load_caller_config(
    path: Option<PathBuf>,
    overrides: &[String],
) -> Result<(ConfigMap, Vec<ConfigSource>), FactoryError> {
    let (mut config, sources) = match path {
        Some(path) => {
            let (config, source) = load_config_file(&path)?;
            (config, vec![source])
        }
        None => (ConfigMap::new(), Vec::new()),
    };

    for raw in overrides {
        let (key, value) = parse_override(raw)?;
        config.insert(key, value);
    }

    Ok((config, sources))
}

fn run_config(
    human: bool,
    config_path: Option<PathBuf>,
    overrides: &[String],
) -> Result<(), FactoryError> {
    let (config, sources) = load_caller_config(config_path, overrides)?;
    let resolved = GatewayFactory::new()
        .create_config(config)?
        .with_sources(sources);

    if human {
        print!("{}", resolved.to_human());
    } else {
        println!("{}", resolved.to_json()?);
    }
    Ok(())
}

fn run_build(
    json: bool,
    config_path: Option<PathBuf>,
    overrides: &[String],
) -> Result<(), FactoryError> {
    let (config, _) = load_caller_config(config_path, overrides)?;
    let gateway = GatewayFactory::new().create(config)?;
    let shape = gateway.shape();

    if json {
        println!("{}", serde_json::to_string_pretty(&shape)?);
    } else {
        print!("{}", shape.to_human());
    }
    Ok(())
}
