//! Strata CLI
//!
//! Entry point for the `strata` command-line tool.

use clap::{Parser, Subcommand};
use std::process;
use strata::{logger, Assignment, FileLayer, Layers};

#[derive(Parser)]
#[command(name = "strata")]
#[command(about = "Layered configuration inspector", version)]
struct Cli {
    /// Log level used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge the given layers and print the subtree at PATH as JSON
    Read {
        /// JSON file layer, optionally nested under a dot prefix
        #[arg(long = "json", value_name = "FILE[@PREFIX]")]
        json: Vec<FileLayer>,

        /// TOML file layer, optionally nested under a dot prefix
        #[arg(long = "toml", value_name = "FILE[@PREFIX]")]
        toml: Vec<FileLayer>,

        /// YAML file layer, optionally nested under a dot prefix
        #[arg(long = "yaml", value_name = "FILE[@PREFIX]")]
        yaml: Vec<FileLayer>,

        /// Constant string value at a dot key
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<Assignment>,

        /// Environment variable prefix for read-time overrides
        #[arg(long, value_name = "PREFIX")]
        env: Option<String>,

        /// Dot path to print (default: the whole tree)
        path: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logger::init(&cli.log_level) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    match cli.command {
        Commands::Read {
            json,
            toml,
            yaml,
            set,
            env,
            path,
        } => run_read(
            Layers {
                json,
                toml,
                yaml,
                set,
                env,
            },
            path.as_deref().unwrap_or_default(),
        ),
    }
}

fn run_read(layers: Layers, path: &str) {
    match strata::inspect(layers, path) {
        Ok(rendered) => println!("{}", rendered),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
