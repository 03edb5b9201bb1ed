use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "utxo-reconcile")]
#[command(version = "0.1.0")]
#[command(about = "Cross-check the unspent outputs of addresses across chain data sources", long_about = None)]
pub struct Cli {
    /// Config file, defaults to ~/.utxo-reconcile/utxo-reconcile/config.toml
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Coin ticker, overrides the configured one
    #[arg(short, long, global = true)]
    pub ticker: Option<String>,

    /// Address to check, repeatable. Replaces the configured address list
    #[arg(short, long = "address", global = true, value_name = "ADDRESS")]
    pub addresses: Vec<String>,

    /// Also write the log to stderr
    #[arg(long, global = true)]
    pub console: bool,

    /// Debug level logging, including raw provider responses
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[command(rename_all = "kebab-case")]
pub enum Commands {
    /// Reconcile the utxos of all configured sources (default)
    Check {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Exit with code 2 when the sources disagree
        #[arg(long)]
        strict: bool,
    },

    /// Show the chain height reported by every source
    Heights {
        #[arg(long)]
        json: bool,
    },

    /// Dump the normalized utxos of a single source
    Utxos {
        /// Source name, as shown in the reports
        #[arg(short, long, value_name = "NAME")]
        source: String,

        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Check { .. } => "check",
            Commands::Heights { .. } => "heights",
            Commands::Utxos { .. } => "utxos",
        }
    }
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Check {
            json: false,
            strict: false,
        }
    }
}
