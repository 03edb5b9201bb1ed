mod cmd;
mod output;

#[macro_use]
extern crate log;

use chain_util::{LogConfig, UTXO_RECONCILE_SERVICE_NAME};
use clap::Parser;
use cmd::{Cli, Commands};
use std::path::PathBuf;
use utxo_reconcile::{
    ChainSourceRef, ReconcileConfig, Ticker, create_source, gather, gather_heights, reconcile,
    sorted_utxos,
};

const EXIT_OK: i32 = 0;
const EXIT_FAILURE: i32 = 1;
const EXIT_DIFFERENCES: i32 = 2;

fn config_path(cli: &Cli) -> PathBuf {
    match &cli.config {
        Some(path) => path.clone(),
        None => chain_util::get_default_config_path(UTXO_RECONCILE_SERVICE_NAME),
    }
}

fn resolve_ticker(cli: &Cli, config: &ReconcileConfig) -> Result<Ticker, String> {
    let symbol = cli
        .ticker
        .as_deref()
        .or(config.ticker.as_deref())
        .ok_or_else(|| {
            let msg = "No ticker given, set it in the config or pass --ticker".to_string();
            error!("{}", msg);
            msg
        })?;

    symbol.parse::<Ticker>().map_err(|e| e.to_string())
}

fn resolve_addresses(cli: &Cli, config: &ReconcileConfig) -> Result<Vec<String>, String> {
    let addresses = if cli.addresses.is_empty() {
        config.addresses.clone()
    } else {
        cli.addresses.clone()
    };

    if addresses.is_empty() {
        let msg = "No addresses given, set them in the config or pass --address".to_string();
        error!("{}", msg);
        return Err(msg);
    }

    Ok(addresses)
}

// Builds the configured sources, all of them or only the one labelled `only`
fn create_sources(config: &ReconcileConfig, only: Option<&str>) -> Result<Vec<ChainSourceRef>, String> {
    if config.sources.is_empty() {
        let msg = "No sources configured".to_string();
        error!("{}", msg);
        return Err(msg);
    }

    let selected: Vec<_> = config
        .sources
        .iter()
        .filter(|s| only.is_none_or(|name| s.label() == name))
        .collect();
    if selected.is_empty() {
        let labels: Vec<String> = config.sources.iter().map(|s| s.label()).collect();
        let msg = format!(
            "Unknown source {}, configured sources: {}",
            only.unwrap_or_default(),
            labels.join(", ")
        );
        error!("{}", msg);
        return Err(msg);
    }

    let mut sources = Vec::with_capacity(selected.len());
    for source_config in selected {
        let source = create_source(source_config, &config.http, config.decimal)
            .map_err(|e| format!("Failed to create source {}: {}", source_config.label(), e))?;
        sources.push(source);
    }

    Ok(sources)
}

async fn run(cli: &Cli, command: Commands) -> Result<i32, String> {
    let config = ReconcileConfig::load(&config_path(cli))?;
    let ticker = resolve_ticker(cli, &config)?;

    match command {
        Commands::Check { json, strict } => {
            let addresses = resolve_addresses(cli, &config)?;
            let sources = create_sources(&config, None)?;

            info!(
                "Reconciling {} addresses for {} across {} sources",
                addresses.len(),
                ticker,
                sources.len()
            );
            let results = gather(&sources, &ticker, &addresses)
                .await
                .map_err(|e| e.to_string())?;
            let report = reconcile(&results);

            output::log_report(&ticker, &report);
            if json {
                output::print_json(&report)?;
            } else {
                output::print_report(&ticker, &report);
            }

            if strict && !report.is_consistent() {
                return Ok(EXIT_DIFFERENCES);
            }
        }
        Commands::Heights { json } => {
            let sources = create_sources(&config, None)?;
            let heights = gather_heights(&sources, &ticker)
                .await
                .map_err(|e| e.to_string())?;

            output::log_heights(&heights);
            if json {
                output::print_json(&heights)?;
            } else {
                output::print_heights(&heights);
            }
        }
        Commands::Utxos { source, json } => {
            let addresses = resolve_addresses(cli, &config)?;
            let sources = create_sources(&config, Some(&source))?;

            let results = gather(&sources, &ticker, &addresses)
                .await
                .map_err(|e| e.to_string())?;
            for result in results {
                let utxos = sorted_utxos(&result.utxos);
                if json {
                    output::print_json(&utxos)?;
                } else {
                    output::print_utxos(&result.source, &utxos);
                }
            }
        }
    }

    Ok(EXIT_OK)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let command = cli.command.clone().unwrap_or_default();

    let log_config = LogConfig::new(UTXO_RECONCILE_SERVICE_NAME)
        .with_file_name(&format!("{}_{}", UTXO_RECONCILE_SERVICE_NAME, command.name()))
        .with_level(if cli.verbose { "debug" } else { "info" })
        .enable_console(cli.console);

    // Dropping the handle flushes and closes the log file
    let logger = match chain_util::init_log(log_config) {
        Ok(handle) => handle,
        Err(e) => {
            println!("Failed to init log: {}", e);
            std::process::exit(EXIT_FAILURE);
        }
    };

    let code = match run(&cli, command).await {
        Ok(code) => code,
        Err(e) => {
            println!("Error: {}", e);
            EXIT_FAILURE
        }
    };

    info!("Exiting with code {}", code);
    drop(logger);
    std::process::exit(code);
}
