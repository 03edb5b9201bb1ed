use serde::Serialize;
use utxo_reconcile::{Reconciliation, SourceHeight, Ticker, Utxo, check_heights};

fn log_height_divergence(heights: &[SourceHeight]) {
    if let Some(divergence) = check_heights(heights) {
        let detail: Vec<String> = divergence
            .heights
            .iter()
            .map(|h| format!("{}={}", h.source, h.height))
            .collect();
        warn!("Sources report different block heights: {}", detail.join(", "));
    }
}

pub fn log_heights(heights: &[SourceHeight]) {
    for h in heights {
        info!("{} height: {}", h.source, h.height);
    }
    log_height_divergence(heights);
}

pub fn log_report(ticker: &Ticker, report: &Reconciliation) {
    log_heights(&report.heights);

    info!("{} utxos found in all sources: {}", ticker, report.intersection.len());
    for utxo in &report.intersection {
        debug!("{}", utxo);
    }

    if report.is_consistent() {
        info!("All utxos match!");
        return;
    }

    for diff in report.divergent_sources() {
        warn!(
            "{} has {} utxos not reported by every source",
            diff.source,
            diff.utxos.len()
        );
        for utxo in &diff.utxos {
            warn!("{}: {}", diff.source, utxo);
        }
    }
}

pub fn print_heights(heights: &[SourceHeight]) {
    for h in heights {
        println!("{:<32} {}", h.source, h.height);
    }
    if check_heights(heights).is_some() {
        println!("WARNING: sources report different block heights");
    }
}

pub fn print_report(ticker: &Ticker, report: &Reconciliation) {
    println!("Block heights:");
    print_heights(&report.heights);

    println!();
    println!("{} utxos found in all sources: {}", ticker, report.intersection.len());
    for utxo in &report.intersection {
        println!("  {}", utxo);
    }

    if report.is_consistent() {
        println!();
        println!("All utxos match!");
        return;
    }

    for diff in report.divergent_sources() {
        println!();
        println!(
            "{} has {} utxos not reported by every source:",
            diff.source,
            diff.utxos.len()
        );
        for utxo in &diff.utxos {
            println!("  {}", utxo);
        }
    }
}

pub fn print_utxos(source: &str, utxos: &[Utxo]) {
    println!("{} reported {} utxos:", source, utxos.len());
    for utxo in utxos {
        println!("  {}", utxo);
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let data = serde_json::to_string_pretty(value).map_err(|e| {
        let msg = format!("Failed to serialize output: {}", e);
        error!("{}", msg);
        msg
    })?;
    println!("{}", data);

    Ok(())
}
