use crate::utxo::{Utxo, UtxoSet, sorted_utxos};
use serde::Serialize;

/// What one source reported in a run.
#[derive(Debug, Clone)]
pub struct SourceResult {
    pub source: String,
    pub height: u64,
    pub utxos: UtxoSet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceHeight {
    pub source: String,
    pub height: u64,
}

/// Sources disagree on the chain height. Small skew is normal, so this is
/// reported, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeightDivergence {
    pub heights: Vec<SourceHeight>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceDiff {
    pub source: String,
    pub utxos: Vec<Utxo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    pub heights: Vec<SourceHeight>,
    pub height_divergence: Option<HeightDivergence>,
    // Utxos reported by every source
    pub intersection: Vec<Utxo>,
    // Per source, utxos missing from at least one other source
    pub diffs: Vec<SourceDiff>,
}

impl Reconciliation {
    pub fn heights_agree(&self) -> bool {
        self.height_divergence.is_none()
    }

    pub fn diff_count(&self) -> usize {
        self.diffs.iter().map(|d| d.utxos.len()).sum()
    }

    /// All sources reported exactly the same utxos.
    pub fn is_consistent(&self) -> bool {
        self.diff_count() == 0
    }

    pub fn divergent_sources(&self) -> impl Iterator<Item = &SourceDiff> {
        self.diffs.iter().filter(|d| !d.utxos.is_empty())
    }
}

/// Intersection of all sets, and for each set what it has beyond the
/// intersection. No sets gives an empty intersection and no diffs.
pub fn diff(utxo_sets: &[UtxoSet]) -> (UtxoSet, Vec<UtxoSet>) {
    let intersection: UtxoSet = match utxo_sets.split_first() {
        Some((first, rest)) => first
            .iter()
            .filter(|utxo| rest.iter().all(|set| set.contains(*utxo)))
            .cloned()
            .collect(),
        None => UtxoSet::new(),
    };

    let diffs = utxo_sets
        .iter()
        .map(|set| set.difference(&intersection).cloned().collect())
        .collect();

    (intersection, diffs)
}

pub fn check_heights(heights: &[SourceHeight]) -> Option<HeightDivergence> {
    let first = heights.first()?;
    if heights.iter().all(|h| h.height == first.height) {
        return None;
    }

    Some(HeightDivergence {
        heights: heights.to_vec(),
    })
}

/// Compares the results of all sources. Pure and total, logging the warnings
/// carried by the report is left to the caller.
pub fn reconcile(results: &[SourceResult]) -> Reconciliation {
    let heights: Vec<SourceHeight> = results
        .iter()
        .map(|r| SourceHeight {
            source: r.source.clone(),
            height: r.height,
        })
        .collect();
    let height_divergence = check_heights(&heights);

    let sets: Vec<UtxoSet> = results.iter().map(|r| r.utxos.clone()).collect();
    let (intersection, diffs) = diff(&sets);

    let diffs = results
        .iter()
        .zip(diffs.iter())
        .map(|(result, diff)| SourceDiff {
            source: result.source.clone(),
            utxos: sorted_utxos(diff),
        })
        .collect();

    Reconciliation {
        heights,
        height_divergence,
        intersection: sorted_utxos(&intersection),
        diffs,
    }
}
