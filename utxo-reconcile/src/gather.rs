use crate::error::ReconcileError;
use crate::reconcile::{SourceHeight, SourceResult};
use crate::source::ChainSourceRef;
use crate::ticker::Ticker;
use std::sync::Arc;

async fn query_source(
    source: ChainSourceRef,
    ticker: Arc<Ticker>,
    addresses: Arc<Vec<String>>,
) -> Result<SourceResult, ReconcileError> {
    let name = source.name().to_string();
    info!("Querying source {} for {}", name, ticker);

    let (height, utxos) = tokio::join!(
        source.get_block_count(&ticker),
        source.get_utxos(&ticker, &addresses)
    );

    let wrap = |error| ReconcileError::Source {
        name: name.clone(),
        error,
    };
    let height = height.map_err(&wrap)?;
    let utxos = utxos.map_err(&wrap)?;

    info!(
        "Source {} reported height {} and {} utxos",
        name,
        height,
        utxos.len()
    );
    Ok(SourceResult {
        source: name,
        height,
        utxos,
    })
}

async fn join_tasks<T>(
    names: Vec<String>,
    handles: Vec<tokio::task::JoinHandle<Result<T, ReconcileError>>>,
) -> Result<Vec<T>, ReconcileError> {
    let results = futures::future::join_all(handles).await;

    // Any failed source fails the run, comparing the remaining ones could hide
    // exactly the divergence being looked for
    let mut items = Vec::with_capacity(results.len());
    for (name, result) in names.into_iter().zip(results) {
        match result {
            Ok(Ok(item)) => items.push(item),
            // Already logged where the source error was raised
            Ok(Err(e)) => return Err(e),
            Err(e) => {
                let e = ReconcileError::Join {
                    name,
                    message: e.to_string(),
                };
                error!("{}", e);
                return Err(e);
            }
        }
    }

    Ok(items)
}

/// Queries height and utxos of every source concurrently, one task per
/// source. Results keep the order of `sources`.
pub async fn gather(
    sources: &[ChainSourceRef],
    ticker: &Ticker,
    addresses: &[String],
) -> Result<Vec<SourceResult>, ReconcileError> {
    let ticker = Arc::new(ticker.clone());
    let addresses = Arc::new(addresses.to_vec());

    let names = sources.iter().map(|s| s.name().to_string()).collect();
    let handles = sources
        .iter()
        .map(|source| tokio::spawn(query_source(source.clone(), ticker.clone(), addresses.clone())))
        .collect();

    join_tasks(names, handles).await
}

/// Height only, for every source concurrently.
pub async fn gather_heights(
    sources: &[ChainSourceRef],
    ticker: &Ticker,
) -> Result<Vec<SourceHeight>, ReconcileError> {
    let ticker = Arc::new(ticker.clone());

    let names = sources.iter().map(|s| s.name().to_string()).collect();
    let handles = sources
        .iter()
        .map(|source| {
            let source = source.clone();
            let ticker = ticker.clone();
            tokio::spawn(async move {
                let name = source.name().to_string();
                let height = source
                    .get_block_count(&ticker)
                    .await
                    .map_err(|error| ReconcileError::Source {
                        name: name.clone(),
                        error,
                    })?;

                Ok::<_, ReconcileError>(SourceHeight {
                    source: name,
                    height,
                })
            })
        })
        .collect();

    join_tasks(names, handles).await
}
