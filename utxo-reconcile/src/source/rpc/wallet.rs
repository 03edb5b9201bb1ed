use super::{ListUnspentEntry, NodeRpc};
use crate::decimal::DecimalContext;
use crate::error::SourceError;
use crate::source::{ChainSource, dedup_addresses};
use crate::ticker::Ticker;
use crate::utxo::{Utxo, UtxoSet};
use chain_util::{LIST_UNSPENT_MAX_CONF, LIST_UNSPENT_MIN_CONF};

/// Node wallet listing via `listunspent`.
///
/// Known limitations of the underlying call:
/// - Only addresses known to the wallet are covered. Foreign addresses have to
///   be imported as watch-only (with rescan) first, otherwise the listing is
///   silently incomplete.
/// - Immature coinbase outputs (staked or minted coins) are not returned.
/// - Forks of bitcoin may add their own restrictions.
pub struct WalletRpcSource {
    name: String,
    rpc: NodeRpc,
    decimal: DecimalContext,
}

impl WalletRpcSource {
    pub fn new(rpc: NodeRpc, decimal: DecimalContext) -> Self {
        Self {
            name: format!("wallet-rpc-{}", rpc.ticker().lower()),
            rpc,
            decimal,
        }
    }

    pub fn with_name(mut self, name: Option<&str>) -> Self {
        if let Some(name) = name {
            self.name = name.to_string();
        }
        self
    }

    // Unknown addresses only produce a warning: the listing still runs so the
    // degraded result shows up in the reconciliation.
    async fn check_ownership(&self, addresses: &[String]) -> Result<(), SourceError> {
        for address in addresses {
            let info = self.rpc.get_address_info(address).await?;
            if !(info.ismine || info.iswatchonly) {
                warn!(
                    "Non wallet address '{}' queried on {}, listunspent results can be incomplete or wrong. \
                     Import the address first with rescan enabled!",
                    address, self.name
                );
            }
        }

        Ok(())
    }

    fn to_utxo(&self, entry: ListUnspentEntry, block_count: u64) -> Result<Utxo, SourceError> {
        // confirmations == 1 means mined in the tip block
        let block = entry
            .confirmations
            .checked_sub(1)
            .and_then(|depth| block_count.checked_sub(depth))
            .ok_or_else(|| {
                SourceError::protocol(format!(
                    "Utxo {}:{} has {} confirmations at chain height {}",
                    entry.txid, entry.vout, entry.confirmations, block_count
                ))
            })?;
        let value = self.decimal.coins_from_decimal(&entry.amount)?;

        Ok(Utxo::new(entry.txid, entry.vout, value, entry.address, block))
    }
}

#[async_trait::async_trait]
impl ChainSource for WalletRpcSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get_block_count(&self, ticker: &Ticker) -> Result<u64, SourceError> {
        self.rpc.check_ticker(ticker)?;
        self.rpc.get_block_count().await
    }

    async fn get_utxos(&self, ticker: &Ticker, addresses: &[String]) -> Result<UtxoSet, SourceError> {
        self.rpc.check_ticker(ticker)?;

        let addresses = dedup_addresses(addresses);
        // An empty filter would list the whole wallet
        if addresses.is_empty() {
            return Ok(UtxoSet::new());
        }

        self.check_ownership(&addresses).await?;

        let block_count = self.rpc.get_block_count().await?;
        let entries = self
            .rpc
            .list_unspent(LIST_UNSPENT_MIN_CONF, LIST_UNSPENT_MAX_CONF, &addresses)
            .await?;

        let mut utxos = UtxoSet::with_capacity(entries.len());
        for entry in entries {
            utxos.insert(self.to_utxo(entry, block_count)?);
        }

        info!(
            "{} returned {} utxos for {} addresses at height {}",
            self.name,
            utxos.len(),
            addresses.len(),
            block_count
        );
        Ok(utxos)
    }
}
