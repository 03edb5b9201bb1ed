use super::http::{HttpResponse, HttpTransportRef};
use super::{ChainSource, check_base_url, de_u32, de_u64, dedup_addresses};
use crate::decimal::DecimalContext;
use crate::error::SourceError;
use crate::ticker::Ticker;
use crate::utxo::{Utxo, UtxoSet};
use serde::Deserialize;
use serde_json::value::RawValue;

pub const EXPLORER_BASE_URL: &str = "https://chainz.cryptoid.info";

#[derive(Deserialize)]
struct UnspentResponse {
    unspent_outputs: Vec<ExplorerUtxo>,
}

#[derive(Deserialize)]
struct ExplorerUtxo {
    tx_hash: String,
    // Misspelled by the api
    #[serde(rename = "tx_ouput_n", deserialize_with = "de_u32")]
    vout: u32,
    // Subunits, 1e8 per coin
    value: Box<RawValue>,
    addr: String,
    #[serde(deserialize_with = "de_u64")]
    confirmations: u64,
}

/// Public block explorer api (chainz style). Entries carry confirmations
/// instead of heights, so every utxo query starts with a height request.
pub struct ExplorerSource {
    name: String,
    base_url: String,
    api_key: String,
    http: HttpTransportRef,
    decimal: DecimalContext,
}

impl ExplorerSource {
    pub fn new(
        base_url: &str,
        api_key: &str,
        http: HttpTransportRef,
        decimal: DecimalContext,
    ) -> Result<Self, SourceError> {
        // The unspent query is rejected without a key, fail before the first call
        if api_key.trim().is_empty() {
            return Err(SourceError::config(format!(
                "Explorer {} requires an api key",
                base_url
            )));
        }

        Ok(Self {
            name: "explorer".to_string(),
            base_url: check_base_url(base_url)?,
            api_key: api_key.trim().to_string(),
            http,
            decimal,
        })
    }

    pub fn with_name(mut self, name: Option<&str>) -> Self {
        if let Some(name) = name {
            self.name = name.to_string();
        }
        self
    }

    fn api_url(&self, ticker: &Ticker) -> String {
        format!("{}/{}/api.dws", self.base_url, ticker.lower())
    }

    fn check_status(&self, ticker: &Ticker, url: &str, resp: &HttpResponse) -> Result<(), SourceError> {
        // Unknown coins have no api path
        if resp.status == 404 {
            return Err(SourceError::unsupported_asset(format!(
                "{} does not serve {}",
                self.name, ticker
            )));
        }

        if !resp.is_success() {
            return Err(SourceError::unavailable(format!(
                "Received non-success status code {} from {}",
                resp.status, url
            )));
        }

        Ok(())
    }

    fn to_utxo(&self, entry: ExplorerUtxo, block_count: u64) -> Result<Utxo, SourceError> {
        let block = block_count.checked_sub(entry.confirmations).ok_or_else(|| {
            SourceError::protocol(format!(
                "Utxo {}:{} has {} confirmations, more than chain height {}",
                entry.tx_hash, entry.vout, entry.confirmations, block_count
            ))
        })?;
        let value = self.decimal.coins_from_subunits(&entry.value)?;

        Ok(Utxo::new(entry.tx_hash, entry.vout, value, entry.addr, block))
    }
}

#[async_trait::async_trait]
impl ChainSource for ExplorerSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get_block_count(&self, ticker: &Ticker) -> Result<u64, SourceError> {
        let url = self.api_url(ticker);
        let resp = self.http.get(&url, &[("q", "getblockcount")]).await?;
        self.check_status(ticker, &url, &resp)?;

        let height: serde_json::Value = resp.json()?;
        let height = match &height {
            serde_json::Value::Number(n) => n.as_u64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };

        height.ok_or_else(|| {
            SourceError::protocol(format!("Invalid block count from {}: {}", url, resp.body))
        })
    }

    async fn get_utxos(&self, ticker: &Ticker, addresses: &[String]) -> Result<UtxoSet, SourceError> {
        let addresses = dedup_addresses(addresses);
        if addresses.is_empty() {
            return Ok(UtxoSet::new());
        }

        // Needed to turn confirmations into heights
        let block_count = self.get_block_count(ticker).await?;

        let url = self.api_url(ticker);
        let active = addresses.join("|");
        let query = [
            ("q", "unspent"),
            ("active", active.as_str()),
            ("key", self.api_key.as_str()),
        ];
        let resp = self.http.get(&url, &query).await?;
        self.check_status(ticker, &url, &resp)?;
        debug!("unspent response from {}: {}", url, resp.body);

        let result: UnspentResponse = resp.json()?;
        let mut utxos = UtxoSet::with_capacity(result.unspent_outputs.len());
        for entry in result.unspent_outputs {
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
