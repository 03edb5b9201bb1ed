use super::http::{HttpResponse, HttpTransportRef};
use super::{ChainSource, check_base_url, de_u32, de_u64, dedup_addresses};
use crate::decimal::DecimalContext;
use crate::error::SourceError;
use crate::ticker::Ticker;
use crate::utxo::{Utxo, UtxoSet};
use serde::Deserialize;
use serde_json::json;
use serde_json::value::RawValue;
use std::collections::HashMap;

pub const CLOUDCHAINS_BASE_URL: &str = "https://plugin-api.core.cloudchainsinc.com";

#[derive(Deserialize)]
struct HeightResponse {
    result: HashMap<String, serde_json::Value>,
}

#[derive(Deserialize)]
struct UtxosResponse {
    utxos: Option<Vec<CloudChainsUtxo>>,
    error: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct CloudChainsUtxo {
    txhash: String,
    #[serde(deserialize_with = "de_u32")]
    vout: u32,
    // Whole coins
    value: Box<RawValue>,
    address: String,
    #[serde(deserialize_with = "de_u64")]
    block_number: u64,
}

/// Hosted plugin api. Reports absolute heights and amounts in whole coins.
pub struct CloudChainsSource {
    name: String,
    base_url: String,
    http: HttpTransportRef,
    decimal: DecimalContext,
}

impl CloudChainsSource {
    pub fn new(
        base_url: &str,
        http: HttpTransportRef,
        decimal: DecimalContext,
    ) -> Result<Self, SourceError> {
        Ok(Self {
            name: "cloudchains".to_string(),
            base_url: check_base_url(base_url)?,
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

    fn check_status(&self, url: &str, resp: &HttpResponse) -> Result<(), SourceError> {
        if !resp.is_success() {
            return Err(SourceError::unavailable(format!(
                "Received non-success status code {} from {}",
                resp.status, url
            )));
        }

        Ok(())
    }

    fn to_utxo(&self, entry: CloudChainsUtxo) -> Result<Utxo, SourceError> {
        let value = self.decimal.coins_from_decimal(&entry.value)?;
        Ok(Utxo::new(
            entry.txhash,
            entry.vout,
            value,
            entry.address,
            entry.block_number,
        ))
    }
}

#[async_trait::async_trait]
impl ChainSource for CloudChainsSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get_block_count(&self, ticker: &Ticker) -> Result<u64, SourceError> {
        let url = format!("{}/height", self.base_url);
        let resp = self.http.get(&url, &[]).await?;
        self.check_status(&url, &resp)?;
        debug!("Height response from {}: {}", url, resp.body);

        let heights: HeightResponse = resp.json()?;
        let height = heights.result.get(&ticker.upper()).ok_or_else(|| {
            SourceError::unsupported_asset(format!(
                "{} does not report a height for {}",
                self.name, ticker
            ))
        })?;

        let height = match height {
            serde_json::Value::Number(n) => n.as_u64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };

        height.ok_or_else(|| {
            SourceError::protocol(format!(
                "Invalid height for {} from {}: {}",
                ticker, url, resp.body
            ))
        })
    }

    async fn get_utxos(&self, ticker: &Ticker, addresses: &[String]) -> Result<UtxoSet, SourceError> {
        let addresses = dedup_addresses(addresses);
        if addresses.is_empty() {
            return Ok(UtxoSet::new());
        }

        let body = json!({
            "method": "getutxos",
            "params": [ticker.upper(), addresses],
        });

        let resp = self.http.post_json(&self.base_url, &body).await?;
        self.check_status(&self.base_url, &resp)?;
        debug!("getutxos response from {}: {}", self.base_url, resp.body);

        let result: UtxosResponse = resp.json()?;
        let entries = match result.utxos {
            Some(entries) => entries,
            None => {
                let msg = match result.error {
                    Some(error) => format!("getutxos for {} failed: {}", ticker, error),
                    None => format!("Missing 'utxos' field in response from {}", self.base_url),
                };
                return Err(SourceError::protocol(msg));
            }
        };

        let mut utxos = UtxoSet::with_capacity(entries.len());
        for entry in entries {
            utxos.insert(self.to_utxo(entry)?);
        }

        info!(
            "{} returned {} utxos for {} addresses",
            self.name,
            utxos.len(),
            addresses.len()
        );
        Ok(utxos)
    }
}
