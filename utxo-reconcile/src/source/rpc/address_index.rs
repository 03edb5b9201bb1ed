use super::{AddressUtxoEntry, NodeRpc};
use crate::decimal::DecimalContext;
use crate::error::SourceError;
use crate::source::{ChainSource, dedup_addresses};
use crate::ticker::Ticker;
use crate::utxo::{Utxo, UtxoSet};

/// Node address index lookup via `getaddressutxos` (dash style nodes started
/// with `-addressindex`). Works for any address, wallet or not.
pub struct AddressIndexRpcSource {
    name: String,
    rpc: NodeRpc,
    decimal: DecimalContext,
}

impl AddressIndexRpcSource {
    pub fn new(rpc: NodeRpc, decimal: DecimalContext) -> Self {
        Self {
            name: format!("address-index-rpc-{}", rpc.ticker().lower()),
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

    fn to_utxo(&self, entry: AddressUtxoEntry) -> Result<Utxo, SourceError> {
        let value = self.decimal.coins_from_subunits(&entry.satoshis)?;
        Ok(Utxo::new(
            entry.txid,
            entry.output_index,
            value,
            entry.address,
            entry.height,
        ))
    }
}

#[async_trait::async_trait]
impl ChainSource for AddressIndexRpcSource {
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
        if addresses.is_empty() {
            return Ok(UtxoSet::new());
        }

        let entries = self.rpc.get_address_utxos(&addresses).await?;

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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::testing::MockRpc;
    use bigdecimal::BigDecimal;
    use serde_json::json;
    use std::str::FromStr;

    const ADDRESS_UTXOS: &str = r#"[
        {"address": "XwnLY9Tf7Zsef8gMGL2fhWA9ZmMjt4KPwg", "txid": "bb01", "outputIndex": 0,
         "script": "76a914", "satoshis": 150000000, "height": 95},
        {"address": "XwnLY9Tf7Zsef8gMGL2fhWA9ZmMjt4KPwg", "txid": "bb02", "outputIndex": 4,
         "script": "76a914", "satoshis": 1, "height": 99}
    ]"#;

    fn dash() -> Ticker {
        "DASH".parse().unwrap()
    }

    #[tokio::test]
    async fn test_get_utxos() {
        let rpc = MockRpc::new(|method, _| match method {
            "getaddressutxos" => Ok(ADDRESS_UTXOS.to_string()),
            "getblockcount" => Ok("120".to_string()),
            _ => Err(SourceError::Unavailable("Method not found".to_string())),
        });
        let source = AddressIndexRpcSource::new(
            NodeRpc::new(dash(), rpc.clone()),
            DecimalContext::default(),
        );

        let addresses = vec![
            "XwnLY9Tf7Zsef8gMGL2fhWA9ZmMjt4KPwg".to_string(),
            "XwnLY9Tf7Zsef8gMGL2fhWA9ZmMjt4KPwg".to_string(),
        ];
        let utxos = source.get_utxos(&dash(), &addresses).await.unwrap();
        assert_eq!(utxos.len(), 2);

        let first = utxos.iter().find(|u| u.txid() == "bb01").unwrap();
        assert_eq!(first.block(), 95);
        assert_eq!(first.value().to_string(), "1.5");

        let second = utxos.iter().find(|u| u.txid() == "bb02").unwrap();
        assert_eq!(second.vout(), 4);
        assert_eq!(*second.value(), BigDecimal::from_str("0.00000001").unwrap());

        // Heights come with the entries, no extra round trip
        let calls = rpc.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, "getaddressutxos");
        assert_eq!(
            calls[0].params,
            vec![json!({"addresses": ["XwnLY9Tf7Zsef8gMGL2fhWA9ZmMjt4KPwg"]})]
        );

        assert_eq!(source.get_block_count(&dash()).await.unwrap(), 120);
    }

    #[tokio::test]
    async fn test_index_disabled() {
        let rpc = MockRpc::new(|_, _| {
            Err(SourceError::Unavailable(
                "getaddressutxos rejected: Address index not enabled (-5)".to_string(),
            ))
        });
        let source = AddressIndexRpcSource::new(NodeRpc::new(dash(), rpc), DecimalContext::default())
            .with_name(Some("dashd"));
        assert_eq!(source.name(), "dashd");

        let ret = source.get_utxos(&dash(), &["X".to_string()]).await;
        assert!(matches!(ret, Err(SourceError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_missing_field() {
        let rpc = MockRpc::new(|_, _| {
            Ok(r#"[{"address": "X", "txid": "bb", "satoshis": 1, "height": 1}]"#.to_string())
        });
        let source = AddressIndexRpcSource::new(NodeRpc::new(dash(), rpc), DecimalContext::default());
        let ret = source.get_utxos(&dash(), &["X".to_string()]).await;
        assert!(matches!(ret, Err(SourceError::Protocol(_))));
    }
}
