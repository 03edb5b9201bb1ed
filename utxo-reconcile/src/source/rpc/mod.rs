mod address_index;
mod transport;
mod wallet;

pub use address_index::*;
pub use transport::*;
pub use wallet::*;

use crate::error::SourceError;
use crate::source::de_u64;
use crate::ticker::Ticker;
use chain_util::NodeRpcConfig;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::value::RawValue;
use serde_json::{Value, json};
use std::sync::Arc;

/// Raw JSON-RPC access to a node. Blocking, callers run it off the async runtime.
pub trait RpcTransport: Send + Sync {
    fn call(&self, method: &str, params: &[Value]) -> Result<Box<RawValue>, SourceError>;
}

pub type RpcTransportRef = Arc<dyn RpcTransport>;

#[derive(Debug, Deserialize)]
pub struct AddressInfo {
    pub address: Option<String>,
    #[serde(default)]
    pub ismine: bool,
    #[serde(default)]
    pub iswatchonly: bool,
}

#[derive(Debug, Deserialize)]
pub struct ListUnspentEntry {
    pub txid: String,
    pub vout: u32,
    pub address: String,
    // Whole coins
    pub amount: Box<RawValue>,
    // 1 for an output mined in the tip block
    pub confirmations: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressUtxoEntry {
    pub address: String,
    pub txid: String,
    pub output_index: u32,
    // Subunits, 1e8 per coin
    pub satoshis: Box<RawValue>,
    #[serde(deserialize_with = "de_u64")]
    pub height: u64,
}

/// Node command interface shared by the wallet scoped and the address index
/// adapters. A node serves exactly one chain, fixed at construction.
#[derive(Clone)]
pub struct NodeRpc {
    ticker: Ticker,
    transport: RpcTransportRef,
}

impl NodeRpc {
    pub fn new(ticker: Ticker, transport: RpcTransportRef) -> Self {
        Self { ticker, transport }
    }

    /// Validates the configuration and builds the transport eagerly.
    pub fn connect(config: &NodeRpcConfig) -> Result<Self, SourceError> {
        let ticker: Ticker = config.ticker.parse()?;
        let client = NodeRpcClient::new(config)?;
        Ok(Self::new(ticker, Arc::new(client)))
    }

    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    pub fn check_ticker(&self, ticker: &Ticker) -> Result<(), SourceError> {
        if *ticker != self.ticker {
            return Err(SourceError::unsupported_asset(format!(
                "Node for {} cannot answer for {}",
                self.ticker, ticker
            )));
        }

        Ok(())
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &'static str,
        params: Vec<Value>,
    ) -> Result<T, SourceError> {
        let transport = self.transport.clone();
        let raw = tokio::task::spawn_blocking(move || transport.call(method, &params))
            .await
            .map_err(|e| SourceError::unavailable(format!("{} task failed: {}", method, e)))??;
        debug!("{} response: {}", method, raw.get());

        serde_json::from_str(raw.get()).map_err(|e| {
            SourceError::protocol(format!("Unexpected {} response: {}", method, e))
        })
    }

    /// Height of the most-work fully-validated chain
    pub async fn get_block_count(&self) -> Result<u64, SourceError> {
        self.call("getblockcount", vec![]).await
    }

    pub async fn get_address_info(&self, address: &str) -> Result<AddressInfo, SourceError> {
        self.call("getaddressinfo", vec![json!(address)]).await
    }

    /// Wallet outputs only, immature coinbase outputs are never listed.
    pub async fn list_unspent(
        &self,
        min_conf: u64,
        max_conf: u64,
        addresses: &[String],
    ) -> Result<Vec<ListUnspentEntry>, SourceError> {
        self.call(
            "listunspent",
            vec![json!(min_conf), json!(max_conf), json!(addresses)],
        )
        .await
    }

    /// Requires the node to run with -addressindex.
    pub async fn get_address_utxos(
        &self,
        addresses: &[String],
    ) -> Result<Vec<AddressUtxoEntry>, SourceError> {
        self.call("getaddressutxos", vec![json!({ "addresses": addresses })])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::testing::MockRpc;

    #[tokio::test]
    async fn test_call_decodes_result() {
        let rpc = MockRpc::new(|method, _| match method {
            "getblockcount" => Ok("812345".to_string()),
            "getaddressinfo" => Ok(r#"{"address": "A", "ismine": false}"#.to_string()),
            _ => Err(SourceError::Unavailable("Method not found".to_string())),
        });
        let node = NodeRpc::new("SYS".parse().unwrap(), rpc.clone());

        assert_eq!(node.get_block_count().await.unwrap(), 812345);

        let info = node.get_address_info("A").await.unwrap();
        assert!(!info.ismine);
        assert!(!info.iswatchonly);

        let ret = node.get_address_utxos(&["A".to_string()]).await;
        assert!(matches!(ret, Err(SourceError::Unavailable(_))));

        let calls = rpc.calls();
        assert_eq!(calls[1].params, vec![json!("A")]);
        assert_eq!(calls[2].params, vec![json!({"addresses": ["A"]})]);
    }

    #[tokio::test]
    async fn test_unexpected_shape() {
        let rpc = MockRpc::new(|_, _| Ok(r#"{"blocks": 1}"#.to_string()));
        let node = NodeRpc::new("SYS".parse().unwrap(), rpc);

        let ret = node.get_block_count().await;
        assert!(matches!(ret, Err(SourceError::Protocol(_))));
    }

    #[test]
    fn test_check_ticker() {
        let rpc = MockRpc::new(|_, _| Ok("0".to_string()));
        let node = NodeRpc::new("DASH".parse().unwrap(), rpc);

        assert!(node.check_ticker(&"dash".parse().unwrap()).is_ok());
        assert!(matches!(
            node.check_ticker(&"SYS".parse().unwrap()),
            Err(SourceError::UnsupportedAsset(_))
        ));
    }
}
