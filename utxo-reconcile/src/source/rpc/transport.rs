use super::RpcTransport;
use crate::error::SourceError;
use bitcoincore_rpc::{Auth, Client, RpcApi};
use chain_util::NodeRpcConfig;
use serde_json::Value;
use serde_json::value::RawValue;
use std::sync::{Arc, RwLock};

/// JSON-RPC transport to a bitcoin derived node, built on bitcoincore-rpc.
pub struct NodeRpcClient {
    rpc_url: String,
    auth: Auth,
    client: RwLock<Arc<Client>>,
}

impl NodeRpcClient {
    pub fn new(config: &NodeRpcConfig) -> Result<Self, SourceError> {
        config.validate().map_err(SourceError::Config)?;

        let rpc_url = config.rpc_url().to_string();
        let auth = config.auth();
        // Reads the cookie file right away, so a missing or unreadable one fails here
        let client = Self::create_client(&rpc_url, &auth)?;

        Ok(Self {
            rpc_url,
            auth,
            client: RwLock::new(Arc::new(client)),
        })
    }

    fn create_client(rpc_url: &str, auth: &Auth) -> Result<Client, SourceError> {
        Client::new(rpc_url, auth.clone()).map_err(|e| {
            SourceError::config(format!("Failed to create rpc client for {}: {}", rpc_url, e))
        })
    }

    fn client(&self) -> Arc<Client> {
        let guard = self.client.read().unwrap_or_else(|e| e.into_inner());
        guard.clone()
    }

    fn update_client(&self) -> Result<(), SourceError> {
        let client = Self::create_client(&self.rpc_url, &self.auth)?;

        let mut guard = self.client.write().unwrap_or_else(|e| e.into_inner());
        *guard = Arc::new(client);

        info!("Rpc client for {} updated", self.rpc_url);
        Ok(())
    }

    fn is_auth_cookie(&self) -> bool {
        matches!(self.auth, Auth::CookieFile(_))
    }

    fn on_error(&self, error: &bitcoincore_rpc::Error) {
        if let bitcoincore_rpc::Error::JsonRpc(bitcoincore_rpc::jsonrpc::Error::Transport(_)) = error {
            // The node may have restarted and written a new cookie, pick it up for the next call
            if self.is_auth_cookie() {
                let _ = self.update_client();
            }
        }
    }

    fn map_error(&self, method: &str, error: bitcoincore_rpc::Error) -> SourceError {
        use bitcoincore_rpc::jsonrpc::Error as JsonRpcError;

        match error {
            bitcoincore_rpc::Error::Json(e)
            | bitcoincore_rpc::Error::JsonRpc(JsonRpcError::Json(e)) => {
                SourceError::protocol(format!("{} returned malformed json from {}: {}", method, self.rpc_url, e))
            }
            bitcoincore_rpc::Error::JsonRpc(JsonRpcError::Rpc(e)) => SourceError::unavailable(
                format!("{} rejected by {}: {} ({})", method, self.rpc_url, e.message, e.code),
            ),
            e => SourceError::unavailable(format!("{} failed on {}: {}", method, self.rpc_url, e)),
        }
    }
}

impl RpcTransport for NodeRpcClient {
    fn call(&self, method: &str, params: &[Value]) -> Result<Box<RawValue>, SourceError> {
        self.client()
            .call::<Box<RawValue>>(method, params)
            .map_err(|error| {
                self.on_error(&error);
                self.map_error(method, error)
            })
    }
}
