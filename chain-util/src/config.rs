use bitcoincore_rpc::Auth;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RpcAuth {
    None,
    UserPass(String, String),
    CookieFile(PathBuf),
}

fn default_rpc_url() -> String {
    "http://127.0.0.1:8332".to_string()
}

/// Connection settings for a local node's JSON-RPC interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRpcConfig {
    // Ticker of the chain this node serves, a node only ever answers for one chain
    pub ticker: String,

    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,

    #[serde(default)]
    pub auth: Option<RpcAuth>,
}

impl NodeRpcConfig {
    pub fn new(ticker: &str, rpc_url: &str, auth: RpcAuth) -> Self {
        Self {
            ticker: ticker.to_string(),
            rpc_url: rpc_url.to_string(),
            auth: Some(auth),
        }
    }

    pub fn rpc_url(&self) -> &str {
        self.rpc_url.as_str()
    }

    pub fn auth(&self) -> Auth {
        match &self.auth {
            Some(RpcAuth::UserPass(user, pass)) => Auth::UserPass(user.clone(), pass.clone()),
            Some(RpcAuth::CookieFile(path)) => Auth::CookieFile(path.clone()),
            Some(RpcAuth::None) | None => Auth::None,
        }
    }

    /// Checks the url and credentials up front, so a bad entry fails when the
    /// source is built instead of on its first call.
    pub fn validate(&self) -> Result<(), String> {
        if self.ticker.trim().is_empty() {
            let msg = format!("Missing ticker for rpc node {}", self.rpc_url);
            error!("{}", msg);
            return Err(msg);
        }

        let url = Url::parse(&self.rpc_url).map_err(|e| {
            let msg = format!("Invalid rpc url {}: {}", self.rpc_url, e);
            error!("{}", msg);
            msg
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            let msg = format!("Rpc url must use http or https: {}", self.rpc_url);
            error!("{}", msg);
            return Err(msg);
        }

        if url.host_str().is_none_or(str::is_empty) {
            let msg = format!("Rpc url has no host: {}", self.rpc_url);
            error!("{}", msg);
            return Err(msg);
        }

        // Embedded credentials would end up in logs and error messages
        if !url.username().is_empty() || url.password().is_some() {
            let msg = format!(
                "Rpc url for {} must not embed credentials, use the auth field instead",
                self.ticker
            );
            error!("{}", msg);
            return Err(msg);
        }

        match &self.auth {
            Some(RpcAuth::UserPass(user, _)) => {
                if user.is_empty() || user.contains(':') {
                    let msg = format!("Invalid rpc user for {}: {:?}", self.rpc_url, user);
                    error!("{}", msg);
                    return Err(msg);
                }
            }
            Some(RpcAuth::CookieFile(path)) => {
                if !path.exists() {
                    let msg = format!("Rpc cookie file does not exist: {}", path.display());
                    error!("{}", msg);
                    return Err(msg);
                }
            }
            Some(RpcAuth::None) | None => {}
        }

        Ok(())
    }
}
