use crate::decimal::DecimalContext;
use crate::source::{CLOUDCHAINS_BASE_URL, EXPLORER_BASE_URL};
use chain_util::NodeRpcConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_cloudchains_url() -> String {
    CLOUDCHAINS_BASE_URL.to_string()
}

fn default_explorer_url() -> String {
    EXPLORER_BASE_URL.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SourceConfig {
    CloudChains {
        #[serde(default)]
        name: Option<String>,

        #[serde(default = "default_cloudchains_url")]
        base_url: String,
    },

    Explorer {
        #[serde(default)]
        name: Option<String>,

        #[serde(default = "default_explorer_url")]
        base_url: String,

        api_key: String,
    },

    WalletRpc {
        #[serde(default)]
        name: Option<String>,

        #[serde(flatten)]
        node: NodeRpcConfig,
    },

    AddressIndexRpc {
        #[serde(default)]
        name: Option<String>,

        #[serde(flatten)]
        node: NodeRpcConfig,
    },
}

impl SourceConfig {
    /// Name to match against `--source`, the configured one or the kind.
    pub fn label(&self) -> String {
        match self {
            SourceConfig::CloudChains { name, .. } => {
                name.clone().unwrap_or_else(|| "cloudchains".to_string())
            }
            SourceConfig::Explorer { name, .. } => {
                name.clone().unwrap_or_else(|| "explorer".to_string())
            }
            SourceConfig::WalletRpc { name, node } => name
                .clone()
                .unwrap_or_else(|| format!("wallet-rpc-{}", node.ticker.to_ascii_lowercase())),
            SourceConfig::AddressIndexRpc { name, node } => name.clone().unwrap_or_else(|| {
                format!("address-index-rpc-{}", node.ticker.to_ascii_lowercase())
            }),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconcileConfig {
    #[serde(default)]
    pub ticker: Option<String>,

    #[serde(default)]
    pub addresses: Vec<String>,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub decimal: DecimalContext,

    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            ticker: None,
            addresses: Vec::new(),
            http: HttpConfig::default(),
            decimal: DecimalContext::default(),
            sources: Vec::new(),
        }
    }
}

impl ReconcileConfig {
    pub fn parse(data: &str) -> Result<Self, String> {
        toml::from_str(data).map_err(|e| {
            let msg = format!("Failed to parse config: {}", e);
            error!("{}", msg);
            msg
        })
    }

    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            let default_config = ReconcileConfig::default();
            info!(
                "Config file {} does not exist. Using default configuration.",
                path.display()
            );
            if let Ok(data) = toml::to_string_pretty(&default_config) {
                info!("Default config: {}", data);
            }
            return Ok(default_config);
        }

        info!("Loading config from {}", path.display());
        let config_data = std::fs::read_to_string(path).map_err(|e| {
            let msg = format!("Failed to read config file {}: {}", path.display(), e);
            error!("{}", msg);
            msg
        })?;

        Self::parse(&config_data).map_err(|e| format!("{}: {}", path.display(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Rounding;
    use chain_util::RpcAuth;
    use std::path::PathBuf;

    const SAMPLE: &str = r#"
        ticker = "SYS"
        addresses = ["Sg8iK3iRB5m8x4uzY7JinoKKvcRwTXidop", "SNydEuejwkVy8WRCaQgqrvXZw4bA1hVYHg"]

        [http]
        timeout_secs = 10

        [decimal]
        precision = 28
        rounding = "half-even"

        [[sources]]
        kind = "cloud-chains"

        [[sources]]
        kind = "explorer"
        name = "chainz"
        api_key = "XXX"

        [[sources]]
        kind = "wallet-rpc"
        ticker = "SYS"
        rpc_url = "http://127.0.0.1:8370"
        auth = { UserPass = ["BlockDXSyscoin", "XXX"] }

        [[sources]]
        kind = "address-index-rpc"
        name = "dashd"
        ticker = "DASH"
        rpc_url = "http://127.0.0.1:9998"
        auth = { CookieFile = "/home/dash/.dashcore/.cookie" }
    "#;

    #[test]
    fn test_parse_sample() {
        let config = ReconcileConfig::parse(SAMPLE).unwrap();
        assert_eq!(config.ticker.as_deref(), Some("SYS"));
        assert_eq!(config.addresses.len(), 2);
        assert_eq!(config.http.timeout_secs, 10);
        assert_eq!(config.decimal.rounding, Rounding::HalfEven);
        assert_eq!(config.sources.len(), 4);

        assert_eq!(
            config.sources[0],
            SourceConfig::CloudChains {
                name: None,
                base_url: CLOUDCHAINS_BASE_URL.to_string(),
            }
        );
        assert_eq!(
            config.sources[1],
            SourceConfig::Explorer {
                name: Some("chainz".to_string()),
                base_url: EXPLORER_BASE_URL.to_string(),
                api_key: "XXX".to_string(),
            }
        );
        assert_eq!(
            config.sources[2],
            SourceConfig::WalletRpc {
                name: None,
                node: NodeRpcConfig::new(
                    "SYS",
                    "http://127.0.0.1:8370",
                    RpcAuth::UserPass("BlockDXSyscoin".to_string(), "XXX".to_string()),
                ),
            }
        );
        match &config.sources[3] {
            SourceConfig::AddressIndexRpc { name, node } => {
                assert_eq!(name.as_deref(), Some("dashd"));
                assert_eq!(
                    node.auth,
                    Some(RpcAuth::CookieFile(PathBuf::from(
                        "/home/dash/.dashcore/.cookie"
                    )))
                );
            }
            other => panic!("unexpected source {:?}", other),
        }

        let labels: Vec<String> = config.sources.iter().map(|s| s.label()).collect();
        assert_eq!(labels, vec!["cloudchains", "chainz", "wallet-rpc-sys", "dashd"]);
    }

    #[test]
    fn test_defaults() {
        let config = ReconcileConfig::parse("").unwrap();
        assert_eq!(config, ReconcileConfig::default());
        assert_eq!(config.decimal, DecimalContext::default());
        assert_eq!(config.http.timeout_secs, 30);

        let missing = ReconcileConfig::load(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(missing, ReconcileConfig::default());
    }

    #[test]
    fn test_reject_unknown_kind() {
        let data = r#"
            [[sources]]
            kind = "electrum"
        "#;
        assert!(ReconcileConfig::parse(data).is_err());

        // Explorer without api key
        let data = r#"
            [[sources]]
            kind = "explorer"
        "#;
        assert!(ReconcileConfig::parse(data).is_err());
    }
}
