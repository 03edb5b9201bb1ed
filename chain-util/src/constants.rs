// Service names
pub const UTXO_RECONCILE_SERVICE_NAME: &str = "utxo-reconcile";

// Directory constants
pub const UTXO_RECONCILE_ROOT_DIR: &str = ".utxo-reconcile";
pub const LOG_DIR_NAME: &str = "logs";
pub const CONFIG_FILE_NAME: &str = "config.toml";

// Node rpc listunspent confirmation window
pub const LIST_UNSPENT_MIN_CONF: u64 = 1;
pub const LIST_UNSPENT_MAX_CONF: u64 = 99_999_999;

// Subunits per whole coin for satoshi denominated chains
pub const SUBUNITS_PER_COIN: u64 = 100_000_000;
