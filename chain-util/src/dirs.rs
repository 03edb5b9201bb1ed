use super::constants::{CONFIG_FILE_NAME, LOG_DIR_NAME, UTXO_RECONCILE_ROOT_DIR};
use std::path::PathBuf;

// Falls back to the working directory when no home directory is known
fn root_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(UTXO_RECONCILE_ROOT_DIR)
}

/// `~/.utxo-reconcile/<service>`
pub fn get_service_dir(service_name: &str) -> PathBuf {
    root_dir().join(service_name)
}

pub fn get_log_dir(service_name: &str) -> PathBuf {
    get_service_dir(service_name).join(LOG_DIR_NAME)
}

/// Config file read when no `--config` is given.
pub fn get_default_config_path(service_name: &str) -> PathBuf {
    get_service_dir(service_name).join(CONFIG_FILE_NAME)
}
