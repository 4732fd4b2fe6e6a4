//! Tracing subscriber setup.
//!
//! Interactive commands log to stderr when debug mode is on. The alarm
//! daemon has no terminal, so it always logs to [`LOG_FILE_NAME`] in the data
//! directory.

use super::data_storage::DataStorage;
use super::messages::macros::is_debug_mode;
use anyhow::Result;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE_NAME: &str = "keka-clicker.log";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(format!("{}=debug", env!("CARGO_PKG_NAME").replace('-', "_"))))
}

/// Installs a stderr subscriber when debug mode is enabled.
pub fn init_cli() {
    if !is_debug_mode() {
        return;
    }
    let _ = tracing_subscriber::fmt().with_env_filter(env_filter()).with_writer(std::io::stderr).try_init();
}

/// Installs a subscriber that appends to the daemon log file.
pub fn init_daemon() -> Result<()> {
    let path = DataStorage::new().get_path(LOG_FILE_NAME)?;
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}
