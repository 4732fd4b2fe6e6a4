//! Raw access to the key-value store.
//!
//! Values are validated against the key they are written to: flags take
//! `true`/`false`, times are normalized to `HH:MM` and the subdomain must be
//! alphanumeric.

use crate::libs::messages::Message;
use crate::libs::preferences::{is_valid_subdomain, normalize_time};
use crate::libs::storage::{Store, StoreKey};
use crate::{msg_bail_anyhow, msg_print, msg_success};
use anyhow::Result;
use clap::{Args, Subcommand};
use serde_json::Value;

#[derive(Debug, Args)]
pub struct StoreArgs {
    #[command(subcommand)]
    command: StoreCommand,
}

#[derive(Debug, Subcommand)]
enum StoreCommand {
    #[command(about = "Print a stored value")]
    Get { key: String },
    #[command(about = "Store a value")]
    Set { key: String, value: String },
}

pub fn cmd(args: StoreArgs) -> Result<()> {
    let store = Store::new()?;
    match args.command {
        StoreCommand::Get { key } => {
            let value = match store.get(&key)? {
                Value::String(s) => s,
                other => other.to_string(),
            };
            msg_print!(Message::StoreValue(key, value));
        }
        StoreCommand::Set { key, value } => {
            let store_key: StoreKey = key.parse()?;
            store.set(&key, parse_value(store_key, &value)?)?;
            msg_success!(Message::StoreValueSaved(key));
        }
    }
    Ok(())
}

fn parse_value(key: StoreKey, raw: &str) -> Result<Value> {
    let value = match key {
        _ if key.is_flag() => match raw.parse::<bool>() {
            Ok(flag) => Value::Bool(flag),
            Err(_) => msg_bail_anyhow!(Message::InvalidStoreValue(key.as_str().to_string(), "true or false".to_string())),
        },
        StoreKey::AutoClockInTime | StoreKey::AutoClockOutTime => Value::String(normalize_time(raw)?),
        StoreKey::Subdomain => {
            if !is_valid_subdomain(raw) {
                msg_bail_anyhow!(Message::InvalidStoreValue(key.as_str().to_string(), "an alphanumeric subdomain".to_string()));
            }
            Value::String(raw.trim().to_string())
        }
        _ => Value::String(raw.to_string()),
    };
    Ok(value)
}
