//! Auto clock-in/out preferences and time-of-day validation.

use super::error::{KekaError, KekaResult};
use super::storage::{Store, StoreKey};
use chrono::NaiveTime;

pub const DEFAULT_CLOCK_IN_TIME: &str = "09:00";
pub const DEFAULT_CLOCK_OUT_TIME: &str = "17:00";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AutoClockPreference {
    pub clock_in_enabled: bool,
    /// Zero-padded 24-hour `HH:MM`, empty when never configured.
    pub clock_in_time: String,
    pub clock_out_enabled: bool,
    pub clock_out_time: String,
}

impl AutoClockPreference {
    /// Reads the preference from the store exactly as saved.
    pub fn load(store: &Store) -> KekaResult<Self> {
        Ok(Self {
            clock_in_enabled: store.get_bool(StoreKey::AutoClockInEnabled)?,
            clock_in_time: store.get_string(StoreKey::AutoClockInTime)?,
            clock_out_enabled: store.get_bool(StoreKey::AutoClockOutEnabled)?,
            clock_out_time: store.get_string(StoreKey::AutoClockOutTime)?,
        })
    }

    /// Like [`load`](Self::load), but writes the default times back when none
    /// are stored yet.
    pub fn load_with_defaults(store: &Store) -> KekaResult<Self> {
        let mut preference = Self::load(store)?;
        if preference.clock_in_time.is_empty() {
            preference.clock_in_time = DEFAULT_CLOCK_IN_TIME.to_string();
            store.set_string(StoreKey::AutoClockInTime, DEFAULT_CLOCK_IN_TIME)?;
        }
        if preference.clock_out_time.is_empty() {
            preference.clock_out_time = DEFAULT_CLOCK_OUT_TIME.to_string();
            store.set_string(StoreKey::AutoClockOutTime, DEFAULT_CLOCK_OUT_TIME)?;
        }
        Ok(preference)
    }

    pub fn save(&self, store: &Store) -> KekaResult<()> {
        store.set_bool(StoreKey::AutoClockInEnabled, self.clock_in_enabled)?;
        store.set_bool(StoreKey::AutoClockOutEnabled, self.clock_out_enabled)?;
        store.set_string(StoreKey::AutoClockInTime, &normalize_time(&self.clock_in_time)?)?;
        store.set_string(StoreKey::AutoClockOutTime, &normalize_time(&self.clock_out_time)?)?;
        Ok(())
    }
}

/// Normalizes a time of day to zero-padded `HH:MM`; empty input stays empty.
///
/// Accepts `H:MM` as well, so `9:05` becomes `09:05`.
pub fn normalize_time(input: &str) -> KekaResult<String> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(String::new());
    }
    NaiveTime::parse_from_str(input, "%H:%M")
        .map(|time| time.format("%H:%M").to_string())
        .map_err(|_| KekaError::Storage(format!("'{}' is not a valid HH:MM time", input)))
}

/// Renders `HH:MM` in 12-hour form, e.g. `9:00 AM`.
pub fn format_12h(time: &str) -> String {
    match NaiveTime::parse_from_str(time, "%H:%M") {
        Ok(time) => time.format("%-I:%M %p").to_string(),
        Err(_) => String::new(),
    }
}

/// Subdomains are the tenant prefix of `{subdomain}.keka.com`.
pub fn is_valid_subdomain(subdomain: &str) -> bool {
    let subdomain = subdomain.trim();
    !subdomain.is_empty() && subdomain.chars().all(|c| c.is_ascii_alphanumeric())
}
