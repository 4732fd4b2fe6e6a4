//! Token acquisition from an authenticated browser session.
//!
//! Keka keeps its bearer token in the dashboard's `localStorage`. To obtain
//! it we open the dashboard in a background tab, wait for it to load, poll
//! `access_token` every [`POLL_CHECK_INTERVAL`] until it appears or
//! [`POLL_CHECK_TIMEOUT`] runs out, and close the tab on every exit path.
//!
//! The load wait has its own [`LOAD_TIMEOUT`] so a page that never finishes
//! loading fails with [`KekaError::Timeout`] instead of hanging the caller.

use super::browser::{Browser, TabId};
use super::keka::dashboard_url;
use crate::libs::error::{KekaError, KekaResult};
use crate::libs::messages::Message;
use crate::libs::session::TabSession;
use crate::libs::storage::{Store, StoreKey};
use crate::{msg_debug, msg_warning};
use tokio::time::{self, Duration, Instant};

/// Time between `localStorage` reads.
pub const POLL_CHECK_INTERVAL: Duration = Duration::from_millis(100);

/// Polling budget, measured from the first read.
pub const POLL_CHECK_TIMEOUT: Duration = Duration::from_millis(6000);

/// Budget for the page load that precedes polling.
pub const LOAD_TIMEOUT: Duration = Duration::from_millis(6000);

/// `localStorage` key under which the dashboard keeps its bearer token.
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Retrieves a fresh bearer token from a background tab.
///
/// # Errors
///
/// - [`KekaError::Configuration`] when no subdomain is stored
/// - [`KekaError::Tab`] when the tab cannot be opened or driven
/// - [`KekaError::Timeout`] when the page does not load or no token shows up in time
pub async fn get_token<B: Browser>(store: &Store, browser: &B, session: &TabSession) -> KekaResult<String> {
    let tab = open_keka(store, browser, session).await?;

    let result = async {
        wait_for_tab_load(browser, &tab).await?;
        poll_for_token(browser, &tab).await
    }
    .await;

    if let Err(e) = browser.close_tab(&tab).await {
        msg_warning!(Message::TabCloseFailed(tab.to_string(), e.to_string()));
    }
    session.clear_if(&tab);

    result
}

/// Opens the Keka dashboard in a new, non-focused tab and registers it as the
/// managed tab.
pub async fn open_keka<B: Browser>(store: &Store, browser: &B, session: &TabSession) -> KekaResult<TabId> {
    let subdomain = store.get_string(StoreKey::Subdomain)?;
    if subdomain.trim().is_empty() {
        return Err(KekaError::Configuration(Message::SubdomainNotSet.to_string()));
    }

    let url = dashboard_url(subdomain.trim());
    msg_debug!(Message::TabOpening(url.clone()));
    let tab = browser
        .open_tab(&url)
        .await
        .map_err(|e| KekaError::Tab(Message::TabOpenFailedWithReason(e.to_string()).to_string()))?;

    session.set_active(tab.clone());
    Ok(tab)
}

async fn wait_for_tab_load<B: Browser>(browser: &B, tab: &TabId) -> KekaResult<()> {
    match time::timeout(LOAD_TIMEOUT, browser.wait_for_load(tab)).await {
        Ok(result) => result,
        Err(_) => Err(KekaError::Timeout(Message::TabLoadTimeout(LOAD_TIMEOUT.as_millis() as u64).to_string())),
    }
}

/// Reads the tab's `access_token` until it is non-empty or the budget is spent.
///
/// A read that would start at or after [`POLL_CHECK_TIMEOUT`] is not made.
pub async fn poll_for_token<B: Browser>(browser: &B, tab: &TabId) -> KekaResult<String> {
    let start = Instant::now();
    while start.elapsed() < POLL_CHECK_TIMEOUT {
        if let Some(token) = browser.read_local_storage(tab, ACCESS_TOKEN_KEY).await? {
            if !token.is_empty() {
                return Ok(token);
            }
        }
        time::sleep(POLL_CHECK_INTERVAL).await;
    }
    Err(KekaError::Timeout(Message::TokenNotFound(POLL_CHECK_TIMEOUT.as_millis() as u64).to_string()))
}
