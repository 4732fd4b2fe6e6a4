//! Process-wide record of the browser tab currently managed by the token flow.
//!
//! The tab is registered when it is opened and cleared when the token flow
//! closes it. If the interactive session ends early (the user hits Ctrl-C
//! while a refresh is in flight), [`TabSession::disconnect`] closes whatever
//! tab is still registered.

use crate::api::browser::{Browser, TabId};
use crate::libs::messages::Message;
use crate::{msg_debug, msg_warning};
use parking_lot::Mutex;
use std::sync::Arc;

/// Cloning shares the underlying slot.
#[derive(Debug, Clone, Default)]
pub struct TabSession {
    active: Arc<Mutex<Option<TabId>>>,
}

impl TabSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_active(&self, tab: TabId) {
        msg_debug!(Message::TabRegistered(tab.to_string()));
        *self.active.lock() = Some(tab);
    }

    pub fn active(&self) -> Option<TabId> {
        self.active.lock().clone()
    }

    /// Clears the registration only if it still names `tab`.
    pub fn clear_if(&self, tab: &TabId) {
        let mut active = self.active.lock();
        if active.as_ref() == Some(tab) {
            active.take();
        }
    }

    /// Closes and forgets the registered tab, if any.
    pub async fn disconnect<B: Browser>(&self, browser: &B) {
        let tab = self.active.lock().take();
        if let Some(tab) = tab {
            msg_debug!(Message::TabClosingOnDisconnect(tab.to_string()));
            if let Err(e) = browser.close_tab(&tab).await {
                msg_warning!(Message::TabCloseFailed(tab.to_string(), e.to_string()));
            }
        }
    }
}
