use super::{interrupted, keka_client};
use crate::libs::messages::Message;
use crate::libs::storage::{Store, StoreKey};
use crate::libs::view::{StatusView, TimeView};
use crate::{msg_error, msg_warning};
use anyhow::Result;

/// Shows whether the user is clocked in and for how long.
///
/// A missing subdomain is only a warning. A stale token is refreshed first.
pub async fn cmd() -> Result<()> {
    if Store::new()?.get_string(StoreKey::Subdomain)?.trim().is_empty() {
        msg_warning!(Message::SubdomainNotSet);
        return Ok(());
    }

    let mut keka = keka_client().await?;
    let mut status = StatusView::new();

    let refreshed = tokio::select! {
        result = keka.ensure_token() => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };
    match refreshed {
        None => return Err(interrupted(&keka).await),
        Some(Err(e)) => {
            msg_error!(Message::TokenRefreshFailed);
            status.apply_error();
            return Err(e.into());
        }
        Some(Ok(())) => {}
    }

    if status.refresh_from_remote(&keka).await.is_some() {
        TimeView::new().refresh_from_remote(&keka).await;
    }
    Ok(())
}
