use super::{interrupted, keka_client};
use crate::libs::messages::Message;
use crate::libs::view::{StatusView, TimeView};
use crate::msg_bail_anyhow;
use anyhow::Result;

/// Clocks in when clocked out and vice versa, then shows the new status.
///
/// Ctrl-C while the token is being refreshed closes the background tab.
pub async fn cmd() -> Result<()> {
    let mut keka = keka_client().await?;

    let refreshed = tokio::select! {
        result = keka.ensure_token() => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };
    match refreshed {
        None => return Err(interrupted(&keka).await),
        Some(Err(e)) => msg_bail_anyhow!(Message::ClockToggleFailed(e.to_string())),
        Some(Ok(())) => {}
    }

    let clocked_in = match keka.clock_in_out().await {
        Ok(clocked_in) => clocked_in,
        Err(e) => msg_bail_anyhow!(Message::ClockToggleFailed(e.to_string())),
    };

    StatusView::new().apply_known_status(clocked_in);
    TimeView::new().refresh_from_remote(&keka).await;
    Ok(())
}
