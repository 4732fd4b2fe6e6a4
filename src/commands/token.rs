use super::{interrupted, keka_client};
use crate::libs::messages::Message;
use crate::{msg_bail_anyhow, msg_info, msg_success, msg_warning};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct TokenArgs {
    /// Fetch a new token from the browser even if the stored one is valid
    #[arg(short, long)]
    refresh: bool,
}

pub async fn cmd(args: TokenArgs) -> Result<()> {
    let mut keka = keka_client().await?;

    if !args.refresh {
        match keka.is_token_valid().await? {
            true => msg_info!(Message::TokenValid),
            false => msg_warning!(Message::TokenInvalid),
        }
        return Ok(());
    }

    let refreshed = tokio::select! {
        result = keka.refresh_token() => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };
    match refreshed {
        None => Err(interrupted(&keka).await),
        Some(Ok(_)) => {
            msg_success!(Message::TokenRefreshed);
            Ok(())
        }
        Some(Err(e)) => msg_bail_anyhow!(format!("{} {}", Message::TokenRefreshFailed, e)),
    }
}
