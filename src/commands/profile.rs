use super::keka_client;
use crate::msg_print;
use anyhow::Result;

pub async fn cmd() -> Result<()> {
    let mut keka = keka_client().await?;
    keka.ensure_token().await?;

    let profile = keka.get_public_profile().await?;
    msg_print!(serde_json::to_string_pretty(&profile)?);
    Ok(())
}
