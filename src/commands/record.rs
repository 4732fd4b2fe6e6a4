use super::keka_client;
use crate::libs::view::View;
use anyhow::Result;
use chrono::Local;
use clap::Args;

#[derive(Debug, Args)]
pub struct RecordArgs {
    /// Date in YYYY-MM-DD format, defaults to today
    #[arg(short, long, default_value_t = Local::now().format("%Y-%m-%d").to_string())]
    date: String,
}

pub async fn cmd(args: RecordArgs) -> Result<()> {
    let mut keka = keka_client().await?;
    keka.ensure_token().await?;

    let record = keka.get_attendance_record_for(&args.date).await?;
    View::punches(&record);
    Ok(())
}
