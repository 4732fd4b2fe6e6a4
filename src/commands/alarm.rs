use crate::libs::daemon;
use crate::libs::messages::Message;
use crate::{msg_bail_anyhow, msg_info};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct AlarmArgs {
    /// Stop the background alarm
    #[arg(short, long, conflicts_with = "foreground")]
    stop: bool,

    /// Run the alarm in this terminal instead of in the background
    #[arg(short, long)]
    foreground: bool,

    /// Used by the detached process
    #[arg(long, hide = true)]
    daemon_run: bool,
}

impl AlarmArgs {
    pub fn is_daemon_run(&self) -> bool {
        self.daemon_run
    }
}

pub async fn cmd(args: AlarmArgs) -> Result<()> {
    if args.daemon_run {
        return daemon::run_with_signal_handling().await;
    }
    if args.stop {
        return daemon::stop();
    }
    if args.foreground {
        if let Some(pid) = daemon::running_pid()? {
            msg_bail_anyhow!(Message::AlarmAlreadyRunning(pid));
        }
        msg_info!(Message::AlarmRunningInForeground);
        return daemon::run_with_signal_handling().await;
    }
    daemon::spawn()
}
