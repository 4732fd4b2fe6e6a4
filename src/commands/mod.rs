pub mod alarm;
pub mod init;
pub mod profile;
pub mod record;
pub mod status;
pub mod store;
pub mod toggle;
pub mod token;

use crate::api::{Browser, DevToolsBrowser, KekaApi};
use crate::libs::config::Config;
use crate::libs::logging;
use crate::libs::messages::Message;
use crate::libs::session::TabSession;
use crate::libs::storage::Store;
use crate::msg_error_anyhow;
use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Configure subdomain, auto clock-in/out and browser")]
    Init(init::InitArgs),
    #[command(about = "Show clock status and time clocked today")]
    Status,
    #[command(about = "Clock in or out")]
    Toggle,
    #[command(about = "Display punches for a given date")]
    Record(record::RecordArgs),
    #[command(about = "Display the public profile")]
    Profile,
    #[command(about = "Check or refresh the API token")]
    Token(token::TokenArgs),
    #[command(about = "Read or write stored values", arg_required_else_help = true)]
    Store(store::StoreArgs),
    #[command(about = "Manage the background alarm")]
    Alarm(alarm::AlarmArgs),
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help(true))]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub async fn menu() -> Result<()> {
        let cli = Self::parse();
        match &cli.command {
            Commands::Alarm(args) if args.is_daemon_run() => logging::init_daemon()?,
            _ => logging::init_cli(),
        }

        match cli.command {
            Commands::Init(args) => init::cmd(args),
            Commands::Status => status::cmd().await,
            Commands::Toggle => toggle::cmd().await,
            Commands::Record(args) => record::cmd(args).await,
            Commands::Profile => profile::cmd().await,
            Commands::Token(args) => token::cmd(args).await,
            Commands::Store(args) => store::cmd(args),
            Commands::Alarm(args) => alarm::cmd(args).await,
        }
    }
}

/// Client for interactive commands, wired to the configured browser.
pub(crate) async fn keka_client() -> Result<KekaApi<DevToolsBrowser>> {
    let config = Config::read()?;
    let keka = KekaApi::create(Store::new()?, DevToolsBrowser::new(&config.devtools_url()), TabSession::new()).await?;
    Ok(keka)
}

/// Closes the tab the command left open and reports the interruption.
pub(crate) async fn interrupted<B: Browser>(keka: &KekaApi<B>) -> anyhow::Error {
    keka.session().disconnect(keka.browser()).await;
    msg_error_anyhow!(Message::Interrupted)
}
