//! Interactive setup.
//!
//! Asks for the Keka subdomain, auto clock-in/out preferences and the browser
//! endpoint, then makes sure the background alarm exists.

use crate::{
    libs::{config::Config, daemon, messages::Message, storage::Store},
    msg_success,
};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Remove configuration and stored values instead of configuring
    #[arg(short, long)]
    delete: bool,
}

pub fn cmd(init_args: InitArgs) -> Result<()> {
    if init_args.delete {
        daemon::stop()?;
        Config::delete()?;
        msg_success!(Message::ConfigDeleted);
        return Ok(());
    }

    let store = Store::new()?;
    Config::init(&store)?.save()?;
    msg_success!(Message::ConfigSaved);

    daemon::spawn()
}
