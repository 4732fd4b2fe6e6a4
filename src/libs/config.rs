//! Configuration management for keka-clicker.
//!
//! Two kinds of settings exist:
//!
//! - **Config file** (`config.json`): settings of this tool itself, currently
//!   the DevTools endpoint of the browser the token is scraped from.
//! - **Store** (`store.json`, see [`crate::libs::storage`]): the values the
//!   client and the alarm read on every use, i.e. subdomain, token and
//!   auto-clock preferences.
//!
//! [`Config::init`] is the interactive counterpart of the options page and
//! writes to both.
//!
//! ```rust,no_run
//! use keka_clicker::libs::config::Config;
//!
//! let config = Config::read()?;
//! println!("DevTools endpoint: {}", config.devtools_url());
//! # Ok::<(), anyhow::Error>(())
//! ```

use super::data_storage::DataStorage;
use crate::api::browser::DEFAULT_DEVTOOLS_URL;
use crate::libs::messages::Message;
use crate::libs::preferences::{self, format_12h, is_valid_subdomain, AutoClockPreference};
use crate::libs::storage::{Store, StoreKey, STORE_FILE_NAME};
use crate::{msg_print, msg_warning};
use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, MultiSelect};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};

pub const CONFIG_FILE_NAME: &str = "config.json";

/// A module offered by the interactive setup.
#[derive(Debug, Clone)]
pub struct ConfigModule {
    pub key: String,
    pub name: String,
}

/// Where to reach the browser that holds the Keka session.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct BrowserConfig {
    /// HTTP endpoint of a Chromium started with `--remote-debugging-port`.
    pub devtools_url: String,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            devtools_url: DEFAULT_DEVTOOLS_URL.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser: Option<BrowserConfig>,
}

impl Config {
    /// Loads `config.json`, or the default configuration when it does not exist.
    pub fn read() -> Result<Config> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;
        if !config_file_path.exists() {
            return Ok(Config::default());
        }

        let config_str = fs::read_to_string(config_file_path)?;
        let config: Config = serde_json::from_str(&config_str)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;
        let config_file = File::create(config_file_path)?;
        serde_json::to_writer_pretty(&config_file, &self)?;
        Ok(())
    }

    /// Removes the config file and the store.
    pub fn delete() -> Result<()> {
        let storage = DataStorage::new();
        storage.remove(CONFIG_FILE_NAME)?;
        storage.remove(STORE_FILE_NAME)?;
        Ok(())
    }

    pub fn devtools_url(&self) -> String {
        self.browser.clone().unwrap_or_default().devtools_url
    }

    /// Interactive setup. Store values are written as they are entered; the
    /// returned config still has to be saved.
    pub fn init(store: &Store) -> Result<Self> {
        let mut config = Self::read().unwrap_or_default();

        let modules = vec![
            ConfigModule {
                key: "keka".to_string(),
                name: Message::ConfigModuleKeka.to_string(),
            },
            ConfigModule {
                key: "autoclock".to_string(),
                name: Message::ConfigModuleAutoClock.to_string(),
            },
            ConfigModule {
                key: "browser".to_string(),
                name: Message::ConfigModuleBrowser.to_string(),
            },
        ];

        let selected = MultiSelect::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptSelectModules.to_string())
            .items(&modules.iter().map(|module| &module.name).collect::<Vec<_>>())
            .interact()?;

        for &selection in &selected {
            match modules[selection].key.as_str() {
                "keka" => Self::init_subdomain(store)?,
                "autoclock" => Self::init_auto_clock(store)?,
                "browser" => {
                    let default = config.browser.clone().unwrap_or_default();
                    msg_print!(Message::ConfigModuleBrowser);
                    config.browser = Some(BrowserConfig {
                        devtools_url: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptDevToolsUrl.to_string())
                            .default(default.devtools_url)
                            .interact_text()?,
                    });
                }
                _ => {}
            }
        }

        Ok(config)
    }

    fn init_subdomain(store: &Store) -> Result<()> {
        msg_print!(Message::ConfigModuleKeka);
        let current = store.get_string(StoreKey::Subdomain)?;
        let subdomain: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptSubdomain.to_string())
            .default(current.trim().to_string())
            .validate_with(|input: &String| -> std::result::Result<(), String> {
                match is_valid_subdomain(input) {
                    true => Ok(()),
                    false => Err(Message::SubdomainInvalid.to_string()),
                }
            })
            .interact_text()?;
        store.set_string(StoreKey::Subdomain, subdomain.trim())?;
        Ok(())
    }

    fn init_auto_clock(store: &Store) -> Result<()> {
        msg_print!(Message::ConfigModuleAutoClock);
        let current = AutoClockPreference::load_with_defaults(store)?;
        let time_prompt = |prompt: Message, default: String| -> Result<String> {
            let time: String = Input::with_theme(&ColorfulTheme::default())
                .with_prompt(prompt.to_string())
                .default(default)
                .validate_with(|input: &String| -> std::result::Result<(), String> {
                    preferences::normalize_time(input).map(|_| ()).map_err(|_| Message::TimeInvalid(input.clone()).to_string())
                })
                .interact_text()?;
            Ok(preferences::normalize_time(&time)?)
        };

        let clock_in_time = time_prompt(Message::PromptClockInTime, current.clock_in_time.clone())?;
        let clock_in_enabled = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptClockInEnabled(format_12h(&clock_in_time)).to_string())
            .default(current.clock_in_enabled)
            .interact()?;
        let clock_out_time = time_prompt(Message::PromptClockOutTime, current.clock_out_time.clone())?;
        let clock_out_enabled = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptClockOutEnabled(format_12h(&clock_out_time)).to_string())
            .default(current.clock_out_enabled)
            .interact()?;

        let preference = AutoClockPreference {
            clock_in_enabled,
            clock_in_time,
            clock_out_enabled,
            clock_out_time,
        };
        if preference.clock_in_enabled && preference.clock_in_time == preference.clock_out_time {
            msg_warning!(Message::AutoClockSameTimes);
        }
        preference.save(store)?;
        Ok(())
    }
}
