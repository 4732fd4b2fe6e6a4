//! Core library modules for keka-clicker.
//!
//! - **Infrastructure**: configuration, data directory, store, messages, logging, errors
//! - **Scheduling**: the alarm, its daemon process and notifications
//! - **Presentation**: status views and time formatting
//!
//! ```rust,no_run
//! use keka_clicker::libs::preferences::AutoClockPreference;
//! use keka_clicker::libs::storage::Store;
//!
//! let preference = AutoClockPreference::load(&Store::new()?)?;
//! println!("clock in at {}", preference.clock_in_time);
//! # Ok::<(), keka_clicker::libs::error::KekaError>(())
//! ```

pub mod alarm;
pub mod config;
pub mod daemon;
pub mod data_storage;
pub mod error;
pub mod formatter;
pub mod logging;
pub mod messages;
pub mod notifier;
pub mod preferences;
pub mod session;
pub mod storage;
pub mod view;
