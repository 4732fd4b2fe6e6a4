//! # keka-clicker
//!
//! Clock in and out of Keka from the command line.
//!
//! ## Features
//!
//! - **Clock toggle**: punch in or out and see the resulting status
//! - **Token borrowing**: reads the bearer token from a logged-in browser session
//! - **Attendance**: time clocked today and punch history per date
//! - **Alarm**: background reminder after 8 hours and weekday auto clock-in/out
//!
//! ## Usage
//!
//! ```rust,no_run
//! use keka_clicker::commands::Cli;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Cli::menu().await
//! }
//! ```

pub mod api;
pub mod commands;
pub mod libs;
