//! Remote integrations: the Keka web API and the browser it borrows a token from.
//!
//! ## Modules
//!
//! - **keka**: HTTP client for attendance, clock-in/out, profile and token probing
//! - **token**: Scrapes a fresh bearer token from a background browser tab
//! - **browser**: Tab operations over the Chrome DevTools protocol
//!
//! ## Usage
//!
//! ```rust,no_run
//! use keka_clicker::api::{AttendanceClient, DevToolsBrowser, KekaApi};
//! use keka_clicker::libs::{session::TabSession, storage::Store};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let keka = KekaApi::create(Store::new()?, DevToolsBrowser::new("http://127.0.0.1:9222"), TabSession::new()).await?;
//! if keka.is_clocked_in().await? {
//!     println!("clocked in for {}s", keka.get_time_clocked().await?);
//! }
//! # Ok(())
//! # }
//! ```

use crate::libs::error::KekaResult;

pub mod browser;
pub mod keka;
pub mod token;

pub use browser::{Browser, DevToolsBrowser, TabId};
pub use keka::KekaApi;

/// The attendance operations the alarm handler depends on.
///
/// [`KekaApi`] is the production implementation; tests substitute their own.
#[allow(async_fn_in_trait)]
pub trait AttendanceClient {
    /// Whether the latest punch today is a clock-in.
    async fn is_clocked_in(&self) -> KekaResult<bool>;

    /// Seconds clocked today.
    async fn get_time_clocked(&self) -> KekaResult<u64>;

    /// Toggles the clock and returns the resulting clocked-in state.
    async fn clock_in_out(&self) -> KekaResult<bool>;
}
