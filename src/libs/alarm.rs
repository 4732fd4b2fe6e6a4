//! The recurring alarm: clock-out reminder and auto clock-in/out.
//!
//! One timer named [`ALARM_NAME`] fires every [`ALARM_PERIOD`]. Each tick
//! handles two independent concerns:
//!
//! - **Reminder**: clocked in for at least [`REMINDER_THRESHOLD_SECS`] emits
//!   the clock-out reminder. Nothing remembers that it was already shown.
//! - **Auto clock**: on weekdays, when the current `HH:MM` equals a configured
//!   and enabled time, clock in (if clocked out) or clock out (if clocked in).
//!   The comparison is an exact match, so a tick that never happens (machine
//!   asleep at 09:00) means no auto clock-in that day.
//!
//! Failures are logged and swallowed per tick; the timer keeps running.

use crate::api::browser::Browser;
use crate::api::keka::KekaApi;
use crate::api::AttendanceClient;
use crate::libs::error::KekaResult;
use crate::libs::messages::Message;
use crate::libs::notifier::{Notification, Notifier};
use crate::libs::preferences::AutoClockPreference;
use crate::libs::session::TabSession;
use crate::libs::storage::Store;
use crate::{msg_debug, msg_error, msg_info};
use chrono::{Datelike, Local, NaiveDateTime, Weekday};
use tokio::time::{self, Duration, MissedTickBehavior};

pub const ALARM_NAME: &str = "clockOutReminder";

pub const ALARM_PERIOD: Duration = Duration::from_secs(60);

/// Eight hours.
pub const REMINDER_THRESHOLD_SECS: u64 = 8 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoClockAction {
    ClockIn,
    ClockOut,
}

/// Emits the reminder when clocked in for the threshold or longer.
///
/// Returns whether a notification was sent.
pub async fn check_reminder<C: AttendanceClient, N: Notifier>(client: &C, notifier: &N) -> KekaResult<bool> {
    if !client.is_clocked_in().await? {
        return Ok(false);
    }
    if client.get_time_clocked().await? < REMINDER_THRESHOLD_SECS {
        return Ok(false);
    }
    notifier.notify(Notification::clock_out_reminder());
    Ok(true)
}

/// Applies the auto clock rules for `now` and returns the action taken.
///
/// The clocked-in status is fetched at most once, and only when a configured
/// time matches.
pub async fn auto_clock<C: AttendanceClient>(client: &C, preference: &AutoClockPreference, now: NaiveDateTime) -> KekaResult<Option<AutoClockAction>> {
    if matches!(now.weekday(), Weekday::Sat | Weekday::Sun) {
        return Ok(None);
    }

    let current = now.format("%H:%M").to_string();
    let clock_in_due = preference.clock_in_enabled && !preference.clock_in_time.is_empty() && preference.clock_in_time == current;
    let clock_out_due = preference.clock_out_enabled && !preference.clock_out_time.is_empty() && preference.clock_out_time == current;
    if !clock_in_due && !clock_out_due {
        return Ok(None);
    }

    let clocked_in = client.is_clocked_in().await?;
    if clock_in_due && !clocked_in {
        client.clock_in_out().await?;
        Ok(Some(AutoClockAction::ClockIn))
    } else if clock_out_due && clocked_in {
        client.clock_in_out().await?;
        Ok(Some(AutoClockAction::ClockOut))
    } else {
        Ok(None)
    }
}

/// Handles alarm ticks against the stored preferences.
pub struct AlarmHandler<N: Notifier> {
    store: Store,
    notifier: N,
}

impl<N: Notifier> AlarmHandler<N> {
    pub fn new(store: Store, notifier: N) -> Self {
        Self { store, notifier }
    }

    /// Runs both concerns for one tick. Never fails.
    pub async fn handle_tick<C: AttendanceClient>(&self, client: &C, now: NaiveDateTime) {
        if let Err(e) = check_reminder(client, &self.notifier).await {
            msg_error!(Message::ReminderCheckFailed(e.to_string()));
        }

        let preference = match AutoClockPreference::load(&self.store) {
            Ok(preference) => preference,
            Err(e) => {
                msg_error!(Message::AutoClockFailed(e.to_string()));
                return;
            }
        };

        match auto_clock(client, &preference, now).await {
            Ok(Some(action)) => {
                let clocked_in = action == AutoClockAction::ClockIn;
                self.notifier.notify(Notification::auto_clocked(clocked_in, &now.format("%H:%M").to_string()));
            }
            Ok(None) => {}
            Err(e) => msg_error!(Message::AutoClockFailed(e.to_string())),
        }
    }

    /// Builds a fresh client from the store, refreshes a stale token and
    /// handles one tick with it.
    pub async fn on_alarm<B: Browser>(&self, browser: B, session: TabSession) {
        msg_debug!(Message::AlarmFired(ALARM_NAME.to_string()));
        let mut keka = match KekaApi::create(self.store.clone(), browser, session).await {
            Ok(keka) => keka,
            Err(e) => {
                msg_error!(Message::AlarmClientFailed(e.to_string()));
                return;
            }
        };
        if let Err(e) = keka.ensure_token().await {
            msg_error!(Message::AlarmClientFailed(e.to_string()));
            return;
        }
        self.handle_tick(&keka, Local::now().naive_local()).await;
    }
}

/// The recurring timer.
pub struct Alarm {
    name: &'static str,
    period: Duration,
}

impl Alarm {
    pub fn new() -> Self {
        Self {
            name: ALARM_NAME,
            period: ALARM_PERIOD,
        }
    }

    pub fn name(&self) -> &str {
        self.name
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Fires `handler` forever. The first tick waits one full period.
    pub async fn run<N, B, F>(&self, handler: &AlarmHandler<N>, browser: F, session: TabSession)
    where
        N: Notifier,
        B: Browser,
        F: Fn() -> B,
    {
        msg_info!(Message::AlarmScheduled(self.name.to_string(), self.period.as_secs()));
        let mut interval = time::interval_at(time::Instant::now() + self.period, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            handler.on_alarm(browser(), session.clone()).await;
        }
    }
}

impl Default for Alarm {
    fn default() -> Self {
        Self::new()
    }
}
