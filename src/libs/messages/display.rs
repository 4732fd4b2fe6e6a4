//! Display implementation for keka-clicker messages.
//!
//! All user-facing text lives here so prompts, notifications and log lines
//! read consistently. Messages that end up inside a [`KekaError`] are phrased
//! without a trailing period so they compose with the error prefix.
//!
//! [`KekaError`]: crate::libs::error::KekaError

use super::types::Message;
use std::fmt::{Display, Formatter, Result};

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let text = match self {
            // === CONFIG MESSAGES ===
            Message::ConfigSaved => "Configuration saved successfully".to_string(),
            Message::ConfigDeleted => "Configuration and stored values deleted".to_string(),
            Message::PromptSelectModules => "Select modules to configure".to_string(),
            Message::ConfigModuleKeka => "Keka".to_string(),
            Message::ConfigModuleAutoClock => "Auto clock-in/out".to_string(),
            Message::ConfigModuleBrowser => "Browser".to_string(),
            Message::PromptSubdomain => "Keka subdomain (the part before .keka.com)".to_string(),
            Message::SubdomainInvalid => "Subdomain must be non-empty and contain only letters and digits".to_string(),
            Message::SubdomainNotSet => "Keka subdomain is not set. Run `keka-clicker init` first".to_string(),
            Message::PromptDevToolsUrl => "Chrome DevTools endpoint".to_string(),
            Message::PromptClockInTime => "Auto clock-in time (HH:MM)".to_string(),
            Message::PromptClockOutTime => "Auto clock-out time (HH:MM)".to_string(),
            Message::PromptClockInEnabled(time) => format!("Clock in automatically at {} on weekdays?", time),
            Message::PromptClockOutEnabled(time) => format!("Clock out automatically at {} on weekdays?", time),
            Message::TimeInvalid(time) => format!("'{}' is not a valid 24-hour time (HH:MM)", time),
            Message::AutoClockSameTimes => "Clock-in and clock-out times are the same; only clock-in will run at that minute".to_string(),

            // === STORE MESSAGES ===
            Message::StoreValue(key, value) => format!("{} = {}", key, value),
            Message::StoreValueSaved(key) => format!("Saved '{}'", key),
            Message::InvalidStoreValue(key, expected) => format!("Invalid value for '{}': expected {}", key, expected),

            // === BROWSER TAB MESSAGES ===
            Message::TabOpening(url) => format!("Opening background tab at {}", url),
            Message::TabRegistered(tab) => format!("Tracking tab {}", tab),
            Message::TabClosed(tab) => format!("Closed tab {}", tab),
            Message::TabClosingOnDisconnect(tab) => format!("Closing tab {} on disconnect", tab),
            Message::TabOpenFailed => "Browser did not return a tab id".to_string(),
            Message::TabOpenFailedWithReason(reason) => format!("Failed to open Keka tab: {}", reason),
            Message::TabCloseFailed(tab, error) => format!("Failed to close tab {}: {}", tab, error),
            Message::TabLoadTimeout(ms) => format!("Keka tab did not finish loading within {}ms", ms),
            Message::DevToolsUnreachable(endpoint, error) => {
                format!("Cannot reach Chrome DevTools at {} ({}). Start Chrome with --remote-debugging-port", endpoint, error)
            }
            Message::DevToolsConnectionClosed => "DevTools connection closed unexpectedly".to_string(),
            Message::DevToolsCommandFailed(method, error) => format!("DevTools command {} failed: {}", method, error),

            // === TOKEN MESSAGES ===
            Message::TokenNotFound(ms) => format!("access_token did not appear within {}ms. Are you logged into Keka?", ms),
            Message::TokenRefreshed => "API token refreshed".to_string(),
            Message::TokenRefreshFailed => "Failed to refresh API token. Are you logged into Keka?".to_string(),
            Message::TokenValid => "Stored API token is valid".to_string(),
            Message::TokenInvalid => "Stored API token is missing or rejected".to_string(),

            // === ATTENDANCE MESSAGES ===
            Message::AttendanceSummaryEmpty => "Attendance summary contains no records".to_string(),
            Message::AttendanceRecordNotFound(date) => format!("No attendance record for {}", date),
            Message::PunchIn => "IN".to_string(),
            Message::PunchOut => "OUT".to_string(),
            Message::ClockedTime(time) => format!("Clocked today: {}", time),
            Message::StatusClockedIn => "Status: clocked in".to_string(),
            Message::StatusClockedOut => "Status: clocked out".to_string(),
            Message::StatusError => "Status: error".to_string(),
            Message::StatusFetchFailed(error) => format!("Failed to fetch clock status: {}", error),
            Message::TimeFetchFailed(error) => format!("Failed to fetch clocked time: {}", error),
            Message::ClockToggleFailed(error) => format!("Clock-in/out failed: {}", error),
            Message::Interrupted => "Interrupted".to_string(),

            // === NOTIFICATION MESSAGES ===
            Message::ClockOutReminderTitle => "Time to clock out!".to_string(),
            Message::ClockOutReminderMessage => "You've been clocked in for 8 hours.".to_string(),
            Message::ClockOutReminderAction => "keka-clicker toggle".to_string(),
            Message::AutoClockTitle => "Keka Clicker".to_string(),
            Message::AutoClockedIn(time) => format!("Automatically clocked in at {}", time),
            Message::AutoClockedOut(time) => format!("Automatically clocked out at {}", time),
            Message::Notification(title, message) => format!("{}: {}", title, message),
            Message::NotificationAction(command) => format!("Run `{}` to clock out", command),

            // === ALARM MESSAGES ===
            Message::AlarmScheduled(name, secs) => format!("Alarm '{}' scheduled every {}s", name, secs),
            Message::AlarmFired(name) => format!("Alarm '{}' fired", name),
            Message::AlarmClientFailed(error) => format!("Cannot create Keka client: {}", error),
            Message::ReminderCheckFailed(error) => format!("Clock-out reminder check failed: {}", error),
            Message::AutoClockFailed(error) => format!("Auto clock-in/out failed: {}", error),
            Message::AlarmStarted(pid) => format!("Alarm started in background (PID: {})", pid),
            Message::AlarmStopped(pid) => format!("Alarm stopped (PID: {})", pid),
            Message::AlarmAlreadyRunning(pid) => format!("Alarm is already running (PID: {})", pid),
            Message::AlarmNotRunning => "Alarm is not running".to_string(),
            Message::AlarmFailedToStop(pid) => format!("Failed to stop alarm (PID: {})", pid),
            Message::AlarmRunningInForeground => "Running alarm in foreground. Press Ctrl-C to stop".to_string(),
            Message::AlarmExited => "Alarm exited".to_string(),
            Message::AlarmShuttingDown => "Alarm shutting down".to_string(),
            Message::AlarmError(error) => format!("Alarm error: {}", error),
            Message::AlarmTaskPanicked(error) => format!("Alarm task panicked: {}", error),
            Message::AlarmReceivedSigterm => "Received SIGTERM, stopping alarm".to_string(),
            Message::AlarmReceivedSigint => "Received SIGINT, stopping alarm".to_string(),
            Message::AlarmReceivedCtrlC => "Received Ctrl-C, stopping alarm".to_string(),

            // === PROCESS MESSAGES ===
            Message::FailedToCreateSignalHandler(error) => format!("Failed to create signal handler: {}", error),
            Message::CtrlCListenFailed(error) => format!("Failed to listen for Ctrl-C: {}", error),
            Message::SignalHandlingNotSupported => "Signal handling is not supported on this platform".to_string(),
            Message::FailedToGetCurrentExecutable(error) => format!("Failed to get current executable: {}", error),
            Message::DaemonModeNotSupported => "Background mode is not supported on this platform".to_string(),
            Message::FailedToOpenProcess(code) => format!("Failed to open process (error {})", code),
            Message::FailedToTerminateProcess(code) => format!("Failed to terminate process (error {})", code),
            Message::ProcessTerminationNotSupported => "Process termination is not supported on this platform".to_string(),
        };

        write!(f, "{}", text)
    }
}
