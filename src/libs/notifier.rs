//! Where user-facing notifications go.

use crate::libs::messages::Message;
use crate::{msg_info, msg_success, msg_warning};

/// Identifier of the clock-out reminder. Re-sent every tick; receivers are
/// expected to replace an earlier notification with the same id.
pub const CLOCK_OUT_REMINDER_ID: &str = "clockOutReminder";

pub const AUTO_CLOCK_ID: &str = "autoClock";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: &'static str,
    pub title: String,
    pub message: String,
    /// Command the user can run in response, shown after the message.
    pub action: Option<String>,
}

impl Notification {
    pub fn clock_out_reminder() -> Self {
        Self {
            id: CLOCK_OUT_REMINDER_ID,
            title: Message::ClockOutReminderTitle.to_string(),
            message: Message::ClockOutReminderMessage.to_string(),
            action: Some(Message::ClockOutReminderAction.to_string()),
        }
    }

    pub fn auto_clocked(clocked_in: bool, time: &str) -> Self {
        let message = match clocked_in {
            true => Message::AutoClockedIn(time.to_string()),
            false => Message::AutoClockedOut(time.to_string()),
        };
        Self {
            id: AUTO_CLOCK_ID,
            title: Message::AutoClockTitle.to_string(),
            message: message.to_string(),
            action: None,
        }
    }
}

pub trait Notifier {
    fn notify(&self, notification: Notification);
}

/// Prints notifications through the message macros, so the daemon's log
/// file receives them too.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        let text = Message::Notification(notification.title, notification.message);
        match notification.id {
            CLOCK_OUT_REMINDER_ID => msg_warning!(text),
            _ => msg_success!(text),
        }
        if let Some(action) = notification.action {
            msg_info!(Message::NotificationAction(action));
        }
    }
}
