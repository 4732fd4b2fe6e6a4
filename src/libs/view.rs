use crate::api::keka::AttendanceRecord;
use crate::api::AttendanceClient;
use crate::libs::formatter::format_clocked_time;
use crate::libs::messages::Message;
use crate::{msg_error, msg_print};
use prettytable::{row, Table};

pub struct View {}

impl View {
    /// Prints the punches of a record, oldest first.
    pub fn punches(record: &AttendanceRecord) {
        let mut entries: Vec<_> = record.entries().iter().collect();
        entries.sort_by_key(|entry| entry.timestamp());

        let mut table = Table::new();
        table.add_row(row!["#", "TIMESTAMP", "PUNCH"]);
        for (index, entry) in entries.iter().enumerate() {
            let punch = match entry.is_clock_in() {
                true => Message::PunchIn,
                false => Message::PunchOut,
            };
            table.add_row(row![index + 1, entry.actual_timestamp.clone().unwrap_or_default(), punch]);
        }
        table.printstd();
        msg_print!(Message::ClockedTime(format_clocked_time(record.clocked_seconds())));
    }
}

/// Clocked-in/out indicator.
///
/// Either fetches the status ([`refresh_from_remote`](Self::refresh_from_remote))
/// or shows a status the caller already knows, e.g. the result of a toggle
/// ([`apply_known_status`](Self::apply_known_status)).
#[derive(Debug, Default)]
pub struct StatusView {
    shown: Option<Message>,
}

impl StatusView {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn refresh_from_remote<C: AttendanceClient>(&mut self, client: &C) -> Option<bool> {
        match client.is_clocked_in().await {
            Ok(clocked_in) => Some(self.apply_known_status(clocked_in)),
            Err(e) => {
                msg_error!(Message::StatusFetchFailed(e.to_string()));
                self.apply_error();
                None
            }
        }
    }

    /// Shows the error state, e.g. when no usable token could be obtained.
    pub fn apply_error(&mut self) {
        msg_print!(Message::StatusError);
        self.shown = Some(Message::StatusError);
    }

    pub fn apply_known_status(&mut self, clocked_in: bool) -> bool {
        let status = match clocked_in {
            true => Message::StatusClockedIn,
            false => Message::StatusClockedOut,
        };
        msg_print!(status);
        self.shown = Some(status);
        clocked_in
    }

    /// What the view currently displays.
    pub fn shown(&self) -> Option<&Message> {
        self.shown.as_ref()
    }
}

/// Time clocked today.
#[derive(Debug, Default)]
pub struct TimeView {
    shown: Option<String>,
}

impl TimeView {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn refresh_from_remote<C: AttendanceClient>(&mut self, client: &C) -> Option<u64> {
        match client.get_time_clocked().await {
            Ok(seconds) => {
                let text = format_clocked_time(seconds);
                msg_print!(Message::ClockedTime(text.clone()));
                self.shown = Some(text);
                Some(seconds)
            }
            Err(e) => {
                msg_error!(Message::TimeFetchFailed(e.to_string()));
                self.shown = Some(Message::StatusError.to_string());
                None
            }
        }
    }

    pub fn shown(&self) -> Option<&str> {
        self.shown.as_deref()
    }
}
