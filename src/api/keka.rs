//! Keka web API client.
//!
//! Wraps the handful of endpoints the dashboard itself uses: the web
//! clock-in toggle, the attendance summary, the access probe used to check a
//! token and the public profile. All requests carry the bearer token scraped
//! from the browser (see [`super::token`]) and present themselves as coming
//! from the tenant's own domain.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use keka_clicker::api::browser::DevToolsBrowser;
//! use keka_clicker::api::keka::KekaApi;
//! use keka_clicker::libs::session::TabSession;
//! use keka_clicker::libs::storage::Store;
//!
//! # async fn run() -> keka_clicker::libs::error::KekaResult<()> {
//! let browser = DevToolsBrowser::new("http://127.0.0.1:9222");
//! let mut keka = KekaApi::create(Store::new()?, browser, TabSession::new()).await?;
//! keka.ensure_token().await?;
//! let clocked_in = keka.clock_in_out().await?;
//! # Ok(())
//! # }
//! ```

use super::browser::Browser;
use super::token;
use super::AttendanceClient;
use crate::libs::error::{KekaError, KekaResult};
use crate::libs::messages::Message;
use crate::libs::session::TabSession;
use crate::libs::storage::{Store, StoreKey};
use crate::msg_debug;
use base64::prelude::*;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, ORIGIN, REFERER};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const CLOCK_IN_URL: &str = "k/dashboard/api/mytime/attendance/webclockin";
const SUMMARY_URL: &str = "k/attendance/api/mytime/attendance/summary";
const ACCESS_PROBE_URL: &str = "k/default/api/storyboard/attrition/user/hasaccess";
const PUBLIC_PROFILE_URL: &str = "k/default/api/me/publicprofile";
const DASHBOARD_PATH: &str = "#/home/dashboard";

/// Punch status of a clock-in entry; anything else is a clock-out.
pub const CLOCKED_IN_STATUS: i64 = 0;

/// `https://{subdomain}.keka.com`
pub fn domain_for(subdomain: &str) -> String {
    format!("https://{}.keka.com", subdomain)
}

pub fn dashboard_url(subdomain: &str) -> String {
    format!("{}/{}", domain_for(subdomain), DASHBOARD_PATH)
}

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(date: &str) -> KekaResult<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").map_err(|_| KekaError::InvalidDate(date.to_string()))
}

/// Returns true when `token` is a JWT whose `exp` claim lies before `now`.
///
/// Tokens that cannot be decoded are treated as not expired and left to the
/// access probe.
pub fn token_expired(token: &str, now: DateTime<Utc>) -> bool {
    #[derive(Deserialize)]
    struct Claims {
        exp: Option<i64>,
    }

    let Some(payload) = token.split('.').nth(1) else {
        return false;
    };
    let Ok(bytes) = BASE64_URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')) else {
        return false;
    };
    match serde_json::from_slice::<Claims>(&bytes) {
        Ok(Claims { exp: Some(exp) }) => exp <= now.timestamp(),
        _ => false,
    }
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub subdomain: String,
    pub domain: String,
    pub token: String,
}

/// A single clock-in or clock-out punch.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    pub actual_timestamp: Option<String>,
    pub punch_status: Option<i64>,
}

impl TimeEntry {
    /// Punch time normalized to UTC. Timestamps without an offset are taken as-is.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        let raw = self.actual_timestamp.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.naive_utc())
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
            .ok()
    }

    pub fn is_clock_in(&self) -> bool {
        self.punch_status == Some(CLOCKED_IN_STATUS)
    }
}

/// Attendance for one calendar day.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub attendance_date: Option<String>,
    #[serde(default)]
    pub original_time_entries: Option<Vec<TimeEntry>>,
    #[serde(default)]
    pub total_effective_hours: Option<f64>,
}

impl AttendanceRecord {
    pub fn entries(&self) -> &[TimeEntry] {
        self.original_time_entries.as_deref().unwrap_or_default()
    }

    /// The punch with the latest timestamp.
    pub fn most_recent_entry(&self) -> Option<&TimeEntry> {
        self.entries().iter().max_by_key(|entry| entry.timestamp())
    }

    /// Whether the latest punch is a clock-in. A day without punches is clocked out.
    pub fn is_clocked_in(&self) -> bool {
        self.most_recent_entry().map(TimeEntry::is_clock_in).unwrap_or(false)
    }

    /// Effective clocked time as reported by Keka, in whole seconds.
    pub fn clocked_seconds(&self) -> u64 {
        let hours = self.total_effective_hours.unwrap_or(0.0);
        if hours.is_finite() && hours > 0.0 {
            (hours * 3600.0).round() as u64
        } else {
            0
        }
    }

    pub fn matches(&self, date: NaiveDate) -> bool {
        let target = date.format("%Y-%m-%d").to_string();
        self.attendance_date.as_deref().map(|d| d.starts_with(&target)).unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AttendanceSummary {
    #[serde(default)]
    pub data: Vec<AttendanceRecord>,
}

impl AttendanceSummary {
    /// Finds the record whose `attendanceDate` starts with `date`.
    pub fn find_record(&self, date: NaiveDate) -> KekaResult<&AttendanceRecord> {
        if self.data.is_empty() {
            return Err(KekaError::Api(Message::AttendanceSummaryEmpty.to_string()));
        }
        self.data
            .iter()
            .find(|record| record.matches(date))
            .ok_or_else(|| KekaError::NotFound(Message::AttendanceRecordNotFound(date.format("%Y-%m-%d").to_string()).to_string()))
    }
}

/// Body of the web clock-in request. Clocking in and out send the same payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PunchRequest {
    timestamp: String,
    attendance_log_source: u8,
    location_address: Option<String>,
    manual_clockin_type: u8,
    note: String,
    original_punch_status: u8,
}

impl PunchRequest {
    fn now() -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            attendance_log_source: 1,
            location_address: None,
            manual_clockin_type: 1,
            note: String::new(),
            original_punch_status: 1,
        }
    }
}

pub struct KekaApi<B: Browser> {
    client: Client,
    store: Store,
    browser: B,
    session: TabSession,
    domain: Option<String>,
    credentials: Option<Credentials>,
}

impl<B: Browser> KekaApi<B> {
    /// Creates an uninitialized client. Call [`init`](Self::init) before use,
    /// or use [`create`](Self::create).
    pub fn new(store: Store, browser: B, session: TabSession) -> Self {
        Self {
            client: Client::new(),
            store,
            browser,
            session,
            domain: None,
            credentials: None,
        }
    }

    /// Sends requests to `domain` instead of `https://{subdomain}.keka.com`.
    /// Takes effect on the next [`init`](Self::init).
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into().trim_end_matches('/').to_string());
        self
    }

    pub async fn create(store: Store, browser: B, session: TabSession) -> KekaResult<Self> {
        let mut api = Self::new(store, browser, session);
        api.init().await?;
        Ok(api)
    }

    /// Loads subdomain and token from the store.
    pub async fn init(&mut self) -> KekaResult<()> {
        let subdomain = self.store.get_string(StoreKey::Subdomain)?.trim().to_string();
        if subdomain.is_empty() {
            return Err(KekaError::Configuration(Message::SubdomainNotSet.to_string()));
        }
        let token = self.store.get_string(StoreKey::Token)?;
        self.credentials = Some(Credentials {
            domain: self.domain.clone().unwrap_or_else(|| domain_for(&subdomain)),
            subdomain,
            token,
        });
        Ok(())
    }

    pub fn credentials(&self) -> KekaResult<&Credentials> {
        self.credentials.as_ref().ok_or(KekaError::NotInitialized)
    }

    pub fn browser(&self) -> &B {
        &self.browser
    }

    pub fn session(&self) -> &TabSession {
        &self.session
    }

    /// Sends the clock-in/out toggle and returns the resulting clocked-in state.
    pub async fn clock_in_out(&self) -> KekaResult<bool> {
        let url = self.url(CLOCK_IN_URL)?;
        let res = self.client.post(url).headers(self.headers()?).json(&PunchRequest::now()).send().await?;

        if !res.status().is_success() {
            return Err(KekaError::status("Clock-in/out", res.status()));
        }
        self.is_clocked_in().await
    }

    /// Scrapes a new token from the browser, persists it and starts using it.
    pub async fn refresh_token(&mut self) -> KekaResult<String> {
        self.credentials()?;
        let token = token::get_token(&self.store, &self.browser, &self.session).await?;
        self.store.set_string(StoreKey::Token, &token)?;
        if let Some(credentials) = self.credentials.as_mut() {
            credentials.token = token.clone();
        }
        msg_debug!(Message::TokenRefreshed);
        Ok(token)
    }

    /// Refreshes the token when the stored one is missing or rejected.
    pub async fn ensure_token(&mut self) -> KekaResult<()> {
        if !self.is_token_valid().await? {
            self.refresh_token().await?;
        }
        Ok(())
    }

    pub async fn is_clocked_in(&self) -> KekaResult<bool> {
        let record = match self.get_attendance_record(Local::now().date_naive()).await {
            Ok(record) => record,
            Err(KekaError::NotFound(message)) => return Err(KekaError::Api(message)),
            Err(e) => return Err(e),
        };
        Ok(record.is_clocked_in())
    }

    /// Seconds clocked today, as reported by the attendance summary.
    pub async fn get_time_clocked(&self) -> KekaResult<u64> {
        let record = self.get_attendance_record(Local::now().date_naive()).await?;
        Ok(record.clocked_seconds())
    }

    pub async fn is_token_valid(&self) -> KekaResult<bool> {
        let credentials = self.credentials()?;
        if credentials.token.is_empty() || token_expired(&credentials.token, Utc::now()) {
            return Ok(false);
        }

        let res = self.client.get(self.url(ACCESS_PROBE_URL)?).headers(self.headers()?).send().await?;
        Ok(res.status().is_success())
    }

    pub async fn get_attendance_summary(&self) -> KekaResult<AttendanceSummary> {
        let res = self.client.get(self.url(SUMMARY_URL)?).headers(self.headers()?).send().await?;
        if !res.status().is_success() {
            return Err(KekaError::status("Attendance summary", res.status()));
        }
        Ok(res.json().await?)
    }

    pub async fn get_attendance_record(&self, date: NaiveDate) -> KekaResult<AttendanceRecord> {
        let summary = self.get_attendance_summary().await?;
        summary.find_record(date).cloned()
    }

    /// Same as [`get_attendance_record`](Self::get_attendance_record) for a
    /// `YYYY-MM-DD` string; malformed dates fail before any request is made.
    pub async fn get_attendance_record_for(&self, date: &str) -> KekaResult<AttendanceRecord> {
        let date = parse_date(date)?;
        self.get_attendance_record(date).await
    }

    pub async fn get_public_profile(&self) -> KekaResult<Value> {
        let res = self.client.get(self.url(PUBLIC_PROFILE_URL)?).headers(self.headers()?).send().await?;
        if !res.status().is_success() {
            return Err(KekaError::status("Public profile", res.status()));
        }
        Ok(res.json().await?)
    }

    fn url(&self, path: &str) -> KekaResult<String> {
        Ok(format!("{}/{}", self.credentials()?.domain, path))
    }

    fn headers(&self) -> KekaResult<HeaderMap> {
        let credentials = self.credentials()?;
        let header = |value: &str| HeaderValue::from_str(value).map_err(|e| KekaError::Configuration(e.to_string()));

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
        headers.insert(AUTHORIZATION, header(&format!("Bearer {}", credentials.token))?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json; charset=UTF-8"));
        headers.insert(ORIGIN, header(&credentials.domain)?);
        headers.insert(REFERER, header(&credentials.domain)?);
        Ok(headers)
    }
}

impl<B: Browser> AttendanceClient for KekaApi<B> {
    async fn is_clocked_in(&self) -> KekaResult<bool> {
        KekaApi::is_clocked_in(self).await
    }

    async fn get_time_clocked(&self) -> KekaResult<u64> {
        KekaApi::get_time_clocked(self).await
    }

    async fn clock_in_out(&self) -> KekaResult<bool> {
        KekaApi::clock_in_out(self).await
    }
}
