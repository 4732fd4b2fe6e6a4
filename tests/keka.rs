#[cfg(test)]
mod tests {
    use base64::prelude::*;
    use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone, Utc};
    use keka_clicker::api::browser::{Browser, TabId};
    use keka_clicker::api::keka::{self, AttendanceRecord, AttendanceSummary, KekaApi};
    use keka_clicker::libs::error::{KekaError, KekaResult};
    use keka_clicker::libs::session::TabSession;
    use keka_clicker::libs::storage::{Store, StoreKey};
    use parking_lot::Mutex;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::Arc;
    use tempfile::TempDir;
    use test_context::{test_context, AsyncTestContext};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    const CLOCK_IN_PATH: &str = "/k/dashboard/api/mytime/attendance/webclockin";
    const SUMMARY_PATH: &str = "/k/attendance/api/mytime/attendance/summary";
    const ACCESS_PATH: &str = "/k/default/api/storyboard/attrition/user/hasaccess";
    const PROFILE_PATH: &str = "/k/default/api/me/publicprofile";
    const TOKEN: &str = "stored-token";

    /// A browser that is never expected to be touched.
    struct NoBrowser;

    impl Browser for NoBrowser {
        async fn open_tab(&self, _url: &str) -> KekaResult<TabId> {
            panic!("unexpected open_tab");
        }

        async fn wait_for_load(&self, _tab: &TabId) -> KekaResult<()> {
            panic!("unexpected wait_for_load");
        }

        async fn read_local_storage(&self, _tab: &TabId, _key: &str) -> KekaResult<Option<String>> {
            panic!("unexpected read_local_storage");
        }

        async fn close_tab(&self, _tab: &TabId) -> KekaResult<()> {
            panic!("unexpected close_tab");
        }
    }

    struct KekaTestContext {
        _temp_dir: TempDir,
        store: Store,
    }

    impl AsyncTestContext for KekaTestContext {
        async fn setup() -> Self {
            // The stub server must be reached directly, whatever proxy the host sets.
            std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
            std::env::set_var("no_proxy", "127.0.0.1,localhost");
            let temp_dir = tempfile::tempdir().unwrap();
            let store = Store::at(temp_dir.path().join("store.json"));
            KekaTestContext { _temp_dir: temp_dir, store }
        }
    }

    impl KekaTestContext {
        /// An initialized client whose requests go to `server`.
        async fn client(&self, server: &StubServer) -> KekaApi<NoBrowser> {
            self.store.set_string(StoreKey::Subdomain, "acme").unwrap();
            self.store.set_string(StoreKey::Token, TOKEN).unwrap();
            let mut keka = KekaApi::new(self.store.clone(), NoBrowser, TabSession::new()).with_domain(&server.url);
            keka.init().await.unwrap();
            keka
        }
    }

    #[derive(Debug, Clone)]
    struct RecordedRequest {
        method: String,
        path: String,
        headers: HashMap<String, String>,
        body: String,
    }

    impl RecordedRequest {
        fn header(&self, name: &str) -> Option<&str> {
            self.headers.get(name).map(String::as_str)
        }
    }

    /// Minimal HTTP/1.1 server answering each path with a canned status and body.
    struct StubServer {
        url: String,
        requests: Arc<Mutex<Vec<RecordedRequest>>>,
    }

    impl StubServer {
        async fn start(routes: Vec<(&'static str, u16, Value)>) -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let url = format!("http://{}", listener.local_addr().unwrap());
            let requests = Arc::new(Mutex::new(Vec::new()));

            let recorded = requests.clone();
            tokio::spawn(async move {
                while let Ok((mut socket, _)) = listener.accept().await {
                    let request = read_request(&mut socket).await;
                    let (status, body) = routes
                        .iter()
                        .find(|(path, _, _)| *path == request.path)
                        .map(|(_, status, body)| (*status, body.to_string()))
                        .unwrap_or((404, "{}".to_string()));
                    recorded.lock().push(request);

                    let response = format!(
                        "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status,
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                }
            });

            StubServer { url, requests }
        }

        fn requests(&self) -> Vec<RecordedRequest> {
            self.requests.lock().clone()
        }

        fn paths(&self) -> Vec<String> {
            self.requests().into_iter().map(|request| request.path).collect()
        }
    }

    async fn read_request(socket: &mut TcpStream) -> RecordedRequest {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        let head_end = loop {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before the request head");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|window| window == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
        let mut lines = head.split("\r\n");
        let mut request_line = lines.next().unwrap().split(' ');
        let method = request_line.next().unwrap().to_string();
        let path = request_line.next().unwrap().to_string();
        let headers: HashMap<String, String> = lines
            .filter_map(|line| line.split_once(':'))
            .map(|(name, value)| (name.trim().to_ascii_lowercase(), value.trim().to_string()))
            .collect();

        let length = headers.get("content-length").and_then(|value| value.parse::<usize>().ok()).unwrap_or(0);
        while buf.len() < head_end + length {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before the request body");
            buf.extend_from_slice(&chunk[..n]);
        }
        let body = String::from_utf8_lossy(&buf[head_end..head_end + length]).to_string();

        RecordedRequest {
            method,
            path,
            headers,
            body,
        }
    }

    fn today_date() -> String {
        Local::now().format("%Y-%m-%dT00:00:00").to_string()
    }

    fn summary_for_today(punch_status: i64, hours: f64) -> Value {
        json!({
            "data": [{
                "attendanceDate": today_date(),
                "totalEffectiveHours": hours,
                "originalTimeEntries": [
                    { "actualTimestamp": Utc::now().to_rfc3339(), "punchStatus": punch_status }
                ]
            }]
        })
    }

    fn record(value: serde_json::Value) -> AttendanceRecord {
        serde_json::from_value(value).unwrap()
    }

    fn jwt_with_exp(exp: i64) -> String {
        let header = BASE64_URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = BASE64_URL_SAFE_NO_PAD.encode(json!({ "sub": "42", "exp": exp }).to_string());
        format!("{}.{}.signature", header, payload)
    }

    #[test]
    fn test_clocked_in_follows_latest_punch() {
        let record = record(json!({
            "attendanceDate": "2024-01-15T00:00:00",
            "originalTimeEntries": [
                { "actualTimestamp": "2024-01-15T09:00:00Z", "punchStatus": 0 },
                { "actualTimestamp": "2024-01-15T13:00:00Z", "punchStatus": 0 },
                { "actualTimestamp": "2024-01-15T12:00:00Z", "punchStatus": 1 }
            ]
        }));

        assert!(record.is_clocked_in());
        assert_eq!(record.most_recent_entry().unwrap().actual_timestamp.as_deref(), Some("2024-01-15T13:00:00Z"));
    }

    #[test]
    fn test_latest_punch_out_means_clocked_out() {
        let record = record(json!({
            "attendanceDate": "2024-01-15T00:00:00",
            "originalTimeEntries": [
                { "actualTimestamp": "2024-01-15T17:30:00Z", "punchStatus": 1 },
                { "actualTimestamp": "2024-01-15T09:00:00Z", "punchStatus": 0 }
            ]
        }));

        assert!(!record.is_clocked_in());
    }

    #[test]
    fn test_offsets_are_compared_in_utc() {
        // 10:00+05:30 is 04:30Z, earlier than the 05:00Z punch out.
        let record = record(json!({
            "attendanceDate": "2024-01-15",
            "originalTimeEntries": [
                { "actualTimestamp": "2024-01-15T10:00:00+05:30", "punchStatus": 0 },
                { "actualTimestamp": "2024-01-15T05:00:00Z", "punchStatus": 1 }
            ]
        }));

        assert!(!record.is_clocked_in());
    }

    #[test]
    fn test_no_punches_means_clocked_out() {
        assert!(!record(json!({ "attendanceDate": "2024-01-15", "originalTimeEntries": [] })).is_clocked_in());
        assert!(!record(json!({ "attendanceDate": "2024-01-15" })).is_clocked_in());
    }

    #[test]
    fn test_clocked_seconds_from_effective_hours() {
        assert_eq!(record(json!({ "totalEffectiveHours": 8.0 })).clocked_seconds(), 28800);
        assert_eq!(record(json!({ "totalEffectiveHours": 1.5 })).clocked_seconds(), 5400);
        assert_eq!(record(json!({ "totalEffectiveHours": -1.0 })).clocked_seconds(), 0);
        assert_eq!(record(json!({})).clocked_seconds(), 0);
    }

    #[test]
    fn test_find_record_by_date_prefix() {
        let summary: AttendanceSummary = serde_json::from_value(json!({
            "data": [
                { "attendanceDate": "2024-01-14T00:00:00", "totalEffectiveHours": 0.0 },
                { "attendanceDate": "2024-01-15T00:00:00", "totalEffectiveHours": 2.0 }
            ]
        }))
        .unwrap();

        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(summary.find_record(date).unwrap().clocked_seconds(), 7200);
    }

    #[test]
    fn test_missing_record_is_not_found() {
        let summary: AttendanceSummary = serde_json::from_value(json!({
            "data": [{ "attendanceDate": "2024-01-14T00:00:00" }]
        }))
        .unwrap();

        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert!(matches!(summary.find_record(date), Err(KekaError::NotFound(_))));
    }

    #[test]
    fn test_empty_summary_is_api_error() {
        let summary: AttendanceSummary = serde_json::from_value(json!({ "data": [] })).unwrap();

        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert!(matches!(summary.find_record(date), Err(KekaError::Api(_))));
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(keka::parse_date("2024-02-29").unwrap(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert!(matches!(keka::parse_date("2023-02-29"), Err(KekaError::InvalidDate(_))));
        assert!(matches!(keka::parse_date("15/01/2024"), Err(KekaError::InvalidDate(_))));
        assert!(matches!(keka::parse_date(""), Err(KekaError::InvalidDate(_))));
    }

    #[test]
    fn test_urls() {
        assert_eq!(keka::domain_for("acme"), "https://acme.keka.com");
        assert_eq!(keka::dashboard_url("acme"), "https://acme.keka.com/#/home/dashboard");
    }

    #[test]
    fn test_token_expiry() {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();

        assert!(keka::token_expired(&jwt_with_exp(now.timestamp() - 1), now));
        assert!(!keka::token_expired(&jwt_with_exp(now.timestamp() + 3600), now));
        assert!(!keka::token_expired("opaque-token", now));
        assert!(!keka::token_expired("a.%%%.c", now));
    }

    #[test_context(KekaTestContext)]
    #[tokio::test]
    async fn test_uninitialized_client_fails(ctx: &mut KekaTestContext) {
        let keka = KekaApi::new(ctx.store.clone(), NoBrowser, TabSession::new());

        assert!(matches!(keka.credentials(), Err(KekaError::NotInitialized)));
        assert!(matches!(keka.is_token_valid().await, Err(KekaError::NotInitialized)));
        assert!(matches!(keka.clock_in_out().await, Err(KekaError::NotInitialized)));
        assert!(matches!(keka.get_attendance_summary().await, Err(KekaError::NotInitialized)));
        assert!(matches!(keka.get_public_profile().await, Err(KekaError::NotInitialized)));
    }

    #[test_context(KekaTestContext)]
    #[tokio::test]
    async fn test_refresh_before_init_fails_without_opening_tab(ctx: &mut KekaTestContext) {
        let mut keka = KekaApi::new(ctx.store.clone(), NoBrowser, TabSession::new());

        assert!(matches!(keka.refresh_token().await, Err(KekaError::NotInitialized)));
    }

    #[test_context(KekaTestContext)]
    #[tokio::test]
    async fn test_init_without_subdomain_is_configuration_error(ctx: &mut KekaTestContext) {
        let result = KekaApi::create(ctx.store.clone(), NoBrowser, TabSession::new()).await;

        assert!(matches!(result, Err(KekaError::Configuration(_))));
    }

    #[test_context(KekaTestContext)]
    #[tokio::test]
    async fn test_init_loads_credentials(ctx: &mut KekaTestContext) {
        ctx.store.set_string(StoreKey::Subdomain, "acme").unwrap();
        ctx.store.set_string(StoreKey::Token, "stored-token").unwrap();

        let keka = KekaApi::create(ctx.store.clone(), NoBrowser, TabSession::new()).await.unwrap();
        let credentials = keka.credentials().unwrap();

        assert_eq!(credentials.subdomain, "acme");
        assert_eq!(credentials.domain, "https://acme.keka.com");
        assert_eq!(credentials.token, "stored-token");
    }

    #[test_context(KekaTestContext)]
    #[tokio::test]
    async fn test_missing_token_is_invalid_without_request(ctx: &mut KekaTestContext) {
        ctx.store.set_string(StoreKey::Subdomain, "acme").unwrap();

        let keka = KekaApi::create(ctx.store.clone(), NoBrowser, TabSession::new()).await.unwrap();

        assert!(!keka.is_token_valid().await.unwrap());
    }

    #[test_context(KekaTestContext)]
    #[tokio::test]
    async fn test_expired_token_is_invalid_without_request(ctx: &mut KekaTestContext) {
        ctx.store.set_string(StoreKey::Subdomain, "acme").unwrap();
        ctx.store.set_string(StoreKey::Token, &jwt_with_exp(Utc::now().timestamp() - 60)).unwrap();

        let keka = KekaApi::create(ctx.store.clone(), NoBrowser, TabSession::new()).await.unwrap();

        assert!(!keka.is_token_valid().await.unwrap());
    }

    #[test_context(KekaTestContext)]
    #[tokio::test]
    async fn test_invalid_date_fails_before_request(ctx: &mut KekaTestContext) {
        ctx.store.set_string(StoreKey::Subdomain, "acme").unwrap();

        let keka = KekaApi::create(ctx.store.clone(), NoBrowser, TabSession::new()).await.unwrap();

        assert!(matches!(keka.get_attendance_record_for("2024-13-01").await, Err(KekaError::InvalidDate(_))));
    }

    #[test_context(KekaTestContext)]
    #[tokio::test]
    async fn test_clock_in_out_posts_punch_and_reads_status(ctx: &mut KekaTestContext) {
        let server = StubServer::start(vec![(CLOCK_IN_PATH, 200, json!({})), (SUMMARY_PATH, 200, summary_for_today(0, 0.0))]).await;
        let keka = ctx.client(&server).await;

        assert!(keka.clock_in_out().await.unwrap());

        assert_eq!(server.paths(), vec![CLOCK_IN_PATH.to_string(), SUMMARY_PATH.to_string()]);
        let punch = &server.requests()[0];
        assert_eq!(punch.method, "POST");
        assert_eq!(punch.header("authorization"), Some("Bearer stored-token"));
        assert_eq!(punch.header("content-type"), Some("application/json; charset=UTF-8"));
        assert_eq!(punch.header("accept"), Some("application/json, text/plain, */*"));
        assert_eq!(punch.header("origin"), Some(server.url.as_str()));
        assert_eq!(punch.header("referer"), Some(server.url.as_str()));

        let body: Value = serde_json::from_str(&punch.body).unwrap();
        assert_eq!(body["attendanceLogSource"], json!(1));
        assert_eq!(body["locationAddress"], Value::Null);
        assert_eq!(body["manualClockinType"], json!(1));
        assert_eq!(body["note"], json!(""));
        assert_eq!(body["originalPunchStatus"], json!(1));
        let sent_at = DateTime::parse_from_rfc3339(body["timestamp"].as_str().unwrap()).unwrap();
        assert!((Utc::now() - sent_at.with_timezone(&Utc)).abs() < Duration::minutes(1));
    }

    #[test_context(KekaTestContext)]
    #[tokio::test]
    async fn test_clock_out_reports_clocked_out(ctx: &mut KekaTestContext) {
        let server = StubServer::start(vec![(CLOCK_IN_PATH, 200, json!({})), (SUMMARY_PATH, 200, summary_for_today(1, 8.0))]).await;
        let keka = ctx.client(&server).await;

        assert!(!keka.clock_in_out().await.unwrap());
    }

    #[test_context(KekaTestContext)]
    #[tokio::test]
    async fn test_rejected_clock_request_is_api_error(ctx: &mut KekaTestContext) {
        let server = StubServer::start(vec![(CLOCK_IN_PATH, 401, json!({}))]).await;
        let keka = ctx.client(&server).await;

        assert!(matches!(keka.clock_in_out().await, Err(KekaError::Api(_))));
        assert_eq!(server.paths(), vec![CLOCK_IN_PATH.to_string()]);
    }

    #[test_context(KekaTestContext)]
    #[tokio::test]
    async fn test_unauthorized_reads_are_api_errors(ctx: &mut KekaTestContext) {
        let server = StubServer::start(vec![(SUMMARY_PATH, 401, json!({})), (PROFILE_PATH, 401, json!({}))]).await;
        let keka = ctx.client(&server).await;

        assert!(matches!(keka.get_attendance_summary().await, Err(KekaError::Api(_))));
        assert!(matches!(keka.is_clocked_in().await, Err(KekaError::Api(_))));
        assert!(matches!(keka.get_time_clocked().await, Err(KekaError::Api(_))));
        assert!(matches!(keka.get_public_profile().await, Err(KekaError::Api(_))));

        let summary = &server.requests()[0];
        assert_eq!(summary.method, "GET");
        assert_eq!(summary.header("authorization"), Some("Bearer stored-token"));
    }

    #[test_context(KekaTestContext)]
    #[tokio::test]
    async fn test_missing_today_record(ctx: &mut KekaTestContext) {
        let yesterday = (Local::now() - Duration::days(1)).format("%Y-%m-%dT00:00:00").to_string();
        let summary = json!({ "data": [{ "attendanceDate": yesterday, "totalEffectiveHours": 8.0 }] });
        let server = StubServer::start(vec![(SUMMARY_PATH, 200, summary)]).await;
        let keka = ctx.client(&server).await;

        assert!(matches!(keka.is_clocked_in().await, Err(KekaError::Api(_))));
        assert!(matches!(keka.get_attendance_record(Local::now().date_naive()).await, Err(KekaError::NotFound(_))));
    }

    #[test_context(KekaTestContext)]
    #[tokio::test]
    async fn test_time_clocked_from_summary(ctx: &mut KekaTestContext) {
        let server = StubServer::start(vec![(SUMMARY_PATH, 200, summary_for_today(0, 8.5))]).await;
        let keka = ctx.client(&server).await;

        assert_eq!(keka.get_time_clocked().await.unwrap(), 30600);
        assert!(keka.is_clocked_in().await.unwrap());
    }

    #[test_context(KekaTestContext)]
    #[tokio::test]
    async fn test_token_checked_against_access_endpoint(ctx: &mut KekaTestContext) {
        let accepted = StubServer::start(vec![(ACCESS_PATH, 200, json!(true))]).await;
        let keka = ctx.client(&accepted).await;
        assert!(keka.is_token_valid().await.unwrap());

        let request = &accepted.requests()[0];
        assert_eq!(request.method, "GET");
        assert_eq!(request.path, ACCESS_PATH);
        assert_eq!(request.header("authorization"), Some("Bearer stored-token"));

        let rejected = StubServer::start(vec![(ACCESS_PATH, 401, json!({}))]).await;
        let keka = ctx.client(&rejected).await;
        assert!(!keka.is_token_valid().await.unwrap());
    }

    #[test_context(KekaTestContext)]
    #[tokio::test]
    async fn test_public_profile_is_returned_as_json(ctx: &mut KekaTestContext) {
        let profile = json!({ "displayName": "Ada Lovelace", "employeeNumber": "E-1" });
        let server = StubServer::start(vec![(PROFILE_PATH, 200, profile.clone())]).await;
        let keka = ctx.client(&server).await;

        assert_eq!(keka.get_public_profile().await.unwrap(), profile);
    }
}
