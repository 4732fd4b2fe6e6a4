#[cfg(test)]
mod tests {
    use keka_clicker::api::browser::{Browser, TabId};
    use keka_clicker::api::keka::KekaApi;
    use keka_clicker::api::token::{self, POLL_CHECK_INTERVAL, POLL_CHECK_TIMEOUT};
    use keka_clicker::libs::error::{KekaError, KekaResult};
    use keka_clicker::libs::session::TabSession;
    use keka_clicker::libs::storage::{Store, StoreKey};
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;
    use test_context::{test_context, AsyncTestContext};
    use tokio::time::{Duration, Instant};

    /// Browser whose `access_token` appears a fixed time after the tab opens.
    struct MockBrowser {
        token: Option<String>,
        token_delay: Duration,
        fail_open: bool,
        hang_on_load: bool,
        fail_close: bool,
        opened_at: Mutex<Option<Instant>>,
        opened_urls: Mutex<Vec<String>>,
        closed: Mutex<Vec<TabId>>,
        reads: AtomicUsize,
    }

    impl MockBrowser {
        fn with_token_after(delay: Duration) -> Self {
            Self {
                token: Some("header.payload.signature".to_string()),
                token_delay: delay,
                fail_open: false,
                hang_on_load: false,
                fail_close: false,
                opened_at: Mutex::new(None),
                opened_urls: Mutex::new(Vec::new()),
                closed: Mutex::new(Vec::new()),
                reads: AtomicUsize::new(0),
            }
        }

        fn without_token() -> Self {
            Self {
                token: None,
                ..Self::with_token_after(Duration::ZERO)
            }
        }

        fn closed(&self) -> Vec<TabId> {
            self.closed.lock().clone()
        }
    }

    impl Browser for MockBrowser {
        async fn open_tab(&self, url: &str) -> KekaResult<TabId> {
            if self.fail_open {
                return Err(KekaError::Tab("no browser".to_string()));
            }
            self.opened_urls.lock().push(url.to_string());
            *self.opened_at.lock() = Some(Instant::now());
            Ok(TabId("tab-1".to_string()))
        }

        async fn wait_for_load(&self, _tab: &TabId) -> KekaResult<()> {
            if self.hang_on_load {
                std::future::pending::<()>().await;
            }
            Ok(())
        }

        async fn read_local_storage(&self, _tab: &TabId, key: &str) -> KekaResult<Option<String>> {
            assert_eq!(key, "access_token");
            self.reads.fetch_add(1, Ordering::SeqCst);
            let opened_at = self.opened_at.lock().expect("tab was opened");
            if Instant::now() >= opened_at + self.token_delay {
                Ok(self.token.clone())
            } else {
                Ok(Some(String::new()))
            }
        }

        async fn close_tab(&self, tab: &TabId) -> KekaResult<()> {
            self.closed.lock().push(tab.clone());
            if self.fail_close {
                return Err(KekaError::Tab("target already gone".to_string()));
            }
            Ok(())
        }
    }

    struct TokenTestContext {
        _temp_dir: TempDir,
        store: Store,
        session: TabSession,
    }

    impl AsyncTestContext for TokenTestContext {
        async fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let store = Store::at(temp_dir.path().join("store.json"));
            store.set_string(StoreKey::Subdomain, "acme").unwrap();
            TokenTestContext {
                _temp_dir: temp_dir,
                store,
                session: TabSession::new(),
            }
        }
    }

    #[test_context(TokenTestContext)]
    #[tokio::test(start_paused = true)]
    async fn test_token_found_before_budget(ctx: &mut TokenTestContext) {
        let browser = MockBrowser::with_token_after(POLL_CHECK_INTERVAL * 59);

        let token = token::get_token(&ctx.store, &browser, &ctx.session).await.unwrap();

        assert_eq!(token, "header.payload.signature");
        assert_eq!(browser.reads.load(Ordering::SeqCst), 60);
        assert_eq!(browser.opened_urls.lock().as_slice(), ["https://acme.keka.com/#/home/dashboard"]);
    }

    #[test_context(TokenTestContext)]
    #[tokio::test(start_paused = true)]
    async fn test_token_at_budget_boundary_times_out(ctx: &mut TokenTestContext) {
        let browser = MockBrowser::with_token_after(POLL_CHECK_INTERVAL * 60);
        assert_eq!(POLL_CHECK_INTERVAL * 60, POLL_CHECK_TIMEOUT);

        let result = token::get_token(&ctx.store, &browser, &ctx.session).await;

        assert!(matches!(result, Err(KekaError::Timeout(_))));
        assert_eq!(browser.reads.load(Ordering::SeqCst), 60);
    }

    #[test_context(TokenTestContext)]
    #[tokio::test(start_paused = true)]
    async fn test_immediate_token_needs_single_read(ctx: &mut TokenTestContext) {
        let browser = MockBrowser::with_token_after(Duration::ZERO);
        let started = Instant::now();

        token::get_token(&ctx.store, &browser, &ctx.session).await.unwrap();

        assert_eq!(browser.reads.load(Ordering::SeqCst), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[test_context(TokenTestContext)]
    #[tokio::test(start_paused = true)]
    async fn test_tab_closed_and_session_cleared_on_success(ctx: &mut TokenTestContext) {
        let browser = MockBrowser::with_token_after(Duration::from_millis(300));

        token::get_token(&ctx.store, &browser, &ctx.session).await.unwrap();

        assert_eq!(browser.closed(), vec![TabId("tab-1".to_string())]);
        assert_eq!(ctx.session.active(), None);
    }

    #[test_context(TokenTestContext)]
    #[tokio::test(start_paused = true)]
    async fn test_tab_closed_and_session_cleared_on_timeout(ctx: &mut TokenTestContext) {
        let browser = MockBrowser::without_token();

        let result = token::get_token(&ctx.store, &browser, &ctx.session).await;

        assert!(matches!(result, Err(KekaError::Timeout(_))));
        assert_eq!(browser.closed(), vec![TabId("tab-1".to_string())]);
        assert_eq!(ctx.session.active(), None);
    }

    #[test_context(TokenTestContext)]
    #[tokio::test(start_paused = true)]
    async fn test_stalled_page_load_times_out_and_closes_tab(ctx: &mut TokenTestContext) {
        let browser = MockBrowser {
            hang_on_load: true,
            ..MockBrowser::with_token_after(Duration::ZERO)
        };

        let result = token::get_token(&ctx.store, &browser, &ctx.session).await;

        assert!(matches!(result, Err(KekaError::Timeout(_))));
        assert_eq!(browser.reads.load(Ordering::SeqCst), 0);
        assert_eq!(browser.closed().len(), 1);
    }

    #[test_context(TokenTestContext)]
    #[tokio::test]
    async fn test_missing_subdomain_is_configuration_error(ctx: &mut TokenTestContext) {
        ctx.store.set_string(StoreKey::Subdomain, "").unwrap();
        let browser = MockBrowser::with_token_after(Duration::ZERO);

        let result = token::get_token(&ctx.store, &browser, &ctx.session).await;

        assert!(matches!(result, Err(KekaError::Configuration(_))));
        assert!(browser.opened_urls.lock().is_empty());
    }

    #[test_context(TokenTestContext)]
    #[tokio::test]
    async fn test_open_failure_is_tab_error(ctx: &mut TokenTestContext) {
        let browser = MockBrowser {
            fail_open: true,
            ..MockBrowser::with_token_after(Duration::ZERO)
        };

        let result = token::get_token(&ctx.store, &browser, &ctx.session).await;

        assert!(matches!(result, Err(KekaError::Tab(_))));
        assert!(browser.closed().is_empty());
        assert_eq!(ctx.session.active(), None);
    }

    #[test_context(TokenTestContext)]
    #[tokio::test(start_paused = true)]
    async fn test_refresh_token_persists_token(ctx: &mut TokenTestContext) {
        let browser = MockBrowser::with_token_after(Duration::from_millis(500));
        let mut keka = KekaApi::create(ctx.store.clone(), browser, ctx.session.clone()).await.unwrap();

        let token = keka.refresh_token().await.unwrap();

        assert_eq!(token, "header.payload.signature");
        assert_eq!(keka.credentials().unwrap().token, token);
        assert_eq!(ctx.store.get_string(StoreKey::Token).unwrap(), token);
    }

    #[test_context(TokenTestContext)]
    #[tokio::test(start_paused = true)]
    async fn test_failed_refresh_keeps_stored_token(ctx: &mut TokenTestContext) {
        ctx.store.set_string(StoreKey::Token, "old").unwrap();
        let mut keka = KekaApi::create(ctx.store.clone(), MockBrowser::without_token(), ctx.session.clone()).await.unwrap();

        assert!(matches!(keka.refresh_token().await, Err(KekaError::Timeout(_))));
        assert_eq!(ctx.store.get_string(StoreKey::Token).unwrap(), "old");
    }

    #[tokio::test]
    async fn test_disconnect_closes_registered_tab() {
        let browser = MockBrowser::with_token_after(Duration::ZERO);
        let session = TabSession::new();
        session.set_active(TabId("tab-9".to_string()));

        session.clone().disconnect(&browser).await;

        assert_eq!(browser.closed(), vec![TabId("tab-9".to_string())]);
        assert_eq!(session.active(), None);
    }

    #[tokio::test]
    async fn test_disconnect_forgets_tab_when_close_fails() {
        let browser = MockBrowser {
            fail_close: true,
            ..MockBrowser::with_token_after(Duration::ZERO)
        };
        let session = TabSession::new();
        session.set_active(TabId("tab-9".to_string()));

        session.disconnect(&browser).await;
        session.disconnect(&browser).await;

        assert_eq!(browser.closed(), vec![TabId("tab-9".to_string())]);
        assert_eq!(session.active(), None);
    }

    #[tokio::test]
    async fn test_disconnect_without_tab_closes_nothing() {
        let browser = MockBrowser::with_token_after(Duration::ZERO);

        TabSession::new().disconnect(&browser).await;

        assert!(browser.closed().is_empty());
    }

    #[test]
    fn test_clear_if_ignores_other_tabs() {
        let session = TabSession::new();
        session.set_active(TabId("tab-2".to_string()));

        session.clear_if(&TabId("tab-1".to_string()));
        assert_eq!(session.active(), Some(TabId("tab-2".to_string())));

        session.clear_if(&TabId("tab-2".to_string()));
        assert_eq!(session.active(), None);
    }
}
