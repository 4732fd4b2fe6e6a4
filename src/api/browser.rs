//! Browser access for the token flow.
//!
//! The token flow only needs four things from a browser: open a background
//! tab, wait until it has loaded, read one key from its `localStorage` and
//! close it again. [`Browser`] describes exactly that, and [`DevToolsBrowser`]
//! implements it against a Chromium instance started with
//! `--remote-debugging-port`, so the token is read from the user's already
//! authenticated profile.
//!
//! ```text
//! open_tab        ── browser socket ──▶ Target.createTarget { background: true }
//! wait_for_load   ── page socket    ──▶ Page.enable + document.readyState / Page.loadEventFired
//! read_storage    ── page socket    ──▶ Runtime.evaluate(localStorage.getItem(..))
//! close_tab       ── HTTP           ──▶ /json/close/{id}
//! ```

use crate::libs::error::{KekaError, KekaResult};
use crate::libs::messages::Message;
use crate::msg_debug;
use futures::{SinkExt, StreamExt};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message as Frame;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// Default endpoint of a locally running Chromium with remote debugging enabled.
pub const DEFAULT_DEVTOOLS_URL: &str = "http://127.0.0.1:9222";

/// Identifier of a browser tab.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TabId(pub String);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Tab operations used to piggyback on an authenticated browser session.
#[allow(async_fn_in_trait)]
pub trait Browser {
    /// Opens `url` in a new tab without focusing it.
    async fn open_tab(&self, url: &str) -> KekaResult<TabId>;

    /// Resolves once the tab reports that loading has completed.
    async fn wait_for_load(&self, tab: &TabId) -> KekaResult<()>;

    /// Reads `localStorage[key]` inside the tab; `None` when unset.
    async fn read_local_storage(&self, tab: &TabId, key: &str) -> KekaResult<Option<String>>;

    async fn close_tab(&self, tab: &TabId) -> KekaResult<()>;
}

#[derive(Debug, Deserialize)]
struct VersionInfo {
    #[serde(rename = "webSocketDebuggerUrl")]
    web_socket_debugger_url: String,
}

/// Chrome DevTools Protocol implementation of [`Browser`].
pub struct DevToolsBrowser {
    client: Client,
    endpoint: String,
    page: Mutex<Option<(TabId, CdpConnection)>>,
}

impl DevToolsBrowser {
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            page: Mutex::new(None),
        }
    }

    fn page_socket_url(&self, tab: &TabId) -> String {
        let ws_base = if let Some(rest) = self.endpoint.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = self.endpoint.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            format!("ws://{}", self.endpoint)
        };
        format!("{}/devtools/page/{}", ws_base, tab)
    }

    async fn browser_socket_url(&self) -> KekaResult<String> {
        let url = format!("{}/json/version", self.endpoint);
        let res = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| KekaError::Tab(Message::DevToolsUnreachable(self.endpoint.clone(), e.to_string()).to_string()))?;
        let info: VersionInfo = res.json().await.map_err(|e| KekaError::Tab(e.to_string()))?;
        Ok(info.web_socket_debugger_url)
    }

    /// Runs `expression` in the tab, reusing the page socket between calls.
    async fn evaluate(&self, tab: &TabId, expression: &str) -> KekaResult<Value> {
        let mut page = self.page.lock().await;
        if page.as_ref().map(|(id, _)| id != tab).unwrap_or(true) {
            let connection = CdpConnection::connect(&self.page_socket_url(tab)).await?;
            *page = Some((tab.clone(), connection));
        }
        let Some((_, connection)) = page.as_mut() else {
            return Err(KekaError::Tab(Message::DevToolsConnectionClosed.to_string()));
        };
        connection.evaluate(expression).await
    }
}

impl Browser for DevToolsBrowser {
    async fn open_tab(&self, url: &str) -> KekaResult<TabId> {
        let socket_url = self.browser_socket_url().await?;
        let mut connection = CdpConnection::connect(&socket_url).await?;
        let result = connection.call("Target.createTarget", json!({ "url": url, "background": true })).await?;
        let _ = connection.close().await;

        match result.get("targetId").and_then(Value::as_str) {
            Some(id) if !id.is_empty() => Ok(TabId(id.to_string())),
            _ => Err(KekaError::Tab(Message::TabOpenFailed.to_string())),
        }
    }

    async fn wait_for_load(&self, tab: &TabId) -> KekaResult<()> {
        let mut page = self.page.lock().await;
        let mut connection = CdpConnection::connect(&self.page_socket_url(tab)).await?;
        connection.call("Page.enable", json!({})).await?;

        let loaded = connection
            .evaluate(r#"document.readyState === "complete" && location.href !== "about:blank""#)
            .await?;
        if loaded != Value::Bool(true) {
            connection.wait_for_event("Page.loadEventFired").await?;
        }
        *page = Some((tab.clone(), connection));
        Ok(())
    }

    async fn read_local_storage(&self, tab: &TabId, key: &str) -> KekaResult<Option<String>> {
        let expression = format!("window.localStorage.getItem({})", serde_json::to_string(key)?);
        match self.evaluate(tab, &expression).await? {
            Value::String(value) => Ok(Some(value)),
            _ => Ok(None),
        }
    }

    async fn close_tab(&self, tab: &TabId) -> KekaResult<()> {
        {
            let mut page = self.page.lock().await;
            if page.as_ref().map(|(id, _)| id == tab).unwrap_or(false) {
                if let Some((_, mut connection)) = page.take() {
                    let _ = connection.close().await;
                }
            }
        }

        let url = format!("{}/json/close/{}", self.endpoint, tab);
        let res = self.client.get(&url).send().await.map_err(|e| KekaError::Tab(e.to_string()))?;
        if !res.status().is_success() {
            return Err(KekaError::Tab(Message::TabCloseFailed(tab.to_string(), res.status().to_string()).to_string()));
        }
        msg_debug!(Message::TabClosed(tab.to_string()));
        Ok(())
    }
}

/// A single DevTools websocket with request/response correlation.
struct CdpConnection {
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
    next_id: u64,
    // Events seen while waiting for command responses.
    events: Vec<String>,
}

impl CdpConnection {
    async fn connect(url: &str) -> KekaResult<Self> {
        let (socket, _) = connect_async(url).await.map_err(|e| KekaError::Tab(e.to_string()))?;
        Ok(Self {
            socket,
            next_id: 0,
            events: Vec::new(),
        })
    }

    async fn call(&mut self, method: &str, params: Value) -> KekaResult<Value> {
        self.next_id += 1;
        let id = self.next_id;
        let payload = json!({ "id": id, "method": method, "params": params }).to_string();
        self.socket.send(Frame::Text(payload)).await.map_err(|e| KekaError::Tab(e.to_string()))?;

        while let Some(frame) = self.socket.next().await {
            let Frame::Text(text) = frame.map_err(|e| KekaError::Tab(e.to_string()))? else {
                continue;
            };
            let message: Value = serde_json::from_str(&text)?;
            if message.get("id").and_then(Value::as_u64) == Some(id) {
                if let Some(error) = message.get("error") {
                    return Err(KekaError::Tab(Message::DevToolsCommandFailed(method.to_string(), error.to_string()).to_string()));
                }
                return Ok(message.get("result").cloned().unwrap_or(Value::Null));
            }
            if let Some(event) = message.get("method").and_then(Value::as_str) {
                self.events.push(event.to_string());
            }
        }
        Err(KekaError::Tab(Message::DevToolsConnectionClosed.to_string()))
    }

    async fn evaluate(&mut self, expression: &str) -> KekaResult<Value> {
        let result = self
            .call("Runtime.evaluate", json!({ "expression": expression, "returnByValue": true }))
            .await?;
        if let Some(details) = result.get("exceptionDetails") {
            return Err(KekaError::Tab(Message::DevToolsCommandFailed("Runtime.evaluate".to_string(), details.to_string()).to_string()));
        }
        Ok(result.pointer("/result/value").cloned().unwrap_or(Value::Null))
    }

    async fn wait_for_event(&mut self, name: &str) -> KekaResult<()> {
        if self.events.iter().any(|event| event == name) {
            return Ok(());
        }
        while let Some(frame) = self.socket.next().await {
            let Frame::Text(text) = frame.map_err(|e| KekaError::Tab(e.to_string()))? else {
                continue;
            };
            let message: Value = serde_json::from_str(&text)?;
            if message.get("method").and_then(Value::as_str) == Some(name) {
                return Ok(());
            }
        }
        Err(KekaError::Tab(Message::DevToolsConnectionClosed.to_string()))
    }

    async fn close(&mut self) -> KekaResult<()> {
        self.socket.close(None).await.map_err(|e| KekaError::Tab(e.to_string()))
    }
}
