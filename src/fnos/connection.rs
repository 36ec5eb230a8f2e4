//! WebSocket Connection Management
//!
//! This module handles the persistent WebSocket session with an fnOS device.
//! A single long-lived connection is reused across API calls. Unlike a
//! self-healing pool, a lost connection is reported as
//! [`FnosError::NotConnected`] and only re-established by an explicit
//! [`ConnectionManager::reconnect`], which replays the cached credentials.

use crate::error::{FnosError, Result};
use crate::fnos::types::{FnosRequest, FnosResponse, LoginResult};
use futures_util::{SinkExt, StreamExt};
use secrecy::{ExposeSecret, SecretString};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Manages a persistent WebSocket connection to fnOS
pub struct ConnectionManager {
    use_tls: bool,
    verify_ssl: bool,
    session: Mutex<Session>,
    request_id: AtomicU64,
}

#[derive(Default)]
struct Session {
    host: Option<String>,
    credentials: Option<Credentials>,
    stream: Option<WsStream>,
}

struct Credentials {
    username: String,
    password: SecretString,
}

impl ConnectionManager {
    pub fn new(use_tls: bool, verify_ssl: bool) -> Self {
        Self {
            use_tls,
            verify_ssl,
            session: Mutex::new(Session::default()),
            request_id: AtomicU64::new(0),
        }
    }

    /// Get next request ID
    fn next_id(&self) -> String {
        self.request_id.fetch_add(1, Ordering::SeqCst).to_string()
    }

    /// Build WebSocket URL
    fn websocket_url(&self, host: &str) -> String {
        let protocol = if self.use_tls { "wss" } else { "ws" };
        format!("{}://{}/websocket?type=main", protocol, host)
    }

    /// Open a fresh connection to `host`, replacing any existing one.
    pub async fn connect(&self, host: &str) -> Result<()> {
        let mut session = self.session.lock().await;
        if let Some(mut old) = session.stream.take() {
            let _ = old.close(None).await;
        }

        info!("Establishing WebSocket connection to fnOS at {}", host);
        let stream = self.connect_websocket(host).await?;
        session.host = Some(host.to_string());
        session.stream = Some(stream);
        Ok(())
    }

    /// Connect to WebSocket
    async fn connect_websocket(&self, host: &str) -> Result<WsStream> {
        let url = self.websocket_url(host);
        debug!("Connecting to {}", url);

        let (ws_stream, _) = if self.use_tls && !self.verify_ssl {
            // Custom TLS connector for self-signed certs
            let connector = native_tls::TlsConnector::builder()
                .danger_accept_invalid_certs(true)
                .danger_accept_invalid_hostnames(true)
                .build()
                .map_err(|e| FnosError::Config(e.to_string()))?;

            let connector = tokio_tungstenite::Connector::NativeTls(connector);
            tokio_tungstenite::connect_async_tls_with_config(&url, None, false, Some(connector))
                .await
                .map_err(FnosError::WebSocket)?
        } else {
            connect_async(&url).await.map_err(FnosError::WebSocket)?
        };

        Ok(ws_stream)
    }

    /// Log in on the current connection and remember the credentials for
    /// later reconnects.
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<LoginResult> {
        let mut session = self.session.lock().await;
        let result = self.login_on(&mut session, username, password).await?;
        if result.success {
            session.credentials = Some(Credentials {
                username: username.to_string(),
                password: password.clone(),
            });
        }
        Ok(result)
    }

    async fn login_on(
        &self,
        session: &mut Session,
        username: &str,
        password: &SecretString,
    ) -> Result<LoginResult> {
        let mut params = serde_json::Map::new();
        params.insert("user".to_string(), username.into());
        params.insert(
            "password".to_string(),
            password.expose_secret().to_string().into(),
        );
        params.insert("stay".to_string(), true.into());

        debug!("Sending login request");
        let response = self.exchange(session, "user.login", params).await?;
        if response.is_success() {
            info!("Successfully authenticated to fnOS");
            Ok(LoginResult { success: true })
        } else {
            warn!("fnOS rejected login (errno {:?})", response.errno);
            Ok(LoginResult { success: false })
        }
    }

    /// Drop the current connection, connect again to the last host and
    /// replay the cached login.
    pub async fn reconnect(&self) -> Result<()> {
        let mut session = self.session.lock().await;
        let host = session
            .host
            .clone()
            .ok_or_else(|| FnosError::Config("reconnect called before connect".to_string()))?;

        if let Some(mut old) = session.stream.take() {
            let _ = old.close(None).await;
        }

        info!("Reconnecting to fnOS at {}", host);
        session.stream = Some(self.connect_websocket(&host).await?);

        if let Some(creds) = session.credentials.take() {
            let result = self
                .login_on(&mut session, &creds.username, &creds.password)
                .await;
            session.credentials = Some(creds);
            if !result?.success {
                return Err(FnosError::Auth(
                    "stored credentials rejected on reconnect".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Execute a request on the persistent connection and return the
    /// response body of a successful call.
    pub async fn execute(
        &self,
        req: &str,
        params: serde_json::Map<String, serde_json::Value>,
    ) -> Result<serde_json::Map<String, serde_json::Value>> {
        let mut session = self.session.lock().await;
        let response = self.exchange(&mut session, req, params).await?;

        if !response.is_success() {
            return Err(FnosError::Api(format!(
                "{} failed: result={} errno={}",
                req,
                response.result.as_deref().unwrap_or("none"),
                response
                    .errno
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "none".to_string())
            )));
        }

        Ok(response.body)
    }

    /// Send one frame and wait for the response carrying the same `reqid`.
    ///
    /// Any transport failure drops the stream and yields `NotConnected`.
    async fn exchange(
        &self,
        session: &mut Session,
        req: &str,
        params: serde_json::Map<String, serde_json::Value>,
    ) -> Result<FnosResponse> {
        let stream = session.stream.as_mut().ok_or(FnosError::NotConnected)?;

        let reqid = self.next_id();
        let request = FnosRequest {
            req: req.to_string(),
            reqid: reqid.clone(),
            params,
        };
        let request_json = serde_json::to_string(&request)?;
        debug!("Sending request: {}", req);

        if let Err(e) = stream.send(Message::Text(request_json.into())).await {
            warn!("Send failed for {}: {}", req, e);
            session.stream = None;
            return Err(FnosError::NotConnected);
        }

        loop {
            let msg = match stream.next().await {
                Some(Ok(msg)) => msg,
                Some(Err(e)) => {
                    warn!("Connection error while waiting for {}: {}", req, e);
                    session.stream = None;
                    return Err(FnosError::NotConnected);
                }
                None => {
                    warn!("Connection closed by server while waiting for {}", req);
                    session.stream = None;
                    return Err(FnosError::NotConnected);
                }
            };

            match msg {
                Message::Text(text) => {
                    // Pushes may not follow the response shape; only our reply is decoded.
                    let frame: serde_json::Value = match serde_json::from_str(&text) {
                        Ok(frame) => frame,
                        Err(_) => {
                            debug!("Skipping non-JSON message: {}", text);
                            continue;
                        }
                    };
                    if frame.get("reqid").and_then(|id| id.as_str()) == Some(reqid.as_str()) {
                        debug!("{} response received", req);
                        return Ok(serde_json::from_value::<FnosResponse>(frame)?);
                    }
                    debug!("Skipping unsolicited message: {}", text);
                }
                Message::Close(frame) => {
                    warn!("Server closed connection: {:?}", frame);
                    session.stream = None;
                    return Err(FnosError::NotConnected);
                }
                _ => {}
            }
        }
    }

    /// Close the connection
    pub async fn close(&self) {
        let mut session = self.session.lock().await;
        if let Some(mut stream) = session.stream.take() {
            let _ = stream.close(None).await;
            info!("WebSocket connection closed");
        }
    }
}
