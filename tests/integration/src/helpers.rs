//! Test helpers for integration tests
//!
//! Provides an in-process websocket gateway and an in-process REST API that
//! record what the client sends.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use chat_client::{Client, Event};
use chat_common::ClientConfig;
use chat_core::Intents;
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response as WsResponse};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;

use crate::fixtures::ready_payload;

/// How long any single expectation may take
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Await `future`, failing the test after [`TEST_TIMEOUT`]
pub async fn within<F: std::future::Future>(what: &str, future: F) -> Result<F::Output> {
    tokio::time::timeout(TEST_TIMEOUT, future)
        .await
        .with_context(|| format!("timed out waiting for {what}"))
}

// ============================================================================
// Mock gateway
// ============================================================================

/// A websocket gateway that accepts one connection
///
/// Frames the client sends are parsed and queued for [`recv`](Self::recv).
/// Client heartbeats are acknowledged automatically.
pub struct MockGateway {
    addr: SocketAddr,
    outbound: mpsc::UnboundedSender<Message>,
    inbound: mpsc::UnboundedReceiver<Value>,
    request_uri: Option<oneshot::Receiver<String>>,
    _handle: JoinHandle<()>,
}

impl MockGateway {
    pub async fn start() -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (in_tx, in_rx) = mpsc::unbounded_channel();
        let (uri_tx, uri_rx) = oneshot::channel();

        let handle = tokio::spawn(async move {
            if let Err(e) = serve_one(listener, uri_tx, out_rx, in_tx).await {
                eprintln!("mock gateway stopped: {e}");
            }
        });

        Ok(Self {
            addr,
            outbound: out_tx,
            inbound: in_rx,
            request_uri: Some(uri_rx),
            _handle: handle,
        })
    }

    /// URL the REST API hands out for this gateway
    pub fn url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Queue a frame for the client
    pub fn send(&self, frame: Value) -> Result<()> {
        self.outbound
            .send(Message::Text(frame.to_string()))
            .map_err(|_| anyhow::anyhow!("mock gateway connection is gone"))
    }

    pub fn hello(&self, heartbeat_interval_ms: u64) -> Result<()> {
        self.send(json!({"op": 10, "d": {"heartbeat_interval": heartbeat_interval_ms}, "s": null, "t": null}))
    }

    pub fn dispatch(&self, name: &str, sequence: u64, data: Value) -> Result<()> {
        self.send(json!({"op": 0, "d": data, "s": sequence, "t": name}))
    }

    /// Ask the client for an immediate heartbeat
    pub fn request_heartbeat(&self) -> Result<()> {
        self.send(json!({"op": 1, "d": null}))
    }

    /// Close the connection with `code`
    pub fn close(&self, code: u16, reason: &str) -> Result<()> {
        let frame = CloseFrame {
            code: CloseCode::from(code),
            reason: reason.to_string().into(),
        };
        self.outbound
            .send(Message::Close(Some(frame)))
            .map_err(|_| anyhow::anyhow!("mock gateway connection is gone"))
    }

    /// Path and query of the websocket upgrade request
    pub async fn request_uri(&mut self) -> Result<String> {
        let rx = self.request_uri.take().context("request uri already taken")?;
        Ok(within("websocket upgrade", rx).await??)
    }

    /// Next frame from the client
    pub async fn recv(&mut self) -> Result<Value> {
        within("client frame", self.inbound.recv())
            .await?
            .context("client disconnected")
    }

    /// Next frame with opcode `op`, skipping any other
    pub async fn recv_op(&mut self, op: u64) -> Result<Value> {
        loop {
            let frame = self.recv().await?;
            if frame["op"] == op {
                return Ok(frame);
            }
        }
    }

    /// Wait until the client has closed the connection
    pub async fn closed(&mut self) -> Result<()> {
        within("client close", async {
            while self.inbound.recv().await.is_some() {}
        })
        .await
    }

    /// Send hello, expect identify, send READY with sequence 1; returns the identify frame
    pub async fn handshake(&mut self, heartbeat_interval_ms: u64) -> Result<Value> {
        self.hello(heartbeat_interval_ms)?;
        let identify = self.recv_op(2).await?;
        self.dispatch("READY", 1, ready_payload())?;
        Ok(identify)
    }
}

async fn serve_one(
    listener: TcpListener,
    uri_tx: oneshot::Sender<String>,
    mut out_rx: mpsc::UnboundedReceiver<Message>,
    in_tx: mpsc::UnboundedSender<Value>,
) -> Result<()> {
    let (stream, _) = listener.accept().await?;
    let ws = tokio_tungstenite::accept_hdr_async(
        stream,
        move |request: &Request, response: WsResponse| -> Result<WsResponse, ErrorResponse> {
            let _ = uri_tx.send(request.uri().to_string());
            Ok(response)
        },
    )
    .await?;
    let (mut sink, mut source) = ws.split();

    loop {
        tokio::select! {
            outgoing = out_rx.recv() => match outgoing {
                Some(message) => sink.send(message).await?,
                None => break,
            },
            incoming = source.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    let frame: Value = serde_json::from_str(&text)?;
                    if frame["op"] == 1 {
                        sink.send(Message::Text(json!({"op": 11}).to_string())).await?;
                    }
                    if in_tx.send(frame).is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | None => {
                    // Flushes the close reply
                    let _ = sink.close().await;
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
            },
        }
    }
    Ok(())
}

// ============================================================================
// Mock REST API
// ============================================================================

/// One request the mock API received
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

#[derive(Clone)]
struct ApiState {
    gateway_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    rate_limited: Arc<AtomicBool>,
}

/// REST API that records every request
///
/// `GET /gateway` returns the configured gateway URL, command overwrites echo
/// their body, interaction callbacks answer 204.
pub struct MockApi {
    addr: SocketAddr,
    state: ApiState,
    _handle: JoinHandle<()>,
}

impl MockApi {
    pub async fn start(gateway_url: impl Into<String>) -> Result<Self> {
        let state = ApiState {
            gateway_url: gateway_url.into(),
            requests: Arc::new(Mutex::new(Vec::new())),
            rate_limited: Arc::new(AtomicBool::new(false)),
        };

        let app = Router::new().fallback(record).with_state(state.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Ok(Self {
            addr,
            state,
            _handle: handle,
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Answer every following request with 429
    pub fn set_rate_limited(&self, limited: bool) {
        self.state.rate_limited.store(limited, Ordering::SeqCst);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().clone()
    }

    /// Wait until a request matching `predicate` has been received
    pub async fn wait_for_request<P>(&self, what: &str, predicate: P) -> Result<RecordedRequest>
    where
        P: Fn(&RecordedRequest) -> bool,
    {
        within(what, async {
            loop {
                if let Some(found) = self.requests().into_iter().find(|r| predicate(r)) {
                    return found;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
    }
}

async fn record(State(state): State<ApiState>, method: Method, uri: Uri, body: String) -> Response {
    let path = uri.path().to_string();
    state.requests.lock().push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        body: serde_json::from_str(&body).ok(),
    });

    if state.rate_limited.load(Ordering::SeqCst) {
        let body = json!({"code": 0, "message": "You are being rate limited.", "retry_after": 0.5, "global": false});
        return (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
    }

    if method == Method::GET && path == "/gateway" {
        Json(json!({"url": state.gateway_url})).into_response()
    } else if method == Method::PUT {
        let echoed = serde_json::from_str::<Value>(&body).unwrap_or_else(|_| json!([]));
        Json(echoed).into_response()
    } else if method == Method::POST && path.ends_with("/callback") {
        StatusCode::NO_CONTENT.into_response()
    } else {
        (StatusCode::NOT_FOUND, Json(json!({"code": 0, "message": "404: Not Found"}))).into_response()
    }
}

// ============================================================================
// Client setup
// ============================================================================

/// A mock gateway, a mock API pointing at it, and a client configured for both
pub struct TestBed {
    pub gateway: MockGateway,
    pub api: MockApi,
    pub client: Arc<Client>,
}

impl TestBed {
    pub async fn start() -> Result<Self> {
        let gateway = MockGateway::start().await?;
        let api = MockApi::start(gateway.url()).await?;

        let config = ClientConfig::new("Bot secret")
            .with_api_base_url(api.base_url())
            .with_intents(Intents::GUILDS | Intents::GUILD_MESSAGES);
        let client = Arc::new(Client::builder().config(config).build()?);

        Ok(Self { gateway, api, client })
    }

    /// Connect the client through a full handshake; returns the Ready event
    pub async fn connect(&mut self, heartbeat_interval_ms: u64) -> Result<Arc<Event>> {
        let client = Arc::clone(&self.client);
        let connecting = tokio::spawn(async move { client.connect().await });

        self.gateway.handshake(heartbeat_interval_ms).await?;
        Ok(within("ready", connecting).await???)
    }

    /// Run the client's supervisor in the background
    pub fn spawn_run(&self) -> JoinHandle<chat_client::ClientResult<()>> {
        let client = Arc::clone(&self.client);
        tokio::spawn(async move { client.run().await })
    }
}
