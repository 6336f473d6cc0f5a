//! Gateway session
//!
//! Owns the streaming connection: the startup handshake (hello, identify,
//! ready), the read loop, and the heartbeat loop. Every inbound frame becomes
//! one supervised unit that resolves waiters and then hands the event to the
//! [`EventHandler`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chat_common::ClientConfig;
use chat_core::{DecodeError, Intents};
use futures_util::StreamExt;
use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode as WsCloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, trace, warn};

use super::transport::{self, WsSource};
use crate::error::{GatewayError, GatewayResult};
use crate::events::{Event, EventKind, EventRegistry};
use crate::protocol::{CloseCode, GatewayMessage, IdentifyPayload};
use crate::supervisor::{Supervisor, UnitResult};
use crate::waiter::EventWaiter;

/// Channel buffer size for outgoing frames
const OUTBOUND_BUFFER: usize = 100;

/// How long `close` waits for the writer to flush the close frame
const CLOSE_FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No transport opened yet
    Disconnected,
    /// Socket open, waiting for Hello
    AwaitingHello,
    /// Identify sent, waiting for Ready
    Identifying,
    /// Ready received
    Ready,
    /// Closed by the client
    Closed,
}

/// Receives every decoded event after waiters have been resolved
#[async_trait]
pub trait EventHandler: Send + Sync + 'static {
    async fn handle(&self, event: Arc<Event>) -> anyhow::Result<()>;
}

/// Handler that ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHandler;

#[async_trait]
impl EventHandler for NoopHandler {
    async fn handle(&self, _event: Arc<Event>) -> anyhow::Result<()> {
        Ok(())
    }
}

/// A gateway session
pub struct GatewaySession {
    token: String,
    intents: Intents,
    version: u8,
    client_name: String,

    registry: Arc<EventRegistry>,
    supervisor: Arc<Supervisor>,
    handler: Arc<dyn EventHandler>,

    state: RwLock<SessionState>,
    /// Last sequence number seen; `None` until the first sequenced frame
    sequence: Mutex<Option<u64>>,
    session_id: RwLock<Option<String>>,
    waiters: Mutex<Vec<Arc<EventWaiter>>>,
    /// Queue of the writer unit; `None` while no transport is open
    outbound: Mutex<Option<mpsc::Sender<Message>>>,
}

impl GatewaySession {
    pub fn new(
        config: &ClientConfig,
        registry: Arc<EventRegistry>,
        supervisor: Arc<Supervisor>,
        handler: Arc<dyn EventHandler>,
    ) -> Arc<Self> {
        Arc::new(Self {
            token: config.token.clone(),
            intents: config.intents,
            version: config.gateway_version,
            client_name: config.client_name.clone(),
            registry,
            supervisor,
            handler,
            state: RwLock::new(SessionState::Disconnected),
            sequence: Mutex::new(None),
            session_id: RwLock::new(None),
            waiters: Mutex::new(Vec::new()),
            outbound: Mutex::new(None),
        })
    }

    pub fn state(&self) -> SessionState {
        *self.state.read()
    }

    fn set_state(&self, state: SessionState) {
        let previous = std::mem::replace(&mut *self.state.write(), state);
        debug!(from = ?previous, to = ?state, "Session state changed");
    }

    /// Sequence number the next heartbeat will carry
    pub fn last_sequence(&self) -> Option<u64> {
        *self.sequence.lock()
    }

    /// Record a frame's sequence number; frames without one leave it unchanged
    pub fn record_sequence(&self, s: Option<u64>) {
        if let Some(s) = s {
            *self.sequence.lock() = Some(s);
        }
    }

    /// Session id from the Ready event
    pub fn session_id(&self) -> Option<String> {
        self.session_id.read().clone()
    }

    pub fn supervisor(&self) -> &Arc<Supervisor> {
        &self.supervisor
    }

    pub fn is_connected(&self) -> bool {
        self.outbound.lock().is_some()
    }

    /// Register a waiter for the next event of `kind` without suspending
    ///
    /// Register before triggering whatever produces the event, then `wait`.
    pub fn expect(&self, kind: EventKind) -> Arc<EventWaiter> {
        let waiter = Arc::new(EventWaiter::new(kind));
        let mut waiters = self.waiters.lock();
        waiters.retain(|waiter| !waiter.is_resolved() && !waiter.is_abandoned());
        waiters.push(Arc::clone(&waiter));
        drop(waiters);
        trace!(kind = %kind, "Waiter registered");
        waiter
    }

    /// Suspend until the next event of `kind` arrives
    pub async fn wait_for(&self, kind: EventKind) -> GatewayResult<Arc<Event>> {
        Ok(self.expect(kind).wait().await?)
    }

    /// Give `event` to every matching waiter and drop them from the list
    fn resolve_waiters(&self, event: &Arc<Event>) -> usize {
        let kind = event.kind();
        let mut resolved = 0;
        self.waiters.lock().retain(|waiter| {
            if waiter.matches(kind) {
                waiter.give(Arc::clone(event));
                resolved += 1;
                false
            } else {
                !waiter.is_resolved() && !waiter.is_abandoned()
            }
        });
        resolved
    }

    /// Fail the handshake waiter when the frame it waits for cannot be decoded
    fn fail_handshake(&self, kind: EventKind, error: &DecodeError) {
        let awaited = match self.state() {
            SessionState::AwaitingHello => EventKind::Hello,
            SessionState::Identifying => EventKind::Ready,
            _ => return,
        };
        if kind != awaited {
            return;
        }

        warn!(kind = %kind, error = %error, "Handshake frame could not be decoded");
        self.waiters.lock().retain(|waiter| {
            if waiter.matches(kind) {
                waiter.fail(error.to_string());
                false
            } else {
                true
            }
        });
    }

    /// Fail every pending waiter
    fn close_waiters(&self) {
        let waiters = std::mem::take(&mut *self.waiters.lock());
        if !waiters.is_empty() {
            debug!(count = waiters.len(), "Closing pending waiters");
        }
        for waiter in waiters {
            waiter.close();
        }
    }

    /// Open the gateway at `url` and run the handshake; returns the Ready event
    ///
    /// The read, writer and heartbeat loops are submitted to the supervisor as
    /// critical units.
    pub async fn connect(self: &Arc<Self>, url: &str) -> GatewayResult<Arc<Event>> {
        if self.is_connected() {
            return Err(GatewayError::Protocol("session is already connected".to_string()));
        }

        let url = transport::gateway_url(url, self.version);
        info!(url = %url, "Connecting to gateway");

        let (sink, stream) = transport::open(&url).await?;
        let (tx, rx) = mpsc::channel(OUTBOUND_BUFFER);
        *self.outbound.lock() = Some(tx);
        self.set_state(SessionState::AwaitingHello);

        self.supervisor
            .submit_critical("gateway-writer", transport::write_loop(sink, rx));

        // Registered before the read loop exists, so the hello cannot be missed
        let hello = self.expect(EventKind::Hello);
        self.supervisor
            .submit_critical("gateway-read", Arc::clone(self).read_loop(stream));

        match self.handshake(hello).await {
            Ok(ready) => Ok(ready),
            Err(e) => {
                warn!(error = %e, "Gateway handshake failed");
                if let Err(close_err) = self.close().await {
                    debug!(error = %close_err, "Transport already gone after failed handshake");
                }
                Err(e)
            }
        }
    }

    /// Wait for hello, start heartbeating, identify and wait for ready
    async fn handshake(self: &Arc<Self>, hello: Arc<EventWaiter>) -> GatewayResult<Arc<Event>> {
        let hello = hello.wait().await?;
        let interval = hello
            .as_hello()
            .map(crate::protocol::HelloPayload::interval)
            .ok_or_else(|| GatewayError::Protocol(format!("expected HELLO, got {hello}")))?;
        info!(heartbeat_interval_ms = interval.as_millis() as u64, "Hello received");

        self.supervisor
            .submit_critical("gateway-heartbeat", Arc::clone(self).heartbeat_loop(interval));

        self.set_state(SessionState::Identifying);
        let ready = self.expect(EventKind::Ready);
        let identify = IdentifyPayload::new(&self.token, self.intents, &self.client_name);
        info!(intents = self.intents.value(), "Identifying");
        self.send(&GatewayMessage::identify(&identify)?).await?;

        let ready = ready.wait().await?;
        if let Some(payload) = ready.as_ready() {
            *self.session_id.write() = Some(payload.session_id.clone());
            info!(
                user = %payload.user.tag(),
                session_id = %payload.session_id,
                guilds = payload.guilds.len(),
                "Session ready"
            );
        }
        self.set_state(SessionState::Ready);

        Ok(ready)
    }

    /// Queue a frame for the writer
    pub async fn send(&self, frame: &GatewayMessage) -> GatewayResult<()> {
        let tx = self.outbound.lock().clone().ok_or(GatewayError::NotConnected)?;
        let text = frame.to_json()?;
        trace!(frame = %frame, "Sending frame");
        tx.send(Message::Text(text))
            .await
            .map_err(|_| GatewayError::NotConnected)
    }

    /// Close the transport
    ///
    /// Fails with `NotConnected` if no transport is open.
    pub async fn close(&self) -> GatewayResult<()> {
        let tx = self.outbound.lock().take().ok_or(GatewayError::NotConnected)?;
        self.set_state(SessionState::Closed);
        info!("Closing gateway connection");

        let frame = CloseFrame {
            code: WsCloseCode::Normal,
            reason: "".into(),
        };
        self.close_waiters();
        if tx.send(Message::Close(Some(frame))).await.is_ok() {
            // The writer drops its queue once the close frame is flushed
            if tokio::time::timeout(CLOSE_FLUSH_TIMEOUT, tx.closed()).await.is_err() {
                warn!("Timed out flushing the close frame");
            }
        }
        Ok(())
    }

    async fn read_loop(self: Arc<Self>, mut stream: WsSource) -> UnitResult {
        let result = self.read_frames(&mut stream).await;
        let closed = self.state() == SessionState::Closed;
        // Transport goes first so no new waiter can be paired with a send
        if !closed {
            self.outbound.lock().take();
            self.set_state(SessionState::Disconnected);
        }
        self.close_waiters();

        match result {
            Err(_) if closed => {
                debug!("Read loop stopped after close");
                Ok(())
            }
            Err(e) => Err(e.into()),
            Ok(()) => Ok(()),
        }
    }

    async fn read_frames(self: &Arc<Self>, stream: &mut WsSource) -> GatewayResult<()> {
        while let Some(message) = stream.next().await {
            match message? {
                Message::Text(text) => self.on_frame(&text),
                Message::Close(frame) => {
                    let (code, reason) = match frame {
                        Some(frame) => (Some(u16::from(frame.code)), frame.reason.into_owned()),
                        None => (None, "no close frame".to_string()),
                    };
                    match code.and_then(CloseCode::from_u16) {
                        Some(known) => warn!(code = known.as_u16(), reason = %reason, "Gateway closed: {known}"),
                        None => info!(code, reason = %reason, "Gateway closed"),
                    }
                    return Err(GatewayError::Closed { code, reason });
                }
                Message::Binary(data) => {
                    return Err(GatewayError::Protocol(format!(
                        "unexpected binary frame of {} bytes",
                        data.len()
                    )));
                }
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
            }
        }

        Err(GatewayError::Closed {
            code: None,
            reason: "stream ended".to_string(),
        })
    }

    /// Record the sequence and submit one unit for the frame
    fn on_frame(self: &Arc<Self>, text: &str) {
        let frame = match GatewayMessage::from_json(text) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "Skipping unparseable gateway frame");
                return;
            }
        };
        trace!(frame = %frame, "Frame received");

        self.record_sequence(frame.s);
        let decoded = self.registry.decode(&frame);
        let kind = match &decoded {
            Ok(event) => event.kind(),
            Err(e) => {
                let kind = self.registry.resolve(frame.op, frame.t.as_deref());
                self.fail_handshake(kind, e);
                kind
            }
        };
        // Handling Ready is still part of startup, so its failure is fatal
        let critical = kind == EventKind::Ready;

        let session = Arc::clone(self);
        let unit = async move {
            let event = decoded?;
            session.on_event(event).await
        };
        if critical {
            self.supervisor.submit_critical("gateway-ready", unit);
        } else {
            self.supervisor.submit("gateway-event", unit);
        }
    }

    async fn on_event(&self, event: Event) -> UnitResult {
        let event = Arc::new(event);
        debug!(kind = %event.kind(), "Event received");

        match &*event {
            Event::HeartbeatRequest => {
                trace!("Server requested a heartbeat");
                self.send_heartbeat().await?;
            }
            Event::Reconnect => warn!("Server requested a reconnect; resuming is not supported"),
            Event::InvalidSession(resumable) => {
                warn!(resumable, "Server invalidated the session");
            }
            _ => {}
        }

        self.resolve_waiters(&event);
        self.handler.handle(event).await
    }

    async fn send_heartbeat(&self) -> GatewayResult<()> {
        let sequence = self.last_sequence();
        trace!(sequence, "Sending heartbeat");
        self.send(&GatewayMessage::heartbeat(sequence)).await
    }

    async fn heartbeat_loop(self: Arc<Self>, interval: Duration) -> UnitResult {
        if !self.is_connected() {
            return Err(GatewayError::NotConnected.into());
        }

        let jitter = interval.mul_f64(rand::random::<f64>());
        debug!(jitter_ms = jitter.as_millis() as u64, "Heartbeat loop starting");
        tokio::time::sleep(jitter).await;

        loop {
            if let Err(e) = self.beat().await {
                if self.state() == SessionState::Closed {
                    debug!("Heartbeat loop stopped after close");
                    return Ok(());
                }
                return Err(e.into());
            }
            tokio::time::sleep(interval).await;
        }
    }

    /// Send one heartbeat and wait for its ack
    async fn beat(&self) -> GatewayResult<()> {
        let ack = self.expect(EventKind::HeartbeatAck);
        self.send_heartbeat().await?;
        ack.wait().await?;
        trace!("Heartbeat acknowledged");
        Ok(())
    }
}

impl std::fmt::Debug for GatewaySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewaySession")
            .field("state", &self.state())
            .field("sequence", &self.last_sequence())
            .field("session_id", &self.session_id())
            .field("waiters", &self.waiters.lock().len())
            .finish()
    }
}
