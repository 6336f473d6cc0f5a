//! Bot client
//!
//! Wires the REST client, the gateway session, the supervisor and the
//! dispatcher together.

use std::future::Future;
use std::sync::Arc;

use chat_api::HttpClient;
use chat_common::ClientConfig;
use chat_gateway::{Event, EventKind, EventRegistry, GatewayError, GatewaySession, SessionState, Supervisor};
use tracing::{info, warn};

use crate::commands::ApplicationCommand;
use crate::dispatcher::Dispatcher;
use crate::error::{ClientError, ClientResult};

/// A connected or connectable bot
#[derive(Debug)]
pub struct Client {
    http: Arc<HttpClient>,
    dispatcher: Arc<Dispatcher>,
    supervisor: Arc<Supervisor>,
    session: Arc<GatewaySession>,
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub fn http(&self) -> &Arc<HttpClient> {
        &self.http
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub fn session(&self) -> &Arc<GatewaySession> {
        &self.session
    }

    pub fn supervisor(&self) -> &Arc<Supervisor> {
        &self.supervisor
    }

    /// Run `callback` for every event of `kind`
    pub fn register<F, Fut>(&self, kind: EventKind, callback: F)
    where
        F: Fn(Arc<Event>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.dispatcher.register(kind, callback);
    }

    /// Register an application command; it is pushed on the next Ready
    pub fn register_command(&self, command: ApplicationCommand) {
        self.dispatcher.register_command(command);
    }

    /// Discover the gateway, run the handshake and return the Ready event
    pub async fn connect(&self) -> ClientResult<Arc<Event>> {
        let url = self.http.get_gateway_url().await?;
        Ok(self.session.connect(&url).await?)
    }

    /// Supervise the session until a critical unit fails or the client is closed
    pub async fn run(&self) -> ClientResult<()> {
        Ok(self.supervisor.run_forever().await?)
    }

    /// Connect and run; the client is closed however this ends
    pub async fn start(&self) -> ClientResult<()> {
        let result = match self.connect().await {
            Ok(_) => self.run().await,
            Err(e) => Err(e),
        };

        if let Err(e) = self.close().await {
            warn!(error = %e, "Failed to close client");
        }
        result
    }

    /// Close the gateway connection and stop every supervised unit
    pub async fn close(&self) -> ClientResult<()> {
        match self.session.close().await {
            Ok(()) | Err(GatewayError::NotConnected) => {}
            Err(e) => return Err(e.into()),
        }
        self.supervisor.shutdown().await;
        info!(failures = self.supervisor.failures(), "Client closed");
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.session.state() == SessionState::Ready
    }
}

/// Builder for [`Client`]
#[derive(Debug, Default)]
pub struct ClientBuilder {
    config: Option<ClientConfig>,
    registry: Option<EventRegistry>,
    http: Option<HttpClient>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Replace the standard event registry
    pub fn registry(mut self, registry: EventRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Use a preconfigured REST client instead of one built from the config
    pub fn http(mut self, http: HttpClient) -> Self {
        self.http = Some(http);
        self
    }

    /// Build the client
    ///
    /// # Errors
    /// Returns `ClientError::Incomplete` without a config, or an HTTP error if
    /// the REST client cannot be built
    pub fn build(self) -> ClientResult<Client> {
        let config = self.config.ok_or(ClientError::Incomplete("config"))?;
        let http = match self.http {
            Some(http) => http,
            None => HttpClient::new(&config)?,
        };
        let http = Arc::new(http);

        let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&http), config.default_guild_id));
        let supervisor = Arc::new(Supervisor::new());
        let registry = Arc::new(self.registry.unwrap_or_else(EventRegistry::standard));
        let session = GatewaySession::new(
            &config,
            registry,
            Arc::clone(&supervisor),
            Arc::clone(&dispatcher) as Arc<dyn chat_gateway::EventHandler>,
        );

        Ok(Client {
            http,
            dispatcher,
            supervisor,
            session,
        })
    }
}
