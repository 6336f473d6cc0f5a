//! REST client
//!
//! One `reqwest::Client` with the bot authorization baked into its default
//! headers. Failure statuses are mapped to [`HttpError`] before any body is
//! decoded.

use std::time::Duration;

use chat_common::ClientConfig;
use chat_core::Snowflake;
use parking_lot::RwLock;
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{HttpError, HttpResult};
use crate::response::InteractionResponse;
use crate::routes::Route;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct GatewayInfo {
    url: String,
}

/// Client for the platform's HTTP API
#[derive(Debug)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: String,
    application_id: RwLock<Option<Snowflake>>,
}

impl HttpClient {
    /// Build a client from configuration
    pub fn new(config: &ClientConfig) -> HttpResult<Self> {
        let user_agent = format!(
            "{} (chat-sdk, {})",
            config.client_name,
            env!("CARGO_PKG_VERSION")
        );
        let client = reqwest::Client::builder()
            .default_headers(default_headers(&config.token)?)
            .user_agent(user_agent)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self::with_client(client, &config.api_base_url))
    }

    /// Wrap a preconfigured `reqwest::Client`; it must already carry authorization
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            application_id: RwLock::new(None),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn application_id(&self) -> Option<Snowflake> {
        *self.application_id.read()
    }

    /// Record the application identity learned from the ready event
    pub fn set_application_id(&self, id: Snowflake) {
        *self.application_id.write() = Some(id);
    }

    fn require_application_id(&self) -> HttpResult<Snowflake> {
        self.application_id().ok_or(HttpError::MissingApplicationId)
    }

    /// Send a request and return the raw body of a successful response
    async fn request(&self, route: Route<'_>, body: Option<Value>) -> HttpResult<String> {
        let path = route.path();
        let url = format!("{}{}", self.base_url, path);
        debug!(method = %route.method(), path = %path, "Sending request");

        let mut builder = self.client.request(route.method(), &url);
        if let Some(body) = &body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if let Some(err) = HttpError::from_status(status, path, &text) {
            warn!(status = status.as_u16(), error = %err, "Request failed");
            return Err(err);
        }

        debug!(status = status.as_u16(), "Request succeeded");
        Ok(text)
    }

    async fn request_json<T: DeserializeOwned>(
        &self,
        route: Route<'_>,
        body: Option<Value>,
    ) -> HttpResult<T> {
        let text = self.request(route, body).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Discover the gateway websocket URL
    pub async fn get_gateway_url(&self) -> HttpResult<String> {
        let info: GatewayInfo = self.request_json(Route::GetGateway, None).await?;
        Ok(info.url)
    }

    /// Create or update one global command
    pub async fn create_global_command<C: Serialize + ?Sized>(&self, command: &C) -> HttpResult<Value> {
        let application_id = self.require_application_id()?;
        info!("Registering global command");
        self.request_json(
            Route::CreateGlobalCommand { application_id },
            Some(serde_json::to_value(command)?),
        )
        .await
    }

    /// Create or update one command in a single guild
    pub async fn create_guild_command<C: Serialize + ?Sized>(
        &self,
        guild_id: Snowflake,
        command: &C,
    ) -> HttpResult<Value> {
        let application_id = self.require_application_id()?;
        info!(guild_id = %guild_id, "Registering guild command");
        self.request_json(
            Route::CreateGuildCommand {
                application_id,
                guild_id,
            },
            Some(serde_json::to_value(command)?),
        )
        .await
    }

    /// Replace the whole global command set
    pub async fn overwrite_global_commands<C: Serialize>(&self, commands: &[C]) -> HttpResult<Vec<Value>> {
        let application_id = self.require_application_id()?;
        info!(count = commands.len(), "Overwriting global commands");
        self.request_json(
            Route::OverwriteGlobalCommands { application_id },
            Some(serde_json::to_value(commands)?),
        )
        .await
    }

    /// Replace the whole command set of one guild
    pub async fn overwrite_guild_commands<C: Serialize>(
        &self,
        guild_id: Snowflake,
        commands: &[C],
    ) -> HttpResult<Vec<Value>> {
        let application_id = self.require_application_id()?;
        info!(guild_id = %guild_id, count = commands.len(), "Overwriting guild commands");
        self.request_json(
            Route::OverwriteGuildCommands {
                application_id,
                guild_id,
            },
            Some(serde_json::to_value(commands)?),
        )
        .await
    }

    /// Answer an interaction received from the gateway
    pub async fn respond_to_interaction(
        &self,
        interaction_id: Snowflake,
        token: &str,
        response: &InteractionResponse,
    ) -> HttpResult<()> {
        debug!(interaction_id = %interaction_id, kind = response.kind.code(), "Responding to interaction");
        self.request(
            Route::InteractionCallback {
                interaction_id,
                token,
            },
            Some(serde_json::to_value(response)?),
        )
        .await?;
        Ok(())
    }
}

/// Authorization header value for a bot token
pub fn authorization(token: &str) -> String {
    let token = token.trim();
    if token.starts_with("Bot ") || token.starts_with("Bearer ") {
        token.to_string()
    } else {
        format!("Bot {token}")
    }
}

fn default_headers(token: &str) -> HttpResult<HeaderMap> {
    let mut auth =
        HeaderValue::from_str(&authorization(token)).map_err(|_| HttpError::InvalidToken)?;
    auth.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(header::AUTHORIZATION, auth);
    headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_prefix() {
        assert_eq!(authorization("abc"), "Bot abc");
        assert_eq!(authorization("Bot abc"), "Bot abc");
        assert_eq!(authorization("Bearer xyz"), "Bearer xyz");
        assert_eq!(authorization(" abc\n"), "Bot abc");
    }

    #[test]
    fn test_invalid_token_header() {
        assert!(matches!(default_headers("bad\ntoken"), Err(HttpError::InvalidToken)));
    }

    #[test]
    fn test_application_id_required() {
        let client = HttpClient::new(&ClientConfig::new("abc")).unwrap();
        assert!(client.application_id().is_none());
        assert!(matches!(
            client.require_application_id(),
            Err(HttpError::MissingApplicationId)
        ));

        client.set_application_id(Snowflake::new(11));
        assert_eq!(client.application_id(), Some(Snowflake::new(11)));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = HttpClient::with_client(reqwest::Client::new(), "http://127.0.0.1:1/api/");
        assert_eq!(client.base_url(), "http://127.0.0.1:1/api");
    }

    #[tokio::test]
    async fn test_overwrite_without_application_id() {
        let client = HttpClient::with_client(reqwest::Client::new(), "http://127.0.0.1:1");
        let result = client.overwrite_global_commands::<Value>(&[]).await;
        assert!(matches!(result, Err(HttpError::MissingApplicationId)));
    }
}
