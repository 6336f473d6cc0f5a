//! Invocation context handed to slash command callbacks

use std::sync::Arc;

use chat_api::{HttpClient, HttpResult, InteractionResponse};
use chat_core::{Interaction, SendMessage, Snowflake, User};
use tracing::debug;

/// One slash command invocation
///
/// Cheap to clone; the interaction is shared.
#[derive(Debug, Clone)]
pub struct SlashCommandContext {
    http: Arc<HttpClient>,
    interaction: Arc<Interaction>,
}

impl SlashCommandContext {
    pub fn new(http: Arc<HttpClient>, interaction: Arc<Interaction>) -> Self {
        Self { http, interaction }
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    /// Name of the invoked command
    pub fn command_name(&self) -> &str {
        self.interaction.data.as_ref().map_or("", |data| data.name.as_str())
    }

    pub fn guild_id(&self) -> Option<Snowflake> {
        self.interaction.guild_id
    }

    pub fn channel_id(&self) -> Option<Snowflake> {
        self.interaction.channel_id
    }

    /// The user who invoked the command
    pub fn user(&self) -> Option<&User> {
        self.interaction.invoker()
    }

    pub fn http(&self) -> &Arc<HttpClient> {
        &self.http
    }

    /// Reply with a message
    pub async fn respond(&self, message: SendMessage) -> HttpResult<()> {
        debug!(command = self.command_name(), "Responding to command");
        self.http
            .respond_to_interaction(self.interaction.id, &self.interaction.token, &InteractionResponse::message(message))
            .await
    }

    /// Acknowledge now and reply later; the user sees a loading state
    pub async fn defer(&self) -> HttpResult<()> {
        debug!(command = self.command_name(), "Deferring command response");
        self.http
            .respond_to_interaction(self.interaction.id, &self.interaction.token, &InteractionResponse::deferred())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accessors() {
        let interaction: Interaction = serde_json::from_value(json!({
            "id": "900",
            "application_id": "11",
            "type": 2,
            "token": "tok",
            "channel_id": "8",
            "user": {"id": "1", "username": "alice", "discriminator": "0001"},
            "data": {"id": "500", "name": "ping", "type": 1}
        }))
        .unwrap();
        let http = Arc::new(HttpClient::with_client(reqwest::Client::new(), "http://127.0.0.1:9"));
        let ctx = SlashCommandContext::new(http, Arc::new(interaction));

        assert_eq!(ctx.command_name(), "ping");
        assert_eq!(ctx.channel_id(), Some(Snowflake::new(8)));
        assert_eq!(ctx.guild_id(), None);
        assert_eq!(ctx.user().map(|u| u.username.as_str()), Some("alice"));
    }
}
