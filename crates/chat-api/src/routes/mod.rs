//! Route definitions
//!
//! Every endpoint the client calls, with its method and path relative to the
//! API base URL.

use chat_core::Snowflake;
use reqwest::Method;

/// A REST endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route<'a> {
    /// `GET /gateway`
    GetGateway,
    /// `POST /applications/{app}/commands`
    CreateGlobalCommand { application_id: Snowflake },
    /// `PUT /applications/{app}/commands`
    OverwriteGlobalCommands { application_id: Snowflake },
    /// `POST /applications/{app}/guilds/{guild}/commands`
    CreateGuildCommand {
        application_id: Snowflake,
        guild_id: Snowflake,
    },
    /// `PUT /applications/{app}/guilds/{guild}/commands`
    OverwriteGuildCommands {
        application_id: Snowflake,
        guild_id: Snowflake,
    },
    /// `POST /interactions/{id}/{token}/callback`
    InteractionCallback {
        interaction_id: Snowflake,
        token: &'a str,
    },
}

impl Route<'_> {
    #[must_use]
    pub fn method(&self) -> Method {
        match self {
            Self::GetGateway => Method::GET,
            Self::OverwriteGlobalCommands { .. } | Self::OverwriteGuildCommands { .. } => Method::PUT,
            Self::CreateGlobalCommand { .. }
            | Self::CreateGuildCommand { .. }
            | Self::InteractionCallback { .. } => Method::POST,
        }
    }

    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::GetGateway => "/gateway".to_string(),
            Self::CreateGlobalCommand { application_id }
            | Self::OverwriteGlobalCommands { application_id } => {
                format!("/applications/{application_id}/commands")
            }
            Self::CreateGuildCommand {
                application_id,
                guild_id,
            }
            | Self::OverwriteGuildCommands {
                application_id,
                guild_id,
            } => format!("/applications/{application_id}/guilds/{guild_id}/commands"),
            Self::InteractionCallback {
                interaction_id,
                token,
            } => format!("/interactions/{interaction_id}/{token}/callback"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_routes() {
        let app = Snowflake::new(11);
        let guild = Snowflake::new(7);

        let route = Route::OverwriteGlobalCommands { application_id: app };
        assert_eq!(route.method(), Method::PUT);
        assert_eq!(route.path(), "/applications/11/commands");

        let route = Route::OverwriteGuildCommands {
            application_id: app,
            guild_id: guild,
        };
        assert_eq!(route.path(), "/applications/11/guilds/7/commands");

        let route = Route::CreateGuildCommand {
            application_id: app,
            guild_id: guild,
        };
        assert_eq!(route.method(), Method::POST);
    }

    #[test]
    fn test_interaction_callback_route() {
        let route = Route::InteractionCallback {
            interaction_id: Snowflake::new(42),
            token: "tok",
        };
        assert_eq!(route.method(), Method::POST);
        assert_eq!(route.path(), "/interactions/42/tok/callback");
    }
}
