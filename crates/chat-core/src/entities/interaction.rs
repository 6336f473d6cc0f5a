//! Interaction entities - application command invocations and their resolved data

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entities::{Channel, GuildMember, Role, User};
use crate::value_objects::Snowflake;

macro_rules! wire_code_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident = $code:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "u8", into = "u8")]
        pub enum $name {
            $($variant,)+
            /// A code newer than this library
            Unknown(u8),
        }

        impl From<u8> for $name {
            fn from(value: u8) -> Self {
                match value {
                    $($code => Self::$variant,)+
                    other => Self::Unknown(other),
                }
            }
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> Self {
                match value {
                    $($name::$variant => $code,)+
                    $name::Unknown(other) => other,
                }
            }
        }
    };
}

wire_code_enum! {
    /// Interaction type
    InteractionType {
        Ping = 1,
        ApplicationCommand = 2,
        MessageComponent = 3,
        ApplicationCommandAutocomplete = 4,
        ModalSubmit = 5,
    }
}

wire_code_enum! {
    /// Application command type
    ApplicationCommandType {
        ChatInput = 1,
        User = 2,
        Message = 3,
    }
}

wire_code_enum! {
    /// Application command option type
    CommandOptionType {
        SubCommand = 1,
        SubCommandGroup = 2,
        String = 3,
        Integer = 4,
        Boolean = 5,
        User = 6,
        Channel = 7,
        Role = 8,
        Mentionable = 9,
        Number = 10,
        Attachment = 11,
    }
}

/// Entities referenced by id from command options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedData {
    #[serde(default)]
    pub users: HashMap<Snowflake, User>,
    #[serde(default)]
    pub members: HashMap<Snowflake, GuildMember>,
    #[serde(default)]
    pub roles: HashMap<Snowflake, Role>,
    #[serde(default)]
    pub channels: HashMap<Snowflake, Channel>,
}

/// One option value supplied by the invoking user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionDataOption {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: CommandOptionType,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub options: Vec<InteractionDataOption>,
    #[serde(default)]
    pub focused: Option<bool>,
}

/// Command invocation data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionData {
    pub id: Snowflake,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ApplicationCommandType,
    #[serde(default)]
    pub resolved: Option<ResolvedData>,
    #[serde(default)]
    pub options: Vec<InteractionDataOption>,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
    /// Target user or message of a context-menu command
    #[serde(default)]
    pub target_id: Option<Snowflake>,
}

/// An interaction delivered by INTERACTION_CREATE
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub id: Snowflake,
    pub application_id: Snowflake,
    #[serde(rename = "type")]
    pub kind: InteractionType,
    #[serde(default)]
    pub data: Option<InteractionData>,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
    #[serde(default)]
    pub channel_id: Option<Snowflake>,
    /// Present when invoked in a guild
    #[serde(default)]
    pub member: Option<GuildMember>,
    /// Present when invoked in a DM
    #[serde(default)]
    pub user: Option<User>,
    pub token: String,
    #[serde(default)]
    pub version: u8,
    #[serde(default)]
    pub locale: Option<String>,
}

impl Interaction {
    /// The invoking user, from `member.user` in guilds or `user` in DMs
    pub fn invoker(&self) -> Option<&User> {
        self.member
            .as_ref()
            .and_then(|m| m.user.as_ref())
            .or(self.user.as_ref())
    }
}
