//! Application command declarations

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use chat_core::{ApplicationCommandType, Snowflake};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Serialize;

use super::{CommandOption, OptionValue};
use crate::context::SlashCommandContext;

/// Slash command callback
///
/// Receives the invocation context and one argument per declared option, in
/// declaration order; options the user omitted arrive as `None`.
pub type CommandCallback =
    Arc<dyn Fn(SlashCommandContext, Vec<Option<OptionValue>>) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// A command the application registers with the platform
#[derive(Clone)]
pub struct ApplicationCommand {
    pub kind: ApplicationCommandType,
    pub name: String,
    pub description: String,
    pub default_permission: bool,
    /// Guild the command is scoped to; `None` registers it globally
    pub guild_id: Option<Snowflake>,
    pub options: Vec<CommandOption>,
    callback: Option<CommandCallback>,
}

/// Registration body for one command
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandPayload<'a> {
    #[serde(rename = "type")]
    pub kind: ApplicationCommandType,
    pub name: &'a str,
    pub description: &'a str,
    pub default_permission: bool,
    #[serde(skip_serializing_if = "no_options")]
    pub options: &'a [CommandOption],
}

fn no_options(options: &&[CommandOption]) -> bool {
    options.is_empty()
}

impl ApplicationCommand {
    fn new(kind: ApplicationCommandType, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            description: description.into(),
            default_permission: true,
            guild_id: None,
            options: Vec::new(),
            callback: None,
        }
    }

    /// Declare a chat-input command
    pub fn slash<F, Fut>(name: impl Into<String>, description: impl Into<String>, callback: F) -> Self
    where
        F: Fn(SlashCommandContext, Vec<Option<OptionValue>>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let mut command = Self::new(ApplicationCommandType::ChatInput, name, description);
        command.callback = Some(Arc::new(move |ctx, args| callback(ctx, args).boxed()));
        command
    }

    /// Declare a user context-menu command
    ///
    /// Context-menu commands are registered but never invoked as slash commands.
    pub fn user(name: impl Into<String>) -> Self {
        Self::new(ApplicationCommandType::User, name, "")
    }

    /// Declare a message context-menu command
    pub fn message(name: impl Into<String>) -> Self {
        Self::new(ApplicationCommandType::Message, name, "")
    }

    #[must_use]
    pub fn guild(mut self, guild_id: Snowflake) -> Self {
        self.guild_id = Some(guild_id);
        self
    }

    #[must_use]
    pub fn default_permission(mut self, enabled: bool) -> Self {
        self.default_permission = enabled;
        self
    }

    #[must_use]
    pub fn option(mut self, option: CommandOption) -> Self {
        self.options.push(option);
        self
    }

    /// Callback, for commands that can be invoked as slash commands
    pub fn slash_callback(&self) -> Option<&CommandCallback> {
        match self.kind {
            ApplicationCommandType::ChatInput => self.callback.as_ref(),
            _ => None,
        }
    }

    pub fn payload(&self) -> CommandPayload<'_> {
        CommandPayload {
            kind: self.kind,
            name: &self.name,
            description: &self.description,
            default_permission: self.default_permission,
            options: &self.options,
        }
    }
}

impl fmt::Debug for ApplicationCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplicationCommand")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("guild_id", &self.guild_id)
            .field("options", &self.options.len())
            .finish()
    }
}
