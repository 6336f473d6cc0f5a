//! Client dispatcher
//!
//! Routes every gateway event to the callbacks registered for its kind, and
//! performs the client's own work first: on Ready it records the application
//! id and pushes the command set; on an application command interaction it
//! runs the matching command.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use chat_api::HttpClient;
use chat_core::{ApplicationCommandType, DecodeError, Interaction, InteractionType, Snowflake};
use chat_gateway::{Event, EventHandler, EventKind, ReadyEvent};
use futures::future::{join_all, BoxFuture};
use futures::FutureExt;
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::commands::{decode_options, ApplicationCommand, CommandPayload, OptionValue};
use crate::context::SlashCommandContext;
use crate::error::{ClientError, ClientResult};

/// Callback registered for one event kind
pub type EventCallback = Arc<dyn Fn(Arc<Event>) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// Registration bodies split by scope: global first, then per guild
type Partitioned<'a> = (Vec<CommandPayload<'a>>, BTreeMap<Snowflake, Vec<CommandPayload<'a>>>);

/// Event and command dispatcher
pub struct Dispatcher {
    http: Arc<HttpClient>,
    default_guild: Option<Snowflake>,
    handlers: RwLock<HashMap<EventKind, Vec<EventCallback>>>,
    commands: RwLock<BTreeMap<String, Arc<ApplicationCommand>>>,
}

impl Dispatcher {
    pub fn new(http: Arc<HttpClient>, default_guild: Option<Snowflake>) -> Self {
        Self {
            http,
            default_guild,
            handlers: RwLock::new(HashMap::new()),
            commands: RwLock::new(BTreeMap::new()),
        }
    }

    /// Run `callback` for every event of `kind`
    pub fn register<F, Fut>(&self, kind: EventKind, callback: F)
    where
        F: Fn(Arc<Event>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let callback: EventCallback = Arc::new(move |event| callback(event).boxed());
        self.handlers.write().entry(kind).or_default().push(callback);
        debug!(kind = %kind, "Event callback registered");
    }

    /// Add a command; commands without a guild go to the default guild if one is configured
    ///
    /// A command with the same name replaces the earlier one.
    pub fn register_command(&self, mut command: ApplicationCommand) {
        if command.guild_id.is_none() {
            command.guild_id = self.default_guild;
        }
        debug!(name = %command.name, guild_id = ?command.guild_id, "Command registered");
        self.commands.write().insert(command.name.clone(), Arc::new(command));
    }

    pub fn command(&self, name: &str) -> Option<Arc<ApplicationCommand>> {
        self.commands.read().get(name).cloned()
    }

    pub fn command_count(&self) -> usize {
        self.commands.read().len()
    }

    /// Handle one event: client work first, then every callback for its kind
    ///
    /// Callbacks run concurrently and all of them finish before this returns.
    /// The first failure is returned.
    pub async fn dispatch(&self, event: Arc<Event>) -> anyhow::Result<()> {
        let own: anyhow::Result<()> = match &*event {
            Event::Ready(ready) => self.on_ready(ready).await.map_err(Into::into),
            Event::InteractionCreate(interaction) => self.on_interaction(interaction).await,
            _ => Ok(()),
        };

        let callbacks = self.handlers.read().get(&event.kind()).cloned().unwrap_or_default();
        let results = join_all(callbacks.iter().map(|callback| callback(Arc::clone(&event)))).await;

        own?;
        results.into_iter().collect()
    }

    async fn on_ready(&self, ready: &ReadyEvent) -> ClientResult<()> {
        self.http.set_application_id(ready.application.id);
        info!(application_id = %ready.application.id, "Application identified");
        self.push_commands().await
    }

    /// Overwrite the registered command sets: the global set, then each guild's set
    pub async fn push_commands(&self) -> ClientResult<()> {
        if self.http.application_id().is_none() {
            return Err(ClientError::MissingApplicationId);
        }

        let commands = self.commands.read().clone();
        let (global, guilds) = partition_commands(&commands);

        info!(global = global.len(), guilds = guilds.len(), "Pushing application commands");
        self.http.overwrite_global_commands(&global).await?;
        for (guild_id, payloads) in &guilds {
            self.http.overwrite_guild_commands(*guild_id, payloads).await?;
        }
        Ok(())
    }

    async fn on_interaction(&self, interaction: &Interaction) -> anyhow::Result<()> {
        let (command, ctx, args) = self.prepare_invocation(interaction)?;
        let Some(callback) = command.slash_callback() else {
            return Err(ClientError::CommandTypeMismatch(command.name.clone()).into());
        };

        debug!(command = %command.name, user = ?ctx.user().map(|u| u.id), "Invoking command");
        callback(ctx, args).await.map_err(|e| {
            warn!(command = %command.name, error = %e, "Command failed");
            e
        })
    }

    /// Validate an interaction and decode its arguments in declaration order
    fn prepare_invocation(
        &self,
        interaction: &Interaction,
    ) -> ClientResult<(Arc<ApplicationCommand>, SlashCommandContext, Vec<Option<OptionValue>>)> {
        if interaction.kind != InteractionType::ApplicationCommand {
            return Err(DecodeError::UnknownInteractionType(interaction.kind.into()).into());
        }
        let data = interaction.data.as_ref().ok_or(DecodeError::MissingField("data"))?;
        if data.kind != ApplicationCommandType::ChatInput {
            return Err(DecodeError::UnknownCommandType(data.kind.into()).into());
        }

        let mut values = decode_options(&data.options, data.resolved.as_ref())?;

        let command = self
            .command(&data.name)
            .ok_or_else(|| ClientError::CommandNotFound(data.name.clone()))?;

        let args: Vec<_> = command.options.iter().map(|option| values.remove(&option.name)).collect();
        if !values.is_empty() {
            warn!(command = %data.name, extra = values.len(), "Ignoring undeclared options");
        }

        let ctx = SlashCommandContext::new(Arc::clone(&self.http), Arc::new(interaction.clone()));
        Ok((command, ctx, args))
    }
}

/// Split commands by scope, each list in name order
fn partition_commands(commands: &BTreeMap<String, Arc<ApplicationCommand>>) -> Partitioned<'_> {
    let mut global = Vec::new();
    let mut guilds: BTreeMap<Snowflake, Vec<CommandPayload<'_>>> = BTreeMap::new();

    for command in commands.values() {
        match command.guild_id {
            Some(guild_id) => guilds.entry(guild_id).or_default().push(command.payload()),
            None => global.push(command.payload()),
        }
    }
    (global, guilds)
}

#[async_trait]
impl EventHandler for Dispatcher {
    async fn handle(&self, event: Arc<Event>) -> anyhow::Result<()> {
        self.dispatch(event).await
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("default_guild", &self.default_guild)
            .field("handlers", &self.handlers.read().len())
            .field("commands", &self.command_count())
            .finish()
    }
}
