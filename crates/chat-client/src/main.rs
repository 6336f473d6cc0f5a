//! Example bot
//!
//! Run with:
//! ```bash
//! BOT_TOKEN=... cargo run -p chat-client --bin chat-bot
//! ```
//!
//! Configuration is loaded from environment variables.

use chat_client::{ApplicationCommand, Client, CommandOption, EventKind};
use chat_common::{try_init_tracing, ClientConfig};
use chat_core::SendMessage;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = try_init_tracing() {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    if let Err(e) = run().await {
        error!(error = %e, "Bot stopped");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ClientConfig::from_env().map_err(|e| {
        error!(error = %e, "Failed to load configuration");
        e
    })?;

    info!(
        api = %config.api_base_url,
        gateway_version = config.gateway_version,
        default_guild = ?config.default_guild_id,
        "Configuration loaded"
    );

    let client = Client::builder().config(config).build()?;

    client.register(EventKind::Ready, |event| async move {
        if let Some(ready) = event.as_ready() {
            info!(user = %ready.user.tag(), guilds = ready.guilds.len(), "Logged in");
        }
        Ok(())
    });

    client.register_command(
        ApplicationCommand::slash("ping", "Check that the bot is alive", |ctx, args| async move {
            let reply = match args.first().and_then(Option::as_ref).and_then(|v| v.as_str()) {
                Some(text) => format!("Pong: {text}"),
                None => "Pong!".to_string(),
            };
            ctx.respond(SendMessage::text(reply)).await?;
            Ok(())
        })
        .option(CommandOption::string("text", "Text to echo back").optional()),
    );

    client.start().await?;
    Ok(())
}
