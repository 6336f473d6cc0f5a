//! # chat-core
//!
//! Data model for the chat platform: ids, flag sets, and the entity structs that
//! mirror the remote JSON schemas. Pure data; decoding validates required keys and
//! reports [`DecodeError`] instead of faulting on a missing field.

pub mod entities;
pub mod error;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    Application, ApplicationCommandType, Channel, ChannelType, CommandOptionType, Embed,
    EmbedFooter, EmbedImage, EmbedThumbnail, Guild,
    GuildMember, Interaction, InteractionData, InteractionDataOption, InteractionType, Message,
    MessageFlags, PremiumType, ResolvedData, Role, SendMessage, UnavailableGuild, User,
};
pub use error::{DecodeError, DecodeResult};
pub use value_objects::{Intents, Permissions, Snowflake, SnowflakeParseError, UserFlags};
