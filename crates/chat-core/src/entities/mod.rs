//! Entities - typed mirrors of the remote JSON objects
//!
//! Flat structs with explicit optional fields. Absent optional keys decode to
//! `None`/defaults; absent required keys fail decoding.

mod application;
mod channel;
mod embed;
mod guild;
mod interaction;
mod member;
mod message;
mod role;
mod user;

pub use application::Application;
pub use channel::{Channel, ChannelType};
pub use embed::{Embed, EmbedFooter, EmbedImage, EmbedThumbnail};
pub use guild::{Guild, UnavailableGuild};
pub use interaction::{
    ApplicationCommandType, CommandOptionType, Interaction, InteractionData, InteractionDataOption,
    InteractionType, ResolvedData,
};
pub use member::GuildMember;
pub use message::{Message, MessageFlags, SendMessage};
pub use role::Role;
pub use user::{PremiumType, User};
