//! Value objects - immutable types that represent wire-level concepts

mod intents;
mod permissions;
mod snowflake;
mod user_flags;

pub use intents::Intents;
pub use permissions::Permissions;
pub use snowflake::{Snowflake, SnowflakeParseError};
pub use user_flags::UserFlags;
