//! Application command declarations
//!
//! Commands are declared with builders, serialized to the registration wire
//! format, and matched against incoming interactions by name.

mod command;
mod option;
mod value;

pub use command::{ApplicationCommand, CommandCallback, CommandPayload};
pub use option::{CommandOption, OptionChoice};
pub use value::{decode_options, OptionValue};
