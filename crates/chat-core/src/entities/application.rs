//! Application entity - the bot's own application identity

use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Partial application object, as delivered in the READY event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: Snowflake,
    #[serde(default)]
    pub flags: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
}
