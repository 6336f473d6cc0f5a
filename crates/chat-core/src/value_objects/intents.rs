//! Gateway intents - the capability bitmask sent at identify time

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

bitflags! {
    /// Event categories the gateway should deliver to this session
    ///
    /// Each intent occupies its documented bit; the identify payload carries the
    /// OR of all requested intents as an integer.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Intents: u64 {
        const GUILDS                    = 1 << 0;
        const GUILD_MEMBERS             = 1 << 1;
        const GUILD_BANS                = 1 << 2;
        const GUILD_EMOJIS_AND_STICKERS = 1 << 3;
        const GUILD_INTEGRATIONS        = 1 << 4;
        const GUILD_WEBHOOKS            = 1 << 5;
        const GUILD_INVITES             = 1 << 6;
        const GUILD_VOICE_STATES        = 1 << 7;
        const GUILD_PRESENCES           = 1 << 8;
        const GUILD_MESSAGES            = 1 << 9;
        const GUILD_MESSAGE_REACTIONS   = 1 << 10;
        const GUILD_MESSAGE_TYPING      = 1 << 11;
        const DIRECT_MESSAGES           = 1 << 12;
        const DIRECT_MESSAGE_REACTIONS  = 1 << 13;
        const DIRECT_MESSAGE_TYPING     = 1 << 14;
        const GUILD_SCHEDULED_EVENTS    = 1 << 16;
    }
}

impl Intents {
    /// Intents that do not require opting in on the developer portal
    pub fn non_privileged() -> Self {
        Self::all() - Self::GUILD_MEMBERS - Self::GUILD_PRESENCES
    }

    /// Integer value sent in the identify payload
    #[inline]
    pub fn value(self) -> u64 {
        self.bits()
    }
}

// Integer wire form; unknown bits are dropped
impl Serialize for Intents {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(self.bits())
    }
}

impl<'de> Deserialize<'de> for Intents {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Self::from_bits_truncate)
    }
}
