//! Permissions bitflags
//!
//! Every flag tests the documented bit position with `1 << bit`.

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

bitflags! {
    /// Guild/channel permission flags
    ///
    /// Serialized as a decimal string on the wire.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Permissions: u64 {
        const CREATE_INSTANT_INVITE      = 1 << 0;
        const KICK_MEMBERS               = 1 << 1;
        const BAN_MEMBERS                = 1 << 2;
        /// Bypasses every other check
        const ADMINISTRATOR              = 1 << 3;
        const MANAGE_CHANNELS            = 1 << 4;
        const MANAGE_GUILD               = 1 << 5;
        const ADD_REACTIONS              = 1 << 6;
        const VIEW_AUDIT_LOG             = 1 << 7;
        const PRIORITY_SPEAKER           = 1 << 8;
        const STREAM                     = 1 << 9;
        const VIEW_CHANNEL               = 1 << 10;
        const SEND_MESSAGES              = 1 << 11;
        const SEND_TTS_MESSAGES          = 1 << 12;
        const MANAGE_MESSAGES            = 1 << 13;
        const EMBED_LINKS                = 1 << 14;
        const ATTACH_FILES               = 1 << 15;
        const READ_MESSAGE_HISTORY       = 1 << 16;
        const MENTION_EVERYONE           = 1 << 17;
        const USE_EXTERNAL_EMOJIS        = 1 << 18;
        const VIEW_GUILD_INSIGHTS        = 1 << 19;
        const CONNECT                    = 1 << 20;
        const SPEAK                      = 1 << 21;
        const MUTE_MEMBERS               = 1 << 22;
        const DEAFEN_MEMBERS             = 1 << 23;
        const MOVE_MEMBERS               = 1 << 24;
        const USE_VAD                    = 1 << 25;
        const CHANGE_NICKNAME            = 1 << 26;
        const MANAGE_NICKNAMES           = 1 << 27;
        const MANAGE_ROLES               = 1 << 28;
        const MANAGE_WEBHOOKS            = 1 << 29;
        const MANAGE_EMOJIS_AND_STICKERS = 1 << 30;
        const USE_APPLICATION_COMMANDS   = 1 << 31;
        const REQUEST_TO_SPEAK           = 1 << 32;
        const MANAGE_EVENTS              = 1 << 33;
        const MANAGE_THREADS             = 1 << 34;
        const CREATE_PUBLIC_THREADS      = 1 << 35;
        const CREATE_PRIVATE_THREADS     = 1 << 36;
        const USE_EXTERNAL_STICKERS      = 1 << 37;
        const SEND_MESSAGES_IN_THREADS   = 1 << 38;
        const START_EMBEDDED_ACTIVITIES  = 1 << 39;
        const MODERATE_MEMBERS           = 1 << 40;
    }
}

impl Permissions {
    /// Check if the permission set contains a required permission
    ///
    /// Administrators bypass all permission checks.
    #[inline]
    pub fn has(&self, permission: Permissions) -> bool {
        if self.contains(Permissions::ADMINISTRATOR) {
            return true;
        }
        self.contains(permission)
    }

    /// Check if the permission set has any of the given permissions
    #[inline]
    pub fn has_any(&self, permissions: Permissions) -> bool {
        if self.contains(Permissions::ADMINISTRATOR) {
            return true;
        }
        self.intersects(permissions)
    }

    /// Parse from string representation (decimal number)
    pub fn parse(s: &str) -> Result<Self, std::num::ParseIntError> {
        s.parse::<u64>().map(Permissions::from_bits_truncate)
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Permissions::empty()
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

impl Serialize for Permissions {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.bits().to_string())
    }
}

// Deserialize from string or number
impl<'de> Deserialize<'de> for Permissions {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct PermissionsVisitor;

        impl Visitor<'_> for PermissionsVisitor {
            type Value = Permissions;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or integer representing permission bits")
            }

            fn visit_u64<E>(self, value: u64) -> Result<Permissions, E>
            where
                E: de::Error,
            {
                Ok(Permissions::from_bits_truncate(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Permissions, E>
            where
                E: de::Error,
            {
                u64::try_from(value)
                    .map(Permissions::from_bits_truncate)
                    .map_err(|_| de::Error::custom("negative permission bits"))
            }

            fn visit_str<E>(self, value: &str) -> Result<Permissions, E>
            where
                E: de::Error,
            {
                Permissions::parse(value).map_err(|_| de::Error::custom("invalid permissions string"))
            }
        }

        deserializer.deserialize_any(PermissionsVisitor)
    }
}

impl From<u64> for Permissions {
    fn from(bits: u64) -> Self {
        Permissions::from_bits_truncate(bits)
    }
}
