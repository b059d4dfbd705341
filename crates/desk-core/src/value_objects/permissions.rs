//! Permissions bitflags for channel access control
//!
//! Bit positions follow the platform's permission integer so values can be
//! sent to and read from the REST API unchanged.

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

bitflags! {
    /// Platform permission flags
    ///
    /// Serialized as a decimal string in JSON, as the platform does.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Permissions: u64 {
        /// Create instant invites
        const CREATE_INSTANT_INVITE = 1 << 0;
        /// Bypass all permission checks
        const ADMINISTRATOR    = 1 << 3;
        /// Create, edit, delete channels (and their overwrites)
        const MANAGE_CHANNELS  = 1 << 4;
        /// Edit guild settings
        const MANAGE_GUILD     = 1 << 5;
        /// View channel
        const VIEW_CHANNEL     = 1 << 10;
        /// Send messages in text channels
        const SEND_MESSAGES    = 1 << 11;
        /// Join a voice channel
        const CONNECT          = 1 << 20;
        /// Speak in a voice channel
        const SPEAK            = 1 << 21;
        /// Move members between voice channels
        const MOVE_MEMBERS     = 1 << 24;
        /// Edit role and member overwrites
        const MANAGE_ROLES     = 1 << 28;

        /// Granted to the owner of a desk
        const DESK_OWNER = Self::VIEW_CHANNEL.bits() | Self::MANAGE_CHANNELS.bits();

        /// Granted to the bot on every desk it manages
        const DESK_BOT = Self::VIEW_CHANNEL.bits();
    }
}

impl Permissions {
    /// Check if the permission set has all of the given permissions
    #[inline]
    pub fn has_all(&self, permissions: Permissions) -> bool {
        self.contains(permissions)
    }

    /// Combine several permission sets
    pub fn combine<I>(sets: I) -> Self
    where
        I: IntoIterator<Item = Permissions>,
    {
        sets.into_iter().fold(Permissions::empty(), |acc, p| acc | p)
    }

    /// Parse from string representation (decimal number)
    ///
    /// Unknown bits are kept, so flags this crate does not name survive a
    /// read-modify-write of an overwrite.
    pub fn parse(s: &str) -> Result<Self, std::num::ParseIntError> {
        s.parse::<u64>().map(Permissions::from_bits_retain)
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

            fn visit_i64<E>(self, value: i64) -> Result<Permissions, E>
            where
                E: de::Error,
            {
                u64::try_from(value)
                    .map(Permissions::from_bits_retain)
                    .map_err(|_| de::Error::custom("negative permission bits"))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Permissions, E>
            where
                E: de::Error,
            {
                Ok(Permissions::from_bits_retain(value))
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
        Permissions::from_bits_retain(bits)
    }
}

impl From<Permissions> for u64 {
    fn from(perms: Permissions) -> Self {
        perms.bits()
    }
}
