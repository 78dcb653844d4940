use crate::constants::{ADMINISTRATOR, ARTIST, CONTENT_MANAGER, MODERATOR, PROVIDER};
use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::Debug;

bitflags! {
    /// The set of roles granted to a user account.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct RoleSet: u32 {
        const ARTIST = 1 << 0;
        const PROVIDER = 1 << 1;
        const MODERATOR = 1 << 2;
        const ADMINISTRATOR = 1 << 3;
        const CONTENT_MANAGER = 1 << 4;

        const ALL = Self::ARTIST.bits()
            | Self::PROVIDER.bits()
            | Self::MODERATOR.bits()
            | Self::ADMINISTRATOR.bits()
            | Self::CONTENT_MANAGER.bits();
    }
}

impl RoleSet {
    /// Number of distinct roles in the set.
    #[must_use]
    pub fn count(self) -> u32 {
        self.bits().count_ones()
    }

    /// Names of the contained roles, for audit output and email templates.
    #[must_use]
    pub fn names(self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.contains(Self::ARTIST) {
            names.push(ARTIST);
        }
        if self.contains(Self::PROVIDER) {
            names.push(PROVIDER);
        }
        if self.contains(Self::MODERATOR) {
            names.push(MODERATOR);
        }
        if self.contains(Self::ADMINISTRATOR) {
            names.push(ADMINISTRATOR);
        }
        if self.contains(Self::CONTENT_MANAGER) {
            names.push(CONTENT_MANAGER);
        }
        names
    }
}

impl From<&str> for RoleSet {
    fn from(s: &str) -> Self {
        match s {
            ARTIST => Self::ARTIST,
            PROVIDER => Self::PROVIDER,
            MODERATOR => Self::MODERATOR,
            ADMINISTRATOR => Self::ADMINISTRATOR,
            CONTENT_MANAGER => Self::CONTENT_MANAGER,
            "all" | "*" => Self::ALL,
            _ => Self::empty(),
        }
    }
}

impl From<u32> for RoleSet {
    fn from(bits: u32) -> Self {
        Self::from_bits_truncate(bits)
    }
}

impl Serialize for RoleSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u32(self.bits())
    }
}

impl<'de> Deserialize<'de> for RoleSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = u32::deserialize(deserializer)?;
        Ok(Self::from_bits_retain(bits))
    }
}
