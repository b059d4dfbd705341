//! Permission overwrites and desk ownership
//!
//! A desk has no stored owner. Ownership is read off the overwrite set: the
//! owner is the member overwrite (other than the bot's) that grants
//! `MANAGE_CHANNELS`.

use serde::{Deserialize, Serialize};

use crate::value_objects::{Permissions, Snowflake};

/// Subject kind of an overwrite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum OverwriteKind {
    Role,
    Member,
}

impl TryFrom<u8> for OverwriteKind {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Role),
            1 => Ok(Self::Member),
            other => Err(format!("invalid overwrite type: {other}")),
        }
    }
}

impl From<OverwriteKind> for u8 {
    fn from(kind: OverwriteKind) -> Self {
        match kind {
            OverwriteKind::Role => 0,
            OverwriteKind::Member => 1,
        }
    }
}

/// Per-subject allow/deny pair layered over a channel's defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionOverwrite {
    pub id: Snowflake,
    #[serde(rename = "type")]
    pub kind: OverwriteKind,
    #[serde(default)]
    pub allow: Permissions,
    #[serde(default)]
    pub deny: Permissions,
}

impl PermissionOverwrite {
    /// Member overwrite
    #[must_use]
    pub fn member(id: Snowflake, allow: Permissions, deny: Permissions) -> Self {
        Self {
            id,
            kind: OverwriteKind::Member,
            allow,
            deny,
        }
    }

    /// Role overwrite
    #[must_use]
    pub fn role(id: Snowflake, allow: Permissions, deny: Permissions) -> Self {
        Self {
            id,
            kind: OverwriteKind::Role,
            allow,
            deny,
        }
    }

    /// Same subject (kind and id)
    #[inline]
    #[must_use]
    pub fn targets(&self, kind: OverwriteKind, id: Snowflake) -> bool {
        self.kind == kind && self.id == id
    }

    /// Explicitly allows every bit of `permissions` without denying any of them
    #[inline]
    #[must_use]
    pub fn grants(&self, permissions: Permissions) -> bool {
        self.allow.contains(permissions) && !self.deny.intersects(permissions)
    }

    /// Explicitly denies every bit of `permissions` without allowing any of them
    #[inline]
    #[must_use]
    pub fn revokes(&self, permissions: Permissions) -> bool {
        self.deny.contains(permissions) && !self.allow.intersects(permissions)
    }
}

/// Find the first overwrite for a subject
#[must_use]
pub fn find_overwrite(
    overwrites: &[PermissionOverwrite],
    kind: OverwriteKind,
    id: Snowflake,
) -> Option<&PermissionOverwrite> {
    overwrites.iter().find(|ow| ow.targets(kind, id))
}

fn is_owner_overwrite(ow: &PermissionOverwrite, bot_id: Snowflake) -> bool {
    ow.kind == OverwriteKind::Member
        && ow.id != bot_id
        && ow.allow.contains(Permissions::MANAGE_CHANNELS)
}

/// Every subject that qualifies as a desk owner, in ascending id order
///
/// More than one entry means the channel was edited by hand into an
/// ambiguous state.
#[must_use]
pub fn owner_candidates(overwrites: &[PermissionOverwrite], bot_id: Snowflake) -> Vec<Snowflake> {
    let mut candidates: Vec<Snowflake> = overwrites
        .iter()
        .filter(|ow| is_owner_overwrite(ow, bot_id))
        .map(|ow| ow.id)
        .collect();
    candidates.sort_unstable();
    candidates.dedup();
    candidates
}

/// Derive the owner of a desk from its overwrite set
///
/// Total and side-effect free. When several member overwrites qualify, the
/// lowest subject id wins, so the answer never depends on the order the
/// platform returned the overwrites in.
#[must_use]
pub fn channel_owner(overwrites: &[PermissionOverwrite], bot_id: Snowflake) -> Option<Snowflake> {
    overwrites
        .iter()
        .filter(|ow| is_owner_overwrite(ow, bot_id))
        .map(|ow| ow.id)
        .min()
}

/// Merge an update into an overwrite set
///
/// Bits in `update.allow` become allowed (and are cleared from deny), bits in
/// `update.deny` become denied (and are cleared from allow). All other bits and
/// all other subjects are left as they were. A subject without an overwrite
/// gets `update` appended.
#[must_use]
pub fn merge_overwrite(
    overwrites: &[PermissionOverwrite],
    update: PermissionOverwrite,
) -> Vec<PermissionOverwrite> {
    let mut merged = overwrites.to_vec();

    match merged.iter_mut().find(|ow| ow.targets(update.kind, update.id)) {
        Some(existing) => {
            existing.allow = (existing.allow | update.allow) - update.deny;
            existing.deny = (existing.deny | update.deny) - update.allow;
        }
        None => merged.push(update),
    }

    merged
}
