//! Verified group membership

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Label reported for users who have not verified yet
pub const UNVERIFIED: &str = "unverified";

/// Platform-assigned user identifier. Doubles as the chat id that
/// deliveries are addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Maps each verified user to the office/store/team they gave
#[derive(Debug, Default, Clone)]
pub struct Directory {
    groups: BTreeMap<UserId, String>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn group_of(&self, user: UserId) -> Option<&str> {
        self.groups.get(&user).map(String::as_str)
    }

    pub fn group_label(&self, user: UserId) -> &str {
        self.group_of(user).unwrap_or(UNVERIFIED)
    }

    pub fn is_verified(&self, user: UserId) -> bool {
        self.groups.contains_key(&user)
    }

    /// Record `user` under `group`. Only the first call per user takes
    /// effect; returns whether an entry was created.
    pub fn verify(&mut self, user: UserId, group: impl Into<String>) -> bool {
        if self.groups.contains_key(&user) {
            return false;
        }
        self.groups.insert(user, group.into());
        true
    }

    /// Verified users in ascending id order
    pub fn members(&self) -> impl Iterator<Item = (UserId, &str)> {
        self.groups.iter().map(|(id, group)| (*id, group.as_str()))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
