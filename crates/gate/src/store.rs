//! Credential store: the two session slots held for one client.

use crate::refresh::RefreshedTokens;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Named credential slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slot {
    /// Short-lived access token.
    Access,
    /// Long-lived refresh token.
    Refresh,
}

/// Credential pair issued on login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// Session-scoped key-value store for the two credential slots.
///
/// Last write wins, and a write is visible to the next read in the same
/// request pass.
pub trait CredentialStore: Send {
    /// Read a slot.
    fn get(&self, slot: Slot) -> Option<String>;

    /// Overwrite a slot.
    fn set(&mut self, slot: Slot, token: &str);

    /// Clear a slot.
    fn delete(&mut self, slot: Slot);

    /// Store both credentials from a successful login.
    fn sign_in(&mut self, tokens: &SessionTokens) {
        self.set(Slot::Access, &tokens.access_token);
        self.set(Slot::Refresh, &tokens.refresh_token);
    }

    /// Clear both credentials.
    fn sign_out(&mut self) {
        self.delete(Slot::Access);
        self.delete(Slot::Refresh);
    }

    /// Store the result of a refresh. The refresh slot only changes when the
    /// endpoint rotated it.
    fn apply_refresh(&mut self, tokens: &RefreshedTokens) {
        self.set(Slot::Access, &tokens.access_token);
        if let Some(refresh) = &tokens.refresh_token {
            self.set(Slot::Refresh, refresh);
        }
    }
}

/// In-memory credential store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: BTreeMap<Slot, String>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style slot assignment.
    pub fn with(mut self, slot: Slot, token: impl Into<String>) -> Self {
        self.slots.insert(slot, token.into());
        self
    }

    /// Whether both slots are empty.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, slot: Slot) -> Option<String> {
        self.slots.get(&slot).cloned()
    }

    fn set(&mut self, slot: Slot, token: &str) {
        self.slots.insert(slot, token.to_owned());
    }

    fn delete(&mut self, slot: Slot) {
        self.slots.remove(&slot);
    }
}

impl<S: CredentialStore + ?Sized> CredentialStore for &mut S {
    fn get(&self, slot: Slot) -> Option<String> {
        (**self).get(slot)
    }

    fn set(&mut self, slot: Slot, token: &str) {
        (**self).set(slot, token)
    }

    fn delete(&mut self, slot: Slot) {
        (**self).delete(slot)
    }
}
