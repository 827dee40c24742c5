//! Common types shared by the registry and its listeners.

use odra::prelude::*;
use crate::errors::RegistryError;

/// Longest accepted component name, in bytes
pub const MAX_NAME_LEN: usize = 64;

/// Most listeners a registry will notify
pub const MAX_LISTENERS: usize = 32;

/// A proposed entry waiting for the next commit
#[odra::odra_type]
pub struct StagedEntry {
    /// Logical component name (e.g. "CreditProvider")
    pub name: String,
    /// Address of the live component instance
    pub address: Address,
    /// Whether listeners hear about this entry when it is committed
    pub notify: bool,
}

/// A committed `(name, address)` pair pushed to listeners
#[odra::odra_type]
pub struct AddressChange {
    /// Logical component name
    pub name: String,
    /// Newly committed address
    pub address: Address,
}

/// Alias declaration as returned by the registry views
#[odra::odra_type]
pub struct AliasEntry {
    /// Secondary name
    pub alias: String,
    /// Direct name the alias resolves through
    pub target: String,
}

/// What a name is bound to in the registry.
///
/// Aliases never own an address; they are re-read through their target on
/// every lookup, and a target is always a direct name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    Direct(Address),
    Alias(String),
}

/// Reject empty, blank or oversized names.
pub fn validate_name(name: &str) -> Result<(), RegistryError> {
    if name.trim().is_empty() || name.len() > MAX_NAME_LEN {
        return Err(RegistryError::InvalidName);
    }
    Ok(())
}

/// Insert `entry` into the staged set, replacing a pending entry with the same name in place.
pub fn upsert_staged(staged: &mut Vec<StagedEntry>, entry: StagedEntry) {
    match staged.iter_mut().find(|existing| existing.name == entry.name) {
        Some(existing) => *existing = entry,
        None => staged.push(entry),
    }
}

/// Declare or re-point an alias, keeping first-declaration order.
pub fn upsert_alias(aliases: &mut Vec<AliasEntry>, entry: AliasEntry) {
    match aliases.iter_mut().find(|existing| existing.alias == entry.alias) {
        Some(existing) => existing.target = entry.target,
        None => aliases.push(entry),
    }
}

/// Fold `incoming` changes into an undelivered batch; later addresses win per name.
pub fn merge_changes(pending: &mut Vec<AddressChange>, incoming: &[AddressChange]) {
    for change in incoming {
        match pending.iter_mut().find(|existing| existing.name == change.name) {
            Some(existing) => existing.address = change.address,
            None => pending.push(change.clone()),
        }
    }
}
