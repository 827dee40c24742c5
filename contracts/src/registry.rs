//! Registry contract: name-to-address resolution with staged commits.
//!
//! Deployment scripts stage the addresses of freshly deployed components,
//! declare aliases for logical roles, and commit once per deployment epoch.
//! Committed changes flagged `notify` are queued per listener and pushed to
//! each listener by a separate `deliver_notifications` call, so one failing
//! listener never undoes a commit or blocks the others.

use odra::prelude::*;
use odra::casper_types::{RuntimeArgs, runtime_args};
use odra::CallDef;
use crate::errors::RegistryError;
use crate::events::{
    AddressStaged, AliasAdded, AliasDropped, Committed, ListenerRegistered, ListenerUnregistered,
    NotificationsDelivered, OwnershipTransferred, StagedDiscarded,
};
use crate::interfaces::REFRESH_ENTRY_POINT;
use crate::types::{
    merge_changes, upsert_alias, upsert_staged, validate_name, AddressChange, AliasEntry, Binding,
    StagedEntry, MAX_LISTENERS,
};

/// Registry contract for protocol component addresses
#[odra::module(events = [
    AddressStaged,
    AliasAdded,
    AliasDropped,
    Committed,
    ListenerRegistered,
    ListenerUnregistered,
    NotificationsDelivered,
    StagedDiscarded,
    OwnershipTransferred
])]
pub struct Registry {
    /// Owner allowed to stage and commit (None = anyone)
    owner: Var<Option<Address>>,
    /// Committed direct entries
    entries: Mapping<String, Address>,
    /// Committed direct names, in first-commit order
    entry_names: Var<Vec<String>>,
    /// Alias -> direct target name, in declaration order
    aliases: Var<Vec<AliasEntry>>,
    /// Pending change set for the next commit
    staged: Var<Vec<StagedEntry>>,
    /// Components notified on commit
    listeners: Var<Vec<Address>>,
    /// Committed changes not yet pushed to each listener
    outbox: Mapping<Address, Vec<AddressChange>>,
    /// Number of successful commits
    epoch: Var<u64>,
}

#[odra::module]
impl Registry {
    /// Initialize the registry. `None` leaves mutations open to any caller.
    pub fn init(&mut self, owner: Option<Address>) {
        self.owner.set(owner);
        self.epoch.set(0);
    }

    // ========== Staging ==========

    /// Stage `address` under `name` for the next commit (owner only).
    ///
    /// Staging the same name again before the commit replaces the pending value.
    pub fn stage_address(&mut self, name: String, address: Address, notify: bool) {
        self.require_owner();
        self.require_valid_name(&name);

        if self.alias_target(&name).is_some() {
            self.env().revert(RegistryError::NameConflict);
        }

        let mut staged = self.staged.get().unwrap_or_default();
        upsert_staged(
            &mut staged,
            StagedEntry {
                name: name.clone(),
                address,
                notify,
            },
        );
        self.staged.set(staged);

        self.env().emit_event(AddressStaged {
            name,
            address,
            notify,
        });
    }

    /// Declare `alias` as resolving through `target` (owner only).
    ///
    /// Takes effect immediately. An existing alias may be re-pointed; aliasing an
    /// alias, or turning an alias target into an alias, is rejected.
    pub fn add_alias(&mut self, alias: String, target: String) {
        self.require_owner();
        self.require_valid_name(&alias);

        if self.is_direct(&alias) {
            self.env().revert(RegistryError::NameConflict);
        }
        let mut aliases = self.get_aliases();
        if aliases.iter().any(|entry| entry.target == alias || entry.alias == target) {
            self.env().revert(RegistryError::AliasChain);
        }
        if !self.is_direct(&target) {
            self.env().revert(RegistryError::UnknownTarget);
        }

        upsert_alias(
            &mut aliases,
            AliasEntry {
                alias: alias.clone(),
                target: target.clone(),
            },
        );
        self.aliases.set(aliases);

        self.env().emit_event(AliasAdded { alias, target });
    }

    /// Drop every staged entry without committing (owner only).
    ///
    /// Aliases whose target was only staged are dropped with it.
    pub fn discard_staged(&mut self) -> u32 {
        self.require_owner();

        let count = self.staged.get().unwrap_or_default().len() as u32;
        self.staged.set(Vec::new());

        let (kept, dropped): (Vec<AliasEntry>, Vec<AliasEntry>) = self
            .get_aliases()
            .into_iter()
            .partition(|entry| self.entries.get(&entry.target).is_some());
        if !dropped.is_empty() {
            self.aliases.set(kept);
            for AliasEntry { alias, target } in dropped {
                self.env().emit_event(AliasDropped { alias, target });
            }
        }

        self.env().emit_event(StagedDiscarded { count });
        count
    }

    // ========== Commit ==========

    /// Publish the staged change set as committed state (owner only).
    ///
    /// Returns the names whose committed address changed. Every staged entry
    /// flagged `notify` is queued for every registered listener after the new
    /// state is written, including entries re-staged with an unchanged address.
    pub fn commit(&mut self) -> Vec<String> {
        self.require_owner();

        let staged = self.staged.get().unwrap_or_default();
        if staged.is_empty() {
            self.env().revert(RegistryError::NoPendingChanges);
        }

        let mut entry_names = self.entry_names.get().unwrap_or_default();
        let mut changed = Vec::new();
        let mut notifications = Vec::new();

        for entry in staged {
            let previous = self.entries.get(&entry.name);
            if previous != Some(entry.address) {
                if previous.is_none() {
                    entry_names.push(entry.name.clone());
                }
                self.entries.set(&entry.name, entry.address);
                changed.push(entry.name.clone());
            }

            if entry.notify {
                notifications.push(AddressChange {
                    name: entry.name,
                    address: entry.address,
                });
            }
        }

        self.entry_names.set(entry_names);
        self.staged.set(Vec::new());

        let epoch = self.get_epoch() + 1;
        self.epoch.set(epoch);

        // State is fully written above; only now queue listener refreshes
        if !notifications.is_empty() {
            for listener in self.get_listeners() {
                let mut pending = self.outbox.get(&listener).unwrap_or_default();
                merge_changes(&mut pending, &notifications);
                self.outbox.set(&listener, pending);
            }
        }

        self.env().emit_event(Committed {
            epoch,
            changed: changed.clone(),
        });
        changed
    }

    /// Push the queued changes to `listener`.
    ///
    /// Returns the number of changes delivered. If the listener reverts, this
    /// call reverts with it and the queue is kept for a retry.
    pub fn deliver_notifications(&mut self, listener: Address) -> u32 {
        let changes = self.outbox.get(&listener).unwrap_or_default();
        if changes.is_empty() {
            return 0;
        }

        let count = changes.len() as u32;
        self.outbox.set(&listener, Vec::new());

        let args = runtime_args! {
            "changes" => changes
        };
        let call_def = CallDef::new(REFRESH_ENTRY_POINT, true, args);
        self.env().call_contract::<()>(listener, call_def);

        self.env().emit_event(NotificationsDelivered { listener, count });
        count
    }

    // ========== Resolution ==========

    /// Committed address for `name`, following at most one alias.
    pub fn resolve(&self, name: String) -> Address {
        match self.lookup(&name) {
            Some(address) => address,
            None => self.env().revert(RegistryError::UnknownName),
        }
    }

    /// Whether `name` currently resolves
    pub fn has_name(&self, name: String) -> bool {
        self.lookup(&name).is_some()
    }

    // ========== Listeners ==========

    /// Add `listener` to the notification list (owner or the listener itself).
    ///
    /// Registering twice has no effect.
    pub fn register_listener(&mut self, listener: Address) {
        self.require_owner_or(listener);

        let mut listeners = self.get_listeners();
        if listeners.contains(&listener) {
            return;
        }
        if listeners.len() >= MAX_LISTENERS {
            self.env().revert(RegistryError::ListenerLimit);
        }
        listeners.push(listener);
        self.listeners.set(listeners);

        self.env().emit_event(ListenerRegistered { listener });
    }

    /// Remove `listener` and drop its undelivered changes (owner or the listener itself).
    pub fn unregister_listener(&mut self, listener: Address) {
        self.require_owner_or(listener);

        let mut listeners = self.get_listeners();
        if !listeners.contains(&listener) {
            return;
        }
        listeners.retain(|registered| *registered != listener);
        self.listeners.set(listeners);
        self.outbox.set(&listener, Vec::new());

        self.env().emit_event(ListenerUnregistered { listener });
    }

    /// Registered listeners, in registration order
    pub fn get_listeners(&self) -> Vec<Address> {
        self.listeners.get().unwrap_or_default()
    }

    /// Changes committed but not yet delivered to `listener`
    pub fn get_pending_notifications(&self, listener: Address) -> Vec<AddressChange> {
        self.outbox.get(&listener).unwrap_or_default()
    }

    // ========== Ownership ==========

    /// Hand the registry to `new_owner` (owner only). `None` opens it to anyone.
    pub fn transfer_ownership(&mut self, new_owner: Option<Address>) {
        self.require_owner();

        let previous_owner = self.get_owner();
        self.owner.set(new_owner);

        self.env().emit_event(OwnershipTransferred {
            previous_owner,
            new_owner,
        });
    }

    /// Get the owner address
    pub fn get_owner(&self) -> Option<Address> {
        self.owner.get().flatten()
    }

    // ========== Views ==========

    /// Number of commits so far
    pub fn get_epoch(&self) -> u64 {
        self.epoch.get().unwrap_or(0)
    }

    /// Whether at least one commit has happened
    pub fn is_committed(&self) -> bool {
        self.get_epoch() > 0
    }

    /// Pending change set, in staging order
    pub fn get_staged_entries(&self) -> Vec<StagedEntry> {
        self.staged.get().unwrap_or_default()
    }

    /// Committed direct names
    pub fn get_names(&self) -> Vec<String> {
        self.entry_names.get().unwrap_or_default()
    }

    /// Declared aliases with their current targets
    pub fn get_aliases(&self) -> Vec<AliasEntry> {
        self.aliases.get().unwrap_or_default()
    }

    /// Target of `alias`, if it is one
    pub fn get_alias_target(&self, alias: String) -> Option<String> {
        self.alias_target(&alias)
    }

    // ========== Internal Functions ==========

    fn binding(&self, name: &String) -> Option<Binding> {
        if let Some(address) = self.entries.get(name) {
            return Some(Binding::Direct(address));
        }
        self.alias_target(name).map(Binding::Alias)
    }

    fn alias_target(&self, name: &String) -> Option<String> {
        self.get_aliases()
            .into_iter()
            .find(|entry| &entry.alias == name)
            .map(|entry| entry.target)
    }

    fn lookup(&self, name: &String) -> Option<Address> {
        match self.binding(name)? {
            Binding::Direct(address) => Some(address),
            Binding::Alias(target) => self.entries.get(&target),
        }
    }

    /// Committed or staged direct name
    fn is_direct(&self, name: &String) -> bool {
        self.entries.get(name).is_some()
            || self
                .staged
                .get()
                .unwrap_or_default()
                .iter()
                .any(|entry| &entry.name == name)
    }

    fn require_valid_name(&self, name: &str) {
        if let Err(error) = validate_name(name) {
            self.env().revert(error);
        }
    }

    fn require_owner_or(&self, account: Address) {
        if self.env().caller() != account {
            self.require_owner();
        }
    }

    fn require_owner(&self) {
        if let Some(owner) = self.get_owner() {
            if self.env().caller() != owner {
                self.env().revert(RegistryError::Unauthorized);
            }
        }
    }
}
