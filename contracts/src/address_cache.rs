//! Address cache: a dependent component that keeps local copies of registry addresses.
//!
//! The cache is refreshed by the registry through `refresh_dependencies` and can
//! also pull current addresses itself with `sync`. Only the configured registry
//! may push refreshes.

use odra::prelude::*;
use odra::casper_types::{RuntimeArgs, runtime_args};
use odra::CallDef;
use crate::errors::RegistryError;
use crate::types::AddressChange;

/// Address cache contract
#[odra::module]
pub struct AddressCache {
    /// Registry contract address
    registry: Var<Address>,
    /// Account that deployed the cache
    admin: Var<Address>,
    /// Cached addresses by component name
    cached: Mapping<String, Address>,
    /// Number of refreshes received from the registry
    refresh_count: Var<u64>,
    /// Most recent batch pushed by the registry
    last_refresh: Var<Vec<AddressChange>>,
    /// Refuse refreshes while set
    frozen: Var<bool>,
    /// Check each pushed change against the registry's `resolve` before applying it
    verify_refreshes: Var<bool>,
}

#[odra::module]
impl AddressCache {
    /// Initialize the cache with the registry address
    pub fn init(&mut self, registry: Address) {
        let admin = self.env().caller();
        self.registry.set(registry);
        self.admin.set(admin);
        self.refresh_count.set(0);
        self.frozen.set(false);
        self.verify_refreshes.set(false);
    }

    /// Apply a batch of committed changes (registry only)
    pub fn refresh_dependencies(&mut self, changes: Vec<AddressChange>) {
        self.require_registry();
        if self.is_frozen() {
            self.env().revert(RegistryError::ListenerFrozen);
        }

        let verify = self.is_verifying_refreshes();
        for change in changes.iter() {
            if verify && self.resolve_from_registry(change.name.clone()) != change.address {
                self.env().revert(RegistryError::StaleRefresh);
            }
            self.cached.set(&change.name, change.address);
        }
        let refresh_count = self.get_refresh_count() + 1;
        self.refresh_count.set(refresh_count);
        self.last_refresh.set(changes);
    }

    /// Pull the current address of each name from the registry.
    ///
    /// Reverts with the registry's error if a name does not resolve.
    pub fn sync(&mut self, names: Vec<String>) {
        for name in names {
            let address = self.resolve_from_registry(name.clone());
            self.cached.set(&name, address);
        }
    }

    /// Register this cache as a listener of its registry
    pub fn subscribe(&mut self) {
        let registry = self.get_registry();
        let listener = self.env().self_address();
        let args = runtime_args! {
            "listener" => listener
        };
        let call_def = CallDef::new("register_listener", true, args);
        self.env().call_contract::<()>(registry, call_def);
    }

    /// Leave the registry's listener list, dropping anything still queued for this cache
    pub fn unsubscribe(&mut self) {
        let registry = self.get_registry();
        let listener = self.env().self_address();
        let args = runtime_args! {
            "listener" => listener
        };
        let call_def = CallDef::new("unregister_listener", true, args);
        self.env().call_contract::<()>(registry, call_def);
    }

    /// Freeze or unfreeze refreshes (admin only)
    pub fn set_frozen(&mut self, frozen: bool) {
        self.require_admin();
        self.frozen.set(frozen);
    }

    /// Resolve every pushed change through the registry before applying it (admin only)
    pub fn set_verify_refreshes(&mut self, verify: bool) {
        self.require_admin();
        self.verify_refreshes.set(verify);
    }

    /// Cached address for `name`
    pub fn get_cached_address(&self, name: String) -> Option<Address> {
        self.cached.get(&name)
    }

    /// Number of refreshes received
    pub fn get_refresh_count(&self) -> u64 {
        self.refresh_count.get().unwrap_or(0)
    }

    /// Last batch received from the registry
    pub fn get_last_refresh(&self) -> Vec<AddressChange> {
        self.last_refresh.get().unwrap_or_default()
    }

    /// Whether refreshes are currently refused
    pub fn is_frozen(&self) -> bool {
        self.frozen.get().unwrap_or(false)
    }

    /// Whether pushed changes are checked against the registry
    pub fn is_verifying_refreshes(&self) -> bool {
        self.verify_refreshes.get().unwrap_or(false)
    }

    /// Get registry address
    pub fn get_registry(&self) -> Address {
        // Always set in init
        match self.registry.get() {
            Some(registry) => registry,
            None => self.env().revert(RegistryError::RegistryUnset),
        }
    }

    fn resolve_from_registry(&self, name: String) -> Address {
        let args = runtime_args! {
            "name" => name
        };
        let call_def = CallDef::new("resolve", false, args);
        self.env().call_contract(self.get_registry(), call_def)
    }

    fn require_admin(&self) {
        let caller = self.env().caller();
        if self.admin.get() != Some(caller) {
            self.env().revert(RegistryError::Unauthorized);
        }
    }

    fn require_registry(&self) {
        if self.env().caller() != self.get_registry() {
            self.env().revert(RegistryError::UnauthorizedRegistry);
        }
    }
}
