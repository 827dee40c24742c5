//! Host-side deployment orchestration.
//!
//! A deployment run is described by a JSON manifest: the components to stage,
//! the aliases to declare and the listeners to register. `commit_and_notify`
//! publishes the staged set and then pushes each listener's queued changes in
//! its own call, collecting failures instead of stopping at the first one.

use std::path::Path;

use odra::casper_types::Key;
use odra::prelude::{Address, OdraError};
use serde::Deserialize;

use crate::registry::RegistryHostRef;

/// Host-side deployment errors
#[derive(Debug, thiserror::Error)]
pub enum DeploymentError {
    #[error("cannot read manifest {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("invalid address `{0}`")]
    InvalidAddress(String),

    #[error("registry call `{call}` failed: {error:?}")]
    Registry {
        call: &'static str,
        error: OdraError,
    },
}

/// One component to stage
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestContract {
    pub name: String,
    /// Formatted Casper key, e.g. `account-hash-…` or `hash-…`
    pub address: String,
    #[serde(default = "default_notify")]
    pub notify: bool,
}

/// One alias to declare
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestAlias {
    pub alias: String,
    pub target: String,
}

/// Description of a deployment run
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeploymentManifest {
    #[serde(default)]
    pub contracts: Vec<ManifestContract>,
    #[serde(default)]
    pub aliases: Vec<ManifestAlias>,
    #[serde(default)]
    pub listeners: Vec<String>,
}

fn default_notify() -> bool {
    true
}

impl DeploymentManifest {
    pub fn from_json(json: &str) -> Result<Self, DeploymentError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DeploymentError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| DeploymentError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Register listeners, stage contracts, then declare aliases.
    ///
    /// Every address is parsed before the registry is touched. Returns the
    /// number of staged contracts.
    pub fn apply(&self, registry: &mut RegistryHostRef) -> Result<usize, DeploymentError> {
        let listeners = self
            .listeners
            .iter()
            .map(|listener| parse_address(listener))
            .collect::<Result<Vec<_>, _>>()?;
        let contracts = self
            .contracts
            .iter()
            .map(|contract| parse_address(&contract.address).map(|address| (contract, address)))
            .collect::<Result<Vec<_>, _>>()?;

        for listener in listeners {
            registry
                .try_register_listener(listener)
                .map_err(registry_error("register_listener"))?;
        }

        for (contract, address) in contracts.iter() {
            registry
                .try_stage_address(contract.name.clone(), *address, contract.notify)
                .map_err(registry_error("stage_address"))?;
        }

        for alias in self.aliases.iter() {
            registry
                .try_add_alias(alias.alias.clone(), alias.target.clone())
                .map_err(registry_error("add_alias"))?;
        }

        Ok(contracts.len())
    }
}

/// A listener whose delivery reverted
#[derive(Debug)]
pub struct ListenerFailure {
    pub listener: Address,
    pub error: OdraError,
}

/// Outcome of a commit followed by listener delivery
#[derive(Debug)]
pub struct CommitReport {
    /// Epoch reached by the commit
    pub epoch: u64,
    /// Names whose committed address changed
    pub changed: Vec<String>,
    /// Listeners refreshed and how many changes each received
    pub delivered: Vec<(Address, u32)>,
    /// Listeners that refused; their changes stay queued in the registry
    pub failed: Vec<ListenerFailure>,
}

impl CommitReport {
    pub fn is_fully_delivered(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Commit the staged set, then push queued changes to every listener.
///
/// A failed commit is returned as an error. Listener failures are reported
/// in the `CommitReport` and never undo the commit.
pub fn commit_and_notify(registry: &mut RegistryHostRef) -> Result<CommitReport, DeploymentError> {
    let changed = registry.try_commit().map_err(registry_error("commit"))?;
    let epoch = registry.get_epoch();
    let (delivered, failed) = deliver_pending(registry);

    Ok(CommitReport {
        epoch,
        changed,
        delivered,
        failed,
    })
}

/// Push queued changes to each listener in registration order, isolating failures.
pub fn deliver_pending(registry: &mut RegistryHostRef) -> (Vec<(Address, u32)>, Vec<ListenerFailure>) {
    let mut delivered = Vec::new();
    let mut failed = Vec::new();

    for listener in registry.get_listeners() {
        match registry.try_deliver_notifications(listener) {
            Ok(0) => {}
            Ok(count) => delivered.push((listener, count)),
            Err(error) => failed.push(ListenerFailure { listener, error }),
        }
    }

    (delivered, failed)
}

/// Parse a formatted Casper key (`account-hash-…`, `hash-…`) into an address.
pub fn parse_address(value: &str) -> Result<Address, DeploymentError> {
    let invalid = || DeploymentError::InvalidAddress(value.to_string());
    let key = Key::from_formatted_str(value.trim()).map_err(|_| invalid())?;
    Address::try_from(key).map_err(|_| invalid())
}

fn registry_error(call: &'static str) -> impl FnOnce(OdraError) -> DeploymentError {
    move |error| DeploymentError::Registry { call, error }
}
