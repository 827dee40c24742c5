//! Protocol Deployer Contracts
//!
//! Casper-native address registry for a modular options protocol
//! (credit issuance, options exchange, liquidity pools, price feeds).
//!
//! ## Architecture
//!
//! - **Registry**: Name-to-address resolution with staged commits, aliases
//!   and per-listener change notification
//! - **AddressCache**: Dependent component that caches registry addresses and
//!   accepts refreshes pushed by the registry
//! - **deployment** (host only): JSON manifests and the commit-then-notify
//!   orchestration used by deployment scripts
//!
//! ## Epochs
//!
//! A deployment run stages addresses and aliases, then commits once:
//! - Staged entries are invisible to `resolve` until committed
//! - Aliases take effect immediately and always read their target's committed address
//! - Each commit queues `notify` changes per listener; delivery is a separate call

#![cfg_attr(target_arch = "wasm32", no_std)]

#[cfg(target_arch = "wasm32")]
extern crate alloc;

// Re-export odra for downstream usage
pub use odra;

// Core module declarations
pub mod types;
pub mod errors;
pub mod events;
pub mod interfaces;

// Contract modules
pub mod registry;
pub mod address_cache;

// Host-side tooling
#[cfg(not(target_arch = "wasm32"))]
pub mod deployment;
