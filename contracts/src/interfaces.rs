//! Cross-contract interfaces of the registry protocol.

use odra::prelude::*;
use crate::types::AddressChange;

/// Entry point name the registry calls on listeners
pub const REFRESH_ENTRY_POINT: &str = "refresh_dependencies";

/// Implemented by components that cache registry addresses.
///
/// The registry pushes every committed change flagged `notify` through this
/// entry point; `caller()` inside the call is the registry itself.
#[odra::external_contract]
pub trait AddressListener {
    fn refresh_dependencies(&mut self, changes: Vec<AddressChange>);
}
