//! Events emitted by the registry.

use odra::prelude::*;

/// An address was staged for the next commit
#[odra::event]
pub struct AddressStaged {
    pub name: String,
    pub address: Address,
    pub notify: bool,
}

/// An alias was declared or re-pointed
#[odra::event]
pub struct AliasAdded {
    pub alias: String,
    pub target: String,
}

/// An alias was removed because its staged target was discarded
#[odra::event]
pub struct AliasDropped {
    pub alias: String,
    pub target: String,
}

/// A staged change set became the committed state
#[odra::event]
pub struct Committed {
    pub epoch: u64,
    pub changed: Vec<String>,
}

/// A listener joined the notification list
#[odra::event]
pub struct ListenerRegistered {
    pub listener: Address,
}

/// A listener left the notification list and its queue was cleared
#[odra::event]
pub struct ListenerUnregistered {
    pub listener: Address,
}

/// A listener's outbox was pushed to it
#[odra::event]
pub struct NotificationsDelivered {
    pub listener: Address,
    pub count: u32,
}

/// The staged change set was dropped without committing
#[odra::event]
pub struct StagedDiscarded {
    pub count: u32,
}

/// Registry ownership changed hands
#[odra::event]
pub struct OwnershipTransferred {
    pub previous_owner: Option<Address>,
    pub new_owner: Option<Address>,
}
