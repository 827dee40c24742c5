//! Registry error definitions.

use odra::prelude::*;

/// Registry and listener errors
#[repr(u16)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum RegistryError {
    // Naming errors (1xx)
    InvalidName = 100,
    UnknownTarget = 101,
    AliasChain = 102,
    UnknownName = 103,
    NameConflict = 104,

    // Commit errors (2xx)
    NoPendingChanges = 200,

    // Access control errors (4xx)
    Unauthorized = 400,
    UnauthorizedRegistry = 401,

    // Listener errors (5xx)
    ListenerFrozen = 500,
    ListenerLimit = 501,
    StaleRefresh = 502,
    RegistryUnset = 503,
}

impl RegistryError {
    pub const fn message(&self) -> &'static str {
        match self {
            // Naming
            RegistryError::InvalidName => "Invalid name: empty, blank or too long",
            RegistryError::UnknownTarget => "Alias target has never been staged or committed",
            RegistryError::AliasChain => "Alias target is itself an alias",
            RegistryError::UnknownName => "Name does not resolve to a committed address",
            RegistryError::NameConflict => "Name is already used by an entry of the other kind",

            // Commit
            RegistryError::NoPendingChanges => "Nothing staged to commit",

            // Access control
            RegistryError::Unauthorized => "Unauthorized: caller is not the registry owner",
            RegistryError::UnauthorizedRegistry => "Unauthorized: caller is not the registry",

            // Listener
            RegistryError::ListenerFrozen => "Listener is frozen and refuses refreshes",
            RegistryError::ListenerLimit => "Listener list is full",
            RegistryError::StaleRefresh => "Refreshed address does not match the committed one",
            RegistryError::RegistryUnset => "Listener has no registry configured",
        }
    }
}

impl core::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.message())
    }
}

impl From<RegistryError> for OdraError {
    fn from(error: RegistryError) -> Self {
        #[cfg(target_arch = "wasm32")]
        {
            OdraError::user(error as u16)
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            OdraError::user(error as u16, error.message())
        }
    }
}
