//! Lifecycle notifications.

use veridid_core::{Blake3Hash, Ed25519PublicKey};

/// Emitted after a registry mutation is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    DidCreated {
        did: String,
        controller: Ed25519PublicKey,
    },
    DidUpdated {
        did: String,
        version: u64,
        data_hash: Blake3Hash,
    },
    DidDeactivated {
        did: String,
        version: u64,
    },
}

impl RegistryEvent {
    /// The DID the event is about.
    pub fn did(&self) -> &str {
        match self {
            Self::DidCreated { did, .. }
            | Self::DidUpdated { did, .. }
            | Self::DidDeactivated { did, .. } => did,
        }
    }
}
