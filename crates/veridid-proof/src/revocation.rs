//! Credential revocation checks.
//!
//! The revocation source is external to the core; the verifier only asks
//! whether a credential id is revoked.

use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use veridid_core::CredentialId;

use crate::error::RevocationError;

/// Source of truth for revoked credentials.
#[async_trait]
pub trait RevocationRegistry: Send + Sync {
    async fn is_revoked(&self, credential_id: &CredentialId) -> Result<bool, RevocationError>;
}

/// Never reports anything as revoked.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRevocation;

#[async_trait]
impl RevocationRegistry for NoRevocation {
    async fn is_revoked(&self, _credential_id: &CredentialId) -> Result<bool, RevocationError> {
        Ok(false)
    }
}

/// In-memory revocation set. Revocation is permanent.
#[derive(Debug, Default)]
pub struct RevocationList {
    revoked: RwLock<HashSet<CredentialId>>,
}

impl RevocationList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Revoke a credential. Returns false if it was already revoked.
    pub fn revoke(&self, credential_id: CredentialId) -> bool {
        let newly = self
            .revoked
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(credential_id);
        if newly {
            tracing::info!(credential = ?credential_id, "credential revoked");
        }
        newly
    }

    pub fn contains(&self, credential_id: &CredentialId) -> bool {
        self.revoked
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(credential_id)
    }

    pub fn len(&self) -> usize {
        self.revoked.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RevocationRegistry for RevocationList {
    async fn is_revoked(&self, credential_id: &CredentialId) -> Result<bool, RevocationError> {
        Ok(self.contains(credential_id))
    }
}
