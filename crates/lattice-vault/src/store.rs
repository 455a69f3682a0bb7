use async_trait::async_trait;
use thiserror::Error;
use zeroize::Zeroizing;

/// Access-control policy applied when a secret is stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessPolicy {
    /// Gate retrieval behind a user-presence check (biometrics or device
    /// passcode) where the platform store supports per-item policies.
    pub requires_user_presence: bool,
}

/// Errors surfaced by a [`CredentialStore`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VaultError {
    /// An entry already exists for this (server, account) pair. Saving is
    /// never an upsert.
    #[error("an entry for this server and account already exists")]
    Duplicate,
    /// An entry exists but its stored data could not be decoded.
    #[error("stored credential data could not be decoded")]
    InvalidData,
    /// The platform store rejected the operation.
    #[error("credential store failure: {code}")]
    Store {
        /// Platform-specific status/error code, for logs and diagnostics.
        code: String,
    },
}

/// Secure credential vault collaborator, keyed by (server, account).
///
/// The vault is process-wide keyed storage with no attempt-scoped lifetime;
/// entries persist until explicitly deleted. Operations are atomic at the
/// OS-store level, so concurrent save and load for the same key may land in
/// either order and callers must tolerate both.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Persists `secret` for the (server, account) pair.
    ///
    /// Fails with [`VaultError::Duplicate`] if an entry already exists;
    /// existing entries are never silently overwritten.
    async fn save(
        &self,
        server: &str,
        account: &str,
        secret: &str,
        policy: &AccessPolicy,
    ) -> Result<(), VaultError>;

    /// Best-effort lookup. Absence is `Ok(None)`; an undecodable entry is
    /// [`VaultError::InvalidData`], which callers log and treat as absent.
    async fn load(
        &self,
        server: &str,
        account: &str,
    ) -> Result<Option<Zeroizing<String>>, VaultError>;

    /// Removes the entry for the (server, account) pair. Removing an absent
    /// entry is not an error.
    async fn delete(&self, server: &str, account: &str) -> Result<(), VaultError>;
}
