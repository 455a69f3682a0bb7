use async_trait::async_trait;
use keyring::Entry;
use zeroize::Zeroizing;

use crate::{AccessPolicy, CredentialStore, VaultError};

/// Credential store backed by the OS keychain through the `keyring` crate
/// (macOS Keychain, Windows Credential Manager, freedesktop Secret Service).
///
/// Entries use the homeserver base URL as the service and the account
/// identifier as the user. The `keyring` crate exposes no per-item
/// access-control API, so [`AccessPolicy::requires_user_presence`] is
/// advisory here: the secret is stored under the platform's default
/// protection class.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyringCredentialStore;

impl KeyringCredentialStore {
    /// Creates the store. Stateless; all state lives in the OS keychain.
    pub fn new() -> Self {
        Self
    }
}

fn map_err(err: keyring::Error) -> VaultError {
    match err {
        keyring::Error::BadEncoding(_) => VaultError::InvalidData,
        other => VaultError::Store {
            code: other.to_string(),
        },
    }
}

#[async_trait]
impl CredentialStore for KeyringCredentialStore {
    async fn save(
        &self,
        server: &str,
        account: &str,
        secret: &str,
        policy: &AccessPolicy,
    ) -> Result<(), VaultError> {
        if policy.requires_user_presence {
            log::debug!("user-presence policy requested; platform default protection applies");
        }

        let server = server.to_owned();
        let account = account.to_owned();
        let secret = Zeroizing::new(secret.to_owned());

        tokio::task::spawn_blocking(move || {
            let entry = Entry::new(&server, &account).map_err(map_err)?;

            // The platform stores upsert on set; probe first so a duplicate
            // insert is an error rather than a silent overwrite. An existing
            // entry that fails to decode still counts as existing.
            match entry.get_password() {
                Ok(_) => return Err(VaultError::Duplicate),
                Err(keyring::Error::NoEntry) => {}
                Err(keyring::Error::BadEncoding(_)) => return Err(VaultError::Duplicate),
                Err(other) => return Err(map_err(other)),
            }

            entry.set_password(&secret).map_err(map_err)
        })
        .await
        .map_err(|err| VaultError::Store {
            code: err.to_string(),
        })?
    }

    async fn load(
        &self,
        server: &str,
        account: &str,
    ) -> Result<Option<Zeroizing<String>>, VaultError> {
        let server = server.to_owned();
        let account = account.to_owned();

        tokio::task::spawn_blocking(move || {
            let entry = Entry::new(&server, &account).map_err(map_err)?;
            match entry.get_password() {
                Ok(secret) => Ok(Some(Zeroizing::new(secret))),
                Err(keyring::Error::NoEntry) => Ok(None),
                Err(other) => Err(map_err(other)),
            }
        })
        .await
        .map_err(|err| VaultError::Store {
            code: err.to_string(),
        })?
    }

    async fn delete(&self, server: &str, account: &str) -> Result<(), VaultError> {
        let server = server.to_owned();
        let account = account.to_owned();

        tokio::task::spawn_blocking(move || {
            let entry = Entry::new(&server, &account).map_err(map_err)?;
            match entry.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
                Err(other) => Err(map_err(other)),
            }
        })
        .await
        .map_err(|err| VaultError::Store {
            code: err.to_string(),
        })?
    }
}
