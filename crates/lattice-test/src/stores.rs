use std::collections::HashMap;

use async_trait::async_trait;
use lattice_core::{AccountInfo, AccountStore, AccountStoreError, NewAccountInfo, UserId};
use lattice_vault::{AccessPolicy, CredentialStore, VaultError};
use tokio::sync::RwLock;
use zeroize::Zeroizing;

/// In-memory [`AccountStore`] fake.
#[derive(Default)]
pub struct MemoryAccountStore {
    accounts: RwLock<HashMap<UserId, StoredAccount>>,
}

struct StoredAccount {
    info: AccountInfo,
    access_token: Zeroizing<String>,
}

impl MemoryAccountStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an account is stored for `user_id`.
    pub async fn contains(&self, user_id: &UserId) -> bool {
        self.accounts.read().await.contains_key(user_id)
    }

    /// The access token persisted for `user_id`, for assertions.
    pub async fn access_token(&self, user_id: &UserId) -> Option<String> {
        self.accounts
            .read()
            .await
            .get(user_id)
            .map(|stored| stored.access_token.to_string())
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn get_account_info(
        &self,
        user_id: &UserId,
    ) -> Result<Option<AccountInfo>, AccountStoreError> {
        Ok(self
            .accounts
            .read()
            .await
            .get(user_id)
            .map(|stored| stored.info.clone()))
    }

    async fn save_account_info(&self, account: NewAccountInfo) -> Result<(), AccountStoreError> {
        let info = account.info();
        self.accounts.write().await.insert(
            info.user_id.clone(),
            StoredAccount {
                info,
                access_token: account.access_token,
            },
        );
        Ok(())
    }
}

/// In-memory [`CredentialStore`] fake with the duplicate-insert semantics of
/// the real OS store.
#[derive(Default)]
pub struct MemoryCredentialStore {
    entries: RwLock<HashMap<(String, String), StoredSecret>>,
}

struct StoredSecret {
    /// `None` marks an entry whose data does not decode, set up via
    /// [`MemoryCredentialStore::poison`].
    secret: Option<String>,
    policy: AccessPolicy,
}

impl MemoryCredentialStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a secret directly, bypassing the duplicate check.
    pub async fn seed(&self, server: &str, account: &str, secret: &str) {
        self.entries.write().await.insert(
            (server.to_owned(), account.to_owned()),
            StoredSecret {
                secret: Some(secret.to_owned()),
                policy: AccessPolicy::default(),
            },
        );
    }

    /// Plants an entry whose stored data cannot be decoded, so `load`
    /// returns [`VaultError::InvalidData`].
    pub async fn poison(&self, server: &str, account: &str) {
        self.entries.write().await.insert(
            (server.to_owned(), account.to_owned()),
            StoredSecret {
                secret: None,
                policy: AccessPolicy::default(),
            },
        );
    }

    /// The access policy an entry was saved with, for assertions.
    pub async fn policy(&self, server: &str, account: &str) -> Option<AccessPolicy> {
        self.entries
            .read()
            .await
            .get(&(server.to_owned(), account.to_owned()))
            .map(|stored| stored.policy)
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn save(
        &self,
        server: &str,
        account: &str,
        secret: &str,
        policy: &AccessPolicy,
    ) -> Result<(), VaultError> {
        let mut entries = self.entries.write().await;
        let key = (server.to_owned(), account.to_owned());
        if entries.contains_key(&key) {
            return Err(VaultError::Duplicate);
        }
        entries.insert(
            key,
            StoredSecret {
                secret: Some(secret.to_owned()),
                policy: *policy,
            },
        );
        Ok(())
    }

    async fn load(
        &self,
        server: &str,
        account: &str,
    ) -> Result<Option<Zeroizing<String>>, VaultError> {
        match self
            .entries
            .read()
            .await
            .get(&(server.to_owned(), account.to_owned()))
        {
            Some(StoredSecret {
                secret: Some(secret),
                ..
            }) => Ok(Some(Zeroizing::new(secret.clone()))),
            Some(StoredSecret { secret: None, .. }) => Err(VaultError::InvalidData),
            None => Ok(None),
        }
    }

    async fn delete(&self, server: &str, account: &str) -> Result<(), VaultError> {
        self.entries
            .write()
            .await
            .remove(&(server.to_owned(), account.to_owned()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use lattice_core::Homeserver;

    use super::*;

    const SERVER: &str = "https://matrix.example.org/";
    const ACCOUNT: &str = "@alice:example.org";

    #[tokio::test]
    async fn credential_save_refuses_duplicates() {
        let store = MemoryCredentialStore::new();
        let policy = AccessPolicy::default();

        store.save(SERVER, ACCOUNT, "hunter2", &policy).await.unwrap();
        let second = store.save(SERVER, ACCOUNT, "other", &policy).await;

        assert_eq!(second, Err(VaultError::Duplicate));
        // The original secret survives the refused overwrite.
        let loaded = store.load(SERVER, ACCOUNT).await.unwrap().expect("entry");
        assert_eq!(loaded.as_str(), "hunter2");
    }

    #[tokio::test]
    async fn credential_load_of_absent_key_is_none() {
        let store = MemoryCredentialStore::new();
        assert!(store.load(SERVER, ACCOUNT).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn poisoned_entry_is_invalid_data() {
        let store = MemoryCredentialStore::new();
        store.poison(SERVER, ACCOUNT).await;
        assert_eq!(
            store.load(SERVER, ACCOUNT).await.map(|_| ()),
            Err(VaultError::InvalidData)
        );
    }

    #[tokio::test]
    async fn credential_delete_is_idempotent() {
        let store = MemoryCredentialStore::new();
        let policy = AccessPolicy::default();

        store.save(SERVER, ACCOUNT, "hunter2", &policy).await.unwrap();
        store.delete(SERVER, ACCOUNT).await.unwrap();
        store.delete(SERVER, ACCOUNT).await.unwrap();

        assert!(store.load(SERVER, ACCOUNT).await.unwrap().is_none());
        // The key is free again after deletion.
        store.save(SERVER, ACCOUNT, "hunter3", &policy).await.unwrap();
    }

    #[tokio::test]
    async fn account_store_round_trips() {
        let store = MemoryAccountStore::new();
        let user_id = UserId::parse(ACCOUNT).unwrap();

        assert!(store.get_account_info(&user_id).await.unwrap().is_none());

        store
            .save_account_info(NewAccountInfo {
                user_id: user_id.clone(),
                display_name: "alice".into(),
                homeserver: Homeserver::parse(SERVER).unwrap(),
                device_id: "LATTICEDEV".into(),
                access_token: Zeroizing::new("syt_token".to_owned()),
            })
            .await
            .unwrap();

        let info = store
            .get_account_info(&user_id)
            .await
            .unwrap()
            .expect("account");
        assert_eq!(info.display_name, "alice");
        assert_eq!(info.device_id, "LATTICEDEV");
        assert_eq!(store.access_token(&user_id).await.as_deref(), Some("syt_token"));
    }
}
