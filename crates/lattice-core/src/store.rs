use async_trait::async_trait;
use thiserror::Error;
use zeroize::Zeroizing;

use crate::{Homeserver, UserId};

/// Errors surfaced by an [`AccountStore`] implementation.
#[derive(Debug, Error)]
pub enum AccountStoreError {
    /// The backing store failed; the message is implementation defined.
    #[error("account store failure: {0}")]
    Internal(String),
}

/// A stored account, as returned by lookups.
///
/// Deliberately carries no access token; tokens stay inside the store once
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    /// Full user identifier the account belongs to.
    pub user_id: UserId,
    /// Human readable account name. Set to the identifier's localpart when
    /// the account is created.
    pub display_name: String,
    /// Homeserver the account lives on.
    pub homeserver: Homeserver,
    /// Device id issued by the homeserver at login.
    pub device_id: String,
}

/// A freshly authenticated account to persist.
///
/// This is the hand-off shape for a successful login: consumed by
/// [`AccountStore::save_account_info`] immediately after the credential
/// exchange, after which no in-memory copy of the token remains (the field
/// zeroizes on drop).
pub struct NewAccountInfo {
    /// Full user identifier, as confirmed by the homeserver.
    pub user_id: UserId,
    /// Human readable account name.
    pub display_name: String,
    /// Homeserver the session was established against.
    pub homeserver: Homeserver,
    /// Device id issued by the homeserver.
    pub device_id: String,
    /// The session's access token.
    pub access_token: Zeroizing<String>,
}

impl NewAccountInfo {
    /// The lookup/display view of this account, without the token.
    pub fn info(&self) -> AccountInfo {
        AccountInfo {
            user_id: self.user_id.clone(),
            display_name: self.display_name.clone(),
            homeserver: self.homeserver.clone(),
            device_id: self.device_id.clone(),
        }
    }
}

/// Session store collaborator: persistence of logged-in accounts.
///
/// Implementations live in the embedding application (its database layer);
/// tests substitute an in-memory fake. Injected rather than reached through
/// a global so every consumer can be exercised in isolation.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Looks up an account by user id. Absence is `Ok(None)`, not an error.
    async fn get_account_info(
        &self,
        user_id: &UserId,
    ) -> Result<Option<AccountInfo>, AccountStoreError>;

    /// Persists a newly logged-in account.
    async fn save_account_info(&self, account: NewAccountInfo) -> Result<(), AccountStoreError>;
}
