//! The top-level login coordinator.
//!
//! Sequences identifier parsing, homeserver discovery, flow negotiation,
//! credential exchange and session persistence. The session store, the
//! credential vault and the browser integration are injected, so the whole
//! sequence runs against in-memory fakes in tests.

use std::sync::Arc;

use lattice_core::{
    AccountInfo, AccountStore, AccountStoreError, Client, ClientSettings, ExternalBrowser,
    Homeserver, InvalidUserIdError, NewAccountInfo, UserId,
};
use lattice_vault::{AccessPolicy, CredentialStore, VaultError};
use thiserror::Error;
use tokio::sync::Mutex;
use zeroize::Zeroizing;

use crate::{
    discovery::{discover_homeserver, DiscoveryError},
    flows::{get_login_flows, LoginFlow, LoginFlowKind},
    login::{self, LoginError, LoginSuccess},
    sso::{SsoError, SsoFlowController},
    NegotiationError,
};

/// Errors from [`LoginOrchestrator::discover_server`].
#[derive(Debug, Error)]
pub enum DiscoverError {
    /// The input was not a valid `@localpart:domain` identifier.
    #[error(transparent)]
    InvalidUserName(#[from] InvalidUserIdError),
    /// An account for this identifier is already logged in.
    #[error("already logged in as this user")]
    AlreadyLoggedIn,
    /// Homeserver resolution failed.
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    /// The login-flows request failed.
    #[error(transparent)]
    Negotiation(#[from] NegotiationError),
    /// The session store failed during the duplicate-account check.
    #[error(transparent)]
    Store(#[from] AccountStoreError),
}

/// Errors from the login operations on a [`DiscoveredLogin`].
#[derive(Debug, Error)]
pub enum AuthenticateError {
    /// Another login attempt on this discovery is already in flight.
    #[error("a login attempt is already in progress")]
    BadState,
    /// The homeserver does not advertise the requested flow (or identity
    /// provider).
    #[error("the homeserver does not offer the requested login flow")]
    FlowNotSupported,
    /// The credential exchange failed.
    #[error(transparent)]
    Login(#[from] LoginError),
    /// The SSO browser session failed.
    #[error(transparent)]
    Sso(#[from] SsoError),
    /// Persisting the session failed.
    #[error(transparent)]
    Store(#[from] AccountStoreError),
}

/// Top-level coordinator for one login surface.
///
/// Owns the network client and the injected collaborators. Each successful
/// [`discover_server`](Self::discover_server) call yields a
/// [`DiscoveredLogin`] carrying the resolved homeserver and negotiated
/// flows; the actual login runs on that value.
pub struct LoginOrchestrator {
    client: Client,
    accounts: Arc<dyn AccountStore>,
    vault: Arc<dyn CredentialStore>,
    sso: Arc<SsoFlowController>,
}

impl LoginOrchestrator {
    /// Creates the orchestrator with its injected collaborators.
    pub fn new(
        settings: Option<ClientSettings>,
        accounts: Arc<dyn AccountStore>,
        vault: Arc<dyn CredentialStore>,
        browser: Arc<dyn ExternalBrowser>,
    ) -> Self {
        let client = Client::new(settings);
        let redirect_url = client.internal.settings().sso_redirect_url.clone();

        Self {
            client,
            accounts,
            vault,
            sso: Arc::new(SsoFlowController::new(browser, redirect_url)),
        }
    }

    /// The SSO controller, for wiring the OS URL-scheme callback and the
    /// user-facing cancel action into the embedding app.
    pub fn sso(&self) -> &SsoFlowController {
        &self.sso
    }

    /// Resolves everything needed to log `username` in: parses the
    /// identifier, refuses identifiers that already have an account,
    /// discovers the homeserver, pre-fills any vaulted password and
    /// negotiates the login flows.
    ///
    /// Failures leave no partial state behind; discovering again with the
    /// same or a different identifier is always valid.
    pub async fn discover_server(&self, username: &str) -> Result<DiscoveredLogin, DiscoverError> {
        let user_id = UserId::parse(username)?;

        // Duplicate-account guard, before any network round-trip.
        if self.accounts.get_account_info(&user_id).await?.is_some() {
            return Err(DiscoverError::AlreadyLoggedIn);
        }

        let homeserver = discover_homeserver(&self.client, &user_id).await?;

        let stored_password = match self
            .vault
            .load(homeserver.as_str(), &user_id.to_string())
            .await
        {
            Ok(found) => found,
            Err(err) => {
                // Best-effort read; a broken vault entry must not block login.
                log::warn!("could not read stored password: {err}");
                None
            }
        };

        let flows = get_login_flows(&self.client, &homeserver).await?;

        Ok(DiscoveredLogin {
            client: self.client.clone(),
            accounts: Arc::clone(&self.accounts),
            vault: Arc::clone(&self.vault),
            sso: Arc::clone(&self.sso),
            user_id,
            homeserver,
            flows,
            stored_password,
            in_flight: Mutex::new(()),
        })
    }
}

/// A login attempt whose homeserver and flows are known.
///
/// Values only exist after a successful discovery and carry the homeserver
/// and flow list they were created with, so logging in before discovery is
/// unrepresentable. Switching users means discovering again, which also
/// discards any previously negotiated flows.
///
/// Failed login attempts leave the value intact for retry.
pub struct DiscoveredLogin {
    client: Client,
    accounts: Arc<dyn AccountStore>,
    vault: Arc<dyn CredentialStore>,
    sso: Arc<SsoFlowController>,
    user_id: UserId,
    homeserver: Homeserver,
    flows: Vec<LoginFlow>,
    stored_password: Option<Zeroizing<String>>,
    in_flight: Mutex<()>,
}

impl DiscoveredLogin {
    /// The parsed identifier this discovery ran for.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// The resolved homeserver.
    pub fn homeserver(&self) -> &Homeserver {
        &self.homeserver
    }

    /// The negotiated flows, in the homeserver's order.
    pub fn flows(&self) -> &[LoginFlow] {
        &self.flows
    }

    /// Password found in the credential vault for this account, if any;
    /// used to pre-fill the login form.
    pub fn stored_password(&self) -> Option<&str> {
        self.stored_password.as_deref().map(String::as_str)
    }

    /// Exchanges the password for a session and persists the account.
    ///
    /// The returned [`PasswordAuthenticated`] carries the saved account and
    /// a one-shot [`VaultSaveOffer`], so the caller can ask the user whether
    /// to keep the password in the vault.
    pub async fn login_with_password(
        &self,
        password: &str,
    ) -> Result<PasswordAuthenticated, AuthenticateError> {
        let _in_flight = self
            .in_flight
            .try_lock()
            .map_err(|_| AuthenticateError::BadState)?;

        if !self
            .flows
            .iter()
            .any(|flow| flow.kind == LoginFlowKind::Password)
        {
            return Err(AuthenticateError::FlowNotSupported);
        }

        let success =
            login::login_with_password(&self.client, &self.homeserver, &self.user_id, password)
                .await?;
        let account = self.persist(success).await?;

        Ok(PasswordAuthenticated {
            offer: VaultSaveOffer {
                vault: Arc::clone(&self.vault),
                server: self.homeserver.as_str().to_owned(),
                account: self.user_id.to_string(),
                password: Zeroizing::new(password.to_owned()),
            },
            account,
        })
    }

    /// Runs the SSO browser flow for `provider_id`, exchanges the returned
    /// login token for a session and persists the account.
    ///
    /// Cancellation and browser failures surface as errors while this value
    /// stays valid, so the user can retry or fall back to a password.
    pub async fn login_with_sso(&self, provider_id: &str) -> Result<AccountInfo, AuthenticateError> {
        let _in_flight = self
            .in_flight
            .try_lock()
            .map_err(|_| AuthenticateError::BadState)?;

        let offered = self.flows.iter().any(|flow| {
            flow.kind == LoginFlowKind::Sso
                && flow
                    .identity_providers
                    .iter()
                    .any(|provider| provider.id == provider_id)
        });
        if !offered {
            return Err(AuthenticateError::FlowNotSupported);
        }

        let token = self.sso.start(&self.homeserver, provider_id).await?;
        let success = login::login_with_token(&self.client, &self.homeserver, &token).await?;

        self.persist(success).await
    }

    async fn persist(&self, success: LoginSuccess) -> Result<AccountInfo, AuthenticateError> {
        log::debug!("saving account: {}", success.user_id.localpart());

        let account = NewAccountInfo {
            display_name: success.user_id.localpart().to_owned(),
            user_id: success.user_id,
            homeserver: success.homeserver,
            device_id: success.device_id,
            access_token: success.access_token,
        };
        let info = account.info();

        // The store consumes the only copy of the access token; nothing of
        // the session remains in this attempt afterwards.
        self.accounts.save_account_info(account).await?;

        Ok(info)
    }
}

/// Outcome of a successful password login.
///
/// The session is already persisted; what remains is the out-of-band
/// question of whether to keep the password in the vault.
pub struct PasswordAuthenticated {
    /// The account as persisted in the session store.
    pub account: AccountInfo,
    /// One-shot offer to store the password in the credential vault.
    pub offer: VaultSaveOffer,
}

/// One-shot offer to keep the just-used password in the credential vault.
///
/// Consumed either way: [`save`](Self::save) writes the secret under the
/// (homeserver, account) key the next discovery will look it up by;
/// [`decline`](Self::decline) wipes the held password without touching the
/// vault. Dropping the offer is equivalent to declining.
pub struct VaultSaveOffer {
    vault: Arc<dyn CredentialStore>,
    server: String,
    account: String,
    password: Zeroizing<String>,
}

impl VaultSaveOffer {
    /// Persists the password under the given access policy.
    pub async fn save(self, policy: &AccessPolicy) -> Result<(), VaultError> {
        log::info!("saving cleartext password to the credential vault");
        self.vault
            .save(&self.server, &self.account, &self.password, policy)
            .await
    }

    /// Declines the offer; the in-memory password is wiped.
    pub fn decline(self) {}
}
