//! Credential exchange against the homeserver's login endpoint.

mod api;

use std::fmt;

use lattice_core::{
    require, ApiError, Client, Homeserver, InvalidHomeserverUrlError, InvalidUserIdError,
    MissingFieldError, UserId,
};
use reqwest::header;
use thiserror::Error;
use zeroize::Zeroizing;

use crate::login::api::{LoginRequestPayload, LoginResponseBody, UserIdentifierPayload};

/// A successful credential exchange.
///
/// Treated as a secret: the access token is redacted from `Debug` output and
/// wiped from memory on drop. Meant to be consumed by session persistence
/// immediately after creation.
pub struct LoginSuccess {
    /// The user the session belongs to, as confirmed by the homeserver.
    pub user_id: UserId,
    /// Device id issued by the homeserver.
    pub device_id: String,
    /// The session's access token.
    pub access_token: Zeroizing<String>,
    /// The homeserver the session was established against, after applying
    /// any `well_known` override from the login response.
    pub homeserver: Homeserver,
}

impl fmt::Debug for LoginSuccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginSuccess")
            .field("user_id", &self.user_id)
            .field("device_id", &self.device_id)
            .field("access_token", &"<redacted>")
            .field("homeserver", &self.homeserver)
            .finish()
    }
}

/// Errors from exchanging credentials for a session.
#[derive(Debug, Error)]
pub enum LoginError {
    /// The homeserver rejected the credentials (`M_FORBIDDEN`).
    #[error("invalid credentials")]
    InvalidCredentials,
    /// Transport or protocol failure.
    #[error(transparent)]
    Api(#[from] ApiError),
    /// The success response was missing a required field.
    #[error(transparent)]
    MissingField(#[from] MissingFieldError),
    /// The response carried a user id that does not parse.
    #[error("malformed user id in login response: {0}")]
    InvalidUserId(#[from] InvalidUserIdError),
    /// The response carried a homeserver override that does not validate.
    #[error("malformed homeserver override in login response: {0}")]
    InvalidHomeserver(#[from] InvalidHomeserverUrlError),
}

/// Exchanges a username and password for a session.
pub async fn login_with_password(
    client: &Client,
    homeserver: &Homeserver,
    user_id: &UserId,
    password: &str,
) -> Result<LoginSuccess, LoginError> {
    let payload = LoginRequestPayload::Password {
        identifier: UserIdentifierPayload::user(user_id.localpart()),
        password: password.to_owned(),
        initial_device_display_name: Some(
            client.internal.settings().device_display_name.clone(),
        ),
    };

    send_login_request(client, homeserver, &payload).await
}

/// Exchanges an SSO login token for a session.
pub async fn login_with_token(
    client: &Client,
    homeserver: &Homeserver,
    token: &str,
) -> Result<LoginSuccess, LoginError> {
    let payload = LoginRequestPayload::Token {
        token: token.to_owned(),
        initial_device_display_name: Some(
            client.internal.settings().device_display_name.clone(),
        ),
    };

    send_login_request(client, homeserver, &payload).await
}

async fn send_login_request(
    client: &Client,
    homeserver: &Homeserver,
    payload: &LoginRequestPayload,
) -> Result<LoginSuccess, LoginError> {
    let url = homeserver.endpoint(["_matrix", "client", "v3", "login"]);

    let response = client
        .internal
        .http_client()
        .post(url)
        // Credentials in transit; keep intermediaries from caching either
        // direction.
        .header(header::CACHE_CONTROL, "no-store")
        .json(payload)
        .send()
        .await
        .map_err(ApiError::from)?;

    if !response.status().is_success() {
        let api_error = ApiError::from_response(response).await;
        if api_error.errcode() == Some("M_FORBIDDEN") {
            return Err(LoginError::InvalidCredentials);
        }
        return Err(api_error.into());
    }

    let body: LoginResponseBody = response.json().await.map_err(ApiError::from)?;

    let user_id = UserId::parse(&require!(body.user_id))?;
    let homeserver = match body.well_known {
        Some(well_known) => Homeserver::parse(&well_known.homeserver.base_url)?,
        None => homeserver.clone(),
    };

    Ok(LoginSuccess {
        user_id,
        device_id: require!(body.device_id),
        access_token: Zeroizing::new(require!(body.access_token)),
        homeserver,
    })
}
