//! Wire models for `POST /_matrix/client/v3/login`.

use serde::{Deserialize, Serialize};

use crate::well_known::WellKnown;

/// The `m.id.user` identifier object used by password login.
#[derive(Serialize)]
pub(crate) struct UserIdentifierPayload {
    #[serde(rename = "type")]
    kind: &'static str,
    user: String,
}

impl UserIdentifierPayload {
    pub(crate) fn user(localpart: &str) -> Self {
        Self {
            kind: "m.id.user",
            user: localpart.to_owned(),
        }
    }
}

/// Login request payload. Intentionally not `Debug`: it carries credentials.
#[derive(Serialize)]
#[serde(tag = "type")]
pub(crate) enum LoginRequestPayload {
    #[serde(rename = "m.login.password")]
    Password {
        identifier: UserIdentifierPayload,
        password: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        initial_device_display_name: Option<String>,
    },
    #[serde(rename = "m.login.token")]
    Token {
        token: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        initial_device_display_name: Option<String>,
    },
}

/// Success response body. All fields the exchange needs are required by the
/// protocol but checked explicitly, so a broken server yields a
/// missing-field error instead of a decode failure.
#[derive(Deserialize)]
pub(crate) struct LoginResponseBody {
    pub(crate) user_id: Option<String>,
    pub(crate) access_token: Option<String>,
    pub(crate) device_id: Option<String>,
    /// Optional base-URL override the server may send along with the
    /// session.
    pub(crate) well_known: Option<WellKnown>,
}
