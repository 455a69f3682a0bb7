//! The `m.homeserver` well-known document, shared by discovery and the
//! login response's optional homeserver override.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct WellKnown {
    #[serde(rename = "m.homeserver")]
    pub(crate) homeserver: WellKnownHomeserver,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WellKnownHomeserver {
    pub(crate) base_url: String,
}
