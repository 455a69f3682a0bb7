use std::sync::Arc;

use reqwest::header::{self, HeaderValue};

use super::internal::InternalClient;
use crate::client::client_settings::ClientSettings;

/// The main struct to interact with the Lattice SDK.
#[derive(Debug, Clone)]
pub struct Client {
    // Important: The [`Client`] struct requires its `Clone` implementation to
    // return an owned reference to the same instance, so any mutable state
    // needs to live behind the Arc as part of [`InternalClient`].
    #[doc(hidden)]
    pub internal: Arc<InternalClient>,
}

impl Client {
    /// Create a new Lattice client.
    pub fn new(settings: Option<ClientSettings>) -> Self {
        let settings = settings.unwrap_or_default();

        let http_client = reqwest::Client::builder()
            .default_headers(build_default_headers(&settings))
            .build()
            .expect("HTTP client build should not fail");

        Self {
            internal: Arc::new(InternalClient {
                http_client,
                settings,
            }),
        }
    }
}

/// Build default headers for the Lattice HTTP client.
fn build_default_headers(settings: &ClientSettings) -> header::HeaderMap {
    let mut headers = header::HeaderMap::new();

    headers.append(
        header::USER_AGENT,
        HeaderValue::from_str(&settings.user_agent)
            .expect("User agent should be a valid header value"),
    );

    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_shares_the_same_internal_state() {
        let client = Client::new(None);
        let clone = client.clone();
        assert!(Arc::ptr_eq(&client.internal, &clone.internal));
    }

    #[test]
    fn settings_are_applied() {
        let client = Client::new(Some(ClientSettings {
            user_agent: "Lattice Rust-SDK [TEST]".into(),
            ..Default::default()
        }));
        assert_eq!(client.internal.settings().user_agent, "Lattice Rust-SDK [TEST]");
    }
}
