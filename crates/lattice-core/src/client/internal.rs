//! State shared by every clone of a [`Client`](crate::Client).

use crate::ClientSettings;

/// Internal state of a [`Client`](crate::Client).
#[derive(Debug)]
pub struct InternalClient {
    pub(crate) http_client: reqwest::Client,
    pub(crate) settings: ClientSettings,
}

impl InternalClient {
    /// The HTTP client with the default headers applied.
    pub fn http_client(&self) -> &reqwest::Client {
        &self.http_client
    }

    /// The settings the client was constructed with.
    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }
}
