use async_trait::async_trait;
use thiserror::Error;
use url::Url;

/// The external browser failed to present or complete an authentication
/// session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BrowserError {
    /// The browser view could not be opened.
    #[error("failed to open the system browser: {0}")]
    LaunchFailed(String),
    /// The user denied the authentication session at the OS level.
    #[error("the user denied the authentication session")]
    UserDenied,
    /// The browser session failed after launch.
    #[error("browser session failed: {0}")]
    SessionFailed(String),
}

/// Browser/redirect integration collaborator.
///
/// Opens a system browser view for a given URL; the embedding application is
/// responsible for registering the callback URL scheme and routing the
/// intercepted redirect back to the SDK. Injected so tests can substitute a
/// scripted fake.
#[async_trait]
pub trait ExternalBrowser: Send + Sync {
    /// Presents the system browser at `url`.
    async fn open(&self, url: &Url) -> Result<(), BrowserError>;

    /// Tears down any presented browser session. Called on cancellation;
    /// must not return before the presentation is gone.
    async fn close(&self) -> Result<(), BrowserError>;
}
