//! Single sign-on through an external browser.
//!
//! The homeserver redirects the user to a third-party identity provider in
//! the system browser; the OS hands the final redirect back to the app via
//! a registered URL scheme, carrying a short-lived `loginToken` that is then
//! exchanged for a session.

mod controller;

pub use controller::SsoFlowController;

use lattice_core::BrowserError;
use thiserror::Error;

/// Errors from an SSO browser session.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SsoError {
    /// A session is already in flight; concurrent sessions are refused
    /// rather than queued. This is a caller contract violation, not a
    /// transient condition.
    #[error("an SSO session is already in progress")]
    BadState,
    /// The callback URL carried no `loginToken` query parameter.
    #[error("the SSO callback carried no login token")]
    MissingToken,
    /// The user cancelled the session.
    #[error("the SSO session was cancelled")]
    Cancelled,
    /// The browser failed to open, or the session ended in a browser-side
    /// error.
    #[error(transparent)]
    Browser(#[from] BrowserError),
}
