//! Test support for the Lattice SDK.
//!
//! A wiremock bootstrap helper plus in-memory fakes for every injected
//! collaborator, so the authentication sequence can run end-to-end without
//! an OS keychain, a real browser or a real homeserver.

mod api;
mod browser;
mod stores;

pub use api::start_homeserver_mock;
pub use browser::ScriptedBrowser;
pub use stores::{MemoryAccountStore, MemoryCredentialStore};
