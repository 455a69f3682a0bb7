//! Credential vault adapter for the Lattice SDK.
//!
//! Wraps an OS-level secure store behind the [`CredentialStore`] trait,
//! keyed by (server URL, account). Saving never overwrites an existing
//! entry, and lookups are best-effort: absence is a normal outcome. Secrets
//! handled here never reach a log record; only status codes and error codes
//! may be logged.

mod keyring_store;
mod store;

pub use keyring_store::KeyringCredentialStore;
pub use store::{AccessPolicy, CredentialStore, VaultError};
