//! Shared plumbing for the Lattice SDK.
//!
//! This crate carries everything the authentication core and its
//! collaborators have in common: the [`Client`] that owns the HTTP
//! connection pool, validated Matrix identifier types ([`UserId`],
//! [`Homeserver`]), the API error taxonomy, and the [`AccountStore`] seam
//! through which the embedding application persists logged-in accounts.

mod browser;
pub mod client;
mod error;
mod homeserver;
mod store;
mod user_id;

pub use browser::{BrowserError, ExternalBrowser};
pub use client::{Client, ClientSettings};
pub use error::{ApiError, MissingFieldError};
pub use homeserver::{Homeserver, InvalidHomeserverUrlError};
pub use store::{AccountInfo, AccountStore, AccountStoreError, NewAccountInfo};
pub use user_id::{InvalidUserIdError, UserId};
