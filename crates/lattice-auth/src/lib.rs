//! Authentication core of the Lattice SDK.
//!
//! Coordinates the full client-side login sequence against a Matrix
//! homeserver: parsing the user identifier, discovering the homeserver via
//! well-known lookup, negotiating the advertised login flows, exchanging
//! credentials over the password or SSO path, and handing the resulting
//! session to the injected account store. The [`LoginOrchestrator`] is the
//! entry point; the lower-level building blocks are exported for callers
//! that need them individually.

mod discovery;
mod flows;
pub mod login;
mod orchestrator;
pub mod sso;
mod well_known;

pub use discovery::{discover_homeserver, DiscoveryError};
pub use flows::{
    get_login_flows, IdentityProvider, IdentityProviderBrand, LoginFlow, LoginFlowKind,
    NegotiationError,
};
pub use login::{LoginError, LoginSuccess};
pub use orchestrator::{
    AuthenticateError, DiscoverError, DiscoveredLogin, LoginOrchestrator, PasswordAuthenticated,
    VaultSaveOffer,
};
pub use sso::{SsoError, SsoFlowController};
