use serde::{Deserialize, Serialize};

/// Basic client behavior settings. They are optional and uneditable once the
/// client is initialized.
///
/// Defaults to
///
/// ```
/// # use lattice_core::ClientSettings;
/// let settings = ClientSettings {
///     user_agent: "Lattice Rust-SDK".to_string(),
///     device_display_name: "Lattice".to_string(),
///     sso_redirect_url: "lattice://login/".to_string(),
///     insecure_discovery: false,
/// };
/// let default = ClientSettings::default();
/// ```
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ClientSettings {
    /// The user agent sent with every request. Defaults to `Lattice Rust-SDK`.
    pub user_agent: String,
    /// Initial display name registered for a newly logged-in device.
    pub device_display_name: String,
    /// Callback URL handed to the homeserver at the start of an SSO redirect.
    /// Must match the URL scheme the OS browser integration intercepts, or
    /// the flow never completes.
    pub sso_redirect_url: String,
    /// Speak plain HTTP to the user's domain during homeserver discovery.
    /// Only meaningful for homeservers on loopback or test networks; leave
    /// off for any real deployment.
    pub insecure_discovery: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            user_agent: "Lattice Rust-SDK".into(),
            device_display_name: "Lattice".into(),
            sso_redirect_url: "lattice://login/".into(),
            insecure_discovery: false,
        }
    }
}
