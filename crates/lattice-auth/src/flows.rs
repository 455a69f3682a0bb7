//! Login-flow negotiation: `GET /_matrix/client/v3/login`.

use lattice_core::{ApiError, Client, Homeserver};
use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Errors from negotiating login flows with a homeserver.
#[derive(Debug, Error)]
pub enum NegotiationError {
    /// The login-flows request failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// One authentication flow advertised by a homeserver.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginFlow {
    /// The flow type.
    #[serde(rename = "type")]
    pub kind: LoginFlowKind,
    /// Identity providers offered by an SSO flow, in server order. Empty for
    /// non-SSO flows.
    #[serde(default)]
    pub identity_providers: Vec<IdentityProvider>,
}

/// The type of a login flow.
///
/// Unknown type strings decode as [`LoginFlowKind::Other`] so that servers
/// advertising newer flows never break negotiation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginFlowKind {
    /// `m.login.password`
    Password,
    /// `m.login.sso`
    Sso,
    /// `m.login.token`
    Token,
    /// Any flow type this SDK does not know about.
    Other(String),
}

impl LoginFlowKind {
    /// The wire representation of this flow type.
    pub fn as_str(&self) -> &str {
        match self {
            LoginFlowKind::Password => "m.login.password",
            LoginFlowKind::Sso => "m.login.sso",
            LoginFlowKind::Token => "m.login.token",
            LoginFlowKind::Other(other) => other,
        }
    }
}

impl From<String> for LoginFlowKind {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "m.login.password" => LoginFlowKind::Password,
            "m.login.sso" => LoginFlowKind::Sso,
            "m.login.token" => LoginFlowKind::Token,
            _ => LoginFlowKind::Other(raw),
        }
    }
}

impl<'de> Deserialize<'de> for LoginFlowKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(String::deserialize(deserializer)?.into())
    }
}

/// A third-party identity provider offered by an SSO flow.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IdentityProvider {
    /// Opaque provider id, unique within the flow; appears in the SSO
    /// redirect URL.
    pub id: String,
    /// Human readable provider name.
    pub name: String,
    /// Well-known brand, for branded presentation.
    #[serde(default)]
    pub brand: Option<IdentityProviderBrand>,
    /// Opaque `mxc://` content reference to the provider's icon. Not
    /// dereferenced by this SDK.
    #[serde(default)]
    pub icon: Option<String>,
}

/// Brands an identity provider may advertise.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum IdentityProviderBrand {
    Apple,
    Facebook,
    GitHub,
    GitLab,
    Google,
    Other(String),
}

impl From<String> for IdentityProviderBrand {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "apple" => IdentityProviderBrand::Apple,
            "facebook" => IdentityProviderBrand::Facebook,
            "github" => IdentityProviderBrand::GitHub,
            "gitlab" => IdentityProviderBrand::GitLab,
            "google" => IdentityProviderBrand::Google,
            _ => IdentityProviderBrand::Other(raw),
        }
    }
}

impl<'de> Deserialize<'de> for IdentityProviderBrand {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(String::deserialize(deserializer)?.into())
    }
}

#[derive(Debug, Deserialize)]
struct LoginFlowsResponse {
    flows: Vec<LoginFlow>,
}

/// Queries the homeserver for its advertised login flows.
///
/// The order of the result is the server's order; some UIs key their layout
/// off it, so it is never re-sorted here.
pub async fn get_login_flows(
    client: &Client,
    homeserver: &Homeserver,
) -> Result<Vec<LoginFlow>, NegotiationError> {
    let url = homeserver.endpoint(["_matrix", "client", "v3", "login"]);

    let response = client
        .internal
        .http_client()
        .get(url)
        .send()
        .await
        .map_err(ApiError::from)?;

    if !response.status().is_success() {
        return Err(ApiError::from_response(response).await.into());
    }

    let body: LoginFlowsResponse = response.json().await.map_err(ApiError::from)?;
    Ok(body.flows)
}

#[cfg(test)]
mod tests {
    use lattice_test::start_homeserver_mock;
    use wiremock::{matchers, Mock, ResponseTemplate};

    use super::*;

    #[test]
    fn server_order_is_preserved() {
        let body = serde_json::json!({
            "flows": [
                { "type": "m.login.sso" },
                { "type": "m.login.password" },
                { "type": "m.login.token" }
            ]
        });

        let response: LoginFlowsResponse = serde_json::from_value(body).unwrap();
        let kinds: Vec<_> = response.flows.iter().map(|flow| &flow.kind).collect();
        assert_eq!(
            kinds,
            [
                &LoginFlowKind::Sso,
                &LoginFlowKind::Password,
                &LoginFlowKind::Token
            ]
        );
    }

    #[test]
    fn unknown_flow_types_decode_as_other() {
        let flow: LoginFlow =
            serde_json::from_value(serde_json::json!({ "type": "m.login.application_service" }))
                .unwrap();
        assert_eq!(
            flow.kind,
            LoginFlowKind::Other("m.login.application_service".into())
        );
        assert!(flow.identity_providers.is_empty());
    }

    #[test]
    fn identity_providers_decode_in_order_with_brands() {
        let flow: LoginFlow = serde_json::from_value(serde_json::json!({
            "type": "m.login.sso",
            "identity_providers": [
                { "id": "github", "name": "GitHub", "brand": "github" },
                { "id": "gitlab", "name": "GitLab", "brand": "gitlab", "icon": "mxc://example.org/abc" },
                { "id": "twitter", "name": "Twitter", "brand": "twitter" },
                { "id": "corp", "name": "Corp SAML" }
            ]
        }))
        .unwrap();

        assert_eq!(flow.kind, LoginFlowKind::Sso);
        let ids: Vec<_> = flow.identity_providers.iter().map(|idp| &idp.id).collect();
        assert_eq!(ids, ["github", "gitlab", "twitter", "corp"]);
        assert_eq!(
            flow.identity_providers[0].brand,
            Some(IdentityProviderBrand::GitHub)
        );
        assert_eq!(
            flow.identity_providers[1].icon.as_deref(),
            Some("mxc://example.org/abc")
        );
        assert_eq!(
            flow.identity_providers[2].brand,
            Some(IdentityProviderBrand::Other("twitter".into()))
        );
        assert_eq!(flow.identity_providers[3].brand, None);
    }

    #[tokio::test]
    async fn fetches_flows_from_the_login_endpoint() {
        let mock = Mock::given(matchers::method("GET"))
            .and(matchers::path("/_matrix/client/v3/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "flows": [ { "type": "m.login.password" } ]
            })));
        let (_server, client, homeserver) = start_homeserver_mock(vec![mock]).await;

        let flows = get_login_flows(&client, &homeserver).await.unwrap();

        assert_eq!(flows.len(), 1);
        assert_eq!(flows[0].kind, LoginFlowKind::Password);
    }

    #[tokio::test]
    async fn server_errors_surface_with_their_errcode() {
        let mock = Mock::given(matchers::method("GET"))
            .and(matchers::path("/_matrix/client/v3/login"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "errcode": "M_LIMIT_EXCEEDED",
                "error": "Too many requests"
            })));
        let (_server, client, homeserver) = start_homeserver_mock(vec![mock]).await;

        let error = get_login_flows(&client, &homeserver).await.unwrap_err();

        let NegotiationError::Api(api) = error;
        assert_eq!(api.errcode(), Some("M_LIMIT_EXCEEDED"));
    }
}
