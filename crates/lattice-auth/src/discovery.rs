//! Homeserver discovery: well-known lookup with the domain fallback rule.

use lattice_core::{Client, Homeserver, InvalidHomeserverUrlError, UserId};
use thiserror::Error;

use crate::well_known::WellKnown;

/// Errors from resolving a user's homeserver.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The well-known lookup failed at the transport level. Retryable.
    #[error("homeserver discovery request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// Neither the advertised base URL nor the domain fallback yielded a
    /// syntactically valid homeserver URL. Not retryable.
    #[error("homeserver resolution failed: {0}")]
    ResolutionFailed(#[from] InvalidHomeserverUrlError),
}

/// Resolves the canonical homeserver base URL for the identifier's domain.
///
/// Precedence, which callers rely on:
/// 1. `GET {scheme}://{domain}/.well-known/matrix/client`; a transport
///    failure aborts with [`DiscoveryError::Network`].
/// 2. A 200 response decoding to an `m.homeserver` document wins; its
///    advertised base URL is validated and an invalid one is
///    [`DiscoveryError::ResolutionFailed`], with no fallback.
/// 3. Any other status, or an undecodable body, falls back to treating
///    `{scheme}://{domain}` itself as the base URL.
///
/// The scheme is `https` unless the client was configured with
/// `insecure_discovery` for loopback/test homeservers.
pub async fn discover_homeserver(
    client: &Client,
    user_id: &UserId,
) -> Result<Homeserver, DiscoveryError> {
    let insecure = client.internal.settings().insecure_discovery;
    let domain = user_id.domain();

    let response = client
        .internal
        .http_client()
        .get(well_known_url(domain, insecure))
        .send()
        .await?;

    if response.status().is_success() {
        match response.json::<WellKnown>().await {
            Ok(well_known) => {
                log::debug!("well-known document advertises a base URL for {domain}");
                return Ok(Homeserver::parse(&well_known.homeserver.base_url)?);
            }
            Err(err) => {
                log::debug!("undecodable well-known document for {domain}: {err}");
            }
        }
    } else {
        log::debug!(
            "no well-known document for {domain} ({})",
            response.status()
        );
    }

    Ok(fallback_homeserver(domain, insecure)?)
}

fn well_known_url(domain: &str, insecure: bool) -> String {
    let scheme = if insecure { "http" } else { "https" };
    format!("{scheme}://{domain}/.well-known/matrix/client")
}

fn fallback_homeserver(
    domain: &str,
    insecure: bool,
) -> Result<Homeserver, InvalidHomeserverUrlError> {
    if insecure {
        Homeserver::parse(&format!("http://{domain}"))
    } else {
        Homeserver::from_domain(domain)
    }
}

#[cfg(test)]
mod tests {
    use lattice_core::ClientSettings;
    use lattice_test::start_homeserver_mock;
    use wiremock::{matchers, Mock, ResponseTemplate};

    use super::*;

    fn user(domain: &str) -> UserId {
        UserId::parse(&format!("@alice:{domain}")).expect("valid test identifier")
    }

    #[test]
    fn default_scheme_is_https() {
        assert_eq!(
            well_known_url("example.org", false),
            "https://example.org/.well-known/matrix/client"
        );
        assert_eq!(
            fallback_homeserver("example.org", false).unwrap(),
            Homeserver::parse("https://example.org").unwrap()
        );
    }

    #[tokio::test]
    async fn advertised_base_url_wins() {
        let (server, client, homeserver) = start_homeserver_mock(vec![]).await;
        let advertised = format!("{}advertised", homeserver.as_str());
        Mock::given(matchers::method("GET"))
            .and(matchers::path("/.well-known/matrix/client"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "m.homeserver": { "base_url": advertised }
            })))
            .mount(&server)
            .await;

        let resolved = discover_homeserver(&client, &user(&server.address().to_string()))
            .await
            .unwrap();

        assert_eq!(resolved, Homeserver::parse(&advertised).unwrap());
    }

    #[tokio::test]
    async fn absent_well_known_falls_back_to_the_domain() {
        let (server, client, homeserver) = start_homeserver_mock(vec![]).await;

        let resolved = discover_homeserver(&client, &user(&server.address().to_string()))
            .await
            .unwrap();

        assert_eq!(resolved, homeserver);
    }

    #[tokio::test]
    async fn malformed_well_known_falls_back_to_the_domain() {
        let mock = Mock::given(matchers::method("GET"))
            .and(matchers::path("/.well-known/matrix/client"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"));
        let (server, client, homeserver) = start_homeserver_mock(vec![mock]).await;

        let resolved = discover_homeserver(&client, &user(&server.address().to_string()))
            .await
            .unwrap();

        assert_eq!(resolved, homeserver);
    }

    #[tokio::test]
    async fn missing_base_url_falls_back_to_the_domain() {
        let mock = Mock::given(matchers::method("GET"))
            .and(matchers::path("/.well-known/matrix/client"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "m.identity_server": {} })),
            );
        let (server, client, homeserver) = start_homeserver_mock(vec![mock]).await;

        let resolved = discover_homeserver(&client, &user(&server.address().to_string()))
            .await
            .unwrap();

        assert_eq!(resolved, homeserver);
    }

    #[tokio::test]
    async fn invalid_advertised_base_url_is_not_retried_via_fallback() {
        let mock = Mock::given(matchers::method("GET"))
            .and(matchers::path("/.well-known/matrix/client"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "m.homeserver": { "base_url": "ftp://example.org" }
            })));
        let (server, client, _homeserver) = start_homeserver_mock(vec![mock]).await;

        let result = discover_homeserver(&client, &user(&server.address().to_string())).await;

        assert!(matches!(result, Err(DiscoveryError::ResolutionFailed(_))));
    }

    #[tokio::test]
    async fn transport_failure_is_a_network_error() {
        let client = lattice_core::Client::new(Some(ClientSettings {
            insecure_discovery: true,
            ..Default::default()
        }));

        // Port 1 refuses connections.
        let result = discover_homeserver(&client, &user("127.0.0.1:1")).await;

        assert!(matches!(result, Err(DiscoveryError::Network(_))));
    }
}
