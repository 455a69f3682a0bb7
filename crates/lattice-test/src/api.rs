use lattice_core::{Client, ClientSettings, Homeserver};

/// Helper for testing homeserver APIs using wiremock.
///
/// Returns the mock server, a client configured for plain-HTTP discovery
/// against it, and the mock's base URL as a [`Homeserver`].
///
/// Warning: when using `Mock::expect` ensure the server is not dropped
/// before the test completes.
pub async fn start_homeserver_mock(
    mocks: Vec<wiremock::Mock>,
) -> (wiremock::MockServer, Client, Homeserver) {
    let server = wiremock::MockServer::start().await;

    for mock in mocks {
        server.register(mock).await;
    }

    let client = Client::new(Some(ClientSettings {
        user_agent: "Lattice Rust-SDK [TEST]".into(),
        insecure_discovery: true,
        ..Default::default()
    }));

    let homeserver = Homeserver::parse(&server.uri()).expect("mock server URI is a valid base URL");

    (server, client, homeserver)
}
