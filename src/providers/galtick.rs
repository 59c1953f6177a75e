//! The tick.infomancer.uk feed implementation of [`TickSource`].

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use super::{TickSource, TickSourceError};
use crate::models::TickValue;

/// Shape of the feed body. Only the tick field matters; anything else in the
/// document is ignored.
#[derive(Debug, Deserialize)]
struct GaltickResponse {
    #[serde(rename = "lastGalaxyTick")]
    last_galaxy_tick: String,
}

/// Fetches the galaxy tick from the community JSON feed over HTTP.
#[derive(Debug, Clone)]
pub struct GaltickSource {
    client: reqwest::Client,
    url: Url,
}

impl GaltickSource {
    /// Creates a source polling `url` with the given client. The client is
    /// expected to carry the request deadline (see
    /// [`crate::http_client::create_http_client`]).
    pub fn new(client: reqwest::Client, url: Url) -> Self {
        Self { client, url }
    }

    /// The feed URL this source polls.
    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl TickSource for GaltickSource {
    async fn fetch_tick(&self) -> Result<TickValue, TickSourceError> {
        let response = self.client.get(self.url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TickSourceError::Status(status));
        }

        let body: GaltickResponse = response
            .json()
            .await
            .map_err(|e| TickSourceError::MalformedBody(e.to_string()))?;

        Ok(TickValue::new(body.last_galaxy_tick))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source_for(server: &mockito::Server) -> GaltickSource {
        let url = Url::parse(&format!("{}/galtick.json", server.url())).unwrap();
        GaltickSource::new(reqwest::Client::new(), url)
    }

    #[tokio::test]
    async fn fetch_tick_returns_the_tick_field() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/galtick.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"lastGalaxyTick":"2025-01-01T00:00:00Z","extra":"ignored"}"#)
            .create_async()
            .await;

        let tick = source_for(&server).fetch_tick().await.unwrap();
        assert_eq!(tick, TickValue::new("2025-01-01T00:00:00Z"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_2xx_status_is_a_status_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/galtick.json")
            .with_status(503)
            .create_async()
            .await;

        let err = source_for(&server).fetch_tick().await.unwrap_err();
        assert!(matches!(err, TickSourceError::Status(s) if s.as_u16() == 503));
    }

    #[tokio::test]
    async fn missing_tick_field_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/galtick.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"somethingElse":true}"#)
            .create_async()
            .await;

        let err = source_for(&server).fetch_tick().await.unwrap_err();
        assert!(matches!(err, TickSourceError::MalformedBody(_)));
    }

    #[tokio::test]
    async fn non_json_body_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/galtick.json")
            .with_status(200)
            .with_body("<html>down for maintenance</html>")
            .create_async()
            .await;

        let err = source_for(&server).fetch_tick().await.unwrap_err();
        assert!(matches!(err, TickSourceError::MalformedBody(_)));
    }

    #[tokio::test]
    async fn connection_error_is_a_network_error() {
        // Nothing listens on this port.
        let url = Url::parse("http://127.0.0.1:9/galtick.json").unwrap();
        let source = GaltickSource::new(reqwest::Client::new(), url);

        let err = source.fetch_tick().await.unwrap_err();
        assert!(matches!(err, TickSourceError::Network(_)));
    }

    #[tokio::test]
    async fn exceeding_the_deadline_is_a_timeout() {
        // A listener that accepts connections and never answers, so the
        // request can only end by hitting the client deadline.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(200))
            .build()
            .unwrap();
        let url = Url::parse(&format!("http://{addr}/galtick.json")).unwrap();

        let err = GaltickSource::new(client, url).fetch_tick().await.unwrap_err();
        assert!(matches!(err, TickSourceError::Timeout));
    }
}
