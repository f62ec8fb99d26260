//! Conversions from external infrastructure errors into domain errors.

use hubspot_sync_domain::{ConnectorError, RateLimitInfo};
use reqwest::Error as HttpError;
use serde_json::Error as JsonError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub ConnectorError);

impl From<InfraError> for ConnectorError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<ConnectorError> for InfraError {
    fn from(value: ConnectorError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoConnectorError {
    fn into_connector(self) -> ConnectorError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → ConnectorError */
/* -------------------------------------------------------------------------- */

impl IntoConnectorError for HttpError {
    fn into_connector(self) -> ConnectorError {
        if self.is_timeout() {
            return ConnectorError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return ConnectorError::Network("HTTP connection failure".into());
        }

        // Only produced by `error_for_status`; rate-limit headers are gone by
        // then, so the info stays zero-valued.
        if let Some(status) = self.status() {
            return ConnectorError::Http {
                status: status.as_u16(),
                rate_limit: RateLimitInfo::default(),
            };
        }

        if self.is_decode() {
            return ConnectorError::Decode(format!("failed to decode response body: {self}"));
        }

        if self.is_builder() {
            return ConnectorError::InvalidInput(format!("invalid HTTP request: {self}"));
        }

        ConnectorError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_connector())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → ConnectorError */
/* -------------------------------------------------------------------------- */

impl IntoConnectorError for JsonError {
    fn into_connector(self) -> ConnectorError {
        ConnectorError::Decode(format!(
            "invalid JSON at line {} column {}: {self}",
            self.line(),
            self.column()
        ))
    }
}

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        InfraError(value.into_connector())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use reqwest::{Client, StatusCode};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn http_status_maps_to_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(StatusCode::FORBIDDEN))
            .mount(&server)
            .await;

        let client = Client::builder().no_proxy().build().unwrap();
        let error = client.get(server.uri()).send().await.unwrap().error_for_status().unwrap_err();

        let mapped: ConnectorError = InfraError::from(error).into();
        assert_eq!(
            mapped,
            ConnectorError::Http { status: 403, rate_limit: RateLimitInfo::default() }
        );
    }

    #[tokio::test]
    async fn timeout_maps_to_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let client =
            Client::builder().no_proxy().timeout(Duration::from_millis(50)).build().unwrap();
        let error = client.get(server.uri()).send().await.unwrap_err();

        let mapped: ConnectorError = InfraError::from(error).into();
        assert_eq!(mapped, ConnectorError::Network("HTTP request timed out".into()));
    }

    #[tokio::test]
    async fn body_decode_failure_maps_to_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = Client::builder().no_proxy().build().unwrap();
        let error = client
            .get(server.uri())
            .send()
            .await
            .unwrap()
            .json::<serde_json::Value>()
            .await
            .unwrap_err();

        let mapped: ConnectorError = InfraError::from(error).into();
        assert!(matches!(mapped, ConnectorError::Decode(_)), "got {mapped:?}");
    }

    #[test]
    fn json_error_maps_to_decode_error() {
        let error = serde_json::from_str::<serde_json::Value>("{\"results\": [").unwrap_err();

        match ConnectorError::from(InfraError::from(error)) {
            ConnectorError::Decode(msg) => assert!(msg.contains("line 1")),
            other => panic!("expected decode error, got {other:?}"),
        }
    }
}
