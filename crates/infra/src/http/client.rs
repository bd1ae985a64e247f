use std::time::Duration;

use mople_domain::{ApiConfig, MopleError};
use reqwest::blocking::{Client as ReqwestClient, Request, RequestBuilder, Response};
use reqwest::Method;
use tracing::debug;

use crate::errors::InfraError;

/// Blocking HTTP transport with client-level timeouts.
///
/// Runs each call on the calling thread. A value must be built and dropped
/// outside an async execution context: the blocking reqwest client owns its
/// own runtime.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: ReqwestClient,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self, MopleError> {
        Self::builder().build()
    }

    /// Client configured from the API timeouts and user agent.
    pub fn from_config(config: &ApiConfig) -> Result<Self, MopleError> {
        let mut builder =
            Self::builder().timeout(config.timeout()).connect_timeout(config.connect_timeout());
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        builder.build()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Send one request and return whatever response arrives.
    pub fn execute(&self, request: Request) -> Result<Response, MopleError> {
        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, "sending HTTP request");

        match self.client.execute(request) {
            Ok(response) => {
                debug!(%method, %url, status = %response.status(), "received HTTP response");
                Ok(response)
            }
            Err(err) => {
                debug!(%method, %url, error = %err, "HTTP request failed");
                let infra: InfraError = err.into();
                Err(MopleError::from(infra))
            }
        }
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    connect_timeout: Duration,
    user_agent: Option<String>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: None,
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn build(self) -> Result<HttpClient, MopleError> {
        let mut builder = ReqwestClient::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        let client = builder.build().map_err(|err| {
            let infra: InfraError = err.into();
            MopleError::from(infra)
        })?;

        Ok(HttpClient { client })
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use reqwest::StatusCode;
    use tokio::runtime::Runtime;
    use wiremock::matchers::{header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn test_returns_response_of_any_status() {
        let runtime = Runtime::new().unwrap();
        let server = runtime.block_on(MockServer::start());
        runtime.block_on(
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(404))
                .expect(1)
                .mount(&server),
        );

        let client = HttpClient::new().unwrap();
        let request = client.request(Method::GET, server.uri()).build().unwrap();
        let response = client.execute(request).unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_sends_configured_user_agent() {
        let runtime = Runtime::new().unwrap();
        let server = runtime.block_on(MockServer::start());
        runtime.block_on(
            Mock::given(method("GET"))
                .and(header("user-agent", "mople-test/1.0"))
                .respond_with(ResponseTemplate::new(200))
                .expect(1)
                .mount(&server),
        );

        let config = ApiConfig {
            base_url: server.uri(),
            user_agent: Some("mople-test/1.0".into()),
            ..ApiConfig::default()
        };
        let client = HttpClient::from_config(&config).unwrap();
        let request = client.request(Method::GET, server.uri()).build().unwrap();

        assert_eq!(client.execute(request).unwrap().status(), StatusCode::OK);
    }

    #[test]
    fn test_connection_failure_maps_to_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener); // release the port so that requests fail with ECONNREFUSED

        let client = HttpClient::builder().connect_timeout(Duration::from_secs(1)).build().unwrap();
        let request = client.request(Method::GET, format!("http://{}", addr)).build().unwrap();

        match client.execute(request) {
            Err(MopleError::Network(_)) => {}
            other => panic!("expected network error, got {:?}", other.map(|r| r.status())),
        }
    }
}
