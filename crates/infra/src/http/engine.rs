//! Authenticated request execution
//!
//! [`AuthenticatedClient`] runs every API call through the same pipeline:
//!
//! ```text
//! request ──► interceptors ──► send ──► 401? ──► authenticator ──► send once more
//!                                        │              │
//!                                        └─ otherwise ──┴─ no recovery ──► original response
//! ```
//!
//! Interceptors and the authenticator are invoked on the calling thread.

use std::sync::Arc;

use mople_domain::{ApiConfig, MopleError, Result};
use reqwest::blocking::{Request, RequestBuilder, Response};
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::client::HttpClient;
use crate::errors::InfraError;

/// Rewrites outgoing requests before they are sent.
pub trait Interceptor: Send + Sync {
    fn intercept(&self, request: Request) -> Request;
}

/// Status line and headers of a response that triggered authentication.
#[derive(Debug, Clone)]
pub struct ResponseHead {
    pub status: StatusCode,
    pub headers: HeaderMap,
}

impl ResponseHead {
    #[must_use]
    pub fn of(response: &Response) -> Self {
        Self { status: response.status(), headers: response.headers().clone() }
    }
}

/// Recovers from a `401 Unauthorized` response.
///
/// Returns the request to retry, or `None` to deliver the failed response to
/// the caller as final. Implementations never panic.
pub trait Authenticator: Send + Sync {
    fn authenticate(&self, request: &Request, response: &ResponseHead) -> Option<Request>;
}

/// HTTP engine for the Mople REST API.
pub struct AuthenticatedClient {
    http: HttpClient,
    config: ApiConfig,
    interceptors: Vec<Arc<dyn Interceptor>>,
    authenticator: Option<Arc<dyn Authenticator>>,
}

impl AuthenticatedClient {
    /// Create a builder for fluent configuration
    pub fn builder(config: ApiConfig) -> AuthenticatedClientBuilder {
        AuthenticatedClientBuilder { config, interceptors: Vec::new(), authenticator: None }
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Request builder for `path` relative to the API base URL.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.config.endpoint(path))
    }

    /// Build and execute `builder`.
    ///
    /// # Errors
    /// Returns error if the request cannot be built or the transport fails
    pub fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let request = builder.build().map_err(|e| MopleError::from(InfraError::from(e)))?;
        self.execute(request)
    }

    /// Execute one call through interceptors and, on `401`, the authenticator.
    ///
    /// The authenticator is consulted at most once per call; the retried
    /// request's response is returned whatever its status.
    ///
    /// # Errors
    /// Returns error only for transport failures. HTTP error statuses are
    /// returned as responses.
    #[instrument(skip(self, request), fields(method = %request.method(), url = %request.url()))]
    pub fn execute(&self, request: Request) -> Result<Response> {
        let request = self.interceptors.iter().fold(request, |req, i| i.intercept(req));

        let replay = match self.authenticator {
            Some(_) => request.try_clone(),
            None => None,
        };

        let response = self.http.execute(request)?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        let Some(authenticator) = &self.authenticator else {
            return Ok(response);
        };
        let Some(replay) = replay else {
            warn!("Request body cannot be replayed; returning 401 without authentication");
            return Ok(response);
        };

        match authenticator.authenticate(&replay, &ResponseHead::of(&response)) {
            Some(retry) => {
                debug!("Retrying request after authentication");
                drop(response);
                self.http.execute(retry)
            }
            None => {
                debug!("Authentication gave up; returning original response");
                Ok(response)
            }
        }
    }

    /// Execute a GET request and decode the JSON response
    ///
    /// # Errors
    /// Returns error if the request fails, the status is not a success, or
    /// the body cannot be deserialized
    pub fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.send(self.request(Method::GET, path))?;
        let result = Self::decode(response)?;
        info!(path = %path, "GET request successful");
        Ok(result)
    }

    /// Execute a POST request with a JSON body and decode the JSON response
    ///
    /// # Errors
    /// Returns error if the body cannot be serialized, the request fails, the
    /// status is not a success, or the response cannot be deserialized
    pub fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let response = self.send(self.request(Method::POST, path).json(body))?;
        let result = Self::decode(response)?;
        info!(path = %path, "POST request successful");
        Ok(result)
    }

    /// Execute a DELETE request, discarding any body
    ///
    /// # Errors
    /// Returns error if the request fails or the status is not a success
    pub fn delete(&self, path: &str) -> Result<()> {
        let response = self.send(self.request(Method::DELETE, path))?;
        let status = response.status();
        if !status.is_success() {
            let url = response.url().to_string();
            let body = response.text().unwrap_or_default();
            return Err(Self::map_status_error(status, &url, body));
        }
        info!(path = %path, "DELETE request successful");
        Ok(())
    }

    fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let url = response.url().to_string();
            let body = response.text().unwrap_or_default();
            return Err(Self::map_status_error(status, &url, body));
        }

        // 204/205 carry no body
        if status == StatusCode::NO_CONTENT || status == StatusCode::RESET_CONTENT {
            return serde_json::from_value(serde_json::Value::Null).map_err(|_| {
                MopleError::Serialization(format!(
                    "No content response ({}), but response type cannot be deserialized from empty body",
                    status.as_u16()
                ))
            });
        }

        response
            .json()
            .map_err(|e| MopleError::Serialization(format!("Failed to parse response: {e}")))
    }

    fn map_status_error(status: StatusCode, url: &str, body: String) -> MopleError {
        let message = if body.is_empty() {
            format!("{url} returned status {status}")
        } else {
            format!("{url} returned status {status}: {body}")
        };

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            MopleError::Auth(message)
        } else if status == StatusCode::NOT_FOUND {
            MopleError::NotFound(message)
        } else if status.is_client_error() {
            MopleError::InvalidInput(message)
        } else {
            MopleError::Network(message)
        }
    }
}

/// Builder for [`AuthenticatedClient`]
pub struct AuthenticatedClientBuilder {
    config: ApiConfig,
    interceptors: Vec<Arc<dyn Interceptor>>,
    authenticator: Option<Arc<dyn Authenticator>>,
}

impl AuthenticatedClientBuilder {
    /// Append an interceptor; interceptors run in insertion order.
    pub fn interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    pub fn authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticator = Some(authenticator);
        self
    }

    /// Build the client
    ///
    /// # Errors
    /// Returns error if the configuration is invalid or the transport cannot
    /// be created
    pub fn build(self) -> Result<AuthenticatedClient> {
        self.config.validate()?;
        let http = HttpClient::from_config(&self.config)?;
        Ok(AuthenticatedClient {
            http,
            config: self.config,
            interceptors: self.interceptors,
            authenticator: self.authenticator,
        })
    }
}
