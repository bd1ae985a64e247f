//! HTTP client for the token refresh endpoint

use mople_core::{RefreshError, TokenRefreshApi};
use mople_domain::{ApiConfig, Credential, MopleError, Result};
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::Method;
use serde::Deserialize;
use tracing::debug;

use crate::http::HttpClient;

/// Wire shape of a successful refresh response.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    access_token: String,
    refresh_token: String,
}

/// [`TokenRefreshApi`] calling `POST {base_url}{refresh_path}`.
///
/// Owns a bare [`HttpClient`] with no interceptor and no authenticator, so a
/// failing refresh is never itself authenticated.
pub struct HttpTokenRefreshApi {
    http: HttpClient,
    url: String,
    header: HeaderName,
}

impl HttpTokenRefreshApi {
    /// # Errors
    /// Returns `MopleError::Config` if the refresh header name is not a valid
    /// HTTP header name, or the transport cannot be created.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let header = HeaderName::from_bytes(config.refresh_header.trim().as_bytes()).map_err(|e| {
            MopleError::Config(format!(
                "api.refresh_header '{}' is not a valid header name: {e}",
                config.refresh_header
            ))
        })?;
        let http = HttpClient::from_config(config)?;
        Ok(Self { http, url: config.refresh_url(), header })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl TokenRefreshApi for HttpTokenRefreshApi {
    fn refresh(&self, refresh_token: &str) -> std::result::Result<Credential, RefreshError> {
        let refresh_token = refresh_token.trim();
        if refresh_token.is_empty() {
            return Err(RefreshError::NoRefreshToken);
        }
        let Ok(mut value) = HeaderValue::from_str(refresh_token) else {
            debug!("Stored refresh token is not a valid header value");
            return Err(RefreshError::NoRefreshToken);
        };
        value.set_sensitive(true);

        let request = self
            .http
            .request(Method::POST, &self.url)
            .header(self.header.clone(), value)
            .build()
            .map_err(|e| RefreshError::Network(e.to_string()))?;

        let response = self.http.execute(request).map_err(|e| RefreshError::Network(e.to_string()))?;
        let status = response.status();
        debug!(status = status.as_u16(), "Refresh endpoint responded");

        if status.is_client_error() {
            return Err(RefreshError::Rejected { status: status.as_u16() });
        }
        if !status.is_success() {
            return Err(RefreshError::Server { status: status.as_u16() });
        }

        let body: RefreshResponse = response
            .json()
            .map_err(|e| RefreshError::MalformedResponse(format!("invalid refresh body: {e}")))?;
        let credential = Credential::new(body.access_token, body.refresh_token);
        if credential.usable_access_token().is_none() || credential.usable_refresh_token().is_none() {
            return Err(RefreshError::MalformedResponse("refresh body carries an empty token".into()));
        }
        Ok(credential)
    }
}

#[cfg(test)]
mod tests {
    use tokio::runtime::Runtime;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn api_for(server: &MockServer) -> HttpTokenRefreshApi {
        let config = ApiConfig { base_url: server.uri(), ..ApiConfig::default() };
        HttpTokenRefreshApi::new(&config).unwrap()
    }

    fn respond(runtime: &Runtime, server: &MockServer, template: ResponseTemplate) {
        runtime.block_on(
            Mock::given(method("POST"))
                .and(path("/auth/recreate"))
                .and(header("Refresh-Token", "B1"))
                .respond_with(template)
                .mount(server),
        );
    }

    #[test]
    fn test_exchanges_refresh_token_for_new_pair() {
        let runtime = Runtime::new().unwrap();
        let server = runtime.block_on(MockServer::start());
        respond(
            &runtime,
            &server,
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"accessToken": "A2", "refreshToken": "B2"})),
        );

        let credential = api_for(&server).refresh("B1").unwrap();

        assert_eq!(credential, Credential::new("A2", "B2"));
    }

    #[test]
    fn test_client_error_is_rejection() {
        let runtime = Runtime::new().unwrap();
        let server = runtime.block_on(MockServer::start());
        respond(&runtime, &server, ResponseTemplate::new(401));

        let err = api_for(&server).refresh("B1").unwrap_err();

        assert!(matches!(err, RefreshError::Rejected { status: 401 }));
    }

    #[test]
    fn test_server_error_is_not_rejection() {
        let runtime = Runtime::new().unwrap();
        let server = runtime.block_on(MockServer::start());
        respond(&runtime, &server, ResponseTemplate::new(503));

        let err = api_for(&server).refresh("B1").unwrap_err();

        assert!(matches!(err, RefreshError::Server { status: 503 }));
    }

    #[test]
    fn test_empty_token_body_is_malformed() {
        let runtime = Runtime::new().unwrap();
        let server = runtime.block_on(MockServer::start());
        respond(
            &runtime,
            &server,
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"accessToken": "", "refreshToken": "B2"})),
        );

        let err = api_for(&server).refresh("B1").unwrap_err();

        assert!(matches!(err, RefreshError::MalformedResponse(_)));
    }

    #[test]
    fn test_blank_refresh_token_makes_no_call() {
        let runtime = Runtime::new().unwrap();
        let server = runtime.block_on(MockServer::start());

        let err = api_for(&server).refresh("  ").unwrap_err();

        assert!(matches!(err, RefreshError::NoRefreshToken));
        assert!(runtime.block_on(server.received_requests()).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_header_name_is_config_error() {
        let config = ApiConfig { refresh_header: "bad header".into(), ..ApiConfig::default() };
        assert!(matches!(HttpTokenRefreshApi::new(&config), Err(MopleError::Config(_))));
    }
}
