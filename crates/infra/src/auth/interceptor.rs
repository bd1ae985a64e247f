use reqwest::blocking::Request;
use reqwest::header::AUTHORIZATION;
use tracing::{trace, warn};

use super::credentials::BlockingCredentials;
use super::header::bearer_header_value;
use crate::http::Interceptor;

/// Attaches `Authorization: Bearer <access token>` to every outgoing request.
///
/// With no usable access token the request goes out unmodified. A failed or
/// timed-out store read is logged and also forwards the request unmodified;
/// the server's `401` then drives the refresh path.
pub struct BearerInterceptor {
    credentials: BlockingCredentials,
}

impl BearerInterceptor {
    #[must_use]
    pub fn new(credentials: BlockingCredentials) -> Self {
        Self { credentials }
    }
}

impl Interceptor for BearerInterceptor {
    fn intercept(&self, mut request: Request) -> Request {
        let credential = match self.credentials.current() {
            Ok(credential) => credential,
            Err(e) => {
                warn!(error = %e, "Credential read failed; sending request without token");
                return request;
            }
        };

        let Some(value) =
            credential.as_ref().and_then(|c| c.usable_access_token()).and_then(bearer_header_value)
        else {
            trace!(url = %request.url(), "No access token; sending request unauthenticated");
            return request;
        };

        request.headers_mut().insert(AUTHORIZATION, value);
        request
    }
}
