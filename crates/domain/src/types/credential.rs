//! Access/refresh token pair

use std::fmt;

use serde::{Deserialize, Serialize};

/// The access and refresh tokens issued by the Mople API.
///
/// The pair is opaque to the client and always handled as a unit: it is
/// created at sign-in, replaced wholesale on refresh and deleted on logout.
/// The wire and storage representation is camelCase JSON
/// (`{"accessToken": "...", "refreshToken": "..."}`).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: String,
}

impl Credential {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self { access_token: access_token.into(), refresh_token: refresh_token.into() }
    }

    /// Access token if it can be attached to a request.
    #[must_use]
    pub fn usable_access_token(&self) -> Option<&str> {
        let token = self.access_token.trim();
        (!token.is_empty()).then_some(token)
    }

    /// Refresh token if a refresh call can be attempted with it.
    #[must_use]
    pub fn usable_refresh_token(&self) -> Option<&str> {
        let token = self.refresh_token.trim();
        (!token.is_empty()).then_some(token)
    }
}

// Token material never reaches logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &redact(&self.access_token))
            .field("refresh_token", &redact(&self.refresh_token))
            .finish()
    }
}

fn redact(token: &str) -> String {
    if token.is_empty() {
        "<empty>".to_string()
    } else {
        format!("<redacted {} chars>", token.len())
    }
}
