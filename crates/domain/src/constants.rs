//! Protocol and storage constants
//!
//! Centralized location for the wire-level names the client agrees on with
//! the Mople API.

/// Authorization scheme attached by the request interceptor.
pub const BEARER_SCHEME: &str = "Bearer";

/// Default path of the token refresh endpoint, relative to the API base URL.
pub const DEFAULT_REFRESH_PATH: &str = "/auth/recreate";

/// Default header carrying the refresh token on the refresh call.
pub const DEFAULT_REFRESH_HEADER: &str = "Refresh-Token";

/// Preference key under which the credential pair is persisted as one value.
pub const CREDENTIAL_PREFERENCE_KEY: &str = "credential";

pub const DEFAULT_API_BASE_URL: &str = "https://api.mople.app";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_STORE_READ_TIMEOUT_MS: u64 = 2_000;
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Capacity of the session event broadcast channel.
pub const SESSION_EVENT_CAPACITY: usize = 16;
