//! Bearer authentication for API calls
//!
//! - `header`: building and reading `Authorization: Bearer` values
//! - `credentials`: blocking access to the async credential store
//! - `interceptor`: attaches the current access token to outgoing requests
//! - `authenticator`: single-flight token refresh on `401`
//! - `refresh_api`: HTTP implementation of the refresh endpoint

pub mod authenticator;
pub mod credentials;
pub mod header;
pub mod interceptor;
pub mod refresh_api;

pub use authenticator::RefreshAuthenticator;
pub use credentials::{BlockingCredentials, WriteStatus};
pub use header::{bearer_header_value, bearer_token};
pub use interceptor::BearerInterceptor;
pub use refresh_api::HttpTokenRefreshApi;
