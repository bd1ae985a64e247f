//! Conversions from external infrastructure errors into domain errors.

use mople_common::CommonError;
use mople_domain::MopleError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub MopleError);

impl From<InfraError> for MopleError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<MopleError> for InfraError {
    fn from(value: MopleError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoMopleError {
    fn into_mople(self) -> MopleError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → MopleError */
/* -------------------------------------------------------------------------- */

impl IntoMopleError for HttpError {
    fn into_mople(self) -> MopleError {
        if self.is_timeout() {
            return MopleError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return MopleError::Network("HTTP connection failure".into());
        }

        if self.is_builder() {
            return MopleError::InvalidInput(format!("invalid HTTP request: {self}"));
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => MopleError::Auth(message),
                404 => MopleError::NotFound(message),
                400..=499 => MopleError::InvalidInput(message),
                _ => MopleError::Network(message),
            };
        }

        if self.is_decode() {
            return MopleError::Serialization(format!("failed to decode HTTP body: {self}"));
        }

        MopleError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_mople())
    }
}

/* -------------------------------------------------------------------------- */
/* std::io / serde_json / toml → MopleError */
/* -------------------------------------------------------------------------- */

impl From<std::io::Error> for InfraError {
    fn from(value: std::io::Error) -> Self {
        InfraError(MopleError::Storage(format!("I/O failure: {value}")))
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(MopleError::Serialization(format!("invalid JSON: {value}")))
    }
}

impl From<toml::de::Error> for InfraError {
    fn from(value: toml::de::Error) -> Self {
        InfraError(MopleError::Config(format!("Invalid TOML format: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* CommonError → MopleError */
/* -------------------------------------------------------------------------- */

impl IntoMopleError for CommonError {
    fn into_mople(self) -> MopleError {
        let message = self.to_string();
        match self {
            CommonError::Config { .. } => MopleError::Config(message),
            CommonError::Lock { .. }
            | CommonError::AsyncTimeout { .. }
            | CommonError::Internal { .. } => MopleError::Internal(message),
        }
    }
}

impl From<CommonError> for InfraError {
    fn from(value: CommonError) -> Self {
        InfraError(value.into_mople())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
