//! Conversions from external infrastructure errors into domain errors.

use std::io::{Error as IoError, ErrorKind};

use carcare_domain::CarCareError;
use reqwest::{Error as HttpError, StatusCode};

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct InfraError(pub CarCareError);

impl From<InfraError> for CarCareError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<CarCareError> for InfraError {
    fn from(value: CarCareError) -> Self {
        InfraError(value)
    }
}

trait IntoCarCareError {
    fn into_carcare(self) -> CarCareError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → CarCareError */
/* -------------------------------------------------------------------------- */

impl IntoCarCareError for HttpError {
    fn into_carcare(self) -> CarCareError {
        if self.is_timeout() {
            return CarCareError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return CarCareError::Network("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            return InfraError::from_status(status, None).0;
        }

        if self.is_decode() {
            return CarCareError::InvalidInput(format!("unexpected response body: {self}"));
        }

        CarCareError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_carcare())
    }
}

impl InfraError {
    /// Map a non-success HTTP status (plus an optional server message).
    pub fn from_status(status: StatusCode, detail: Option<&str>) -> Self {
        let code = status.as_u16();
        let mut message =
            format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));
        if let Some(detail) = detail.map(str::trim).filter(|detail| !detail.is_empty()) {
            message.push_str(": ");
            message.push_str(detail);
        }

        InfraError(match code {
            401 | 403 => CarCareError::Auth(message),
            404 => CarCareError::NotFound(message),
            429 => CarCareError::Network(message),
            400..=499 => CarCareError::InvalidInput(message),
            _ => CarCareError::Network(message),
        })
    }
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → CarCareError */
/* -------------------------------------------------------------------------- */

impl IntoCarCareError for IoError {
    fn into_carcare(self) -> CarCareError {
        match self.kind() {
            ErrorKind::NotFound => CarCareError::NotFound(self.to_string()),
            ErrorKind::PermissionDenied => {
                CarCareError::Platform(format!("permission denied: {self}"))
            }
            ErrorKind::AddrInUse | ErrorKind::AddrNotAvailable => {
                CarCareError::Network(format!("address unavailable: {self}"))
            }
            _ => CarCareError::Platform(self.to_string()),
        }
    }
}

impl From<IoError> for InfraError {
    fn from(value: IoError) -> Self {
        InfraError(value.into_carcare())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
