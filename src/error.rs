//! Error types for address validation, geocoding and backend calls.

use thiserror::Error;

/// Postal-code validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Input is not exactly five ASCII digits. Correctable by the user.
    #[error("postal code must be exactly 5 digits, got {input:?}")]
    InvalidFormat { input: String },

    /// Format is fine but the code is outside every delivery zone.
    #[error("delivery not available for postal code {postal_code}: {suggestion}")]
    DeliveryNotAvailable {
        postal_code: String,
        suggestion: String,
    },
}

/// Failures talking to the geocoding provider.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("geocoding request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("geocoding provider returned status {status}: {message}")]
    Status { status: String, message: String },

    #[error("invalid geocoding response: {0}")]
    InvalidResponse(String),
}

/// Address-book payload validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("address must not be empty")]
    EmptyAddress,

    #[error("phone number must have 10 digits, got {0:?}")]
    InvalidPhone(String),

    #[error("address is missing required field: {0}")]
    MissingField(&'static str),

    #[error("postal code {0:?} is not 5 digits")]
    InvalidPostalCode(String),
}

/// Failures talking to the address-book backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid backend url: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Payload(#[from] PayloadError),
}
