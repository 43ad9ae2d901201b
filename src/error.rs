use thiserror::Error;

/// Errors surfaced by the pairing engine
///
/// `InvalidEvent` and `InvalidConfig` fail the whole call. `InvalidRestaurant`
/// describes a single record; the ranker turns it into an exclusion instead
/// of failing the batch. Bad availability payloads never reach this type, they
/// are reported as [`crate::models::RejectionReason`]s.
#[derive(Debug, Error)]
pub enum PairingError {
    #[error("invalid event: {0}")]
    InvalidEvent(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid restaurant: {0}")]
    InvalidRestaurant(String),
}
