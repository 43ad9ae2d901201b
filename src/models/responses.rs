use serde::{Deserialize, Serialize};

use crate::models::domain::{AvailabilityRejection, Exclusion, PairingRecommendation};

/// Which ranking phase produced a response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RankingPhase {
    /// Fit only, availability unknown
    Fit,
    /// Availability payloads were supplied and applied where valid
    Availability,
}

/// Response for both ranking endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairingsResponse {
    pub request_id: String,
    pub phase: RankingPhase,
    pub recommendations: Vec<PairingRecommendation>,
    pub exclusions: Vec<Exclusion>,
    pub availability_rejections: Vec<AvailabilityRejection>,
    pub total_candidates: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
