use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

use crate::core::config::PairingConfig;
use crate::models::domain::{AvailabilityPayload, Event, PairingRecommendation, Restaurant};

/// Request to rank restaurants for an event (Phase A, or Phase B when
/// availability is included)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RankPairingsRequest {
    #[validate(nested)]
    pub event: Event,
    #[serde(default)]
    pub restaurants: Vec<Restaurant>,
    /// Minutes keyed by restaurant id
    #[serde(default)]
    pub travel_times: HashMap<String, u32>,
    #[serde(default)]
    pub availability: Option<Vec<AvailabilityPayload>>,
    /// Replaces the server's engine config for this call only
    #[serde(default)]
    pub config: Option<PairingConfig>,
    /// Fill missing travel times with a straight-line estimate
    #[serde(default)]
    pub estimate_missing_travel_times: bool,
}

/// Request to re-rank an already rendered Phase A list once the browser has
/// collected availability
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ApplyAvailabilityRequest {
    #[validate(nested)]
    pub event: Event,
    #[serde(default)]
    pub recommendations: Vec<PairingRecommendation>,
    #[serde(default)]
    pub availability: Vec<AvailabilityPayload>,
    #[serde(default)]
    pub config: Option<PairingConfig>,
}
