//! Pairing Algo - restaurant recommendations for scheduled events
//!
//! This library ranks candidate restaurants against an event in two phases.
//! Phase A scores intrinsic fit (service style, travel time, cuisine) and
//! computes dining windows; Phase B re-ranks once seating availability has
//! been observed. The engine is pure: no I/O and no shared state.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;

// Re-export commonly used types
pub use crate::core::{rank_restaurants_for_event, PairingConfig, Ranker, ScoringWeights};
pub use error::PairingError;
pub use models::{
    AvailabilityPayload, Event, PairingRecommendation, PairingResult, RankPairingsRequest,
    Restaurant, TimeWindow,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let ranker = Ranker::default();
        let weights = ranker.config().weights;
        assert!((weights.total() - 1.0).abs() < 1e-9);
        assert!(PairingConfig::default().validate().is_ok());
    }
}
