// Model exports
pub mod clock;
pub mod domain;
pub mod requests;
pub mod responses;
pub mod tags;

pub use domain::{
    AvailabilityPayload, AvailabilityRejection, Event, EventType, Exclusion, ExclusionReason,
    Location, MatchReason, MealIntent, PairingRecommendation, PairingResult, RecommendedWindows,
    RejectionReason, Restaurant, ScoreBreakdown, ScoreComponent, TimeWindow, TravelMode,
};
pub use requests::{ApplyAvailabilityRequest, RankPairingsRequest};
pub use responses::{ErrorResponse, HealthResponse, PairingsResponse, RankingPhase};
pub use tags::{GroupSignal, ServiceStyleTag, TagSet};
