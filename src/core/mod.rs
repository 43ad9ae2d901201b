// Core algorithm exports
pub mod availability;
pub mod config;
pub mod distance;
pub mod filters;
pub mod ranker;
pub mod scoring;
pub mod windows;

pub use availability::{resolve_payload, score_availability, AvailabilityFit};
pub use config::{PairingConfig, ScoringWeights};
pub use distance::{estimate_travel_minutes, haversine_miles};
pub use filters::{apply_hard_filters, validate_event, RestaurantProfile};
pub use ranker::{rank_restaurants_for_event, Ranker};
pub use scoring::{score_fit, FitScore};
pub use windows::{compute_dining_windows, DiningWindows};
