use actix_web::{web, HttpResponse, Responder};
use std::collections::HashMap;
use validator::Validate;

use crate::core::{estimate_travel_minutes, PairingConfig, Ranker};
use crate::error::PairingError;
use crate::models::{
    ApplyAvailabilityRequest, ErrorResponse, Event, HealthResponse, PairingResult,
    PairingsResponse, RankPairingsRequest, RankingPhase, Restaurant,
};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub ranker: Ranker,
}

/// Configure all pairing-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/pairings/rank", web::post().to(rank_pairings))
        .route("/pairings/availability", web::post().to(apply_availability));
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

fn bad_request(error: &str, message: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: 400,
    })
}

fn error_response(err: &PairingError) -> HttpResponse {
    let error = match err {
        PairingError::InvalidEvent(_) => "Invalid event",
        PairingError::InvalidConfig(_) => "Invalid configuration",
        PairingError::InvalidRestaurant(_) => "Invalid restaurant",
    };
    bad_request(error, err.to_string())
}

/// The server's ranker, or a fresh one built from a per-request override
fn ranker_for(state: &AppState, config: Option<&PairingConfig>) -> Result<Ranker, PairingError> {
    match config {
        Some(config) => Ranker::new(config.clone()),
        None => Ok(state.ranker.clone()),
    }
}

/// Fill gaps in the travel-time map with straight-line estimates
fn fill_travel_estimates(
    event: &Event,
    restaurants: &[Restaurant],
    travel_times: &mut HashMap<String, u32>,
    config: &PairingConfig,
) -> usize {
    let Some(event_location) = event.location else {
        return 0;
    };

    let mut filled = 0;
    for restaurant in restaurants {
        if travel_times.contains_key(&restaurant.id) {
            continue;
        }
        let Some(location) = restaurant.location else {
            continue;
        };
        if let Some(minutes) =
            estimate_travel_minutes(&location, &event_location, config.default_travel_speed_mph)
        {
            travel_times.insert(restaurant.id.clone(), minutes);
            filled += 1;
        }
    }
    filled
}

fn into_response(result: PairingResult, phase: RankingPhase) -> PairingsResponse {
    PairingsResponse {
        request_id: uuid::Uuid::new_v4().to_string(),
        phase,
        recommendations: result.recommendations,
        exclusions: result.exclusions,
        availability_rejections: result.availability_rejections,
        total_candidates: result.total_candidates,
    }
}

/// Rank restaurants for an event
///
/// POST /api/v1/pairings/rank
///
/// Request body:
/// ```json
/// {
///   "event": { "id": "evt-1", "type": "SHOW", "startAt": "2024-01-15T19:00:00-08:00",
///              "mealIntent": "BEFORE_EVENT", "partySize": 2 },
///   "restaurants": [ { "id": "r1", "name": "Trattoria", "location": { "lat": 37.77, "lng": -122.41 } } ],
///   "travelTimes": { "r1": 10 },
///   "availability": null,
///   "estimateMissingTravelTimes": false
/// }
/// ```
async fn rank_pairings(
    state: web::Data<AppState>,
    req: web::Json<RankPairingsRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for rank request: {}", errors);
        return bad_request("Validation failed", errors.to_string());
    }

    let req = req.into_inner();

    let ranker = match ranker_for(&state, req.config.as_ref()) {
        Ok(ranker) => ranker,
        Err(e) => return error_response(&e),
    };

    let mut travel_times = req.travel_times;
    if req.estimate_missing_travel_times {
        let filled = fill_travel_estimates(&req.event, &req.restaurants, &mut travel_times, ranker.config());
        tracing::debug!("Estimated {} missing travel times for event {}", filled, req.event.id);
    }

    let phase = if req.availability.is_some() {
        RankingPhase::Availability
    } else {
        RankingPhase::Fit
    };

    match ranker.rank(&req.event, &req.restaurants, &travel_times, req.availability.as_deref()) {
        Ok(result) => {
            tracing::info!(
                "Ranked {} restaurants for event {}: {} recommended, {} excluded, {} payloads rejected",
                result.total_candidates,
                req.event.id,
                result.recommendations.len(),
                result.exclusions.len(),
                result.availability_rejections.len()
            );
            HttpResponse::Ok().json(into_response(result, phase))
        }
        Err(e) => {
            tracing::info!("Rank request for event {} failed: {}", req.event.id, e);
            error_response(&e)
        }
    }
}

/// Re-rank a Phase A list once the client has observed availability
///
/// POST /api/v1/pairings/availability
async fn apply_availability(
    state: web::Data<AppState>,
    req: web::Json<ApplyAvailabilityRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for availability request: {}", errors);
        return bad_request("Validation failed", errors.to_string());
    }

    let req = req.into_inner();

    let ranker = match ranker_for(&state, req.config.as_ref()) {
        Ok(ranker) => ranker,
        Err(e) => return error_response(&e),
    };

    match ranker.apply_availability(&req.event, req.recommendations, &req.availability) {
        Ok(result) => {
            tracing::info!(
                "Applied {} availability payloads for event {} ({} rejected)",
                req.availability.len(),
                req.event.id,
                result.availability_rejections.len()
            );
            HttpResponse::Ok().json(into_response(result, RankingPhase::Availability))
        }
        Err(e) => {
            tracing::info!("Availability request for event {} failed: {}", req.event.id, e);
            error_response(&e)
        }
    }
}
