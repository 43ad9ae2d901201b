use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::core::availability::{resolve_payload, score_availability, AvailabilityFit, PREFERRED_SLOT_SCORE};
use crate::core::config::{PairingConfig, ScoringWeights};
use crate::core::filters::{
    apply_hard_filters, require_event_location, resolved_location, validate_event,
    validate_restaurant, RestaurantProfile,
};
use crate::core::scoring::score_fit;
use crate::core::windows::compute_dining_windows;
use crate::error::PairingError;
use crate::models::{
    AvailabilityPayload, AvailabilityRejection, Event, Exclusion, ExclusionReason, MatchReason,
    PairingRecommendation, PairingResult, RejectionReason, Restaurant, ScoreBreakdown,
    ScoreComponent,
};

/// Pairing orchestrator
///
/// # Pipeline Stages
/// 1. Event validation (fails the whole call)
/// 2. Per-restaurant validation, location and travel-time lookup
/// 3. Hard filters (family-style, travel cap)
/// 4. Dining windows and Phase A fit scoring
/// 5. Optional Phase B availability scoring
/// 6. Weighted combination and deterministic ordering
///
/// Holds a validated config snapshot and nothing else, so one `Ranker` can
/// be shared freely across threads.
#[derive(Debug, Clone)]
pub struct Ranker {
    config: PairingConfig,
}

impl Ranker {
    pub fn new(config: PairingConfig) -> Result<Self, PairingError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn with_default_config() -> Self {
        Self {
            config: PairingConfig::default(),
        }
    }

    pub fn config(&self) -> &PairingConfig {
        &self.config
    }

    /// Rank candidate restaurants for an event
    ///
    /// # Arguments
    /// * `event` - The event to pair with
    /// * `restaurants` - Normalized candidate records
    /// * `travel_times` - Minutes from each restaurant to the event, keyed by restaurant id
    /// * `availability` - Phase B payloads, if any have arrived
    ///
    /// # Returns
    /// PairingResult with every non-excluded restaurant, including those
    /// still waiting on availability
    pub fn rank(
        &self,
        event: &Event,
        restaurants: &[Restaurant],
        travel_times: &HashMap<String, u32>,
        availability: Option<&[AvailabilityPayload]>,
    ) -> Result<PairingResult, PairingError> {
        validate_event(event)?;
        if event.location.is_none() {
            tracing::warn!("Event {} has no location, excluding every candidate", event.id);
        }

        let mut result = PairingResult {
            total_candidates: restaurants.len(),
            ..Default::default()
        };
        let mut seen: HashSet<&str> = HashSet::with_capacity(restaurants.len());

        for restaurant in restaurants {
            let outcome = if restaurant.id.is_empty() || seen.insert(restaurant.id.as_str()) {
                self.evaluate(event, restaurant, travel_times)
            } else {
                Err(ExclusionReason::DuplicateRestaurant)
            };

            match outcome {
                Ok(recommendation) => result.recommendations.push(recommendation),
                Err(reason) => {
                    tracing::debug!("Excluding restaurant {}: {}", restaurant.id, reason);
                    result.exclusions.push(Exclusion {
                        restaurant_id: restaurant.id.clone(),
                        reason,
                    });
                }
            }
        }

        if let Some(payloads) = availability {
            result.availability_rejections =
                self.merge_availability(event, &mut result.recommendations, payloads);
        }

        sort_recommendations(&mut result.recommendations);

        tracing::debug!(
            "Ranked {} of {} candidates for event {} ({} excluded)",
            result.recommendations.len(),
            result.total_candidates,
            event.id,
            result.exclusions.len()
        );

        Ok(result)
    }

    /// Apply Phase B availability to an existing Phase A list and re-rank
    ///
    /// Recommendations without a valid payload pass through untouched.
    pub fn apply_availability(
        &self,
        event: &Event,
        mut recommendations: Vec<PairingRecommendation>,
        payloads: &[AvailabilityPayload],
    ) -> Result<PairingResult, PairingError> {
        validate_event(event)?;

        let availability_rejections = self.merge_availability(event, &mut recommendations, payloads);
        sort_recommendations(&mut recommendations);

        Ok(PairingResult {
            total_candidates: recommendations.len(),
            recommendations,
            exclusions: Vec::new(),
            availability_rejections,
        })
    }

    fn evaluate(
        &self,
        event: &Event,
        restaurant: &Restaurant,
        travel_times: &HashMap<String, u32>,
    ) -> Result<PairingRecommendation, ExclusionReason> {
        validate_restaurant(restaurant).map_err(|e| ExclusionReason::InvalidRestaurant {
            detail: e.to_string(),
        })?;

        require_event_location(event)?;
        resolved_location(restaurant).ok_or(ExclusionReason::MissingLocation)?;

        let travel_minutes = travel_times
            .get(&restaurant.id)
            .copied()
            .ok_or(ExclusionReason::MissingTravelTime)?;

        let profile = RestaurantProfile::new(restaurant);
        for tag in profile.unknown_tags() {
            tracing::debug!("Ignoring unknown tag '{}' on restaurant {}", tag, restaurant.id);
        }

        apply_hard_filters(event, &profile, travel_minutes, &self.config)?;

        let dining = compute_dining_windows(event, travel_minutes, &self.config);
        let fit = score_fit(event, &profile, travel_minutes, &self.config);

        let mut recommendation = PairingRecommendation {
            restaurant_id: restaurant.id.clone(),
            name: restaurant.name.clone(),
            score: 0.0,
            score_breakdown: ScoreBreakdown {
                service_style: fit.service_style,
                travel_time: fit.travel_time,
                cuisine: fit.cuisine,
                availability_fit: None,
            },
            recommended_windows: dining.windows,
            service_date: dining.target_time.date(),
            target_time: dining.target_time.time(),
            travel_time_minutes: travel_minutes,
            availability_pending: true,
            recommended_available_times: None,
            why_matched: fit.reasons,
        };
        finalize(&mut recommendation, &self.config.weights);

        Ok(recommendation)
    }

    /// Score every usable payload into the matching recommendation, returning
    /// the payloads that were ignored
    fn merge_availability(
        &self,
        event: &Event,
        recommendations: &mut [PairingRecommendation],
        payloads: &[AvailabilityPayload],
    ) -> Vec<AvailabilityRejection> {
        let positions: HashMap<String, usize> = recommendations
            .iter()
            .enumerate()
            .map(|(i, r)| (r.restaurant_id.clone(), i))
            .collect();
        let mut applied: HashSet<&str> = HashSet::new();
        let mut rejections = Vec::new();

        for payload in payloads {
            let outcome = match positions.get(&payload.restaurant_id) {
                None => Err(RejectionReason::NotRanked),
                Some(_) if !applied.insert(payload.restaurant_id.as_str()) => {
                    Err(RejectionReason::DuplicatePayload)
                }
                Some(&index) => {
                    let recommendation = &mut recommendations[index];
                    let target = recommendation.target_at();
                    resolve_payload(payload, event, target).map(|slots| {
                        let fit = score_availability(
                            &slots,
                            &recommendation.recommended_windows,
                            target,
                            &self.config,
                        );
                        apply_fit(recommendation, fit);
                        finalize(recommendation, &self.config.weights);
                    })
                }
            };

            if let Err(reason) = outcome {
                tracing::warn!(
                    "Ignoring availability payload for {}: {}",
                    payload.restaurant_id,
                    reason
                );
                rejections.push(AvailabilityRejection {
                    restaurant_id: payload.restaurant_id.clone(),
                    reason,
                });
            }
        }

        rejections
    }
}

impl Default for Ranker {
    fn default() -> Self {
        Self::with_default_config()
    }
}

/// Rank restaurants for an event with an optional config override
///
/// Convenience wrapper over [`Ranker`] for one-off calls; the default config
/// applies when `config` is `None`.
pub fn rank_restaurants_for_event(
    event: &Event,
    restaurants: &[Restaurant],
    travel_times: &HashMap<String, u32>,
    availability: Option<&[AvailabilityPayload]>,
    config: Option<&PairingConfig>,
) -> Result<Vec<PairingRecommendation>, PairingError> {
    let ranker = match config {
        Some(config) => Ranker::new(config.clone())?,
        None => Ranker::with_default_config(),
    };

    ranker
        .rank(event, restaurants, travel_times, availability)
        .map(|result| result.recommendations)
}

fn apply_fit(recommendation: &mut PairingRecommendation, fit: AvailabilityFit) {
    let reason = match fit.recommended_times.first() {
        Some(time) if fit.score >= PREFERRED_SLOT_SCORE => format!("Table open at {time}"),
        Some(time) => format!("Table open at {time}, outside the ideal window"),
        None => "No open tables near the event".to_string(),
    };

    recommendation
        .why_matched
        .retain(|r| r.factor != ScoreComponent::Availability);
    recommendation
        .why_matched
        .push(MatchReason::new(ScoreComponent::Availability, reason));

    recommendation.score_breakdown.availability_fit = Some(fit.score);
    recommendation.recommended_available_times = Some(fit.recommended_times);
}

/// Recompute the combined score and reason order from the breakdown
fn finalize(recommendation: &mut PairingRecommendation, weights: &ScoringWeights) {
    let breakdown = &recommendation.score_breakdown;
    let active = weights.active(breakdown.availability_fit.is_some());

    let combined = breakdown.service_style * active.service_style
        + breakdown.travel_time * active.travel_time
        + breakdown.cuisine * active.cuisine
        + breakdown.availability_fit.unwrap_or(0.0) * active.availability;

    recommendation.score = round_to_tenth(combined.clamp(0.0, 100.0));
    recommendation.availability_pending = breakdown.availability_fit.is_none();

    // stable, so reasons within one factor keep their order
    recommendation.why_matched.sort_by(|a, b| {
        active
            .weight_of(b.factor)
            .total_cmp(&active.weight_of(a.factor))
    });
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Score descending, then travel time ascending, then restaurant id ascending
pub fn compare_recommendations(a: &PairingRecommendation, b: &PairingRecommendation) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.travel_time_minutes.cmp(&b.travel_time_minutes))
        .then_with(|| a.restaurant_id.cmp(&b.restaurant_id))
}

pub fn sort_recommendations(recommendations: &mut [PairingRecommendation]) {
    recommendations.sort_by(compare_recommendations);
}
