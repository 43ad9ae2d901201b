use std::collections::BTreeSet;
use validator::Validate;

use crate::core::config::PairingConfig;
use crate::error::PairingError;
use crate::models::tags::FAMILY_SERVICE_TAGS;
use crate::models::{Event, ExclusionReason, GroupSignal, Location, Restaurant, ServiceStyleTag, TagSet};

/// A restaurant with its tag strings parsed against the fixed vocabulary
#[derive(Debug, Clone)]
pub struct RestaurantProfile<'a> {
    pub restaurant: &'a Restaurant,
    pub service_styles: TagSet<ServiceStyleTag>,
    pub group_signals: TagSet<GroupSignal>,
    /// Lowercased cuisine tags
    pub cuisines: BTreeSet<String>,
}

impl<'a> RestaurantProfile<'a> {
    pub fn new(restaurant: &'a Restaurant) -> Self {
        Self {
            restaurant,
            service_styles: TagSet::parse(&restaurant.service_style_tags),
            group_signals: TagSet::parse(&restaurant.group_signals),
            cuisines: restaurant
                .cuisine_tags
                .iter()
                .map(|c| c.trim().to_lowercase())
                .filter(|c| !c.is_empty())
                .collect(),
        }
    }

    pub fn has_family_service(&self) -> bool {
        self.service_styles.intersects(&FAMILY_SERVICE_TAGS)
    }

    /// Raw tags that are not part of the vocabulary
    pub fn unknown_tags(&self) -> impl Iterator<Item = &String> {
        self.service_styles
            .unknown
            .iter()
            .chain(self.group_signals.unknown.iter())
    }
}

/// Check the top-level event before any work is done
pub fn validate_event(event: &Event) -> Result<(), PairingError> {
    event
        .validate()
        .map_err(|e| PairingError::InvalidEvent(e.to_string()))?;

    if let Some(end_at) = event.end_at {
        if end_at < event.start_at {
            return Err(PairingError::InvalidEvent(format!(
                "event '{}' ends ({}) before it starts ({})",
                event.id, end_at, event.start_at
            )));
        }
    }

    if let Some(location) = event.location {
        if !location.is_valid() {
            return Err(PairingError::InvalidEvent(format!(
                "event '{}' has out-of-range coordinates ({}, {})",
                event.id, location.lat, location.lng
            )));
        }
    }

    Ok(())
}

/// Field-level restaurant checks (id present)
pub fn validate_restaurant(restaurant: &Restaurant) -> Result<(), PairingError> {
    restaurant
        .validate()
        .map_err(|e| PairingError::InvalidRestaurant(e.to_string()))
}

/// Event coordinates, required before any travel-dependent scoring
pub fn require_event_location(event: &Event) -> Result<Location, ExclusionReason> {
    event.location.ok_or(ExclusionReason::MissingEventLocation)
}

/// The restaurant's coordinates, if geocoding produced usable ones
pub fn resolved_location(restaurant: &Restaurant) -> Option<Location> {
    restaurant.location.filter(Location::is_valid)
}

/// Family-type events need family-style or share-plates service, unless the
/// requirement is switched off in config
pub fn passes_family_style_filter(
    event: &Event,
    profile: &RestaurantProfile<'_>,
    config: &PairingConfig,
) -> bool {
    !config.require_family_style_for_family_events
        || !config.is_family_event(event.event_type)
        || profile.has_family_service()
}

/// Check all hard filters, returning the first failing reason
#[inline]
pub fn apply_hard_filters(
    event: &Event,
    profile: &RestaurantProfile<'_>,
    travel_minutes: u32,
    config: &PairingConfig,
) -> Result<(), ExclusionReason> {
    if !passes_family_style_filter(event, profile, config) {
        return Err(ExclusionReason::NotFamilyStyle);
    }

    let cap = config.travel_cap_for(event.event_type, event.meal_intent);
    if travel_minutes > cap {
        return Err(ExclusionReason::TravelTimeOverCap {
            minutes: travel_minutes,
            cap,
        });
    }

    Ok(())
}
