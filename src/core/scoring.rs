use crate::core::config::PairingConfig;
use crate::core::filters::RestaurantProfile;
use crate::models::{Event, GroupSignal, MatchReason, ScoreComponent};

/// Phase A sub-scores for one restaurant, each in [0, 100]
#[derive(Debug, Clone, PartialEq)]
pub struct FitScore {
    pub service_style: f64,
    pub travel_time: f64,
    pub cuisine: f64,
    pub reasons: Vec<MatchReason>,
}

/// Score a restaurant's intrinsic fit for an event
///
/// Assumes hard filters already passed. With the family-style filter
/// disabled, a family event at a non-family restaurant gets the soft
/// penalty baseline instead of being excluded.
pub fn score_fit(
    event: &Event,
    profile: &RestaurantProfile<'_>,
    travel_minutes: u32,
    config: &PairingConfig,
) -> FitScore {
    let mut reasons = Vec::new();

    let service_style = score_service_style(event, profile, config, &mut reasons);

    let travel_time = score_travel_time(travel_minutes);
    if let Some(reason) = travel_reason(travel_minutes, travel_time) {
        reasons.push(MatchReason::new(ScoreComponent::TravelTime, reason));
    }

    let (cuisine, cuisine_reason) = score_cuisine(event, profile, config);
    if let Some(reason) = cuisine_reason {
        reasons.push(MatchReason::new(ScoreComponent::Cuisine, reason));
    }

    FitScore {
        service_style,
        travel_time,
        cuisine,
        reasons,
    }
}

/// Baseline plus additive group-signal bonuses, capped at 100
fn score_service_style(
    event: &Event,
    profile: &RestaurantProfile<'_>,
    config: &PairingConfig,
    reasons: &mut Vec<MatchReason>,
) -> f64 {
    let family_event = config.is_family_event(event.event_type);
    let has_family = profile.has_family_service();
    let mut push = |text: &str| reasons.push(MatchReason::new(ScoreComponent::ServiceStyle, text));

    let base = if family_event && !has_family {
        push("Not family-style dining");
        config.service_style_soft_penalty
    } else {
        if has_family && family_event {
            push("Family-style dining");
        } else if has_family {
            push("Share plates available");
        }
        config.service_style_baseline
    };

    let bonuses = &config.group_bonuses;
    let signals = &profile.group_signals;
    let mut bonus = 0.0;

    if signals.contains(&GroupSignal::LargeTables) {
        bonus += bonuses.large_tables;
        push("Large tables available");
    }
    if event.has_kids && signals.contains(&GroupSignal::KidsMenu) {
        bonus += bonuses.kids_menu;
        push("Kids menu available");
    }
    if signals.contains(&GroupSignal::NoiseTolerant) {
        bonus += bonuses.noise_tolerant;
        push("Lively room, noise is no problem");
    }
    if event.party_size >= bonuses.private_room_min_party
        && signals.contains(&GroupSignal::PrivateRoom)
    {
        bonus += bonuses.private_room;
        push("Private room available");
    }

    (base + bonus).clamp(0.0, 100.0)
}

/// Bucketed travel score with linear decay past 25 minutes
pub fn score_travel_time(travel_minutes: u32) -> f64 {
    match travel_minutes {
        0..=10 => 100.0,
        11..=15 => 85.0,
        16..=20 => 70.0,
        21..=25 => 50.0,
        over => (50.0 - 3.0 * f64::from(over - 25)).max(0.0),
    }
}

fn travel_reason(travel_minutes: u32, score: f64) -> Option<String> {
    match travel_minutes {
        0..=10 => Some(format!("{travel_minutes} min away - very close")),
        11..=15 => Some(format!("{travel_minutes} min away")),
        16..=25 => Some(format!("{travel_minutes} min drive")),
        _ if score > 0.0 => Some(format!("{travel_minutes} min drive - far")),
        _ => None,
    }
}

/// 100 on any overlap with the event type's preferred cuisines, the mismatch
/// baseline when tagged but not matching (or no preference row), 0 untagged
fn score_cuisine(
    event: &Event,
    profile: &RestaurantProfile<'_>,
    config: &PairingConfig,
) -> (f64, Option<String>) {
    if profile.cuisines.is_empty() {
        return (0.0, None);
    }

    let matched: Vec<&str> = config
        .preferred_cuisines(event.event_type)
        .map(|preferred| {
            profile
                .cuisines
                .iter()
                .filter(|c| preferred.iter().any(|p| p.eq_ignore_ascii_case(c.as_str())))
                .map(String::as_str)
                .collect()
        })
        .unwrap_or_default();

    if matched.is_empty() {
        return (config.cuisine_mismatch_score, None);
    }

    let reason = format!(
        "{} suits a {}",
        capitalize(&matched.join(" / ")),
        event.event_type.describe()
    );
    (100.0, Some(reason))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
