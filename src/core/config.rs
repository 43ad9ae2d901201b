//! Engine configuration.
//!
//! `PairingConfig` is an immutable value handed to every ranking call. Event
//! type specific behaviour (travel caps, cuisine preferences, family-style
//! requirement, big-venue exit buffers) lives in lookup tables here so new
//! event types only need new table rows.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::PairingError;
use crate::models::clock;
use crate::models::{EventType, MealIntent, ScoreComponent};

/// Allowed drift when checking that weights sum to 1.0
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Scoring weights for the four components
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub service_style: f64,
    pub travel_time: f64,
    pub cuisine: f64,
    pub availability: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            service_style: 0.35,
            travel_time: 0.25,
            cuisine: 0.20,
            availability: 0.20,
        }
    }
}

impl ScoringWeights {
    pub fn total(&self) -> f64 {
        self.service_style + self.travel_time + self.cuisine + self.availability
    }

    pub fn weight_of(&self, component: ScoreComponent) -> f64 {
        match component {
            ScoreComponent::ServiceStyle => self.service_style,
            ScoreComponent::TravelTime => self.travel_time,
            ScoreComponent::Cuisine => self.cuisine,
            ScoreComponent::Availability => self.availability,
        }
    }

    /// Weights for the terms that are actually present, re-normalized to
    /// sum to 1.0. Without availability data that term drops to zero and the
    /// three fit weights absorb its share proportionally.
    pub fn active(&self, with_availability: bool) -> ScoringWeights {
        let availability = if with_availability { self.availability } else { 0.0 };
        let sum = self.service_style + self.travel_time + self.cuisine + availability;
        if sum <= f64::EPSILON {
            return *self;
        }

        ScoringWeights {
            service_style: self.service_style / sum,
            travel_time: self.travel_time / sum,
            cuisine: self.cuisine / sum,
            availability: availability / sum,
        }
    }
}

/// Which meal duration applies when planning around an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealStyle {
    #[default]
    Casual,
    Nice,
}

/// Additive service-style bonuses for group signals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupBonuses {
    pub large_tables: f64,
    /// Only when the party has kids
    pub kids_menu: f64,
    pub noise_tolerant: f64,
    /// Only when the party reaches `private_room_min_party`
    pub private_room: f64,
    pub private_room_min_party: u32,
}

impl Default for GroupBonuses {
    fn default() -> Self {
        Self {
            large_tables: 5.0,
            kids_menu: 5.0,
            noise_tolerant: 3.0,
            private_room: 7.0,
            private_room_min_party: 8,
        }
    }
}

/// A window expressed as wall-clock times, written `"HH:MM"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockWindow {
    #[serde(with = "clock")]
    pub start: NaiveTime,
    #[serde(with = "clock")]
    pub end: NaiveTime,
}

impl ClockWindow {
    fn from_hm(start: (u32, u32), end: (u32, u32)) -> Self {
        Self {
            start: hm(start.0, start.1),
            end: hm(end.0, end.1),
        }
    }
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
}

/// Standard dinner windows used when the meal is the event itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StandardMealWindows {
    pub preferred: ClockWindow,
    #[serde(with = "clock")]
    pub target: NaiveTime,
    pub later: ClockWindow,
    pub earlier: ClockWindow,
    /// Every window moves this many minutes earlier for parties with kids
    pub kids_shift_minutes: u32,
}

impl Default for StandardMealWindows {
    fn default() -> Self {
        Self {
            preferred: ClockWindow::from_hm((18, 0), (19, 30)),
            target: hm(18, 30),
            later: ClockWindow::from_hm((19, 30), (20, 30)),
            earlier: ClockWindow::from_hm((17, 0), (18, 0)),
            kids_shift_minutes: 60,
        }
    }
}

/// Immutable configuration for one ranking call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairingConfig {
    pub weights: ScoringWeights,

    // Buffers (minutes)
    pub pre_buffer_minutes: u32,
    pub pre_buffer_with_kids_minutes: u32,
    pub exit_buffer_minutes: u32,
    pub exit_buffer_big_venue_minutes: u32,
    pub big_venue_event_types: BTreeSet<EventType>,

    // Meal durations (minutes)
    pub meal_style: MealStyle,
    pub meal_duration_casual_minutes: u32,
    pub meal_duration_nice_minutes: u32,

    // Window geometry (minutes)
    pub preferred_half_width_minutes: u32,
    pub earlier_fallback_shift_minutes: u32,
    pub later_fallback_shift_minutes: u32,
    pub after_event_window_minutes: u32,
    pub after_event_later_shift_minutes: u32,
    pub after_event_earlier_lead_minutes: u32,
    pub assumed_event_duration_minutes: u32,
    #[serde(with = "clock")]
    pub day_start_floor: NaiveTime,
    pub rounding_minutes: u32,
    pub meal_is_event: StandardMealWindows,

    // Hard filters
    pub require_family_style_for_family_events: bool,
    pub family_event_types: BTreeSet<EventType>,
    pub travel_time_caps: BTreeMap<EventType, u32>,
    pub meal_intent_travel_caps: BTreeMap<MealIntent, u32>,
    pub default_travel_cap_minutes: u32,

    // Component scoring
    pub service_style_baseline: f64,
    pub service_style_soft_penalty: f64,
    pub group_bonuses: GroupBonuses,
    /// Lowercase cuisine tags preferred per event type
    pub cuisine_preferences: BTreeMap<EventType, BTreeSet<String>>,
    pub cuisine_mismatch_score: f64,
    /// Availability score for a slot in fallback #1, #2, ...
    pub fallback_availability_scores: Vec<f64>,
    pub max_recommended_times: usize,

    /// Only used by the straight-line travel estimate helper
    pub default_travel_speed_mph: f64,
}

impl Default for PairingConfig {
    fn default() -> Self {
        let cuisines = |tags: &[&str]| tags.iter().map(|t| t.to_string()).collect::<BTreeSet<_>>();
        let show_cuisines = cuisines(&["italian", "mediterranean", "american", "sushi"]);

        Self {
            weights: ScoringWeights::default(),
            pre_buffer_minutes: 10,
            pre_buffer_with_kids_minutes: 15,
            exit_buffer_minutes: 15,
            exit_buffer_big_venue_minutes: 20,
            big_venue_event_types: BTreeSet::from([EventType::Sports]),
            meal_style: MealStyle::Casual,
            meal_duration_casual_minutes: 90,
            meal_duration_nice_minutes: 105,
            preferred_half_width_minutes: 30,
            earlier_fallback_shift_minutes: 60,
            later_fallback_shift_minutes: 45,
            after_event_window_minutes: 60,
            after_event_later_shift_minutes: 60,
            after_event_earlier_lead_minutes: 30,
            assumed_event_duration_minutes: 120,
            day_start_floor: hm(11, 0),
            rounding_minutes: 5,
            meal_is_event: StandardMealWindows::default(),
            require_family_style_for_family_events: true,
            family_event_types: BTreeSet::from([EventType::FamilyStyleGathering]),
            travel_time_caps: BTreeMap::from([(EventType::FamilyStyleGathering, 15)]),
            meal_intent_travel_caps: BTreeMap::from([
                (MealIntent::BeforeEvent, 20),
                (MealIntent::AfterEvent, 25),
                (MealIntent::MealIsEvent, 35),
            ]),
            default_travel_cap_minutes: 25,
            service_style_baseline: 100.0,
            service_style_soft_penalty: 10.0,
            group_bonuses: GroupBonuses::default(),
            cuisine_preferences: BTreeMap::from([
                (EventType::Show, show_cuisines.clone()),
                (EventType::Music, show_cuisines),
                (
                    EventType::FamilyStyleGathering,
                    cuisines(&["italian", "american", "mexican", "pizza"]),
                ),
                (EventType::Sports, cuisines(&["american", "bbq", "pizza", "mexican"])),
            ]),
            cuisine_mismatch_score: 50.0,
            fallback_availability_scores: vec![66.0, 33.0],
            max_recommended_times: 3,
            default_travel_speed_mph: 25.0,
        }
    }
}

impl PairingConfig {
    /// Reject configurations that would make scores meaningless
    pub fn validate(&self) -> Result<(), PairingError> {
        let w = &self.weights;
        for (name, value) in [
            ("service_style", w.service_style),
            ("travel_time", w.travel_time),
            ("cuisine", w.cuisine),
            ("availability", w.availability),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(PairingError::InvalidConfig(format!(
                    "weight '{name}' must be a non-negative number, got {value}"
                )));
            }
        }

        let total = w.total();
        if (total - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(PairingError::InvalidConfig(format!(
                "weights must sum to 1.0, got {total}"
            )));
        }

        if w.service_style + w.travel_time + w.cuisine <= f64::EPSILON {
            return Err(PairingError::InvalidConfig(
                "fit weights (service style, travel time, cuisine) must not all be zero".to_string(),
            ));
        }

        if self.rounding_minutes == 0 || self.rounding_minutes > 60 {
            return Err(PairingError::InvalidConfig(format!(
                "rounding_minutes must be between 1 and 60, got {}",
                self.rounding_minutes
            )));
        }

        if self.meal_duration_casual_minutes == 0 || self.meal_duration_nice_minutes == 0 {
            return Err(PairingError::InvalidConfig(
                "meal durations must be positive".to_string(),
            ));
        }

        if self.assumed_event_duration_minutes == 0 {
            return Err(PairingError::InvalidConfig(
                "assumed_event_duration_minutes must be positive".to_string(),
            ));
        }

        let standard = &self.meal_is_event;
        for (name, window) in [
            ("preferred", standard.preferred),
            ("later", standard.later),
            ("earlier", standard.earlier),
        ] {
            if window.start > window.end {
                return Err(PairingError::InvalidConfig(format!(
                    "meal_is_event.{name} window starts after it ends"
                )));
            }
        }

        let in_range = |v: f64| v.is_finite() && (0.0..=100.0).contains(&v);
        let bounded = [
            ("service_style_baseline", self.service_style_baseline),
            ("service_style_soft_penalty", self.service_style_soft_penalty),
            ("cuisine_mismatch_score", self.cuisine_mismatch_score),
        ];
        for (name, value) in bounded {
            if !in_range(value) {
                return Err(PairingError::InvalidConfig(format!(
                    "{name} must lie in [0, 100], got {value}"
                )));
            }
        }
        if let Some(bad) = self.fallback_availability_scores.iter().find(|v| !in_range(**v)) {
            return Err(PairingError::InvalidConfig(format!(
                "fallback availability scores must lie in [0, 100], got {bad}"
            )));
        }

        if self.max_recommended_times == 0 {
            return Err(PairingError::InvalidConfig(
                "max_recommended_times must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    pub fn meal_duration_minutes(&self) -> u32 {
        match self.meal_style {
            MealStyle::Casual => self.meal_duration_casual_minutes,
            MealStyle::Nice => self.meal_duration_nice_minutes,
        }
    }

    pub fn pre_buffer_for(&self, has_kids: bool) -> u32 {
        if has_kids {
            self.pre_buffer_with_kids_minutes
        } else {
            self.pre_buffer_minutes
        }
    }

    pub fn exit_buffer_for(&self, event_type: EventType) -> u32 {
        if self.big_venue_event_types.contains(&event_type) {
            self.exit_buffer_big_venue_minutes
        } else {
            self.exit_buffer_minutes
        }
    }

    /// Hard travel cap: event type row, then meal intent row, then default
    pub fn travel_cap_for(&self, event_type: EventType, meal_intent: MealIntent) -> u32 {
        self.travel_time_caps
            .get(&event_type)
            .or_else(|| self.meal_intent_travel_caps.get(&meal_intent))
            .copied()
            .unwrap_or(self.default_travel_cap_minutes)
    }

    pub fn is_family_event(&self, event_type: EventType) -> bool {
        self.family_event_types.contains(&event_type)
    }

    pub fn preferred_cuisines(&self, event_type: EventType) -> Option<&BTreeSet<String>> {
        self.cuisine_preferences.get(&event_type)
    }

    /// Score for a slot that lands in fallback `index` (0-based)
    pub fn fallback_score(&self, index: usize) -> f64 {
        self.fallback_availability_scores
            .get(index)
            .copied()
            .unwrap_or(0.0)
    }
}
