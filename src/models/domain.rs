use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use crate::models::clock::{self, format_clock, format_clock_of};

/// Geographic coordinates as resolved by upstream geocoding
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    /// Finite and inside the lat/lng ranges
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Kind of scheduled event
///
/// Unrecognised strings map to `Other` so new upstream categories do not
/// break ingestion; config tables simply have no entry for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventType {
    FamilyStyleGathering,
    Show,
    Music,
    Meeting,
    Drinks,
    Sports,
    Dinner,
    Other,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FamilyStyleGathering => "FAMILY_STYLE_GATHERING",
            Self::Show => "SHOW",
            Self::Music => "MUSIC",
            Self::Meeting => "MEETING",
            Self::Drinks => "DRINKS",
            Self::Sports => "SPORTS",
            Self::Dinner => "DINNER",
            Self::Other => "OTHER",
        }
    }

    /// Short phrase used in match reasons
    pub fn describe(&self) -> &'static str {
        match self {
            Self::FamilyStyleGathering => "family gathering",
            Self::Show => "show",
            Self::Music => "concert",
            Self::Meeting => "meeting",
            Self::Drinks => "night out",
            Self::Sports => "game",
            Self::Dinner => "dinner",
            Self::Other => "event",
        }
    }
}

impl FromStr for EventType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_uppercase().replace(['-', ' '], "_").as_str() {
            "FAMILY_STYLE_GATHERING" => Self::FamilyStyleGathering,
            "SHOW" => Self::Show,
            "MUSIC" => Self::Music,
            "MEETING" => Self::Meeting,
            "DRINKS" => Self::Drinks,
            "SPORTS" => Self::Sports,
            "DINNER" => Self::Dinner,
            _ => Self::Other,
        })
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EventType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        match raw.parse() {
            Ok(event_type) => Ok(event_type),
            Err(never) => match never {},
        }
    }
}

/// Whether the meal happens before, after, or is the event
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MealIntent {
    BeforeEvent,
    AfterEvent,
    MealIsEvent,
}

impl MealIntent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BeforeEvent => "BEFORE_EVENT",
            Self::AfterEvent => "AFTER_EVENT",
            Self::MealIsEvent => "MEAL_IS_EVENT",
        }
    }
}

impl FromStr for MealIntent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace(['-', ' '], "_").as_str() {
            "BEFORE_EVENT" => Ok(Self::BeforeEvent),
            "AFTER_EVENT" => Ok(Self::AfterEvent),
            "MEAL_IS_EVENT" => Ok(Self::MealIsEvent),
            _ => Err(format!(
                "unknown meal intent '{s}', expected BEFORE_EVENT, AFTER_EVENT or MEAL_IS_EVENT"
            )),
        }
    }
}

impl fmt::Display for MealIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for MealIntent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MealIntent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TravelMode {
    #[default]
    Drive,
    Walk,
    Transit,
    Bike,
}

/// A scheduled event to pair restaurants with
///
/// Timestamps keep their UTC offset; all window arithmetic happens on the
/// event's local wall clock.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[validate(length(min = 1, message = "event id must not be empty"))]
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    #[serde(default)]
    pub location: Option<Location>,
    pub start_at: DateTime<FixedOffset>,
    #[serde(default)]
    pub end_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    #[validate(range(min = 1, message = "durationMinutes must be positive"))]
    pub duration_minutes: Option<u32>,
    pub meal_intent: MealIntent,
    #[validate(range(min = 1, message = "partySize must be positive"))]
    pub party_size: u32,
    #[serde(default)]
    pub has_kids: bool,
    #[serde(default)]
    pub travel_mode: TravelMode,
}

impl Event {
    /// Local calendar date the event starts on
    pub fn local_date(&self) -> NaiveDate {
        self.start_at.date_naive()
    }
}

/// A candidate restaurant as normalized by the aggregation pipeline
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    #[validate(length(min = 1, message = "restaurant id must not be empty"))]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub cuisine_tags: BTreeSet<String>,
    #[serde(default)]
    pub service_style_tags: BTreeSet<String>,
    #[serde(default)]
    pub group_signals: BTreeSet<String>,
    #[serde(default)]
    pub price_tier: Option<u8>,
    #[serde(default)]
    pub hours: Option<serde_json::Value>,
}

/// Seating availability observed client-side for one restaurant
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityPayload {
    pub restaurant_id: String,
    /// `YYYY-MM-DD`
    pub date: String,
    pub party_size: u32,
    /// Clock times such as `"17:15"`
    #[serde(default)]
    pub available_times: Vec<String>,
}

/// A range of acceptable seating times on the event's local clock
///
/// On the wire a window is `{ date, startTime, endTime, label? }` with
/// `"HH:MM"` clock times; an end clock earlier than the start clock means
/// the window runs past midnight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "TimeWindowRecord", from = "TimeWindowRecord")]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl TimeWindow {
    /// Returns `None` when `start > end`
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Option<Self> {
        (start <= end).then_some(Self {
            start,
            end,
            label: None,
        })
    }

    pub fn labeled(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    /// Inclusive on both ends
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        self.start <= at && at <= self.end
    }

    pub fn midpoint(&self) -> NaiveDateTime {
        self.start + (self.end - self.start) / 2
    }

    pub fn shifted(&self, minutes: i64) -> Self {
        let delta = chrono::Duration::minutes(minutes);
        Self {
            start: self.start + delta,
            end: self.end + delta,
            label: self.label.clone(),
        }
    }

    pub fn start_clock(&self) -> String {
        format_clock_of(self.start)
    }

    pub fn end_clock(&self) -> String {
        format_clock_of(self.end)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimeWindowRecord {
    date: NaiveDate,
    #[serde(with = "clock")]
    start_time: NaiveTime,
    #[serde(with = "clock")]
    end_time: NaiveTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
}

impl From<TimeWindow> for TimeWindowRecord {
    fn from(window: TimeWindow) -> Self {
        Self {
            date: window.start.date(),
            start_time: window.start.time(),
            end_time: window.end.time(),
            label: window.label,
        }
    }
}

impl From<TimeWindowRecord> for TimeWindow {
    fn from(record: TimeWindowRecord) -> Self {
        let start = record.date.and_time(record.start_time);
        let mut end = record.date.and_time(record.end_time);
        if end < start {
            end += Duration::days(1);
        }
        Self {
            start,
            end,
            label: record.label,
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start_clock(), self.end_clock())
    }
}

/// Preferred window plus fallbacks ordered by proximity to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendedWindows {
    pub preferred: TimeWindow,
    pub fallbacks: Vec<TimeWindow>,
}

/// Scored components of a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScoreComponent {
    ServiceStyle,
    TravelTime,
    Cuisine,
    Availability,
}

/// Per-component scores, each in [0, 100]
///
/// `availability_fit` stays `None` until Phase B data arrives for the
/// restaurant, which keeps the term out of the weighted sum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub service_style: f64,
    pub travel_time: f64,
    pub cuisine: f64,
    #[serde(default)]
    pub availability_fit: Option<f64>,
}

/// One human-readable justification, tagged with the factor it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchReason {
    pub factor: ScoreComponent,
    pub text: String,
}

impl MatchReason {
    pub fn new(factor: ScoreComponent, text: impl Into<String>) -> Self {
        Self {
            factor,
            text: text.into(),
        }
    }
}

/// Ranked pairing of a restaurant with an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairingRecommendation {
    pub restaurant_id: String,
    #[serde(default)]
    pub name: String,
    pub score: f64,
    pub score_breakdown: ScoreBreakdown,
    pub recommended_windows: RecommendedWindows,
    /// Local calendar date of the target seat time
    pub service_date: NaiveDate,
    #[serde(with = "clock")]
    pub target_time: NaiveTime,
    pub travel_time_minutes: u32,
    pub availability_pending: bool,
    #[serde(default)]
    pub recommended_available_times: Option<Vec<String>>,
    #[serde(default)]
    pub why_matched: Vec<MatchReason>,
}

impl PairingRecommendation {
    /// Target seat time on the local timeline
    pub fn target_at(&self) -> NaiveDateTime {
        self.service_date.and_time(self.target_time)
    }

    pub fn target_clock(&self) -> String {
        format_clock(self.target_time)
    }

    /// Reason texts in display order
    pub fn reasons(&self) -> Vec<&str> {
        self.why_matched.iter().map(|r| r.text.as_str()).collect()
    }
}

/// Why a restaurant was left out of the ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ExclusionReason {
    #[error("invalid restaurant record: {detail}")]
    InvalidRestaurant { detail: String },

    #[error("duplicate restaurant id")]
    DuplicateRestaurant,

    #[error("event location missing or failed geocoding")]
    MissingEventLocation,

    #[error("restaurant location missing or failed geocoding")]
    MissingLocation,

    #[error("no travel time supplied")]
    MissingTravelTime,

    #[error("not family-style or share-plates")]
    NotFamilyStyle,

    #[error("travel time {minutes} min exceeds cap of {cap} min")]
    TravelTimeOverCap { minutes: u32, cap: u32 },
}

/// A restaurant omitted from the output, with the reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exclusion {
    pub restaurant_id: String,
    pub reason: ExclusionReason,
}

/// Why an availability payload was ignored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RejectionReason {
    #[error("date '{raw}' is not YYYY-MM-DD")]
    InvalidDate { raw: String },

    #[error("payload date {found} does not match event date {expected}")]
    DateMismatch { expected: NaiveDate, found: NaiveDate },

    #[error("payload party size {found} does not match event party size {expected}")]
    PartySizeMismatch { expected: u32, found: u32 },

    #[error("unparseable time '{raw}'")]
    UnparseableTime { raw: String },

    #[error("restaurant is not among the ranked recommendations")]
    NotRanked,

    #[error("duplicate payload for restaurant")]
    DuplicatePayload,
}

/// An availability payload that was ignored, with the reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRejection {
    pub restaurant_id: String,
    pub reason: RejectionReason,
}

/// Result of one ranking call
#[derive(Debug, Clone, Default)]
pub struct PairingResult {
    pub recommendations: Vec<PairingRecommendation>,
    pub exclusions: Vec<Exclusion>,
    pub availability_rejections: Vec<AvailabilityRejection>,
    pub total_candidates: usize,
}
