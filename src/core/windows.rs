//! Dining window computation.
//!
//! Produces a target seat time, a preferred window, and fallback windows
//! ordered by how close they sit to the preferred one. Everything is on the
//! event's local wall clock, rounded to the configured granularity.

use chrono::{Duration, NaiveDateTime, NaiveTime};

use crate::core::config::{ClockWindow, PairingConfig};
use crate::models::clock::minute_of_day;
use crate::models::{Event, MealIntent, RecommendedWindows, TimeWindow};

pub const FALLBACK_EARLIER: &str = "fallback-earlier";
pub const FALLBACK_LATER: &str = "fallback-later";

/// Windows computed for one event/travel-time pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiningWindows {
    /// Ideal seat time used for distance comparisons in Phase B
    pub target_time: NaiveDateTime,
    pub windows: RecommendedWindows,
}

/// Round to the nearest multiple of `granularity` minutes, dropping seconds
/// and sub-second parts. Halfway rounds up.
pub fn round_to_granularity(at: NaiveDateTime, granularity: u32) -> NaiveDateTime {
    let minute = minute_of_day(at.time());
    let g = granularity.max(1);
    let remainder = minute % g;
    let rounded = if remainder * 2 >= g {
        minute - remainder + g
    } else {
        minute - remainder
    };
    at.date().and_time(NaiveTime::MIN) + minutes(rounded)
}

fn minutes(m: u32) -> Duration {
    Duration::minutes(i64::from(m))
}

/// Compute the dining windows for an event given travel time in minutes
pub fn compute_dining_windows(
    event: &Event,
    travel_minutes: u32,
    config: &PairingConfig,
) -> DiningWindows {
    let (target_time, preferred, fallbacks) = match event.meal_intent {
        MealIntent::BeforeEvent => before_event(event, travel_minutes, config),
        MealIntent::AfterEvent => after_event(event, travel_minutes, config),
        MealIntent::MealIsEvent => meal_is_event(event, config),
    };

    DiningWindows {
        target_time,
        windows: order_fallbacks(preferred, fallbacks),
    }
}

/// Sort fallbacks by midpoint distance from the preferred window. The sort
/// is stable, so equally distant fallbacks keep their declared order.
fn order_fallbacks(preferred: TimeWindow, mut fallbacks: Vec<TimeWindow>) -> RecommendedWindows {
    let anchor = preferred.midpoint();
    fallbacks.sort_by_key(|w| (w.midpoint() - anchor).num_seconds().abs());
    RecommendedWindows { preferred, fallbacks }
}

fn local_start(event: &Event, config: &PairingConfig) -> NaiveDateTime {
    round_to_granularity(event.start_at.naive_local(), config.rounding_minutes)
}

fn local_end(event: &Event, config: &PairingConfig) -> NaiveDateTime {
    let start = event.start_at.naive_local();
    let end = match (event.end_at, event.duration_minutes) {
        (Some(end_at), _) => end_at.naive_local(),
        (None, Some(duration)) => start + minutes(duration),
        (None, None) => start + minutes(config.assumed_event_duration_minutes),
    };
    round_to_granularity(end, config.rounding_minutes)
}

fn before_event(
    event: &Event,
    travel_minutes: u32,
    config: &PairingConfig,
) -> (NaiveDateTime, TimeWindow, Vec<TimeWindow>) {
    let start = local_start(event, config);
    let pre_buffer = config.pre_buffer_for(event.has_kids);
    let latest_finish = start - minutes(travel_minutes) - minutes(pre_buffer);
    let target_seat = round_to_granularity(
        latest_finish - minutes(config.meal_duration_minutes()),
        config.rounding_minutes,
    );

    let half = minutes(config.preferred_half_width_minutes);
    let preferred = TimeWindow {
        start: target_seat - half,
        end: target_seat + half,
        label: None,
    };

    let mut fallbacks = Vec::with_capacity(2);

    let earlier = preferred
        .shifted(-i64::from(config.earlier_fallback_shift_minutes))
        .labeled(FALLBACK_EARLIER);
    let floor = earlier.start.date().and_time(config.day_start_floor);
    if earlier.start >= floor {
        fallbacks.push(earlier);
    }

    let shifted_later = preferred.shifted(i64::from(config.later_fallback_shift_minutes));
    let later_end = shifted_later.end.min(latest_finish);
    if let Some(later) = TimeWindow::new(shifted_later.start, later_end) {
        if later.start < later.end {
            fallbacks.push(later.labeled(FALLBACK_LATER));
        }
    }

    (target_seat, preferred, fallbacks)
}

fn after_event(
    event: &Event,
    travel_minutes: u32,
    config: &PairingConfig,
) -> (NaiveDateTime, TimeWindow, Vec<TimeWindow>) {
    let end = local_end(event, config);
    let earliest_seat = round_to_granularity(
        end + minutes(config.exit_buffer_for(event.event_type))
            + minutes(travel_minutes)
            + minutes(config.pre_buffer_for(event.has_kids)),
        config.rounding_minutes,
    );

    let preferred = TimeWindow {
        start: earliest_seat,
        end: earliest_seat + minutes(config.after_event_window_minutes),
        label: None,
    };

    let mut fallbacks = Vec::with_capacity(2);

    fallbacks.push(
        preferred
            .shifted(i64::from(config.after_event_later_shift_minutes))
            .labeled(FALLBACK_LATER),
    );

    let earlier_start = earliest_seat - minutes(config.after_event_earlier_lead_minutes);
    if earlier_start >= end {
        fallbacks.push(TimeWindow {
            start: earlier_start,
            end: earliest_seat,
            label: Some(FALLBACK_EARLIER.to_string()),
        });
    }

    (earliest_seat, preferred, fallbacks)
}

fn meal_is_event(event: &Event, config: &PairingConfig) -> (NaiveDateTime, TimeWindow, Vec<TimeWindow>) {
    let standard = &config.meal_is_event;
    let day = event.start_at.naive_local().date();
    let shift = if event.has_kids {
        -i64::from(standard.kids_shift_minutes)
    } else {
        0
    };

    let at = |time: NaiveTime| day.and_time(time) + Duration::minutes(shift);
    let window = |clock: &ClockWindow| TimeWindow {
        start: at(clock.start),
        end: at(clock.end),
        label: None,
    };

    let preferred = window(&standard.preferred);
    let fallbacks = vec![
        window(&standard.later).labeled(FALLBACK_LATER),
        window(&standard.earlier).labeled(FALLBACK_EARLIER),
    ];

    (at(standard.target), preferred, fallbacks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventType, TravelMode};
    use chrono::{DateTime, NaiveDate};

    fn event(intent: MealIntent, start: &str, has_kids: bool) -> Event {
        Event {
            id: "evt".to_string(),
            event_type: EventType::Show,
            location: None,
            start_at: DateTime::parse_from_rfc3339(start).unwrap(),
            end_at: None,
            duration_minutes: None,
            meal_intent: intent,
            party_size: 2,
            has_kids,
            travel_mode: TravelMode::Drive,
        }
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_round_to_granularity() {
        let base = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let t = |h, m, s| base.and_hms_opt(h, m, s).unwrap();

        assert_eq!(round_to_granularity(t(17, 12, 0), 5), t(17, 10, 0));
        assert_eq!(round_to_granularity(t(17, 13, 0), 5), t(17, 15, 0));
        assert_eq!(round_to_granularity(t(17, 10, 59), 5), t(17, 10, 0));
        assert_eq!(round_to_granularity(t(17, 7, 0), 15), t(17, 0, 0));
        assert_eq!(round_to_granularity(t(17, 8, 0), 15), t(17, 15, 0));
        assert_eq!(round_to_granularity(t(23, 53, 0), 15), t(0, 0, 0) + Duration::days(1));
    }

    #[test]
    fn test_before_event_worked_example() {
        let evt = event(MealIntent::BeforeEvent, "2024-01-15T19:00:00+00:00", false);
        let dining = compute_dining_windows(&evt, 10, &PairingConfig::default());

        assert_eq!(dining.target_time, at(17, 10));
        assert_eq!(dining.windows.preferred.start, at(16, 40));
        assert_eq!(dining.windows.preferred.end, at(17, 40));
        assert_eq!(dining.windows.preferred.to_string(), "16:40-17:40");
    }

    #[test]
    fn test_before_event_fallbacks_ordered_by_proximity() {
        let evt = event(MealIntent::BeforeEvent, "2024-01-15T19:00:00+00:00", false);
        let dining = compute_dining_windows(&evt, 10, &PairingConfig::default());
        let fallbacks = &dining.windows.fallbacks;

        assert_eq!(fallbacks.len(), 2);
        assert_eq!(fallbacks[0].label.as_deref(), Some(FALLBACK_LATER));
        assert_eq!(fallbacks[0].start, at(17, 25));
        assert_eq!(fallbacks[0].end, at(18, 25));
        assert_eq!(fallbacks[1].label.as_deref(), Some(FALLBACK_EARLIER));
        assert_eq!(fallbacks[1].start, at(15, 40));
        assert_eq!(fallbacks[1].end, at(16, 40));
    }

    #[test]
    fn test_before_event_later_fallback_clipped_to_latest_finish() {
        let mut config = PairingConfig::default();
        config.later_fallback_shift_minutes = 100;
        let evt = event(MealIntent::BeforeEvent, "2024-01-15T19:00:00+00:00", false);
        let dining = compute_dining_windows(&evt, 10, &config);

        let later = dining
            .windows
            .fallbacks
            .iter()
            .find(|w| w.label.as_deref() == Some(FALLBACK_LATER))
            .unwrap();
        assert_eq!(later.start, at(18, 20));
        assert_eq!(later.end, at(18, 40));
    }

    #[test]
    fn test_before_event_earlier_fallback_respects_day_floor() {
        let evt = event(MealIntent::BeforeEvent, "2024-01-15T13:30:00+00:00", false);
        let dining = compute_dining_windows(&evt, 10, &PairingConfig::default());

        // target 11:40, earlier fallback would start at 10:10
        assert_eq!(dining.target_time, at(11, 40));
        assert!(dining
            .windows
            .fallbacks
            .iter()
            .all(|w| w.label.as_deref() != Some(FALLBACK_EARLIER)));
    }

    #[test]
    fn test_before_event_with_kids_is_earlier() {
        let config = PairingConfig::default();
        let plain = event(MealIntent::BeforeEvent, "2024-01-15T19:00:00+00:00", false);
        let kids = event(MealIntent::BeforeEvent, "2024-01-15T19:00:00+00:00", true);

        let a = compute_dining_windows(&plain, 10, &config);
        let b = compute_dining_windows(&kids, 10, &config);
        assert!(b.target_time < a.target_time);
        assert_eq!(b.target_time, at(17, 5));
    }

    #[test]
    fn test_after_event_uses_end_at() {
        let mut evt = event(MealIntent::AfterEvent, "2024-01-15T19:00:00+00:00", false);
        evt.end_at = Some(DateTime::parse_from_rfc3339("2024-01-15T21:00:00+00:00").unwrap());
        let dining = compute_dining_windows(&evt, 15, &PairingConfig::default());

        // 21:00 + 15 exit + 15 travel + 10 buffer
        assert_eq!(dining.target_time, at(21, 40));
        assert_eq!(dining.windows.preferred.start, at(21, 40));
        assert_eq!(dining.windows.preferred.end, at(22, 40));

        let fallbacks = &dining.windows.fallbacks;
        assert_eq!(fallbacks.len(), 2);
        assert_eq!(fallbacks[0].label.as_deref(), Some(FALLBACK_EARLIER));
        assert_eq!(fallbacks[0].start, at(21, 10));
        assert_eq!(fallbacks[1].label.as_deref(), Some(FALLBACK_LATER));
        assert_eq!(fallbacks[1].start, at(22, 40));
        assert_eq!(fallbacks[1].end, at(23, 40));
    }

    #[test]
    fn test_after_event_falls_back_to_duration_then_assumed() {
        let config = PairingConfig::default();
        let mut evt = event(MealIntent::AfterEvent, "2024-01-15T19:00:00+00:00", false);
        evt.duration_minutes = Some(90);
        assert_eq!(compute_dining_windows(&evt, 10, &config).target_time, at(21, 5));

        evt.duration_minutes = None;
        assert_eq!(compute_dining_windows(&evt, 10, &config).target_time, at(21, 35));
    }

    #[test]
    fn test_after_event_big_venue_exit_buffer() {
        let mut evt = event(MealIntent::AfterEvent, "2024-01-15T19:00:00+00:00", false);
        evt.event_type = EventType::Sports;
        evt.end_at = Some(DateTime::parse_from_rfc3339("2024-01-15T21:00:00+00:00").unwrap());

        let dining = compute_dining_windows(&evt, 10, &PairingConfig::default());
        assert_eq!(dining.target_time, at(21, 40));
    }

    #[test]
    fn test_after_event_late_windows_cross_midnight() {
        let mut evt = event(MealIntent::AfterEvent, "2024-01-15T21:00:00+00:00", false);
        evt.end_at = Some(DateTime::parse_from_rfc3339("2024-01-15T23:00:00+00:00").unwrap());
        let dining = compute_dining_windows(&evt, 20, &PairingConfig::default());

        assert_eq!(dining.target_time, at(23, 45));
        assert_eq!(dining.windows.preferred.end, at(0, 45) + Duration::days(1));
        assert!(dining.windows.preferred.start <= dining.windows.preferred.end);
    }

    #[test]
    fn test_meal_is_event_standard_windows() {
        let evt = event(MealIntent::MealIsEvent, "2024-01-15T18:00:00+00:00", false);
        let dining = compute_dining_windows(&evt, 10, &PairingConfig::default());

        assert_eq!(dining.target_time, at(18, 30));
        assert_eq!(dining.windows.preferred.start, at(18, 0));
        assert_eq!(dining.windows.preferred.end, at(19, 30));
        assert_eq!(dining.windows.fallbacks[0].start, at(19, 30));
        assert_eq!(dining.windows.fallbacks[1].start, at(17, 0));
    }

    #[test]
    fn test_meal_is_event_with_kids_shifts_earlier() {
        let evt = event(MealIntent::MealIsEvent, "2024-01-15T18:00:00+00:00", true);
        let dining = compute_dining_windows(&evt, 10, &PairingConfig::default());

        assert_eq!(dining.target_time, at(17, 30));
        assert_eq!(dining.windows.preferred.start, at(17, 0));
        assert_eq!(dining.windows.preferred.end, at(18, 30));
        assert_eq!(dining.windows.fallbacks[1].start, at(16, 0));
    }

    #[test]
    fn test_windows_never_inverted() {
        let config = PairingConfig::default();
        for intent in [MealIntent::BeforeEvent, MealIntent::AfterEvent, MealIntent::MealIsEvent] {
            for travel in [0, 5, 12, 25, 40] {
                for kids in [false, true] {
                    let evt = event(intent, "2024-01-15T19:07:31+00:00", kids);
                    let dining = compute_dining_windows(&evt, travel, &config);
                    let preferred = &dining.windows.preferred;
                    assert!(preferred.start <= preferred.end);
                    for w in &dining.windows.fallbacks {
                        assert!(w.start <= w.end, "{intent} travel {travel}: {w}");
                    }
                }
            }
        }
    }
}
