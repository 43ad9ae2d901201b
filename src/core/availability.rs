//! Phase B: intersect observed seating availability with the dining windows.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::core::config::PairingConfig;
use crate::models::clock::{format_clock_of, parse_clock};
use crate::models::{AvailabilityPayload, Event, RecommendedWindows, RejectionReason};

/// Score assigned to a slot inside the preferred window
pub const PREFERRED_SLOT_SCORE: f64 = 100.0;

/// Availability score and the best seat times to offer
#[derive(Debug, Clone, PartialEq)]
pub struct AvailabilityFit {
    /// Best score across all reported slots, in [0, 100]
    pub score: f64,
    /// `"HH:MM"` times from the best-scoring window, closest to the target first
    pub recommended_times: Vec<String>,
}

/// Check a payload against the event and resolve its clock times onto the
/// local timeline around `target`
///
/// A clock time is placed on the payload date or the following day,
/// whichever lands closer to the target, so late after-event windows that
/// run past midnight still line up.
pub fn resolve_payload(
    payload: &AvailabilityPayload,
    event: &Event,
    target: NaiveDateTime,
) -> Result<Vec<NaiveDateTime>, RejectionReason> {
    let date = NaiveDate::parse_from_str(payload.date.trim(), "%Y-%m-%d").map_err(|_| {
        RejectionReason::InvalidDate {
            raw: payload.date.clone(),
        }
    })?;

    let expected = event.local_date();
    if date != expected {
        return Err(RejectionReason::DateMismatch {
            expected,
            found: date,
        });
    }

    if payload.party_size != event.party_size {
        return Err(RejectionReason::PartySizeMismatch {
            expected: event.party_size,
            found: payload.party_size,
        });
    }

    payload
        .available_times
        .iter()
        .map(|raw| {
            let time = parse_clock(raw)
                .ok_or_else(|| RejectionReason::UnparseableTime { raw: raw.clone() })?;
            let same_day = date.and_time(time);
            let next_day = same_day + Duration::days(1);
            Ok(if distance_seconds(next_day, target) < distance_seconds(same_day, target) {
                next_day
            } else {
                same_day
            })
        })
        .collect()
}

fn distance_seconds(a: NaiveDateTime, b: NaiveDateTime) -> i64 {
    (a - b).num_seconds().abs()
}

/// Score of a single slot: preferred window, then fallbacks in order
pub fn slot_score(slot: NaiveDateTime, windows: &RecommendedWindows, config: &PairingConfig) -> f64 {
    if windows.preferred.contains(slot) {
        return PREFERRED_SLOT_SCORE;
    }

    windows
        .fallbacks
        .iter()
        .enumerate()
        .filter(|(_, w)| w.contains(slot))
        .map(|(i, _)| config.fallback_score(i))
        .fold(0.0, f64::max)
}

/// Score a restaurant's reported slots against its windows
///
/// The score is the best slot, not the average. Recommended times come from
/// the best-scoring tier only, ordered by distance to the target time (ties
/// go to the earlier slot) and capped at `max_recommended_times`.
pub fn score_availability(
    slots: &[NaiveDateTime],
    windows: &RecommendedWindows,
    target: NaiveDateTime,
    config: &PairingConfig,
) -> AvailabilityFit {
    let scored: Vec<(NaiveDateTime, f64)> = slots
        .iter()
        .map(|slot| (*slot, slot_score(*slot, windows, config)))
        .collect();

    let best = scored.iter().map(|(_, s)| *s).fold(0.0, f64::max);
    if best <= 0.0 {
        return AvailabilityFit {
            score: 0.0,
            recommended_times: Vec::new(),
        };
    }

    let mut top: Vec<NaiveDateTime> = scored
        .into_iter()
        .filter(|(_, s)| *s >= best)
        .map(|(slot, _)| slot)
        .collect();
    top.sort_by_key(|slot| (distance_seconds(*slot, target), *slot));
    top.dedup();
    top.truncate(config.max_recommended_times);

    AvailabilityFit {
        score: best,
        recommended_times: top.into_iter().map(format_clock_of).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventType, MealIntent, TimeWindow, TravelMode};
    use chrono::DateTime;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn show_windows() -> RecommendedWindows {
        RecommendedWindows {
            preferred: TimeWindow::new(at(16, 40), at(17, 40)).unwrap(),
            fallbacks: vec![
                TimeWindow::new(at(17, 25), at(18, 25)).unwrap().labeled("fallback-later"),
                TimeWindow::new(at(15, 40), at(16, 40)).unwrap().labeled("fallback-earlier"),
            ],
        }
    }

    fn create_test_event() -> Event {
        Event {
            id: "event1".to_string(),
            event_type: EventType::Show,
            location: None,
            start_at: DateTime::parse_from_rfc3339("2024-01-15T19:00:00+00:00").unwrap(),
            end_at: None,
            duration_minutes: None,
            meal_intent: MealIntent::BeforeEvent,
            party_size: 2,
            has_kids: false,
            travel_mode: TravelMode::Drive,
        }
    }

    fn payload(date: &str, party: u32, times: &[&str]) -> AvailabilityPayload {
        AvailabilityPayload {
            restaurant_id: "rest1".to_string(),
            date: date.to_string(),
            party_size: party,
            available_times: times.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn test_preferred_window_times_recommended() {
        let config = PairingConfig::default();
        let slots = vec![at(17, 0), at(17, 30), at(18, 0)];

        let fit = score_availability(&slots, &show_windows(), at(17, 10), &config);
        assert_eq!(fit.score, 100.0);
        assert_eq!(fit.recommended_times, vec!["17:00", "17:30"]);
    }

    #[test]
    fn test_fallback_tiers() {
        let config = PairingConfig::default();
        let windows = show_windows();

        assert_eq!(slot_score(at(18, 10), &windows, &config), 66.0);
        assert_eq!(slot_score(at(16, 0), &windows, &config), 33.0);
        assert_eq!(slot_score(at(20, 0), &windows, &config), 0.0);
        // shared boundary belongs to the preferred window
        assert_eq!(slot_score(at(16, 40), &windows, &config), 100.0);
    }

    #[test]
    fn test_best_case_not_average() {
        let config = PairingConfig::default();
        let slots = vec![at(12, 0), at(13, 0), at(18, 0)];

        let fit = score_availability(&slots, &show_windows(), at(17, 10), &config);
        assert_eq!(fit.score, 66.0);
        assert_eq!(fit.recommended_times, vec!["18:00"]);
    }

    #[test]
    fn test_no_slot_in_any_window() {
        let config = PairingConfig::default();
        let fit = score_availability(&[at(21, 0)], &show_windows(), at(17, 10), &config);
        assert_eq!(fit.score, 0.0);
        assert!(fit.recommended_times.is_empty());

        let empty = score_availability(&[], &show_windows(), at(17, 10), &config);
        assert_eq!(empty.score, 0.0);
    }

    #[test]
    fn test_recommended_times_truncated_to_three() {
        let config = PairingConfig::default();
        let slots = vec![at(16, 45), at(17, 0), at(17, 15), at(17, 30), at(17, 10)];

        let fit = score_availability(&slots, &show_windows(), at(17, 10), &config);
        assert_eq!(fit.recommended_times, vec!["17:10", "17:15", "17:00"]);
    }

    #[test]
    fn test_resolve_payload_ok() {
        let event = create_test_event();
        let slots = resolve_payload(&payload("2024-01-15", 2, &["17:00", "17:30"]), &event, at(17, 10))
            .unwrap();
        assert_eq!(slots, vec![at(17, 0), at(17, 30)]);
    }

    #[test]
    fn test_resolve_payload_rejections() {
        let event = create_test_event();

        let err = resolve_payload(&payload("2024-01-16", 2, &["17:00"]), &event, at(17, 10)).unwrap_err();
        assert!(matches!(err, RejectionReason::DateMismatch { .. }));

        let err = resolve_payload(&payload("15/01/2024", 2, &["17:00"]), &event, at(17, 10)).unwrap_err();
        assert!(matches!(err, RejectionReason::InvalidDate { .. }));

        let err = resolve_payload(&payload("2024-01-15", 4, &["17:00"]), &event, at(17, 10)).unwrap_err();
        assert!(matches!(err, RejectionReason::PartySizeMismatch { .. }));

        let err = resolve_payload(&payload("2024-01-15", 2, &["5:30pm"]), &event, at(17, 10)).unwrap_err();
        assert!(matches!(err, RejectionReason::UnparseableTime { .. }));
    }

    #[test]
    fn test_resolve_payload_after_midnight() {
        let event = create_test_event();
        let target = at(23, 45);

        let slots = resolve_payload(&payload("2024-01-15", 2, &["00:15", "23:30"]), &event, target).unwrap();
        assert_eq!(slots[0], at(0, 15) + Duration::days(1));
        assert_eq!(slots[1], at(23, 30));
    }
}
