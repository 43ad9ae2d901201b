// Unit tests for the pairing engine's public building blocks

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use pairing_algo::core::{
    availability::score_availability,
    compute_dining_windows,
    distance::{estimate_travel_minutes, haversine_miles},
    filters::{apply_hard_filters, RestaurantProfile},
    scoring::{score_fit, score_travel_time},
    windows::round_to_granularity,
    PairingConfig, ScoringWeights,
};
use pairing_algo::models::clock::parse_clock;
use pairing_algo::models::{
    Event, EventType, ExclusionReason, GroupSignal, Location, MealIntent, Restaurant,
    ServiceStyleTag, TagSet, TravelMode,
};

fn at(h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 15)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

fn create_test_event(event_type: EventType, intent: MealIntent, start: &str) -> Event {
    Event {
        id: "event1".to_string(),
        event_type,
        location: Some(Location { lat: 37.7749, lng: -122.4194 }),
        start_at: DateTime::parse_from_rfc3339(start).unwrap(),
        end_at: None,
        duration_minutes: None,
        meal_intent: intent,
        party_size: 4,
        has_kids: false,
        travel_mode: TravelMode::Drive,
    }
}

fn create_test_restaurant(id: &str, cuisines: &[&str], styles: &[&str], signals: &[&str]) -> Restaurant {
    Restaurant {
        id: id.to_string(),
        name: format!("Restaurant {}", id),
        location: Some(Location { lat: 37.78, lng: -122.41 }),
        cuisine_tags: cuisines.iter().map(|s| s.to_string()).collect(),
        service_style_tags: styles.iter().map(|s| s.to_string()).collect(),
        group_signals: signals.iter().map(|s| s.to_string()).collect(),
        price_tier: Some(2),
        hours: None,
    }
}

#[test]
fn test_before_event_worked_example() {
    let event = create_test_event(EventType::Show, MealIntent::BeforeEvent, "2024-01-15T19:00:00-08:00");
    let dining = compute_dining_windows(&event, 10, &PairingConfig::default());

    assert_eq!(dining.target_time, at(17, 10));
    assert_eq!(dining.windows.preferred.start, at(16, 40));
    assert_eq!(dining.windows.preferred.end, at(17, 40));
    assert_eq!(dining.windows.preferred.to_string(), "16:40-17:40");
}

#[test]
fn test_windows_never_inverted() {
    let config = PairingConfig::default();
    for intent in [MealIntent::BeforeEvent, MealIntent::AfterEvent, MealIntent::MealIsEvent] {
        for start in ["2024-01-15T11:30:00Z", "2024-01-15T19:00:00Z", "2024-01-15T23:15:00Z"] {
            for travel in [0, 7, 20, 35] {
                let event = create_test_event(EventType::Show, intent, start);
                let dining = compute_dining_windows(&event, travel, &config);
                let windows = &dining.windows;

                assert!(windows.preferred.start <= windows.preferred.end);
                for fallback in &windows.fallbacks {
                    assert!(fallback.start <= fallback.end, "{:?} {} {}", intent, start, travel);
                }
            }
        }
    }
}

#[test]
fn test_rounding_strips_seconds() {
    let raw = NaiveDate::from_ymd_opt(2024, 1, 15)
        .unwrap()
        .and_hms_milli_opt(17, 12, 31, 250)
        .unwrap();
    assert_eq!(round_to_granularity(raw, 5), at(17, 10));
    assert_eq!(round_to_granularity(at(17, 13), 5), at(17, 15));
    assert_eq!(round_to_granularity(at(17, 7), 15), at(17, 0));
}

#[test]
fn test_travel_time_score_within_range() {
    for minutes in 0..120 {
        let score = score_travel_time(minutes);
        assert!((0.0..=100.0).contains(&score));
    }
    assert!(score_travel_time(5) > score_travel_time(12));
    assert!(score_travel_time(12) > score_travel_time(18));
}

#[test]
fn test_fit_scores_within_range() {
    let config = PairingConfig::default();
    let event = create_test_event(EventType::Sports, MealIntent::AfterEvent, "2024-01-15T19:00:00Z");
    let restaurant = create_test_restaurant(
        "r1",
        &["BBQ"],
        &["casual", "share_plates"],
        &["large_tables", "noise_tolerant", "private_room"],
    );

    let fit = score_fit(&event, &RestaurantProfile::new(&restaurant), 22, &config);
    for score in [fit.service_style, fit.travel_time, fit.cuisine] {
        assert!((0.0..=100.0).contains(&score));
    }
    assert_eq!(fit.cuisine, 100.0);
    assert_eq!(fit.travel_time, 50.0);
}

#[test]
fn test_family_event_hard_filter() {
    let config = PairingConfig::default();
    let event = create_test_event(
        EventType::FamilyStyleGathering,
        MealIntent::MealIsEvent,
        "2024-01-15T18:00:00Z",
    );

    let plain = create_test_restaurant("r1", &["italian"], &["casual"], &[]);
    assert_eq!(
        apply_hard_filters(&event, &RestaurantProfile::new(&plain), 5, &config),
        Err(ExclusionReason::NotFamilyStyle)
    );

    let family = create_test_restaurant("r2", &["italian"], &["Family Style"], &[]);
    assert!(apply_hard_filters(&event, &RestaurantProfile::new(&family), 5, &config).is_ok());
}

#[test]
fn test_availability_worked_example() {
    let config = PairingConfig::default();
    let event = create_test_event(EventType::Show, MealIntent::BeforeEvent, "2024-01-15T19:00:00Z");
    let dining = compute_dining_windows(&event, 10, &config);
    let slots = vec![at(17, 0), at(17, 30), at(18, 0)];

    let fit = score_availability(&slots, &dining.windows, dining.target_time, &config);
    assert_eq!(fit.score, 100.0);
    assert_eq!(fit.recommended_times, vec!["17:00", "17:30"]);
}

#[test]
fn test_weights_renormalize_without_availability() {
    let weights = ScoringWeights::default();
    let active = weights.active(false);

    let fit_total = active.service_style + active.travel_time + active.cuisine;
    assert!((fit_total - 1.0).abs() < 1e-9);
    assert!((active.service_style - 0.4375).abs() < 1e-9);

    let full = weights.active(true);
    assert!((full.total() - 1.0).abs() < 1e-9);
    assert!((full.availability - 0.20).abs() < 1e-9);
}

#[test]
fn test_tag_parsing_reports_unknown() {
    let raw: Vec<String> = vec!["Share-Plates".into(), "rooftop".into(), "CASUAL".into()];
    let tags: TagSet<ServiceStyleTag> = TagSet::parse(&raw);

    assert!(tags.contains(&ServiceStyleTag::SharePlates));
    assert!(tags.contains(&ServiceStyleTag::Casual));
    assert_eq!(tags.unknown, vec!["rooftop".to_string()]);

    let signals: TagSet<GroupSignal> = TagSet::parse(&vec!["kids menu".to_string()]);
    assert!(signals.contains(&GroupSignal::KidsMenu));
}

#[test]
fn test_clock_parsing() {
    assert_eq!(parse_clock("17:15"), Some(at(17, 15).time()));
    assert_eq!(parse_clock("07:05:30"), Some(at(7, 5).time()));
    assert_eq!(parse_clock("5pm"), None);
    assert_eq!(parse_clock("25:00"), None);
}

#[test]
fn test_travel_estimate() {
    let a = Location { lat: 40.7128, lng: -74.0060 };
    let b = Location { lat: 40.6782, lng: -73.9442 };

    let miles = haversine_miles(&a, &b);
    assert!((miles - 4.0).abs() < 0.3, "Manhattan to Brooklyn should be ~4mi, got {}", miles);

    let minutes = estimate_travel_minutes(&a, &b, 25.0).unwrap();
    assert_eq!(minutes, (miles / 25.0 * 60.0) as u32);
}
