use wayfare_engine::models::activity::{Coordinate, CustomEvent, ItineraryActivity, PlaceDetails};
use wayfare_engine::models::open_hours::OpenHoursRow;
use wayfare_engine::models::scheduling::{DayWindow, FixedPlacement, ScheduleCandidate};
use wayfare_engine::services::custom_events::{
    build_custom_event_overlap_warnings, OverlapWarningConfig,
};
use wayfare_engine::services::scheduler::{Scheduler, SchedulerConfig};
use wayfare_engine::services::segments::build_adjacent_segments;
use wayfare_engine::services::travel_time::{
    classify_travel_time_conflict, estimate_travel_minutes, suggest_travel_time_shift,
    TravelTimeConflictInput, TravelTimeShiftInput, TravelTimeStatus,
};
use wayfare_engine::utils::clock::format_clock_minutes;
use wayfare_engine::utils::geo::haversine_meters;

fn candidate(id: &str, lat: f64, lng: f64, duration: i64) -> ScheduleCandidate {
    ScheduleCandidate {
        id: id.to_string(),
        name: format!("Stop {id}"),
        coordinates: Some(Coordinate::new(lat, lng)),
        types: Vec::new(),
        duration_minutes: duration,
        preferred_date: None,
        open_hours: None,
    }
}

fn to_itinerary_row(
    placement: &wayfare_engine::models::scheduling::Placement,
    coordinates: Coordinate,
) -> ItineraryActivity {
    ItineraryActivity {
        id: placement.id.clone(),
        destination_id: "dest-1".to_string(),
        date: Some(placement.date.clone()),
        start: Some(format_clock_minutes(placement.start_min)),
        end: Some(format_clock_minutes(placement.end_min)),
        activity: PlaceDetails {
            id: format!("place-{}", placement.id),
            name: format!("Stop {}", placement.id),
            types: Vec::new(),
            coordinates: Some(coordinates),
        },
    }
}

/// Schedule a day, derive its segments, classify each gap against a walking
/// travel estimate, and check a fixed flight block for overlaps. This is
/// the shape of one full assistant turn over the engine.
#[test]
fn schedule_segments_conflicts_and_warnings_compose() {
    let window = DayWindow {
        day_start_min: 540,
        day_end_min: 1140,
    };
    let scheduler = Scheduler::new(SchedulerConfig {
        day_window: window,
        ..SchedulerConfig::default()
    });

    // Three stops around central Paris, walkable between.
    let eiffel = candidate("1", 48.8584, 2.2945, 120);
    let orsay = candidate("2", 48.8600, 2.3266, 90);
    let louvre = candidate("3", 48.8606, 2.3376, 120);
    let pool = vec!["2025-05-05".to_string()];

    let outcome = scheduler
        .schedule(
            &[eiffel.clone(), orsay.clone(), louvre.clone()],
            &[],
            &pool,
        )
        .unwrap();
    assert!(outcome.unplaced.is_empty());
    assert_eq!(outcome.placements.len(), 3);

    // Back-to-back cursor placement: each gap is zero minutes.
    let coordinates = [
        (eiffel.id.clone(), eiffel.coordinates.unwrap()),
        (orsay.id.clone(), orsay.coordinates.unwrap()),
        (louvre.id.clone(), louvre.coordinates.unwrap()),
    ];
    let rows: Vec<ItineraryActivity> = outcome
        .placements
        .iter()
        .map(|placement| {
            let (_, coordinate) = coordinates
                .iter()
                .find(|(id, _)| id == &placement.id)
                .unwrap();
            to_itinerary_row(placement, *coordinate)
        })
        .collect();

    let segments = build_adjacent_segments("2025-05-05", &rows);
    assert_eq!(segments.len(), 2);

    for segment in &segments {
        let from = coordinates
            .iter()
            .find(|(id, _)| id == &segment.from_id)
            .unwrap();
        let to = coordinates
            .iter()
            .find(|(id, _)| id == &segment.to_id)
            .unwrap();
        let meters = haversine_meters(&from.1, &to.1);
        let travel = estimate_travel_minutes(
            meters,
            wayfare_engine::models::preferences::TravelMode::Walk,
        );
        let conflict = classify_travel_time_conflict(&TravelTimeConflictInput {
            gap_minutes: segment.gap_minutes,
            travel_minutes: travel,
            buffer_minutes: 10,
            tight_threshold_minutes: None,
        });
        // Zero gap against a real walk is always a conflict here.
        assert_eq!(conflict.status, TravelTimeStatus::Conflict);
        assert_eq!(
            conflict.short_by_minutes,
            travel + 10 - segment.gap_minutes
        );

        // The suggested shift resolves exactly the shortfall when the day
        // has room.
        let shift = suggest_travel_time_shift(&TravelTimeShiftInput {
            from_end_min: segment.from_end_min,
            to_start_min: segment.to_start_min,
            to_end_min: segment.to_start_min + 30,
            required_gap_min: conflict.required_gap_minutes,
            next_start_min: None,
            day_end_min: Some(window.day_end_min),
            max_shift_min: None,
        });
        let shift = shift.expect("shift should be feasible");
        assert_eq!(
            shift.new_start_min - segment.from_end_min,
            conflict.required_gap_minutes
        );
    }

    // A flight block across the first stop produces exactly one warning.
    let blocks = vec![CustomEvent {
        id: "b1".to_string(),
        title: "Flight to Rome".to_string(),
        kind: "flight".to_string(),
        date: "2025-05-05".to_string(),
        start: "10:00".to_string(),
        end: "11:00".to_string(),
    }];
    let warnings =
        build_custom_event_overlap_warnings(&rows, &blocks, &OverlapWarningConfig::default());
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("Flight to Rome"));
}

#[test]
fn fixed_blocks_and_opening_hours_steer_placement() {
    let scheduler = Scheduler::new(SchedulerConfig::default());

    // Monday-only afternoon museum plus an unconstrained cafe, against a
    // fixed morning tour.
    let mut museum = candidate("1", 48.8606, 2.3376, 120);
    museum.open_hours = Some(vec![OpenHoursRow {
        day: Some(1),
        open_hour: Some(13),
        open_minute: Some(0),
        close_hour: Some(17),
        close_minute: Some(0),
    }]);
    let cafe = candidate("2", 48.8607, 2.3380, 60);

    let fixed = vec![FixedPlacement {
        id: "90".to_string(),
        date: "2025-05-05".to_string(),
        start_min: 540,
        end_min: 630,
    }];
    let pool = vec!["2025-05-05".to_string()];

    let outcome = scheduler
        .schedule(&[museum, cafe], &[], &pool)
        .unwrap();
    // Without the fixed block the museum still waits for its opening hours.
    let museum_placement = outcome
        .placements
        .iter()
        .find(|placement| placement.id == "1")
        .unwrap();
    assert_eq!(museum_placement.start_min, 780);

    let outcome = scheduler
        .schedule(
            &[candidate("3", 48.8606, 2.3376, 60)],
            &fixed,
            &pool,
        )
        .unwrap();
    assert_eq!(outcome.placements[0].start_min, 630);
}
