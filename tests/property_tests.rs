use chrono::{TimeZone, Utc};
use maptrack::{
    Coordinates, Cycling, DerivedMetric, FormInput, Running, SessionStore, SubmissionValidator,
    Workout,
};
use proptest::prelude::*;

/// Property-based tests for the workout model and submission gate

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

proptest! {
    #[test]
    fn test_running_pace_property(
        distance in 0.1f64..100.0,
        duration in 1.0f64..600.0,
        cadence in 1.0f64..250.0,
        month in 1u32..=12,
        day in 1u32..=28,
    ) {
        let date = Utc.with_ymd_and_hms(2024, month, day, 12, 0, 0).unwrap();
        let run = Running::new(
            "1".to_string(),
            date,
            Coordinates::new(40.7, -74.0),
            distance,
            duration,
            cadence,
        );

        prop_assert_eq!(run.pace(), duration / distance);

        let workout = Workout::from(run);
        let month_name = MONTH_NAMES[(month - 1) as usize];
        prop_assert!(workout.description().contains(month_name));
        let expected_suffix = format!("{} {}", month_name, day);
        prop_assert!(workout.description().ends_with(&expected_suffix));
    }

    #[test]
    fn test_cycling_speed_property(
        distance in 0.1f64..300.0,
        duration in 1.0f64..900.0,
        elevation_gain in -500.0f64..3000.0,
    ) {
        let ride = Cycling::new(
            "2".to_string(),
            Utc.with_ymd_and_hms(2024, 7, 14, 9, 0, 0).unwrap(),
            Coordinates::new(39.0, -12.0),
            distance,
            duration,
            elevation_gain,
        );

        prop_assert_eq!(ride.speed(), distance / (duration / 60.0));
        prop_assert_eq!(
            Workout::from(ride).metric(),
            DerivedMetric::Speed(distance / (duration / 60.0))
        );
    }

    #[test]
    fn test_non_positive_running_input_rejected(
        bad in -1000.0f64..=0.0,
        position in 0usize..3,
    ) {
        let mut fields = ["5".to_string(), "25".to_string(), "180".to_string()];
        fields[position] = bad.to_string();
        let input = FormInput::running(&fields[0], &fields[1], &fields[2]);

        prop_assert!(SubmissionValidator::default().validate(&input).is_err());
    }

    #[test]
    fn test_non_numeric_input_rejected(garbage in "[a-z]{1,8}") {
        let input = FormInput::cycling("10", &garbage, "100");
        // "inf"/"nan" style words are non-finite too, so every case fails
        prop_assert!(SubmissionValidator::default().validate(&input).is_err());
    }

    #[test]
    fn test_store_keeps_insertion_order(count in 1usize..20) {
        let mut store = SessionStore::new();
        let date = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        for i in 0..count {
            let run = Running::new(
                i.to_string(),
                date,
                Coordinates::new(0.0, 0.0),
                1.0,
                5.0,
                170.0,
            );
            store.append(run.into());
        }

        let ids: Vec<String> = store.serialize().into_iter().map(|r| r.id).collect();
        let expected: Vec<String> = (0..count).map(|i| i.to_string()).collect();
        prop_assert_eq!(ids, expected);
    }
}
