mod common;

use chrono::{Datelike, Weekday};
use gymlog::models::{Modality, Set, TargetType, Timeframe};
use gymlog::services::progress_engine::{
    best_weight, format_pace, progress, sets_for_template, target_pace,
};
use gymlog::services::{start_of_period, GoalCalendar};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use uuid::Uuid;

use common::{utc, MockDataGenerator};

#[test]
fn test_strength_display_example() {
    let bench = Uuid::new_v4();
    let workouts = vec![MockDataGenerator::lifting(bench, &[(5, 185.0), (4, 200.0)])];
    let goal = MockDataGenerator::target_goal(bench, TargetType::Strength, 225.0, 5.0);

    let result = progress(&goal, &workouts);
    assert_eq!(result.description, "185 / 225 lbs");
    assert!((result.fraction - 0.822).abs() < 0.001);
}

#[test]
fn test_pace_inversion_example() {
    let run = Uuid::new_v4();
    let workouts = vec![MockDataGenerator::running(run, &[(5.0, 300.0)])];
    let goal = MockDataGenerator::target_goal(run, TargetType::Pace, 5.0, 30.0);

    assert_eq!(target_pace(5.0, 30.0), 360.0);
    assert_eq!(progress(&goal, &workouts).fraction, 1.0);
}

#[test]
fn test_format_pace_examples() {
    assert_eq!(format_pace(390.0), "6:30");
    assert_eq!(format_pace(0.0), "--:--");
    assert_eq!(format_pace(f64::INFINITY), "--:--");
}

#[test]
fn test_empty_history_is_zero() {
    let id = Uuid::new_v4();
    for target_type in [TargetType::Strength, TargetType::Pace] {
        let goal = MockDataGenerator::target_goal(id, target_type, 10.0, 5.0);
        assert_eq!(progress(&goal, &[]).fraction, 0.0);
    }
}

#[test]
fn test_weekly_boundary_on_wednesday() {
    let calendar = GoalCalendar::default();
    let wednesday = utc(2024, 1, 17, 13);
    assert_eq!(wednesday.weekday(), Weekday::Wed);

    let start = start_of_period(Timeframe::Weekly, wednesday, &calendar);
    assert_eq!(start, utc(2024, 1, 14, 0));
    assert_eq!(start.weekday(), Weekday::Sun);
}

#[test]
fn test_progress_is_idempotent() {
    let bench = Uuid::new_v4();
    let workouts = vec![MockDataGenerator::lifting(bench, &[(5, 135.0), (8, 155.0)])];
    let goal = MockDataGenerator::target_goal(bench, TargetType::Strength, 225.0, 5.0);

    assert_eq!(progress(&goal, &workouts), progress(&goal, &workouts));
}

fn lifting_sets() -> impl Strategy<Value = Vec<(u32, f64)>> {
    prop::collection::vec((0u32..20, 0.0f64..500.0), 0..12)
}

fn running_sets() -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec((0.0f64..50.0, 0.0f64..20_000.0), 0..12)
}

proptest! {
    #[test]
    fn prop_strength_fraction_in_bounds(
        sets in lifting_sets(),
        target in 1.0f64..1000.0,
        min_reps in 1.0f64..12.0,
    ) {
        let bench = Uuid::new_v4();
        let workouts = vec![MockDataGenerator::lifting(bench, &sets)];
        let goal = MockDataGenerator::target_goal(bench, TargetType::Strength, target, min_reps);

        let fraction = progress(&goal, &workouts).fraction;
        prop_assert!((0.0..=1.0).contains(&fraction));
    }

    #[test]
    fn prop_pace_fraction_in_bounds(
        efforts in running_sets(),
        distance in 0.1f64..50.0,
        minutes in 0.1f64..600.0,
    ) {
        let run = Uuid::new_v4();
        let workouts = vec![MockDataGenerator::running(run, &efforts)];
        let goal = MockDataGenerator::target_goal(run, TargetType::Pace, distance, minutes);

        let fraction = progress(&goal, &workouts).fraction;
        prop_assert!((0.0..=1.0).contains(&fraction));
    }

    #[test]
    fn prop_strength_is_monotonic(
        sets in lifting_sets(),
        extra_weight in 0.0f64..600.0,
        target in 1.0f64..1000.0,
    ) {
        let bench = Uuid::new_v4();
        let goal = MockDataGenerator::target_goal(bench, TargetType::Strength, target, 5.0);
        let mut workouts = vec![MockDataGenerator::lifting(bench, &sets)];
        let before = progress(&goal, &workouts).fraction;

        // Below the rep threshold: no effect
        workouts[0].exercises[0].add_set(Set::repetition(4, Some(extra_weight)));
        prop_assert_eq!(progress(&goal, &workouts).fraction, before);

        // Qualifying set: heavier than the best strictly raises the fraction
        // unless it is already capped at 1.0
        let best = best_weight(sets_for_template(&workouts, bench), 5.0);
        workouts[0].exercises[0].add_set(Set::repetition(5, Some(extra_weight)));
        let after = progress(&goal, &workouts).fraction;
        prop_assert!(after >= before);
        if extra_weight > best {
            if before < 1.0 {
                prop_assert!(after > before || after == 1.0);
            } else {
                prop_assert_eq!(after, 1.0);
            }
        } else {
            prop_assert_eq!(after, before);
        }
    }
}

#[test]
fn test_endurance_sets_ignored_by_strength_goal() {
    let id = Uuid::new_v4();
    let workouts = vec![MockDataGenerator::workout(
        id,
        Modality::Endurance,
        utc(2024, 1, 12, 6),
        vec![Set::endurance(5.0, 1500.0)],
    )];
    let goal = MockDataGenerator::target_goal(id, TargetType::Strength, 100.0, 1.0);

    assert_eq!(progress(&goal, &workouts).description, "0 / 100 lbs");
}
