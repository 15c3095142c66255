//! Goal progress computation.
//!
//! Every function here is pure: the caller supplies the goal, the workout
//! history and (for consistency goals) the reference instant and calendar.
//! Missing or degenerate data yields a zero fraction, never an error.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::goal_calendar::{period_bounds, shift_period, start_of_period, GoalCalendar};
use crate::models::{
    ConsistencyGoal, Goal, Measurement, Set, SetMeasure, TargetGoal, TargetSpec, Workout,
};

/// Unit label appended to strength summaries
pub const WEIGHT_UNIT_LABEL: &str = "lbs";

/// Placeholder for a pace that cannot be shown
pub const EMPTY_PACE: &str = "--:--";

/// Normalized progress and its display summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalProgress {
    /// Always within `[0, 1]`
    pub fraction: f64,
    pub description: String,
}

impl GoalProgress {
    pub fn percentage(&self) -> f64 {
        self.fraction * 100.0
    }

    pub fn is_complete(&self) -> bool {
        self.fraction >= 1.0
    }
}

fn clamp_fraction(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Every set logged under `template_id`, across all workouts
pub fn sets_for_template(workouts: &[Workout], template_id: Uuid) -> impl Iterator<Item = &Set> {
    workouts
        .iter()
        .flat_map(|w| w.exercises.iter())
        .filter(move |e| e.template_id == template_id)
        .flat_map(|e| e.sets.iter())
}

/// Heaviest weight among sets with at least `floor(min_reps)` reps.
/// A qualifying set without a weight counts as zero.
pub fn best_weight<'a>(sets: impl IntoIterator<Item = &'a Set>, min_reps: f64) -> f64 {
    let min_reps = min_reps.floor();
    sets.into_iter()
        .filter_map(|set| match set.measure {
            SetMeasure::Repetition { reps, weight } if f64::from(reps) >= min_reps => {
                Some(weight.unwrap_or(0.0))
            }
            _ => None,
        })
        .fold(0.0, f64::max)
}

/// Fastest seconds-per-unit pace among sets covering at least `min_distance`.
/// `f64::INFINITY` when no set qualifies.
pub fn best_pace<'a>(sets: impl IntoIterator<Item = &'a Set>, min_distance: f64) -> f64 {
    sets.into_iter()
        .filter_map(|set| match set.measure {
            SetMeasure::Endurance {
                distance,
                time_seconds,
            } if distance >= min_distance && distance > 0.0 && time_seconds > 0.0 => {
                Some(time_seconds / distance)
            }
            _ => None,
        })
        .fold(f64::INFINITY, f64::min)
}

/// Seconds allowed per unit distance to cover `distance` in `minutes`
pub fn target_pace(distance: f64, minutes: f64) -> f64 {
    (minutes * 60.0) / distance
}

/// Format seconds per unit as `M:SS`
pub fn format_pace(seconds_per_unit: f64) -> String {
    if !seconds_per_unit.is_finite() || seconds_per_unit <= 0.0 {
        return EMPTY_PACE.to_string();
    }

    let total = seconds_per_unit as i64;
    format!("{}:{:02}", total / 60, total % 60)
}

pub fn strength_progress_for_sets<'a>(
    sets: impl IntoIterator<Item = &'a Set>,
    target_weight: f64,
    min_reps: f64,
) -> GoalProgress {
    let best = best_weight(sets, min_reps);

    GoalProgress {
        fraction: clamp_fraction(best / target_weight),
        description: format!(
            "{} / {} {}",
            best as i64, target_weight as i64, WEIGHT_UNIT_LABEL
        ),
    }
}

pub fn pace_progress_for_sets<'a>(
    sets: impl IntoIterator<Item = &'a Set>,
    target_distance: f64,
    target_minutes: f64,
) -> GoalProgress {
    let target = target_pace(target_distance, target_minutes);
    let best = best_pace(sets, target_distance);

    GoalProgress {
        fraction: clamp_fraction(target / best),
        description: format!("{} / {}", format_pace(best), format_pace(target)),
    }
}

pub fn strength_progress(
    exercise_id: Uuid,
    target_weight: f64,
    min_reps: f64,
    workouts: &[Workout],
) -> GoalProgress {
    strength_progress_for_sets(sets_for_template(workouts, exercise_id), target_weight, min_reps)
}

pub fn pace_progress(
    exercise_id: Uuid,
    target_distance: f64,
    target_minutes: f64,
    workouts: &[Workout],
) -> GoalProgress {
    pace_progress_for_sets(
        sets_for_template(workouts, exercise_id),
        target_distance,
        target_minutes,
    )
}

fn target_progress_for_sets<'a>(
    spec: &TargetSpec,
    sets: impl IntoIterator<Item = &'a Set>,
) -> GoalProgress {
    match *spec {
        TargetSpec::Strength { weight, min_reps } => {
            strength_progress_for_sets(sets, weight, min_reps)
        }
        TargetSpec::Pace { distance, minutes } => pace_progress_for_sets(sets, distance, minutes),
    }
}

/// Progress of a target goal over the supplied history
pub fn progress(goal: &TargetGoal, workouts: &[Workout]) -> GoalProgress {
    target_progress_for_sets(&goal.spec, sets_for_template(workouts, goal.exercise_id))
}

/// Sets grouped by template id, built once and shared across goal evaluations
#[derive(Debug, Default)]
pub struct SetIndex<'a> {
    by_template: HashMap<Uuid, Vec<&'a Set>>,
}

impl<'a> SetIndex<'a> {
    pub fn build(workouts: &'a [Workout]) -> Self {
        let mut by_template: HashMap<Uuid, Vec<&'a Set>> = HashMap::new();
        for exercise in workouts.iter().flat_map(|w| w.exercises.iter()) {
            by_template
                .entry(exercise.template_id)
                .or_default()
                .extend(exercise.sets.iter());
        }
        Self { by_template }
    }

    pub fn sets(&self, template_id: Uuid) -> impl Iterator<Item = &'a Set> + '_ {
        self.by_template
            .get(&template_id)
            .into_iter()
            .flatten()
            .copied()
    }

    pub fn template_count(&self) -> usize {
        self.by_template.len()
    }

    pub fn progress(&self, goal: &TargetGoal) -> GoalProgress {
        target_progress_for_sets(&goal.spec, self.sets(goal.exercise_id))
    }
}

/// Amount of the goal's measurement logged in `[start, end)`.
///
/// Workouts that began before the goal's start date are ignored. With an
/// exercise scope only workouts containing that template count, and reps are
/// taken from that template's sets alone.
pub fn measure_period(
    goal: &ConsistencyGoal,
    workouts: &[Workout],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> f64 {
    let in_period = workouts.iter().filter(|w| {
        w.start_time >= start
            && w.start_time < end
            && w.start_time >= goal.start_date
            && goal.exercise_id.map_or(true, |id| w.contains_template(id))
    });

    match goal.measurement {
        Measurement::Minutes => in_period.map(Workout::duration_minutes).sum::<f64>(),
        Measurement::Workouts => in_period.count() as f64,
        Measurement::Reps => in_period
            .flat_map(|w| w.exercises.iter())
            .filter(|e| goal.exercise_id.map_or(true, |id| e.template_id == id))
            .flat_map(|e| e.sets.iter())
            .filter_map(Set::reps)
            .map(f64::from)
            .sum::<f64>(),
    }
}

/// Progress of a consistency goal in the period containing `now`
pub fn consistency_progress(
    goal: &ConsistencyGoal,
    workouts: &[Workout],
    now: DateTime<Utc>,
    calendar: &GoalCalendar,
) -> GoalProgress {
    let (start, end) = period_bounds(goal.timeframe, now, calendar);
    let total = measure_period(goal, workouts, start, end);

    GoalProgress {
        fraction: clamp_fraction(total / goal.target),
        description: format!(
            "{} / {} {} this {}",
            total as i64,
            goal.target as i64,
            goal.measurement,
            goal.timeframe.period_noun()
        ),
    }
}

/// Consecutive periods in which the target was met, counting back from the
/// period containing `now`. An unmet current period does not break the
/// streak since it may still be completed.
pub fn consistency_streak(
    goal: &ConsistencyGoal,
    workouts: &[Workout],
    now: DateTime<Utc>,
    calendar: &GoalCalendar,
) -> u32 {
    let earliest = start_of_period(goal.timeframe, goal.start_date, calendar);
    let met = |start: DateTime<Utc>| {
        let end = shift_period(goal.timeframe, start, 1, calendar);
        measure_period(goal, workouts, start, end) >= goal.target
    };

    let current = start_of_period(goal.timeframe, now, calendar);
    let mut streak = u32::from(met(current));
    let mut period = current;

    loop {
        let previous = shift_period(goal.timeframe, period, -1, calendar);
        if previous >= period || previous < earliest || !met(previous) {
            break;
        }
        streak += 1;
        period = previous;
    }

    streak
}

/// Progress of either goal kind
pub fn goal_progress(
    goal: &Goal,
    workouts: &[Workout],
    now: DateTime<Utc>,
    calendar: &GoalCalendar,
) -> GoalProgress {
    match goal {
        Goal::Consistency(goal) => consistency_progress(goal, workouts, now, calendar),
        Goal::Target(goal) => progress(goal, workouts),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        ConsistencyGoal, Exercise, Modality, NewConsistencyGoal, NewTargetGoal, TargetType,
        Timeframe,
    };
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn workout_with_sets(
        template_id: Uuid,
        modality: Modality,
        start: DateTime<Utc>,
        sets: Vec<Set>,
    ) -> Workout {
        let mut workout = Workout::new("Session".to_string(), start);
        let exercise =
            workout.add_exercise(Exercise::new(template_id, "Lift".to_string(), modality));
        for set in sets {
            exercise.add_set(set);
        }
        workout
    }

    fn target_goal(
        exercise_id: Uuid,
        target_type: TargetType,
        primary: f64,
        secondary: f64,
    ) -> TargetGoal {
        TargetGoal::new(NewTargetGoal {
            name: "Goal".to_string(),
            exercise_id,
            target_type,
            target_primary_value: primary,
            target_secondary_value: secondary,
            start_date: None,
        })
    }

    #[test]
    fn test_strength_filters_low_rep_sets() {
        let bench = Uuid::new_v4();
        let workouts = vec![workout_with_sets(
            bench,
            Modality::Repetition,
            utc(2024, 1, 10, 18),
            vec![Set::repetition(5, Some(185.0)), Set::repetition(4, Some(200.0))],
        )];
        let goal = target_goal(bench, TargetType::Strength, 225.0, 5.0);

        let result = progress(&goal, &workouts);
        assert_eq!(result.description, "185 / 225 lbs");
        assert!((result.fraction - 185.0 / 225.0).abs() < 1e-9);
        assert!(!result.is_complete());
    }

    #[test]
    fn test_strength_min_reps_is_floored() {
        let bench = Uuid::new_v4();
        let workouts = vec![workout_with_sets(
            bench,
            Modality::Repetition,
            utc(2024, 1, 10, 18),
            vec![Set::repetition(5, Some(200.0))],
        )];

        let result = strength_progress(bench, 200.0, 5.9, &workouts);
        assert_eq!(result.fraction, 1.0);
    }

    #[test]
    fn test_strength_missing_weight_counts_as_zero() {
        let pullup = Uuid::new_v4();
        let workouts = vec![workout_with_sets(
            pullup,
            Modality::Repetition,
            utc(2024, 1, 10, 18),
            vec![Set::repetition(10, None)],
        )];

        let result = strength_progress(pullup, 45.0, 8.0, &workouts);
        assert_eq!(result.fraction, 0.0);
        assert_eq!(result.description, "0 / 45 lbs");
    }

    #[test]
    fn test_strength_ignores_other_templates() {
        let bench = Uuid::new_v4();
        let squat = Uuid::new_v4();
        let workouts = vec![workout_with_sets(
            squat,
            Modality::Repetition,
            utc(2024, 1, 10, 18),
            vec![Set::repetition(5, Some(315.0))],
        )];

        let result = strength_progress(bench, 225.0, 5.0, &workouts);
        assert_eq!(result.fraction, 0.0);
    }

    #[test]
    fn test_pace_exceeding_target_is_capped() {
        let run = Uuid::new_v4();
        let workouts = vec![workout_with_sets(
            run,
            Modality::Endurance,
            utc(2024, 1, 10, 7),
            vec![Set::endurance(5.0, 300.0)],
        )];
        let goal = target_goal(run, TargetType::Pace, 5.0, 30.0);

        assert_eq!(target_pace(5.0, 30.0), 360.0);
        let result = progress(&goal, &workouts);
        assert_eq!(result.fraction, 1.0);
        assert!(result.is_complete());
        assert_eq!(result.description, "1:00 / 6:00");
    }

    #[test]
    fn test_pace_skips_short_and_degenerate_sets() {
        let run = Uuid::new_v4();
        let workouts = vec![workout_with_sets(
            run,
            Modality::Endurance,
            utc(2024, 1, 10, 7),
            vec![
                Set::endurance(3.0, 600.0),
                Set::endurance(5.0, 0.0),
                Set::endurance(5.0, 1950.0),
            ],
        )];

        let result = pace_progress(run, 5.0, 30.0, &workouts);
        assert_eq!(result.description, "6:30 / 6:00");
        assert!((result.fraction - 360.0 / 390.0).abs() < 1e-9);
    }

    #[test]
    fn test_pace_without_qualifying_sets() {
        let run = Uuid::new_v4();
        let result = pace_progress(run, 5.0, 30.0, &[]);
        assert_eq!(result.fraction, 0.0);
        assert_eq!(result.description, "--:-- / 6:00");
    }

    #[test]
    fn test_format_pace() {
        assert_eq!(format_pace(390.0), "6:30");
        assert_eq!(format_pace(59.9), "0:59");
        assert_eq!(format_pace(605.0), "10:05");
        assert_eq!(format_pace(0.0), "--:--");
        assert_eq!(format_pace(-10.0), "--:--");
        assert_eq!(format_pace(f64::INFINITY), "--:--");
        assert_eq!(format_pace(f64::NAN), "--:--");
    }

    #[test]
    fn test_set_index_matches_direct_scan() {
        let bench = Uuid::new_v4();
        let run = Uuid::new_v4();
        let workouts = vec![
            workout_with_sets(
                bench,
                Modality::Repetition,
                utc(2024, 1, 8, 18),
                vec![Set::repetition(5, Some(205.0))],
            ),
            workout_with_sets(
                run,
                Modality::Endurance,
                utc(2024, 1, 9, 7),
                vec![Set::endurance(5.0, 1800.0)],
            ),
        ];
        let index = SetIndex::build(&workouts);
        let strength = target_goal(bench, TargetType::Strength, 225.0, 5.0);
        let pace = target_goal(run, TargetType::Pace, 5.0, 30.0);

        assert_eq!(index.template_count(), 2);
        assert_eq!(index.progress(&strength), progress(&strength, &workouts));
        assert_eq!(index.progress(&pace), progress(&pace, &workouts));
        assert_eq!(index.sets(Uuid::new_v4()).count(), 0);
    }

    fn weekly_goal(
        measurement: Measurement,
        target: f64,
        start_date: DateTime<Utc>,
    ) -> ConsistencyGoal {
        ConsistencyGoal::new(NewConsistencyGoal {
            name: "Weekly".to_string(),
            timeframe: Timeframe::Weekly,
            measurement,
            target,
            exercise_id: None,
            start_date: Some(start_date),
        })
    }

    fn timed_workout(start: DateTime<Utc>, minutes: i64) -> Workout {
        let mut workout = Workout::new("Session".to_string(), start);
        workout.finish(start + Duration::minutes(minutes));
        workout
    }

    #[test]
    fn test_consistency_counts_current_week_only() {
        let calendar = GoalCalendar::default();
        let goal = weekly_goal(Measurement::Workouts, 4.0, utc(2023, 12, 1, 0));
        // Week of Sunday 2024-01-14
        let workouts = vec![
            timed_workout(utc(2024, 1, 14, 8), 30),
            timed_workout(utc(2024, 1, 16, 8), 45),
            timed_workout(utc(2024, 1, 17, 8), 60),
            timed_workout(utc(2024, 1, 13, 8), 60),
        ];

        let result = consistency_progress(&goal, &workouts, utc(2024, 1, 17, 12), &calendar);
        assert_eq!(result.description, "3 / 4 workouts this week");
        assert_eq!(result.fraction, 0.75);
    }

    #[test]
    fn test_consistency_minutes_and_start_date() {
        let calendar = GoalCalendar::default();
        let goal = weekly_goal(Measurement::Minutes, 120.0, utc(2024, 1, 15, 0));
        let workouts = vec![
            timed_workout(utc(2024, 1, 14, 8), 90),
            timed_workout(utc(2024, 1, 16, 8), 45),
        ];

        let result = consistency_progress(&goal, &workouts, utc(2024, 1, 17, 12), &calendar);
        assert_eq!(result.description, "45 / 120 minutes this week");
        assert_eq!(result.fraction, 0.375);
    }

    #[test]
    fn test_consistency_reps_scoped_to_exercise() {
        let calendar = GoalCalendar::default();
        let pushup = Uuid::new_v4();
        let squat = Uuid::new_v4();
        let mut goal = weekly_goal(Measurement::Reps, 100.0, utc(2024, 1, 1, 0));
        goal.exercise_id = Some(pushup);

        let mut workout = Workout::new("Mixed".to_string(), utc(2024, 1, 15, 8));
        workout
            .add_exercise(Exercise::new(pushup, "Push-up".to_string(), Modality::Repetition))
            .add_set(Set::repetition(30, None));
        workout
            .add_exercise(Exercise::new(squat, "Squat".to_string(), Modality::Repetition))
            .add_set(Set::repetition(50, Some(135.0)));

        let result = consistency_progress(&goal, &[workout], utc(2024, 1, 17, 12), &calendar);
        assert_eq!(result.description, "30 / 100 reps this week");
    }

    #[test]
    fn test_streak_counts_back_until_missed_period() {
        let calendar = GoalCalendar::default();
        let goal = weekly_goal(Measurement::Workouts, 1.0, utc(2023, 12, 1, 0));
        let workouts = vec![
            timed_workout(utc(2024, 1, 2, 8), 30),  // week of Dec 31
            timed_workout(utc(2024, 1, 9, 8), 30),  // week of Jan 7
            timed_workout(utc(2023, 12, 19, 8), 30), // week of Dec 17, gap before it
        ];

        // Current week (Jan 14) has nothing yet and does not break the streak
        assert_eq!(
            consistency_streak(&goal, &workouts, utc(2024, 1, 17, 12), &calendar),
            2
        );

        let mut with_current = workouts.clone();
        with_current.push(timed_workout(utc(2024, 1, 15, 8), 30));
        assert_eq!(
            consistency_streak(&goal, &with_current, utc(2024, 1, 17, 12), &calendar),
            3
        );
    }

    #[test]
    fn test_streak_stops_at_goal_start() {
        let calendar = GoalCalendar::default();
        let goal = weekly_goal(Measurement::Workouts, 1.0, utc(2024, 1, 8, 0));
        let workouts: Vec<Workout> = (0..6)
            .map(|week| timed_workout(utc(2024, 1, 16, 8) - Duration::weeks(week), 30))
            .collect();

        assert_eq!(
            consistency_streak(&goal, &workouts, utc(2024, 1, 17, 12), &calendar),
            2
        );
    }

    #[test]
    fn test_goal_progress_dispatch_is_idempotent() {
        let calendar = GoalCalendar::default();
        let bench = Uuid::new_v4();
        let workouts = vec![workout_with_sets(
            bench,
            Modality::Repetition,
            utc(2024, 1, 10, 18),
            vec![Set::repetition(5, Some(185.0))],
        )];
        let goal = Goal::Target(target_goal(bench, TargetType::Strength, 225.0, 5.0));
        let now = utc(2024, 1, 17, 12);

        let first = goal_progress(&goal, &workouts, now, &calendar);
        let second = goal_progress(&goal, &workouts, now, &calendar);
        assert_eq!(first, second);
    }
}
