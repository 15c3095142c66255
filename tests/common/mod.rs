#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use gymlog::models::{Exercise, Modality, NewTargetGoal, Set, TargetGoal, TargetType, Workout};
use uuid::Uuid;

pub fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

/// Fixture builders for workout histories
pub struct MockDataGenerator;

impl MockDataGenerator {
    pub fn workout(
        template_id: Uuid,
        modality: Modality,
        start: DateTime<Utc>,
        sets: Vec<Set>,
    ) -> Workout {
        let mut workout = Workout::new("Session".to_string(), start);
        let exercise =
            workout.add_exercise(Exercise::new(template_id, "Exercise".to_string(), modality));
        for set in sets {
            exercise.add_set(set);
        }
        workout
    }

    pub fn lifting(template_id: Uuid, sets: &[(u32, f64)]) -> Workout {
        Self::workout(
            template_id,
            Modality::Repetition,
            utc(2024, 1, 10, 18),
            sets.iter()
                .map(|&(reps, weight)| Set::repetition(reps, Some(weight)))
                .collect(),
        )
    }

    pub fn running(template_id: Uuid, efforts: &[(f64, f64)]) -> Workout {
        Self::workout(
            template_id,
            Modality::Endurance,
            utc(2024, 1, 11, 7),
            efforts
                .iter()
                .map(|&(distance, seconds)| Set::endurance(distance, seconds))
                .collect(),
        )
    }

    pub fn target_request(
        exercise_id: Uuid,
        target_type: TargetType,
        primary: f64,
        secondary: f64,
    ) -> NewTargetGoal {
        NewTargetGoal {
            name: format!("{} goal", target_type),
            exercise_id,
            target_type,
            target_primary_value: primary,
            target_secondary_value: secondary,
            start_date: Some(utc(2024, 1, 1, 0)),
        }
    }

    pub fn target_goal(
        exercise_id: Uuid,
        target_type: TargetType,
        primary: f64,
        secondary: f64,
    ) -> TargetGoal {
        TargetGoal::new(Self::target_request(exercise_id, target_type, primary, secondary))
    }
}
