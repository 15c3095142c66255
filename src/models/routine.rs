use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::template::{Category, ExerciseTemplate, Modality};
use super::workout::{Exercise, Workout};

/// Planned exercise inside a routine.
///
/// Name and category are captured from the template when the entry is added
/// and are not refreshed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutineExercise {
    pub template_id: Uuid,
    pub exercise_name: String,
    pub exercise_category: Option<String>,
    pub category_id: Option<Uuid>,
    pub modality: Modality,
    pub order: u32,
    pub planned_sets: u32,
}

/// Reusable list of exercises a workout can be started from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Routine {
    pub id: Uuid,
    pub name: String,
    pub exercises: Vec<RoutineExercise>,
    pub created_at: DateTime<Utc>,
}

impl Routine {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            exercises: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn add_template(
        &mut self,
        template: &ExerciseTemplate,
        category: Option<&Category>,
        planned_sets: u32,
    ) {
        self.exercises.push(RoutineExercise {
            template_id: template.id,
            exercise_name: template.name.clone(),
            exercise_category: category.map(|c| c.name.clone()),
            category_id: template.category_id,
            modality: template.modality,
            order: self.exercises.len() as u32,
            planned_sets,
        });
    }

    /// Instantiate an empty workout with one exercise per routine entry
    pub fn start_workout(&self, start_time: DateTime<Utc>) -> Workout {
        let mut workout = Workout::new(self.name.clone(), start_time);

        let mut entries: Vec<&RoutineExercise> = self.exercises.iter().collect();
        entries.sort_by_key(|e| e.order);

        for entry in entries {
            let mut exercise =
                Exercise::new(entry.template_id, entry.exercise_name.clone(), entry.modality);
            exercise.category_id = entry.category_id;
            exercise.category_name = entry.exercise_category.clone();
            workout.add_exercise(exercise);
        }

        workout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_start_workout_copies_snapshot() {
        let legs = Category::new("Legs".to_string());
        let squat = ExerciseTemplate::new("Squat".to_string(), Some(legs.id), Modality::Repetition);
        let run = ExerciseTemplate::new("Run".to_string(), None, Modality::Endurance);

        let mut routine = Routine::new("Leg day".to_string());
        routine.add_template(&squat, Some(&legs), 5);
        routine.add_template(&run, None, 1);

        let start = Utc.with_ymd_and_hms(2024, 5, 1, 18, 0, 0).unwrap();
        let workout = routine.start_workout(start);

        assert_eq!(workout.name, "Leg day");
        assert_eq!(workout.exercises.len(), 2);
        assert_eq!(workout.exercises[0].template_id, squat.id);
        assert_eq!(workout.exercises[0].category_name.as_deref(), Some("Legs"));
        assert_eq!(workout.exercises[1].modality, Modality::Endurance);
        assert_eq!(workout.exercises[1].order, 1);
        assert!(workout
            .exercises
            .iter()
            .all(|e| e.workout_start_time == start && e.sets.is_empty()));
    }
}
