use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::template::{Category, ExerciseTemplate, Modality};
use crate::errors::ValidationError;

/// What a single set recorded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SetMeasure {
    Repetition { reps: u32, weight: Option<f64> },
    /// `time_seconds` is the elapsed time over `distance`
    Endurance { distance: f64, time_seconds: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Set {
    pub id: Uuid,
    pub measure: SetMeasure,
}

impl Set {
    pub fn new(measure: SetMeasure) -> Self {
        Self {
            id: Uuid::new_v4(),
            measure,
        }
    }

    pub fn repetition(reps: u32, weight: Option<f64>) -> Self {
        Self::new(SetMeasure::Repetition { reps, weight })
    }

    pub fn endurance(distance: f64, time_seconds: f64) -> Self {
        Self::new(SetMeasure::Endurance {
            distance,
            time_seconds,
        })
    }

    pub fn reps(&self) -> Option<u32> {
        match self.measure {
            SetMeasure::Repetition { reps, .. } => Some(reps),
            SetMeasure::Endurance { .. } => None,
        }
    }
}

impl std::fmt::Display for Set {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.measure {
            SetMeasure::Repetition {
                reps,
                weight: Some(weight),
            } => write!(f, "{} x {}", reps, weight),
            SetMeasure::Repetition { reps, weight: None } => write!(f, "{} reps", reps),
            SetMeasure::Endurance {
                distance,
                time_seconds,
            } => write!(f, "{} in {:.0}s", distance, time_seconds),
        }
    }
}

/// A logged exercise inside a workout.
///
/// `name` and `category_name` are a snapshot of the template taken when the
/// exercise was created. They are never re-derived, so renaming or deleting
/// the template leaves history untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: Uuid,
    pub name: String,
    pub category_id: Option<Uuid>,
    pub category_name: Option<String>,
    pub order: u32,
    pub intensity: Option<u8>,
    pub modality: Modality,
    pub template_id: Uuid,
    /// Copy of the owning workout's start time
    pub workout_start_time: DateTime<Utc>,
    pub sets: Vec<Set>,
}

impl Exercise {
    pub fn new(template_id: Uuid, name: String, modality: Modality) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            category_id: None,
            category_name: None,
            order: 0,
            intensity: None,
            modality,
            template_id,
            workout_start_time: Utc::now(),
            sets: Vec::new(),
        }
    }

    /// Snapshot a template (and its category, if known) into a new exercise
    pub fn from_template(template: &ExerciseTemplate, category: Option<&Category>) -> Self {
        let mut exercise = Self::new(template.id, template.name.clone(), template.modality);
        exercise.category_id = template.category_id;
        exercise.category_name = category.map(|c| c.name.clone());
        exercise
    }

    pub fn add_set(&mut self, set: Set) {
        self.sets.push(set);
    }

    pub fn set_intensity(&mut self, intensity: u8) -> Result<(), ValidationError> {
        if !(1..=3).contains(&intensity) {
            return Err(ValidationError::OutOfRange {
                field: "intensity",
                min: 1,
                max: 3,
                value: intensity,
            });
        }
        self.intensity = Some(intensity);
        Ok(())
    }
}

/// Workout entry with its owned exercises and sets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    pub id: Uuid,
    pub name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub bodyweight: Option<f64>,
    pub notes: Option<String>,
    pub rating: Option<u8>,
    pub exercises: Vec<Exercise>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Workout {
    /// Create a new workout with generated ID and timestamps
    pub fn new(name: String, start_time: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            start_time,
            end_time: None,
            bodyweight: None,
            notes: None,
            rating: None,
            exercises: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Elapsed time; zero while unfinished or when the end precedes the start
    pub fn duration(&self) -> Duration {
        match self.end_time {
            Some(end) if end >= self.start_time => end - self.start_time,
            _ => Duration::zero(),
        }
    }

    pub fn duration_minutes(&self) -> f64 {
        self.duration().num_seconds() as f64 / 60.0
    }

    pub fn finish(&mut self, end_time: DateTime<Utc>) {
        self.end_time = Some(end_time);
        self.updated_at = Utc::now();
    }

    /// Move the workout and keep every exercise's start time copy in step
    pub fn set_start_time(&mut self, start_time: DateTime<Utc>) {
        self.start_time = start_time;
        for exercise in &mut self.exercises {
            exercise.workout_start_time = start_time;
        }
        self.updated_at = Utc::now();
    }

    pub fn set_rating(&mut self, rating: u8) -> Result<(), ValidationError> {
        if !(1..=5).contains(&rating) {
            return Err(ValidationError::OutOfRange {
                field: "rating",
                min: 1,
                max: 5,
                value: rating,
            });
        }
        self.rating = Some(rating);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Append an exercise at the end of the workout order
    pub fn add_exercise(&mut self, mut exercise: Exercise) -> &mut Exercise {
        exercise.order = self.exercises.len() as u32;
        exercise.workout_start_time = self.start_time;
        self.updated_at = Utc::now();
        self.exercises.push(exercise);
        let last = self.exercises.len() - 1;
        &mut self.exercises[last]
    }

    /// Remove an exercise (and its sets), renumbering the remaining order
    pub fn remove_exercise(&mut self, exercise_id: Uuid) -> Option<Exercise> {
        let index = self.exercises.iter().position(|e| e.id == exercise_id)?;
        let removed = self.exercises.remove(index);
        for (order, exercise) in self.exercises.iter_mut().enumerate() {
            exercise.order = order as u32;
        }
        self.updated_at = Utc::now();
        Some(removed)
    }

    pub fn contains_template(&self, template_id: Uuid) -> bool {
        self.exercises.iter().any(|e| e.template_id == template_id)
    }

    pub fn set_count(&self) -> usize {
        self.exercises.iter().map(|e| e.sets.len()).sum()
    }
}

/// Filter criteria for listing workouts
#[derive(Debug, Default, Clone)]
pub struct WorkoutFilter {
    pub template_id: Option<Uuid>,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
}

impl WorkoutFilter {
    pub fn since(from_date: DateTime<Utc>) -> Self {
        Self {
            from_date: Some(from_date),
            ..Self::default()
        }
    }

    pub fn matches(&self, workout: &Workout) -> bool {
        if let Some(template_id) = self.template_id {
            if !workout.contains_template(template_id) {
                return false;
            }
        }

        if let Some(from) = self.from_date {
            if workout.start_time < from {
                return false;
            }
        }

        if let Some(to) = self.to_date {
            if workout.start_time > to {
                return false;
            }
        }

        true
    }
}
