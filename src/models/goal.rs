use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::GoalError;

/// Recurring period a consistency goal is measured over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    Daily,
    Weekly,
    Monthly,
}

impl Timeframe {
    /// Singular period noun used in progress summaries ("this week")
    pub fn period_noun(&self) -> &'static str {
        match self {
            Timeframe::Daily => "day",
            Timeframe::Weekly => "week",
            Timeframe::Monthly => "month",
        }
    }
}

/// What a consistency goal accumulates per period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Measurement {
    Minutes,
    Workouts,
    Reps,
}

/// Discriminant of a target goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetType {
    Strength,
    Pace,
}

/// "Do X amount of Y per period"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsistencyGoal {
    pub id: Uuid,
    pub name: String,
    pub timeframe: Timeframe,
    pub measurement: Measurement,
    pub target: f64,
    /// Optional template scope; weak reference by id only
    pub exercise_id: Option<Uuid>,
    pub start_date: DateTime<Utc>,
    pub is_completed: bool,
}

/// Per-kind target values of a target goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TargetSpec {
    /// Lift `weight` for at least `min_reps` (floored) in one set
    Strength { weight: f64, min_reps: f64 },
    /// Cover `distance` within `minutes`
    Pace { distance: f64, minutes: f64 },
}

impl TargetSpec {
    /// Build from the generic primary/secondary pair
    pub fn from_values(target_type: TargetType, primary: f64, secondary: f64) -> Self {
        match target_type {
            TargetType::Strength => TargetSpec::Strength {
                weight: primary,
                min_reps: secondary,
            },
            TargetType::Pace => TargetSpec::Pace {
                distance: primary,
                minutes: secondary,
            },
        }
    }

    pub fn target_type(&self) -> TargetType {
        match self {
            TargetSpec::Strength { .. } => TargetType::Strength,
            TargetSpec::Pace { .. } => TargetType::Pace,
        }
    }

    /// Weight for strength, distance for pace
    pub fn primary(&self) -> f64 {
        match *self {
            TargetSpec::Strength { weight, .. } => weight,
            TargetSpec::Pace { distance, .. } => distance,
        }
    }

    /// Minimum reps for strength, time budget in minutes for pace
    pub fn secondary(&self) -> f64 {
        match *self {
            TargetSpec::Strength { min_reps, .. } => min_reps,
            TargetSpec::Pace { minutes, .. } => minutes,
        }
    }

    /// Both progress formulas divide by these values
    pub fn validate(&self) -> Result<(), GoalError> {
        validate_positive("target primary value", self.primary())?;
        validate_positive("target secondary value", self.secondary())
    }
}

/// Best single performance against a fixed target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetGoal {
    pub id: Uuid,
    pub name: String,
    /// Template the goal tracks; weak reference by id only
    pub exercise_id: Uuid,
    pub spec: TargetSpec,
    pub start_date: DateTime<Utc>,
}

impl TargetGoal {
    pub fn target_type(&self) -> TargetType {
        self.spec.target_type()
    }
}

/// Either goal kind, for listing and deletion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Goal {
    Consistency(ConsistencyGoal),
    Target(TargetGoal),
}

impl Goal {
    pub fn id(&self) -> Uuid {
        match self {
            Goal::Consistency(goal) => goal.id,
            Goal::Target(goal) => goal.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Goal::Consistency(goal) => &goal.name,
            Goal::Target(goal) => &goal.name,
        }
    }

    pub fn start_date(&self) -> DateTime<Utc> {
        match self {
            Goal::Consistency(goal) => goal.start_date,
            Goal::Target(goal) => goal.start_date,
        }
    }

    /// Template the goal is scoped to, if any
    pub fn exercise_id(&self) -> Option<Uuid> {
        match self {
            Goal::Consistency(goal) => goal.exercise_id,
            Goal::Target(goal) => Some(goal.exercise_id),
        }
    }

    pub fn kind_label(&self) -> String {
        match self {
            Goal::Consistency(goal) => format!("{} {}", goal.timeframe, goal.measurement),
            Goal::Target(goal) => goal.target_type().to_string(),
        }
    }
}

/// Fields for a new consistency goal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewConsistencyGoal {
    pub name: String,
    pub timeframe: Timeframe,
    pub measurement: Measurement,
    pub target: f64,
    pub exercise_id: Option<Uuid>,
    pub start_date: Option<DateTime<Utc>>,
}

impl NewConsistencyGoal {
    pub fn validate(&self) -> Result<(), GoalError> {
        validate_name(&self.name)?;
        validate_positive("target", self.target)
    }
}

/// Fields for a new target goal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTargetGoal {
    pub name: String,
    pub exercise_id: Uuid,
    pub target_type: TargetType,
    pub target_primary_value: f64,
    pub target_secondary_value: f64,
    pub start_date: Option<DateTime<Utc>>,
}

impl NewTargetGoal {
    pub fn spec(&self) -> TargetSpec {
        TargetSpec::from_values(
            self.target_type,
            self.target_primary_value,
            self.target_secondary_value,
        )
    }

    pub fn validate(&self) -> Result<(), GoalError> {
        validate_name(&self.name)?;
        self.spec().validate()
    }
}

/// Partial update of a consistency goal; `None` leaves a field untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsistencyGoalUpdate {
    pub name: Option<String>,
    pub timeframe: Option<Timeframe>,
    pub measurement: Option<Measurement>,
    pub target: Option<f64>,
    pub exercise_id: Option<Uuid>,
    pub start_date: Option<DateTime<Utc>>,
    pub is_completed: Option<bool>,
}

impl ConsistencyGoalUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.timeframe.is_none()
            && self.measurement.is_none()
            && self.target.is_none()
            && self.exercise_id.is_none()
            && self.start_date.is_none()
            && self.is_completed.is_none()
    }
}

/// Partial update of a target goal; `None` leaves a field untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetGoalUpdate {
    pub name: Option<String>,
    pub exercise_id: Option<Uuid>,
    pub target_primary_value: Option<f64>,
    pub target_secondary_value: Option<f64>,
    pub start_date: Option<DateTime<Utc>>,
}

impl TargetGoalUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.exercise_id.is_none()
            && self.target_primary_value.is_none()
            && self.target_secondary_value.is_none()
            && self.start_date.is_none()
    }
}

impl ConsistencyGoal {
    pub fn new(request: NewConsistencyGoal) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: request.name,
            timeframe: request.timeframe,
            measurement: request.measurement,
            target: request.target,
            exercise_id: request.exercise_id,
            start_date: request.start_date.unwrap_or_else(Utc::now),
            is_completed: false,
        }
    }

    /// Return a copy with the update applied and validated
    pub fn updated(&self, update: ConsistencyGoalUpdate) -> Result<Self, GoalError> {
        let mut goal = self.clone();
        if let Some(name) = update.name {
            validate_name(&name)?;
            goal.name = name;
        }
        if let Some(timeframe) = update.timeframe {
            goal.timeframe = timeframe;
        }
        if let Some(measurement) = update.measurement {
            goal.measurement = measurement;
        }
        if let Some(target) = update.target {
            validate_positive("target", target)?;
            goal.target = target;
        }
        if let Some(exercise_id) = update.exercise_id {
            goal.exercise_id = Some(exercise_id);
        }
        if let Some(start_date) = update.start_date {
            goal.start_date = start_date;
        }
        if let Some(is_completed) = update.is_completed {
            goal.is_completed = is_completed;
        }
        Ok(goal)
    }
}

impl TargetGoal {
    pub fn new(request: NewTargetGoal) -> Self {
        let spec = request.spec();
        Self {
            id: Uuid::new_v4(),
            name: request.name,
            exercise_id: request.exercise_id,
            spec,
            start_date: request.start_date.unwrap_or_else(Utc::now),
        }
    }

    /// Return a copy with the update applied and validated
    pub fn updated(&self, update: TargetGoalUpdate) -> Result<Self, GoalError> {
        let mut goal = self.clone();
        if let Some(name) = update.name {
            validate_name(&name)?;
            goal.name = name;
        }
        if let Some(exercise_id) = update.exercise_id {
            goal.exercise_id = exercise_id;
        }
        if update.target_primary_value.is_some() || update.target_secondary_value.is_some() {
            let spec = TargetSpec::from_values(
                goal.target_type(),
                update
                    .target_primary_value
                    .unwrap_or_else(|| goal.spec.primary()),
                update
                    .target_secondary_value
                    .unwrap_or_else(|| goal.spec.secondary()),
            );
            spec.validate()?;
            goal.spec = spec;
        }
        if let Some(start_date) = update.start_date {
            goal.start_date = start_date;
        }
        Ok(goal)
    }
}

fn validate_positive(field: &str, value: f64) -> Result<(), GoalError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(GoalError::invalid(format!(
            "{} must be a positive number, got {}",
            field, value
        )));
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<(), GoalError> {
    if name.trim().is_empty() {
        return Err(GoalError::invalid("name must not be empty"));
    }
    Ok(())
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            Timeframe::Daily => "daily",
            Timeframe::Weekly => "weekly",
            Timeframe::Monthly => "monthly",
        })
    }
}

impl std::str::FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" | "day" => Ok(Timeframe::Daily),
            "weekly" | "week" => Ok(Timeframe::Weekly),
            "monthly" | "month" => Ok(Timeframe::Monthly),
            _ => Err(format!("Invalid timeframe: {}", s)),
        }
    }
}

impl std::fmt::Display for Measurement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            Measurement::Minutes => "minutes",
            Measurement::Workouts => "workouts",
            Measurement::Reps => "reps",
        })
    }
}

impl std::str::FromStr for Measurement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "minutes" | "min" => Ok(Measurement::Minutes),
            "workouts" | "sessions" => Ok(Measurement::Workouts),
            "reps" => Ok(Measurement::Reps),
            _ => Err(format!("Invalid measurement: {}", s)),
        }
    }
}

impl std::fmt::Display for TargetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            TargetType::Strength => "strength",
            TargetType::Pace => "pace",
        })
    }
}

impl std::str::FromStr for TargetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strength" => Ok(TargetType::Strength),
            "pace" => Ok(TargetType::Pace),
            _ => Err(format!("Invalid target type: {}", s)),
        }
    }
}
