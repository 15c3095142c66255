// Storage collaborator contract
//
// Mutations are staged with `insert`/`delete` and become visible only when
// `save` applies them as one unit.

mod memory;

pub use memory::MemoryStore;

use uuid::Uuid;

use crate::errors::StorageError;
use crate::models::{
    Category, ConsistencyGoal, ExerciseTemplate, Routine, TargetGoal, Workout, WorkoutFilter,
};

/// Any record the store persists
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Workout(Workout),
    Category(Category),
    Template(ExerciseTemplate),
    Routine(Routine),
    ConsistencyGoal(ConsistencyGoal),
    TargetGoal(TargetGoal),
}

impl Entity {
    pub fn key(&self) -> EntityRef {
        match self {
            Entity::Workout(w) => EntityRef::Workout(w.id),
            Entity::Category(c) => EntityRef::Category(c.id),
            Entity::Template(t) => EntityRef::Template(t.id),
            Entity::Routine(r) => EntityRef::Routine(r.id),
            Entity::ConsistencyGoal(g) => EntityRef::ConsistencyGoal(g.id),
            Entity::TargetGoal(g) => EntityRef::TargetGoal(g.id),
        }
    }
}

/// Identity of a stored record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityRef {
    Workout(Uuid),
    Category(Uuid),
    Template(Uuid),
    Routine(Uuid),
    ConsistencyGoal(Uuid),
    TargetGoal(Uuid),
}

impl EntityRef {
    pub fn id(&self) -> Uuid {
        match *self {
            EntityRef::Workout(id)
            | EntityRef::Category(id)
            | EntityRef::Template(id)
            | EntityRef::Routine(id)
            | EntityRef::ConsistencyGoal(id)
            | EntityRef::TargetGoal(id) => id,
        }
    }

    /// Key prefix shared by every record of this kind
    pub fn prefix(&self) -> &'static str {
        match self {
            EntityRef::Workout(_) => WORKOUT_PREFIX,
            EntityRef::Category(_) => CATEGORY_PREFIX,
            EntityRef::Template(_) => TEMPLATE_PREFIX,
            EntityRef::Routine(_) => ROUTINE_PREFIX,
            EntityRef::ConsistencyGoal(_) => CONSISTENCY_GOAL_PREFIX,
            EntityRef::TargetGoal(_) => TARGET_GOAL_PREFIX,
        }
    }

    /// Flat key such as `workout/<uuid>`
    pub fn storage_key(&self) -> String {
        format!("{}{}", self.prefix(), self.id())
    }
}

pub const WORKOUT_PREFIX: &str = "workout/";
pub const CATEGORY_PREFIX: &str = "category/";
pub const TEMPLATE_PREFIX: &str = "template/";
pub const ROUTINE_PREFIX: &str = "routine/";
pub const CONSISTENCY_GOAL_PREFIX: &str = "goal/consistency/";
pub const TARGET_GOAL_PREFIX: &str = "goal/target/";

/// A staged mutation awaiting `save`
#[derive(Debug, Clone, PartialEq)]
pub enum PendingChange {
    Upsert(Entity),
    Remove(EntityRef),
}

pub trait WorkoutStore {
    /// Workouts matching `filter`, most recent first
    fn fetch_workouts(&self, filter: &WorkoutFilter) -> Result<Vec<Workout>, StorageError>;

    fn fetch_consistency_goals(&self) -> Result<Vec<ConsistencyGoal>, StorageError>;

    fn fetch_target_goals(&self) -> Result<Vec<TargetGoal>, StorageError>;

    fn fetch_templates(&self) -> Result<Vec<ExerciseTemplate>, StorageError>;

    fn fetch_categories(&self) -> Result<Vec<Category>, StorageError>;

    fn fetch_routines(&self) -> Result<Vec<Routine>, StorageError>;

    /// Stage an insert or replacement
    fn insert(&mut self, entity: Entity);

    /// Stage a removal; removing an absent record is not an error
    fn delete(&mut self, entity: EntityRef);

    /// Apply every staged change atomically
    fn save(&mut self) -> Result<(), StorageError>;

    /// Drop staged changes without applying them
    fn discard_pending(&mut self);

    fn fetch_all_workouts(&self) -> Result<Vec<Workout>, StorageError> {
        self.fetch_workouts(&WorkoutFilter::default())
    }

    fn fetch_workout(&self, id: Uuid) -> Result<Option<Workout>, StorageError> {
        Ok(self
            .fetch_all_workouts()?
            .into_iter()
            .find(|w| w.id == id))
    }

    fn fetch_template(&self, id: Uuid) -> Result<Option<ExerciseTemplate>, StorageError> {
        Ok(self.fetch_templates()?.into_iter().find(|t| t.id == id))
    }
}

/// Sort workouts most recent first
pub fn sort_recent_first(workouts: &mut [Workout]) {
    workouts.sort_by(|a, b| b.start_time.cmp(&a.start_time));
}
