use std::collections::HashMap;

use super::{sort_recent_first, Entity, EntityRef, PendingChange, WorkoutStore};
use crate::errors::StorageError;
use crate::models::{
    Category, ConsistencyGoal, ExerciseTemplate, Routine, TargetGoal, Workout, WorkoutFilter,
};

/// In-process store backed by a map of committed records
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: HashMap<EntityRef, Entity>,
    pending: Vec<PendingChange>,
    fail_next_save: Option<StorageError>,
    save_count: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `save` fail with `error` without applying anything
    pub fn fail_next_save(&mut self, error: StorageError) {
        self.fail_next_save = Some(error);
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Number of successful saves
    pub fn save_count(&self) -> usize {
        self.save_count
    }

    fn collect<T: Clone>(&self, pick: impl Fn(&Entity) -> Option<&T>) -> Vec<T> {
        self.records.values().filter_map(pick).cloned().collect()
    }
}

impl WorkoutStore for MemoryStore {
    fn fetch_workouts(&self, filter: &WorkoutFilter) -> Result<Vec<Workout>, StorageError> {
        let mut workouts: Vec<Workout> = self
            .collect(|e| match e {
                Entity::Workout(w) => Some(w),
                _ => None,
            })
            .into_iter()
            .filter(|w| filter.matches(w))
            .collect();
        sort_recent_first(&mut workouts);
        Ok(workouts)
    }

    fn fetch_consistency_goals(&self) -> Result<Vec<ConsistencyGoal>, StorageError> {
        Ok(self.collect(|e| match e {
            Entity::ConsistencyGoal(g) => Some(g),
            _ => None,
        }))
    }

    fn fetch_target_goals(&self) -> Result<Vec<TargetGoal>, StorageError> {
        Ok(self.collect(|e| match e {
            Entity::TargetGoal(g) => Some(g),
            _ => None,
        }))
    }

    fn fetch_templates(&self) -> Result<Vec<ExerciseTemplate>, StorageError> {
        Ok(self.collect(|e| match e {
            Entity::Template(t) => Some(t),
            _ => None,
        }))
    }

    fn fetch_categories(&self) -> Result<Vec<Category>, StorageError> {
        Ok(self.collect(|e| match e {
            Entity::Category(c) => Some(c),
            _ => None,
        }))
    }

    fn fetch_routines(&self) -> Result<Vec<Routine>, StorageError> {
        Ok(self.collect(|e| match e {
            Entity::Routine(r) => Some(r),
            _ => None,
        }))
    }

    fn insert(&mut self, entity: Entity) {
        self.pending.push(PendingChange::Upsert(entity));
    }

    fn delete(&mut self, entity: EntityRef) {
        self.pending.push(PendingChange::Remove(entity));
    }

    fn save(&mut self) -> Result<(), StorageError> {
        if let Some(error) = self.fail_next_save.take() {
            return Err(error);
        }

        for change in self.pending.drain(..) {
            match change {
                PendingChange::Upsert(entity) => {
                    self.records.insert(entity.key(), entity);
                }
                PendingChange::Remove(key) => {
                    self.records.remove(&key);
                }
            }
        }
        self.save_count += 1;
        Ok(())
    }

    fn discard_pending(&mut self) {
        self.pending.clear();
    }
}
