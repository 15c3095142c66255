// Local storage using the sled embedded database
//
// Every record lives in one tree under a kind-prefixed key
// (`workout/<uuid>`, `goal/target/<uuid>`, ...). Staged changes are
// applied with a single batch so a save is all-or-nothing.

use anyhow::{Context, Result};
use gymlog::models::{
    Category, ConsistencyGoal, ExerciseTemplate, Routine, TargetGoal, Workout, WorkoutFilter,
};
use gymlog::storage::{
    sort_recent_first, Entity, EntityRef, PendingChange, WorkoutStore, CATEGORY_PREFIX,
    CONSISTENCY_GOAL_PREFIX, ROUTINE_PREFIX, TARGET_GOAL_PREFIX, TEMPLATE_PREFIX, WORKOUT_PREFIX,
};
use gymlog::StorageError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::Db;
use std::path::{Path, PathBuf};

use crate::config::Config;

/// Environment variable overriding the database location
pub const DB_PATH_ENV: &str = "GYMLOG_DB_PATH";

const RECORDS_TREE: &str = "records";

/// Workout store persisted in a sled database
pub struct SledStore {
    db: Db,
    pending: Vec<PendingChange>,
}

impl SledStore {
    /// Resolve the database directory: env override, then config, then `~/.gymlog/db`
    pub fn db_path(config: &Config) -> Result<PathBuf> {
        if let Ok(path) = std::env::var(DB_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        if let Some(path) = &config.storage.db_path {
            return Ok(path.clone());
        }

        Ok(Config::config_dir()?.join("db"))
    }

    /// Open the database configured for this user
    pub fn init(config: &Config) -> Result<Self> {
        let path = Self::db_path(config)?;
        Self::open(&path)
    }

    /// Open (or create) a database at `path`
    pub fn open(path: &Path) -> Result<Self> {
        tracing::info!("Initializing sled database at {:?}", path);

        let db = sled::open(path).context("Failed to open sled database")?;

        Ok(Self {
            db,
            pending: Vec::new(),
        })
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    fn tree(&self) -> Result<sled::Tree, StorageError> {
        self.db.open_tree(RECORDS_TREE).map_err(backend)
    }

    fn scan<T: DeserializeOwned>(&self, prefix: &str) -> Result<Vec<T>, StorageError> {
        let tree = self.tree()?;
        let mut records = Vec::new();

        for item in tree.scan_prefix(prefix.as_bytes()) {
            let (_key, value) = item.map_err(backend)?;
            records.push(decode(&value)?);
        }

        Ok(records)
    }
}

fn backend(e: sled::Error) -> StorageError {
    StorageError::Backend(e.to_string())
}

fn log_flush_result(result: sled::Result<usize>) {
    match result {
        Ok(bytes) => tracing::trace!("Flushed {} byte(s)", bytes),
        Err(e) => tracing::warn!("Saved changes are not yet flushed to disk: {}", e),
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, StorageError> {
    bincode::serialize(value).map_err(|e| StorageError::Serialization(e.to_string()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StorageError> {
    bincode::deserialize(bytes).map_err(|e| StorageError::Serialization(e.to_string()))
}

fn encode_entity(entity: &Entity) -> Result<Vec<u8>, StorageError> {
    match entity {
        Entity::Workout(w) => encode(w),
        Entity::Category(c) => encode(c),
        Entity::Template(t) => encode(t),
        Entity::Routine(r) => encode(r),
        Entity::ConsistencyGoal(g) => encode(g),
        Entity::TargetGoal(g) => encode(g),
    }
}

impl WorkoutStore for SledStore {
    fn fetch_workouts(&self, filter: &WorkoutFilter) -> Result<Vec<Workout>, StorageError> {
        let mut workouts: Vec<Workout> = self
            .scan::<Workout>(WORKOUT_PREFIX)?
            .into_iter()
            .filter(|w| filter.matches(w))
            .collect();

        // Sort by date descending (most recent first)
        sort_recent_first(&mut workouts);

        Ok(workouts)
    }

    fn fetch_consistency_goals(&self) -> Result<Vec<ConsistencyGoal>, StorageError> {
        self.scan(CONSISTENCY_GOAL_PREFIX)
    }

    fn fetch_target_goals(&self) -> Result<Vec<TargetGoal>, StorageError> {
        self.scan(TARGET_GOAL_PREFIX)
    }

    fn fetch_templates(&self) -> Result<Vec<ExerciseTemplate>, StorageError> {
        self.scan(TEMPLATE_PREFIX)
    }

    fn fetch_categories(&self) -> Result<Vec<Category>, StorageError> {
        self.scan(CATEGORY_PREFIX)
    }

    fn fetch_routines(&self) -> Result<Vec<Routine>, StorageError> {
        self.scan(ROUTINE_PREFIX)
    }

    fn fetch_workout(&self, id: uuid::Uuid) -> Result<Option<Workout>, StorageError> {
        let key = EntityRef::Workout(id).storage_key();
        match self.tree()?.get(key.as_bytes()).map_err(backend)? {
            Some(value) => Ok(Some(decode(&value)?)),
            None => Ok(None),
        }
    }

    fn insert(&mut self, entity: Entity) {
        self.pending.push(PendingChange::Upsert(entity));
    }

    fn delete(&mut self, entity: EntityRef) {
        self.pending.push(PendingChange::Remove(entity));
    }

    fn save(&mut self) -> Result<(), StorageError> {
        if self.pending.is_empty() {
            return Ok(());
        }

        // Encode everything up front so a bad record leaves the database untouched
        let mut batch = sled::Batch::default();
        for change in &self.pending {
            match change {
                PendingChange::Upsert(entity) => {
                    let key = entity.key().storage_key();
                    batch.insert(key.as_bytes(), encode_entity(entity)?);
                }
                PendingChange::Remove(entity) => {
                    batch.remove(entity.storage_key().as_bytes());
                }
            }
        }

        self.tree()?.apply_batch(batch).map_err(backend)?;
        // The batch is already visible; a failed flush only delays durability
        log_flush_result(self.db.flush());

        tracing::debug!("Saved {} staged change(s)", self.pending.len());
        self.pending.clear();
        Ok(())
    }

    fn discard_pending(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use gymlog::models::{Exercise, Modality, Set};
    use tempfile::tempdir;

    fn sample_workout(day: u32) -> Workout {
        let start = Utc.with_ymd_and_hms(2024, 1, day, 18, 0, 0).unwrap();
        let mut workout = Workout::new("Push day".to_string(), start);
        let exercise = workout.add_exercise(Exercise::new(
            uuid::Uuid::new_v4(),
            "Bench Press".to_string(),
            Modality::Repetition,
        ));
        exercise.add_set(Set::repetition(5, Some(185.0)));
        exercise.add_set(Set::repetition(5, None));
        workout
    }

    #[test]
    fn test_staged_changes_invisible_until_save() {
        let dir = tempdir().unwrap();
        let mut store = SledStore::open(dir.path()).unwrap();

        store.insert(Entity::Workout(sample_workout(10)));
        assert!(store.fetch_all_workouts().unwrap().is_empty());
        assert_eq!(store.pending_len(), 1);

        store.save().unwrap();
        assert_eq!(store.fetch_all_workouts().unwrap().len(), 1);
        assert_eq!(store.pending_len(), 0);
    }

    #[test]
    fn test_workouts_round_trip_most_recent_first() {
        let dir = tempdir().unwrap();
        let mut store = SledStore::open(dir.path()).unwrap();

        let older = sample_workout(3);
        let newer = sample_workout(9);
        store.insert(Entity::Workout(older.clone()));
        store.insert(Entity::Workout(newer.clone()));
        store.save().unwrap();

        let workouts = store.fetch_all_workouts().unwrap();
        assert_eq!(workouts, vec![newer.clone(), older]);
        assert_eq!(store.fetch_workout(newer.id).unwrap(), Some(newer));
    }

    #[test]
    fn test_prefixes_keep_kinds_apart() {
        let dir = tempdir().unwrap();
        let mut store = SledStore::open(dir.path()).unwrap();

        store.insert(Entity::Category(Category::new("Chest".to_string())));
        store.insert(Entity::Workout(sample_workout(5)));
        store.save().unwrap();

        assert_eq!(store.fetch_categories().unwrap().len(), 1);
        assert_eq!(store.fetch_all_workouts().unwrap().len(), 1);
        assert!(store.fetch_templates().unwrap().is_empty());
        assert!(store.fetch_target_goals().unwrap().is_empty());
    }

    #[test]
    fn test_delete_and_discard() {
        let dir = tempdir().unwrap();
        let mut store = SledStore::open(dir.path()).unwrap();
        let workout = sample_workout(7);

        store.insert(Entity::Workout(workout.clone()));
        store.save().unwrap();

        store.delete(EntityRef::Workout(workout.id));
        store.discard_pending();
        store.save().unwrap();
        assert_eq!(store.fetch_all_workouts().unwrap().len(), 1);

        store.delete(EntityRef::Workout(workout.id));
        store.save().unwrap();
        assert!(store.fetch_all_workouts().unwrap().is_empty());

        // Removing an absent record is fine
        store.delete(EntityRef::Workout(workout.id));
        assert!(store.save().is_ok());
    }

    #[test]
    fn test_flush_failure_after_apply_is_not_an_error() {
        let dir = tempdir().unwrap();
        let mut store = SledStore::open(dir.path()).unwrap();
        let workout = sample_workout(14);
        store.insert(Entity::Workout(workout.clone()));
        store.save().unwrap();

        log_flush_result(Err(sled::Error::Unsupported("flush".to_string())));
        log_flush_result(Ok(0));

        assert_eq!(store.fetch_all_workouts().unwrap(), vec![workout]);
        assert_eq!(store.pending_len(), 0);
    }

    #[test]
    fn test_data_survives_reopen() {
        let dir = tempdir().unwrap();
        let workout = sample_workout(12);

        {
            let mut store = SledStore::open(dir.path()).unwrap();
            store.insert(Entity::Workout(workout.clone()));
            store.save().unwrap();
        }

        let store = SledStore::open(dir.path()).unwrap();
        assert_eq!(store.fetch_all_workouts().unwrap(), vec![workout]);
    }
}
