use chrono::{DateTime, Utc};
use tracing::{debug, error, info};
use uuid::Uuid;

use super::goal_calendar::GoalCalendar;
use super::progress_engine::{self, GoalProgress, SetIndex};
use crate::errors::{GoalError, StorageError};
use crate::models::{
    ConsistencyGoal, ConsistencyGoalUpdate, ExerciseTemplate, Goal, NewConsistencyGoal,
    NewTargetGoal, TargetGoal, TargetGoalUpdate, Workout,
};
use crate::storage::{Entity, EntityRef, WorkoutStore};

/// Creates, updates and deletes goals against a storage collaborator
pub struct GoalService<S: WorkoutStore> {
    store: S,
}

impl<S: WorkoutStore> GoalService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    // Goal CRUD operations

    pub fn add_consistency_goal(
        &mut self,
        request: NewConsistencyGoal,
    ) -> Result<ConsistencyGoal, GoalError> {
        request.validate()?;

        let goal = ConsistencyGoal::new(request);
        self.store.insert(Entity::ConsistencyGoal(goal.clone()));
        self.save()?;

        info!("Created consistency goal {} ({})", goal.id, goal.name);
        Ok(goal)
    }

    pub fn add_target_goal(&mut self, request: NewTargetGoal) -> Result<TargetGoal, GoalError> {
        request.validate()?;

        let goal = TargetGoal::new(request);
        self.store.insert(Entity::TargetGoal(goal.clone()));
        self.save()?;

        info!("Created {} goal {} ({})", goal.target_type(), goal.id, goal.name);
        Ok(goal)
    }

    /// Apply the supplied fields. `goal` is only modified once the change
    /// has been persisted.
    pub fn update_consistency_goal(
        &mut self,
        goal: &mut ConsistencyGoal,
        update: ConsistencyGoalUpdate,
    ) -> Result<(), GoalError> {
        let updated = goal.updated(update)?;
        if !self.store.fetch_consistency_goals()?.iter().any(|g| g.id == goal.id) {
            return Err(not_found(goal.id));
        }
        self.store.insert(Entity::ConsistencyGoal(updated.clone()));
        self.save()?;

        debug!("Updated consistency goal {}", updated.id);
        *goal = updated;
        Ok(())
    }

    /// Apply the supplied fields. `goal` is only modified once the change
    /// has been persisted.
    pub fn update_target_goal(
        &mut self,
        goal: &mut TargetGoal,
        update: TargetGoalUpdate,
    ) -> Result<(), GoalError> {
        let updated = goal.updated(update)?;
        if !self.store.fetch_target_goals()?.iter().any(|g| g.id == goal.id) {
            return Err(not_found(goal.id));
        }
        self.store.insert(Entity::TargetGoal(updated.clone()));
        self.save()?;

        debug!("Updated target goal {}", updated.id);
        *goal = updated;
        Ok(())
    }

    pub fn set_completed(
        &mut self,
        goal: &mut ConsistencyGoal,
        completed: bool,
    ) -> Result<(), GoalError> {
        self.update_consistency_goal(
            goal,
            ConsistencyGoalUpdate {
                is_completed: Some(completed),
                ..ConsistencyGoalUpdate::default()
            },
        )
    }

    /// Remove a stored goal; an id that is no longer stored is `NotFound`
    pub fn delete_goal(&mut self, goal: &Goal) -> Result<(), GoalError> {
        if self.find_goal(goal.id())?.is_none() {
            return Err(not_found(goal.id()));
        }

        let key = match goal {
            Goal::Consistency(g) => EntityRef::ConsistencyGoal(g.id),
            Goal::Target(g) => EntityRef::TargetGoal(g.id),
        };
        self.store.delete(key);
        self.save()?;

        info!("Deleted goal {}", goal.id());
        Ok(())
    }

    pub fn list_goals(&self) -> Result<Vec<Goal>, GoalError> {
        let mut goals: Vec<Goal> = self
            .store
            .fetch_consistency_goals()?
            .into_iter()
            .map(Goal::Consistency)
            .chain(self.store.fetch_target_goals()?.into_iter().map(Goal::Target))
            .collect();

        goals.sort_by(|a, b| a.start_date().cmp(&b.start_date()));
        Ok(goals)
    }

    pub fn find_goal(&self, id: Uuid) -> Result<Option<Goal>, GoalError> {
        Ok(self.list_goals()?.into_iter().find(|g| g.id() == id))
    }

    pub fn require_goal(&self, id: Uuid) -> Result<Goal, GoalError> {
        self.find_goal(id)?.ok_or_else(|| not_found(id))
    }

    /// Look up the template a goal points at; `None` once it has been deleted
    pub fn resolve_template(&self, id: Uuid) -> Result<Option<ExerciseTemplate>, GoalError> {
        Ok(self.store.fetch_template(id)?)
    }

    // Goal progress

    pub fn evaluate(
        &self,
        goal: &Goal,
        now: DateTime<Utc>,
        calendar: &GoalCalendar,
    ) -> Result<GoalProgress, GoalError> {
        let workouts = self.store.fetch_all_workouts()?;
        Ok(progress_engine::goal_progress(goal, &workouts, now, calendar))
    }

    /// Evaluate every stored goal against one snapshot of the history
    pub fn evaluate_all(
        &self,
        now: DateTime<Utc>,
        calendar: &GoalCalendar,
    ) -> Result<Vec<(Goal, GoalProgress)>, GoalError> {
        let goals = self.list_goals()?;
        let workouts = self.store.fetch_all_workouts()?;
        Ok(evaluate_goals(goals, &workouts, now, calendar))
    }

    /// Single funnel for persisting staged changes
    fn save(&mut self) -> Result<(), StorageError> {
        if let Err(e) = self.store.save() {
            error!("Failed to save goal changes: {}", e);
            self.store.discard_pending();
            return Err(e);
        }
        Ok(())
    }
}

fn not_found(id: Uuid) -> GoalError {
    StorageError::NotFound(format!("goal {}", id)).into()
}

/// Evaluate goals over an already-loaded history, indexing sets once
pub fn evaluate_goals(
    goals: Vec<Goal>,
    workouts: &[Workout],
    now: DateTime<Utc>,
    calendar: &GoalCalendar,
) -> Vec<(Goal, GoalProgress)> {
    let index = SetIndex::build(workouts);

    goals
        .into_iter()
        .map(|goal| {
            let progress = match &goal {
                Goal::Target(target) => index.progress(target),
                Goal::Consistency(consistency) => {
                    progress_engine::consistency_progress(consistency, workouts, now, calendar)
                }
            };
            (goal, progress)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Measurement, TargetType, Timeframe};
    use crate::storage::MemoryStore;
    use assert_matches::assert_matches;

    fn strength_request(primary: f64, secondary: f64) -> NewTargetGoal {
        NewTargetGoal {
            name: "Bench 225".to_string(),
            exercise_id: Uuid::new_v4(),
            target_type: TargetType::Strength,
            target_primary_value: primary,
            target_secondary_value: secondary,
            start_date: None,
        }
    }

    #[test]
    fn test_invalid_target_never_reaches_storage() {
        let mut service = GoalService::new(MemoryStore::new());

        let result = service.add_target_goal(strength_request(0.0, 5.0));
        assert_matches!(result, Err(GoalError::InvalidGoal(_)));
        assert_eq!(service.store().pending_len(), 0);
        assert_eq!(service.store().save_count(), 0);
    }

    #[test]
    fn test_failed_update_leaves_goal_untouched() {
        let mut service = GoalService::new(MemoryStore::new());
        let mut goal = service.add_target_goal(strength_request(225.0, 5.0)).unwrap();
        let before = goal.clone();

        service
            .store_mut()
            .fail_next_save(StorageError::Backend("locked".to_string()));
        let result = service.update_target_goal(
            &mut goal,
            TargetGoalUpdate {
                name: Some("Bench 245".to_string()),
                ..TargetGoalUpdate::default()
            },
        );

        assert_matches!(result, Err(GoalError::Storage(StorageError::Backend(_))));
        assert_eq!(goal, before);
        assert_eq!(service.store().pending_len(), 0);
        assert_eq!(service.store().fetch_target_goals().unwrap(), vec![before]);
    }

    #[test]
    fn test_set_completed() {
        let mut service = GoalService::new(MemoryStore::new());
        let mut goal = service
            .add_consistency_goal(NewConsistencyGoal {
                name: "Daily walk".to_string(),
                timeframe: Timeframe::Daily,
                measurement: Measurement::Minutes,
                target: 30.0,
                exercise_id: None,
                start_date: None,
            })
            .unwrap();

        service.set_completed(&mut goal, true).unwrap();
        assert!(goal.is_completed);
        assert!(service.store().fetch_consistency_goals().unwrap()[0].is_completed);
    }

    #[test]
    fn test_require_goal_not_found() {
        let service = GoalService::new(MemoryStore::new());
        assert_matches!(
            service.require_goal(Uuid::new_v4()),
            Err(GoalError::Storage(StorageError::NotFound(_)))
        );
    }
}
