use anyhow::{Context, Result};
use chrono::Utc;
use colored::Colorize;
use gymlog::models::Routine;
use gymlog::storage::{Entity, WorkoutStore};

use super::{lookup_template, AppContext};

const DEFAULT_PLANNED_SETS: u32 = 3;

/// Split `Squat=5` into the exercise and its planned set count
pub fn parse_routine_entry(entry: &str) -> Result<(&str, u32)> {
    match entry.split_once('=') {
        Some((name, sets)) => {
            let sets = sets
                .trim()
                .parse::<u32>()
                .with_context(|| format!("Invalid planned set count in '{}'", entry))?;
            Ok((name.trim(), sets))
        }
        None => Ok((entry.trim(), DEFAULT_PLANNED_SETS)),
    }
}

/// Find a routine by id or case-insensitive name
pub fn find_routine<'a>(routines: &'a [Routine], key: &str) -> Option<&'a Routine> {
    let key = key.trim();
    routines
        .iter()
        .find(|r| r.id.to_string() == key)
        .or_else(|| routines.iter().find(|r| r.name.eq_ignore_ascii_case(key)))
}

pub async fn list_routines(ctx: &AppContext) -> Result<()> {
    let store = ctx.open_store()?;
    let mut routines = store.fetch_routines()?;
    routines.sort_by(|a, b| a.name.cmp(&b.name));

    if routines.is_empty() {
        println!("No routines yet. Create one with `gymlog routine create`.");
        return Ok(());
    }

    println!("{}", "Routines".bold());
    println!();
    for routine in &routines {
        println!("{}  {}", routine.name.bold(), routine.id.to_string().dimmed());
        for entry in &routine.exercises {
            println!("   {} x {} sets", entry.exercise_name, entry.planned_sets);
        }
    }

    Ok(())
}

pub async fn create_routine(ctx: &AppContext, name: String, entries: Vec<String>) -> Result<()> {
    let mut store = ctx.open_store()?;
    let categories = store.fetch_categories()?;

    let mut routine = Routine::new(name);
    for entry in &entries {
        let (exercise, planned_sets) = parse_routine_entry(entry)?;
        let template = lookup_template(&store, exercise)?;
        let category = template
            .category_id
            .and_then(|id| categories.iter().find(|c| c.id == id));
        routine.add_template(&template, category, planned_sets);
    }

    store.insert(Entity::Routine(routine.clone()));
    store.save().context("Failed to save routine")?;

    println!(
        "{} Created routine {} with {} exercise(s)",
        "✓".green(),
        routine.name.bold(),
        routine.exercises.len()
    );
    println!("  ID: {}", routine.id);
    Ok(())
}

pub async fn start_routine(ctx: &AppContext, key: &str) -> Result<()> {
    let mut store = ctx.open_store()?;
    let routines = store.fetch_routines()?;
    let routine = find_routine(&routines, key)
        .with_context(|| format!("Routine '{}' not found", key))?;

    let workout = routine.start_workout(Utc::now());
    store.insert(Entity::Workout(workout.clone()));
    store.save().context("Failed to save workout")?;

    tracing::debug!("Started workout {} from routine {}", workout.id, routine.id);
    println!(
        "{} Started {} at {}",
        "✓".green(),
        workout.name.bold(),
        ctx.format_time(workout.start_time)
    );
    for exercise in &workout.exercises {
        println!("   {}. {}", exercise.order + 1, exercise.name);
    }
    println!("  ID: {}", workout.id);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_routine_entry() {
        assert_eq!(parse_routine_entry("Back Squat=5").unwrap(), ("Back Squat", 5));
        assert_eq!(
            parse_routine_entry("Deadlift").unwrap(),
            ("Deadlift", DEFAULT_PLANNED_SETS)
        );
        assert!(parse_routine_entry("Deadlift=lots").is_err());
    }

    #[test]
    fn test_find_routine_by_name_or_id() {
        let routines = vec![Routine::new("Push".to_string()), Routine::new("Pull".to_string())];
        let pull_id = routines[1].id.to_string();

        assert_eq!(find_routine(&routines, "push").map(|r| &r.name), Some(&routines[0].name));
        assert_eq!(find_routine(&routines, &pull_id).map(|r| r.id), Some(routines[1].id));
        assert!(find_routine(&routines, "Legs").is_none());
    }
}
