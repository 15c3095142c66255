use anyhow::{bail, Context, Result};
use chrono::{Duration, Utc};
use clap::Args;
use colored::Colorize;
use dialoguer::Confirm;
use gymlog::models::{Exercise, Workout, WorkoutFilter};
use gymlog::storage::{Entity, EntityRef, WorkoutStore};

use super::set_parser::{split_entry, SetParser};
use super::{lookup_template, parse_id, AppContext};

#[derive(Args)]
pub struct LogWorkoutArgs {
    /// Workout name
    #[arg(default_value = "Workout")]
    pub name: String,

    /// Exercise with its sets, e.g. "Bench Press=5x185,5x185" or "Run=5km in 25:30"
    #[arg(short, long = "exercise", required = true)]
    pub exercises: Vec<String>,

    /// Start time (YYYY-MM-DD [HH:MM]); defaults to now
    #[arg(long)]
    pub start: Option<String>,

    /// Duration in minutes
    #[arg(short, long)]
    pub duration: Option<f64>,

    /// Bodyweight at the time of the workout
    #[arg(long)]
    pub bodyweight: Option<f64>,

    /// Session rating from 1 to 5
    #[arg(long)]
    pub rating: Option<u8>,

    /// Free-form notes
    #[arg(long)]
    pub notes: Option<String>,
}

/// Build a workout from command line arguments against the stored templates
pub fn build_workout<S: WorkoutStore>(
    ctx: &AppContext,
    store: &S,
    args: LogWorkoutArgs,
) -> Result<Workout> {
    let start = match &args.start {
        Some(text) => ctx.parse_time(text)?,
        None => Utc::now(),
    };

    let parser = SetParser::new()?;
    let categories = store.fetch_categories()?;
    let mut workout = Workout::new(args.name, start);

    for entry in &args.exercises {
        let (name, sets) = split_entry(entry)?;
        let template = lookup_template(store, name)?;
        let category = template
            .category_id
            .and_then(|id| categories.iter().find(|c| c.id == id));

        let exercise = workout.add_exercise(Exercise::from_template(&template, category));
        for set in parser.parse_sets(sets, template.modality)? {
            exercise.add_set(set);
        }
    }

    if let Some(minutes) = args.duration {
        if !minutes.is_finite() || minutes < 0.0 {
            bail!("Duration must be a non-negative number of minutes");
        }
        workout.finish(start + Duration::seconds((minutes * 60.0).round() as i64));
    }

    if let Some(rating) = args.rating {
        workout.set_rating(rating)?;
    }

    workout.bodyweight = args.bodyweight;
    workout.notes = args.notes;

    Ok(workout)
}

pub async fn log_workout(ctx: &AppContext, args: LogWorkoutArgs) -> Result<()> {
    let mut store = ctx.open_store()?;
    let workout = build_workout(ctx, &store, args)?;

    store.insert(Entity::Workout(workout.clone()));
    store.save().context("Failed to save workout")?;

    println!(
        "{} Logged {} ({} exercise(s), {} set(s))",
        "✓".green(),
        workout.name.bold(),
        workout.exercises.len(),
        workout.set_count()
    );
    println!("  ID: {}", workout.id);

    Ok(())
}

pub async fn list_workouts(
    ctx: &AppContext,
    exercise: Option<String>,
    from: Option<String>,
    to: Option<String>,
    limit: usize,
    json: bool,
) -> Result<()> {
    let store = ctx.open_store()?;

    let mut filter = WorkoutFilter::default();
    if let Some(key) = exercise {
        filter.template_id = Some(lookup_template(&store, &key)?.id);
    }
    if let Some(from) = from {
        filter.from_date = Some(ctx.parse_time(&from)?);
    }
    if let Some(to) = to {
        filter.to_date = Some(ctx.parse_range_end(&to)?);
    }

    let workouts: Vec<Workout> = store
        .fetch_workouts(&filter)?
        .into_iter()
        .take(limit)
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&workouts)?);
        return Ok(());
    }

    if workouts.is_empty() {
        println!("No workouts found. Log one with `gymlog workout log`.");
        return Ok(());
    }

    println!("{}", "Recent Workouts".bold());
    println!();
    for workout in &workouts {
        println!(
            "{}  {:<24} {:>3} ex {:>4} sets {:>6.0} min  {}",
            ctx.format_time(workout.start_time),
            workout.name,
            workout.exercises.len(),
            workout.set_count(),
            workout.duration_minutes(),
            workout.id.to_string().dimmed()
        );
    }

    Ok(())
}

pub async fn show_workout(ctx: &AppContext, id: &str, json: bool) -> Result<()> {
    let store = ctx.open_store()?;
    let id = parse_id(id)?;
    let workout = store
        .fetch_workout(id)?
        .with_context(|| format!("Workout {} not found", id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&workout)?);
        return Ok(());
    }

    println!("{}", workout.name.bold());
    println!("────────────────────────────────");
    println!("Started:  {}", ctx.format_time(workout.start_time));
    if let Some(end) = workout.end_time {
        println!(
            "Finished: {} ({:.0} min)",
            ctx.format_time(end),
            workout.duration_minutes()
        );
    }
    if let Some(bodyweight) = workout.bodyweight {
        println!("Bodyweight: {}", bodyweight);
    }
    if let Some(rating) = workout.rating {
        println!("Rating: {}/5", rating);
    }
    if let Some(notes) = &workout.notes {
        println!("Notes: {}", notes);
    }
    println!();

    for exercise in &workout.exercises {
        let category = exercise.category_name.as_deref().unwrap_or("Uncategorized");
        println!("{}. {} ({})", exercise.order + 1, exercise.name.bold(), category.dimmed());
        for (i, set) in exercise.sets.iter().enumerate() {
            println!("   {:>2}  {}", i + 1, set);
        }
    }

    Ok(())
}

pub async fn delete_workout(ctx: &AppContext, id: &str, force: bool) -> Result<()> {
    let mut store = ctx.open_store()?;
    let id = parse_id(id)?;
    let workout = store
        .fetch_workout(id)?
        .with_context(|| format!("Workout {} not found", id))?;

    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete workout '{}' from {}?",
                workout.name,
                ctx.format_time(workout.start_time)
            ))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Cancelled");
            return Ok(());
        }
    }

    store.delete(EntityRef::Workout(workout.id));
    store.save().context("Failed to delete workout")?;

    println!("{} Deleted workout {}", "✓".green(), workout.id);
    Ok(())
}
