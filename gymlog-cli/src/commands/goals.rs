use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use colored::Colorize;
use dialoguer::Confirm;
use gymlog::models::{
    ConsistencyGoalUpdate, Goal, Measurement, NewConsistencyGoal, NewTargetGoal, TargetGoalUpdate,
    TargetSpec, TargetType, Timeframe, Workout,
};
use gymlog::services::progress_engine::{consistency_streak, WEIGHT_UNIT_LABEL};
use gymlog::services::{evaluate_goals, GoalCalendar, GoalService};
use gymlog::storage::WorkoutStore;
use serde::Serialize;
use uuid::Uuid;

use super::{lookup_template, parse_id, AppContext};
use crate::storage::SledStore;

#[derive(Args)]
pub struct ConsistencyArgs {
    /// Goal name
    pub name: String,

    /// daily, weekly or monthly
    #[arg(short, long, default_value = "weekly")]
    pub timeframe: Timeframe,

    /// minutes, workouts or reps
    #[arg(short, long, default_value = "workouts")]
    pub measurement: Measurement,

    /// Amount to reach every period
    #[arg(long)]
    pub target: f64,

    /// Only count this exercise (name or id)
    #[arg(short, long)]
    pub exercise: Option<String>,

    /// Start date (YYYY-MM-DD); defaults to now
    #[arg(long)]
    pub start: Option<String>,
}

#[derive(Args)]
pub struct TargetArgs {
    /// Goal name
    pub name: String,

    /// Exercise the goal tracks (name or id)
    #[arg(short, long)]
    pub exercise: String,

    /// strength or pace
    #[arg(short = 't', long = "type")]
    pub target_type: TargetType,

    /// Weight for strength goals, distance for pace goals
    #[arg(long)]
    pub primary: f64,

    /// Minimum reps for strength goals, time budget in minutes for pace goals
    #[arg(long)]
    pub secondary: f64,

    /// Start date (YYYY-MM-DD); defaults to now
    #[arg(long)]
    pub start: Option<String>,
}

#[derive(Args)]
pub struct GoalUpdateArgs {
    /// Goal ID
    pub id: String,

    #[arg(long)]
    pub name: Option<String>,

    /// Exercise (name or id)
    #[arg(short, long)]
    pub exercise: Option<String>,

    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<String>,

    /// Consistency goals: new timeframe
    #[arg(long)]
    pub timeframe: Option<Timeframe>,

    /// Consistency goals: new measurement
    #[arg(long)]
    pub measurement: Option<Measurement>,

    /// Consistency goals: new per-period target
    #[arg(long)]
    pub target: Option<f64>,

    /// Target goals: new weight or distance
    #[arg(long)]
    pub primary: Option<f64>,

    /// Target goals: new minimum reps or time budget
    #[arg(long)]
    pub secondary: Option<f64>,
}

/// One evaluated goal, as printed by `goals progress`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressRow {
    pub id: Uuid,
    pub name: String,
    pub kind: String,
    pub fraction: f64,
    pub percentage: f64,
    pub complete: bool,
    pub description: String,
    /// Consecutive periods met, consistency goals only
    pub streak: Option<u32>,
}

/// Evaluate goals over one loaded history
pub fn progress_report(
    goals: Vec<Goal>,
    workouts: &[Workout],
    now: DateTime<Utc>,
    calendar: &GoalCalendar,
) -> Vec<ProgressRow> {
    evaluate_goals(goals, workouts, now, calendar)
        .into_iter()
        .map(|(goal, progress)| {
            let streak = match &goal {
                Goal::Consistency(c) => Some(consistency_streak(c, workouts, now, calendar)),
                Goal::Target(_) => None,
            };
            ProgressRow {
                id: goal.id(),
                name: goal.name().to_string(),
                kind: goal.kind_label(),
                fraction: progress.fraction,
                percentage: progress.percentage(),
                complete: progress.is_complete(),
                description: progress.description,
                streak,
            }
        })
        .collect()
}

/// Short human summary of what a goal asks for
pub fn target_summary(goal: &Goal) -> String {
    match goal {
        Goal::Consistency(g) => format!(
            "{} {} per {}",
            g.target,
            g.measurement,
            g.timeframe.period_noun()
        ),
        Goal::Target(g) => match g.spec {
            TargetSpec::Strength { weight, min_reps } => {
                format!("{} {} x {}", weight, WEIGHT_UNIT_LABEL, min_reps.floor())
            }
            TargetSpec::Pace { distance, minutes } => format!("{} in {} min", distance, minutes),
        },
    }
}

fn progress_bar(fraction: f64, width: usize) -> String {
    let filled = ((fraction * width as f64).round() as usize).min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

fn exercise_label<S: WorkoutStore>(service: &GoalService<S>, goal: &Goal) -> Result<String> {
    Ok(match goal.exercise_id() {
        Some(id) => match service.resolve_template(id)? {
            Some(template) => template.name,
            None => "(deleted exercise)".to_string(),
        },
        None => "any exercise".to_string(),
    })
}

fn open_service(ctx: &AppContext) -> Result<GoalService<SledStore>> {
    Ok(GoalService::new(ctx.open_store()?))
}

fn start_date(ctx: &AppContext, start: &Option<String>) -> Result<Option<DateTime<Utc>>> {
    start.as_deref().map(|text| ctx.parse_time(text)).transpose()
}

pub async fn list_goals(ctx: &AppContext, show_all: bool) -> Result<()> {
    let service = open_service(ctx)?;
    let goals: Vec<Goal> = service
        .list_goals()?
        .into_iter()
        .filter(|g| show_all || !matches!(g, Goal::Consistency(c) if c.is_completed))
        .collect();

    if goals.is_empty() {
        println!("No goals yet. Create one with `gymlog goals create-consistency`");
        println!("or `gymlog goals create-target`.");
        return Ok(());
    }

    println!("{}", "Goals".bold());
    println!();
    for goal in &goals {
        let done = matches!(goal, Goal::Consistency(c) if c.is_completed);
        let name = if done {
            format!("{} (completed)", goal.name()).dimmed().to_string()
        } else {
            goal.name().bold().to_string()
        };
        println!("{}  {}", name, goal.id().to_string().dimmed());
        println!(
            "   {} · {} · {} · since {}",
            goal.kind_label(),
            target_summary(goal),
            exercise_label(&service, goal)?,
            ctx.format_time(goal.start_date())
        );
    }

    Ok(())
}

pub async fn create_consistency_goal(ctx: &AppContext, args: ConsistencyArgs) -> Result<()> {
    let mut service = open_service(ctx)?;
    let exercise_id = match &args.exercise {
        Some(key) => Some(lookup_template(service.store(), key)?.id),
        None => None,
    };

    let goal = service.add_consistency_goal(NewConsistencyGoal {
        name: args.name,
        timeframe: args.timeframe,
        measurement: args.measurement,
        target: args.target,
        exercise_id,
        start_date: start_date(ctx, &args.start)?,
    })?;

    println!("{} Created goal {}", "✓".green(), goal.name.bold());
    println!("  ID: {}", goal.id);
    Ok(())
}

pub async fn create_target_goal(ctx: &AppContext, args: TargetArgs) -> Result<()> {
    let mut service = open_service(ctx)?;
    let template = lookup_template(service.store(), &args.exercise)?;

    let goal = service.add_target_goal(NewTargetGoal {
        name: args.name,
        exercise_id: template.id,
        target_type: args.target_type,
        target_primary_value: args.primary,
        target_secondary_value: args.secondary,
        start_date: start_date(ctx, &args.start)?,
    })?;

    println!(
        "{} Created {} goal {} for {}",
        "✓".green(),
        goal.target_type(),
        goal.name.bold(),
        template.name
    );
    println!("  ID: {}", goal.id);
    Ok(())
}

pub async fn update_goal(ctx: &AppContext, args: GoalUpdateArgs) -> Result<()> {
    let mut service = open_service(ctx)?;
    let goal = service.require_goal(parse_id(&args.id)?)?;

    let exercise_id = match &args.exercise {
        Some(key) => Some(lookup_template(service.store(), key)?.id),
        None => None,
    };
    let start = start_date(ctx, &args.start)?;

    match goal {
        Goal::Consistency(mut goal) => {
            if args.primary.is_some() || args.secondary.is_some() {
                bail!("--primary/--secondary only apply to target goals");
            }
            service.update_consistency_goal(
                &mut goal,
                ConsistencyGoalUpdate {
                    name: args.name,
                    timeframe: args.timeframe,
                    measurement: args.measurement,
                    target: args.target,
                    exercise_id,
                    start_date: start,
                    is_completed: None,
                },
            )?;
            println!("{} Updated goal {}", "✓".green(), goal.name.bold());
        }
        Goal::Target(mut goal) => {
            if args.timeframe.is_some() || args.measurement.is_some() || args.target.is_some() {
                bail!("--timeframe/--measurement/--target only apply to consistency goals");
            }
            service.update_target_goal(
                &mut goal,
                TargetGoalUpdate {
                    name: args.name,
                    exercise_id,
                    target_primary_value: args.primary,
                    target_secondary_value: args.secondary,
                    start_date: start,
                },
            )?;
            println!("{} Updated goal {}", "✓".green(), goal.name.bold());
        }
    }

    Ok(())
}

pub async fn complete_goal(ctx: &AppContext, id: &str, completed: bool) -> Result<()> {
    let mut service = open_service(ctx)?;

    match service.require_goal(parse_id(id)?)? {
        Goal::Consistency(mut goal) => {
            service.set_completed(&mut goal, completed)?;
            let state = if completed { "complete" } else { "active" };
            println!("{} Marked {} as {}", "✓".green(), goal.name.bold(), state);
            Ok(())
        }
        Goal::Target(goal) => bail!(
            "'{}' is a target goal; it completes when its progress reaches 100%",
            goal.name
        ),
    }
}

pub async fn delete_goal(ctx: &AppContext, id: &str, force: bool) -> Result<()> {
    let mut service = open_service(ctx)?;
    let goal = service.require_goal(parse_id(id)?)?;

    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete goal '{}'?", goal.name()))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Cancelled");
            return Ok(());
        }
    }

    service.delete_goal(&goal)?;
    println!("{} Deleted goal {}", "✓".green(), goal.name());
    Ok(())
}

pub async fn show_progress(ctx: &AppContext, id: Option<String>, json: bool) -> Result<()> {
    let service = open_service(ctx)?;
    let goals = match id {
        Some(id) => vec![service.require_goal(parse_id(&id)?)?],
        None => service.list_goals()?,
    };
    let calendar = ctx.calendar;
    let now = Utc::now();

    // Progress scans the whole history; keep it off the async workers
    let rows = tokio::task::spawn_blocking(move || -> Result<Vec<ProgressRow>> {
        let workouts = service.store().fetch_all_workouts()?;
        Ok(progress_report(goals, &workouts, now, &calendar))
    })
    .await
    .context("Goal evaluation task failed")??;

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("No goals to evaluate.");
        return Ok(());
    }

    println!("{}", "Goal Progress".bold());
    println!();
    for row in &rows {
        let bar = progress_bar(row.fraction, 20);
        let bar = if row.complete {
            bar.green()
        } else {
            bar.yellow()
        };
        println!("{}  ({})", row.name.bold(), row.kind);
        print!("   {} {:>5.1}%  {}", bar, row.percentage, row.description);
        match row.streak {
            Some(streak) if streak > 0 => println!("  · streak {}", streak),
            _ => println!(),
        }
    }

    Ok(())
}
