mod config_cmd;
mod goals;
mod routine;
pub mod set_parser;
mod templates;
mod workout;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use clap::{Parser, Subcommand};
use gymlog::models::{find_template, ExerciseTemplate};
use gymlog::services::GoalCalendar;
use gymlog::storage::WorkoutStore;
use std::path::PathBuf;
use uuid::Uuid;

use crate::config::Config;
use crate::storage::SledStore;

pub use goals::{ConsistencyArgs, GoalUpdateArgs, TargetArgs};
pub use workout::LogWorkoutArgs;

#[derive(Parser)]
#[command(name = "gymlog")]
#[command(about = "Terminal workout log with goal progress tracking", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to configuration file
    #[arg(long, global = true, env = "GYMLOG_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database and seed the standard exercise templates
    Init,

    /// Manage workouts
    #[command(subcommand)]
    Workout(WorkoutSubcommands),

    /// Manage goals
    #[command(subcommand)]
    Goals(GoalsSubcommands),

    /// Browse exercise templates
    #[command(subcommand)]
    Templates(TemplatesSubcommands),

    /// Browse exercise categories
    #[command(subcommand)]
    Categories(CategoriesSubcommands),

    /// Manage routines
    #[command(subcommand)]
    Routine(RoutineSubcommands),

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigSubcommands),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum WorkoutSubcommands {
    /// Log a new workout
    Log(LogWorkoutArgs),

    /// List recent workouts
    List {
        /// Only workouts containing this exercise (name or id)
        #[arg(short, long)]
        exercise: Option<String>,

        /// Filter from date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Filter to date, inclusive (YYYY-MM-DD [HH:MM])
        #[arg(long)]
        to: Option<String>,

        /// Number of workouts to show
        #[arg(short, long, default_value = "10")]
        limit: usize,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show workout details
    Show {
        /// Workout ID
        id: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Delete a workout
    Delete {
        /// Workout ID
        id: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum GoalsSubcommands {
    /// List all goals
    List {
        /// Include completed goals
        #[arg(short, long)]
        all: bool,
    },

    /// Create a goal to do an amount of training every day, week or month
    CreateConsistency(ConsistencyArgs),

    /// Create a strength or pace target for one exercise
    CreateTarget(TargetArgs),

    /// Update a goal
    Update(GoalUpdateArgs),

    /// Mark a consistency goal as complete
    Complete {
        /// Goal ID
        id: String,

        /// Mark as not complete instead
        #[arg(long)]
        undo: bool,
    },

    /// Delete a goal
    Delete {
        /// Goal ID
        id: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Show progress toward goals
    Progress {
        /// Only this goal
        id: Option<String>,

        /// Print JSON instead of progress bars
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum TemplatesSubcommands {
    /// List exercise templates
    List {
        /// Only templates in this category
        #[arg(short, long)]
        category: Option<String>,

        /// Include hidden templates
        #[arg(short, long)]
        all: bool,
    },
}

#[derive(Subcommand)]
enum CategoriesSubcommands {
    /// List exercise categories
    List,
}

#[derive(Subcommand)]
enum RoutineSubcommands {
    /// List saved routines
    List,

    /// Create a routine from exercise templates
    Create {
        /// Routine name
        name: String,

        /// Exercise to include, optionally with a planned set count (e.g. "Squat=5")
        #[arg(short, long = "exercise", required = true)]
        exercises: Vec<String>,
    },

    /// Start a workout from a routine
    Start {
        /// Routine name or ID
        routine: String,
    },
}

#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Show current configuration
    Show,

    /// Initialize configuration with defaults
    Init {
        /// Overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        if self.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        let config_file = match self.config {
            Some(path) => path,
            None => Config::config_file()?,
        };

        if let Commands::Config(subcmd) = &self.command {
            return match subcmd {
                ConfigSubcommands::Show => config_cmd::show_config(&config_file).await,
                ConfigSubcommands::Init { force } => {
                    config_cmd::init_config(&config_file, *force).await
                }
            };
        }

        if let Commands::Completions { shell } = &self.command {
            generate_completions(*shell);
            return Ok(());
        }

        let config = Config::load_from(&config_file)?;
        let ctx = AppContext::new(config)?;

        match self.command {
            Commands::Init => templates::init(&ctx).await,
            Commands::Workout(subcmd) => match subcmd {
                WorkoutSubcommands::Log(args) => workout::log_workout(&ctx, args).await,
                WorkoutSubcommands::List {
                    exercise,
                    from,
                    to,
                    limit,
                    json,
                } => workout::list_workouts(&ctx, exercise, from, to, limit, json).await,
                WorkoutSubcommands::Show { id, json } => {
                    workout::show_workout(&ctx, &id, json).await
                }
                WorkoutSubcommands::Delete { id, force } => {
                    workout::delete_workout(&ctx, &id, force).await
                }
            },
            Commands::Goals(subcmd) => match subcmd {
                GoalsSubcommands::List { all } => goals::list_goals(&ctx, all).await,
                GoalsSubcommands::CreateConsistency(args) => {
                    goals::create_consistency_goal(&ctx, args).await
                }
                GoalsSubcommands::CreateTarget(args) => goals::create_target_goal(&ctx, args).await,
                GoalsSubcommands::Update(args) => goals::update_goal(&ctx, args).await,
                GoalsSubcommands::Complete { id, undo } => {
                    goals::complete_goal(&ctx, &id, !undo).await
                }
                GoalsSubcommands::Delete { id, force } => {
                    goals::delete_goal(&ctx, &id, force).await
                }
                GoalsSubcommands::Progress { id, json } => {
                    goals::show_progress(&ctx, id, json).await
                }
            },
            Commands::Templates(TemplatesSubcommands::List { category, all }) => {
                templates::list_templates(&ctx, category, all).await
            }
            Commands::Categories(CategoriesSubcommands::List) => {
                templates::list_categories(&ctx).await
            }
            Commands::Routine(subcmd) => match subcmd {
                RoutineSubcommands::List => routine::list_routines(&ctx).await,
                RoutineSubcommands::Create { name, exercises } => {
                    routine::create_routine(&ctx, name, exercises).await
                }
                RoutineSubcommands::Start { routine } => {
                    routine::start_routine(&ctx, &routine).await
                }
            },
            Commands::Config(_) | Commands::Completions { .. } => Ok(()),
        }
    }
}

/// Loaded configuration plus the values derived from it
pub struct AppContext {
    pub config: Config,
    pub calendar: GoalCalendar,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        let calendar = config.goal_calendar()?;
        Ok(Self { config, calendar })
    }

    pub fn open_store(&self) -> Result<SledStore> {
        SledStore::init(&self.config)
    }

    /// Render a timestamp in the configured offset and format
    pub fn format_time(&self, time: DateTime<Utc>) -> String {
        time.with_timezone(&self.calendar.offset())
            .format(&self.config.display.date_format)
            .to_string()
    }

    /// Parse `YYYY-MM-DD` or `YYYY-MM-DD HH:MM` as local time
    pub fn parse_time(&self, text: &str) -> Result<DateTime<Utc>> {
        let (naive, _) = parse_local(text)?;
        self.to_utc(naive, text)
    }

    /// Inclusive end of a range: a bare date covers the whole day,
    /// an explicit time is taken as given
    pub fn parse_range_end(&self, text: &str) -> Result<DateTime<Utc>> {
        let (naive, has_time) = parse_local(text)?;
        let end = if has_time {
            naive
        } else {
            naive + Duration::days(1) - Duration::seconds(1)
        };
        self.to_utc(end, text)
    }

    fn to_utc(&self, naive: NaiveDateTime, text: &str) -> Result<DateTime<Utc>> {
        naive
            .and_local_timezone(self.calendar.offset())
            .single()
            .map(|local| local.with_timezone(&Utc))
            .with_context(|| format!("Ambiguous local time '{}'", text.trim()))
    }
}

/// Naive local time, and whether the text carried a time of day
fn parse_local(text: &str) -> Result<(NaiveDateTime, bool)> {
    let text = text.trim();
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M") {
        return Ok((naive, true));
    }

    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}': use YYYY-MM-DD [HH:MM]", text))?;
    Ok((date.and_time(chrono::NaiveTime::MIN), false))
}

/// Find a template by id or case-insensitive name
pub fn lookup_template<S: WorkoutStore>(store: &S, key: &str) -> Result<ExerciseTemplate> {
    let templates = store.fetch_templates()?;
    find_template(&templates, key).cloned().with_context(|| {
        format!(
            "Unknown exercise '{}'. Run `gymlog templates list` to see available exercises",
            key
        )
    })
}

pub fn parse_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id.trim()).with_context(|| format!("Invalid ID '{}'", id))
}

fn generate_completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}
