// Business logic: period calendar, progress engine, goal lifecycle, taxonomy

pub mod goal_calendar;
pub mod goal_service;
pub mod progress_engine;
pub mod taxonomy;

pub use goal_calendar::{
    moving_unit, period_bounds, shift_period, start_of_period, CalendarUnit, GoalCalendar,
};
pub use goal_service::{evaluate_goals, GoalService};
pub use progress_engine::{format_pace, progress, GoalProgress, SetIndex};
pub use taxonomy::{default_taxonomy, seed_defaults, SeedReport, Taxonomy};
