// Domain records: workouts, templates, goals and routines

pub mod goal;
pub mod routine;
pub mod template;
pub mod workout;

pub use goal::*;
pub use routine::*;
pub use template::*;
pub use workout::*;
