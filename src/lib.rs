// Library exports for the gymlog domain model and goal progress engine

pub mod errors;
pub mod models;
pub mod services;
pub mod storage;

pub use errors::{GoalError, StorageError, ValidationError};
