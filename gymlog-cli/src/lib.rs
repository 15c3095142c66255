// Library exports for the gymlog CLI
// This allows testing of internal modules

pub mod commands;
pub mod config;
pub mod storage;
