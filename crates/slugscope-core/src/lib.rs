//! Shared types, configuration and errors for the slugscope workspace.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
pub mod validation;
