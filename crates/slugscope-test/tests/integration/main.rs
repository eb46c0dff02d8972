//! Integration tests for scoped URL-key resolution.

mod app;
mod generate;
mod persistence;
