//! Fixture-driven front end for the slugscope resolver.

pub mod error;
pub mod fixture;
pub mod runner;
