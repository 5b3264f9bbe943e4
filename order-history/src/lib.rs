//! Order history command line driver

#![deny(clippy::all, clippy::pedantic, clippy::nursery, dead_code)]

/// Command line arguments
pub mod cli;

/// Command execution
pub mod commands;

/// Order table schema and seed data
pub mod order;

/// Result output
pub mod report;

/// Environment configuration
pub mod types;
