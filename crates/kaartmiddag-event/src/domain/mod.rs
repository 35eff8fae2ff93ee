//! Domain model and pure operations for the event context.

pub mod aggregates;
pub mod commands;
pub mod model;
pub mod results;
pub mod scores;
pub mod tables;
