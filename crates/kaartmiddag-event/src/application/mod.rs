//! Application services: command/query handlers and the event catalog.

pub mod catalog;
pub mod command_handlers;
pub mod query_handlers;
