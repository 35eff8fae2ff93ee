//! Kaartmiddag: card afternoon event bounded context.
//!
//! Responsible for running one event through registration, two scored
//! rounds and the final ranking: the status machine, table assignment,
//! the zero-sum score ledger and prize classification.

pub mod application;
pub mod config;
pub mod domain;
