//! Document store adapters for the Kaartmiddag event engine.

pub mod memory;
pub mod pg_document_repository;
pub mod schema;
