//! Shared test mocks and utilities for the Kaartmiddag event engine.

mod clock;
mod ids;
mod repository;

pub use clock::FixedClock;
pub use ids::SequenceIds;
pub use repository::{
    EmptyDocumentRepository, FailingDocumentRepository, RecordingDocumentRepository,
};
