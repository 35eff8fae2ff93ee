//! Identifier generation abstraction for determinism.
//!
//! In production, this hands out random v4 UUIDs. In tests, a sequential
//! implementation is injected so that generated table and participant ids
//! are predictable.

use uuid::Uuid;

/// Abstraction over identifier generation.
pub trait IdGenerator: Send + Sync {
    /// Returns a fresh identifier.
    fn next_id(&self) -> Uuid;
}

/// Production generator backed by random v4 UUIDs.
#[derive(Debug, Clone, Copy)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&self) -> Uuid {
        Uuid::new_v4()
    }
}
