//! Test id generator: deterministic `IdGenerator` implementation for tests.

use std::sync::atomic::{AtomicU64, Ordering};

use kaartmiddag_core::ids::IdGenerator;
use uuid::Uuid;

/// Hands out `00000000-0000-0000-0000-000000000001`, `...0002`, and so on.
/// Used in tests that need to predict generated table and participant ids.
#[derive(Debug, Default)]
pub struct SequenceIds {
    next: AtomicU64,
}

impl SequenceIds {
    /// The id that the `n`th call (1-based) of a fresh generator returns.
    #[must_use]
    pub fn nth(n: u64) -> Uuid {
        Uuid::from_u128(u128::from(n))
    }
}

impl IdGenerator for SequenceIds {
    fn next_id(&self) -> Uuid {
        let n = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        Self::nth(n)
    }
}
