use std::fmt;

use uuid::Uuid;

/// Produces universally unique identifiers on demand.
pub trait IdGenerator: fmt::Debug + Send + Sync {
    /// Returns a fresh identifier.
    fn generate(&self) -> Uuid;
}

/// Generates random version 4 UUIDs.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn generate(&self) -> Uuid {
        Uuid::new_v4()
    }
}
