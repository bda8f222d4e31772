//! Request context carried into every storage-touching operation.

/// Identifies the farm (tenant) an operation acts for.
///
/// Passed explicitly instead of living in process-wide state, so one process can
/// serve several farms at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FarmContext {
    farm_id: i64,
}

impl FarmContext {
    /// Creates a context for the given farm.
    #[must_use]
    pub const fn new(farm_id: i64) -> Self {
        Self { farm_id }
    }

    /// The farm every query is scoped to.
    #[must_use]
    pub const fn farm_id(&self) -> i64 {
        self.farm_id
    }
}
