//! Arena configuration parameters.

use crate::error::ArenaError;
use crate::sentinel::SENTINEL_BYTES;

/// Configuration for a fixed-capacity arena.
///
/// Validated at construction; all values are immutable after creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Total size of the backing buffer in bytes, including all sentinels.
    ///
    /// Must be at least `2 * SENTINEL_BYTES + granule` and small enough
    /// that the usable magnitude fits in an `i32`.
    pub capacity: usize,

    /// Minimum payload size a free block may hold, in bytes.
    ///
    /// The split policy refuses to leave a free fragment smaller than
    /// `2 * SENTINEL_BYTES + granule`. The typed facade sets this to
    /// `size_of::<T>()`; the default is 1.
    pub granule: usize,
}

impl ArenaConfig {
    /// Default minimum payload size.
    pub const DEFAULT_GRANULE: usize = 1;

    /// Create a config for the given total capacity with the default granule.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            granule: Self::DEFAULT_GRANULE,
        }
    }

    /// Set the minimum payload size (in bytes) for free fragments.
    pub fn with_granule(mut self, granule: usize) -> Self {
        self.granule = granule;
        self
    }

    /// Smallest capacity this configuration would accept: one sentinel pair
    /// plus one minimum-sized element.
    pub fn minimum_capacity(&self) -> usize {
        2 * SENTINEL_BYTES + self.granule
    }

    /// Check that the configuration describes a constructible arena.
    ///
    /// Rejects capacities too small for a sentinel pair plus one element,
    /// zero granules, and capacities whose usable magnitude would not fit
    /// in a sentinel's `i32`.
    pub fn validate(&self) -> Result<(), ArenaError> {
        if self.granule == 0 {
            return Err(ArenaError::InvalidSize { requested: 0 });
        }
        if self.capacity < self.minimum_capacity() {
            return Err(ArenaError::InsufficientCapacity {
                capacity: self.capacity,
                minimum: self.minimum_capacity(),
            });
        }
        // Magnitudes are stored in i32 sentinels.
        if self.capacity - 2 * SENTINEL_BYTES > i32::MAX as usize {
            return Err(ArenaError::InsufficientCapacity {
                capacity: self.capacity,
                minimum: self.minimum_capacity(),
            });
        }
        Ok(())
    }
}
