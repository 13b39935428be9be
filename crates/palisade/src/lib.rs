//! Palisade: a fixed-capacity sentinel free-list allocator.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the palisade sub-crates. For most users, adding `palisade` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use palisade::prelude::*;
//!
//! // A 100-byte arena holding i32 elements: 92 usable bytes behind a
//! // sentinel pair.
//! let mut pool: Pool<i32> = Pool::new(100)?;
//!
//! let ptr = pool.allocate(5)?;
//! unsafe {
//!     Pool::construct(ptr, 42);
//!     assert_eq!(*ptr.as_ptr(), 42);
//!     Pool::destroy(ptr);
//! }
//! pool.deallocate(ptr, 5);
//!
//! assert!(pool.valid());
//! assert_eq!(pool.stats().free_bytes, 92);
//! # Ok::<(), palisade::ArenaError>(())
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`arena`] | `palisade-arena` | `Arena`, block walk, sentinel protocol, errors |
//! | [`pool`] | `palisade-pool` | `Pool<T>` typed facade, `construct`/`destroy` |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// The byte-level arena and sentinel protocol (`palisade-arena`).
pub use palisade_arena as arena;

/// The typed pool facade (`palisade-pool`).
pub use palisade_pool as pool;

pub use palisade_arena::{
    Arena, ArenaConfig, ArenaError, ArenaStats, Block, BlockState, BlockWalk, Offset,
    SentinelFault, SENTINEL_BYTES,
};
pub use palisade_pool::Pool;

/// Convenience re-exports for the common case.
pub mod prelude {
    pub use crate::{Arena, ArenaConfig, ArenaError, Offset, Pool};
}
