//! Fixed-capacity sentinel free-list arena.
//!
//! A single contiguous byte buffer of static size is carved into
//! variable-length blocks, each bounded by a matching pair of signed
//! size headers ("sentinels"): the magnitude is the block's usable payload
//! size, the sign its state (negative = allocated, non-negative = free).
//! There is no separate free-list metadata — the sentinels *are* the free
//! list, walked left to right.
//!
//! # Architecture
//!
//! ```text
//! Arena (buffer owner + protocol)
//! ├── sentinel   — i32 encode/decode, the only byte-reinterpretation points
//! ├── walk       — BlockWalk: one traversal shared by allocate/verify/stats
//! ├── config     — ArenaConfig: capacity + granule, validated up front
//! └── error      — ArenaError: terminal, buffer-preserving failures
//! ```
//!
//! `allocate` is first-fit with block splitting; `deallocate` flips the
//! block free and coalesces with both neighbours, so no two adjacent free
//! blocks ever persist. [`Arena::valid`] walks the sentinels and confirms
//! the bookkeeping is internally consistent at any point in time.
//!
//! The arena is single-threaded by design: it is not `Clone`, and exclusive
//! ownership replaces locking. For a typed, pointer-based surface see the
//! `palisade-pool` crate.
//!
//! # Example
//!
//! ```rust
//! use palisade_arena::Arena;
//!
//! let mut arena = Arena::new(100)?;
//! let offset = arena.allocate(20)?;
//! arena.payload_mut(offset)[0] = 42;
//! assert!(arena.valid());
//! arena.deallocate(offset);
//! assert_eq!(arena.free_bytes(), 92);
//! # Ok::<(), palisade_arena::ArenaError>(())
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod arena;
pub mod config;
pub mod error;
mod sentinel;
pub mod walk;

// Public re-exports for the primary API surface.
pub use arena::{Arena, ArenaStats, Offset};
pub use config::ArenaConfig;
pub use error::ArenaError;
pub use sentinel::{BlockState, SENTINEL_BYTES};
pub use walk::{Block, BlockWalk, SentinelFault};
