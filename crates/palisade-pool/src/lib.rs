//! Typed allocator facade over the `palisade-arena` sentinel protocol.
//!
//! [`Pool<T>`] adapts the arena's byte/offset interface to a typed,
//! pointer-based one in the standard allocator contract pattern: element
//! counts in, `NonNull<T>` out, with `construct`/`destroy` forwarding for
//! in-place value lifecycle. All pointer/offset reinterpretation in the
//! workspace lives in this crate; `palisade-arena` itself forbids `unsafe`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_op_in_unsafe_fn)]

mod pool;

pub use palisade_arena::{Arena, ArenaConfig, ArenaError, ArenaStats, Offset};
pub use pool::Pool;
