//! The typed pool: element counts to bytes, offsets to pointers.

use std::marker::PhantomData;
use std::ptr::NonNull;

use palisade_arena::{Arena, ArenaConfig, ArenaError, ArenaStats, Offset, SENTINEL_BYTES};

/// A fixed-capacity typed allocator backed by a sentinel arena.
///
/// `Pool<T>` owns an [`Arena`] whose granule is `size_of::<T>()`, so the
/// split policy never strands a fragment too small to hold one element.
/// `allocate(n)` converts the element count to bytes and hands back a
/// `NonNull<T>` into the arena buffer; `deallocate` converts the pointer
/// back to a byte offset. The sentinels are self-describing, so the
/// element count passed to `deallocate` is only sanity-checked, never
/// needed.
///
/// # Ownership and threading
///
/// The pool is the sole owner of its buffer. It is deliberately neither
/// `Clone` nor `Send`/`Sync` (the raw-pointer marker opts out), encoding
/// the single-threaded, single-owner discipline in the type system instead
/// of runtime locks.
///
/// # Alignment
///
/// The arena aligns its buffer base to the sentinel width, and with
/// whole-element request sizes every block boundary stays a multiple of
/// `align_of::<T>()` past it.
/// Payloads begin one sentinel past a block boundary, so the pool can only
/// guarantee natural alignment for types with
/// `align_of::<T>() <= SENTINEL_BYTES`. Larger alignments are rejected at
/// construction.
pub struct Pool<T> {
    arena: Arena,
    /// Pins the element type and opts out of `Send`/`Sync` and `Clone`.
    _marker: PhantomData<*mut T>,
}

impl<T> Pool<T> {
    /// Create a pool over a fresh arena of `capacity` total bytes.
    ///
    /// # Errors
    ///
    /// - [`ArenaError::InvalidSize`] for zero-sized `T` or
    ///   `align_of::<T>() > SENTINEL_BYTES`.
    /// - [`ArenaError::InsufficientCapacity`] if `capacity` cannot hold a
    ///   sentinel pair plus one element.
    pub fn new(capacity: usize) -> Result<Self, ArenaError> {
        let elem = std::mem::size_of::<T>();
        if elem == 0 {
            return Err(ArenaError::InvalidSize { requested: 0 });
        }
        if std::mem::align_of::<T>() > SENTINEL_BYTES {
            return Err(ArenaError::InvalidSize {
                requested: std::mem::align_of::<T>(),
            });
        }
        let arena = Arena::with_config(ArenaConfig::new(capacity).with_granule(elem))?;
        Ok(Self {
            arena,
            _marker: PhantomData,
        })
    }

    /// Allocate storage for `n` elements of `T`.
    ///
    /// The returned memory is zeroed but *unconstructed*: write values via
    /// [`Pool::construct`] (or raw pointer writes) before reading them as
    /// `T`.
    ///
    /// # Errors
    ///
    /// - [`ArenaError::InvalidSize`] if `n` is zero.
    /// - [`ArenaError::OutOfMemory`] if no free block can hold `n`
    ///   elements. A byte size that would overflow `usize` saturates and
    ///   therefore fails the same way.
    pub fn allocate(&mut self, n: usize) -> Result<NonNull<T>, ArenaError> {
        if n == 0 {
            return Err(ArenaError::InvalidSize { requested: 0 });
        }
        // Saturation cannot smuggle in a spurious success: no block can
        // hold anywhere near usize::MAX bytes.
        let bytes = n.saturating_mul(std::mem::size_of::<T>());
        let offset = self.arena.allocate(bytes)?;
        let ptr = self.arena.payload_mut(offset).as_mut_ptr().cast::<T>();
        Ok(NonNull::new(ptr).expect("arena payload pointers are never null"))
    }

    /// Return the allocation at `ptr` to the arena.
    ///
    /// `n` is the element count from the matching `allocate` call. It is
    /// accepted for allocator-contract compatibility but not needed — the
    /// block's sentinels already record its size.
    ///
    /// `ptr` must have come from [`Pool::allocate`] on this pool and must
    /// not have been deallocated already. Any `T` values still alive in the
    /// block are *not* dropped; call [`Pool::destroy`] first.
    ///
    /// # Panics
    ///
    /// Panics (in debug builds) if `ptr` does not point into this pool's
    /// buffer or `n` is zero.
    pub fn deallocate(&mut self, ptr: NonNull<T>, n: usize) {
        debug_assert!(n > 0, "deallocate of zero elements");
        let base = self.arena.as_bytes().as_ptr() as usize;
        let addr = ptr.as_ptr() as usize;
        // The smallest payload address sits one sentinel past the base.
        debug_assert!(
            addr >= base + SENTINEL_BYTES && addr < base + self.arena.capacity(),
            "pointer does not belong to this pool"
        );
        self.arena.deallocate(Offset(addr - base));
    }

    /// Write `value` into uninitialized storage at `ptr`.
    ///
    /// Pure placement forwarding; no allocator bookkeeping changes.
    ///
    /// # Safety
    ///
    /// `ptr` must point into a live allocation from this pool with room
    /// for a `T`, and must not currently hold a value that needs dropping.
    pub unsafe fn construct(ptr: NonNull<T>, value: T) {
        unsafe { ptr.as_ptr().write(value) }
    }

    /// Drop the value at `ptr` in place, leaving the storage allocated.
    ///
    /// # Safety
    ///
    /// `ptr` must point to a live, constructed `T` within this pool, and
    /// the value must not be used or destroyed again afterwards.
    pub unsafe fn destroy(ptr: NonNull<T>) {
        unsafe { ptr.as_ptr().drop_in_place() }
    }

    /// Whether the underlying sentinel bookkeeping is consistent.
    pub fn valid(&self) -> bool {
        self.arena.valid()
    }

    /// Total buffer size in bytes, sentinels included.
    pub fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    /// Aggregate accounting for the underlying arena.
    pub fn stats(&self) -> ArenaStats {
        self.arena.stats()
    }

    /// The underlying arena, for white-box assertions and diagnostics.
    pub fn arena(&self) -> &Arena {
        &self.arena
    }
}
