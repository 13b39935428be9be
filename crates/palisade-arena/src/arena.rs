//! The fixed-capacity arena: buffer ownership and the sentinel protocol.
//!
//! [`Arena`] owns a fixed-size byte buffer carved into variable-length
//! blocks, each bounded by a matching sentinel pair. `allocate` is a
//! first-fit scan with block splitting; `deallocate` flips the block free
//! and coalesces with both neighbours. The buffer never grows and never
//! moves.
//!
//! # Scrub discipline
//!
//! Freshly allocated payloads are zeroed, and `deallocate` scrubs freed
//! payloads (and sentinels absorbed by coalescing) back to zero. A fully
//! freed arena is therefore bit-identical to a freshly constructed one,
//! which the round-trip tests rely on.

use std::fmt;

use crate::config::ArenaConfig;
use crate::error::ArenaError;
use crate::sentinel::{decode, encode, read_sentinel, write_sentinel, BlockState, SENTINEL_BYTES};
use crate::walk::{Block, BlockWalk, SentinelFault};

/// Byte offset of an allocation's first payload byte.
///
/// Returned by [`Arena::allocate`] and consumed by [`Arena::deallocate`]
/// and the payload accessors. Offsets are plain numbers, not capabilities:
/// passing an offset that did not come from `allocate` (or that was already
/// deallocated) is a caller error the arena only catches in debug builds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[must_use]
pub struct Offset(pub usize);

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Aggregate accounting for an arena, computed by a single block walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArenaStats {
    /// Total buffer size in bytes, sentinels included.
    pub capacity: usize,
    /// Payload bytes in free blocks.
    pub free_bytes: usize,
    /// Payload bytes in allocated blocks.
    pub used_bytes: usize,
    /// Payload size of the largest free block, in bytes.
    pub largest_free: usize,
    /// Number of blocks tiling the buffer.
    pub block_count: usize,
    /// Number of free blocks.
    pub free_block_count: usize,
}

/// A fixed-capacity free-list allocator over a single contiguous buffer.
///
/// Blocks tile the buffer with no gaps: each is `[left sentinel][payload]
/// [right sentinel]`, with both sentinels holding the same value (payload
/// size, negated while allocated). The very first byte of the buffer is a
/// left sentinel and the last sentinel-sized span is a right sentinel.
/// The buffer base is aligned to [`SENTINEL_BYTES`], so callers that keep
/// their request sizes to multiples of an alignment up to the sentinel
/// width get naturally aligned payloads.
///
/// The arena is deliberately not `Clone`: it is the sole owner of its
/// buffer, and all use is single-threaded and synchronous. Operations
/// either complete with every invariant restored or fail without touching
/// a single sentinel.
pub struct Arena {
    /// The backing allocation. Slightly larger than the arena so the view
    /// can start at a sentinel-aligned address; never resized.
    buf: Vec<u8>,
    /// Offset into `buf` where the arena's aligned view begins.
    pad: usize,
    config: ArenaConfig,
}

impl Arena {
    /// Create an arena with the given total capacity (in bytes) and the
    /// default granule of 1.
    ///
    /// The buffer starts as a single free block spanning the whole usable
    /// region: sentinels at offset 0 and `capacity - SENTINEL_BYTES`, both
    /// set to `capacity - 2 * SENTINEL_BYTES`.
    pub fn new(capacity: usize) -> Result<Self, ArenaError> {
        Self::with_config(ArenaConfig::new(capacity))
    }

    /// Create an arena from a validated configuration.
    pub fn with_config(config: ArenaConfig) -> Result<Self, ArenaError> {
        config.validate()?;
        // A Vec<u8> only guarantees 1-byte alignment, but payloads must sit
        // at sentinel-aligned addresses. Over-allocate by one sentinel's
        // worth of slack and start the view at the first aligned byte.
        let buf = vec![0u8; config.capacity + SENTINEL_BYTES - 1];
        let addr = buf.as_ptr() as usize;
        let pad = addr.next_multiple_of(SENTINEL_BYTES) - addr;
        let mut arena = Self { buf, pad, config };
        let magnitude = encode(config.capacity - 2 * SENTINEL_BYTES, BlockState::Free);
        write_sentinel(arena.data_mut(), 0, magnitude);
        write_sentinel(arena.data_mut(), config.capacity - SENTINEL_BYTES, magnitude);
        debug_assert!(arena.valid());
        Ok(arena)
    }

    /// The arena's aligned byte view into the backing allocation.
    fn data(&self) -> &[u8] {
        &self.buf[self.pad..self.pad + self.config.capacity]
    }

    fn data_mut(&mut self) -> &mut [u8] {
        let (pad, capacity) = (self.pad, self.config.capacity);
        &mut self.buf[pad..pad + capacity]
    }

    /// Total buffer size in bytes, sentinels included.
    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    /// Minimum payload size for free fragments, in bytes.
    pub fn granule(&self) -> usize {
        self.config.granule
    }

    /// The configuration this arena was built from.
    pub fn config(&self) -> ArenaConfig {
        self.config
    }

    /// Memory usage of the backing allocation in bytes, alignment slack
    /// included.
    pub fn memory_bytes(&self) -> usize {
        self.buf.len()
    }

    /// Iterate the blocks tiling the buffer, left to right.
    pub fn blocks(&self) -> BlockWalk<'_> {
        BlockWalk::new(self.data())
    }

    /// Allocate `bytes` payload bytes with a first-fit scan.
    ///
    /// The first free block whose magnitude is at least `bytes` wins. If
    /// the leftover would be too small to hold a sentinel pair plus one
    /// granule, the entire block is handed over; otherwise the block is
    /// split and the remainder becomes a new free block. The returned
    /// payload is zeroed.
    ///
    /// Check-then-commit: no sentinel is written until a block has been
    /// selected, so a failed allocation leaves the buffer untouched.
    ///
    /// # Errors
    ///
    /// - [`ArenaError::InvalidSize`] if `bytes` is zero.
    /// - [`ArenaError::OutOfMemory`] if no free block is large enough.
    pub fn allocate(&mut self, bytes: usize) -> Result<Offset, ArenaError> {
        if bytes == 0 {
            return Err(ArenaError::InvalidSize { requested: 0 });
        }
        let target = self
            .blocks()
            .filter_map(Result::ok)
            .find(|b| b.is_free() && b.size >= bytes)
            .ok_or(ArenaError::OutOfMemory {
                requested: bytes,
                capacity: self.config.capacity,
            })?;

        let remaining = target.size - bytes;
        let taken = if remaining < 2 * SENTINEL_BYTES + self.config.granule {
            // Too small to be a usable free block: hand over the whole
            // payload rather than strand an unallocatable fragment.
            target.size
        } else {
            let free_at = target.offset + 2 * SENTINEL_BYTES + bytes;
            let free_size = remaining - 2 * SENTINEL_BYTES;
            self.write_pair(free_at, free_size, BlockState::Free);
            bytes
        };
        self.write_pair(target.offset, taken, BlockState::Allocated);
        let payload = target.payload_offset();
        self.data_mut()[payload..payload + taken].fill(0);
        debug_assert!(self.valid());
        Ok(Offset(payload))
    }

    /// Return the block at `offset` to the free list and coalesce.
    ///
    /// The block's sentinels flip to free, its payload is scrubbed to zero,
    /// and the block is merged with its right and left neighbours if they
    /// are free — a three-way merge collapses in this single call, so no
    /// two adjacent free blocks ever survive a `deallocate`.
    ///
    /// `offset` must have been returned by [`Arena::allocate`] on this
    /// arena and not yet deallocated. Violations are caught by
    /// `debug_assert!` only, mirroring the allocator contract this models.
    pub fn deallocate(&mut self, offset: Offset) {
        let left_at = offset
            .0
            .checked_sub(SENTINEL_BYTES)
            .expect("offset precedes the first sentinel");
        let raw = read_sentinel(self.data(), left_at).expect("offset outside the arena");
        let (size, state) = decode(raw);
        debug_assert_eq!(state, BlockState::Allocated, "double free at {offset}");

        self.write_pair(left_at, size, BlockState::Free);
        self.data_mut()[offset.0..offset.0 + size].fill(0);
        let mut block = Block {
            offset: left_at,
            size,
            state: BlockState::Free,
        };
        block = self.try_merge_right(block);
        self.try_merge_left(block);
        debug_assert!(self.valid());
    }

    /// Whether the sentinel bookkeeping is internally consistent.
    ///
    /// A diagnostic predicate for tests and white-box assertions — the hot
    /// paths maintain the invariants constructively and never call this
    /// outside `debug_assert!`.
    pub fn valid(&self) -> bool {
        self.verify().is_ok()
    }

    /// Walk the whole buffer and report the first inconsistency found.
    ///
    /// Checks, for every block: the left sentinel is in bounds, the implied
    /// right sentinel is in bounds, the pair matches exactly, and the
    /// magnitude is nonzero. A clean walk necessarily lands exactly on the
    /// end of the buffer.
    pub fn verify(&self) -> Result<(), SentinelFault> {
        for block in self.blocks() {
            block?;
        }
        Ok(())
    }

    /// Aggregate accounting over all blocks.
    pub fn stats(&self) -> ArenaStats {
        let mut stats = ArenaStats {
            capacity: self.config.capacity,
            free_bytes: 0,
            used_bytes: 0,
            largest_free: 0,
            block_count: 0,
            free_block_count: 0,
        };
        for block in self.blocks().filter_map(Result::ok) {
            stats.block_count += 1;
            if block.is_free() {
                stats.free_block_count += 1;
                stats.free_bytes += block.size;
                stats.largest_free = stats.largest_free.max(block.size);
            } else {
                stats.used_bytes += block.size;
            }
        }
        stats
    }

    /// Payload bytes in free blocks.
    pub fn free_bytes(&self) -> usize {
        self.stats().free_bytes
    }

    /// Payload bytes in allocated blocks.
    pub fn used_bytes(&self) -> usize {
        self.stats().used_bytes
    }

    /// Payload size of the largest free block, in bytes.
    ///
    /// The largest request that can currently succeed.
    pub fn largest_free(&self) -> usize {
        self.stats().largest_free
    }

    /// Number of blocks tiling the buffer.
    pub fn block_count(&self) -> usize {
        self.stats().block_count
    }

    /// Shared view of an allocation's payload.
    ///
    /// # Panics
    ///
    /// Panics if `offset` does not point just past a sentinel inside the
    /// buffer. Passing a stale or fabricated offset is a caller error.
    pub fn payload(&self, offset: Offset) -> &[u8] {
        let raw = read_sentinel(self.data(), offset.0 - SENTINEL_BYTES)
            .expect("offset outside the arena");
        let (size, _) = decode(raw);
        &self.data()[offset.0..offset.0 + size]
    }

    /// Mutable view of an allocation's payload.
    ///
    /// # Panics
    ///
    /// Panics if `offset` does not point just past a sentinel inside the
    /// buffer.
    pub fn payload_mut(&mut self, offset: Offset) -> &mut [u8] {
        let raw = read_sentinel(self.data(), offset.0 - SENTINEL_BYTES)
            .expect("offset outside the arena");
        let (size, _) = decode(raw);
        &mut self.data_mut()[offset.0..offset.0 + size]
    }

    /// The entire backing buffer, sentinels and all.
    ///
    /// White-box hook for tests that assert exact byte layouts (and for the
    /// round-trip property); not needed for ordinary allocation.
    pub fn as_bytes(&self) -> &[u8] {
        self.data()
    }

    /// Write a matching sentinel pair bounding a `size`-byte payload at
    /// block offset `at`.
    fn write_pair(&mut self, at: usize, size: usize, state: BlockState) {
        let raw = encode(size, state);
        write_sentinel(self.data_mut(), at, raw);
        write_sentinel(self.data_mut(), at + SENTINEL_BYTES + size, raw);
    }

    /// Merge `block` with its right neighbour if that neighbour is free.
    /// Returns the (possibly grown) block.
    fn try_merge_right(&mut self, block: Block) -> Block {
        let Some(raw) = read_sentinel(self.data(), block.end()) else {
            return block; // last block in the buffer
        };
        let (right_size, state) = decode(raw);
        if state == BlockState::Allocated {
            return block;
        }
        // The absorbed pair (this block's right sentinel and the
        // neighbour's left) is contiguous; scrub it with the payload.
        let interior = block.right_sentinel_offset();
        self.data_mut()[interior..interior + 2 * SENTINEL_BYTES].fill(0);
        let merged = Block {
            offset: block.offset,
            size: block.size + 2 * SENTINEL_BYTES + right_size,
            state: BlockState::Free,
        };
        self.write_pair(merged.offset, merged.size, BlockState::Free);
        merged
    }

    /// Merge `block` with its left neighbour if that neighbour is free.
    /// Returns the (possibly grown) block.
    fn try_merge_left(&mut self, block: Block) -> Block {
        if block.offset == 0 {
            return block; // first block in the buffer
        }
        let neighbour_right = block.offset - SENTINEL_BYTES;
        let raw = read_sentinel(self.data(), neighbour_right)
            .expect("interior sentinel is always in bounds");
        let (left_size, state) = decode(raw);
        if state == BlockState::Allocated {
            return block;
        }
        let merged = Block {
            offset: block.offset - 2 * SENTINEL_BYTES - left_size,
            size: left_size + 2 * SENTINEL_BYTES + block.size,
            state: BlockState::Free,
        };
        self.data_mut()[neighbour_right..neighbour_right + 2 * SENTINEL_BYTES].fill(0);
        self.write_pair(merged.offset, merged.size, BlockState::Free);
        merged
    }
}

impl fmt::Debug for Arena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.stats();
        f.debug_struct("Arena")
            .field("capacity", &stats.capacity)
            .field("free_bytes", &stats.free_bytes)
            .field("used_bytes", &stats.used_bytes)
            .field("block_count", &stats.block_count)
            .finish()
    }
}
