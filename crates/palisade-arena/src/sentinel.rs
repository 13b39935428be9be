//! Sentinel encoding and the two byte-reinterpretation points.
//!
//! A sentinel is a native-endian `i32` stored at a fixed byte offset in the
//! arena buffer. Its magnitude is the number of usable payload bytes in the
//! block it bounds; its sign is the block state (negative = allocated,
//! non-negative = free). Every block is bounded by two sentinels with
//! identical value, one immediately before the payload and one immediately
//! after.
//!
//! All byte reinterpretation in the crate is confined to [`read_sentinel`]
//! and [`write_sentinel`], both bounds-checked slice operations — no raw
//! pointer casts anywhere.

/// Width of a single sentinel in bytes.
pub const SENTINEL_BYTES: usize = std::mem::size_of::<i32>();

/// State of a sentinel-delimited block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockState {
    /// The block's payload is available for allocation.
    Free,
    /// The block's payload belongs to a live allocation.
    Allocated,
}

/// Read the sentinel at byte offset `at`.
///
/// Returns `None` if the sentinel would not fit within the buffer. This is
/// the fallible read used by the block walk, which must survive arbitrary
/// corruption without panicking.
pub(crate) fn read_sentinel(buf: &[u8], at: usize) -> Option<i32> {
    let bytes = buf.get(at..at.checked_add(SENTINEL_BYTES)?)?;
    // Slice length is checked above, so try_into cannot fail.
    Some(i32::from_ne_bytes(bytes.try_into().ok()?))
}

/// Write `value` as the sentinel at byte offset `at`.
///
/// # Panics
///
/// Panics if the sentinel would not fit within the buffer. Writes only
/// happen at offsets the arena has already validated, so a panic here is
/// an internal invariant violation, not a caller error.
pub(crate) fn write_sentinel(buf: &mut [u8], at: usize, value: i32) {
    buf[at..at + SENTINEL_BYTES].copy_from_slice(&value.to_ne_bytes());
}

/// Encode a payload size and state into a raw sentinel value.
pub(crate) fn encode(size: usize, state: BlockState) -> i32 {
    let magnitude = size as i32;
    match state {
        BlockState::Free => magnitude,
        BlockState::Allocated => -magnitude,
    }
}

/// Decode a raw sentinel value into payload size and state.
pub(crate) fn decode(raw: i32) -> (usize, BlockState) {
    if raw < 0 {
        (raw.unsigned_abs() as usize, BlockState::Allocated)
    } else {
        (raw as usize, BlockState::Free)
    }
}
