//! Lazy, restartable walk over an arena's sentinel-delimited blocks.
//!
//! [`BlockWalk`] is the single traversal primitive in the crate: the
//! first-fit scan in `allocate`, the `valid`/`verify` diagnostics, and the
//! stats accounting all iterate the same way. The walk reads a left
//! sentinel, computes the implied right-sentinel offset, checks the pair
//! matches, and advances to the next block. It never panics: corruption is
//! reported as a [`SentinelFault`] item and ends the iteration.

use std::error::Error;
use std::fmt;

use crate::sentinel::{decode, read_sentinel, BlockState, SENTINEL_BYTES};

/// A sentinel-delimited block as seen by the walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Block {
    /// Byte offset of the block's left sentinel.
    pub offset: usize,
    /// Usable payload size in bytes (the sentinel magnitude).
    pub size: usize,
    /// Whether the block is free or allocated.
    pub state: BlockState,
}

impl Block {
    /// Byte offset of the first payload byte, just past the left sentinel.
    pub fn payload_offset(&self) -> usize {
        self.offset + SENTINEL_BYTES
    }

    /// Byte offset of the block's right sentinel.
    pub fn right_sentinel_offset(&self) -> usize {
        self.offset + SENTINEL_BYTES + self.size
    }

    /// Total bytes the block occupies, both sentinels included.
    pub fn span(&self) -> usize {
        self.size + 2 * SENTINEL_BYTES
    }

    /// Byte offset one past the block's right sentinel — the next block's
    /// left sentinel, or the end of the buffer for the last block.
    pub fn end(&self) -> usize {
        self.offset + self.span()
    }

    /// Whether the block is free.
    pub fn is_free(&self) -> bool {
        self.state == BlockState::Free
    }
}

/// A sentinel bookkeeping inconsistency found during a walk.
///
/// Faults carry the byte offsets and raw values involved so corruption
/// reports pinpoint the failing block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SentinelFault {
    /// A left sentinel would extend past the end of the buffer.
    TruncatedSentinel {
        /// Offset where the sentinel was expected.
        offset: usize,
    },
    /// A block's implied right sentinel lies outside the buffer.
    BlockOverrun {
        /// Offset of the block's left sentinel.
        offset: usize,
        /// Magnitude read from the left sentinel.
        size: usize,
    },
    /// A sentinel with magnitude zero. The arena never creates zero-size
    /// blocks (requests and fragments are at least one granule), so a zero
    /// magnitude means the bookkeeping has been overwritten.
    ZeroSizeBlock {
        /// Offset of the zero-magnitude left sentinel.
        offset: usize,
    },
    /// Left and right sentinel values disagree in sign or magnitude.
    MismatchedPair {
        /// Offset of the block's left sentinel.
        offset: usize,
        /// Raw left sentinel value.
        left: i32,
        /// Raw right sentinel value.
        right: i32,
    },
}

impl fmt::Display for SentinelFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TruncatedSentinel { offset } => {
                write!(f, "truncated sentinel at offset {offset}")
            }
            Self::BlockOverrun { offset, size } => {
                write!(
                    f,
                    "block at offset {offset} with size {size} overruns the buffer"
                )
            }
            Self::ZeroSizeBlock { offset } => {
                write!(f, "zero-size block at offset {offset}")
            }
            Self::MismatchedPair {
                offset,
                left,
                right,
            } => {
                write!(
                    f,
                    "mismatched sentinel pair at offset {offset}: left {left}, right {right}"
                )
            }
        }
    }
}

impl Error for SentinelFault {}

/// Iterator over the blocks tiling an arena buffer.
///
/// Yields `Ok(Block)` for each well-formed block from offset 0 upward.
/// On the first inconsistency it yields one `Err(SentinelFault)` and then
/// terminates. A fault-free walk is guaranteed to land exactly on the end
/// of the buffer, since every advance is bounds-checked.
pub struct BlockWalk<'a> {
    buf: &'a [u8],
    pos: usize,
    faulted: bool,
}

impl<'a> BlockWalk<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            pos: 0,
            faulted: false,
        }
    }
}

impl Iterator for BlockWalk<'_> {
    type Item = Result<Block, SentinelFault>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.faulted || self.pos == self.buf.len() {
            return None;
        }
        let offset = self.pos;
        let Some(left) = read_sentinel(self.buf, offset) else {
            self.faulted = true;
            return Some(Err(SentinelFault::TruncatedSentinel { offset }));
        };
        let (size, state) = decode(left);
        if size == 0 {
            self.faulted = true;
            return Some(Err(SentinelFault::ZeroSizeBlock { offset }));
        }
        let Some(right) = read_sentinel(self.buf, offset + SENTINEL_BYTES + size) else {
            self.faulted = true;
            return Some(Err(SentinelFault::BlockOverrun { offset, size }));
        };
        if right != left {
            self.faulted = true;
            return Some(Err(SentinelFault::MismatchedPair {
                offset,
                left,
                right,
            }));
        }
        self.pos = offset + 2 * SENTINEL_BYTES + size;
        Some(Ok(Block {
            offset,
            size,
            state,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentinel::write_sentinel;

    /// Hand-assemble a buffer from (size, state) block descriptions.
    fn build(capacity: usize, blocks: &[(usize, BlockState)]) -> Vec<u8> {
        let mut buf = vec![0u8; capacity];
        let mut pos = 0;
        for &(size, state) in blocks {
            let raw = crate::sentinel::encode(size, state);
            write_sentinel(&mut buf, pos, raw);
            write_sentinel(&mut buf, pos + SENTINEL_BYTES + size, raw);
            pos += 2 * SENTINEL_BYTES + size;
        }
        assert_eq!(pos, capacity, "blocks must tile the buffer exactly");
        buf
    }

    #[test]
    fn single_free_block_walks_cleanly() {
        let buf = build(100, &[(92, BlockState::Free)]);
        let blocks: Vec<_> = BlockWalk::new(&buf).collect::<Result<_, _>>().unwrap();
        assert_eq!(
            blocks,
            vec![Block {
                offset: 0,
                size: 92,
                state: BlockState::Free,
            }]
        );
    }

    #[test]
    fn mixed_blocks_report_offsets_and_states() {
        let buf = build(
            100,
            &[
                (20, BlockState::Allocated),
                (10, BlockState::Free),
                (46, BlockState::Allocated),
            ],
        );
        let blocks: Vec<_> = BlockWalk::new(&buf).collect::<Result<_, _>>().unwrap();
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].payload_offset(), 4);
        assert_eq!(blocks[1].offset, 28);
        assert!(blocks[1].is_free());
        assert_eq!(blocks[2].end(), 100);
    }

    #[test]
    fn mismatched_pair_is_reported_once() {
        let mut buf = build(100, &[(92, BlockState::Free)]);
        write_sentinel(&mut buf, 96, -92);
        let mut walk = BlockWalk::new(&buf);
        assert_eq!(
            walk.next(),
            Some(Err(SentinelFault::MismatchedPair {
                offset: 0,
                left: 92,
                right: -92,
            }))
        );
        assert_eq!(walk.next(), None);
    }

    #[test]
    fn oversized_magnitude_is_an_overrun() {
        let mut buf = vec![0u8; 100];
        write_sentinel(&mut buf, 0, 500);
        assert_eq!(
            BlockWalk::new(&buf).next(),
            Some(Err(SentinelFault::BlockOverrun {
                offset: 0,
                size: 500,
            }))
        );
    }

    #[test]
    fn trailing_bytes_fault_instead_of_landing_short() {
        // 100-byte buffer where the single block only covers 98 bytes:
        // the 2 leftover bytes cannot hold a sentinel.
        let mut buf = vec![0u8; 100];
        write_sentinel(&mut buf, 0, 90);
        write_sentinel(&mut buf, 94, 90);
        let faults: Vec<_> = BlockWalk::new(&buf).filter_map(Result::err).collect();
        assert_eq!(faults, vec![SentinelFault::TruncatedSentinel { offset: 98 }]);
    }

    #[test]
    fn zeroed_buffer_is_not_a_clean_walk() {
        let buf = vec![0u8; 16];
        assert_eq!(
            BlockWalk::new(&buf).next(),
            Some(Err(SentinelFault::ZeroSizeBlock { offset: 0 }))
        );
    }

    #[test]
    fn span_accounts_for_both_sentinels() {
        let b = Block {
            offset: 28,
            size: 64,
            state: BlockState::Free,
        };
        assert_eq!(b.span(), 72);
        assert_eq!(b.right_sentinel_offset(), 96);
        assert_eq!(b.end(), 100);
    }
}
