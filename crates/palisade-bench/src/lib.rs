//! Benchmark profiles and workload generators for the palisade allocator.
//!
//! Provides deterministic alloc/free workloads so benchmark runs are
//! reproducible without pulling an RNG into the bench harness:
//!
//! - [`churn_workload`]: seeded alloc/free op sequence
//! - [`run_churn`]: replay a workload against an arena
//! - [`fragmented_arena`]: an arena with alternating allocated/free holes

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use palisade_arena::{Arena, Offset};

/// One step of a churn workload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChurnOp {
    /// Allocate this many payload bytes.
    Allocate(usize),
    /// Free the live allocation at this index (modulo the live count).
    Free(usize),
}

/// Generate a deterministic alloc/free workload.
///
/// Uses a simple LCG over the seed, roughly 60% allocations of 1–128
/// bytes and 40% frees. The same seed always yields the same ops.
pub fn churn_workload(seed: u64, steps: usize) -> Vec<ChurnOp> {
    let mut ops = Vec::with_capacity(steps);
    let mut state = seed;
    for _ in 0..steps {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let roll = (state >> 33) as usize;
        if roll % 100 < 40 {
            ops.push(ChurnOp::Free(roll >> 7));
        } else {
            ops.push(ChurnOp::Allocate(1 + (roll >> 7) % 128));
        }
    }
    ops
}

/// Replay a churn workload against an arena.
///
/// Frees with no live allocation to target, and allocations that do not
/// fit, are skipped — the workload is a pressure profile, not a script
/// that must succeed. Returns the number of operations that took effect.
pub fn run_churn(arena: &mut Arena, ops: &[ChurnOp]) -> usize {
    let mut live: Vec<Offset> = Vec::new();
    let mut applied = 0;
    for &op in ops {
        match op {
            ChurnOp::Allocate(bytes) => {
                if let Ok(offset) = arena.allocate(bytes) {
                    live.push(offset);
                    applied += 1;
                }
            }
            ChurnOp::Free(slot) => {
                if !live.is_empty() {
                    let offset = live.swap_remove(slot % live.len());
                    arena.deallocate(offset);
                    applied += 1;
                }
            }
        }
    }
    applied
}

/// Build an arena with alternating allocated and freed blocks, so first-fit
/// scans have many holes to step over.
///
/// Allocates `2 * holes` fixed-size blocks and frees every other one
/// (non-adjacent, so coalescing cannot collapse the holes).
pub fn fragmented_arena(capacity: usize, holes: usize) -> Arena {
    let mut arena = Arena::new(capacity).expect("bench capacity is valid");
    let mut offsets = Vec::with_capacity(2 * holes);
    for _ in 0..2 * holes {
        offsets.push(arena.allocate(16).expect("bench capacity fits all blocks"));
    }
    for pair in offsets.chunks(2) {
        arena.deallocate(pair[0]);
    }
    arena
}
