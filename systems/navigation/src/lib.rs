#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic search primitives over the toroidal board.
//!
//! Every entry point takes immutable snapshots of the obstacle layout and the
//! snake body for the duration of a single call and never mutates them, so
//! independent boards may be searched in parallel without synchronization.

mod blocked;
mod pathfinding;
mod reachability;
mod safety;

pub use blocked::BlockedCells;
pub use pathfinding::{shortest_path, shortest_path_within, PathOutcome, Route};
pub use reachability::{exists_path, exists_path_within};
pub use safety::{
    reachable_space, safest_direction, SafeDirection, DEFAULT_FLOOD_DEPTH, ENCLOSED_FALLBACK,
    SAFETY_PRIORITY,
};
