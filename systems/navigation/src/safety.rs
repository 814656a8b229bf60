use std::collections::VecDeque;

use torus_snake_core::{
    BodyView, Cell, Direction, GridTopology, ObstacleSet, TailPolicy, TopologyError,
};

use crate::BlockedCells;

/// Depth cap applied to the flood fill when none is configured.
pub const DEFAULT_FLOOD_DEPTH: u32 = 15;

/// Order in which candidate moves are evaluated; earlier entries win ties.
pub const SAFETY_PRIORITY: [Direction; 4] = [
    Direction::North,
    Direction::South,
    Direction::West,
    Direction::East,
];

/// Direction reported when every neighbor of the head is blocked.
pub const ENCLOSED_FALLBACK: Direction = Direction::East;

/// Outcome of the free-space fallback heuristic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SafeDirection {
    /// A free neighbor exists; `direction` leads to the largest open region.
    Open {
        /// Move with the most locally reachable free space.
        direction: Direction,
        /// Number of cells reachable from the chosen neighbor within the depth cap.
        reachable: usize,
    },
    /// All four neighbors are blocked. The next step collides regardless of
    /// the direction taken; callers must treat this as an impending loss.
    Enclosed {
        /// Direction emitted so the movement layer still receives a heading.
        fallback: Direction,
    },
}

impl SafeDirection {
    /// Direction to emit for this outcome.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        match self {
            Self::Open { direction, .. } => *direction,
            Self::Enclosed { fallback } => *fallback,
        }
    }
}

/// Picks the neighboring move that maximizes locally reachable free space.
///
/// Used when no route to the goal exists. Each free neighbor of `head` is
/// scored with a flood fill limited to `max_depth` steps that treats obstacles
/// and every body segment, head included, as impassable.
pub fn safest_direction(
    topology: &GridTopology,
    obstacles: &ObstacleSet,
    body: &BodyView,
    tail_policy: TailPolicy,
    head: Cell,
    max_depth: u32,
) -> Result<SafeDirection, TopologyError> {
    let head = topology.ensure_contains(head)?;
    let mut blocked = BlockedCells::for_agent(topology, obstacles, body, tail_policy);
    blocked.block(head);

    let mut best: Option<(Direction, usize)> = None;
    for direction in SAFETY_PRIORITY {
        let neighbor = topology.step(head, direction);
        if blocked.is_blocked(neighbor) {
            continue;
        }

        let reachable = reachable_space(&blocked, neighbor, max_depth);
        match best {
            Some((_, space)) if space >= reachable => {}
            _ => best = Some((direction, reachable)),
        }
    }

    Ok(match best {
        Some((direction, reachable)) => SafeDirection::Open {
            direction,
            reachable,
        },
        None => SafeDirection::Enclosed {
            fallback: ENCLOSED_FALLBACK,
        },
    })
}

/// Counts free cells reachable from `start` in fewer than `max_depth` steps.
///
/// The start cell itself counts as depth zero. A zero depth cap still counts
/// the start so every free neighbor scores at least one.
#[must_use]
pub fn reachable_space(blocked: &BlockedCells, start: Cell, max_depth: u32) -> usize {
    let topology = *blocked.topology();
    if blocked.is_blocked(start) {
        return 0;
    }

    let depth_cap = max_depth.max(1);
    let mut visited = vec![false; topology.cell_count()];
    let mut queue = VecDeque::new();
    let mut count = 0;

    if let Some(index) = topology.index(start) {
        visited[index] = true;
        queue.push_back((start, 0_u32));
    }

    while let Some((cell, depth)) = queue.pop_front() {
        count += 1;
        if depth + 1 >= depth_cap {
            continue;
        }

        for neighbor in topology.neighbors(cell) {
            if blocked.is_blocked(neighbor) {
                continue;
            }
            let Some(index) = topology.index(neighbor) else {
                continue;
            };
            if visited[index] {
                continue;
            }
            visited[index] = true;
            queue.push_back((neighbor, depth + 1));
        }
    }

    count
}
