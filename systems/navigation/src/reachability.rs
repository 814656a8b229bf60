use std::collections::VecDeque;

use torus_snake_core::{Cell, GridTopology, ObstacleSet, TopologyError};

use crate::BlockedCells;

/// Reports whether any route links `start` and `goal`.
///
/// Cells in `obstacles` or `extra_blocked` are impassable, except that the
/// goal itself is always accepted as a destination. Out-of-bounds endpoints
/// are contract violations.
pub fn exists_path(
    topology: &GridTopology,
    obstacles: &ObstacleSet,
    extra_blocked: &[Cell],
    start: Cell,
    goal: Cell,
) -> Result<bool, TopologyError> {
    let blocked = BlockedCells::with_extra(topology, obstacles, extra_blocked.iter().copied());
    exists_path_within(&blocked, start, goal)
}

/// Breadth-first reachability over a prepared mask.
pub fn exists_path_within(
    blocked: &BlockedCells,
    start: Cell,
    goal: Cell,
) -> Result<bool, TopologyError> {
    let topology = *blocked.topology();
    let start = topology.ensure_contains(start)?;
    let goal = topology.ensure_contains(goal)?;

    if start == goal {
        return Ok(true);
    }

    let mut visited = vec![false; topology.cell_count()];
    let mut queue = VecDeque::new();
    let _ = mark(&topology, &mut visited, start);
    queue.push_back(start);

    while let Some(cell) = queue.pop_front() {
        if cell == goal {
            return Ok(true);
        }

        for neighbor in topology.neighbors(cell) {
            if neighbor != goal && blocked.is_blocked(neighbor) {
                continue;
            }
            if mark(&topology, &mut visited, neighbor) {
                queue.push_back(neighbor);
            }
        }
    }

    Ok(false)
}

/// Flags the cell as visited, returning `true` on the first visit.
fn mark(topology: &GridTopology, visited: &mut [bool], cell: Cell) -> bool {
    match topology.index(cell).and_then(|index| visited.get_mut(index)) {
        Some(slot) if !*slot => {
            *slot = true;
            true
        }
        _ => false,
    }
}
