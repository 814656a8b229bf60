use std::{cmp::Reverse, collections::BinaryHeap};

use torus_snake_core::{BodyView, Cell, GridTopology, ObstacleSet, TailPolicy, TopologyError};

use crate::BlockedCells;

/// Cost of a single step between neighboring cells.
const STEP_COST: u32 = 1;

/// Ordered, non-empty sequence of cells leading from the cell after the start
/// up to and including the goal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route {
    cells: Vec<Cell>,
}

impl Route {
    /// Cell the agent should enter next.
    #[must_use]
    pub fn next_cell(&self) -> Cell {
        self.cells[0]
    }

    /// Final cell of the route.
    #[must_use]
    pub fn goal(&self) -> Cell {
        self.cells[self.cells.len() - 1]
    }

    /// Number of steps required to reach the goal.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always `false`; a route contains at least the goal.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cells of the route in travel order.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Drops the first step, returning the remainder when any cell is left.
    #[must_use]
    pub fn advance(mut self) -> Option<Route> {
        if self.cells.len() <= 1 {
            return None;
        }
        let _ = self.cells.remove(0);
        Some(self)
    }
}

/// Result of a shortest-path query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathOutcome {
    /// A minimum-hop route to the goal.
    Found(Route),
    /// The frontier emptied without reaching the goal.
    NoPath,
    /// The start already equals the goal, so no step is required.
    Arrived,
}

impl PathOutcome {
    /// Route carried by the outcome, if any.
    #[must_use]
    pub fn route(&self) -> Option<&Route> {
        match self {
            Self::Found(route) => Some(route),
            Self::NoPath | Self::Arrived => None,
        }
    }
}

/// Computes a minimum-hop route from `start` to `goal` for the snake.
///
/// Obstacles and the body (minus the head, and minus the tail under
/// [`TailPolicy::Vacates`]) are impassable. Failing to reach the goal is an
/// ordinary [`PathOutcome::NoPath`]; only out-of-bounds endpoints are errors.
pub fn shortest_path(
    topology: &GridTopology,
    obstacles: &ObstacleSet,
    body: &BodyView,
    tail_policy: TailPolicy,
    start: Cell,
    goal: Cell,
) -> Result<PathOutcome, TopologyError> {
    let blocked = BlockedCells::for_agent(topology, obstacles, body, tail_policy);
    shortest_path_within(&blocked, start, goal)
}

/// Uniform-cost search over a prepared mask.
///
/// Frontier entries with equal cost are expanded in insertion order, which
/// keeps route reconstruction stable across runs with identical input.
pub fn shortest_path_within(
    blocked: &BlockedCells,
    start: Cell,
    goal: Cell,
) -> Result<PathOutcome, TopologyError> {
    let topology = *blocked.topology();
    let start = topology.ensure_contains(start)?;
    let goal = topology.ensure_contains(goal)?;

    if start == goal {
        return Ok(PathOutcome::Arrived);
    }

    let mut search = SearchState::new(&topology);
    search.discover(&topology, start, None, 0);

    while let Some(Reverse(entry)) = search.frontier.pop() {
        let Some(index) = topology.index(entry.cell) else {
            continue;
        };
        if search.settled[index] {
            continue;
        }
        search.settled[index] = true;

        if entry.cell == goal {
            return Ok(PathOutcome::Found(search.reconstruct(&topology, start, goal)));
        }

        let next_cost = entry.cost.saturating_add(STEP_COST);
        for neighbor in topology.neighbors(entry.cell) {
            if neighbor != goal && blocked.is_blocked(neighbor) {
                continue;
            }
            search.discover(&topology, neighbor, Some(entry.cell), next_cost);
        }
    }

    Ok(PathOutcome::NoPath)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct FrontierEntry {
    cost: u32,
    order: u64,
    cell: Cell,
}

/// Per-call search workspace; never shared between queries.
#[derive(Debug)]
struct SearchState {
    frontier: BinaryHeap<Reverse<FrontierEntry>>,
    best_cost: Vec<u32>,
    came_from: Vec<Option<Cell>>,
    settled: Vec<bool>,
    next_order: u64,
}

impl SearchState {
    fn new(topology: &GridTopology) -> Self {
        let cells = topology.cell_count();
        Self {
            frontier: BinaryHeap::new(),
            best_cost: vec![u32::MAX; cells],
            came_from: vec![None; cells],
            settled: vec![false; cells],
            next_order: 0,
        }
    }

    fn discover(&mut self, topology: &GridTopology, cell: Cell, parent: Option<Cell>, cost: u32) {
        let Some(index) = topology.index(cell) else {
            return;
        };
        if self.settled[index] || self.best_cost[index] <= cost {
            return;
        }

        self.best_cost[index] = cost;
        self.came_from[index] = parent;
        self.frontier.push(Reverse(FrontierEntry {
            cost,
            order: self.next_order,
            cell,
        }));
        self.next_order += 1;
    }

    fn reconstruct(&self, topology: &GridTopology, start: Cell, goal: Cell) -> Route {
        let mut cells = Vec::new();
        let mut cursor = goal;
        while cursor != start {
            cells.push(cursor);
            match topology
                .index(cursor)
                .and_then(|index| self.came_from[index])
            {
                Some(parent) => cursor = parent,
                None => break,
            }
        }
        cells.reverse();
        Route { cells }
    }
}
