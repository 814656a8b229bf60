#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Torus Snake engine.
//!
//! This crate defines the geometry of the wrap-around board and the message
//! surface that connects adapters, the authoritative world, and pure systems.
//! Adapters submit [`Command`] values describing desired mutations, the world
//! executes those commands via its `apply` entry point, and then broadcasts
//! [`Event`] values for systems to react to deterministically. Systems consume
//! event streams, query immutable snapshots, and respond exclusively with new
//! command batches.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest permitted extent along either axis of a board.
///
/// Below three cells a step and its opposite step can land on the same
/// neighbor, so the 4-neighborhood would no longer be distinct.
pub const MIN_GRID_EXTENT: u32 = 3;

/// Columns of the board used until one is configured.
pub const DEFAULT_COLUMNS: u32 = 30;

/// Rows of the board used until one is configured.
pub const DEFAULT_ROWS: u32 = 20;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Rebuilds the board with the provided dimensions and resets the snake.
    ConfigureBoard {
        /// Number of columns in the toroidal lattice.
        columns: u32,
        /// Number of rows in the toroidal lattice.
        rows: u32,
        /// Seed driving food placement.
        seed: u64,
    },
    /// Requests that the snake head toward the provided direction on the next tick.
    Steer {
        /// Heading the snake should adopt.
        direction: Direction,
    },
    /// Advances the snake by a single cell along its current heading.
    Tick,
    /// Replaces every obstacle on the board with the provided set.
    ReplaceObstacles {
        /// Complete replacement obstacle layout.
        obstacles: ObstacleSet,
    },
    /// Flips the blocked state of a single cell.
    ToggleObstacle {
        /// Cell whose blocked state should be inverted.
        cell: Cell,
    },
    /// Moves the food to a fresh free cell.
    RespawnFood,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a new board was configured and the snake was reset.
    BoardConfigured {
        /// Geometry of the freshly configured board.
        topology: GridTopology,
    },
    /// Reports that a board configuration request was rejected.
    BoardRejected {
        /// Specific reason the configuration failed.
        reason: TopologyError,
    },
    /// Reports that a tick arrived after the game had ended.
    TickRejected,
    /// Indicates that a decision tick elapsed.
    TimeAdvanced {
        /// Monotonic index of the tick that just completed.
        tick: u64,
    },
    /// Confirms that the snake head moved between two cells.
    SnakeAdvanced {
        /// Cell the head occupied before moving.
        from: Cell,
        /// Cell the head occupies after moving.
        to: Cell,
        /// Heading used for the step.
        direction: Direction,
    },
    /// Confirms that the snake consumed the food.
    FoodConsumed {
        /// Cell that held the food.
        cell: Cell,
        /// Score after consumption.
        score: u32,
    },
    /// Announces the cell now holding the food.
    FoodPlaced {
        /// Cell that holds the food.
        cell: Cell,
    },
    /// Reports that no free cell remained for the food.
    FoodUnplaceable,
    /// Reports that the snake head entered a blocked cell and the game ended.
    SnakeCollided {
        /// Cell the head entered.
        cell: Cell,
        /// What occupied the cell.
        cause: CollisionCause,
    },
    /// Confirms that the obstacle layout was replaced.
    ObstaclesReplaced {
        /// Number of blocked cells in the new layout.
        count: usize,
    },
    /// Confirms that a single obstacle cell was flipped.
    ObstacleToggled {
        /// Cell whose state changed.
        cell: Cell,
        /// Whether the cell is blocked after the edit.
        blocked: bool,
    },
    /// Reports that an obstacle edit was rejected.
    ObstacleEditRejected {
        /// Cell targeted by the edit.
        cell: Cell,
        /// Specific reason the edit failed.
        reason: EditError,
    },
}

/// Occupant responsible for ending the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CollisionCause {
    /// The head entered an obstacle cell.
    Obstacle,
    /// The head entered a cell held by its own body.
    Body,
}

/// Reasons an obstacle edit may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EditError {
    /// The cell lies outside the configured board.
    OutOfBounds,
    /// The cell holds part of the snake or the food.
    Protected,
    /// The game already ended.
    GameOver,
}

/// Contract violations raised by geometry queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum TopologyError {
    /// The requested board is smaller than [`MIN_GRID_EXTENT`] along an axis.
    #[error("grid {columns}x{rows} is smaller than the 3x3 minimum")]
    GridTooSmall {
        /// Requested column count.
        columns: u32,
        /// Requested row count.
        rows: u32,
    },
    /// A cell lies outside the lattice.
    #[error("cell {cell} lies outside the {columns}x{rows} grid")]
    OutOfBounds {
        /// Offending cell.
        cell: Cell,
        /// Column count of the lattice.
        columns: u32,
        /// Row count of the lattice.
        rows: u32,
    },
    /// Two cells were expected to be neighbors but are not.
    #[error("cells {from} and {to} are not adjacent")]
    NotAdjacent {
        /// Origin cell.
        from: Cell,
        /// Destination cell.
        to: Cell,
    },
    /// A body snapshot contained no cells.
    #[error("body snapshot is empty")]
    EmptyBody,
}

/// Cardinal movement directions over the 4-neighborhood.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Every direction in neighbor enumeration order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Column and row delta applied by a single step.
    #[must_use]
    pub const fn offset(self) -> (i64, i64) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }

    /// Direction that reverses this one.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    column: u32,
    row: u32,
}

impl Cell {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Fixed-size toroidal lattice.
///
/// Every coordinate pair wraps onto the board, so each cell has exactly four
/// distinct neighbors and there are no boundary cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridTopology {
    columns: u32,
    rows: u32,
}

impl Default for GridTopology {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS,
            rows: DEFAULT_ROWS,
        }
    }
}

impl GridTopology {
    /// Creates a new topology, rejecting boards smaller than 3x3.
    pub fn new(columns: u32, rows: u32) -> Result<Self, TopologyError> {
        if columns < MIN_GRID_EXTENT || rows < MIN_GRID_EXTENT {
            return Err(TopologyError::GridTooSmall { columns, rows });
        }

        Ok(Self { columns, rows })
    }

    /// Number of columns in the lattice.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the lattice.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Total number of cells on the board.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        let count = u64::from(self.columns) * u64::from(self.rows);
        usize::try_from(count).unwrap_or(usize::MAX)
    }

    /// Normalizes any integer pair into the lattice.
    #[must_use]
    pub fn wrap(&self, x: i64, y: i64) -> Cell {
        let column = x.rem_euclid(i64::from(self.columns));
        let row = y.rem_euclid(i64::from(self.rows));
        Cell::new(column as u32, row as u32)
    }

    /// Reports whether the cell lies inside the lattice.
    #[must_use]
    pub const fn contains(&self, cell: Cell) -> bool {
        cell.column < self.columns && cell.row < self.rows
    }

    /// Returns the cell unchanged when it lies inside the lattice.
    pub fn ensure_contains(&self, cell: Cell) -> Result<Cell, TopologyError> {
        if self.contains(cell) {
            Ok(cell)
        } else {
            Err(TopologyError::OutOfBounds {
                cell,
                columns: self.columns,
                rows: self.rows,
            })
        }
    }

    /// Cell reached by moving one step from `cell`, wrapped onto the board.
    #[must_use]
    pub fn step(&self, cell: Cell, direction: Direction) -> Cell {
        let (dx, dy) = direction.offset();
        self.wrap(i64::from(cell.column) + dx, i64::from(cell.row) + dy)
    }

    /// The four neighbors of `cell` in [`Direction::ALL`] order.
    #[must_use]
    pub fn neighbors(&self, cell: Cell) -> [Cell; 4] {
        Direction::ALL.map(|direction| self.step(cell, direction))
    }

    /// Direction whose single wrapped step from `from` lands on `to`.
    pub fn direction_between(&self, from: Cell, to: Cell) -> Result<Direction, TopologyError> {
        Direction::ALL
            .into_iter()
            .find(|direction| self.step(from, *direction) == to)
            .ok_or(TopologyError::NotAdjacent { from, to })
    }

    /// Row-major dense index of the cell, if it lies inside the lattice.
    #[must_use]
    pub fn index(&self, cell: Cell) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }

        let column = usize::try_from(cell.column).ok()?;
        let row = usize::try_from(cell.row).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }

    /// Iterator over every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> {
        let columns = self.columns;
        (0..self.rows).flat_map(move |row| (0..columns).map(move |column| Cell::new(column, row)))
    }
}

/// Mutable collection of blocked cells owned by the board.
///
/// Iteration is ordered by cell so every consumer observes the same sequence.
/// The revision counter advances on every mutation, which lets cached routes
/// detect that the layout changed underneath them.
#[derive(Clone, Debug, Default)]
pub struct ObstacleSet {
    cells: BTreeSet<Cell>,
    revision: u64,
}

impl ObstacleSet {
    /// Creates an empty obstacle set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports whether the cell is blocked.
    #[must_use]
    pub fn contains(&self, cell: Cell) -> bool {
        self.cells.contains(&cell)
    }

    /// Number of blocked cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether no cell is blocked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterator over the blocked cells in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells.iter().copied()
    }

    /// Counter that advances on every mutation.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Blocks the cell, returning `true` when it was previously free.
    pub fn insert(&mut self, cell: Cell) -> bool {
        let inserted = self.cells.insert(cell);
        if inserted {
            self.bump();
        }
        inserted
    }

    /// Frees the cell, returning `true` when it was previously blocked.
    pub fn remove(&mut self, cell: Cell) -> bool {
        let removed = self.cells.remove(&cell);
        if removed {
            self.bump();
        }
        removed
    }

    /// Flips the blocked state of the cell and reports whether it is now blocked.
    pub fn toggle(&mut self, cell: Cell) -> bool {
        if self.remove(cell) {
            false
        } else {
            self.insert(cell)
        }
    }

    /// Keeps only the cells for which the predicate holds.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(Cell) -> bool,
    {
        let before = self.cells.len();
        self.cells.retain(|cell| keep(*cell));
        if self.cells.len() != before {
            self.bump();
        }
    }

    /// Replaces the whole layout in bulk.
    pub fn replace(&mut self, other: ObstacleSet) {
        self.cells = other.cells;
        self.bump();
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

impl PartialEq for ObstacleSet {
    fn eq(&self, other: &Self) -> bool {
        self.cells == other.cells
    }
}

impl Eq for ObstacleSet {}

impl FromIterator<Cell> for ObstacleSet {
    fn from_iter<I: IntoIterator<Item = Cell>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
            revision: 0,
        }
    }
}

/// Read-only, head-first snapshot of the cells held by the snake.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BodyView {
    cells: Vec<Cell>,
}

impl BodyView {
    /// Captures a body snapshot, validating bounds and contiguity.
    pub fn new(topology: &GridTopology, cells: Vec<Cell>) -> Result<Self, TopologyError> {
        if cells.is_empty() {
            return Err(TopologyError::EmptyBody);
        }

        for cell in &cells {
            let _ = topology.ensure_contains(*cell)?;
        }

        for pair in cells.windows(2) {
            let _ = topology.direction_between(pair[0], pair[1])?;
        }

        Ok(Self { cells })
    }

    /// Cell occupied by the head.
    #[must_use]
    pub fn head(&self) -> Cell {
        self.cells[0]
    }

    /// Cell occupied by the last body segment.
    #[must_use]
    pub fn tail(&self) -> Cell {
        self.cells[self.cells.len() - 1]
    }

    /// Head-first slice of all occupied cells.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always `false`; a body holds at least its head.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Reports whether any segment occupies the cell.
    #[must_use]
    pub fn contains(&self, cell: Cell) -> bool {
        self.cells.contains(&cell)
    }
}

/// Read-only snapshot of the board handed to decision systems.
#[derive(Clone, Debug)]
pub struct BoardView<'a> {
    topology: GridTopology,
    obstacles: &'a ObstacleSet,
    body: BodyView,
    goal: Cell,
    growing: bool,
}

impl<'a> BoardView<'a> {
    /// Captures a snapshot of the board.
    #[must_use]
    pub fn new(
        topology: GridTopology,
        obstacles: &'a ObstacleSet,
        body: BodyView,
        goal: Cell,
        growing: bool,
    ) -> Self {
        Self {
            topology,
            obstacles,
            body,
            goal,
            growing,
        }
    }

    /// Geometry of the board.
    #[must_use]
    pub const fn topology(&self) -> &GridTopology {
        &self.topology
    }

    /// Cells currently blocked by obstacles.
    #[must_use]
    pub const fn obstacles(&self) -> &'a ObstacleSet {
        self.obstacles
    }

    /// Snake body ordered head to tail.
    #[must_use]
    pub const fn body(&self) -> &BodyView {
        &self.body
    }

    /// Cell the snake is heading for.
    #[must_use]
    pub const fn goal(&self) -> Cell {
        self.goal
    }

    /// Whether the tail stays in place on the next step.
    #[must_use]
    pub const fn growing(&self) -> bool {
        self.growing
    }
}

/// Whether the current tail cell counts as blocked during a search.
///
/// The tail vacates on the next step unless the snake is growing, so the
/// default treats it as passable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TailPolicy {
    /// The tail cell is passable because it moves forward this tick.
    #[default]
    Vacates,
    /// The tail cell is treated like every other body segment.
    Blocks,
}

/// Structural layouts available to the obstacle generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ObstaclePattern {
    /// Monte-Carlo placement that verifies reachability after every cell.
    SafeRandom,
    /// Vertical walls with periodic gaps.
    Corridor,
    /// Plus-shaped clusters spread across the board.
    Island,
    /// Regular lattice of wall pairs.
    Maze,
}

impl ObstaclePattern {
    /// Every pattern in declaration order.
    pub const ALL: [ObstaclePattern; 4] = [
        ObstaclePattern::SafeRandom,
        ObstaclePattern::Corridor,
        ObstaclePattern::Island,
        ObstaclePattern::Maze,
    ];

    /// Stable human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::SafeRandom => "safe-random",
            Self::Corridor => "corridor",
            Self::Island => "island",
            Self::Maze => "maze",
        }
    }
}
