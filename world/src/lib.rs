#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for Torus Snake.
//!
//! The world owns the snake, the food and the obstacle layout. It is mutated
//! exclusively through [`apply`] and reports every change as an [`Event`].

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use torus_snake_core::{
    Cell, CollisionCause, Command, Direction, EditError, Event, GridTopology, ObstacleSet,
};

const DEFAULT_SEED: u64 = 0x5a4e_6b3e_90d1_c0de;

const INITIAL_LENGTH: u32 = 3;
const INITIAL_HEADING: Direction = Direction::East;

/// Represents the authoritative Torus Snake world state.
#[derive(Debug)]
pub struct World {
    topology: GridTopology,
    snake: Snake,
    food: Cell,
    obstacles: ObstacleSet,
    score: u32,
    tick_index: u64,
    game_over: bool,
    rng: ChaCha8Rng,
}

impl World {
    /// Creates a new world on the default 30x20 board.
    #[must_use]
    pub fn new() -> Self {
        let topology = GridTopology::default();
        let mut world = Self {
            topology,
            snake: Snake::spawn(&topology),
            food: Cell::new(0, 0),
            obstacles: ObstacleSet::new(),
            score: 0,
            tick_index: 0,
            game_over: false,
            rng: ChaCha8Rng::seed_from_u64(DEFAULT_SEED),
        };
        let mut discarded = Vec::new();
        world.respawn_food(&mut discarded);
        world
    }

    fn reset(&mut self, topology: GridTopology, seed: u64) {
        self.topology = topology;
        self.snake = Snake::spawn(&topology);
        self.obstacles = ObstacleSet::new();
        self.score = 0;
        self.tick_index = 0;
        self.game_over = false;
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    fn is_free(&self, cell: Cell) -> bool {
        !self.obstacles.contains(cell) && !self.snake.occupies(cell)
    }

    /// Moves the food onto a free cell.
    ///
    /// Random probes come first, one per board cell. When all of them land on
    /// occupied cells a row-major scan picks the first free cell instead. A
    /// full board leaves the food where it was.
    fn respawn_food(&mut self, out_events: &mut Vec<Event>) {
        let (columns, rows) = (self.topology.columns(), self.topology.rows());
        for _ in 0..self.topology.cell_count() {
            let candidate = Cell::new(self.rng.gen_range(0..columns), self.rng.gen_range(0..rows));
            if self.is_free(candidate) {
                self.place_food(candidate, out_events);
                return;
            }
        }

        match self.topology.cells().find(|cell| self.is_free(*cell)) {
            Some(cell) => self.place_food(cell, out_events),
            None => {
                tracing::warn!(food = %self.food, "no free cell left for the food");
                out_events.push(Event::FoodUnplaceable);
            }
        }
    }

    fn place_food(&mut self, cell: Cell, out_events: &mut Vec<Event>) {
        self.food = cell;
        out_events.push(Event::FoodPlaced { cell });
    }

    fn advance_snake(&mut self, out_events: &mut Vec<Event>) {
        let from = self.snake.head();
        let direction = self.snake.heading;
        let to = self.topology.step(from, direction);

        self.snake.push_head(to);
        out_events.push(Event::SnakeAdvanced {
            from,
            to,
            direction,
        });

        let cause = if self.obstacles.contains(to) {
            Some(CollisionCause::Obstacle)
        } else if self.snake.body.iter().skip(1).any(|cell| *cell == to) {
            Some(CollisionCause::Body)
        } else {
            None
        };

        if let Some(cause) = cause {
            self.game_over = true;
            tracing::info!(cell = %to, ?cause, score = self.score, "snake collided");
            out_events.push(Event::SnakeCollided { cell: to, cause });
            return;
        }

        if to == self.food {
            self.score = self.score.saturating_add(1);
            self.snake.grow_pending = true;
            out_events.push(Event::FoodConsumed {
                cell: to,
                score: self.score,
            });
            self.respawn_food(out_events);
        }
    }

    fn toggle_obstacle(&mut self, cell: Cell, out_events: &mut Vec<Event>) {
        let rejection = if self.game_over {
            Some(EditError::GameOver)
        } else if !self.topology.contains(cell) {
            Some(EditError::OutOfBounds)
        } else if cell == self.food || self.snake.occupies(cell) {
            Some(EditError::Protected)
        } else {
            None
        };

        match rejection {
            Some(reason) => out_events.push(Event::ObstacleEditRejected { cell, reason }),
            None => {
                let blocked = self.obstacles.toggle(cell);
                out_events.push(Event::ObstacleToggled { cell, blocked });
            }
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug)]
struct Snake {
    body: VecDeque<Cell>,
    heading: Direction,
    grow_pending: bool,
}

impl Snake {
    /// Places a snake of the initial length in the middle of the board, facing east.
    fn spawn(topology: &GridTopology) -> Self {
        let column = i64::from(topology.columns() / 2);
        let row = i64::from(topology.rows() / 2);
        let body = (0..i64::from(INITIAL_LENGTH))
            .map(|offset| topology.wrap(column - offset, row))
            .collect();
        Self {
            body,
            heading: INITIAL_HEADING,
            grow_pending: false,
        }
    }

    fn head(&self) -> Cell {
        self.body.front().copied().unwrap_or(Cell::new(0, 0))
    }

    fn occupies(&self, cell: Cell) -> bool {
        self.body.contains(&cell)
    }

    /// A reversal would drive the head straight into the neck.
    fn steer(&mut self, direction: Direction) -> bool {
        if self.body.len() > 1 && direction == self.heading.opposite() {
            return false;
        }
        self.heading = direction;
        true
    }

    fn push_head(&mut self, cell: Cell) {
        self.body.push_front(cell);
        if self.grow_pending {
            self.grow_pending = false;
        } else {
            let _ = self.body.pop_back();
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureBoard {
            columns,
            rows,
            seed,
        } => match GridTopology::new(columns, rows) {
            Ok(topology) => {
                world.reset(topology, seed);
                out_events.push(Event::BoardConfigured { topology });
                world.respawn_food(out_events);
            }
            Err(reason) => out_events.push(Event::BoardRejected { reason }),
        },
        Command::Steer { direction } => {
            if !world.game_over && !world.snake.steer(direction) {
                tracing::debug!(?direction, "ignored reversal into the neck");
            }
        }
        Command::Tick => {
            if world.game_over {
                out_events.push(Event::TickRejected);
                return;
            }
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced {
                tick: world.tick_index,
            });
            world.advance_snake(out_events);
        }
        Command::ReplaceObstacles { mut obstacles } => {
            let topology = world.topology;
            obstacles.retain(|cell| topology.contains(cell));
            world.obstacles.replace(obstacles);
            out_events.push(Event::ObstaclesReplaced {
                count: world.obstacles.len(),
            });
            if world.obstacles.contains(world.food) {
                world.respawn_food(out_events);
            }
        }
        Command::ToggleObstacle { cell } => world.toggle_obstacle(cell, out_events),
        Command::RespawnFood => world.respawn_food(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use torus_snake_core::{
        BoardView, BodyView, Cell, Direction, GridTopology, ObstacleSet, TopologyError,
    };

    /// Geometry of the current board.
    #[must_use]
    pub fn topology(world: &World) -> &GridTopology {
        &world.topology
    }

    /// Cells currently blocked by obstacles.
    #[must_use]
    pub fn obstacles(world: &World) -> &ObstacleSet {
        &world.obstacles
    }

    /// Cell currently holding the food.
    #[must_use]
    pub fn food(world: &World) -> Cell {
        world.food
    }

    /// Number of food items consumed since the board was configured.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world.score
    }

    /// Heading the snake will follow on the next tick.
    #[must_use]
    pub fn heading(world: &World) -> Direction {
        world.snake.heading
    }

    /// Whether the tail stays in place on the next tick.
    #[must_use]
    pub fn is_growing(world: &World) -> bool {
        world.snake.grow_pending
    }

    /// Whether the snake has collided.
    #[must_use]
    pub fn is_game_over(world: &World) -> bool {
        world.game_over
    }

    /// Number of ticks processed since the board was configured.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Snake body ordered head to tail.
    pub fn body_view(world: &World) -> Result<BodyView, TopologyError> {
        BodyView::new(&world.topology, world.snake.body.iter().copied().collect())
    }

    /// Snapshot consumed by the autopilot, with the food as the goal.
    pub fn board_view(world: &World) -> Result<BoardView<'_>, TopologyError> {
        Ok(BoardView::new(
            world.topology,
            &world.obstacles,
            body_view(world)?,
            world.food,
            world.snake.grow_pending,
        ))
    }
}
