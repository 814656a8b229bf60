#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Seeded obstacle generator that never strands the snake.
//!
//! Every layout produced here keeps the cells around the head and the food
//! clear and leaves at least one route between them. Patterned layouts are
//! cheap but cannot prove connectivity on their own, so they pass through the
//! same reachability gate as safe-random placement and fall back to it when
//! the gate rejects them.

mod patterns;

use std::{collections::BTreeSet, ops::RangeInclusive};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use torus_snake_core::{
    BodyView, Cell, GridTopology, ObstaclePattern, ObstacleSet, TopologyError,
};
use torus_snake_system_navigation::{exists_path_within, BlockedCells};

/// Obstacle counts a caller may reasonably request for safe-random boards.
pub const RECOMMENDED_COUNTS: RangeInclusive<u32> = 8..=25;

/// Counts drawn by [`ObstacleGenerator::random_request`].
const RANDOM_REQUEST_COUNTS: RangeInclusive<u32> = 8..=20;

/// Tuning knobs for the obstacle generator.
#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    /// Seed for the generator's random stream; equal seeds replay equal boards.
    pub seed: u64,
    /// Sampling attempts granted per requested obstacle before giving up.
    pub attempts_per_obstacle: u32,
    /// Obstacle count used when a patterned layout fails the reachability gate.
    pub fallback_count: u32,
    /// Chebyshev radius of the buffer kept clear around the head and the food.
    pub protected_radius: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 0x7a11_5eed,
            attempts_per_obstacle: 5,
            fallback_count: 15,
            protected_radius: 1,
        }
    }
}

/// Layout requested from the generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Structural pattern to lay out.
    pub pattern: ObstaclePattern,
    /// Number of obstacles to place; only consulted by safe-random placement.
    pub count: u32,
}

impl GenerationRequest {
    /// Creates a new request descriptor.
    #[must_use]
    pub const fn new(pattern: ObstaclePattern, count: u32) -> Self {
        Self { pattern, count }
    }
}

/// Layout returned by the generator together with how it was obtained.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Generation {
    /// Replacement obstacle set satisfying the reachability guarantee.
    pub obstacles: ObstacleSet,
    /// Pattern the caller asked for.
    pub requested: ObstaclePattern,
    /// Pattern that actually produced the layout.
    pub placed_by: ObstaclePattern,
    /// Number of obstacles the producing mode aimed for.
    pub target: usize,
}

impl Generation {
    /// Whether a patterned layout was discarded in favour of safe-random placement.
    #[must_use]
    pub fn fell_back(&self) -> bool {
        self.requested != self.placed_by
    }

    /// Obstacles the producing mode failed to place within its attempt budget.
    #[must_use]
    pub fn shortfall(&self) -> usize {
        self.target.saturating_sub(self.obstacles.len())
    }
}

/// Contract violations reported by the generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The head or the food lies outside the board.
    #[error(transparent)]
    Topology(#[from] TopologyError),
    /// More obstacles were requested than the board holds.
    #[error("requested {count} obstacles on a board of {capacity} cells")]
    CountTooLarge {
        /// Requested obstacle count.
        count: u32,
        /// Total cells on the board.
        capacity: usize,
    },
}

/// Seeded generator producing connected obstacle layouts.
#[derive(Debug)]
pub struct ObstacleGenerator {
    config: GeneratorConfig,
    rng: ChaCha8Rng,
}

impl Default for ObstacleGenerator {
    fn default() -> Self {
        Self::new(GeneratorConfig::default())
    }
}

impl ObstacleGenerator {
    /// Creates a new generator with the provided tuning surface.
    #[must_use]
    pub fn new(config: GeneratorConfig) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self { config, rng }
    }

    /// Tuning currently applied by the generator.
    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Draws a pattern uniformly and, for safe-random, a count between 8 and 20.
    pub fn random_request(&mut self) -> GenerationRequest {
        let pattern = ObstaclePattern::ALL[self.rng.gen_range(0..ObstaclePattern::ALL.len())];
        let count = self.rng.gen_range(RANDOM_REQUEST_COUNTS);
        GenerationRequest::new(pattern, count)
    }

    /// Produces a replacement obstacle set for the board.
    ///
    /// The result never covers the protected zone and always leaves a route
    /// from the head to `goal` with the body treated as impassable. When the
    /// requested count cannot be met within the attempt budget the layout is
    /// under-provisioned rather than rejected.
    pub fn generate(
        &mut self,
        topology: &GridTopology,
        body: &BodyView,
        goal: Cell,
        request: GenerationRequest,
    ) -> Result<Generation, GenerationError> {
        let head = topology.ensure_contains(body.head())?;
        let goal = topology.ensure_contains(goal)?;
        let capacity = topology.cell_count();
        if usize::try_from(request.count).map_or(true, |count| count > capacity) {
            return Err(GenerationError::CountTooLarge {
                count: request.count,
                capacity,
            });
        }

        let board = Board {
            topology: *topology,
            body,
            head,
            goal,
            protected: protected_zone(topology, body, goal, self.config.protected_radius),
        };

        let template = match request.pattern {
            ObstaclePattern::SafeRandom => {
                return Ok(self.safe_random(&board, request.pattern, request.count));
            }
            ObstaclePattern::Corridor => patterns::corridor(topology),
            ObstaclePattern::Island => patterns::island(topology),
            ObstaclePattern::Maze => patterns::maze(topology),
        };

        let obstacles: ObstacleSet = template
            .into_iter()
            .filter(|cell| !board.protected.contains(cell))
            .collect();

        if board.connected(&obstacles) {
            return Ok(Generation {
                target: obstacles.len(),
                obstacles,
                requested: request.pattern,
                placed_by: request.pattern,
            });
        }

        tracing::debug!(
            pattern = request.pattern.label(),
            fallback_count = self.config.fallback_count,
            "patterned layout severs the route; falling back to safe-random placement"
        );
        let fallback_count = self.config.fallback_count;
        Ok(self.safe_random(&board, request.pattern, fallback_count))
    }

    fn safe_random(
        &mut self,
        board: &Board<'_>,
        requested: ObstaclePattern,
        count: u32,
    ) -> Generation {
        let target = usize::try_from(count).unwrap_or(usize::MAX);
        let mut obstacles = ObstacleSet::new();

        if !board.connected(&obstacles) {
            tracing::warn!(
                head = %board.head,
                goal = %board.goal,
                "body already separates head from goal; leaving the board empty"
            );
            return Generation {
                obstacles,
                requested,
                placed_by: ObstaclePattern::SafeRandom,
                target,
            };
        }

        let budget = count.saturating_mul(self.config.attempts_per_obstacle);
        let columns = board.topology.columns();
        let rows = board.topology.rows();
        let mut attempts = 0;

        while obstacles.len() < target && attempts < budget {
            attempts += 1;
            let candidate = Cell::new(
                self.rng.gen_range(0..columns),
                self.rng.gen_range(0..rows),
            );
            if board.protected.contains(&candidate) || obstacles.contains(candidate) {
                continue;
            }

            let _ = obstacles.insert(candidate);
            if !board.connected(&obstacles) {
                let _ = obstacles.remove(candidate);
            }
        }

        if obstacles.len() < target {
            tracing::warn!(
                requested = target,
                placed = obstacles.len(),
                attempts,
                "attempt budget exhausted; board is under-provisioned"
            );
        }

        Generation {
            obstacles,
            requested,
            placed_by: ObstaclePattern::SafeRandom,
            target,
        }
    }
}

/// Cells obstacle placement must never occupy.
///
/// Covers every cell within `radius` (Chebyshev, wrapped) of the head and of
/// the goal, plus the whole body.
#[must_use]
pub fn protected_zone(
    topology: &GridTopology,
    body: &BodyView,
    goal: Cell,
    radius: u32,
) -> BTreeSet<Cell> {
    let radius = i64::from(radius);
    let mut zone: BTreeSet<Cell> = body.cells().iter().copied().collect();

    for anchor in [body.head(), goal] {
        let (column, row) = (i64::from(anchor.column()), i64::from(anchor.row()));
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let _ = zone.insert(topology.wrap(column + dx, row + dy));
            }
        }
    }

    zone
}

struct Board<'a> {
    topology: GridTopology,
    body: &'a BodyView,
    head: Cell,
    goal: Cell,
    protected: BTreeSet<Cell>,
}

impl Board<'_> {
    fn connected(&self, obstacles: &ObstacleSet) -> bool {
        let blocked =
            BlockedCells::with_extra(&self.topology, obstacles, self.body.cells().iter().copied());
        exists_path_within(&blocked, self.head, self.goal).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> (GridTopology, BodyView) {
        let topology = GridTopology::new(15, 10).expect("topology");
        let body = BodyView::new(
            &topology,
            vec![Cell::new(7, 5), Cell::new(6, 5), Cell::new(5, 5)],
        )
        .expect("body");
        (topology, body)
    }

    #[test]
    fn protected_zone_wraps_around_edges() {
        let topology = GridTopology::new(6, 6).expect("topology");
        let body = BodyView::new(&topology, vec![Cell::new(0, 0)]).expect("body");
        let zone = protected_zone(&topology, &body, Cell::new(3, 3), 1);

        assert!(zone.contains(&Cell::new(5, 5)));
        assert!(zone.contains(&Cell::new(1, 5)));
        assert!(zone.contains(&Cell::new(4, 4)));
        assert_eq!(zone.len(), 18);
    }

    #[test]
    fn oversized_requests_are_rejected() {
        let (topology, body) = board();
        let mut generator = ObstacleGenerator::default();
        let result = generator.generate(
            &topology,
            &body,
            Cell::new(1, 1),
            GenerationRequest::new(ObstaclePattern::SafeRandom, 151),
        );
        assert_eq!(
            result,
            Err(GenerationError::CountTooLarge {
                count: 151,
                capacity: 150
            })
        );
    }

    #[test]
    fn out_of_bounds_goal_is_rejected() {
        let (topology, body) = board();
        let mut generator = ObstacleGenerator::default();
        let result = generator.generate(
            &topology,
            &body,
            Cell::new(15, 0),
            GenerationRequest::new(ObstaclePattern::Maze, 10),
        );
        assert!(matches!(result, Err(GenerationError::Topology(_))));
    }

    #[test]
    fn equal_seeds_replay_equal_layouts() {
        let (topology, body) = board();
        let request = GenerationRequest::new(ObstaclePattern::SafeRandom, 20);
        let mut first = ObstacleGenerator::default();
        let mut second = ObstacleGenerator::default();

        let a = first.generate(&topology, &body, Cell::new(2, 8), request);
        let b = second.generate(&topology, &body, Cell::new(2, 8), request);
        assert_eq!(a, b);
    }

    #[test]
    fn zero_count_yields_an_empty_board() {
        let (topology, body) = board();
        let mut generator = ObstacleGenerator::default();
        let generation = generator
            .generate(
                &topology,
                &body,
                Cell::new(2, 8),
                GenerationRequest::new(ObstaclePattern::SafeRandom, 0),
            )
            .expect("valid request");
        assert!(generation.obstacles.is_empty());
        assert_eq!(generation.shortfall(), 0);
    }
}
