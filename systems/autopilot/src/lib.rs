#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Autopilot that steers the snake toward the food one tick at a time.
//!
//! Each decision asks for a shortest route first and only consults the
//! free-space heuristic when no route exists. Exactly one [`Command::Steer`]
//! is emitted per decision.

use torus_snake_core::{BoardView, Cell, Command, Direction, Event, TailPolicy, TopologyError};
use torus_snake_system_navigation::{
    safest_direction, shortest_path, BlockedCells, PathOutcome, Route, SafeDirection,
    DEFAULT_FLOOD_DEPTH,
};

/// Tuning knobs for the autopilot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Tail handling while the snake is not growing.
    pub tail_policy: TailPolicy,
    /// Depth cap handed to the free-space flood fill.
    pub flood_depth: u32,
    /// Reuse the previous route while the board and goal are unchanged.
    pub cache_routes: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            tail_policy: TailPolicy::Vacates,
            flood_depth: DEFAULT_FLOOD_DEPTH,
            cache_routes: false,
        }
    }
}

/// Position of the autopilot within its per-tick cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the next decision tick.
    Idle,
    /// Searching for a move.
    Deciding,
    /// A direction was emitted for the current tick.
    Moved,
}

/// Direction chosen for a tick together with how it was obtained.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    /// A route to the goal exists and the direction follows its first step.
    Route {
        /// Direction of the first step.
        direction: Direction,
        /// Remaining route including the next cell.
        route: Route,
    },
    /// No route exists; the direction leads to the most open neighbor.
    Fallback {
        /// Direction with the most locally reachable space.
        direction: Direction,
        /// Cells reachable from the chosen neighbor within the depth cap.
        reachable: usize,
    },
    /// Every neighbor is blocked and the next tick collides.
    Enclosed {
        /// Placeholder heading handed to the movement layer.
        direction: Direction,
    },
}

impl Decision {
    /// Direction emitted for the decision.
    #[must_use]
    pub fn direction(&self) -> Direction {
        match self {
            Self::Route { direction, .. }
            | Self::Fallback { direction, .. }
            | Self::Enclosed { direction } => *direction,
        }
    }

    /// Route to visualize, when the decision followed one.
    #[must_use]
    pub fn route(&self) -> Option<&Route> {
        match self {
            Self::Route { route, .. } => Some(route),
            Self::Fallback { .. } | Self::Enclosed { .. } => None,
        }
    }
}

#[derive(Clone, Debug)]
struct CachedRoute {
    goal: Cell,
    revision: u64,
    expected_head: Cell,
    route: Route,
}

/// Pure system that reacts to world events and emits steering commands.
#[derive(Debug)]
pub struct Autopilot {
    config: ControllerConfig,
    phase: Phase,
    cache: Option<CachedRoute>,
    last_decision: Option<Decision>,
    halted: bool,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self::new(ControllerConfig::default())
    }
}

impl Autopilot {
    /// Creates an idle autopilot with the provided tuning.
    #[must_use]
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            config,
            phase: Phase::Idle,
            cache: None,
            last_decision: None,
            halted: false,
        }
    }

    /// Tuning currently applied by the autopilot.
    #[must_use]
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Current position within the per-tick cycle.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Most recent decision, kept for visualization.
    #[must_use]
    pub fn last_decision(&self) -> Option<&Decision> {
        self.last_decision.as_ref()
    }

    /// Whether a cached route is currently held.
    #[must_use]
    pub fn has_cached_route(&self) -> bool {
        self.cache.is_some()
    }

    /// Consumes world events and the board snapshot to emit steering commands.
    ///
    /// A decision is made whenever a board is configured or a tick elapses.
    /// After a collision nothing is emitted until the board is configured again.
    pub fn handle(&mut self, events: &[Event], view: &BoardView<'_>, out: &mut Vec<Command>) {
        let mut decide = false;
        for event in events {
            match event {
                Event::BoardConfigured { .. } => {
                    self.halted = false;
                    self.invalidate();
                    decide = true;
                }
                Event::TimeAdvanced { .. } => decide = true,
                Event::SnakeCollided { .. } => {
                    self.halted = true;
                    self.invalidate();
                }
                Event::ObstaclesReplaced { .. }
                | Event::ObstacleToggled { .. }
                | Event::FoodPlaced { .. } => self.invalidate(),
                _ => {}
            }
        }

        if self.halted || !decide {
            self.phase = Phase::Idle;
            return;
        }

        match self.decide(view) {
            Ok(decision) => out.push(Command::Steer {
                direction: decision.direction(),
            }),
            Err(error) => {
                self.phase = Phase::Idle;
                tracing::warn!(%error, "board snapshot rejected; no direction emitted");
            }
        }
    }

    /// Chooses the direction for the current tick.
    ///
    /// While the snake is growing its tail stays put, so the tail is blocked
    /// regardless of the configured policy.
    pub fn decide(&mut self, view: &BoardView<'_>) -> Result<Decision, TopologyError> {
        self.phase = Phase::Deciding;
        let topology = view.topology();
        let head = topology.ensure_contains(view.body().head())?;
        let goal = topology.ensure_contains(view.goal())?;
        let tail_policy = if view.growing() {
            TailPolicy::Blocks
        } else {
            self.config.tail_policy
        };

        let decision = match self.cached_decision(view, tail_policy) {
            Some(decision) => decision,
            None => self.plan(view, tail_policy, head, goal)?,
        };

        self.phase = Phase::Moved;
        self.last_decision = Some(decision.clone());
        Ok(decision)
    }

    fn plan(
        &mut self,
        view: &BoardView<'_>,
        tail_policy: TailPolicy,
        head: Cell,
        goal: Cell,
    ) -> Result<Decision, TopologyError> {
        let topology = view.topology();
        match shortest_path(topology, view.obstacles(), view.body(), tail_policy, head, goal)? {
            PathOutcome::Found(route) => {
                let direction = topology.direction_between(head, route.next_cell())?;
                self.remember(view, route.clone());
                Ok(Decision::Route { direction, route })
            }
            PathOutcome::NoPath | PathOutcome::Arrived => self.fallback(view, tail_policy, head),
        }
    }

    fn fallback(
        &mut self,
        view: &BoardView<'_>,
        tail_policy: TailPolicy,
        head: Cell,
    ) -> Result<Decision, TopologyError> {
        self.invalidate();
        let choice = safest_direction(
            view.topology(),
            view.obstacles(),
            view.body(),
            tail_policy,
            head,
            self.config.flood_depth,
        )?;

        Ok(match choice {
            SafeDirection::Open {
                direction,
                reachable,
            } => {
                tracing::debug!(
                    %head,
                    goal = %view.goal(),
                    ?direction,
                    reachable,
                    "no route; steering toward open space"
                );
                Decision::Fallback {
                    direction,
                    reachable,
                }
            }
            SafeDirection::Enclosed { fallback } => {
                tracing::warn!(%head, "snake is enclosed; collision is unavoidable");
                Decision::Enclosed {
                    direction: fallback,
                }
            }
        })
    }

    /// Returns the cached route when it still applies to this snapshot.
    fn cached_decision(
        &mut self,
        view: &BoardView<'_>,
        tail_policy: TailPolicy,
    ) -> Option<Decision> {
        let cached = self.cache.take()?;
        let head = view.body().head();
        if cached.goal != view.goal()
            || cached.revision != view.obstacles().revision()
            || cached.expected_head != head
        {
            return None;
        }

        let next = cached.route.next_cell();
        let blocked =
            BlockedCells::for_agent(view.topology(), view.obstacles(), view.body(), tail_policy);
        if next != cached.goal && blocked.is_blocked(next) {
            tracing::debug!(cell = %next, "cached route blocked; replanning");
            return None;
        }

        let direction = view.topology().direction_between(head, next).ok()?;
        let route = cached.route;
        self.remember(view, route.clone());
        Some(Decision::Route { direction, route })
    }

    fn remember(&mut self, view: &BoardView<'_>, route: Route) {
        if !self.config.cache_routes {
            return;
        }
        let expected_head = route.next_cell();
        self.cache = route.advance().map(|route| CachedRoute {
            goal: view.goal(),
            revision: view.obstacles().revision(),
            expected_head,
            route,
        });
    }

    fn invalidate(&mut self) {
        self.cache = None;
    }
}
