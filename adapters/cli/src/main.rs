#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs the Torus Snake autopilot headlessly.

mod layout_transfer;
mod render;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use torus_snake_core::{
    BoardView, Command, Event, ObstaclePattern, ObstacleSet, TailPolicy, DEFAULT_COLUMNS,
    DEFAULT_ROWS,
};
use torus_snake_system_autopilot::{Autopilot, ControllerConfig, Decision};
use torus_snake_system_navigation::exists_path;
use torus_snake_system_obstacles::{
    protected_zone, GenerationRequest, GeneratorConfig, ObstacleGenerator,
};
use torus_snake_world::{self as world, query, World};
use tracing_subscriber::EnvFilter;

use crate::{layout_transfer::ObstacleLayout, render::FrameInput};

/// Obstacle count used when a pattern is requested without `--count`.
const DEFAULT_OBSTACLE_COUNT: u32 = 15;

#[derive(Debug, Parser)]
#[command(
    name = "torus-snake",
    about = "Runs the snake autopilot on a wrap-around board"
)]
struct Cli {
    /// Number of board columns.
    #[arg(long, default_value_t = DEFAULT_COLUMNS)]
    columns: u32,
    /// Number of board rows.
    #[arg(long, default_value_t = DEFAULT_ROWS)]
    rows: u32,
    /// Seed shared by food placement and obstacle generation.
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// Maximum number of ticks to simulate.
    #[arg(long, default_value_t = 500)]
    ticks: u64,
    /// Obstacle pattern; a random pattern is drawn for every layout when omitted.
    #[arg(long, value_enum)]
    pattern: Option<PatternArg>,
    /// Obstacles requested from safe-random placement.
    #[arg(long)]
    count: Option<u32>,
    /// Regenerate obstacles whenever the score reaches a multiple of this value; 0 disables.
    #[arg(long, default_value_t = 8)]
    regenerate_every: u32,
    /// Whether the tail cell counts as blocked while the snake is not growing.
    #[arg(long, value_enum, default_value_t = TailPolicyArg::Vacates)]
    tail_policy: TailPolicyArg,
    /// Reuse planned routes until the board or the food changes.
    #[arg(long)]
    cache_routes: bool,
    /// Print a frame every N ticks; 0 prints only the final frame.
    #[arg(long, default_value_t = 0)]
    render_every: u64,
    /// Start from an exported obstacle layout instead of generating one.
    #[arg(long)]
    layout: Option<String>,
    /// Print the final obstacle layout as a transfer string.
    #[arg(long)]
    export_layout: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum PatternArg {
    SafeRandom,
    Corridor,
    Island,
    Maze,
}

impl From<PatternArg> for ObstaclePattern {
    fn from(value: PatternArg) -> Self {
        match value {
            PatternArg::SafeRandom => Self::SafeRandom,
            PatternArg::Corridor => Self::Corridor,
            PatternArg::Island => Self::Island,
            PatternArg::Maze => Self::Maze,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum TailPolicyArg {
    Vacates,
    Blocks,
}

impl From<TailPolicyArg> for TailPolicy {
    fn from(value: TailPolicyArg) -> Self {
        match value {
            TailPolicyArg::Vacates => Self::Vacates,
            TailPolicyArg::Blocks => Self::Blocks,
        }
    }
}

/// Entry point for the Torus Snake command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut session = Session::start(&cli)?;
    let ticks = session.run(&cli)?;

    println!("{}", session.frame()?);
    println!(
        "ticks: {ticks}  score: {}  length: {}  outcome: {}",
        query::score(&session.world),
        query::body_view(&session.world)?.len(),
        if query::is_game_over(&session.world) {
            "collided"
        } else {
            "alive"
        }
    );

    if cli.export_layout {
        let topology = query::topology(&session.world);
        let layout = ObstacleLayout::capture(
            topology.columns(),
            topology.rows(),
            query::obstacles(&session.world),
        );
        println!("{}", layout.encode()?);
    }

    Ok(())
}

struct Session {
    world: World,
    autopilot: Autopilot,
    generator: ObstacleGenerator,
    events: Vec<Event>,
}

impl Session {
    fn start(cli: &Cli) -> Result<Self> {
        let mut session = Self {
            world: World::new(),
            autopilot: Autopilot::new(ControllerConfig {
                tail_policy: cli.tail_policy.into(),
                cache_routes: cli.cache_routes,
                ..ControllerConfig::default()
            }),
            generator: ObstacleGenerator::new(GeneratorConfig {
                seed: cli.seed,
                ..GeneratorConfig::default()
            }),
            events: Vec::new(),
        };

        world::apply(
            &mut session.world,
            Command::ConfigureBoard {
                columns: cli.columns,
                rows: cli.rows,
                seed: cli.seed,
            },
            &mut session.events,
        );
        if let Some(Event::BoardRejected { reason }) = session.events.first() {
            bail!("cannot configure board: {reason}");
        }

        match &cli.layout {
            Some(encoded) => session.import_layout(encoded)?,
            None => session.regenerate(cli)?,
        }

        Ok(session)
    }

    /// Runs until the tick budget is spent or the snake collides.
    fn run(&mut self, cli: &Cli) -> Result<u64> {
        let mut last_regenerated_at = 0;
        let mut elapsed = 0;

        while elapsed < cli.ticks {
            let mut commands = Vec::new();
            {
                let view = query::board_view(&self.world)?;
                self.autopilot.handle(&self.events, &view, &mut commands);
            }
            if cli.render_every > 0 && elapsed % cli.render_every == 0 {
                println!("tick {elapsed}\n{}", self.frame()?);
            }

            self.events.clear();
            for command in commands {
                world::apply(&mut self.world, command, &mut self.events);
            }
            world::apply(&mut self.world, Command::Tick, &mut self.events);
            elapsed += 1;

            if query::is_game_over(&self.world) {
                break;
            }

            let score = query::score(&self.world);
            if cli.regenerate_every > 0
                && score > 0
                && score % cli.regenerate_every == 0
                && score != last_regenerated_at
            {
                last_regenerated_at = score;
                world::apply(&mut self.world, Command::RespawnFood, &mut self.events);
                self.regenerate(cli)?;
            }
        }

        Ok(elapsed)
    }

    /// Replaces the obstacles with a fresh layout that keeps the food reachable.
    fn regenerate(&mut self, cli: &Cli) -> Result<()> {
        let request = match cli.pattern {
            Some(pattern) => GenerationRequest::new(
                pattern.into(),
                cli.count.unwrap_or(DEFAULT_OBSTACLE_COUNT),
            ),
            None => {
                let mut request = self.generator.random_request();
                if let Some(count) = cli.count {
                    request.count = count;
                }
                request
            }
        };

        let generation = {
            let view = query::board_view(&self.world)?;
            self.generator
                .generate(view.topology(), view.body(), view.goal(), request)?
        };
        tracing::info!(
            requested = generation.requested.label(),
            placed_by = generation.placed_by.label(),
            obstacles = generation.obstacles.len(),
            shortfall = generation.shortfall(),
            "obstacles regenerated"
        );

        world::apply(
            &mut self.world,
            Command::ReplaceObstacles {
                obstacles: generation.obstacles,
            },
            &mut self.events,
        );
        Ok(())
    }

    fn import_layout(&mut self, encoded: &str) -> Result<()> {
        let layout = ObstacleLayout::decode(encoded).context("failed to decode --layout")?;
        let topology = *query::topology(&self.world);
        if (layout.columns, layout.rows) != (topology.columns(), topology.rows()) {
            bail!(
                "layout was captured on a {}x{} board but the board is {}x{}",
                layout.columns,
                layout.rows,
                topology.columns(),
                topology.rows()
            );
        }

        let obstacles = {
            let view = query::board_view(&self.world)?;
            let radius = self.generator.config().protected_radius;
            screen_layout(&view, layout.to_obstacles(), radius)?
        };

        world::apply(
            &mut self.world,
            Command::ReplaceObstacles { obstacles },
            &mut self.events,
        );
        Ok(())
    }

    fn frame(&self) -> Result<String> {
        let body = query::body_view(&self.world)?;
        Ok(render::frame(FrameInput {
            topology: query::topology(&self.world),
            obstacles: query::obstacles(&self.world),
            body: body.cells(),
            food: query::food(&self.world),
            route: self.autopilot.last_decision().and_then(Decision::route),
        }))
    }
}

/// Clears the protected zone out of an imported layout and refuses layouts
/// that leave the head without a route to the food.
fn screen_layout(
    view: &BoardView<'_>,
    mut obstacles: ObstacleSet,
    radius: u32,
) -> Result<ObstacleSet> {
    let topology = view.topology();
    let zone = protected_zone(topology, view.body(), view.goal(), radius);
    obstacles.retain(|cell| !zone.contains(&cell));

    let head = view.body().head();
    if !exists_path(topology, &obstacles, view.body().cells(), head, view.goal())? {
        bail!(
            "imported layout leaves no route from the head at {head} to the food at {}",
            view.goal()
        );
    }
    Ok(obstacles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use torus_snake_core::{BodyView, Cell, GridTopology};

    fn board() -> (GridTopology, BodyView) {
        let topology = GridTopology::new(10, 10).expect("topology");
        let body = BodyView::new(
            &topology,
            vec![Cell::new(5, 5), Cell::new(4, 5), Cell::new(3, 5)],
        )
        .expect("body");
        (topology, body)
    }

    #[test]
    fn protected_cells_are_cleared_from_imported_layouts() {
        let (topology, body) = board();
        let obstacles = ObstacleSet::new();
        let view = BoardView::new(topology, &obstacles, body, Cell::new(0, 0), false);
        let imported: ObstacleSet = [Cell::new(6, 5), Cell::new(1, 1), Cell::new(8, 2)]
            .into_iter()
            .collect();

        let screened = screen_layout(&view, imported, 1).expect("route survives");
        assert_eq!(screened.iter().collect::<Vec<_>>(), vec![Cell::new(8, 2)]);
    }

    #[test]
    fn layouts_that_wall_off_the_food_are_refused() {
        let (topology, body) = board();
        let obstacles = ObstacleSet::new();
        let view = BoardView::new(topology, &obstacles, body, Cell::new(0, 0), false);
        let imported: ObstacleSet = topology.cells().collect();

        let error = screen_layout(&view, imported, 1).expect_err("no route remains");
        assert!(error.to_string().contains("no route"), "unexpected error: {error}");
    }
}
