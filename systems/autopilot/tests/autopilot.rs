use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

use torus_snake_core::{Command, Event};
use torus_snake_system_autopilot::{Autopilot, ControllerConfig, Decision, Phase};
use torus_snake_system_obstacles::{GeneratorConfig, ObstacleGenerator};
use torus_snake_world::{self as world, query, World};

const REGENERATE_EVERY: u32 = 3;

#[test]
fn emits_one_steer_after_configuration() {
    let mut world = World::new();
    let mut autopilot = Autopilot::default();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ConfigureBoard {
            columns: 12,
            rows: 9,
            seed: 5,
        },
        &mut events,
    );

    let view = query::board_view(&world).expect("contiguous body");
    let mut commands = Vec::new();
    autopilot.handle(&events, &view, &mut commands);

    assert_eq!(commands.len(), 1);
    assert!(matches!(commands[0], Command::Steer { .. }));
    assert_eq!(autopilot.phase(), Phase::Moved);
}

#[test]
fn stays_silent_without_a_tick() {
    let world = World::new();
    let mut autopilot = Autopilot::default();
    let view = query::board_view(&world).expect("contiguous body");
    let mut commands = Vec::new();

    autopilot.handle(&[Event::FoodUnplaceable], &view, &mut commands);
    assert!(commands.is_empty());
    assert_eq!(autopilot.phase(), Phase::Idle);
}

#[test]
fn stops_steering_after_a_collision() {
    let world = World::new();
    let mut autopilot = Autopilot::default();
    let view = query::board_view(&world).expect("contiguous body");
    let head = view.body().head();
    let mut commands = Vec::new();

    autopilot.handle(
        &[
            Event::TimeAdvanced { tick: 9 },
            Event::SnakeCollided {
                cell: head,
                cause: torus_snake_core::CollisionCause::Body,
            },
        ],
        &view,
        &mut commands,
    );
    autopilot.handle(&[Event::TimeAdvanced { tick: 10 }], &view, &mut commands);
    assert!(commands.is_empty());
}

#[test]
fn autopilot_collects_food_and_avoids_obstacles() {
    for cache_routes in [false, true] {
        let outcome = replay(ControllerConfig {
            cache_routes,
            ..ControllerConfig::default()
        });
        assert!(outcome.score >= 1, "no food collected (cache: {cache_routes})");
        assert_eq!(
            outcome.obstacle_steers, 0,
            "steered into an obstacle with a free neighbor (cache: {cache_routes})"
        );
    }
}

#[test]
fn deterministic_replay_produces_identical_logs() {
    let first = replay(ControllerConfig::default());
    let second = replay(ControllerConfig::default());

    assert_eq!(first.log, second.log, "replay diverged between runs");
    assert_eq!(first.fingerprint(), second.fingerprint());
    assert!(!first.log.is_empty());
}

#[derive(Debug)]
struct ReplayOutcome {
    score: u32,
    obstacle_steers: usize,
    log: Vec<String>,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.score.hash(&mut hasher);
        self.log.hash(&mut hasher);
        hasher.finish()
    }
}

fn replay(config: ControllerConfig) -> ReplayOutcome {
    let mut world = World::new();
    let mut autopilot = Autopilot::new(config);
    let mut generator = ObstacleGenerator::new(GeneratorConfig {
        seed: 77,
        ..GeneratorConfig::default()
    });
    let mut log = Vec::new();
    let mut obstacle_steers = 0;
    let mut last_regenerated_at = 0;

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ConfigureBoard {
            columns: 20,
            rows: 15,
            seed: 31,
        },
        &mut events,
    );

    for _ in 0..400 {
        record(&events, &mut log);
        let view = query::board_view(&world).expect("contiguous body");
        let mut commands = Vec::new();
        autopilot.handle(&events, &view, &mut commands);

        if let Some(decision) = autopilot.last_decision() {
            let target = view.topology().step(view.body().head(), decision.direction());
            let steered_into_obstacle = view.obstacles().contains(target);
            if steered_into_obstacle && !matches!(decision, Decision::Enclosed { .. }) {
                obstacle_steers += 1;
            }
        }

        events.clear();
        for command in commands {
            world::apply(&mut world, command, &mut events);
        }

        if query::is_game_over(&world) {
            break;
        }

        let score = query::score(&world);
        if score > 0 && score % REGENERATE_EVERY == 0 && score != last_regenerated_at {
            last_regenerated_at = score;
            let view = query::board_view(&world).expect("contiguous body");
            let request = generator.random_request();
            let generation = generator
                .generate(view.topology(), view.body(), view.goal(), request)
                .expect("valid request");
            world::apply(
                &mut world,
                Command::ReplaceObstacles {
                    obstacles: generation.obstacles,
                },
                &mut events,
            );
        }

        world::apply(&mut world, Command::Tick, &mut events);
    }
    record(&events, &mut log);

    ReplayOutcome {
        score: query::score(&world),
        obstacle_steers,
        log,
    }
}

fn record(events: &[Event], log: &mut Vec<String>) {
    log.extend(events.iter().map(|event| format!("{event:?}")));
}
