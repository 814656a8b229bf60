use torus_snake_core::{BodyView, Cell, GridTopology, ObstaclePattern, ObstacleSet};
use torus_snake_system_navigation::exists_path;
use torus_snake_system_obstacles::{
    protected_zone, GenerationRequest, GeneratorConfig, ObstacleGenerator, RECOMMENDED_COUNTS,
};

fn board() -> (GridTopology, BodyView, Cell) {
    let topology = GridTopology::new(15, 10).expect("topology");
    let body = BodyView::new(
        &topology,
        vec![Cell::new(7, 5), Cell::new(6, 5), Cell::new(5, 5)],
    )
    .expect("body");
    (topology, body, Cell::new(12, 2))
}

#[test]
fn every_generated_board_keeps_a_route_and_a_clear_buffer() {
    let (topology, body, goal) = board();
    let zone = protected_zone(&topology, &body, goal, 1);
    let mut generator = ObstacleGenerator::new(GeneratorConfig {
        seed: 2024,
        ..GeneratorConfig::default()
    });
    let counts: Vec<u32> = RECOMMENDED_COUNTS.collect();

    for round in 0..1_000 {
        let pattern = ObstaclePattern::ALL[round % ObstaclePattern::ALL.len()];
        let count = counts[round % counts.len()];
        let generation = generator
            .generate(&topology, &body, goal, GenerationRequest::new(pattern, count))
            .expect("valid request");

        assert_eq!(
            exists_path(&topology, &generation.obstacles, body.cells(), body.head(), goal),
            Ok(true),
            "round {round} ({}) stranded the snake",
            pattern.label()
        );
        for cell in generation.obstacles.iter() {
            assert!(
                !zone.contains(&cell),
                "round {round} placed {cell} inside the protected zone"
            );
        }
    }
}

#[test]
fn patterned_layouts_are_kept_when_connected() {
    let (topology, body, goal) = board();
    let mut generator = ObstacleGenerator::default();

    let generation = generator
        .generate(
            &topology,
            &body,
            goal,
            GenerationRequest::new(ObstaclePattern::Island, 0),
        )
        .expect("valid request");

    assert!(!generation.fell_back());
    assert_eq!(generation.placed_by, ObstaclePattern::Island);
    assert!(!generation.obstacles.is_empty());
    assert_eq!(generation.shortfall(), 0);
}

#[test]
fn severing_pattern_falls_back_to_safe_random() {
    // The head sits diagonally below-right of the central island with its
    // body wrapped around the other two sides, so two island arms seal it in.
    let topology = GridTopology::new(30, 20).expect("topology");
    let body = BodyView::new(
        &topology,
        vec![
            Cell::new(16, 11),
            Cell::new(17, 11),
            Cell::new(17, 12),
            Cell::new(16, 12),
        ],
    )
    .expect("body");
    let goal = Cell::new(3, 3);
    let mut generator = ObstacleGenerator::new(GeneratorConfig {
        protected_radius: 0,
        fallback_count: 6,
        ..GeneratorConfig::default()
    });

    let generation = generator
        .generate(
            &topology,
            &body,
            goal,
            GenerationRequest::new(ObstaclePattern::Island, 0),
        )
        .expect("valid request");

    assert_eq!(generation.requested, ObstaclePattern::Island);
    assert_eq!(generation.placed_by, ObstaclePattern::SafeRandom);
    assert!(generation.fell_back());
    assert!(
        !generation.obstacles.contains(Cell::new(16, 10))
            || !generation.obstacles.contains(Cell::new(15, 11))
    );
    assert_eq!(
        exists_path(&topology, &generation.obstacles, body.cells(), body.head(), goal),
        Ok(true)
    );
}

#[test]
fn crowded_board_degrades_to_fewer_obstacles() {
    let topology = GridTopology::new(3, 3).expect("topology");
    let body = BodyView::new(&topology, vec![Cell::new(0, 0)]).expect("body");
    let goal = Cell::new(2, 2);
    let mut generator = ObstacleGenerator::default();

    let generation = generator
        .generate(
            &topology,
            &body,
            goal,
            GenerationRequest::new(ObstaclePattern::SafeRandom, 9),
        )
        .expect("valid request");

    // The 3x3 buffers around head and goal cover the whole board.
    assert_eq!(generation.obstacles, ObstacleSet::new());
    assert_eq!(generation.shortfall(), 9);
}

#[test]
fn body_that_already_separates_head_and_goal_yields_an_empty_board() {
    let topology = GridTopology::new(5, 3).expect("topology");
    // Every neighbor of the head is a body segment.
    let body = BodyView::new(
        &topology,
        vec![
            Cell::new(2, 1),
            Cell::new(2, 0),
            Cell::new(1, 0),
            Cell::new(1, 1),
            Cell::new(1, 2),
            Cell::new(2, 2),
            Cell::new(3, 2),
            Cell::new(3, 1),
        ],
    )
    .expect("body");
    let mut generator = ObstacleGenerator::default();

    let generation = generator
        .generate(
            &topology,
            &body,
            Cell::new(4, 0),
            GenerationRequest::new(ObstaclePattern::SafeRandom, 5),
        )
        .expect("valid request");

    assert!(generation.obstacles.is_empty());
}
