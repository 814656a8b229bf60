//! Plain-text frames of the board for terminal output.

use std::collections::HashSet;

use torus_snake_core::{Cell, GridTopology, ObstacleSet};
use torus_snake_system_navigation::Route;

const EMPTY: char = '.';
const OBSTACLE: char = '#';
const HEAD: char = '@';
const SEGMENT: char = 'o';
const FOOD: char = '*';
const ROUTE: char = '+';

/// Everything drawn in a single frame.
#[derive(Clone, Copy, Debug)]
pub(crate) struct FrameInput<'a> {
    pub(crate) topology: &'a GridTopology,
    pub(crate) obstacles: &'a ObstacleSet,
    pub(crate) body: &'a [Cell],
    pub(crate) food: Cell,
    pub(crate) route: Option<&'a Route>,
}

/// Renders the board row by row, top row first.
///
/// Later layers win: route, then food, then body, then head.
pub(crate) fn frame(input: FrameInput<'_>) -> String {
    let route: HashSet<Cell> = input
        .route
        .map(|route| route.cells().iter().copied().collect())
        .unwrap_or_default();
    let head = input.body.first().copied();
    let segments: HashSet<Cell> = input.body.iter().skip(1).copied().collect();

    let columns = input.topology.columns() as usize;
    let mut text = String::with_capacity((columns + 1) * input.topology.rows() as usize);
    for row in 0..input.topology.rows() {
        for column in 0..input.topology.columns() {
            let cell = Cell::new(column, row);
            let glyph = if Some(cell) == head {
                HEAD
            } else if segments.contains(&cell) {
                SEGMENT
            } else if cell == input.food {
                FOOD
            } else if input.obstacles.contains(cell) {
                OBSTACLE
            } else if route.contains(&cell) {
                ROUTE
            } else {
                EMPTY
            };
            text.push(glyph);
        }
        text.push('\n');
    }
    text
}
