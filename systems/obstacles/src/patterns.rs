//! Structural templates laid out before the protected zone is subtracted.

use std::collections::BTreeSet;

use torus_snake_core::{Cell, GridTopology};

/// Vertical walls every eight columns with a gap on every fourth row.
pub(crate) fn corridor(topology: &GridTopology) -> BTreeSet<Cell> {
    let (columns, rows) = (topology.columns(), topology.rows());
    let mut wall_columns: Vec<u32> = (5..columns.saturating_sub(5)).step_by(8).collect();
    if wall_columns.is_empty() {
        wall_columns.push(columns / 2);
    }

    let mut cells = BTreeSet::new();
    for column in wall_columns {
        for row in 2..rows.saturating_sub(2) {
            if row % 4 != 0 {
                let _ = cells.insert(Cell::new(column, row));
            }
        }
    }
    cells
}

/// Five plus-shaped clusters: four near the quadrant centres and one in the middle.
pub(crate) fn island(topology: &GridTopology) -> BTreeSet<Cell> {
    let (columns, rows) = (topology.columns(), topology.rows());
    let near = |extent: u32, numerator: u32, denominator: u32| extent * numerator / denominator;
    let centres = [
        (near(columns, 7, 30), near(rows, 1, 4)),
        (near(columns, 22, 30), near(rows, 1, 4)),
        (near(columns, 7, 30), near(rows, 7, 10)),
        (near(columns, 22, 30), near(rows, 7, 10)),
        (columns / 2, rows / 2),
    ];

    let mut cells = BTreeSet::new();
    for (column, row) in centres {
        let centre = Cell::new(column, row);
        let _ = cells.insert(centre);
        cells.extend(topology.neighbors(centre));
    }
    cells
}

/// Lattice of wall pairs on every fourth column and row.
pub(crate) fn maze(topology: &GridTopology) -> BTreeSet<Cell> {
    let (columns, rows) = (topology.columns(), topology.rows());

    let mut cells = BTreeSet::new();
    for column in (0..columns).step_by(4) {
        for row in (2..rows.saturating_sub(2)).step_by(4) {
            let _ = cells.insert(Cell::new(column, row));
            if column + 2 < columns {
                let _ = cells.insert(Cell::new(column + 2, row));
            }
        }
    }
    cells
}
