use torus_snake_core::{BodyView, Cell, GridTopology, ObstacleSet, TailPolicy};

/// Dense impassability mask mirroring the board dimensions.
///
/// Built once per call from immutable snapshots; lookups are a single index
/// into a row-major vector.
#[derive(Clone, Debug)]
pub struct BlockedCells {
    topology: GridTopology,
    cells: Vec<bool>,
}

impl BlockedCells {
    /// Mask that blocks only the provided obstacles.
    #[must_use]
    pub fn from_obstacles(topology: &GridTopology, obstacles: &ObstacleSet) -> Self {
        let mut blocked = Self {
            topology: *topology,
            cells: vec![false; topology.cell_count()],
        };
        for cell in obstacles.iter() {
            blocked.block(cell);
        }
        blocked
    }

    /// Mask that blocks the obstacles plus an arbitrary set of extra cells.
    #[must_use]
    pub fn with_extra<I>(topology: &GridTopology, obstacles: &ObstacleSet, extra: I) -> Self
    where
        I: IntoIterator<Item = Cell>,
    {
        let mut blocked = Self::from_obstacles(topology, obstacles);
        for cell in extra {
            blocked.block(cell);
        }
        blocked
    }

    /// Mask used while steering the snake.
    ///
    /// Blocks the obstacles and every body segment except the head. The tail
    /// segment is left open under [`TailPolicy::Vacates`].
    #[must_use]
    pub fn for_agent(
        topology: &GridTopology,
        obstacles: &ObstacleSet,
        body: &BodyView,
        tail_policy: TailPolicy,
    ) -> Self {
        let segments = body.cells();
        let end = match tail_policy {
            TailPolicy::Vacates => segments.len().saturating_sub(1),
            TailPolicy::Blocks => segments.len(),
        };
        let trunk = segments.get(1..end.max(1)).unwrap_or(&[]);
        Self::with_extra(topology, obstacles, trunk.iter().copied())
    }

    /// Geometry the mask was built for.
    #[must_use]
    pub fn topology(&self) -> &GridTopology {
        &self.topology
    }

    /// Reports whether the cell is impassable. Cells outside the board count as blocked.
    #[must_use]
    pub fn is_blocked(&self, cell: Cell) -> bool {
        self.topology
            .index(cell)
            .and_then(|index| self.cells.get(index).copied())
            .unwrap_or(true)
    }

    /// Marks an additional cell as impassable.
    pub fn block(&mut self, cell: Cell) {
        if let Some(slot) = self
            .topology
            .index(cell)
            .and_then(|index| self.cells.get_mut(index))
        {
            *slot = true;
        }
    }
}
