//! Map-related functionality for mapping.
//!
//! This module provides the incrementally grown occupancy grid, the point
//! types used to address it, and frontier queries over it.

pub mod frontier;
pub mod occupancy;
pub mod point_types;

pub use frontier::{Frontier, closest_frontier, find_frontiers, find_frontiers_in};
pub use occupancy::{
    CELL_SIZE, CONFIRMATION_THRESHOLD, CellState, GROWTH_MARGIN, GridStats, GridView, MAX_CELLS,
    OccupancyGrid,
};
pub use point_types::{GridPoint, WorldPoint};
