use std::ops::Range;

use super::occupancy::{CellState, GridView};
use super::GridPoint;

/// An unexplored cell that borders clear space.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Frontier {
    /// The frontier cell itself (unexplored).
    pub point: GridPoint,
    /// 4-connected neighbours of `point` that are known to be clear.
    pub adjacent_clear: Vec<GridPoint>,
}

impl Frontier {
    /// Creates a new frontier.
    pub fn new(point: GridPoint, adjacent_clear: Vec<GridPoint>) -> Self {
        Self { point, adjacent_clear }
    }
}

/// Finds every frontier cell in the view, in row-major order.
///
/// A frontier cell is an unexplored cell that is 4-adjacent to a clear cell.
/// Frontiers are derived on demand and never stored in the grid.
pub fn find_frontiers(view: &GridView<'_>) -> Vec<Frontier> {
    find_frontiers_in(view, 0..view.width(), 0..view.height())
}

/// Like [`find_frontiers`], but only reports frontier cells with `x` in `xs`
/// and `y` in `ys`. Neighbours outside the window still count, so the result
/// is the full-grid result restricted to the window. Ranges are clipped to
/// the view.
pub fn find_frontiers_in(view: &GridView<'_>, xs: Range<usize>, ys: Range<usize>) -> Vec<Frontier> {
    let (width, height) = (view.width(), view.height());
    let mut frontiers = Vec::new();

    for y in ys.start..ys.end.min(height) {
        for x in xs.start..xs.end.min(width) {
            let point = GridPoint::new(x, y);
            if view.get(point) != Some(CellState::Unexplored) {
                continue;
            }
            let adjacent_clear: Vec<GridPoint> = neighbors(point, width, height)
                .filter(|n| view.get(*n) == Some(CellState::Clear))
                .collect();
            if !adjacent_clear.is_empty() {
                frontiers.push(Frontier::new(point, adjacent_clear));
            }
        }
    }
    frontiers
}

/// 4-connected neighbours of a cell that lie inside a `width` x `height` grid.
fn neighbors(point: GridPoint, width: usize, height: usize) -> impl Iterator<Item = GridPoint> {
    let GridPoint { x, y } = point;
    [
        (y > 0).then(|| GridPoint::new(x, y - 1)),
        (y + 1 < height).then(|| GridPoint::new(x, y + 1)),
        (x > 0).then(|| GridPoint::new(x - 1, y)),
        (x + 1 < width).then(|| GridPoint::new(x + 1, y)),
    ]
    .into_iter()
    .flatten()
}

/// Selects the frontier closest to `current` by Manhattan distance.
///
/// Ties go to the frontier found first (row-major order).
pub fn closest_frontier(frontiers: &[Frontier], current: GridPoint) -> Option<&Frontier> {
    frontiers.iter().min_by_key(|frontier| frontier.point.manhattan(current))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::OccupancyGrid;
    use gridscout_kinematics::Pose;

    #[test]
    fn test_get_neighbors() {
        let mut corner: Vec<GridPoint> = neighbors(GridPoint::new(0, 0), 5, 5).collect();
        corner.sort_by_key(|p| (p.y, p.x));
        assert_eq!(corner, vec![GridPoint::new(1, 0), GridPoint::new(0, 1)]);

        let mut edge: Vec<GridPoint> = neighbors(GridPoint::new(2, 0), 5, 5).collect();
        edge.sort_by_key(|p| (p.y, p.x));
        assert_eq!(edge, vec![GridPoint::new(1, 0), GridPoint::new(3, 0), GridPoint::new(2, 1)]);

        let mut far_corner: Vec<GridPoint> = neighbors(GridPoint::new(4, 4), 5, 5).collect();
        far_corner.sort_by_key(|p| (p.y, p.x));
        assert_eq!(far_corner, vec![GridPoint::new(4, 3), GridPoint::new(3, 4)]);

        assert_eq!(neighbors(GridPoint::new(2, 2), 5, 5).count(), 4);
    }

    #[test]
    fn test_find_frontiers_along_beam() {
        let mut grid = OccupancyGrid::new(10, 3).unwrap();
        // Robot in (1,1), beam along +x hits at 40 units -> (5,1)
        grid.update(&Pose::new(15.0, 15.0, 0.0), 40.0, 200.0);

        let frontiers = grid.frontiers();
        let points: Vec<GridPoint> = frontiers.iter().map(|f| f.point).collect();
        // Cells above and below the clear run (1..=4, 1), plus the cell left of it.
        // The tentative obstacle at (5,1) does not make its neighbours frontiers.
        let mut expected: Vec<GridPoint> = (1..=4).map(|x| GridPoint::new(x, 0)).collect();
        expected.push(GridPoint::new(0, 1));
        expected.extend((1..=4).map(|x| GridPoint::new(x, 2)));
        assert_eq!(points, expected);

        let left = frontiers.iter().find(|f| f.point == GridPoint::new(0, 1)).unwrap();
        assert_eq!(left.adjacent_clear, vec![GridPoint::new(1, 1)]);
    }

    #[test]
    fn test_windowed_frontiers_match_full_scan() {
        let mut grid = OccupancyGrid::new(30, 20).unwrap();
        grid.update(&Pose::new(55.0, 105.0, 0.0), 120.0, 200.0);
        grid.update(&Pose::new(155.0, 25.0, 90.0), 90.0, 200.0);
        let view = grid.snapshot();
        let full = find_frontiers(&view);

        let (xs, ys) = (4..12, 9..12);
        let expected: Vec<Frontier> = full
            .iter()
            .filter(|f| xs.contains(&f.point.x) && ys.contains(&f.point.y))
            .cloned()
            .collect();
        assert!(!expected.is_empty());
        assert_eq!(find_frontiers_in(&view, xs, ys), expected);

        // Windows hanging off the grid are clipped, empty ones find nothing
        assert_eq!(find_frontiers_in(&view, 0..1000, 0..1000), full);
        assert!(find_frontiers_in(&view, 12..12, 0..20).is_empty());
        assert!(find_frontiers_in(&view, 40..50, 0..20).is_empty());
    }

    #[test]
    fn test_window_edge_sees_outside_neighbours() {
        let mut grid = OccupancyGrid::new(10, 3).unwrap();
        grid.update(&Pose::new(15.0, 15.0, 0.0), 40.0, 200.0);
        let view = grid.snapshot();

        // (0,1) borders the clear cell (1,1), which lies outside the window
        let edge = find_frontiers_in(&view, 0..1, 0..3);
        assert_eq!(edge.len(), 1);
        assert_eq!(edge[0].point, GridPoint::new(0, 1));
        assert_eq!(edge[0].adjacent_clear, vec![GridPoint::new(1, 1)]);
    }

    #[test]
    fn test_no_frontiers_on_unexplored_grid() {
        let grid = OccupancyGrid::new(5, 5).unwrap();
        assert!(grid.frontiers().is_empty());
    }

    #[test]
    fn test_select_closest_frontier() {
        let frontiers = vec![
            Frontier::new(GridPoint::new(2, 2), vec![GridPoint::new(1, 2)]),
            Frontier::new(GridPoint::new(7, 7), vec![GridPoint::new(7, 6)]),
            Frontier::new(GridPoint::new(2, 8), vec![GridPoint::new(2, 7)]),
        ];

        let selected = closest_frontier(&frontiers, GridPoint::new(0, 0));
        assert_eq!(selected.map(|f| f.point), Some(GridPoint::new(2, 2)));

        let selected = closest_frontier(&frontiers, GridPoint::new(2, 6));
        assert_eq!(selected.map(|f| f.point), Some(GridPoint::new(2, 8)));

        assert!(closest_frontier(&[], GridPoint::new(0, 0)).is_none());
    }
}
