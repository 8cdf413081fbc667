//! Incremental occupancy-grid mapping from a single forward-facing range sensor.
//!
//! Each simulation tick the host hands the robot's pose to a [`RangeSensor`],
//! then feeds the pose and the resulting reading to
//! [`OccupancyGrid::update`]. The grid grows as the robot explores and only
//! confirms an obstacle after repeated detections in the same cell.

pub mod error;
pub mod map;
pub mod sensor;
pub mod world;

pub use error::MappingError;
pub use map::{CellState, GridPoint, GridStats, GridView, OccupancyGrid, WorldPoint};
pub use sensor::RangeSensor;
pub use world::{Obstacle, World};

#[cfg(test)]
mod tests {
    use super::*;
    use gridscout_kinematics::Pose;

    #[test]
    fn test_sensor_feeds_grid() {
        let sensor = RangeSensor::default();
        let obstacles = [Obstacle::new(450.0, 290.0, 50.0, 50.0)];
        let mut grid = OccupancyGrid::new(80, 60).unwrap();
        let pose = Pose::new(400.0, 300.0, 0.0);
        let terminal = GridPoint::new(45, 30);

        let reading = sensor.cast(&pose, &obstacles);
        assert_eq!(reading, 50.0);

        grid.update(&pose, reading, sensor.max_range());
        assert_eq!(grid.cell(terminal), Some(CellState::ObstacleTentative));
        assert_eq!(grid.detection_count(terminal), Some(1));

        for _ in 0..2 {
            grid.update(&pose, sensor.cast(&pose, &obstacles), sensor.max_range());
        }
        assert_eq!(grid.cell(terminal), Some(CellState::ObstacleConfirmed));
    }

    #[test]
    fn test_open_field_writes_no_obstacle() {
        let sensor = RangeSensor::default();
        let mut grid = OccupancyGrid::new(80, 60).unwrap();
        let pose = Pose::new(400.0, 300.0, 0.0);

        let reading = sensor.cast(&pose, &World::empty().obstacles);
        grid.update(&pose, reading, sensor.max_range());

        let stats = grid.stats();
        assert_eq!(stats.tentative + stats.confirmed, 0);
        assert_eq!(grid.cell(GridPoint::new(40, 30)), Some(CellState::Clear));
    }

    #[test]
    fn test_error_display() {
        let err = OccupancyGrid::new(0, 1).unwrap_err();
        assert_eq!(err.to_string(), "Invalid grid dimensions: Width and height must be non-zero");
    }
}
