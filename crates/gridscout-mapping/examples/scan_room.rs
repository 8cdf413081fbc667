use gridscout_kinematics::{Pose, Twist};
use gridscout_mapping::map::closest_frontier;
use gridscout_mapping::{OccupancyGrid, RangeSensor, World};

fn main() {
    let world = World::default();
    let sensor = RangeSensor::default();
    let mut grid = OccupancyGrid::new(40, 30).unwrap();

    // Spin on the spot a full turn, then drive right and spin again
    let mut pose = Pose::new(300.0, 260.0, 0.0);
    let spin = Twist::new(0.0, 10.0);
    let drive = Twist::new(20.0, 0.0);
    let dt = 1.0;

    let mut ticks = 0;
    for command in [(spin, 36), (drive, 20), (spin, 36)] {
        for _ in 0..command.1 {
            let reading = sensor.cast(&pose, &world.obstacles);
            grid.update(&pose, reading, sensor.max_range());
            pose = pose.advance(command.0, dt).unwrap();
            ticks += 1;
        }
    }

    println!("{}", grid);

    let stats = grid.stats();
    println!("Ticks: {}", ticks);
    println!("Final pose: {}", pose);
    println!(
        "Cells: {} clear, {} tentative, {} confirmed, {} unexplored",
        stats.clear, stats.tentative, stats.confirmed, stats.unexplored
    );

    let robot_cell = OccupancyGrid::world_to_grid(pose.into());
    let frontiers = grid.frontiers();
    match closest_frontier(&frontiers, robot_cell) {
        Some(frontier) => println!(
            "{} frontier cells, closest to robot cell {:?} is {:?}",
            frontiers.len(),
            robot_cell,
            frontier.point
        ),
        None => println!("No frontier cells left"),
    }
}
