use macroquad::prelude::*;
use std::ops::Range;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

use gridscout_kinematics::Twist;
use gridscout_mapping::map::{CELL_SIZE, Frontier, find_frontiers_in};
use gridscout_mapping::{CellState, GridPoint, GridView, World, WorldPoint};

use crate::blackboard::{Blackboard, Frame, Telemetry, capture};
use crate::bus::Topic;
use crate::config::{RobotConfig, WindowConfig};
use crate::teleop::{DriveKeys, quit_requested};

pub fn window_conf(window: &WindowConfig) -> Conf {
    Conf {
        window_title: window.title.clone(),
        window_width: window.width,
        window_height: window.height,
        high_dpi: true,
        ..Default::default()
    }
}

const TENTATIVE: Color = Color::new(0.0, 0.5, 0.0, 1.0);
const FRONTIER: Color = Color::new(1.0, 0.85, 0.0, 0.35);
const HUD_FONT: f32 = 20.0;

/// Screen window onto the world, one pixel per world unit, centred on the robot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    focus: WorldPoint,
    half_width: f64,
    half_height: f64,
}

impl Viewport {
    pub fn new(focus: WorldPoint, screen_width: f32, screen_height: f32) -> Self {
        Self {
            focus,
            half_width: f64::from(screen_width) / 2.0,
            half_height: f64::from(screen_height) / 2.0,
        }
    }

    pub fn to_screen(&self, p: WorldPoint) -> Vec2 {
        vec2(
            (p.x - self.focus.x + self.half_width) as f32,
            (p.y - self.focus.y + self.half_height) as f32,
        )
    }

    /// Cells of a `width` x `height` grid that overlap the screen.
    pub fn visible_cells(&self, width: usize, height: usize) -> (Range<usize>, Range<usize>) {
        let first = |lo: f64, limit: usize| to_cell((lo / CELL_SIZE).floor(), limit);
        let last = |hi: f64, limit: usize| to_cell((hi / CELL_SIZE).ceil(), limit);
        (
            first(self.focus.x - self.half_width, width)..last(self.focus.x + self.half_width, width),
            first(self.focus.y - self.half_height, height)..last(self.focus.y + self.half_height, height),
        )
    }
}

fn to_cell(coord: f64, limit: usize) -> usize {
    if !(coord > 0.0) {
        0
    } else if coord >= limit as f64 {
        limit
    } else {
        coord as usize
    }
}

/// Colour of a mapped cell and whether it is filled. Unexplored cells are not drawn.
fn cell_style(state: CellState) -> Option<(Color, bool)> {
    match state {
        CellState::Unexplored => None,
        CellState::Clear => Some((GRAY, false)),
        CellState::ObstacleTentative => Some((TENTATIVE, true)),
        CellState::ObstacleConfirmed => Some((GREEN, true)),
    }
}

/// Render loop. Publishes a teleop command every frame and draws the latest
/// frame copied from the blackboard. Returns when the user quits.
pub async fn run_visualization_loop(
    bb: Blackboard,
    cmd_topic: Topic<Twist>,
    robot: RobotConfig,
    world: World,
    shutdown: Arc<AtomicBool>,
) {
    info!("Visualization loop started.");
    let mut frame = Frame::default();

    while !shutdown.load(Ordering::Relaxed) {
        if quit_requested() {
            info!("Quit requested.");
            shutdown.store(true, Ordering::Relaxed);
            break;
        }
        cmd_topic.publish(DriveKeys::poll().twist(&robot));

        let (sw, sh) = (screen_width(), screen_height());
        capture(&bb, &mut frame, |pose, width, height| {
            Viewport::new(WorldPoint::from(*pose), sw, sh).visible_cells(width, height)
        });
        let Some(view) = GridView::from_parts(frame.width, frame.height, &frame.cells) else {
            warn!(width = frame.width, height = frame.height, "Captured frame is inconsistent, skipping.");
            next_frame().await;
            continue;
        };
        let (xs, ys) = frame.visible.clone();
        let frontiers = find_frontiers_in(&view, xs, ys);
        let viewport = Viewport::new(WorldPoint::from(frame.telemetry.pose), sw, sh);

        clear_background(BLACK);
        draw_grid(&view, frame.origin, &viewport);
        draw_frontiers(&frontiers, frame.origin, &viewport);
        draw_obstacles(&world, &viewport);
        draw_path(&frame.path, &viewport);
        draw_robot(&frame.telemetry, &robot, &viewport);
        draw_hud(&frame, frontiers.len());

        next_frame().await
    }

    info!("Visualization loop finished.");
}

/// Screen position of the top-left corner of a frame cell. `origin` is the
/// grid cell the frame starts at.
fn cell_corner(origin: GridPoint, p: GridPoint, viewport: &Viewport) -> Vec2 {
    let (x, y) = (origin.x + p.x, origin.y + p.y);
    viewport.to_screen(WorldPoint::new(x as f64 * CELL_SIZE, y as f64 * CELL_SIZE))
}

fn draw_grid(view: &GridView<'_>, origin: GridPoint, viewport: &Viewport) {
    let size = CELL_SIZE as f32;
    for (p, state) in view.iter() {
        let Some((color, filled)) = cell_style(state) else {
            continue;
        };
        let corner = cell_corner(origin, p, viewport);
        if filled {
            draw_rectangle(corner.x, corner.y, size, size, color);
        } else {
            draw_rectangle_lines(corner.x, corner.y, size, size, 1.0, color);
        }
    }
}

fn draw_frontiers(frontiers: &[Frontier], origin: GridPoint, viewport: &Viewport) {
    let size = CELL_SIZE as f32;
    for frontier in frontiers {
        let corner = cell_corner(origin, frontier.point, viewport);
        draw_rectangle(corner.x, corner.y, size, size, FRONTIER);
    }
}

fn draw_obstacles(world: &World, viewport: &Viewport) {
    for obstacle in world.obstacles.iter().filter(|o| !o.is_empty()) {
        let corner = viewport.to_screen(WorldPoint::new(obstacle.x, obstacle.y));
        draw_rectangle_lines(
            corner.x,
            corner.y,
            obstacle.width as f32,
            obstacle.height as f32,
            2.0,
            RED,
        );
    }
}

fn draw_path(path: &[WorldPoint], viewport: &Viewport) {
    for pair in path.windows(2) {
        let (a, b) = (viewport.to_screen(pair[0]), viewport.to_screen(pair[1]));
        draw_line(a.x, a.y, b.x, b.y, 1.0, SKYBLUE);
    }
}

fn draw_robot(t: &Telemetry, robot: &RobotConfig, viewport: &Viewport) {
    let center = viewport.to_screen(WorldPoint::from(t.pose));

    let (bx, by) = t.pose.point_ahead(t.reading);
    let beam_end = viewport.to_screen(WorldPoint::new(bx, by));
    draw_line(center.x, center.y, beam_end.x, beam_end.y, 1.0, YELLOW);

    draw_circle(center.x, center.y, robot.radius as f32, BLUE);
    let (hx, hy) = t.pose.point_ahead(robot.radius);
    let nose = viewport.to_screen(WorldPoint::new(hx, hy));
    draw_line(center.x, center.y, nose.x, nose.y, 2.0, WHITE);
}

fn draw_hud(frame: &Frame, frontiers_in_view: usize) {
    let (t, stats) = (&frame.telemetry, &frame.stats);
    let lines = [
        format!("Pose: {}  Cmd: {}", t.pose, t.twist),
        format!("Range: {:.0}", t.reading),
        format!(
            "Grid: {}x{}  clear {}  tentative {}  confirmed {}  frontiers in view {}",
            frame.grid_width,
            frame.grid_height,
            stats.clear,
            stats.tentative,
            stats.confirmed,
            frontiers_in_view
        ),
        format!("Tick: {}", t.tick),
    ];
    let mut y = 20.0;
    for line in &lines {
        draw_text(line, 10.0, y, HUD_FONT, WHITE);
        y += HUD_FONT;
    }
    if !t.faults.is_empty() {
        draw_text(&format!("Faults: {}", t.faults.join(", ")), 10.0, y, HUD_FONT, RED);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blackboard::{State, new_blackboard};
    use gridscout_kinematics::Pose;
    use gridscout_mapping::OccupancyGrid;

    const EPSILON: f32 = 1e-4;

    #[test]
    fn test_window_conf_uses_config() {
        let conf = window_conf(&WindowConfig::default());
        assert_eq!(conf.window_title, "gridscout");
        assert_eq!((conf.window_width, conf.window_height), (800, 600));
    }

    #[test]
    fn test_robot_is_screen_centre() {
        let viewport = Viewport::new(WorldPoint::new(1200.0, 300.0), 800.0, 600.0);
        let centre = viewport.to_screen(WorldPoint::new(1200.0, 300.0));
        assert!((centre.x - 400.0).abs() < EPSILON);
        assert!((centre.y - 300.0).abs() < EPSILON);

        let ahead = viewport.to_screen(WorldPoint::new(1250.0, 290.0));
        assert!((ahead.x - 450.0).abs() < EPSILON);
        assert!((ahead.y - 290.0).abs() < EPSILON);
    }

    #[test]
    fn test_visible_cells() {
        let viewport = Viewport::new(WorldPoint::new(400.0, 300.0), 800.0, 600.0);
        assert_eq!(viewport.visible_cells(80, 60), (0..80, 0..60));
        assert_eq!(viewport.visible_cells(200, 200), (0..80, 0..60));

        let viewport = Viewport::new(WorldPoint::new(1205.0, 300.0), 200.0, 100.0);
        assert_eq!(viewport.visible_cells(200, 60), (110..131, 25..35));
        // Looking past the edge of the map
        assert_eq!(viewport.visible_cells(100, 60), (100..100, 25..35));

        let lost = Viewport::new(WorldPoint::new(f64::NAN, 300.0), 800.0, 600.0);
        assert!(lost.visible_cells(80, 60).0.is_empty());
    }

    #[test]
    fn test_frame_covers_only_the_screen() {
        let pose = Pose::new(5000.0, 2500.0, 0.0);
        let bb = new_blackboard(State::new(pose, OccupancyGrid::new(1000, 500).unwrap(), 3));
        bb.write().grid.update(&pose, 60.0, 200.0);
        // Mapped but off screen
        bb.write().grid.update(&Pose::new(100.0, 100.0, 0.0), 60.0, 200.0);

        let mut frame = Frame::default();
        capture(&bb, &mut frame, |pose, width, height| {
            Viewport::new(WorldPoint::from(*pose), 800.0, 600.0).visible_cells(width, height)
        });
        // Screen covers cells 460..540 x 220..280, plus one cell of padding
        assert_eq!(frame.origin, GridPoint::new(459, 219));
        assert_eq!((frame.width, frame.height), (82, 62));
        assert_eq!(frame.stats.clear, 12);

        let view = GridView::from_parts(frame.width, frame.height, &frame.cells).unwrap();
        let (xs, ys) = frame.visible.clone();
        let frontiers = find_frontiers_in(&view, xs, ys);
        // Above, below and behind the six clear cells 500..=505 on row 250
        assert_eq!(frontiers.len(), 13);

        let viewport = Viewport::new(WorldPoint::from(pose), 800.0, 600.0);
        let behind = GridPoint::new(499 - 459, 250 - 219);
        assert!(frontiers.iter().any(|f| f.point == behind));
        let corner = cell_corner(frame.origin, behind, &viewport);
        assert!((corner.x - 390.0).abs() < EPSILON);
        assert!((corner.y - 300.0).abs() < EPSILON);
    }

    #[test]
    fn test_cell_style() {
        assert_eq!(cell_style(CellState::Unexplored), None);
        assert_eq!(cell_style(CellState::Clear), Some((GRAY, false)));
        assert_eq!(cell_style(CellState::ObstacleTentative), Some((TENTATIVE, true)));
        assert_eq!(cell_style(CellState::ObstacleConfirmed), Some((GREEN, true)));
    }
}
