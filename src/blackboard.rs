use parking_lot::RwLock;
use std::{collections::VecDeque, ops::Range, sync::Arc, time::Instant};

use gridscout_kinematics::{Pose, Twist};
use gridscout_mapping::{CellState, GridPoint, GridStats, OccupancyGrid, WorldPoint};

/// Shared simulation state. The simulation thread is the only writer of the
/// grid and takes the write lock once per tick.
pub struct State {
    pub pose: Pose,
    pub twist: Twist,
    pub reading: f64,
    pub grid: OccupancyGrid,
    pub path: VecDeque<WorldPoint>,
    pub path_len: usize,
    pub tick: u64,
    pub last_cmd_ts: Instant,
    pub faults: Vec<String>,
}

impl State {
    pub fn new(pose: Pose, grid: OccupancyGrid, path_len: usize) -> Self {
        State {
            pose,
            twist: Twist::stop(),
            reading: 0.0,
            grid,
            path: VecDeque::new(),
            path_len,
            tick: 0,
            last_cmd_ts: Instant::now(),
            faults: Vec::new(),
        }
    }

    pub fn telemetry(&self) -> Telemetry {
        Telemetry {
            pose: self.pose,
            twist: self.twist,
            reading: self.reading,
            tick: self.tick,
            faults: self.faults.clone(),
        }
    }

    /// Appends a position to the trail, dropping the oldest beyond `path_len`.
    pub fn record_path(&mut self, p: WorldPoint) {
        if self.path.back() == Some(&p) {
            return;
        }
        self.path.push_back(p);
        while self.path.len() > self.path_len {
            self.path.pop_front();
        }
    }
}

/// Everything the HUD shows except the map itself.
#[derive(Debug, Clone, Default)]
pub struct Telemetry {
    pub pose: Pose,
    pub twist: Twist,
    pub reading: f64,
    pub tick: u64,
    pub faults: Vec<String>,
}

/// A copy of the state taken for one rendered frame. Only a window of the
/// grid is copied: `cells` is `width` x `height` with its top-left cell at
/// `origin` in grid coordinates.
#[derive(Debug, Default)]
pub struct Frame {
    pub telemetry: Telemetry,
    pub grid_width: usize,
    pub grid_height: usize,
    pub stats: GridStats,
    pub origin: GridPoint,
    pub width: usize,
    pub height: usize,
    pub cells: Vec<CellState>,
    /// The requested window in frame-local coordinates
    pub visible: (Range<usize>, Range<usize>),
    pub path: Vec<WorldPoint>,
}

pub type Blackboard = Arc<RwLock<State>>;

pub fn new_blackboard(state: State) -> Blackboard {
    Arc::new(RwLock::new(state))
}

pub fn snapshot(bb: &Blackboard) -> Telemetry {
    bb.read().telemetry()
}

/// Copies the trail and a window of the grid into `frame`, reusing its
/// buffers. `window` picks the cells to copy from the pose and the grid
/// size. One extra cell is copied on each side so frontiers on the window
/// edge see their neighbours.
pub fn capture<F>(bb: &Blackboard, frame: &mut Frame, window: F)
where
    F: FnOnce(&Pose, usize, usize) -> (Range<usize>, Range<usize>),
{
    let g = bb.read();
    let view = g.grid.snapshot();
    let (xs, ys) = window(&g.pose, view.width(), view.height());
    let (xs, ys) = (clip(xs, view.width()), clip(ys, view.height()));
    let (padded_xs, padded_ys) = (pad(&xs, view.width()), pad(&ys, view.height()));

    frame.grid_width = view.width();
    frame.grid_height = view.height();
    frame.stats = g.grid.stats();
    frame.origin = GridPoint::new(padded_xs.start, padded_ys.start);
    frame.width = padded_xs.len();
    frame.height = padded_ys.len();
    frame.cells.clear();
    for y in padded_ys.clone() {
        if let Some(row) = view.row(y) {
            frame.cells.extend_from_slice(&row[padded_xs.clone()]);
        }
    }
    frame.visible = (
        xs.start - padded_xs.start..xs.end - padded_xs.start,
        ys.start - padded_ys.start..ys.end - padded_ys.start,
    );
    frame.path.clear();
    frame.path.extend(g.path.iter().copied());
    frame.telemetry = g.telemetry();
}

fn clip(range: Range<usize>, limit: usize) -> Range<usize> {
    let start = range.start.min(limit);
    start..range.end.clamp(start, limit)
}

fn pad(range: &Range<usize>, limit: usize) -> Range<usize> {
    range.start.saturating_sub(1)..range.end.saturating_add(1).min(limit)
}

pub fn touch_cmd(bb: &Blackboard) {
    bb.write().last_cmd_ts = Instant::now();
}

pub fn raise_fault(bb: &Blackboard, msg: &str) {
    let mut g = bb.write();
    if !g.faults.iter().any(|s| s == msg) {
        g.faults.push(msg.to_string());
    }
}

pub fn clear_fault(bb: &Blackboard, msg: &str) {
    bb.write().faults.retain(|s| s != msg);
}
