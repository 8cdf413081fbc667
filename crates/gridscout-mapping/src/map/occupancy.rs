#![warn(missing_docs)]

// NOTES:
// - Growth only extends the upper bounds. Cells never get renumbered, so
//   negative world coordinates are clamped onto row/column 0.
// - Memory is bounded by the total cell count, not per axis: a long straight
//   drive grows one axis and leaves the other small.

use gridscout_kinematics::Pose;
use tracing::debug;

use super::frontier::{self, Frontier};
use super::{GridPoint, WorldPoint};
use crate::error::MappingError;

/// Edge length of a square cell in world units.
pub const CELL_SIZE: f64 = 10.0;

/// Extra cells allocated past the triggering coordinate when the grid grows.
pub const GROWTH_MARGIN: usize = 10;

/// Number of terminal detections after which an obstacle cell is confirmed.
pub const CONFIRMATION_THRESHOLD: u32 = 3;

/// Largest number of cells (`width * height`) the grid will allocate.
/// Growth past it is refused and writes outside the extents are dropped.
pub const MAX_CELLS: usize = 1 << 26;

// Longest beam walked in one update, in cells.
const MAX_RAY_STEPS: usize = 1 << 16;

/// Classification of a single grid cell.
#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellState {
    /// Never visited or passed by a beam
    #[default]
    Unexplored = 0,
    /// The robot stood here or a beam passed through
    Clear = 1,
    /// A range reading terminated here, but fewer than [`CONFIRMATION_THRESHOLD`] times
    ObstacleTentative = 2,
    /// A range reading terminated here at least [`CONFIRMATION_THRESHOLD`] times.
    /// Cells never leave this state.
    ObstacleConfirmed = 3,
}

impl CellState {
    /// Converts the CellState to its u8 representation
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    /// Creates a CellState from a u8 value, or `None` for an unknown value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(CellState::Unexplored),
            1 => Some(CellState::Clear),
            2 => Some(CellState::ObstacleTentative),
            3 => Some(CellState::ObstacleConfirmed),
            _ => None,
        }
    }

    /// Returns `true` for tentative and confirmed obstacles.
    pub fn is_obstacle(&self) -> bool {
        matches!(self, CellState::ObstacleTentative | CellState::ObstacleConfirmed)
    }

    /// Single character used by the text rendering of the grid.
    pub fn symbol(&self) -> char {
        match self {
            CellState::Unexplored => '.',
            CellState::Clear => ' ',
            CellState::ObstacleTentative => '?',
            CellState::ObstacleConfirmed => '#',
        }
    }
}

impl std::fmt::Display for CellState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellState::Unexplored => write!(f, "Unexplored"),
            CellState::Clear => write!(f, "Clear"),
            CellState::ObstacleTentative => write!(f, "ObstacleTentative"),
            CellState::ObstacleConfirmed => write!(f, "ObstacleConfirmed"),
        }
    }
}

/// Number of cells in each classification.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridStats {
    /// Cells never observed
    pub unexplored: usize,
    /// Cells known to be free
    pub clear: usize,
    /// Cells with one or two terminal detections
    pub tentative: usize,
    /// Confirmed obstacle cells
    pub confirmed: usize,
}

impl GridStats {
    /// Total number of cells counted.
    pub fn total(&self) -> usize {
        self.unexplored + self.clear + self.tentative + self.confirmed
    }

    /// Number of cells that have been observed at least once.
    pub fn explored(&self) -> usize {
        self.total() - self.unexplored
    }

    fn count_mut(&mut self, state: CellState) -> &mut usize {
        match state {
            CellState::Unexplored => &mut self.unexplored,
            CellState::Clear => &mut self.clear,
            CellState::ObstacleTentative => &mut self.tentative,
            CellState::ObstacleConfirmed => &mut self.confirmed,
        }
    }
}

/// An occupancy grid built incrementally from single-beam range readings.
///
/// Storage is two parallel row-major arrays (classification and terminal
/// detection count) that grow on demand whenever an update touches a cell
/// outside the current extents. The grid origin is fixed at world `(0, 0)`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OccupancyGrid {
    /// Width of the grid in cells
    width: usize,
    /// Height of the grid in cells
    height: usize,
    /// Classification of each cell
    cells: Vec<CellState>,
    /// Number of range readings that terminated in each cell
    detections: Vec<u32>,
    /// Per-classification counts, kept in step with `cells`
    stats: GridStats,
}

impl OccupancyGrid {
    /// Creates a new, fully unexplored grid.
    ///
    /// # Arguments
    /// * `width` - Initial width of the grid in cells
    /// * `height` - Initial height of the grid in cells
    ///
    /// # Returns
    /// * `Result<Self, MappingError>` - The created grid or an error if the dimensions are invalid
    pub fn new(width: usize, height: usize) -> Result<Self, MappingError> {
        if width == 0 || height == 0 {
            return Err(MappingError::InvalidDimensions("Width and height must be non-zero"));
        }
        let len = match width.checked_mul(height) {
            Some(len) if len <= MAX_CELLS => len,
            _ => return Err(MappingError::InvalidDimensions("Grid must not exceed MAX_CELLS cells")),
        };

        Ok(OccupancyGrid {
            width,
            height,
            cells: vec![CellState::Unexplored; len],
            detections: vec![0; len],
            stats: GridStats {
                unexplored: len,
                ..GridStats::default()
            },
        })
    }

    /// Width of the grid in cells.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height of the grid in cells.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns `true` if the cell lies inside the current extents.
    pub fn contains(&self, p: GridPoint) -> bool {
        p.x < self.width && p.y < self.height
    }

    fn index(&self, p: GridPoint) -> usize {
        p.y * self.width + p.x
    }

    /// Classification of a cell, or `None` outside the current extents.
    pub fn cell(&self, p: GridPoint) -> Option<CellState> {
        self.contains(p).then(|| self.cells[self.index(p)])
    }

    /// Terminal detection count of a cell, or `None` outside the current extents.
    pub fn detection_count(&self, p: GridPoint) -> Option<u32> {
        self.contains(p).then(|| self.detections[self.index(p)])
    }

    /// Converts world coordinates to the cell containing them.
    ///
    /// Uses floor division by [`CELL_SIZE`]. Negative and NaN coordinates map
    /// to 0. Coordinates too large for `usize` saturate; the grid refuses to
    /// grow that far, so such cells are never written.
    pub fn world_to_grid(world_p: WorldPoint) -> GridPoint {
        GridPoint::new(
            axis_to_cell((world_p.x / CELL_SIZE).floor()),
            axis_to_cell((world_p.y / CELL_SIZE).floor()),
        )
    }

    /// Converts grid coordinates to the world coordinates of the cell centre.
    pub fn grid_to_world(grid_p: GridPoint) -> WorldPoint {
        WorldPoint::new(
            (grid_p.x as f64 + 0.5) * CELL_SIZE,
            (grid_p.y as f64 + 0.5) * CELL_SIZE,
        )
    }

    /// The cell `distance` units away from `origin` along `direction`.
    ///
    /// The offset is truncated towards zero per axis, so a beam at a shallow
    /// angle stays in the origin row until it has covered a whole cell.
    fn cell_along(origin: GridPoint, direction: (f64, f64), distance: f64) -> GridPoint {
        GridPoint::new(
            offset_axis(origin.x, distance * direction.0),
            offset_axis(origin.y, distance * direction.1),
        )
    }

    /// Grows the backing storage so that `p` is inside the extents.
    ///
    /// Each exceeded axis is extended to `p + 1 + GROWTH_MARGIN` cells.
    /// Existing cells keep their coordinates. Growth that would take the grid
    /// past [`MAX_CELLS`] is refused. Returns `true` if the grid was
    /// reallocated.
    fn ensure_capacity(&mut self, p: GridPoint) -> bool {
        if self.contains(p) {
            return false;
        }

        let extend = |coord: usize, extent: usize| {
            if coord < extent {
                Some(extent)
            } else {
                coord.checked_add(1 + GROWTH_MARGIN)
            }
        };
        let size = extend(p.x, self.width).zip(extend(p.y, self.height)).and_then(|(w, h)| {
            w.checked_mul(h)
                .filter(|len| *len <= MAX_CELLS)
                .map(|len| (w, h, len))
        });
        let Some((new_width, new_height, len)) = size else {
            debug!(
                width = self.width,
                height = self.height,
                trigger_x = p.x,
                trigger_y = p.y,
                "Refused to grow occupancy grid past MAX_CELLS"
            );
            return false;
        };

        let mut cells = vec![CellState::Unexplored; len];
        let mut detections = vec![0; len];
        for y in 0..self.height {
            let src = y * self.width..(y + 1) * self.width;
            let dst = y * new_width..y * new_width + self.width;
            cells[dst.clone()].copy_from_slice(&self.cells[src.clone()]);
            detections[dst].copy_from_slice(&self.detections[src]);
        }

        debug!(
            old_width = self.width,
            old_height = self.height,
            new_width,
            new_height,
            trigger_x = p.x,
            trigger_y = p.y,
            "Grew occupancy grid"
        );

        self.stats.unexplored += len - self.cells.len();
        self.width = new_width;
        self.height = new_height;
        self.cells = cells;
        self.detections = detections;
        true
    }

    fn set_state(&mut self, index: usize, next: CellState) {
        let previous = self.cells[index];
        if previous != next {
            *self.stats.count_mut(previous) -= 1;
            *self.stats.count_mut(next) += 1;
            self.cells[index] = next;
        }
    }

    /// Marks a cell clear unless a range reading has ended there.
    /// Cells outside the extents are skipped.
    fn mark_clear(&mut self, p: GridPoint) {
        if !self.contains(p) {
            return;
        }
        let index = self.index(p);
        if self.detections[index] == 0 {
            self.set_state(index, CellState::Clear);
        }
    }

    /// Counts a terminal detection and applies the confirmation hysteresis.
    /// Cells outside the extents are skipped.
    fn record_detection(&mut self, p: GridPoint) {
        if !self.contains(p) {
            return;
        }
        let index = self.index(p);
        let count = self.detections[index].saturating_add(1);
        self.detections[index] = count;

        let next = if count >= CONFIRMATION_THRESHOLD {
            CellState::ObstacleConfirmed
        } else {
            CellState::ObstacleTentative
        };
        if next == CellState::ObstacleConfirmed && self.cells[index] != next {
            debug!(x = p.x, y = p.y, count, "Obstacle confirmed");
        }
        self.set_state(index, next);
    }

    /// Integrates one range reading taken from `pose`.
    ///
    /// The beam points along `pose.heading_deg`; there is no separate heading
    /// argument. The robot's cell and every cell the beam passes at 10-unit
    /// intervals short of `range_reading` are marked clear. If
    /// `range_reading` is below `max_range` the beam hit something, and the
    /// terminal cell gets one more detection. Readings at or above
    /// `max_range` write no terminal cell.
    ///
    /// The grid grows before writing cells outside its extents. This never
    /// fails: NaN and negative readings clear only the robot's cell.
    ///
    /// # Arguments
    /// * `pose` - Robot pose; the beam points along `pose.heading_deg`
    /// * `range_reading` - Distance reported by the range sensor
    /// * `max_range` - The sensor's maximum range
    pub fn update(&mut self, pose: &Pose, range_reading: f64, max_range: f64) {
        let reading = if range_reading > max_range { max_range } else { range_reading };
        let origin = Self::world_to_grid(WorldPoint::from(*pose));
        let direction = pose.direction();

        self.ensure_capacity(origin);
        self.mark_clear(origin);

        let steps = traversal_steps(reading);
        if steps > 0 {
            // Beam cells move monotonically away from the origin, so growing
            // for the last one covers the whole walk in one reallocation.
            self.ensure_capacity(Self::cell_along(origin, direction, steps as f64 * CELL_SIZE));
            for step in 1..=steps {
                let cell = Self::cell_along(origin, direction, step as f64 * CELL_SIZE);
                self.mark_clear(cell);
            }
        }

        if (0.0..max_range).contains(&reading) {
            let terminal = Self::cell_along(origin, direction, reading);
            self.ensure_capacity(terminal);
            self.record_detection(terminal);
        }
    }

    /// Read-only view of the current classification array.
    ///
    /// The view borrows the grid, so it has to be dropped before the next
    /// [`OccupancyGrid::update`].
    pub fn snapshot(&self) -> GridView<'_> {
        GridView {
            width: self.width,
            height: self.height,
            cells: &self.cells,
        }
    }

    /// Counts cells per classification. Constant time.
    pub fn stats(&self) -> GridStats {
        self.stats
    }

    /// Unexplored cells bordering clear space.
    pub fn frontiers(&self) -> Vec<Frontier> {
        frontier::find_frontiers(&self.snapshot())
    }
}

/// Converts a floored cell coordinate into an index. Negative and NaN map to
/// 0, values past `usize::MAX` saturate.
fn axis_to_cell(coord: f64) -> usize {
    if coord > 0.0 { coord as usize } else { 0 }
}

/// Moves `origin` by `offset` world units, truncated to whole cells.
fn offset_axis(origin: usize, offset: f64) -> usize {
    // NaN truncates to 0
    let cells = (offset / CELL_SIZE) as i64;
    if cells >= 0 {
        origin.saturating_add(cells as usize)
    } else {
        origin.saturating_sub(cells.unsigned_abs() as usize)
    }
}

/// Number of intermediate samples `10, 20, ...` strictly below `reading`.
fn traversal_steps(reading: f64) -> usize {
    if !(reading > CELL_SIZE) {
        return 0;
    }
    let steps = (reading / CELL_SIZE).ceil() - 1.0;
    if steps >= MAX_RAY_STEPS as f64 {
        MAX_RAY_STEPS
    } else {
        steps as usize
    }
}

/// Borrowed, read-only view of an [`OccupancyGrid`]'s classifications.
#[derive(Debug, Clone, Copy)]
pub struct GridView<'a> {
    width: usize,
    height: usize,
    cells: &'a [CellState],
}

impl<'a> GridView<'a> {
    /// Wraps a copied classification array, e.g. one captured for rendering.
    ///
    /// Returns `None` unless `cells.len() == width * height`.
    pub fn from_parts(width: usize, height: usize, cells: &'a [CellState]) -> Option<Self> {
        (width.checked_mul(height) == Some(cells.len())).then_some(Self { width, height, cells })
    }

    /// Width of the grid in cells.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height of the grid in cells.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major classification array (`index = y * width + x`).
    pub fn cells(&self) -> &'a [CellState] {
        self.cells
    }

    /// Classification of a cell, or `None` outside the extents.
    pub fn get(&self, p: GridPoint) -> Option<CellState> {
        if p.x < self.width && p.y < self.height {
            Some(self.cells[p.y * self.width + p.x])
        } else {
            None
        }
    }

    /// Cells of row `y`, or `None` past the last row.
    pub fn row(&self, y: usize) -> Option<&'a [CellState]> {
        (y < self.height).then(|| &self.cells[y * self.width..(y + 1) * self.width])
    }

    /// Iterates over every cell with its coordinates, row by row.
    pub fn iter(&self) -> impl Iterator<Item = (GridPoint, CellState)> + 'a {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, state)| (GridPoint::new(i % width, i / width), *state))
    }

    /// Counts cells per classification.
    pub fn stats(&self) -> GridStats {
        let mut stats = GridStats::default();
        for state in self.cells {
            match state {
                CellState::Unexplored => stats.unexplored += 1,
                CellState::Clear => stats.clear += 1,
                CellState::ObstacleTentative => stats.tentative += 1,
                CellState::ObstacleConfirmed => stats.confirmed += 1,
            }
        }
        stats
    }
}

impl std::fmt::Display for OccupancyGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "OccupancyGrid ({}x{}, cell size: {})",
            self.width, self.height, CELL_SIZE
        )?;
        for row in self.cells.chunks(self.width) {
            for state in row {
                write!(f, "{}", state.symbol())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
