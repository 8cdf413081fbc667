//! Simulated single-beam range sensor.

use gridscout_kinematics::Pose;

use crate::error::MappingError;
use crate::map::WorldPoint;
use crate::world::Obstacle;

/// Default maximum range in world units.
pub const DEFAULT_MAX_RANGE: f64 = 200.0;

/// Default distance between beam samples in world units.
pub const DEFAULT_STEP: f64 = 5.0;

/// Upper bound on the number of samples a single cast may take.
pub const MAX_SAMPLES: usize = 100_000;

/// A forward-facing range sensor that marches a sample point along the
/// robot's heading.
///
/// The march is deliberately coarse: results are multiples of `step` (or
/// exactly `max_range`), which matches the resolution of the occupancy grid
/// consuming them.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RangeSensor {
    max_range: f64,
    step: f64,
}

impl RangeSensor {
    /// Creates a sensor.
    ///
    /// # Arguments
    /// * `max_range` - Reading reported when nothing is hit
    /// * `step` - Distance between beam samples
    ///
    /// # Returns
    /// * `Result<Self, MappingError>` - The sensor, or an error if either value is not a positive
    ///   finite number or the beam would need more than [`MAX_SAMPLES`] samples
    pub fn new(max_range: f64, step: f64) -> Result<Self, MappingError> {
        if !(max_range > 0.0 && max_range.is_finite()) {
            return Err(MappingError::InvalidRange("Max range must be positive and finite"));
        }
        if !(step > 0.0 && step.is_finite()) {
            return Err(MappingError::InvalidStep("Step must be positive and finite"));
        }
        if max_range / step > MAX_SAMPLES as f64 {
            return Err(MappingError::InvalidStep("Step too small for max range"));
        }
        Ok(Self { max_range, step })
    }

    /// Reading reported when nothing is hit.
    pub fn max_range(&self) -> f64 {
        self.max_range
    }

    /// Distance between beam samples.
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Distance from `pose` to the first obstacle along its heading.
    ///
    /// Samples the beam at `0, step, 2 * step, ...` strictly below
    /// `max_range` and returns the first sampled distance that falls inside
    /// any obstacle, or `max_range` if none does. Obstacles are tested in
    /// slice order. Never fails; a NaN pose simply hits nothing.
    pub fn cast(&self, pose: &Pose, obstacles: &[Obstacle]) -> f64 {
        let samples = (self.max_range / self.step).ceil() as usize;
        for i in 0..samples {
            let distance = i as f64 * self.step;
            if distance >= self.max_range {
                break;
            }
            let (x, y) = pose.point_ahead(distance);
            let sample = WorldPoint::new(x, y);
            if obstacles.iter().any(|obstacle| obstacle.contains(sample)) {
                return distance;
            }
        }
        self.max_range
    }

    /// Returns `true` if `reading` means the beam hit nothing.
    pub fn is_max_range(&self, reading: f64) -> bool {
        reading >= self.max_range
    }
}

impl Default for RangeSensor {
    fn default() -> Self {
        Self {
            max_range: DEFAULT_MAX_RANGE,
            step: DEFAULT_STEP,
        }
    }
}
