use gridscout_kinematics::Twist;
use macroquad::input::{KeyCode, is_key_down, is_key_pressed};

use crate::config::RobotConfig;

/// Arrow keys held down during a frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriveKeys {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

impl DriveKeys {
    pub fn poll() -> Self {
        DriveKeys {
            forward: is_key_down(KeyCode::Up),
            backward: is_key_down(KeyCode::Down),
            left: is_key_down(KeyCode::Left),
            right: is_key_down(KeyCode::Right),
        }
    }

    /// Velocity command for the held keys. Opposite keys cancel out.
    /// Left lowers the heading, which turns counter-clockwise on screen.
    pub fn twist(&self, robot: &RobotConfig) -> Twist {
        let axis = |pos: bool, neg: bool| f64::from(i8::from(pos) - i8::from(neg));
        Twist::new(
            robot.speed * axis(self.forward, self.backward),
            robot.rotation_speed * axis(self.right, self.left),
        )
    }
}

/// Escape or Q ends the session.
pub fn quit_requested() -> bool {
    is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_keys_stops() {
        let twist = DriveKeys::default().twist(&RobotConfig::default());
        assert!(!twist.is_moving());
    }

    #[test]
    fn test_key_mapping() {
        let robot = RobotConfig { speed: 60.0, rotation_speed: 90.0, radius: 20.0 };

        let keys = DriveKeys { forward: true, right: true, ..Default::default() };
        assert_eq!(keys.twist(&robot), Twist::new(60.0, 90.0));

        let keys = DriveKeys { backward: true, left: true, ..Default::default() };
        assert_eq!(keys.twist(&robot), Twist::new(-60.0, -90.0));
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let robot = RobotConfig::default();
        let keys = DriveKeys { forward: true, backward: true, left: true, right: true };
        assert!(!keys.twist(&robot).is_moving());
    }
}
