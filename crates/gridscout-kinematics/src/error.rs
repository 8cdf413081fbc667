//! Error types for the kinematics library.
//!
//! This module defines error types that can occur while integrating robot motion.

use core::fmt;

/// Errors that can occur in kinematic calculations.
#[derive(Debug, Clone, PartialEq)]
pub enum KinematicsError {
    /// Error for negative time delta.
    /// This variant is returned when a negative time delta is used for pose updates.
    NegativeTimeDelta(&'static str),
    /// Error for a non-finite velocity command.
    /// This variant is returned when a twist component is NaN or infinite.
    InvalidTwist(&'static str),
}

impl fmt::Display for KinematicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KinematicsError::NegativeTimeDelta(msg) => write!(f, "Negative time delta: {}", msg),
            KinematicsError::InvalidTwist(msg) => write!(f, "Invalid twist: {}", msg),
        }
    }
}

impl core::error::Error for KinematicsError {}
