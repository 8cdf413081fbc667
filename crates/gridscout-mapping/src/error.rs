//! This module defines the error types used by the `gridscout-mapping` crate.

#![warn(missing_docs)]

/// Error type for mapping operations.
///
/// Only constructors can fail. Updating, casting and reading the grid are
/// total operations and never return this error.
#[derive(Debug, Clone, PartialEq)]
pub enum MappingError {
    /// Error for invalid grid dimensions.
    /// This variant is returned when grid width or height is zero or exceeds the extent cap.
    InvalidDimensions(&'static str),
    /// Error for an invalid sensor range.
    /// This variant is returned when the maximum range is not a positive finite number.
    InvalidRange(&'static str),
    /// Error for an invalid sensor step.
    /// This variant is returned when the march step is not a positive finite number.
    InvalidStep(&'static str),
}

impl core::fmt::Display for MappingError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MappingError::InvalidDimensions(msg) => write!(f, "Invalid grid dimensions: {}", msg),
            MappingError::InvalidRange(msg) => write!(f, "Invalid sensor range: {}", msg),
            MappingError::InvalidStep(msg) => write!(f, "Invalid sensor step: {}", msg),
        }
    }
}

impl core::error::Error for MappingError {}
