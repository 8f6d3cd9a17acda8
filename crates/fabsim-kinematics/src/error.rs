#![warn(missing_docs)]

//! Error types for the rail kinematics library.
//!
//! This module defines error types that can occur while configuring a rail
//! segment, placing shuttles on it, or advancing them.

use core::fmt;

/// Errors that can occur in rail motion calculations.
#[derive(Debug, Clone, PartialEq)]
pub enum KinematicsError {
    /// Error for invalid travel bounds.
    /// This variant is returned when the bounds are not finite or `x_min >= x_max`.
    InvalidBounds(&'static str),
    /// Error for invalid shuttle speed.
    /// This variant is returned when a speed is negative or not finite.
    InvalidSpeed(&'static str),
    /// Error for a shuttle placed outside the travel bounds.
    PositionOutOfRange(&'static str),
    /// Error for a direction value other than `+1` or `-1`.
    InvalidDirection(&'static str),
    /// Error for negative time delta.
    /// This variant is returned when a negative tick ratio is used for an update.
    NegativeTimeDelta(&'static str),
}

impl core::fmt::Display for KinematicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KinematicsError::InvalidBounds(msg) => write!(f, "Invalid travel bounds: {}", msg),
            KinematicsError::InvalidSpeed(msg) => write!(f, "Invalid shuttle speed: {}", msg),
            KinematicsError::PositionOutOfRange(msg) => write!(f, "Position out of range: {}", msg),
            KinematicsError::InvalidDirection(msg) => write!(f, "Invalid direction: {}", msg),
            KinematicsError::NegativeTimeDelta(msg) => write!(f, "Negative time delta: {}", msg),
        }
    }
}

impl core::error::Error for KinematicsError {}
