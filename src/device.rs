//! The motor controller interface consumed by [`crate::TeleopMapper`].

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use crate::Error;

/// Control modes reported by the motor controller, with their raw codes.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, FromPrimitive, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ControlMode {
    PercentOutput = 0,
    Position = 1,
    Velocity = 2,
    Current = 3,
    Follower = 5,
    MotionProfile = 6,
    MotionMagic = 7,
    MotionProfileArc = 10,
    Disabled = 15,
}

impl TryFrom<u8> for ControlMode {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        ControlMode::from_u8(code).ok_or(Error::InvalidControlMode(code))
    }
}

/// Sensors the controller can close the loop on, with their raw codes.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, FromPrimitive, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FeedbackDevice {
    QuadEncoder = 0,
    Analog = 2,
    Tachometer = 4,
    PulseWidthEncodedPosition = 8,
    SensorSum = 9,
    SensorDifference = 10,
    RemoteSensor0 = 11,
    RemoteSensor1 = 12,
    SoftwareEmulatedSensor = 15,
}

impl TryFrom<u8> for FeedbackDevice {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        FeedbackDevice::from_u8(code).ok_or(Error::InvalidFeedbackDevice(code))
    }
}

/// Closed-loop gains for a single slot.
///
/// The values are in the controller's native units and only mean something to its firmware.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gains {
    /// Feed forward
    pub kf: f64,
    /// Proportional
    pub kp: f64,
    /// Integral
    pub ki: f64,
    /// Derivative
    pub kd: f64,
    /// The integral accumulator is only active while the error is within this zone.
    pub integral_zone: i32,
}

impl Default for Gains {
    fn default() -> Self {
        Self {
            kf: 0.0,
            kp: 20.0,
            ki: 0.001,
            kd: 200.0,
            integral_zone: 50,
        }
    }
}

/// A smart motor controller with a position closed loop running in firmware.
///
/// Every call is fire and forget: implementations deal with bus faults themselves.
pub trait MotorController {
    /// Resets the selected sensor's position to zero.
    fn reset_position(&mut self);
    /// Selects the sensor the position loop closes on.
    fn select_feedback_sensor(&mut self, sensor: FeedbackDevice);
    /// Inverts the sensor reading so that positive output moves the sensor positive.
    fn set_sensor_phase(&mut self, inverted: bool);
    /// Inverts the motor output.
    fn set_output_inverted(&mut self, inverted: bool);
    /// Sets the minimum output in each direction, as a fraction of full scale.
    fn set_nominal_output(&mut self, forward: f64, reverse: f64);
    /// Sets the maximum output in each direction, as a fraction of full scale.
    fn set_peak_output(&mut self, forward: f64, reverse: f64);
    /// Writes the closed-loop gains.
    fn set_gains(&mut self, gains: Gains);
    /// Outputs below this fraction of full scale are treated as neutral.
    fn set_neutral_deadband(&mut self, deadband: f64);
    /// Seconds to ramp from neutral to full output while in closed loop.
    fn set_closed_loop_ramp(&mut self, seconds: f64);
    /// Enters [`ControlMode::Position`] and servos to `target` (native sensor units).
    fn command_position(&mut self, target: f64);
    /// Current motor output as a fraction of full scale.
    fn output_percent(&self) -> f64;
    /// Current position of the selected sensor in native units.
    fn sensor_position(&self) -> i32;
    /// Closed-loop error in native units.
    fn closed_loop_error(&self) -> i32;
    /// The mode last commanded to the controller.
    fn control_mode(&self) -> ControlMode;
}
