//! Configuration for the motor controller ([`ServoConfig`]) and for the input mapping ([`TeleopConfig`]).
//!
//! Both structs default to the values used by the gamepad example and can be adjusted with `configure`,
//! which validates the result:
//!
//! ```rust
//! use servo_teleop::ServoConfig;
//!
//! let config = ServoConfig::default().configure(|c| {
//!     c.gains.kp = 10.0;
//!     c.neutral_deadband = 0.04;
//!     Ok(())
//! })?;
//! assert_eq!(config.gains.kp, 10.0);
//! # Ok::<(), servo_teleop::Error>(())
//! ```

use crate::device::{FeedbackDevice, Gains, MotorController};
use crate::{ConfigError, Error};

/// The largest neutral deadband the controller accepts.
const MAX_DEADBAND: f64 = 0.25;

/// Settings written to the motor controller once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct ServoConfig {
    /// The sensor the position loop closes on.
    pub feedback_sensor: FeedbackDevice,
    /// Set when the sensor counts down while the motor drives forward.
    pub sensor_phase: bool,
    /// Inverts the motor output.
    pub inverted: bool,
    /// Minimum forward output, `0..=1`.
    pub nominal_output_forward: f64,
    /// Minimum reverse output, `-1..=0`.
    pub nominal_output_reverse: f64,
    /// Maximum forward output, `0..=1`.
    pub peak_output_forward: f64,
    /// Maximum reverse output, `-1..=0`.
    pub peak_output_reverse: f64,
    /// Closed-loop gains.
    pub gains: Gains,
    /// Neutral deadband as a fraction of full output.
    pub neutral_deadband: f64,
    /// Seconds from neutral to full output in closed loop.
    pub closed_loop_ramp: f64,
}

impl Default for ServoConfig {
    fn default() -> Self {
        Self {
            feedback_sensor: FeedbackDevice::QuadEncoder,
            sensor_phase: false,
            inverted: false,
            nominal_output_forward: 0.0,
            nominal_output_reverse: 0.0,
            peak_output_forward: 1.0,
            peak_output_reverse: -1.0,
            gains: Gains::default(),
            neutral_deadband: 0.0,
            closed_loop_ramp: 0.01,
        }
    }
}

impl ServoConfig {
    /// Use a closure to adjust the config. The result is validated before it is returned.
    pub fn configure<F>(mut self, f: F) -> Result<Self, Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Error>,
    {
        f(&mut self)?;
        self.validate()?;
        Ok(self)
    }

    /// Checks every value against the range the controller accepts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.peak_output_forward)
            || !(-1.0..=0.0).contains(&self.peak_output_reverse)
        {
            return Err(ConfigError::PeakOutput {
                forward: self.peak_output_forward,
                reverse: self.peak_output_reverse,
            });
        }
        if !(0.0..=1.0).contains(&self.nominal_output_forward)
            || !(-1.0..=0.0).contains(&self.nominal_output_reverse)
        {
            return Err(ConfigError::NominalOutput {
                forward: self.nominal_output_forward,
                reverse: self.nominal_output_reverse,
            });
        }
        if !(0.0..=MAX_DEADBAND).contains(&self.neutral_deadband) {
            return Err(ConfigError::Deadband(self.neutral_deadband));
        }
        if self.closed_loop_ramp.is_nan() || self.closed_loop_ramp < 0.0 {
            return Err(ConfigError::Ramp(self.closed_loop_ramp));
        }
        let gains = &self.gains;
        for (name, value) in [
            ("kf", gains.kf),
            ("kp", gains.kp),
            ("ki", gains.ki),
            ("kd", gains.kd),
        ] {
            if value.is_nan() || value < 0.0 {
                return Err(ConfigError::NegativeGain(name));
            }
        }
        if gains.integral_zone < 0 {
            return Err(ConfigError::NegativeGain("integral_zone"));
        }
        Ok(())
    }

    /// Writes the config to the controller.
    ///
    /// The calls are issued in a fixed order and none of them are checked.
    pub fn apply<D>(&self, device: &mut D)
    where
        D: MotorController + ?Sized,
    {
        device.reset_position();

        device.select_feedback_sensor(self.feedback_sensor);
        device.set_sensor_phase(self.sensor_phase);
        device.set_output_inverted(self.inverted);

        device.set_nominal_output(self.nominal_output_forward, self.nominal_output_reverse);
        device.set_peak_output(self.peak_output_forward, self.peak_output_reverse);

        device.set_gains(self.gains);
        device.set_neutral_deadband(self.neutral_deadband);
        device.set_closed_loop_ramp(self.closed_loop_ramp);
    }
}

/// Constants used by [`crate::TeleopMapper`] to turn gamepad input into targets.
#[derive(Debug, Clone, PartialEq)]
pub struct TeleopConfig {
    /// Mechanism rotations for buttons 1, 2 and 3.
    pub preset_rotations: [f64; 3],
    /// Encoder counts per motor rotation.
    pub counts_per_rev: f64,
    /// Motor rotations per mechanism rotation.
    pub gear_ratio: f64,
    /// Native units added per cycle at full stick deflection.
    pub jog_scale: f64,
    /// Stick values with a magnitude at or below this are ignored.
    pub dead_zone: f64,
    /// Within this many native units of the target the controller counts as arrived.
    pub arrival_tolerance: f64,
    /// A diagnostic line is written every `print_period` cycles.
    pub print_period: u32,
}

impl Default for TeleopConfig {
    fn default() -> Self {
        Self {
            preset_rotations: [5.0, 10.0, 15.0],
            counts_per_rev: 80.0,
            gear_ratio: 12.0,
            jog_scale: 150.0,
            dead_zone: 0.01,
            arrival_tolerance: 50.0,
            print_period: 10,
        }
    }
}

impl TeleopConfig {
    /// Use a closure to adjust the config. The result is validated before it is returned.
    pub fn configure<F>(mut self, f: F) -> Result<Self, Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Error>,
    {
        f(&mut self)?;
        self.validate()?;
        Ok(self)
    }

    /// Checks the thresholds and the print period.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.print_period == 0 {
            return Err(ConfigError::PrintPeriod);
        }
        if self.dead_zone.is_nan() || self.dead_zone < 0.0 {
            return Err(ConfigError::NegativeThreshold("dead_zone"));
        }
        if self.arrival_tolerance.is_nan() || self.arrival_tolerance < 0.0 {
            return Err(ConfigError::NegativeThreshold("arrival_tolerance"));
        }
        Ok(())
    }

    /// Preset targets in native sensor units, in button order.
    pub fn preset_targets(&self) -> [f64; 3] {
        self.preset_rotations
            .map(|rotations| rotations * self.counts_per_rev * self.gear_ratio)
    }
}
