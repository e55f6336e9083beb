//! Gamepad driven closed-loop position servoing for smart motor controllers (Talon SRX style) with a quadrature encoder.
//!
//! The PID loop runs inside the motor controller firmware. This crate only configures it ([`ServoConfig`]) and,
//! once per control cycle, maps joystick and button input onto position targets ([`TeleopMapper`]).
//!
//! ```rust
//! use servo_teleop::sim::{ScriptedJoystick, SimulatedController};
//! use servo_teleop::{ServoConfig, TeleopConfig, TeleopMapper};
//!
//! let mut talon = SimulatedController::new();
//! let mut joy = ScriptedJoystick::new();
//! let mut mapper = TeleopMapper::new(ServoConfig::default(), TeleopConfig::default(), Vec::<String>::new());
//!
//! mapper.initialize(&mut talon);
//! joy.press(1);
//! mapper.run_cycle(&mut talon, &joy);
//! assert_eq!(mapper.target_position(), 4800.0);
//! ```

#![deny(
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    unused_allocation,
    unused_comparisons,
    unused_parens,
    while_true
)]
#![deny(
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications
)]
#![warn(clippy::unwrap_used)]

mod config;
mod device;
pub mod diagnostics;
mod joystick;
pub mod sim;
mod teleop;

pub use config::{ServoConfig, TeleopConfig};
pub use device::{ControlMode, FeedbackDevice, Gains, MotorController};
pub use diagnostics::DiagnosticSink;
pub use joystick::Joystick;
pub use teleop::{CycleOutcome, JogBase, MapperState, TeleopMapper};
use thiserror::Error;

/// Errors that can occur outside the control cycle.
///
/// The cycle itself never fails: device and joystick calls are fire and forget.
#[derive(Error, Debug)]
pub enum Error {
    /// A configuration closure left a value out of range.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    /// The raw code does not name a [`ControlMode`].
    #[error("invalid control mode: {0}")]
    InvalidControlMode(u8),
    /// The raw code does not name a [`FeedbackDevice`].
    #[error("invalid feedback device: {0}")]
    InvalidFeedbackDevice(u8),
}

/// Errors returned when validating a [`ServoConfig`] or [`TeleopConfig`].
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    /// Peak outputs must satisfy `0 <= forward <= 1` and `-1 <= reverse <= 0`.
    #[error("peak output out of range: forward {forward}, reverse {reverse}")]
    PeakOutput {
        /// The forward peak output
        forward: f64,
        /// The reverse peak output
        reverse: f64,
    },
    /// Nominal outputs must satisfy `0 <= forward <= 1` and `-1 <= reverse <= 0`.
    #[error("nominal output out of range: forward {forward}, reverse {reverse}")]
    NominalOutput {
        /// The forward nominal output
        forward: f64,
        /// The reverse nominal output
        reverse: f64,
    },
    /// The controller accepts a neutral deadband up to 25% output.
    #[error("neutral deadband out of range: {0}")]
    Deadband(f64),
    /// Ramp time in seconds cannot be negative.
    #[error("negative closed loop ramp: {0}")]
    Ramp(f64),
    /// Gains and the integral zone cannot be negative.
    #[error("negative gain: {0}")]
    NegativeGain(&'static str),
    /// Diagnostics need to be printed at least every cycle.
    #[error("print period must be at least 1")]
    PrintPeriod,
    /// Dead zone and arrival tolerance cannot be negative.
    #[error("negative threshold: {0}")]
    NegativeThreshold(&'static str),
}
