//! A simulated motor controller and a scripted gamepad.
//!
//! [`SimulatedController`] records every call made to it, so the exact configuration and command sequence can be
//! checked, and runs a proportional approach to the commanded target each time [`SimulatedController::step`] is called.

use std::cell::RefCell;

use crate::device::{ControlMode, FeedbackDevice, Gains, MotorController};
use crate::joystick::Joystick;

/// Full scale output of the controller's closed loop, in native units.
const FULL_SCALE: f64 = 1023.0;

/// A call recorded by [`SimulatedController`]. Reads are not recorded.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    ResetPosition,
    SelectFeedbackSensor(FeedbackDevice),
    SetSensorPhase(bool),
    SetOutputInverted(bool),
    SetNominalOutput(f64, f64),
    SetPeakOutput(f64, f64),
    SetGains(Gains),
    SetNeutralDeadband(f64),
    SetClosedLoopRamp(f64),
    CommandPosition(f64),
}

/// An in-memory motor controller.
///
/// Starts in [`ControlMode::PercentOutput`] at position 0, like a controller fresh out of reset.
#[derive(Debug, Clone)]
pub struct SimulatedController {
    calls: Vec<DeviceCall>,
    mode: ControlMode,
    target: f64,
    position: f64,
    output: f64,
    gains: Gains,
    peak_output: (f64, f64),
    deadband: f64,
    /// Sensor counts travelled per step at full output.
    pub counts_per_step: f64,
}

impl Default for SimulatedController {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            mode: ControlMode::PercentOutput,
            target: 0.0,
            position: 0.0,
            output: 0.0,
            gains: Gains::default(),
            peak_output: (1.0, -1.0),
            deadband: 0.0,
            counts_per_step: 40.0,
        }
    }
}

impl SimulatedController {
    /// Creates a controller at rest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call made so far, oldest first.
    pub fn calls(&self) -> &[DeviceCall] {
        &self.calls
    }

    /// Forgets the recorded calls.
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// The targets of every position command made so far.
    pub fn commands(&self) -> Vec<f64> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DeviceCall::CommandPosition(target) => Some(*target),
                _ => None,
            })
            .collect()
    }

    /// The target of the last position command.
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Moves the sensor, as if the mechanism had been pushed by hand.
    pub fn set_sensor_position(&mut self, position: i32) {
        self.position = f64::from(position);
    }

    /// Advances the closed loop by one control period.
    pub fn step(&mut self) {
        if self.mode != ControlMode::Position {
            return;
        }
        let (forward, reverse) = self.peak_output;
        let error = self.target - self.position;
        let mut output = (self.gains.kp * error / FULL_SCALE).clamp(reverse, forward);
        if output.abs() < self.deadband {
            output = 0.0;
        }
        self.output = output;
        self.position += output * self.counts_per_step;
    }
}

impl MotorController for SimulatedController {
    fn reset_position(&mut self) {
        self.position = 0.0;
        self.calls.push(DeviceCall::ResetPosition);
    }

    fn select_feedback_sensor(&mut self, sensor: FeedbackDevice) {
        self.calls.push(DeviceCall::SelectFeedbackSensor(sensor));
    }

    fn set_sensor_phase(&mut self, inverted: bool) {
        self.calls.push(DeviceCall::SetSensorPhase(inverted));
    }

    fn set_output_inverted(&mut self, inverted: bool) {
        self.calls.push(DeviceCall::SetOutputInverted(inverted));
    }

    fn set_nominal_output(&mut self, forward: f64, reverse: f64) {
        self.calls.push(DeviceCall::SetNominalOutput(forward, reverse));
    }

    fn set_peak_output(&mut self, forward: f64, reverse: f64) {
        self.peak_output = (forward, reverse);
        self.calls.push(DeviceCall::SetPeakOutput(forward, reverse));
    }

    fn set_gains(&mut self, gains: Gains) {
        self.gains = gains;
        self.calls.push(DeviceCall::SetGains(gains));
    }

    fn set_neutral_deadband(&mut self, deadband: f64) {
        self.deadband = deadband;
        self.calls.push(DeviceCall::SetNeutralDeadband(deadband));
    }

    fn set_closed_loop_ramp(&mut self, seconds: f64) {
        self.calls.push(DeviceCall::SetClosedLoopRamp(seconds));
    }

    fn command_position(&mut self, target: f64) {
        self.mode = ControlMode::Position;
        self.target = target;
        self.calls.push(DeviceCall::CommandPosition(target));
    }

    fn output_percent(&self) -> f64 {
        self.output
    }

    fn sensor_position(&self) -> i32 {
        self.position.round() as i32
    }

    fn closed_loop_error(&self) -> i32 {
        match self.mode {
            ControlMode::Position => (self.target - self.position).round() as i32,
            _ => 0,
        }
    }

    fn control_mode(&self) -> ControlMode {
        self.mode
    }
}

/// A gamepad whose axes and buttons are set by hand.
///
/// Out of range indices read as centred axes and released buttons.
#[derive(Debug, Default)]
pub struct ScriptedJoystick {
    axes: [f64; 6],
    buttons: [bool; 12],
    button_reads: RefCell<Vec<usize>>,
}

impl ScriptedJoystick {
    /// Creates a gamepad with every axis centred and every button released.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an axis value.
    pub fn set_axis(&mut self, index: usize, value: f64) {
        if let Some(axis) = self.axes.get_mut(index) {
            *axis = value;
        }
    }

    /// Holds a button down.
    pub fn press(&mut self, index: usize) {
        self.set_button(index, true);
    }

    /// Releases a button.
    pub fn release(&mut self, index: usize) {
        self.set_button(index, false);
    }

    /// Releases every button.
    pub fn release_all(&mut self) {
        self.buttons = [false; 12];
    }

    /// The button indices read so far, oldest first.
    pub fn button_reads(&self) -> Vec<usize> {
        self.button_reads.borrow().clone()
    }

    fn set_button(&mut self, index: usize, pressed: bool) {
        if let Some(button) = index
            .checked_sub(1)
            .and_then(|i| self.buttons.get_mut(i))
        {
            *button = pressed;
        }
    }
}

impl Joystick for ScriptedJoystick {
    fn axis(&self, index: usize) -> f64 {
        self.axes.get(index).copied().unwrap_or_default()
    }

    fn button(&self, index: usize) -> bool {
        self.button_reads.borrow_mut().push(index);
        index
            .checked_sub(1)
            .and_then(|i| self.buttons.get(i))
            .copied()
            .unwrap_or_default()
    }
}
