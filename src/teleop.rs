//! Maps gamepad input onto position targets once per control cycle.
//!
//! Each cycle, in priority order:
//!  - a newly pressed button 1, 2 or 3 jumps to that button's preset target (first match wins),
//!  - otherwise a stick outside the dead zone jogs the target. While the controller is still travelling (outside
//!    the arrival tolerance) the jog is based on the measured position, once it has arrived it is based on the
//!    stored target,
//!  - otherwise nothing is commanded.
//!
//! A diagnostic line is assembled every cycle and written to the [`DiagnosticSink`] every `print_period` cycles.

use std::fmt::Write;

use crate::config::{ServoConfig, TeleopConfig};
use crate::device::{ControlMode, MotorController};
use crate::diagnostics::DiagnosticSink;
use crate::joystick::{Joystick, LEFT_Y_AXIS, PRESET_BUTTONS, UNUSED_BUTTON};

/// What a jog was based on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JogBase {
    /// The controller had not arrived, so the jog started from the measured position.
    Measured,
    /// The controller was within tolerance, so the jog started from the previous target.
    Target,
}

/// The command issued by a single [`TeleopMapper::run_cycle`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CycleOutcome {
    /// A preset button was newly pressed.
    Preset {
        /// The button number, 1 based.
        button: usize,
        /// The commanded target.
        target: f64,
    },
    /// The stick moved the target.
    Jog {
        /// Where the jog started from.
        base: JogBase,
        /// The commanded target.
        target: f64,
    },
    /// Nothing was commanded.
    Idle,
}

/// State carried from one cycle to the next.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapperState {
    /// The last commanded target in native sensor units.
    pub target_position: f64,
    /// Raw button 1, 2 and 3 readings from the previous cycle.
    pub last_buttons: [bool; 3],
    /// Cycles since the last diagnostic line was written.
    pub loops: u32,
}

/// Gamepad to position mapping for a single motor controller.
///
/// The mapper owns its state and the diagnostic sink. The controller and gamepad are borrowed for each call.
#[derive(Debug)]
pub struct TeleopMapper<S>
where
    S: DiagnosticSink,
{
    servo: ServoConfig,
    teleop: TeleopConfig,
    presets: [f64; 3],
    state: MapperState,
    line: String,
    sink: S,
}

impl<S> TeleopMapper<S>
where
    S: DiagnosticSink,
{
    /// Creates a new [`TeleopMapper`] with a target of 0 and every button released.
    pub fn new(servo: ServoConfig, teleop: TeleopConfig, sink: S) -> Self {
        let presets = teleop.preset_targets();
        Self {
            servo,
            teleop,
            presets,
            state: MapperState::default(),
            line: String::new(),
            sink,
        }
    }

    /// Writes the [`ServoConfig`] to the controller. Call once, before the first [`TeleopMapper::run_cycle`].
    pub fn initialize<D>(&mut self, device: &mut D)
    where
        D: MotorController + ?Sized,
    {
        self.servo.apply(device);
        log::info!(
            "servo configured: {:?} gains {:?}, deadband {}, ramp {}s",
            self.servo.feedback_sensor,
            self.servo.gains,
            self.servo.neutral_deadband,
            self.servo.closed_loop_ramp
        );
    }

    /// Runs one control cycle.
    pub fn run_cycle<D, J>(&mut self, device: &mut D, joystick: &J) -> CycleOutcome
    where
        D: MotorController + ?Sized,
        J: Joystick + ?Sized,
    {
        // forward on the stick reads negative
        let stick = -joystick.axis(LEFT_Y_AXIS);
        let buttons = PRESET_BUTTONS.map(|button| joystick.button(button));
        let _ = joystick.button(UNUSED_BUTTON);

        let _ = write!(
            self.line,
            "\tout: {:.6}\tpos: {}",
            device.output_percent(),
            device.sensor_position()
        );

        let outcome = match self.pressed_preset(&buttons) {
            Some(index) => {
                let target = self.presets[index];
                self.command(device, target);
                log::debug!("button {} pressed, target {}", PRESET_BUTTONS[index], target);
                CycleOutcome::Preset {
                    button: PRESET_BUTTONS[index],
                    target,
                }
            }
            None if stick.abs() > self.teleop.dead_zone => self.jog(device, stick),
            None => CycleOutcome::Idle,
        };

        if device.control_mode() == ControlMode::Position {
            let _ = write!(
                self.line,
                "\terr: {}\ttrg: {:.6}",
                device.closed_loop_error(),
                self.state.target_position
            );
        }

        self.state.loops += 1;
        if self.state.loops >= self.teleop.print_period {
            self.state.loops = 0;
            self.sink.write_line(&self.line);
        }
        self.line.clear();

        self.state.last_buttons = buttons;
        log::trace!("cycle {:?}", outcome);
        outcome
    }

    /// The last commanded target in native sensor units.
    pub fn target_position(&self) -> f64 {
        self.state.target_position
    }

    /// The state carried between cycles.
    pub fn state(&self) -> &MapperState {
        &self.state
    }

    /// The diagnostic sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Consumes the mapper, returning the diagnostic sink.
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Index of the first button that went from released to pressed since the last cycle.
    fn pressed_preset(&self, buttons: &[bool; 3]) -> Option<usize> {
        buttons
            .iter()
            .zip(self.state.last_buttons.iter())
            .position(|(&now, &last)| now && !last)
    }

    fn jog<D>(&mut self, device: &mut D, stick: f64) -> CycleOutcome
    where
        D: MotorController + ?Sized,
    {
        let current = f64::from(device.sensor_position());
        let target = self.state.target_position;
        let tolerance = self.teleop.arrival_tolerance;

        let (base, from) = if target - tolerance > current || current > target + tolerance {
            (JogBase::Measured, current)
        } else {
            (JogBase::Target, target)
        };
        let target = stick * self.teleop.jog_scale + from;
        self.command(device, target);
        log::debug!("jog {:.3} from {:?} {}, target {}", stick, base, from, target);
        CycleOutcome::Jog { base, target }
    }

    fn command<D>(&mut self, device: &mut D, target: f64)
    where
        D: MotorController + ?Sized,
    {
        self.state.target_position = target;
        device.command_position(target);
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::sim::{DeviceCall, ScriptedJoystick, SimulatedController};

    fn mapper() -> TeleopMapper<Vec<String>> {
        TeleopMapper::new(ServoConfig::default(), TeleopConfig::default(), Vec::new())
    }

    fn initialized() -> (TeleopMapper<Vec<String>>, SimulatedController) {
        let mut mapper = mapper();
        let mut talon = SimulatedController::new();
        mapper.initialize(&mut talon);
        talon.clear_calls();
        (mapper, talon)
    }

    /// Pushing the stick forward reads negative on the raw axis.
    fn push_stick(joy: &mut ScriptedJoystick, forward: f64) {
        joy.set_axis(LEFT_Y_AXIS, -forward);
    }

    #[test]
    fn test_initialize_configures_device() {
        let mut mapper = mapper();
        let mut talon = SimulatedController::new();
        mapper.initialize(&mut talon);

        let calls = talon.calls();
        assert_eq!(calls.len(), 9);
        assert_eq!(calls[0], DeviceCall::ResetPosition);
        assert_eq!(calls[5], DeviceCall::SetPeakOutput(1.0, -1.0));
        assert_eq!(calls[8], DeviceCall::SetClosedLoopRamp(0.01));
        assert!(talon.commands().is_empty());
    }

    #[test]
    fn test_presets() {
        for (button, target) in [(1, 4800.0), (2, 9600.0), (3, 14400.0)] {
            let (mut mapper, mut talon) = initialized();
            let mut joy = ScriptedJoystick::new();
            joy.press(button);

            let outcome = mapper.run_cycle(&mut talon, &joy);
            assert_eq!(outcome, CycleOutcome::Preset { button, target });
            assert_eq!(mapper.target_position(), target);
            assert_eq!(talon.commands(), vec![target]);
        }
    }

    #[test]
    fn test_held_button_fires_once() {
        let (mut mapper, mut talon) = initialized();
        let mut joy = ScriptedJoystick::new();
        joy.press(1);

        mapper.run_cycle(&mut talon, &joy);
        let outcome = mapper.run_cycle(&mut talon, &joy);

        assert_eq!(outcome, CycleOutcome::Idle);
        assert_eq!(mapper.target_position(), 4800.0);
        assert_eq!(talon.commands(), vec![4800.0]);
    }

    #[test]
    fn test_held_button_falls_through_to_stick() {
        let (mut mapper, mut talon) = initialized();
        let mut joy = ScriptedJoystick::new();
        joy.press(1);
        mapper.run_cycle(&mut talon, &joy);

        // controller has not moved: 4800 away from the target
        push_stick(&mut joy, 0.5);
        let outcome = mapper.run_cycle(&mut talon, &joy);
        assert_eq!(
            outcome,
            CycleOutcome::Jog {
                base: JogBase::Measured,
                target: 75.0
            }
        );
    }

    #[test]
    fn test_released_and_pressed_again_fires_again() {
        let (mut mapper, mut talon) = initialized();
        let mut joy = ScriptedJoystick::new();
        joy.press(2);
        mapper.run_cycle(&mut talon, &joy);
        joy.release(2);
        mapper.run_cycle(&mut talon, &joy);
        joy.press(2);
        mapper.run_cycle(&mut talon, &joy);

        assert_eq!(talon.commands(), vec![9600.0, 9600.0]);
    }

    #[test]
    fn test_lowest_button_wins() {
        let (mut mapper, mut talon) = initialized();
        let mut joy = ScriptedJoystick::new();
        joy.press(1);
        joy.press(2);
        joy.press(3);

        let outcome = mapper.run_cycle(&mut talon, &joy);
        assert_eq!(
            outcome,
            CycleOutcome::Preset {
                button: 1,
                target: 4800.0
            }
        );
        assert_eq!(talon.commands(), vec![4800.0]);
    }

    #[test]
    fn test_later_button_fires_while_earlier_is_held() {
        let (mut mapper, mut talon) = initialized();
        let mut joy = ScriptedJoystick::new();
        joy.press(1);
        mapper.run_cycle(&mut talon, &joy);
        joy.press(3);
        let outcome = mapper.run_cycle(&mut talon, &joy);

        assert_eq!(
            outcome,
            CycleOutcome::Preset {
                button: 3,
                target: 14400.0
            }
        );
    }

    #[test]
    fn test_preset_beats_stick() {
        let (mut mapper, mut talon) = initialized();
        let mut joy = ScriptedJoystick::new();
        joy.press(2);
        push_stick(&mut joy, 1.0);

        mapper.run_cycle(&mut talon, &joy);
        assert_eq!(talon.commands(), vec![9600.0]);
    }

    #[test]
    fn test_dead_zone() {
        let (mut mapper, mut talon) = initialized();
        mapper.state.target_position = 1000.0;
        let mut joy = ScriptedJoystick::new();

        for stick in [0.005, -0.005, 0.01, -0.01, 0.0] {
            push_stick(&mut joy, stick);
            let outcome = mapper.run_cycle(&mut talon, &joy);
            assert_eq!(outcome, CycleOutcome::Idle);
        }
        assert_eq!(mapper.target_position(), 1000.0);
        assert!(talon.commands().is_empty());
    }

    #[test]
    fn test_jog_from_measured_position() {
        let (mut mapper, mut talon) = initialized();
        mapper.state.target_position = 1000.0;
        talon.set_sensor_position(900);
        let mut joy = ScriptedJoystick::new();
        push_stick(&mut joy, 0.5);

        let outcome = mapper.run_cycle(&mut talon, &joy);
        assert_eq!(
            outcome,
            CycleOutcome::Jog {
                base: JogBase::Measured,
                target: 975.0
            }
        );
        assert_eq!(mapper.target_position(), 975.0);
        assert_eq!(talon.commands(), vec![975.0]);
    }

    #[test]
    fn test_jog_from_target_when_arrived() {
        let (mut mapper, mut talon) = initialized();
        mapper.state.target_position = 1000.0;
        talon.set_sensor_position(980);
        let mut joy = ScriptedJoystick::new();
        push_stick(&mut joy, 0.5);

        let outcome = mapper.run_cycle(&mut talon, &joy);
        assert_eq!(
            outcome,
            CycleOutcome::Jog {
                base: JogBase::Target,
                target: 1075.0
            }
        );
        assert_eq!(talon.commands(), vec![1075.0]);
    }

    #[test]
    fn test_jog_tolerance_is_inclusive() {
        for (position, base) in [
            (1050, JogBase::Target),
            (950, JogBase::Target),
            (1051, JogBase::Measured),
            (949, JogBase::Measured),
        ] {
            let (mut mapper, mut talon) = initialized();
            mapper.state.target_position = 1000.0;
            talon.set_sensor_position(position);
            let mut joy = ScriptedJoystick::new();
            push_stick(&mut joy, -1.0);

            match mapper.run_cycle(&mut talon, &joy) {
                CycleOutcome::Jog { base: got, .. } => assert_eq!(got, base, "at {}", position),
                other => panic!("expected a jog, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_stick_backwards_lowers_target() {
        let (mut mapper, mut talon) = initialized();
        let mut joy = ScriptedJoystick::new();
        push_stick(&mut joy, -1.0);

        mapper.run_cycle(&mut talon, &joy);
        mapper.run_cycle(&mut talon, &joy);
        // the controller never moved, so the second jog restarts from the measured position
        assert_eq!(talon.commands(), vec![-150.0, -150.0]);

        talon.set_sensor_position(-150);
        mapper.run_cycle(&mut talon, &joy);
        assert_eq!(talon.commands(), vec![-150.0, -150.0, -300.0]);
    }

    #[test]
    fn test_stored_target_matches_last_command() {
        let (mut mapper, mut talon) = initialized();
        let mut joy = ScriptedJoystick::new();
        push_stick(&mut joy, 0.3);
        for cycle in 0..25 {
            if cycle == 7 {
                joy.press(3);
            }
            mapper.run_cycle(&mut talon, &joy);
            talon.step();
            assert_eq!(mapper.target_position(), talon.target());
        }
    }

    #[test]
    fn test_button_history_is_previous_reading() {
        let (mut mapper, mut talon) = initialized();
        let mut joy = ScriptedJoystick::new();
        joy.press(2);
        mapper.run_cycle(&mut talon, &joy);
        assert_eq!(mapper.state().last_buttons, [false, true, false]);
        joy.release(2);
        joy.press(3);
        mapper.run_cycle(&mut talon, &joy);
        assert_eq!(mapper.state().last_buttons, [false, false, true]);
    }

    #[test]
    fn test_reads_unused_button() {
        let (mut mapper, mut talon) = initialized();
        let joy = ScriptedJoystick::new();
        mapper.run_cycle(&mut talon, &joy);
        assert_eq!(joy.button_reads(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_prints_every_tenth_cycle() {
        let (mut mapper, mut talon) = initialized();
        let joy = ScriptedJoystick::new();

        for _ in 0..9 {
            mapper.run_cycle(&mut talon, &joy);
        }
        assert!(mapper.sink().is_empty());
        assert_eq!(mapper.state().loops, 9);

        mapper.run_cycle(&mut talon, &joy);
        assert_eq!(mapper.sink().len(), 1);
        assert_eq!(mapper.state().loops, 0);

        for _ in 0..10 {
            mapper.run_cycle(&mut talon, &joy);
        }
        assert_eq!(mapper.into_sink().len(), 2);
    }

    #[test]
    fn test_line_without_position_mode() {
        let (mut mapper, mut talon) = initialized();
        talon.set_sensor_position(12);
        let joy = ScriptedJoystick::new();
        for _ in 0..10 {
            mapper.run_cycle(&mut talon, &joy);
        }
        assert_eq!(mapper.sink(), &vec!["\tout: 0.000000\tpos: 12".to_string()]);
    }

    #[test]
    fn test_line_in_position_mode() {
        let (mut mapper, mut talon) = initialized();
        let mut joy = ScriptedJoystick::new();
        joy.press(1);
        for _ in 0..10 {
            mapper.run_cycle(&mut talon, &joy);
        }
        assert_eq!(
            mapper.sink(),
            &vec!["\tout: 0.000000\tpos: 0\terr: 4800\ttrg: 4800.000000".to_string()]
        );
    }

    #[test]
    fn test_line_only_holds_last_cycle() {
        let (mut mapper, mut talon) = initialized();
        let joy = ScriptedJoystick::new();
        for position in 1..=10 {
            talon.set_sensor_position(position);
            mapper.run_cycle(&mut talon, &joy);
        }
        assert_eq!(mapper.sink()[0], "\tout: 0.000000\tpos: 10");
    }

    #[test]
    fn test_custom_print_period() {
        let teleop = TeleopConfig::default()
            .configure(|c| {
                c.print_period = 1;
                Ok(())
            })
            .unwrap();
        let mut mapper = TeleopMapper::new(ServoConfig::default(), teleop, Vec::new());
        let mut talon = SimulatedController::new();
        let joy = ScriptedJoystick::new();
        for _ in 0..3 {
            mapper.run_cycle(&mut talon, &joy);
        }
        assert_eq!(mapper.sink().len(), 3);
    }

    #[test]
    fn test_borrowed_sink() {
        let mut lines: Vec<String> = Vec::new();
        {
            let mut mapper =
                TeleopMapper::new(ServoConfig::default(), TeleopConfig::default(), &mut lines);
            let mut talon = SimulatedController::new();
            let joy = ScriptedJoystick::new();
            for _ in 0..10 {
                mapper.run_cycle(&mut talon, &joy);
            }
        }
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn test_reaches_preset_in_simulation() {
        let (mut mapper, mut talon) = initialized();
        let mut joy = ScriptedJoystick::new();
        joy.press(1);
        for _ in 0..300 {
            mapper.run_cycle(&mut talon, &joy);
            talon.step();
        }
        assert_eq!(talon.sensor_position(), 4800);
        assert_eq!(talon.commands(), vec![4800.0]);
    }
}
