//! Drives a simulated controller through the gamepad mapping at 20ms per cycle.
//!
//! The script presses each preset button in turn, waits for the controller to arrive, then jogs the target
//! forward and back with the stick. Pass `-v` (debug) or `-vv` (trace) for more logging.
mod logging;

use servo_teleop::diagnostics::LogSink;
use servo_teleop::sim::{ScriptedJoystick, SimulatedController};
use servo_teleop::{MotorController, ServoConfig, TeleopConfig, TeleopMapper};

const LEFT_Y_AXIS: usize = 1;

fn main() -> Result<(), servo_teleop::Error> {
    let verbosity = std::env::args()
        .skip(1)
        .map(|arg| match arg.as_str() {
            "-v" => 1,
            "-vv" => 2,
            _ => 0,
        })
        .max()
        .unwrap_or(0);
    logging::init("teleop_sim", verbosity);

    let servo = ServoConfig::default().configure(|c| {
        c.neutral_deadband = 0.04;
        Ok(())
    })?;
    let mut mapper = TeleopMapper::new(servo, TeleopConfig::default(), LogSink);
    let mut talon = SimulatedController::new();
    let mut joy = ScriptedJoystick::new();

    mapper.initialize(&mut talon);

    for cycle in 0..600 {
        joy.release_all();
        joy.set_axis(LEFT_Y_AXIS, 0.0);
        match cycle {
            0..=149 => joy.press(1),
            150..=299 => joy.press(2),
            300..=449 => joy.press(3),
            // pushing the stick forward reads negative
            450..=499 => joy.set_axis(LEFT_Y_AXIS, -0.8),
            500..=549 => joy.set_axis(LEFT_Y_AXIS, 0.8),
            _ => {}
        }

        mapper.run_cycle(&mut talon, &joy);
        talon.step();

        // Wait 20ms between iterations, the period of a driver station teleop loop.
        std::thread::sleep(std::time::Duration::from_millis(20));
    }

    log::info!(
        "finished at {} with target {}",
        talon.sensor_position(),
        mapper.target_position()
    );
    Ok(())
}
