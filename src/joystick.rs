/// A gamepad read through its raw axis and button indices.
///
/// Indices follow the driver station convention: axes start at 0, buttons start at 1.
pub trait Joystick {
    /// Returns the axis value in `[-1, 1]`.
    fn axis(&self, index: usize) -> f64;
    /// Returns `true` while the button is held.
    fn button(&self, index: usize) -> bool;
}

/// Left stick Y axis. Pushing the stick forward reads negative.
pub(crate) const LEFT_Y_AXIS: usize = 1;

/// Buttons mapped onto preset targets, in priority order.
pub(crate) const PRESET_BUTTONS: [usize; 3] = [1, 2, 3];

/// Read every cycle but not mapped to anything.
pub(crate) const UNUSED_BUTTON: usize = 4;
