//! Destinations for the periodic diagnostic line written by [`crate::TeleopMapper`].

/// Receives one formatted diagnostic line at a time.
pub trait DiagnosticSink {
    /// Writes a single line. The line carries no trailing newline.
    fn write_line(&mut self, line: &str);
}

/// Forwards lines to the [`log`] facade at `info` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn write_line(&mut self, line: &str) {
        log::info!(target: "servo_teleop::diagnostics", "{}", line);
    }
}

/// Prints lines to stdout, the way a driver station console shows them.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl DiagnosticSink for StdoutSink {
    fn write_line(&mut self, line: &str) {
        println!("{}", line);
    }
}

/// Keeps every line in memory.
impl DiagnosticSink for Vec<String> {
    fn write_line(&mut self, line: &str) {
        self.push(line.to_owned());
    }
}

impl<S> DiagnosticSink for &mut S
where
    S: DiagnosticSink + ?Sized,
{
    fn write_line(&mut self, line: &str) {
        (**self).write_line(line);
    }
}
