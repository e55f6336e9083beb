pub fn init(root_module: &str, verbosity: i8) {
    use std::io::Write;

    let log_level = match verbosity {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .format(|buffer, record: &log::Record| {
            let style = match record.level() {
                log::Level::Warn => env_logger::fmt::style::AnsiColor::Yellow.on_default().bold(),
                log::Level::Error => env_logger::fmt::style::AnsiColor::Red.on_default().bold(),
                _ => env_logger::fmt::style::Style::new(),
            };
            let prefix = match record.level() {
                log::Level::Trace => "Trace: ",
                log::Level::Warn => "Warning: ",
                log::Level::Error => "Error: ",
                _ => "",
            };

            writeln!(
                buffer,
                "{} {style}{}{style:#}{}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                prefix,
                record.args(),
            )
        })
        .filter_level(log::LevelFilter::Warn)
        .filter_module(root_module, log_level)
        .filter_module("servo_teleop", log_level)
        .parse_default_env()
        .init();
}
