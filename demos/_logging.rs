//! Shared logger setup for the demos.

use std::io::Write;

pub fn init(root_module: &str, verbosity: u8) {
    let log_level = match verbosity {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .format(|buffer, record: &log::Record| {
            let prefix = match record.level() {
                log::Level::Trace => "Trace: ",
                log::Level::Warn => "Warning: ",
                log::Level::Error => "Error: ",
                log::Level::Debug | log::Level::Info => "",
            };
            let style = buffer.default_level_style(record.level());

            writeln!(
                buffer,
                "{}:{} {} {style}{prefix}{style:#}{}",
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                chrono::Local::now().format("%H:%M:%S"),
                record.args(),
            )
        })
        .filter_level(log::LevelFilter::Warn)
        .filter_module(root_module, log_level)
        .filter_module("epos4", log_level)
        .parse_default_env()
        .init();
}
