use std::io::Write;

use chrono::Local;
use log::LevelFilter;

const CRATE_PREFIX: &str = "liftgrade::";

/// Installs the stdout logger. Later calls only change the level.
pub fn init_logger(level: LevelFilter) {
    install(level, env_logger::Target::Stdout);
}

/// Same as [`init_logger`] but on stderr, leaving stdout to command output.
pub fn init_stderr_logger(level: LevelFilter) {
    install(level, env_logger::Target::Stderr);
}

/// `liftgrade::completion` -> `completion`; other crates keep their full target.
fn stage(target: &str) -> &str {
    target.strip_prefix(CRATE_PREFIX).unwrap_or(target)
}

fn install(level: LevelFilter, target: env_logger::Target) {
    let mut builder = env_logger::Builder::new();
    builder
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {:<5} [{}] {}",
                Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                stage(record.target()),
                record.args()
            )
        })
        .target(target)
        .filter_level(level)
        // r2d2 reports every pool checkout below warn
        .filter_module("r2d2", LevelFilter::Warn.min(level));

    if builder.try_init().is_err() {
        log::set_max_level(level);
    }
}

pub fn parse_level(level: &str) -> Option<LevelFilter> {
    match level.trim().to_lowercase().as_str() {
        "off" | "none" => Some(LevelFilter::Off),
        "error" => Some(LevelFilter::Error),
        "warn" | "warning" => Some(LevelFilter::Warn),
        "info" => Some(LevelFilter::Info),
        "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        _ => None,
    }
}
