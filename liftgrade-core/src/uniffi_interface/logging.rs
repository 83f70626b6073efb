use log::LevelFilter;

use crate::logging::{init_logger, parse_level};

#[uniffi::export]
pub fn set_debug_log_level() {
    init_logger(LevelFilter::Trace);
}

#[uniffi::export]
pub fn set_log_level(level: &str) -> bool {
    match parse_level(level) {
        Some(lvl) => {
            init_logger(lvl);
            true
        }
        None => false,
    }
}
