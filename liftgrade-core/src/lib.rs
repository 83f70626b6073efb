pub mod completion;
pub mod config;
pub mod db;
pub mod grading;
pub mod logging;
pub mod recommendation;
pub mod runtime;

#[cfg(feature = "uniffi")]
uniffi::setup_scaffolding!();
#[cfg(feature = "uniffi")]
pub mod uniffi_interface;
