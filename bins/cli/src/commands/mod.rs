//! CLI command handlers.

pub mod config;
pub mod emit;
pub mod info;
pub mod sinks;

pub use config::{run_config_check, run_config_schema, run_config_show};
pub use emit::{EmitInput, run_emit};
pub use info::run_info;
pub use sinks::run_sinks;
