//! CLI command handling module
//!
//! Handles all CLI subcommands and argument parsing.

mod commands;
mod logging;
mod scan;
mod version;

pub use commands::{ConfigSubcommand, handle_config_command};
pub use logging::init_logging;
pub use scan::{ScanArgs, handle_snapshot, handle_suggest, load_inventory, render};
pub use version::display_version;
