//! Default configuration values
//!
//! Provides default configuration instances and helper functions.

use super::schema::Config;

/// Get the default configuration
pub fn default_config() -> Config {
    Config::default()
}
