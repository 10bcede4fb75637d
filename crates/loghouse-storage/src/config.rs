//! Log configuration.
//!
//! Both capacity bounds are byte limits, checked independently; whichever is
//! reached first seals the active segment. The defaults are deliberately
//! small — production deployments size them to their record volume.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Store file size at which the active segment rolls (default: 1024).
    #[serde(default = "default_max_store_bytes")]
    pub max_store_bytes: u64,

    /// Index file size at which the active segment rolls (default: 1024).
    #[serde(default = "default_max_index_bytes")]
    pub max_index_bytes: u64,

    /// First offset assigned in a freshly created log directory (default: 0).
    #[serde(default)]
    pub initial_offset: u64,
}

impl LogConfig {
    /// Replace zero-valued capacity bounds with the defaults. `Log::new`
    /// applies this so a partially filled-in config behaves like one built
    /// from `..Default::default()`.
    pub(crate) fn normalized(mut self) -> Self {
        if self.max_store_bytes == 0 {
            self.max_store_bytes = default_max_store_bytes();
        }
        if self.max_index_bytes == 0 {
            self.max_index_bytes = default_max_index_bytes();
        }
        self
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            max_store_bytes: default_max_store_bytes(),
            max_index_bytes: default_max_index_bytes(),
            initial_offset: 0,
        }
    }
}

fn default_max_store_bytes() -> u64 {
    1024
}

fn default_max_index_bytes() -> u64 {
    1024
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_bounds_normalize_to_defaults() {
        let config = LogConfig {
            max_store_bytes: 0,
            max_index_bytes: 0,
            initial_offset: 7,
        }
        .normalized();
        assert_eq!(config.max_store_bytes, 1024);
        assert_eq!(config.max_index_bytes, 1024);
        assert_eq!(config.initial_offset, 7);
    }

    #[test]
    fn explicit_bounds_survive_normalization() {
        let config = LogConfig {
            max_store_bytes: 32,
            ..Default::default()
        }
        .normalized();
        assert_eq!(config.max_store_bytes, 32);
        assert_eq!(config.max_index_bytes, 1024);
    }
}
