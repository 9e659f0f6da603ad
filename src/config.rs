//! Board Configuration
//!
//! The only externally tunable surface of the engine: how many visual
//! columns the board lays lists into, and the focus-retry budget.

use std::time::Duration;

/// Default number of visual columns lists are grouped into
pub const DEFAULT_COLUMN_COUNT: usize = 5;

/// Engine tunables
#[derive(Debug, Clone, Copy)]
pub struct BoardConfig {
    /// Number of visual columns on the board
    pub column_count: usize,
    /// Maximum focus attempts before giving up
    pub focus_attempts: u32,
    /// Delay between focus attempts
    pub focus_interval: Duration,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            column_count: DEFAULT_COLUMN_COUNT,
            focus_attempts: 10,
            focus_interval: Duration::from_millis(50),
        }
    }
}
