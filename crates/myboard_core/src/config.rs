//! Runtime configuration and persisted key names.
//!
//! # Invariants
//! - Key names match the layout written by earlier board builds, so an
//!   existing database keeps loading after upgrade.

use crate::logging::default_log_level;
use std::path::PathBuf;
use std::time::Duration;

/// Key holding the full task collection.
pub const TASKS_KEY: &str = "kanbanTasks";
/// Key holding the full credential collection.
pub const VAULT_KEY: &str = "vault_entries";
/// Key owned by the budget sub-application; read/written only as a fallback.
pub const BUDGET_FALLBACK_KEY: &str = "budgetData_v2";
/// Key holding the raw `light|dark` theme preference.
pub const THEME_KEY: &str = "myboard_theme";

pub const DEFAULT_DB_FILE_NAME: &str = "myboard.sqlite3";
pub const DEFAULT_EXCHANGE_TIMEOUT: Duration = Duration::from_millis(800);
pub const DEFAULT_DAY_CELL_LIMIT: usize = 3;

/// Board runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    pub db_path: PathBuf,
    /// Rolling log directory; `None` leaves logging uninitialized.
    pub log_dir: Option<PathBuf>,
    pub log_level: String,
    /// Upper bound on waiting for a `budgetDataResponse`.
    pub exchange_timeout: Duration,
    /// Tasks shown per calendar day before the overflow counter.
    pub day_cell_limit: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_dir: None,
            log_level: default_log_level().to_string(),
            exchange_timeout: DEFAULT_EXCHANGE_TIMEOUT,
            day_cell_limit: DEFAULT_DAY_CELL_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::BoardConfig;
    use std::time::Duration;

    #[test]
    fn defaults_match_board_constants() {
        let config = BoardConfig::default();
        assert_eq!(config.exchange_timeout, Duration::from_millis(800));
        assert_eq!(config.day_cell_limit, 3);
        assert!(config.log_dir.is_none());
    }
}
