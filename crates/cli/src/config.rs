use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Overrides the data directory (defaults to `<data_dir>/waypoint`).
pub const DATA_DIR_ENV: &str = "WAYPOINT_DATA_DIR";

/// Exported as `1` by the shell integration script.
pub const SOURCED_ENV: &str = "WAYPOINT_SOURCED";

pub const APP_DIR_NAME: &str = "waypoint";
pub const DATA_FILE_NAME: &str = "waypoint.txt";
pub const BACKUP_FILE_NAME: &str = "waypoint.txt.bak";

#[derive(Clone, Debug)]
pub struct Config {
    pub data_path: PathBuf,
    pub backup_path: PathBuf,
    pub home: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let dir = match std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::data_dir()
                .map(|dir| dir.join(APP_DIR_NAME))
                .context("Cannot determine a data directory; set WAYPOINT_DATA_DIR")?,
        };
        Ok(Self::for_data_dir(&dir, dirs::home_dir()))
    }

    #[must_use]
    pub fn for_data_dir(dir: &Path, home: Option<PathBuf>) -> Self {
        Self {
            data_path: dir.join(DATA_FILE_NAME),
            backup_path: dir.join(BACKUP_FILE_NAME),
            home,
        }
    }
}

pub fn is_shell_sourced() -> bool {
    std::env::var(SOURCED_ENV).is_ok_and(|v| v == "1")
}
