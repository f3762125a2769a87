use crate::config::Config;
use crate::error::{DataError, Result};
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use waypoint_core::{Persistence, WeightStore};

/// A backup older than this is refreshed from the current data file on save.
pub const BACKUP_THRESHOLD: Duration = Duration::from_secs(24 * 60 * 60);

/// Tab-separated `weight\tpath` text file with a rolling backup.
#[derive(Clone, Debug)]
pub struct DataFile {
    data_path: PathBuf,
    backup_path: PathBuf,
    backup_threshold: Duration,
}

impl DataFile {
    pub fn new(config: &Config) -> Self {
        Self {
            data_path: config.data_path.clone(),
            backup_path: config.backup_path.clone(),
            backup_threshold: BACKUP_THRESHOLD,
        }
    }

    #[must_use]
    pub fn with_backup_threshold(mut self, threshold: Duration) -> Self {
        self.backup_threshold = threshold;
        self
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    fn restore_backup(&self) -> Result<WeightStore> {
        if !self.backup_path.exists() {
            return Ok(WeightStore::new());
        }
        log::warn!(
            "Restoring {} from backup {}",
            self.data_path.display(),
            self.backup_path.display()
        );
        fs::rename(&self.backup_path, &self.data_path).map_err(|source| DataError::Replace {
            from: self.backup_path.clone(),
            to: self.data_path.clone(),
            source,
        })?;
        let text = fs::read_to_string(&self.data_path).map_err(|source| DataError::Read {
            path: self.data_path.clone(),
            source,
        })?;
        Ok(parse_store(&text))
    }

    fn backup_is_stale(&self) -> bool {
        let modified = fs::metadata(&self.backup_path).and_then(|meta| meta.modified());
        match modified {
            Ok(modified) => SystemTime::now()
                .duration_since(modified)
                .map(|age| age > self.backup_threshold)
                .unwrap_or(false),
            Err(_) => true,
        }
    }
}

impl Persistence for DataFile {
    type Error = DataError;

    fn load(&self) -> Result<WeightStore> {
        match fs::read_to_string(&self.data_path) {
            Ok(text) => {
                let store = parse_store(&text);
                log::debug!(
                    "Loaded {} entries from {}",
                    store.len(),
                    self.data_path.display()
                );
                Ok(store)
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(WeightStore::new()),
            Err(err) => {
                log::warn!("Cannot read {}: {err}", self.data_path.display());
                self.restore_backup()
            }
        }
    }

    fn save(&self, store: &WeightStore) -> Result<()> {
        let parent = self
            .data_path
            .parent()
            .ok_or_else(|| DataError::InvalidPath(self.data_path.display().to_string()))?;
        fs::create_dir_all(parent).map_err(|source| DataError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;

        let tmp = write_temp(&self.data_path, render_store(store).as_bytes())?;

        if self.data_path.exists() && self.backup_is_stale() {
            log::debug!("Refreshing backup {}", self.backup_path.display());
            if let Err(source) = fs::copy(&self.data_path, &self.backup_path) {
                discard_temp(&tmp);
                return Err(DataError::Write {
                    path: self.backup_path.clone(),
                    source,
                });
            }
        }

        if let Err(source) = fs::rename(&tmp, &self.data_path) {
            discard_temp(&tmp);
            return Err(DataError::Replace {
                from: tmp,
                to: self.data_path.clone(),
                source,
            });
        }
        log::debug!(
            "Saved {} entries to {}",
            store.len(),
            self.data_path.display()
        );
        Ok(())
    }
}

fn discard_temp(tmp: &Path) {
    if let Err(err) = fs::remove_file(tmp) {
        log::warn!("Failed to remove {}: {err}", tmp.display());
    }
}

fn write_temp(path: &Path, bytes: &[u8]) -> Result<PathBuf> {
    let parent = path
        .parent()
        .ok_or_else(|| DataError::InvalidPath(path.display().to_string()))?;
    let tmp = parent.join(format!(
        ".{}.tmp-{}",
        path.file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("waypoint"),
        std::process::id()
    ));

    let write = |tmp: &Path| -> std::io::Result<()> {
        let mut file = File::create(tmp)?;
        file.write_all(bytes)?;
        file.sync_all()
    };
    write(&tmp).map_err(|source| DataError::Write {
        path: tmp.clone(),
        source,
    })?;
    Ok(tmp)
}

/// Parse `weight\tpath` lines. The path is everything after the first tab.
/// Malformed lines are skipped.
pub fn parse_store(text: &str) -> WeightStore {
    let mut weights = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        if line.is_empty() {
            continue;
        }
        let Some((weight, path)) = line.split_once('\t') else {
            log::warn!("Skipping malformed data line {}", idx + 1);
            continue;
        };
        match weight.trim().parse::<f64>() {
            Ok(weight) if weight.is_finite() && weight >= 0.0 => {
                weights.push((path.to_string(), weight));
            }
            _ => log::warn!("Skipping data line {} with bad weight {weight:?}", idx + 1),
        }
    }
    WeightStore::from_weights(weights)
}

/// Render the store heaviest first, so the file reads like a ranking. Paths
/// containing a line break are left out.
pub fn render_store(store: &WeightStore) -> String {
    let mut entries = store.entries();
    entries.sort_by(|a, b| b.cmp_by_weight(a));

    let mut out = String::new();
    for entry in entries {
        // A line break inside the path would split it into extra records.
        if entry.path.contains(['\n', '\r']) {
            log::warn!("Not saving path with a line break: {:?}", entry.path);
            continue;
        }
        out.push_str(&format!("{}\t{}\n", entry.weight, entry.path));
    }
    out
}
