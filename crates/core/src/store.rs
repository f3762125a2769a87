use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::{is_separator, Path};

/// Weight added by `--increase` and by every recorded visit.
pub const DEFAULT_INCREASE: f64 = 10.0;

/// Weight removed by `--decrease`.
pub const DEFAULT_DECREASE: f64 = 15.0;

/// A visited directory and its frecency weight.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub path: String,
    pub weight: f64,
}

impl Entry {
    pub fn new(path: impl Into<String>, weight: f64) -> Self {
        Self {
            path: path.into(),
            weight,
        }
    }

    /// Ascending `(weight, path)` order. Ranking uses the reverse of this, so
    /// equal weights fall back to reverse lexicographic path order.
    pub fn cmp_by_weight(&self, other: &Self) -> Ordering {
        self.weight
            .total_cmp(&other.weight)
            .then_with(|| self.path.cmp(&other.path))
    }
}

/// Strip trailing path separators. The filesystem root keeps one separator.
#[must_use]
pub fn normalize_path(path: &str) -> &str {
    let trimmed = path.trim_end_matches(is_separator);
    if trimmed.is_empty() && !path.is_empty() {
        return &path[..1];
    }
    trimmed
}

/// Keep only entries whose directory still exists.
#[must_use]
pub fn purge(entries: Vec<Entry>) -> Vec<Entry> {
    entries
        .into_iter()
        .filter(|entry| Path::new(&entry.path).exists())
        .collect()
}

/// In-memory path -> weight mapping.
///
/// Keys are always normalized, so `/a/b` and `/a/b/` share one entry. The
/// mapping has no meaningful order; ordering is imposed by the matcher.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightStore {
    weights: HashMap<String, f64>,
    home: Option<String>,
}

impl WeightStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from raw `(path, weight)` pairs. Paths that collide after
    /// normalization keep the larger weight; negative weights clamp to zero.
    pub fn from_weights<I>(weights: I) -> Self
    where
        I: IntoIterator<Item = (String, f64)>,
    {
        let mut store = Self::new();
        for (path, weight) in weights {
            let key = normalize_path(&path).to_string();
            let weight = weight.max(0.0);
            store
                .weights
                .entry(key)
                .and_modify(|w| *w = w.max(weight))
                .or_insert(weight);
        }
        store
    }

    /// Register the user's home directory, which `increment` refuses to store.
    #[must_use]
    pub fn with_home(mut self, home: impl AsRef<Path>) -> Self {
        let home = home.as_ref().to_string_lossy();
        self.home = Some(normalize_path(&home).to_string());
        self
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Weight of `path`, or `0.0` when it was never visited.
    pub fn get(&self, path: &str) -> f64 {
        self.weights
            .get(normalize_path(path))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.weights.contains_key(normalize_path(path))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(path, w)| (path.as_str(), *w))
    }

    /// Snapshot of all entries, in no particular order.
    pub fn entries(&self) -> Vec<Entry> {
        self.iter().map(|(path, w)| Entry::new(path, w)).collect()
    }

    pub fn total_weight(&self) -> f64 {
        self.weights.values().sum()
    }

    /// Grow the weight of `path` by `delta` in quadrature:
    /// `sqrt(old^2 + delta^2)`. Repeated visits keep rewarding a directory
    /// while growing sub-linearly.
    ///
    /// The home directory is a no-op reported with weight zero.
    pub fn increment(&mut self, path: &str, delta: f64) -> Entry {
        let path = normalize_path(path);
        if self.home.as_deref() == Some(path) {
            return Entry::new(path, 0.0);
        }

        let old = self.get(path);
        let weight = old.hypot(delta);
        self.weights.insert(path.to_string(), weight);
        Entry::new(path, weight)
    }

    /// Shrink the weight of `path` linearly by `delta`, clamped at zero. An
    /// unknown path is treated as weight zero.
    pub fn decay(&mut self, path: &str, delta: f64) -> Entry {
        let path = normalize_path(path);
        let weight = (self.get(path) - delta).max(0.0);
        self.weights.insert(path.to_string(), weight);
        Entry::new(path, weight)
    }

    /// Remove entries whose directory no longer exists. Returns how many were
    /// dropped.
    pub fn purge(&mut self) -> usize {
        let before = self.weights.len();
        self.weights.retain(|path, _| Path::new(path).exists());
        before - self.weights.len()
    }
}
