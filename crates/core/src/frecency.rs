use crate::store::{Entry, WeightStore, DEFAULT_DECREASE, DEFAULT_INCREASE};
use std::path::PathBuf;

/// Storage collaborator. Both calls are all-or-nothing: `load` yields the
/// whole (possibly empty) mapping and `save` replaces it wholesale.
pub trait Persistence {
    type Error;

    fn load(&self) -> Result<WeightStore, Self::Error>;

    fn save(&self, store: &WeightStore) -> Result<(), Self::Error>;
}

/// Applies one weight update per invocation: load, mutate once, save once.
pub struct FrecencyUpdater<'a, P: Persistence> {
    persistence: &'a P,
    home: Option<PathBuf>,
}

impl<'a, P: Persistence> FrecencyUpdater<'a, P> {
    pub fn new(persistence: &'a P) -> Self {
        Self {
            persistence,
            home: None,
        }
    }

    #[must_use]
    pub fn with_home(mut self, home: Option<PathBuf>) -> Self {
        self.home = home;
        self
    }

    /// Record a visit to `path` with the default increment.
    pub fn add(&self, path: &str) -> Result<Entry, P::Error> {
        self.increase(path, None)
    }

    pub fn increase(&self, path: &str, delta: Option<f64>) -> Result<Entry, P::Error> {
        let delta = delta.unwrap_or(DEFAULT_INCREASE);
        self.update(|store| store.increment(path, delta))
    }

    pub fn decrease(&self, path: &str, delta: Option<f64>) -> Result<Entry, P::Error> {
        let delta = delta.unwrap_or(DEFAULT_DECREASE);
        self.update(|store| store.decay(path, delta))
    }

    /// Drop entries for directories that no longer exist; returns how many.
    pub fn purge(&self) -> Result<usize, P::Error> {
        let mut store = self.load()?;
        let removed = store.purge();
        self.persistence.save(&store)?;
        log::debug!("Purged {removed} entries, {} left", store.len());
        Ok(removed)
    }

    /// The store as persisted, with the home directory guard applied.
    pub fn load(&self) -> Result<WeightStore, P::Error> {
        let store = self.persistence.load()?;
        Ok(match &self.home {
            Some(home) => store.with_home(home),
            None => store,
        })
    }

    fn update<F>(&self, apply: F) -> Result<Entry, P::Error>
    where
        F: FnOnce(&mut WeightStore) -> Entry,
    {
        let mut store = self.load()?;
        let entry = apply(&mut store);
        self.persistence.save(&store)?;
        log::debug!("{} -> {:.1}", entry.path, entry.weight);
        Ok(entry)
    }
}
