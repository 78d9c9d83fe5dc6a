//! Explicit cached accessors for the two data sources.
//!
//! Each cache holds one value together with the key it was computed from and recomputes only
//! when the key changes: the simulation is keyed by its [`SimulationConfig`], the amenity table
//! by a [`FileStamp`] (path + modification time). The owner holds the caches, so no locking.

use crate::amenities::{AmenitySource, load_amenities};
use crate::error::ConfigError;
use crate::models::RegularityRecord;
use crate::simulate::{SimulationConfig, generate};
use log::debug;
use std::convert::Infallible;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Identity of a file on disk at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStamp {
    pub path: PathBuf,
    /// `None` when the file is missing or the platform reports no mtime.
    pub modified: Option<SystemTime>,
}

impl FileStamp {
    pub fn of<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        Self {
            path: path.to_path_buf(),
            modified: fs::metadata(path).and_then(|m| m.modified()).ok(),
        }
    }
}

/// Single-slot memo keyed by an invalidation input.
#[derive(Debug)]
pub struct Cached<K, V> {
    slot: Option<(K, V)>,
    computations: usize,
}

impl<K, V> Default for Cached<K, V> {
    fn default() -> Self {
        Self {
            slot: None,
            computations: 0,
        }
    }
}

impl<K: PartialEq, V> Cached<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `key`, computing it with `f` when the key changed.
    ///
    /// A failed computation leaves the cache empty.
    pub fn get_or_try_insert_with<E, F>(&mut self, key: K, f: F) -> Result<&V, E>
    where
        F: FnOnce(&K) -> Result<V, E>,
    {
        let entry = match self.slot.take() {
            Some((k, v)) if k == key => (k, v),
            _ => {
                let v = f(&key)?;
                self.computations += 1;
                (key, v)
            }
        };
        let (_, value) = self.slot.insert(entry);
        Ok(&*value)
    }

    pub fn get_or_insert_with<F>(&mut self, key: K, f: F) -> &V
    where
        F: FnOnce(&K) -> V,
    {
        match self.get_or_try_insert_with(key, |k| Ok::<V, Infallible>(f(k))) {
            Ok(v) => v,
            Err(never) => match never {},
        }
    }

    /// Whether a value computed from `key` is currently held.
    pub fn is_fresh(&self, key: &K) -> bool {
        matches!(&self.slot, Some((k, _)) if k == key)
    }

    /// Cached value regardless of key, if any.
    pub fn peek(&self) -> Option<&V> {
        self.slot.as_ref().map(|(_, v)| v)
    }

    pub fn invalidate(&mut self) {
        self.slot = None;
    }

    /// How many times a value had to be computed.
    pub fn computations(&self) -> usize {
        self.computations
    }
}

/// Caches for both loaders, owned by the front end.
#[derive(Debug, Default)]
pub struct DataCache {
    simulation: Cached<SimulationConfig, Vec<RegularityRecord>>,
    amenities: Cached<FileStamp, AmenitySource>,
}

impl DataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulated series for `config`; regenerated only when the config changes.
    pub fn simulation(
        &mut self,
        config: &SimulationConfig,
    ) -> Result<&[RegularityRecord], ConfigError> {
        if self.simulation.is_fresh(config) {
            debug!("simulation cache hit");
        }
        self.simulation
            .get_or_try_insert_with(config.clone(), |cfg| generate(cfg))
            .map(Vec::as_slice)
    }

    /// Amenity table at `path`; reloaded only when its modification time changes.
    pub fn amenities<P: AsRef<Path>>(&mut self, path: P) -> &AmenitySource {
        let stamp = FileStamp::of(path);
        self.amenities.get_or_insert_with(stamp, |s| {
            debug!("loading amenity table {}", s.path.display());
            load_amenities(&s.path).into()
        })
    }

    pub fn simulation_computations(&self) -> usize {
        self.simulation.computations()
    }

    pub fn amenity_loads(&self) -> usize {
        self.amenities.computations()
    }

    /// Drop both cached values so the next access reloads.
    pub fn clear(&mut self) {
        self.simulation.invalidate();
        self.amenities.invalidate();
    }
}
