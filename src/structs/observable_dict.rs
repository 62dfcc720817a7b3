use crate::error::{LikelihoodError, LikelihoodResult};
use crate::structs::key::ObservableKey;
use crate::structs::observable::Observable;
use ndarray::Array2;
use serde_derive::{Deserialize, Serialize};
use std::collections::{btree_map, BTreeMap, BTreeSet};

/// Policy applied when inserting under a key that is already present
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AppendMode {
    /// Concatenate the new realizations after the existing ones
    #[default]
    Extend,
    /// Replace the existing entry
    Overwrite,
}

/// Keyed storage of observables
///
/// Entries are kept in key order so that every pass over the store, and therefore every
/// likelihood sum, visits the keys in the same sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservableDict {
    entries: BTreeMap<ObservableKey, Observable>,
}

impl ObservableDict {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `observable` under `key`, or merge it into the existing entry according to `mode`
    ///
    /// Extending an entry requires the new realizations to have the same length as the
    /// existing ones, otherwise [LikelihoodError::ShapeMismatch] is returned and the store is
    /// left untouched.
    pub fn insert(
        &mut self,
        key: ObservableKey,
        observable: Observable,
        mode: AppendMode,
    ) -> LikelihoodResult<()> {
        match (self.entries.entry(key), mode) {
            (btree_map::Entry::Vacant(slot), _) => {
                slot.insert(observable);
            }
            (btree_map::Entry::Occupied(mut slot), AppendMode::Overwrite) => {
                slot.insert(observable);
            }
            (btree_map::Entry::Occupied(mut slot), AppendMode::Extend) => {
                let existing = slot.get().size();
                if existing != observable.size() {
                    return Err(LikelihoodError::ShapeMismatch {
                        key: slot.key().clone(),
                        expected: existing,
                        found: observable.size(),
                    });
                }
                slot.get_mut().extend(&observable)?;
            }
        }
        Ok(())
    }

    /// Shorthand for [ObservableDict::insert] with [AppendMode::Extend]
    pub fn append(&mut self, key: ObservableKey, observable: Observable) -> LikelihoodResult<()> {
        self.insert(key, observable, AppendMode::Extend)
    }

    pub fn get(&self, key: &ObservableKey) -> LikelihoodResult<&Observable> {
        self.entries
            .get(key)
            .ok_or_else(|| LikelihoodError::KeyNotFound { key: key.clone() })
    }

    pub fn contains_key(&self, key: &ObservableKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &ObservableKey> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ObservableKey, &Observable)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Observed data, one realization per key
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Measurements {
    dict: ObservableDict,
    with_covariance: BTreeSet<ObservableKey>,
}

impl Measurements {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a measured observable
    ///
    /// `has_covariance` marks the key as requiring an entry in the [Covariances] store that
    /// accompanies these measurements.
    pub fn append(
        &mut self,
        key: ObservableKey,
        observable: Observable,
        has_covariance: bool,
    ) -> LikelihoodResult<()> {
        self.insert(key, observable, has_covariance, AppendMode::Extend)
    }

    /// Add or replace a measured observable
    ///
    /// A measurement never grows into an ensemble, so [AppendMode::Extend] on an existing key
    /// is rejected.
    pub fn insert(
        &mut self,
        key: ObservableKey,
        observable: Observable,
        has_covariance: bool,
        mode: AppendMode,
    ) -> LikelihoodResult<()> {
        if observable.ensemble_size() != 1 {
            return Err(LikelihoodError::InvalidParameter(format!(
                "measurement {} must have exactly one realization, got {}",
                key,
                observable.ensemble_size()
            )));
        }
        if mode == AppendMode::Extend && self.dict.contains_key(&key) {
            return Err(LikelihoodError::InvalidParameter(format!(
                "measurement {} already exists",
                key
            )));
        }
        if has_covariance {
            self.with_covariance.insert(key.clone());
        } else {
            self.with_covariance.remove(&key);
        }
        self.dict.insert(key, observable, mode)
    }

    pub fn get(&self, key: &ObservableKey) -> LikelihoodResult<&Observable> {
        self.dict.get(key)
    }

    /// Whether the key was flagged as having a covariance entry
    pub fn has_covariance(&self, key: &ObservableKey) -> bool {
        self.with_covariance.contains(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &ObservableKey> {
        self.dict.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ObservableKey, &Observable)> {
        self.dict.iter()
    }

    pub fn contains_key(&self, key: &ObservableKey) -> bool {
        self.dict.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.dict.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dict.is_empty()
    }
}

/// Simulated ensembles, any number of realizations per key
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Simulations {
    dict: ObservableDict,
}

impl Simulations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add realizations, extending the ensemble if the key is already present
    pub fn append(&mut self, key: ObservableKey, observable: Observable) -> LikelihoodResult<()> {
        self.dict.append(key, observable)
    }

    pub fn insert(
        &mut self,
        key: ObservableKey,
        observable: Observable,
        mode: AppendMode,
    ) -> LikelihoodResult<()> {
        self.dict.insert(key, observable, mode)
    }

    pub fn get(&self, key: &ObservableKey) -> LikelihoodResult<&Observable> {
        self.dict.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &ObservableKey> {
        self.dict.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ObservableKey, &Observable)> {
        self.dict.iter()
    }

    pub fn contains_key(&self, key: &ObservableKey) -> bool {
        self.dict.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.dict.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dict.is_empty()
    }
}

/// Externally supplied covariance matrices, one square matrix per key
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Covariances {
    entries: BTreeMap<ObservableKey, Array2<f64>>,
}

impl Covariances {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the covariance for `key`
    ///
    /// The matrix must be square and non-empty.
    pub fn append(&mut self, key: ObservableKey, matrix: Array2<f64>) -> LikelihoodResult<()> {
        let (rows, cols) = matrix.dim();
        if rows != cols {
            return Err(LikelihoodError::ShapeMismatch {
                key,
                expected: rows,
                found: cols,
            });
        }
        if rows == 0 {
            return Err(LikelihoodError::InvalidParameter(format!(
                "covariance {} is empty",
                key
            )));
        }
        self.entries.insert(key, matrix);
        Ok(())
    }

    pub fn get(&self, key: &ObservableKey) -> LikelihoodResult<&Array2<f64>> {
        self.entries
            .get(key)
            .ok_or_else(|| LikelihoodError::KeyNotFound { key: key.clone() })
    }

    /// Like [Covariances::get], but absence is not an error
    pub fn lookup(&self, key: &ObservableKey) -> Option<&Array2<f64>> {
        self.entries.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &ObservableKey> {
        self.entries.keys()
    }

    pub fn contains_key(&self, key: &ObservableKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
