// SPDX-License-Identifier: LGPL-3.0-or-later

//! Parameter descriptors and the lock-free parameter store.
//!
//! Every core publishes a static table of [`ParameterDescriptor`]s. A
//! [`ParameterStore`] built from that table keeps one atomic per
//! parameter holding the raw (mapped) value. The host writes from any
//! thread; the core reads a snapshot once per block with relaxed loads.
//!
//! # Examples
//! ```
//! use fxchain_plugins::params::ParameterStore;
//! use fxchain_plugins::slope_filter::SlopeFilterCore;
//! use fxchain_plugins::DspCore;
//!
//! let store = ParameterStore::new(SlopeFilterCore::parameters());
//! store.set_raw_by_name("slopeDecibel", -3.0).unwrap();
//! assert_eq!(store.raw_by_name("slopeDecibel").unwrap(), -3.0);
//! assert!(store.set_raw_by_name("nope", 0.0).is_err());
//! ```

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use fxchain_dsp_lib::scale::Scale;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Static description of one parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterDescriptor {
    /// Identifier used for lookup and persisted state.
    pub name: &'static str,
    pub scale: Scale,
    /// Default value in `[0, 1]`.
    pub default_normalized: f64,
}

impl ParameterDescriptor {
    pub fn new(name: &'static str, scale: Scale, default_normalized: f64) -> Self {
        Self {
            name,
            scale,
            default_normalized,
        }
    }

    /// Descriptor whose default is given as a raw value.
    pub fn with_raw_default(name: &'static str, scale: Scale, raw: f64) -> Self {
        Self::new(name, scale, scale.invmap(raw))
    }

    /// Descriptor whose default is given in decibels. Only meaningful for
    /// the decibel scales.
    pub fn with_db_default(name: &'static str, scale: Scale, db: f64) -> Self {
        Self::new(name, scale, scale.invmap_db(db))
    }

    pub fn default_raw(&self) -> f64 {
        self.scale.map(self.default_normalized)
    }
}

/// Name to raw value map of every parameter in a store.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSnapshot {
    pub values: BTreeMap<String, f64>,
}

/// Raw parameter values shared between host and audio thread.
#[derive(Debug)]
pub struct ParameterStore {
    descriptors: &'static [ParameterDescriptor],
    values: Vec<AtomicU64>,
}

impl ParameterStore {
    /// Store holding the defaults of `descriptors`.
    pub fn new(descriptors: &'static [ParameterDescriptor]) -> Self {
        let values = descriptors
            .iter()
            .map(|d| AtomicU64::new(d.default_raw().to_bits()))
            .collect();
        Self {
            descriptors,
            values,
        }
    }

    pub fn descriptors(&self) -> &'static [ParameterDescriptor] {
        self.descriptors
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.descriptors
            .iter()
            .position(|d| d.name == name)
            .ok_or_else(|| Error::UnknownParameter(name.to_string()))
    }

    /// Raw value of parameter `index`. Indices past the table read as 0.
    #[inline]
    pub fn raw(&self, index: usize) -> f64 {
        self.values
            .get(index)
            .map_or(0.0, |v| f64::from_bits(v.load(Ordering::Relaxed)))
    }

    pub fn raw_by_name(&self, name: &str) -> Result<f64> {
        self.index_of(name).map(|i| self.raw(i))
    }

    /// Normalized value of parameter `index`.
    pub fn normalized(&self, index: usize) -> f64 {
        self.descriptors
            .get(index)
            .map_or(0.0, |d| d.scale.invmap(self.raw(index)))
    }

    /// Store `raw` clamped into the range of the parameter's scale.
    pub fn set_raw(&self, index: usize, raw: f64) {
        if let (Some(d), Some(v)) = (self.descriptors.get(index), self.values.get(index)) {
            v.store(d.scale.clamp_raw(raw).to_bits(), Ordering::Relaxed);
        }
    }

    /// Map `normalized` through the parameter's scale and store it.
    pub fn set_normalized(&self, index: usize, normalized: f64) {
        if let (Some(d), Some(v)) = (self.descriptors.get(index), self.values.get(index)) {
            let raw = d.scale.map(normalized.clamp(0.0, 1.0));
            v.store(raw.to_bits(), Ordering::Relaxed);
        }
    }

    pub fn set_raw_by_name(&self, name: &str, raw: f64) -> Result<()> {
        let index = self.index_of(name)?;
        self.set_raw(index, raw);
        Ok(())
    }

    pub fn set_normalized_by_name(&self, name: &str, normalized: f64) -> Result<()> {
        let index = self.index_of(name)?;
        self.set_normalized(index, normalized);
        Ok(())
    }

    pub fn reset_to_defaults(&self) {
        for (d, v) in self.descriptors.iter().zip(self.values.iter()) {
            v.store(d.default_raw().to_bits(), Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> ParameterSnapshot {
        let values = self
            .descriptors
            .iter()
            .enumerate()
            .map(|(i, d)| (d.name.to_string(), self.raw(i)))
            .collect();
        ParameterSnapshot { values }
    }

    /// Apply a snapshot. Names this store does not know are skipped.
    /// Returns the number of values applied.
    pub fn restore(&self, snapshot: &ParameterSnapshot) -> usize {
        let mut applied = 0;
        for (name, &raw) in &snapshot.values {
            match self.index_of(name) {
                Ok(index) => {
                    self.set_raw(index, raw);
                    applied += 1;
                }
                Err(err) => log::warn!("skipping restored value: {err}"),
            }
        }
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use once_cell::sync::Lazy;

    static TABLE: Lazy<Vec<ParameterDescriptor>> = Lazy::new(|| {
        vec![
            ParameterDescriptor::with_raw_default("mode", Scale::uint(3), 2.0),
            ParameterDescriptor::with_db_default("gain", Scale::decibel(-60.0, 60.0, true), 0.0),
            ParameterDescriptor::new("mix", Scale::UNIPOLAR, 0.25),
        ]
    });

    #[test]
    fn test_defaults() {
        let store = ParameterStore::new(&TABLE);
        assert_eq!(store.len(), 3);
        assert_eq!(store.raw(0), 2.0);
        assert_approx_eq!(f64, store.raw(1), 1.0, epsilon = 1e-12);
        assert_eq!(store.raw(2), 0.25);
        assert_eq!(store.raw(99), 0.0);
    }

    #[test]
    fn test_set_raw_clamps() {
        let store = ParameterStore::new(&TABLE);
        store.set_raw(2, 4.0);
        assert_eq!(store.raw(2), 1.0);
        store.set_raw(0, -1.0);
        assert_eq!(store.raw(0), 0.0);
    }

    #[test]
    fn test_set_normalized_maps() {
        let store = ParameterStore::new(&TABLE);
        store.set_normalized(1, 0.0);
        assert_eq!(store.raw(1), 0.0);
        store.set_normalized(0, 1.0);
        assert_eq!(store.raw(0), 3.0);
        assert_approx_eq!(f64, store.normalized(0), 1.0, ulps = 2);
    }

    #[test]
    fn test_lookup_by_name() {
        let store = ParameterStore::new(&TABLE);
        assert_eq!(store.index_of("mix"), Ok(2));
        assert_eq!(
            store.set_raw_by_name("missing", 1.0),
            Err(Error::UnknownParameter("missing".into()))
        );
    }

    #[test]
    fn test_snapshot_restore() {
        let store = ParameterStore::new(&TABLE);
        store.set_raw(2, 0.75);
        let mut snapshot = store.snapshot();
        assert_eq!(snapshot.values.len(), 3);

        store.reset_to_defaults();
        assert_eq!(store.raw(2), 0.25);

        snapshot.values.insert("obsolete".into(), 1.0);
        assert_eq!(store.restore(&snapshot), 3);
        assert_eq!(store.raw(2), 0.75);
    }
}
