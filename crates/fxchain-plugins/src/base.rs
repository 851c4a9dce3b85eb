// SPDX-License-Identifier: LGPL-3.0-or-later

//! The [`DspCore`] lifecycle shared by all plugins, and the
//! [`SharedProcessor`] wrapper hosts talk to.
//!
//! A host adapter owns one `SharedProcessor` per plugin instance. Setup
//! and processing go through the same mutex, held for a whole block, so a
//! host calling `prepare` while audio runs cannot leave a core half
//! configured.
//!
//! # Examples
//! ```
//! use fxchain_plugins::SharedProcessor;
//! use fxchain_plugins::two_band_stereo::TwoBandStereoCore;
//!
//! let processor = SharedProcessor::<TwoBandStereoCore>::new();
//! let latency = processor.prepare(48000.0).unwrap();
//! assert_eq!(latency, 257);
//!
//! let left = vec![0.0f32; 64];
//! let right = vec![0.0f32; 64];
//! let mut out_l = vec![1.0f32; 64];
//! let mut out_r = vec![1.0f32; 64];
//! processor
//!     .process_block(64, &[&left, &right], &mut [&mut out_l, &mut out_r])
//!     .unwrap();
//! assert!(out_l.iter().all(|&x| x == 0.0));
//! ```

use std::sync::{Arc, Mutex, MutexGuard};

use fxchain_dsp_lib::context::DspContext;

use crate::error::{Error, Result};
use crate::params::{ParameterDescriptor, ParameterStore};

/// Lifecycle of one plugin's signal processing.
///
/// `setup` and `reset` read the store to snap every smoother to its
/// current value. `set_parameters` is called once per block and glides
/// toward the new values.
pub trait DspCore: Send {
    const NUM_INPUTS: usize;
    const NUM_OUTPUTS: usize;

    fn parameters() -> &'static [ParameterDescriptor];

    /// Allocate for `sample_rate` and reset.
    fn setup(&mut self, sample_rate: f64, params: &ParameterStore) -> Result<()>;

    /// Clear signal state and snap parameters without reallocating.
    fn reset(&mut self, params: &ParameterStore);

    /// Delay in samples for host compensation.
    fn latency(&self) -> usize;

    fn set_parameters(&mut self, params: &ParameterStore);

    /// Process `length` samples. Per-sample code does not fail; errors
    /// come only from the channel checks done on entry.
    fn process(
        &mut self,
        length: usize,
        inputs: &[&[f32]],
        outputs: &mut [&mut [f32]],
    ) -> Result<()>;
}

pub(crate) fn validate_sample_rate(sample_rate: f64) -> Result<f64> {
    if sample_rate.is_finite() && sample_rate > 0.0 {
        Ok(sample_rate)
    } else {
        Err(Error::InvalidSampleRate(sample_rate))
    }
}

struct Inner<C> {
    core: C,
    sample_rate: Option<f64>,
    latency: usize,
    context: DspContext,
}

/// Thread-safe owner of a core and its parameter store.
pub struct SharedProcessor<C: DspCore> {
    params: Arc<ParameterStore>,
    inner: Mutex<Inner<C>>,
}

impl<C: DspCore + Default> Default for SharedProcessor<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: DspCore + Default> SharedProcessor<C> {
    pub fn new() -> Self {
        Self {
            params: Arc::new(ParameterStore::new(C::parameters())),
            inner: Mutex::new(Inner {
                core: C::default(),
                sample_rate: None,
                latency: 0,
                context: DspContext::default(),
            }),
        }
    }
}

impl<C: DspCore> SharedProcessor<C> {
    /// Store the host writes parameter changes to.
    pub fn params(&self) -> &Arc<ParameterStore> {
        &self.params
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner<C>>> {
        self.inner.lock().map_err(|_| Error::Poisoned)
    }

    /// Set up the core for `sample_rate`. A repeated call with the same
    /// rate only resets. Returns the latency.
    pub fn prepare(&self, sample_rate: f64) -> Result<usize> {
        let sample_rate = validate_sample_rate(sample_rate)?;
        let mut inner = self.lock()?;

        if inner.sample_rate == Some(sample_rate) {
            inner.core.reset(&self.params);
            log::debug!("reset at {sample_rate} Hz");
        } else {
            inner.core.setup(sample_rate, &self.params)?;
            inner.sample_rate = Some(sample_rate);
            log::info!("setup at {sample_rate} Hz");
        }

        inner.latency = inner.core.latency();
        Ok(inner.latency)
    }

    /// Clear signal state. Fails with [`Error::NotPrepared`] before the
    /// first [`prepare`](Self::prepare).
    pub fn reset(&self) -> Result<()> {
        let mut inner = self.lock()?;
        if inner.sample_rate.is_none() {
            return Err(Error::NotPrepared);
        }
        inner.core.reset(&self.params);
        log::debug!("reset");
        Ok(())
    }

    pub fn latency(&self) -> Result<usize> {
        Ok(self.lock()?.core.latency())
    }

    pub fn sample_rate(&self) -> Result<Option<f64>> {
        Ok(self.lock()?.sample_rate)
    }

    /// Read parameters and process one block with flush-to-zero enabled.
    pub fn process_block(
        &self,
        length: usize,
        inputs: &[&[f32]],
        outputs: &mut [&mut [f32]],
    ) -> Result<()> {
        let mut guard = self.lock()?;
        let inner = &mut *guard;
        if inner.sample_rate.is_none() {
            return Err(Error::NotPrepared);
        }

        inner.context.start();
        inner.core.set_parameters(&self.params);
        let result = inner.core.process(length, inputs, outputs);
        inner.context.finish();

        let latency = inner.core.latency();
        if latency != inner.latency {
            log::info!("latency changed from {} to {latency}", inner.latency);
            inner.latency = latency;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::check_buffers;
    use fxchain_dsp_lib::scale::Scale;
    use once_cell::sync::Lazy;

    static PARAMS: Lazy<Vec<ParameterDescriptor>> =
        Lazy::new(|| vec![ParameterDescriptor::new("gain", Scale::linear(0.0, 2.0), 0.5)]);

    /// Gain stage whose latency equals the gain value.
    #[derive(Default)]
    struct Gain {
        gain: f64,
        setups: usize,
        resets: usize,
    }

    impl DspCore for Gain {
        const NUM_INPUTS: usize = 1;
        const NUM_OUTPUTS: usize = 1;

        fn parameters() -> &'static [ParameterDescriptor] {
            &PARAMS
        }

        fn setup(&mut self, sample_rate: f64, params: &ParameterStore) -> Result<()> {
            validate_sample_rate(sample_rate)?;
            self.setups += 1;
            self.reset(params);
            Ok(())
        }

        fn reset(&mut self, params: &ParameterStore) {
            self.resets += 1;
            self.gain = params.raw(0);
        }

        fn latency(&self) -> usize {
            self.gain as usize
        }

        fn set_parameters(&mut self, params: &ParameterStore) {
            self.gain = params.raw(0);
        }

        fn process(
            &mut self,
            length: usize,
            inputs: &[&[f32]],
            outputs: &mut [&mut [f32]],
        ) -> Result<()> {
            check_buffers(length, inputs, outputs, 1, 1)?;
            for i in 0..length {
                outputs[0][i] = inputs[0][i] * self.gain as f32;
            }
            Ok(())
        }
    }

    #[test]
    fn test_process_before_prepare_fails() {
        let processor = SharedProcessor::<Gain>::new();
        let input = [1.0f32; 4];
        let mut output = [0.0f32; 4];
        assert_eq!(
            processor.process_block(4, &[&input], &mut [&mut output]),
            Err(Error::NotPrepared)
        );
        assert_eq!(processor.reset(), Err(Error::NotPrepared));
    }

    #[test]
    fn test_prepare_same_rate_only_resets() {
        let processor = SharedProcessor::<Gain>::new();
        processor.prepare(48000.0).unwrap();
        processor.prepare(48000.0).unwrap();
        processor.prepare(44100.0).unwrap();
        let inner = processor.lock().unwrap();
        assert_eq!(inner.core.setups, 2);
        assert_eq!(inner.core.resets, 3);
    }

    #[test]
    fn test_invalid_sample_rate() {
        let processor = SharedProcessor::<Gain>::new();
        for rate in [0.0, -48000.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                processor.prepare(rate),
                Err(Error::InvalidSampleRate(_))
            ));
        }
        assert_eq!(processor.sample_rate().unwrap(), None);
    }

    #[test]
    fn test_block_reads_parameters() {
        let processor = SharedProcessor::<Gain>::new();
        assert_eq!(processor.prepare(48000.0).unwrap(), 1);

        processor.params().set_raw(0, 2.0);
        let input = [0.5f32; 4];
        let mut output = [0.0f32; 4];
        processor
            .process_block(4, &[&input], &mut [&mut output])
            .unwrap();
        assert_eq!(output, [1.0; 4]);
        assert_eq!(processor.latency().unwrap(), 2);
    }

    #[test]
    fn test_block_rejects_short_buffers() {
        let processor = SharedProcessor::<Gain>::new();
        processor.prepare(48000.0).unwrap();
        let input = [0.5f32; 2];
        let mut output = [0.0f32; 4];
        assert!(matches!(
            processor.process_block(4, &[&input], &mut [&mut output]),
            Err(Error::BufferTooShort { channel: 0, .. })
        ));
    }
}
