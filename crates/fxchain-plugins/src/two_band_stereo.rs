// SPDX-License-Identifier: LGPL-3.0-or-later

//! Two-band stereo width control.
//!
//! Each channel is split by a linear-phase Linkwitz-Riley crossover. The
//! stereo spread of each band is then narrowed toward its mid signal and
//! the bands are summed. At full spread in both bands the output is the
//! input delayed by the crossover latency.

use fxchain_dsp_lib::float::lerp;
use fxchain_dsp_lib::scale::Scale;
use fxchain_dsp_lib::smoother::{ExpSmoother, SmootherCommon, SmoothingMode};
use fxchain_dsp_units::filters::crossover::LinkwitzRileyFir2Band;
use once_cell::sync::Lazy;

use crate::base::{DspCore, validate_sample_rate};
use crate::error::{Result, check_buffers};
use crate::params::{ParameterDescriptor, ParameterStore};

const SMOOTHING_SECONDS: f64 = 1.0;

/// Parameter indices into [`TwoBandStereoCore::parameters`].
pub mod param {
    pub const CROSSOVER_HZ: usize = 0;
    pub const UPPER_STEREO_SPREAD: usize = 1;
    pub const LOWER_STEREO_SPREAD: usize = 2;
}

static PARAMETERS: Lazy<Vec<ParameterDescriptor>> = Lazy::new(|| {
    vec![
        ParameterDescriptor::with_raw_default(
            "crossoverHz",
            Scale::decibel(20.0, 86.0206, false),
            200.0,
        ),
        ParameterDescriptor::new("upperStereoSpread", Scale::UNIPOLAR, 1.0),
        ParameterDescriptor::new("lowerStereoSpread", Scale::UNIPOLAR, 1.0),
    ]
});

/// `spread` 0 gives the mid signal, 1 gives `channel` unchanged.
#[inline]
pub fn mix_stereo(left: f64, right: f64, channel: f64, spread: f64) -> f64 {
    let mid = (left + right) * 0.5;
    lerp(mid, channel, spread)
}

#[derive(Debug, Clone)]
pub struct TwoBandStereoCore {
    sample_rate: f64,
    smoother: SmootherCommon,
    /// Crossover frequency in cycles per sample.
    crossover: ExpSmoother,
    upper_spread: ExpSmoother,
    lower_spread: ExpSmoother,
    filters: [LinkwitzRileyFir2Band; 2],
}

impl Default for TwoBandStereoCore {
    fn default() -> Self {
        Self {
            sample_rate: 44100.0,
            smoother: SmootherCommon::new(),
            crossover: ExpSmoother::new(),
            upper_spread: ExpSmoother::new(),
            lower_spread: ExpSmoother::new(),
            filters: [LinkwitzRileyFir2Band::new(), LinkwitzRileyFir2Band::new()],
        }
    }
}

impl TwoBandStereoCore {
    pub fn new() -> Self {
        Self::default()
    }

    fn apply(&mut self, mode: SmoothingMode, params: &ParameterStore) {
        self.crossover
            .apply(mode, params.raw(param::CROSSOVER_HZ) / self.sample_rate);
        self.upper_spread
            .apply(mode, params.raw(param::UPPER_STEREO_SPREAD));
        self.lower_spread
            .apply(mode, params.raw(param::LOWER_STEREO_SPREAD));
    }
}

impl DspCore for TwoBandStereoCore {
    const NUM_INPUTS: usize = 2;
    const NUM_OUTPUTS: usize = 2;

    fn parameters() -> &'static [ParameterDescriptor] {
        &PARAMETERS
    }

    fn setup(&mut self, sample_rate: f64, params: &ParameterStore) -> Result<()> {
        self.sample_rate = validate_sample_rate(sample_rate)?;
        self.smoother.set_sample_rate(self.sample_rate);
        self.smoother.set_time(SMOOTHING_SECONDS);
        self.reset(params);
        Ok(())
    }

    fn reset(&mut self, params: &ParameterStore) {
        self.apply(SmoothingMode::Reset, params);
        let crossover = self.crossover.value();
        for filter in self.filters.iter_mut() {
            filter.reset();
            filter.prepare(crossover);
        }
    }

    fn latency(&self) -> usize {
        self.filters[0].latency()
    }

    fn set_parameters(&mut self, params: &ParameterStore) {
        self.apply(SmoothingMode::Push, params);
    }

    fn process(
        &mut self,
        length: usize,
        inputs: &[&[f32]],
        outputs: &mut [&mut [f32]],
    ) -> Result<()> {
        check_buffers(length, inputs, outputs, Self::NUM_INPUTS, Self::NUM_OUTPUTS)?;

        let kp = self.smoother.kp();
        for i in 0..length {
            let crossover = self.crossover.process(kp);
            let upper_spread = self.upper_spread.process(kp);
            let lower_spread = self.lower_spread.process(kp);

            let mut low = [0.0; 2];
            let mut high = [0.0; 2];
            for ch in 0..2 {
                self.filters[ch].prepare(crossover);
                [low[ch], high[ch]] = self.filters[ch].process(f64::from(inputs[ch][i]));
            }

            for ch in 0..2 {
                let lower = mix_stereo(low[0], low[1], low[ch], lower_spread);
                let upper = mix_stereo(high[0], high[1], high[ch], upper_spread);
                outputs[ch][i] = (lower + upper) as f32;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use rand::prelude::*;
    use rand_chacha::ChaCha8Rng;

    const LENGTH: usize = 1024;

    fn run(params: &ParameterStore, left: &[f32], right: &[f32]) -> (Vec<f32>, Vec<f32>) {
        let mut core = TwoBandStereoCore::new();
        core.setup(48000.0, params).unwrap();
        let mut l = vec![0.0f32; left.len()];
        let mut r = vec![0.0f32; left.len()];
        core.process(left.len(), &[left, right], &mut [&mut l, &mut r])
            .unwrap();
        (l, r)
    }

    fn noise(seed: u64) -> Vec<f32> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        (0..LENGTH).map(|_| rng.random::<f32>() * 2.0 - 1.0).collect()
    }

    #[test]
    fn test_defaults() {
        let params = ParameterStore::new(TwoBandStereoCore::parameters());
        assert_approx_eq!(f64, params.raw(param::CROSSOVER_HZ), 200.0, epsilon = 1e-9);
        assert_eq!(params.raw(param::UPPER_STEREO_SPREAD), 1.0);
        assert_eq!(params.raw(param::LOWER_STEREO_SPREAD), 1.0);
    }

    #[test]
    fn test_mix_stereo() {
        assert_eq!(mix_stereo(1.0, -1.0, 1.0, 0.0), 0.0);
        assert_eq!(mix_stereo(1.0, -1.0, -1.0, 1.0), -1.0);
        assert_eq!(mix_stereo(1.0, 0.0, 1.0, 0.5), 0.75);
    }

    #[test]
    fn test_full_spread_is_delayed_input() {
        let params = ParameterStore::new(TwoBandStereoCore::parameters());
        let left = noise(1);
        let right = noise(2);
        let (l, r) = run(&params, &left, &right);

        let latency = 257;
        assert!(l[..latency].iter().all(|&y| y.abs() < 1e-6));
        for i in latency..LENGTH {
            assert_approx_eq!(f32, l[i], left[i - latency], epsilon = 1e-5);
            assert_approx_eq!(f32, r[i], right[i - latency], epsilon = 1e-5);
        }
    }

    #[test]
    fn test_zero_spread_is_mono() {
        let params = ParameterStore::new(TwoBandStereoCore::parameters());
        params.set_raw(param::UPPER_STEREO_SPREAD, 0.0);
        params.set_raw(param::LOWER_STEREO_SPREAD, 0.0);

        let left = noise(3);
        let right: Vec<f32> = left.iter().map(|x| -x).collect();
        let (l, r) = run(&params, &left, &right);
        for (&a, &b) in l.iter().zip(r.iter()) {
            assert!(a.abs() < 1e-5);
            assert_approx_eq!(f32, a, b, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_latency_reported() {
        let params = ParameterStore::new(TwoBandStereoCore::parameters());
        let mut core = TwoBandStereoCore::new();
        core.setup(44100.0, &params).unwrap();
        assert_eq!(core.latency(), 257);
    }
}
