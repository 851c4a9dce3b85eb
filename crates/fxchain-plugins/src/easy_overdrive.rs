// SPDX-License-Identifier: LGPL-3.0-or-later

//! Stereo overdrive with optional asymmetric drive, lookahead limiter and
//! selectable oversampling.
//!
//! Per internal frame the chain is:
//!
//! ```text
//! pre gain -> overdrive -> [asym drive] -> [limiter input gain -> limiter] -> post gain
//! ```
//!
//! Input goes through a cubic 16x up-sampler at every setting. At 16x all
//! sixteen frames are processed, then decimated and reduced by a half-band
//! stage. At 2x only frames 0 and 8 are processed and go straight to the
//! half-band stage. At 1x only frame 0 is processed.
//!
//! Latency is 2 samples from the up-sampler, plus the limiter lookahead
//! when the limiter is on.

use std::f64::consts::FRAC_1_SQRT_2;

use fxchain_dsp_lib::multirate::{CubicUpSampler, OverSampler16};
use fxchain_dsp_lib::scale::Scale;
use fxchain_dsp_lib::smoother::{ExpSmoother, SmootherCommon, SmoothingMode};
use fxchain_dsp_units::dynamics::asym_drive::{AsymDriveParams, AsymDriveShape, AsymmetricDrive};
use fxchain_dsp_units::dynamics::limiter::BasicLimiter;
use fxchain_dsp_units::dynamics::overdrive::{BadLimiter, BadLimiterParams, OverDriveType};
use once_cell::sync::Lazy;

use crate::base::{DspCore, validate_sample_rate};
use crate::error::{Result, check_buffers};
use crate::params::{ParameterDescriptor, ParameterStore};

const UP_FOLD: usize = 16;
const FOLD: [usize; 3] = [1, 2, UP_FOLD];
const LIMITER_ATTACK_SECONDS: f64 = 0.001;
const UP_SAMPLER_LATENCY: usize = 2;

/// Parameter indices into [`EasyOverdriveCore::parameters`].
pub mod param {
    pub const PRE_DRIVE_GAIN: usize = 0;
    pub const POST_DRIVE_GAIN: usize = 1;
    pub const OVER_DRIVE_TYPE: usize = 2;
    pub const OVER_DRIVE_HOLD_SECOND: usize = 3;
    pub const OVER_DRIVE_Q: usize = 4;
    pub const OVER_DRIVE_CHARACTER_AMP: usize = 5;
    pub const ASYM_DRIVE_ENABLED: usize = 6;
    pub const ASYM_DRIVE_SHAPE: usize = 7;
    pub const ASYM_DRIVE_DECAY_SECOND: usize = 8;
    pub const ASYM_DRIVE_DECAY_BIAS: usize = 9;
    pub const ASYM_DRIVE_Q: usize = 10;
    pub const ASYM_EXPONENT_RANGE: usize = 11;
    pub const LIMITER_ENABLED: usize = 12;
    pub const LIMITER_INPUT_GAIN: usize = 13;
    pub const LIMITER_RELEASE_SECOND: usize = 14;
    pub const OVERSAMPLING: usize = 15;
    pub const PARAMETER_SMOOTHING_SECOND: usize = 16;
}

fn hold_second_scale() -> Scale {
    Scale::decibel(-100.0, -20.0, true)
}

static PARAMETERS: Lazy<Vec<ParameterDescriptor>> = Lazy::new(|| {
    let gain = Scale::decibel(-60.0, 60.0, true);
    let filter_q = Scale::decibel(-20.0, 40.0, false);
    let envelope_second = Scale::decibel(-80.0, 40.0, true);

    vec![
        ParameterDescriptor::with_db_default("preDriveGain", gain, 0.0),
        ParameterDescriptor::with_db_default("postDriveGain", gain, -6.0),
        ParameterDescriptor::with_raw_default("overDriveType", Scale::uint(7), 0.0),
        ParameterDescriptor::with_raw_default("overDriveHoldSecond", hold_second_scale(), 0.001),
        ParameterDescriptor::with_raw_default("overDriveQ", filter_q, FRAC_1_SQRT_2),
        ParameterDescriptor::with_db_default("overDriveCharacterAmp", gain, 0.0),
        ParameterDescriptor::with_raw_default("asymDriveEnabled", Scale::BOOLEAN, 0.0),
        ParameterDescriptor::with_raw_default("asymDriveShape", Scale::BOOLEAN, 0.0),
        ParameterDescriptor::with_raw_default("asymDriveDecaySecond", envelope_second, 0.01),
        ParameterDescriptor::with_db_default(
            "asymDriveDecayBias",
            Scale::decibel(-40.0, 40.0, false),
            0.0,
        ),
        ParameterDescriptor::with_raw_default("asymDriveQ", filter_q, FRAC_1_SQRT_2),
        ParameterDescriptor::with_raw_default("asymExponentRange", Scale::linear(0.0, 16.0), 1.0),
        ParameterDescriptor::with_raw_default("limiterEnabled", Scale::BOOLEAN, 1.0),
        ParameterDescriptor::with_db_default("limiterInputGain", gain, 0.0),
        ParameterDescriptor::new("limiterReleaseSecond", envelope_second, 0.0),
        ParameterDescriptor::with_raw_default("oversampling", Scale::uint(2), 1.0),
        ParameterDescriptor::with_raw_default("parameterSmoothingSecond", envelope_second, 0.1),
    ]
});

/// Oversampling selector, in parameter index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Oversampling {
    X1,
    #[default]
    X2,
    X16,
}

impl Oversampling {
    /// Indices past the last variant select 16x.
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => Oversampling::X1,
            1 => Oversampling::X2,
            _ => Oversampling::X16,
        }
    }

    pub fn fold(self) -> usize {
        FOLD[self as usize]
    }
}

#[derive(Debug, Clone)]
pub struct EasyOverdriveCore {
    sample_rate: f64,
    up_rate: f64,
    smoother: SmootherCommon,

    oversampling: Oversampling,
    overdrive_type: OverDriveType,
    asym_drive_enabled: bool,
    limiter_enabled: bool,

    pre_drive_gain: ExpSmoother,
    limiter_input_gain: ExpSmoother,
    post_drive_gain: ExpSmoother,

    overdrive: [BadLimiter; 2],
    asym_drive: [AsymmetricDrive; 2],
    limiter: [BasicLimiter; 2],
    oversampler: [OverSampler16<CubicUpSampler<UP_FOLD>>; 2],
}

impl Default for EasyOverdriveCore {
    fn default() -> Self {
        let sample_rate = 44100.0;
        let oversampling = Oversampling::default();
        Self {
            sample_rate,
            up_rate: sample_rate * oversampling.fold() as f64,
            smoother: SmootherCommon::new(),
            oversampling,
            overdrive_type: OverDriveType::default(),
            asym_drive_enabled: false,
            limiter_enabled: true,
            pre_drive_gain: ExpSmoother::new(),
            limiter_input_gain: ExpSmoother::new(),
            post_drive_gain: ExpSmoother::new(),
            overdrive: Default::default(),
            asym_drive: Default::default(),
            limiter: Default::default(),
            oversampler: Default::default(),
        }
    }
}

impl EasyOverdriveCore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn oversampling(&self) -> Oversampling {
        self.oversampling
    }

    fn update_up_rate(&mut self) {
        self.up_rate = self.sample_rate * self.oversampling.fold() as f64;
        self.smoother.set_sample_rate(self.up_rate);
    }

    fn apply(&mut self, mode: SmoothingMode, params: &ParameterStore) {
        self.smoother
            .set_time(params.raw(param::PARAMETER_SMOOTHING_SECOND));

        self.overdrive_type = OverDriveType::from_index(params.raw(param::OVER_DRIVE_TYPE) as usize);
        self.asym_drive_enabled = params.raw(param::ASYM_DRIVE_ENABLED) != 0.0;
        self.limiter_enabled = params.raw(param::LIMITER_ENABLED) != 0.0;

        self.pre_drive_gain
            .apply(mode, params.raw(param::PRE_DRIVE_GAIN));
        self.post_drive_gain
            .apply(mode, params.raw(param::POST_DRIVE_GAIN));
        self.limiter_input_gain
            .apply(mode, params.raw(param::LIMITER_INPUT_GAIN));

        let overdrive = BadLimiterParams {
            sample_rate: self.up_rate,
            hold_seconds: params.raw(param::OVER_DRIVE_HOLD_SECOND),
            q: params.raw(param::OVER_DRIVE_Q),
            character_amp: params.raw(param::OVER_DRIVE_CHARACTER_AMP),
        };
        for od in self.overdrive.iter_mut() {
            od.apply(mode, &overdrive);
        }

        let shape = AsymDriveShape::from_index(params.raw(param::ASYM_DRIVE_SHAPE) as usize);
        let asym = AsymDriveParams {
            sample_rate: self.up_rate,
            decay_seconds: params.raw(param::ASYM_DRIVE_DECAY_SECOND),
            decay_bias: params.raw(param::ASYM_DRIVE_DECAY_BIAS),
            q: params.raw(param::ASYM_DRIVE_Q),
            exponent_range: params.raw(param::ASYM_EXPONENT_RANGE),
        };
        for drive in self.asym_drive.iter_mut() {
            drive.set_shape(shape);
            drive.apply(mode, &asym);
        }

        let release = params.raw(param::LIMITER_RELEASE_SECOND);
        for limiter in self.limiter.iter_mut() {
            limiter.prepare(self.up_rate, LIMITER_ATTACK_SECONDS, release, 1.0);
        }
    }

    #[inline]
    fn process_frame(&mut self, frame: [f64; 2]) -> [f64; 2] {
        let kp = self.smoother.kp();
        let pre = self.pre_drive_gain.process(kp);
        let limiter_gain = self.limiter_input_gain.process(kp);
        let post = self.post_drive_gain.process(kp);

        let mut out = [0.0; 2];
        for ch in 0..2 {
            let mut sig = pre * frame[ch];
            sig = self.overdrive[ch].process(sig, self.overdrive_type, kp);
            if self.asym_drive_enabled {
                sig = self.asym_drive[ch].process(sig, kp);
            }
            if self.limiter_enabled {
                sig = self.limiter[ch].process(sig * limiter_gain);
            }
            out[ch] = post * sig;
        }
        out
    }
}

impl DspCore for EasyOverdriveCore {
    const NUM_INPUTS: usize = 2;
    const NUM_OUTPUTS: usize = 2;

    fn parameters() -> &'static [ParameterDescriptor] {
        &PARAMETERS
    }

    fn setup(&mut self, sample_rate: f64, params: &ParameterStore) -> Result<()> {
        self.sample_rate = validate_sample_rate(sample_rate)?;

        let max_rate = UP_FOLD as f64 * self.sample_rate;
        let max_hold = (max_rate * hold_second_scale().max()) as usize + 1;
        for od in self.overdrive.iter_mut() {
            od.resize(max_hold);
        }
        let max_attack = (max_rate * LIMITER_ATTACK_SECONDS) as usize + 1;
        for limiter in self.limiter.iter_mut() {
            limiter.resize(max_attack);
        }

        self.reset(params);
        Ok(())
    }

    fn reset(&mut self, params: &ParameterStore) {
        self.oversampling = Oversampling::from_index(params.raw(param::OVERSAMPLING) as usize);
        self.update_up_rate();

        self.apply(SmoothingMode::Reset, params);

        for limiter in self.limiter.iter_mut() {
            limiter.reset();
        }
        for os in self.oversampler.iter_mut() {
            os.reset();
        }
    }

    fn latency(&self) -> usize {
        let limiter = if self.limiter_enabled {
            self.limiter[0].latency(self.oversampling.fold())
        } else {
            0
        };
        UP_SAMPLER_LATENCY + limiter
    }

    fn set_parameters(&mut self, params: &ParameterStore) {
        let oversampling = Oversampling::from_index(params.raw(param::OVERSAMPLING) as usize);
        if oversampling != self.oversampling {
            log::debug!("oversampling {:?} -> {:?}", self.oversampling, oversampling);
            self.oversampling = oversampling;
            self.update_up_rate();
        }
        self.apply(SmoothingMode::Push, params);
    }

    fn process(
        &mut self,
        length: usize,
        inputs: &[&[f32]],
        outputs: &mut [&mut [f32]],
    ) -> Result<()> {
        check_buffers(length, inputs, outputs, Self::NUM_INPUTS, Self::NUM_OUTPUTS)?;

        let mid = UP_FOLD / 2;
        for i in 0..length {
            for (os, input) in self.oversampler.iter_mut().zip(inputs.iter()) {
                os.push(f64::from(input[i]));
            }

            let out = match self.oversampling {
                Oversampling::X16 => {
                    for j in 0..UP_FOLD {
                        let frame =
                            self.process_frame([self.oversampler[0].at(j), self.oversampler[1].at(j)]);
                        self.oversampler[0].input_buffer[j] = frame[0];
                        self.oversampler[1].input_buffer[j] = frame[1];
                    }
                    [self.oversampler[0].process(), self.oversampler[1].process()]
                }
                Oversampling::X2 => {
                    for (k, j) in [0, mid].into_iter().enumerate() {
                        let frame =
                            self.process_frame([self.oversampler[0].at(j), self.oversampler[1].at(j)]);
                        self.oversampler[0].input_buffer[k] = frame[0];
                        self.oversampler[1].input_buffer[k] = frame[1];
                    }
                    [
                        self.oversampler[0].process_2x(),
                        self.oversampler[1].process_2x(),
                    ]
                }
                Oversampling::X1 => {
                    self.process_frame([self.oversampler[0].at(0), self.oversampler[1].at(0)])
                }
            };

            outputs[0][i] = out[0] as f32;
            outputs[1][i] = out[1] as f32;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;
    use rand_chacha::ChaCha8Rng;

    fn prepared(params: &ParameterStore) -> EasyOverdriveCore {
        let mut core = EasyOverdriveCore::new();
        core.setup(48000.0, params).unwrap();
        core
    }

    #[test]
    fn test_defaults() {
        let params = ParameterStore::new(EasyOverdriveCore::parameters());
        assert_eq!(params.len(), 17);
        assert_eq!(params.raw(param::OVERSAMPLING), 1.0);
        assert_eq!(params.raw(param::LIMITER_ENABLED), 1.0);
        assert_eq!(params.raw(param::LIMITER_RELEASE_SECOND), 0.0);
        assert!((params.raw(param::OVER_DRIVE_HOLD_SECOND) - 0.001).abs() < 1e-9);
        assert!((params.raw(param::POST_DRIVE_GAIN) - 0.501187).abs() < 1e-6);
    }

    #[test]
    fn test_latency_per_configuration() {
        let params = ParameterStore::new(EasyOverdriveCore::parameters());
        let mut core = prepared(&params);
        // 1 ms lookahead at the base rate.
        assert_eq!(core.latency(), 2 + 48);

        params.set_raw(param::LIMITER_ENABLED, 0.0);
        core.set_parameters(&params);
        assert_eq!(core.latency(), 2);

        for index in 0..3 {
            params.set_raw(param::LIMITER_ENABLED, 1.0);
            params.set_raw(param::OVERSAMPLING, index as f64);
            core.set_parameters(&params);
            assert_eq!(core.oversampling(), Oversampling::from_index(index));
            assert_eq!(core.latency(), 2 + 48);
        }
    }

    #[test]
    fn test_oversampling_folds() {
        assert_eq!(Oversampling::X1.fold(), 1);
        assert_eq!(Oversampling::X2.fold(), 2);
        assert_eq!(Oversampling::X16.fold(), 16);
        assert_eq!(Oversampling::from_index(9), Oversampling::X16);
    }

    #[test]
    fn test_silence_in_silence_out() {
        let params = ParameterStore::new(EasyOverdriveCore::parameters());
        for oversampling in 0..3 {
            params.set_raw(param::OVERSAMPLING, oversampling as f64);
            let mut core = prepared(&params);
            let zeros = vec![0.0f32; 256];
            let mut l = vec![1.0f32; 256];
            let mut r = vec![1.0f32; 256];
            core.process(256, &[&zeros, &zeros], &mut [&mut l, &mut r])
                .unwrap();
            assert!(l.iter().chain(r.iter()).all(|&y| y == 0.0));
        }
    }

    #[test]
    fn test_limited_output_for_loud_random_input() {
        let params = ParameterStore::new(EasyOverdriveCore::parameters());
        params.set_raw(param::PRE_DRIVE_GAIN, 100.0);
        params.set_raw(param::POST_DRIVE_GAIN, 1.0);
        params.set_raw(param::ASYM_DRIVE_ENABLED, 1.0);

        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for kind in 0..8 {
            params.set_raw(param::OVER_DRIVE_TYPE, kind as f64);
            let mut core = prepared(&params);
            let input: Vec<f32> = (0..2048).map(|_| rng.random::<f32>() * 2.0 - 1.0).collect();
            let mut l = vec![0.0f32; 2048];
            let mut r = vec![0.0f32; 2048];
            core.process(2048, &[&input, &input], &mut [&mut l, &mut r])
                .unwrap();
            for &y in l.iter().chain(r.iter()) {
                assert!(y.is_finite());
                // Down-sampling ringing can overshoot the limiter.
                assert!(y.abs() < 2.0, "type {kind}: {y}");
            }
        }
    }
}
