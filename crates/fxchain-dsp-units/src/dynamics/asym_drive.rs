// SPDX-License-Identifier: LGPL-3.0-or-later

//! Asymmetric drive: gain that depends on the recent direction of the
//! signal.
//!
//! Rising and falling slopes go into separate accumulators. Each one
//! decays while the signal moves the other way, with the falling side
//! decaying `bias` times faster (in the exponent). The lowpassed sum of
//! both accumulators, scaled by the exponent range and clamped to
//! `[-range, range]`, sets the gain.

use fxchain_dsp_lib::float::lerp;
use fxchain_dsp_lib::smoother::{ExpSmoother, SmoothingMode};
use fxchain_dsp_lib::svf::SvfLowpass;

/// How the control value `t` in `[-range, range]` turns into output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AsymDriveShape {
    /// `x * 2^t`.
    #[default]
    Exponential,
    /// Crossfade from `x²` at `t = -range` to `sqrt|x|` at `t = range`,
    /// keeping the sign of `x`.
    Blend,
}

impl AsymDriveShape {
    pub fn from_index(index: usize) -> Self {
        match index {
            1 => AsymDriveShape::Blend,
            _ => AsymDriveShape::Exponential,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AsymDriveParams {
    pub sample_rate: f64,
    pub decay_seconds: f64,
    pub decay_bias: f64,
    pub q: f64,
    pub exponent_range: f64,
}

impl AsymDriveParams {
    /// Per-sample decay multipliers `(positive, negative)`.
    fn decay_multipliers(&self) -> (f64, f64) {
        let inv_frames = 1.0 / (self.sample_rate * self.decay_seconds).max(2.0);
        (
            f64::EPSILON.powf(inv_frames),
            f64::EPSILON.powf(inv_frames * self.decay_bias),
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct AsymmetricDrive {
    x1: f64,
    acc_p: f64,
    acc_n: f64,
    decay_p: ExpSmoother,
    decay_n: ExpSmoother,
    exponent_range: ExpSmoother,
    svf: SvfLowpass,
    shape: AsymDriveShape,
}

impl AsymmetricDrive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_shape(&mut self, shape: AsymDriveShape) {
        self.shape = shape;
    }

    pub fn shape(&self) -> AsymDriveShape {
        self.shape
    }

    pub fn apply(&mut self, mode: SmoothingMode, params: &AsymDriveParams) {
        if mode == SmoothingMode::Reset {
            self.x1 = 0.0;
            self.acc_p = 0.0;
            self.acc_n = 0.0;
        }
        let (decay_p, decay_n) = params.decay_multipliers();
        self.decay_p.apply(mode, decay_p);
        self.decay_n.apply(mode, decay_n);
        self.exponent_range.apply(mode, params.exponent_range);
        self.svf
            .apply(mode, params.sample_rate, params.decay_seconds, params.q);
    }

    pub fn reset(&mut self, params: &AsymDriveParams) {
        self.apply(SmoothingMode::Reset, params);
    }

    pub fn push(&mut self, params: &AsymDriveParams) {
        self.apply(SmoothingMode::Push, params);
    }

    #[inline]
    pub fn process(&mut self, x0: f64, kp: f64) -> f64 {
        let d0 = x0 - self.x1;
        self.x1 = x0;

        let decay_p = self.decay_p.process(kp);
        let decay_n = self.decay_n.process(kp);
        if d0 > 0.0 {
            self.acc_p += d0;
            self.acc_n *= decay_n;
        } else {
            self.acc_n += d0;
            self.acc_p *= decay_p;
        }

        let range = self.exponent_range.process(kp);
        let t = (self.svf.process(self.acc_p + self.acc_n, kp) * range).clamp(-range, range);

        match self.shape {
            AsymDriveShape::Exponential => x0 * t.exp2(),
            AsymDriveShape::Blend => {
                let w = if range > 0.0 { 0.5 * (t / range + 1.0) } else { 0.5 };
                lerp(x0 * x0, x0.abs().sqrt(), w).copysign(x0)
            }
        }
    }
}
