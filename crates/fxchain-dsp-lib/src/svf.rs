// SPDX-License-Identifier: LGPL-3.0-or-later

//! Trapezoidal-integrated state-variable filter.
//!
//! [`Svf`] takes its coefficients per call, for callers that compute them
//! on the fly. [`SvfLowpass`] owns smoothed coefficients and is the
//! envelope smoother used by the overdrive and asymmetric drive stages.

use std::f64::consts::PI;

use crate::smoother::{ExpSmoother, SmoothingMode};

/// Lowest normalized cutoff accepted by [`freq_to_g`].
pub const MIN_CUTOFF: f64 = 0.00001;
/// Highest normalized cutoff accepted by [`freq_to_g`].
pub const NYQUIST: f64 = 0.49998;

/// Prewarped integrator gain `g = tan(π f)` for a normalized frequency.
///
/// `f` is clamped to `[MIN_CUTOFF, NYQUIST]`.
#[inline]
pub fn freq_to_g(normalized_freq: f64) -> f64 {
    (normalized_freq.clamp(MIN_CUTOFF, NYQUIST) * PI).tan()
}

/// Damping `k = 1/Q`, with `Q` floored at machine epsilon.
#[inline]
pub fn q_to_k(q: f64) -> f64 {
    1.0 / q.max(f64::EPSILON)
}

/// `(g, d)` for a lowpass whose time constant is `seconds`.
///
/// `d = 1 / (1 + g² + g/Q)` is the precomputed denominator of the SVF
/// update. Cutoff is capped at a quarter of the sample rate.
pub fn second_to_svf_parameters(sample_rate: f64, seconds: f64, q: f64) -> (f64, f64) {
    let g = freq_to_g(1.0 / (sample_rate * seconds).max(4.0));
    let d = 1.0 / (1.0 + g * g + g / q.max(f64::EPSILON));
    (g, d)
}

/// Two-integrator state-variable filter.
#[derive(Debug, Clone, Copy, Default)]
pub struct Svf {
    ic1eq: f64,
    ic2eq: f64,
}

impl Svf {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }

    /// One step with a precomputed denominator `d`. Returns `(band, low)`.
    #[inline]
    pub fn step(&mut self, v0: f64, g: f64, d: f64) -> (f64, f64) {
        let v1 = (self.ic1eq + g * (v0 - self.ic2eq)) * d;
        let v2 = self.ic2eq + g * v1;
        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;
        (v1, v2)
    }

    #[inline]
    pub fn lowpass(&mut self, v0: f64, g: f64, k: f64) -> f64 {
        self.step(v0, g, 1.0 / (1.0 + g * (g + k))).1
    }

    #[inline]
    pub fn highpass(&mut self, v0: f64, g: f64, k: f64) -> f64 {
        let (v1, v2) = self.step(v0, g, 1.0 / (1.0 + g * (g + k)));
        v0 - k * v1 - v2
    }
}

/// Lowpass SVF with per-sample smoothed coefficients.
///
/// The cutoff is given as a time constant in seconds, matching how the
/// envelope followers are parameterized.
///
/// # Examples
/// ```
/// use fxchain_dsp_lib::smoother::SmoothingMode;
/// use fxchain_dsp_lib::svf::SvfLowpass;
///
/// let mut lp = SvfLowpass::default();
/// lp.apply(SmoothingMode::Reset, 48000.0, 0.01, std::f64::consts::FRAC_1_SQRT_2);
/// let mut y = 0.0;
/// for _ in 0..48000 {
///     y = lp.process(1.0, 1.0);
/// }
/// assert!((y - 1.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SvfLowpass {
    svf: Svf,
    g: ExpSmoother,
    d: ExpSmoother,
    k: ExpSmoother,
}

impl SvfLowpass {
    /// Set cutoff time and Q. [`SmoothingMode::Reset`] also clears the
    /// filter state.
    pub fn apply(&mut self, mode: SmoothingMode, sample_rate: f64, seconds: f64, q: f64) {
        if mode == SmoothingMode::Reset {
            self.svf.reset();
        }
        let (g, d) = second_to_svf_parameters(sample_rate, seconds, q);
        self.g.apply(mode, g);
        self.d.apply(mode, d);
        self.k.apply(mode, q_to_k(q));
    }

    pub fn reset(&mut self, sample_rate: f64, seconds: f64, q: f64) {
        self.apply(SmoothingMode::Reset, sample_rate, seconds, q);
    }

    pub fn push(&mut self, sample_rate: f64, seconds: f64, q: f64) {
        self.apply(SmoothingMode::Push, sample_rate, seconds, q);
    }

    /// Lowpass output for `v0`, advancing the coefficient smoothers by `kp`.
    #[inline]
    pub fn process(&mut self, v0: f64, kp: f64) -> f64 {
        let g = self.g.process(kp);
        let d = self.d.process(kp);
        self.k.process(kp);
        self.svf.step(v0, g, d).1
    }

    /// Lowpass with the cutoff scaled by `2^g_mod` and damping scaled by
    /// `reso_mod`.
    ///
    /// `g_mod` is capped at 16 octaves and the resulting `g` at 3000, which
    /// keeps the update finite for arbitrarily loud modulators.
    #[inline]
    pub fn process_mod(&mut self, v0: f64, g_mod: f64, reso_mod: f64, kp: f64) -> f64 {
        let g = (self.g.process(kp) * g_mod.min(16.0).exp2()).clamp(0.0, 3000.0);
        self.d.process(kp);
        let k = reso_mod * self.k.process(kp);
        self.svf.step(v0, g, 1.0 / (1.0 + g * g + g * k)).1
    }
}
