// SPDX-License-Identifier: LGPL-3.0-or-later

//! Per-sample parameter smoothing.
//!
//! Parameters arrive once per block. Applying them as steps produces
//! zipper noise, so every continuous parameter goes through an
//! [`ExpSmoother`] that moves toward its target by a fixed fraction per
//! sample. The fraction (`kp`) depends only on the sample rate and the
//! smoothing time, and is owned by a [`SmootherCommon`] kept by each core.
//!
//! # Examples
//! ```
//! use fxchain_dsp_lib::smoother::{ExpSmoother, SmootherCommon, SmoothingMode};
//!
//! let mut common = SmootherCommon::new();
//! common.set_sample_rate(48000.0);
//! common.set_time(0.1);
//!
//! let mut gain = ExpSmoother::new();
//! gain.apply(SmoothingMode::Reset, 0.0);
//! gain.apply(SmoothingMode::Push, 1.0);
//! let first = gain.process(common.kp());
//! assert!(first > 0.0 && first < 1.0);
//! ```

use std::f64::consts::TAU;

/// How a new parameter value reaches a smoother.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmoothingMode {
    /// Snap current value and target to the new value.
    Reset,
    /// Move only the target; the current value follows over time.
    Push,
}

// ─── One-pole filter ───────────────────────────────────────────────────────

/// Exponential moving average (one-pole lowpass).
#[derive(Debug, Clone, Copy)]
pub struct EmaFilter {
    /// Coefficient in `[0, 1]`. 1 passes the input through.
    pub kp: f64,
    pub value: f64,
}

impl Default for EmaFilter {
    fn default() -> Self {
        Self { kp: 1.0, value: 0.0 }
    }
}

impl EmaFilter {
    /// Coefficient for a one-pole lowpass with -3 dB point at `cutoff_hz`.
    pub fn cutoff_to_p(sample_rate: f64, cutoff_hz: f64) -> f64 {
        let omega_c = TAU * cutoff_hz / sample_rate;
        let y = 1.0 - omega_c.cos();
        -y + ((y + 2.0) * y).sqrt()
    }

    /// Coefficient for a time constant in seconds. Times shorter than
    /// machine epsilon give 1 (no smoothing).
    pub fn second_to_p(sample_rate: f64, seconds: f64) -> f64 {
        if seconds < f64::EPSILON {
            return 1.0;
        }
        Self::cutoff_to_p(sample_rate, 1.0 / seconds)
    }

    pub fn set_cutoff(&mut self, sample_rate: f64, cutoff_hz: f64) {
        self.kp = Self::cutoff_to_p(sample_rate, cutoff_hz);
    }

    pub fn set_p(&mut self, p: f64) {
        self.kp = p.clamp(0.0, 1.0);
    }

    pub fn reset(&mut self, value: f64) {
        self.value = value;
    }

    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        self.value += self.kp * (input - self.value);
        self.value
    }
}

// ─── Shared smoothing coefficient ──────────────────────────────────────────

/// Smoothing coefficient shared by all smoothers of one core.
///
/// The coefficient is recomputed whenever the sample rate or the
/// smoothing time changes.
#[derive(Debug, Clone)]
pub struct SmootherCommon {
    sample_rate: f64,
    time_in_samples: f64,
    kp: f64,
}

impl Default for SmootherCommon {
    fn default() -> Self {
        Self::new()
    }
}

impl SmootherCommon {
    /// Defaults: 44.1 kHz, 40 ms.
    pub fn new() -> Self {
        let mut common = Self {
            sample_rate: 44100.0,
            time_in_samples: 0.0,
            kp: 1.0,
        };
        common.set_time(0.04);
        common
    }

    /// Set the sample rate, keeping the current smoothing time.
    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        let seconds = self.time_in_samples / self.sample_rate;
        self.sample_rate = sample_rate;
        self.set_time(seconds);
    }

    /// Set the smoothing time in seconds.
    ///
    /// The cutoff `1 / seconds` is clamped to Nyquist. Zero time uses the
    /// Nyquist cutoff.
    pub fn set_time(&mut self, seconds: f64) {
        self.time_in_samples = seconds * self.sample_rate;
        let cutoff = if seconds > 0.0 {
            (1.0 / seconds).clamp(0.0, self.sample_rate / 2.0)
        } else {
            self.sample_rate / 2.0
        };
        self.kp = EmaFilter::cutoff_to_p(self.sample_rate, cutoff);
    }

    #[inline]
    pub fn kp(&self) -> f64 {
        self.kp
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn time_in_samples(&self) -> f64 {
        self.time_in_samples
    }
}

// ─── Exponential smoother ──────────────────────────────────────────────────

/// Exponential approach toward a target value.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpSmoother {
    value: f64,
    target: f64,
}

impl ExpSmoother {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snap to `value`.
    pub fn reset(&mut self, value: f64) {
        self.value = value;
        self.target = value;
    }

    /// Set a new target.
    pub fn push(&mut self, target: f64) {
        self.target = target;
    }

    /// Route a new value through [`reset`](Self::reset) or
    /// [`push`](Self::push).
    #[inline]
    pub fn apply(&mut self, mode: SmoothingMode, value: f64) {
        match mode {
            SmoothingMode::Reset => self.reset(value),
            SmoothingMode::Push => self.push(value),
        }
    }

    /// Advance one sample with coefficient `kp` and return the new value.
    #[inline]
    pub fn process(&mut self, kp: f64) -> f64 {
        self.value += kp * (self.target - self.value);
        self.value
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn target(&self) -> f64 {
        self.target
    }
}
