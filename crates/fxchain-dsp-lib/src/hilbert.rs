// SPDX-License-Identifier: LGPL-3.0-or-later

//! Analytic signal (IIR Hilbert pair) and single-sideband frequency shift.
//!
//! [`AnalyticSignalFilter`] runs two cascades of second-order allpass
//! sections whose phase responses differ by 90° over most of the band.
//! The imaginary path is delayed by one sample to line up with the real
//! path. [`FrequencyShifter`] rotates the analytic signal by a running
//! phase and keeps the real part.

use std::f64::consts::TAU;

use num_complex::Complex64;

const CO_RE: [f64; 4] = [
    0.16175849836770106,
    0.7330289323414905,
    0.9453497003291133,
    0.9905991566845292,
];

const CO_IM: [f64; 4] = [
    0.47940086558884,
    0.8762184935393101,
    0.9765975895081993,
    0.9974992559355491,
];

/// Allpass cascade `y0 = co * (x0 + y2) - x2` per section.
#[derive(Debug, Clone, Copy, Default)]
struct AllpassPath {
    x1: [f64; 4],
    x2: [f64; 4],
    y1: [f64; 4],
    y2: [f64; 4],
}

impl AllpassPath {
    fn reset(&mut self) {
        *self = Self::default();
    }

    #[inline]
    fn process(&mut self, mut sig: f64, co: &[f64; 4]) -> f64 {
        for (i, &c) in co.iter().enumerate() {
            let y0 = c * (sig + self.y2[i]) - self.x2[i];
            self.x2[i] = self.x1[i];
            self.x1[i] = sig;
            self.y2[i] = self.y1[i];
            self.y1[i] = y0;
            sig = y0;
        }
        sig
    }
}

/// Real input to analytic signal.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyticSignalFilter {
    re: AllpassPath,
    im: AllpassPath,
    delayed_im: f64,
}

impl AnalyticSignalFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.re.reset();
        self.im.reset();
        self.delayed_im = 0.0;
    }

    #[inline]
    pub fn process(&mut self, input: f64) -> Complex64 {
        let re = self.re.process(input, &CO_RE);
        let im = self.im.process(input, &CO_IM);
        let out_im = self.delayed_im;
        self.delayed_im = im;
        Complex64::new(re, out_im)
    }
}

/// Shifts every component of the input up by a fixed normalized frequency.
///
/// # Examples
/// ```
/// use fxchain_dsp_lib::hilbert::FrequencyShifter;
///
/// let mut shifter = FrequencyShifter::new();
/// let y = shifter.process(1.0, 0.1);
/// assert!(y.is_finite());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct FrequencyShifter {
    hilbert: AnalyticSignalFilter,
    phase: f64,
}

impl FrequencyShifter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.hilbert.reset();
        self.phase = 0.0;
    }

    /// `shift` is a normalized frequency in `(-0.5, 0.5)`. Negative values
    /// shift down.
    #[inline]
    pub fn process(&mut self, input: f64, shift: f64) -> f64 {
        let sig = self.hilbert.process(input);
        let norm = sig.re.hypot(sig.im);
        let theta = sig.im.atan2(sig.re);
        self.phase += shift;
        self.phase -= self.phase.floor();
        norm * (theta + TAU * self.phase).cos()
    }
}
