// SPDX-License-Identifier: LGPL-3.0-or-later

//! Up-samplers, decimation filters and the 16x oversampling round trip.
//!
//! Up-samplers turn one input sample into a frame of `UP` samples in
//! [`UpSampler::output`]. Coming back down from 16x takes two steps:
//! [`DecimationLowpass`] runs at the 16x rate, and its output is picked
//! at offsets 0 and 8 and handed to a [`HalfBandIir`].
//!
//! | Up-sampler | Method | Latency (base samples) |
//! |---|---|---|
//! | [`FirUpSampler`] | 16-phase windowed sinc | 16 |
//! | [`CubicUpSampler`] | 4-point Lagrange | 2 |
//! | [`LinearUpSampler`] | straight line | 1 |
//!
//! # Examples
//! ```
//! use fxchain_dsp_lib::multirate::{CubicUpSampler, OverSampler16};
//!
//! let mut os = OverSampler16::<CubicUpSampler<16>>::new();
//! let mut y = 0.0;
//! for _ in 0..4096 {
//!     os.push(1.0);
//!     for i in 0..16 {
//!         os.input_buffer[i] = os.at(i) * 0.5;
//!     }
//!     y = os.process();
//! }
//! assert!((y - 0.5).abs() < 1e-6);
//! ```

use crate::allpass::HalfBandIir;
use crate::coeffs::{FIR_UP_16, SOS_DECIMATION_16};
use crate::interpolation::cubic_interp;

const DECIMATION_SECTIONS: usize = SOS_DECIMATION_16.len();

/// Anything that expands one sample into `UP` samples.
pub trait UpSampler<const UP: usize>: Default {
    /// Delay in base-rate samples between input and the frame it lands in.
    const LATENCY: usize;

    fn reset(&mut self);

    fn process(&mut self, input: f64);

    /// The frame produced by the last [`process`](Self::process) call,
    /// earliest sample first.
    fn output(&self) -> &[f64; UP];

    /// Mutable access so a caller can process the frame in place.
    fn output_mut(&mut self) -> &mut [f64; UP];
}

// ─── Decimation ────────────────────────────────────────────────────────────

/// Pipelined biquad cascade used before dropping from 16x.
///
/// Each section reads the previous section's output from one sample
/// earlier, so all sections can be evaluated independently.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecimationLowpass {
    x0: [f64; DECIMATION_SECTIONS],
    x1: [f64; DECIMATION_SECTIONS],
    x2: [f64; DECIMATION_SECTIONS],
    y0: [f64; DECIMATION_SECTIONS],
    y1: [f64; DECIMATION_SECTIONS],
    y2: [f64; DECIMATION_SECTIONS],
}

impl DecimationLowpass {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[inline]
    pub fn push(&mut self, input: f64) {
        self.x0[0] = input;
        self.x0[1..].copy_from_slice(&self.y0[..DECIMATION_SECTIONS - 1]);

        for (i, &[b0, b1, b2, a1, a2]) in SOS_DECIMATION_16.iter().enumerate() {
            self.y0[i] = b0 * self.x0[i] + b1 * self.x1[i] + b2 * self.x2[i]
                - a1 * self.y1[i]
                - a2 * self.y2[i];
        }

        self.x2 = self.x1;
        self.x1 = self.x0;
        self.y2 = self.y1;
        self.y1 = self.y0;
    }

    #[inline]
    pub fn output(&self) -> f64 {
        self.y0[DECIMATION_SECTIONS - 1]
    }
}

/// 16 to 1 down-sampler: decimation lowpass followed by a half-band stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct DownSampler {
    /// Frame at the 16x rate, earliest sample first.
    pub input_buffer: [f64; 16],
    lowpass: DecimationLowpass,
    halfband: HalfBandIir,
}

impl DownSampler {
    pub const FOLD: usize = 16;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.input_buffer.fill(0.0);
        self.lowpass.reset();
        self.halfband.reset();
    }

    /// Reduce `input_buffer` to one base-rate sample.
    #[inline]
    pub fn process(&mut self) -> f64 {
        let half = Self::FOLD / 2;
        let mut picked = [0.0; 2];
        for (i, &x) in self.input_buffer.iter().enumerate() {
            self.lowpass.push(x);
            if i % half == 0 {
                picked[i / half] = self.lowpass.output();
            }
        }
        self.halfband.process(picked)
    }

    /// Reduce the first two entries of `input_buffer`, treated as a 2x
    /// frame, to one base-rate sample.
    #[inline]
    pub fn process_2x(&mut self) -> f64 {
        self.halfband
            .process([self.input_buffer[0], self.input_buffer[1]])
    }
}

// ─── Up-samplers ───────────────────────────────────────────────────────────

/// 16x polyphase FIR interpolator.
#[derive(Debug, Clone, Copy)]
pub struct FirUpSampler {
    buf: [f64; 32],
    output: [f64; 16],
}

impl Default for FirUpSampler {
    fn default() -> Self {
        Self {
            buf: [0.0; 32],
            output: [0.0; 16],
        }
    }
}

impl FirUpSampler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UpSampler<16> for FirUpSampler {
    const LATENCY: usize = 16;

    fn reset(&mut self) {
        self.buf.fill(0.0);
        self.output.fill(0.0);
    }

    #[inline]
    fn process(&mut self, input: f64) {
        self.buf.rotate_right(1);
        self.buf[0] = input;
        for (out, phase) in self.output.iter_mut().zip(FIR_UP_16.iter()) {
            *out = phase.iter().zip(self.buf.iter()).map(|(h, x)| h * x).sum();
        }
    }

    fn output(&self) -> &[f64; 16] {
        &self.output
    }

    fn output_mut(&mut self) -> &mut [f64; 16] {
        &mut self.output
    }
}

/// Cubic Lagrange interpolator. Sample `i` of the frame sits at `i / UP`
/// between the second and third newest inputs.
#[derive(Debug, Clone, Copy)]
pub struct CubicUpSampler<const UP: usize> {
    buf: [f64; 4],
    output: [f64; UP],
}

impl<const UP: usize> Default for CubicUpSampler<UP> {
    fn default() -> Self {
        Self {
            buf: [0.0; 4],
            output: [0.0; UP],
        }
    }
}

impl<const UP: usize> CubicUpSampler<UP> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<const UP: usize> UpSampler<UP> for CubicUpSampler<UP> {
    const LATENCY: usize = 2;

    fn reset(&mut self) {
        self.buf.fill(0.0);
        self.output.fill(0.0);
    }

    #[inline]
    fn process(&mut self, input: f64) {
        self.buf.rotate_left(1);
        self.buf[3] = input;
        self.output[0] = self.buf[1];
        for i in 1..UP {
            self.output[i] = cubic_interp(&self.buf, i as f64 / UP as f64);
        }
    }

    fn output(&self) -> &[f64; UP] {
        &self.output
    }

    fn output_mut(&mut self) -> &mut [f64; UP] {
        &mut self.output
    }
}

/// Linear interpolator between the previous and current input.
#[derive(Debug, Clone, Copy)]
pub struct LinearUpSampler<const UP: usize> {
    previous: f64,
    output: [f64; UP],
}

impl<const UP: usize> Default for LinearUpSampler<UP> {
    fn default() -> Self {
        Self {
            previous: 0.0,
            output: [0.0; UP],
        }
    }
}

impl<const UP: usize> LinearUpSampler<UP> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<const UP: usize> UpSampler<UP> for LinearUpSampler<UP> {
    const LATENCY: usize = 1;

    fn reset(&mut self) {
        self.previous = 0.0;
        self.output.fill(0.0);
    }

    #[inline]
    fn process(&mut self, input: f64) {
        let diff = input - self.previous;
        for (i, out) in self.output.iter_mut().enumerate() {
            *out = self.previous + diff * i as f64 / UP as f64;
        }
        self.previous = input;
    }

    fn output(&self) -> &[f64; UP] {
        &self.output
    }

    fn output_mut(&mut self) -> &mut [f64; UP] {
        &mut self.output
    }
}

// ─── Round trip ────────────────────────────────────────────────────────────

/// 16x oversampling wrapper: call [`push`](Self::push), fill
/// [`input_buffer`](Self::input_buffer) from [`at`](Self::at), then
/// [`process`](Self::process).
#[derive(Debug, Clone, Copy, Default)]
pub struct OverSampler16<U: UpSampler<16>> {
    up: U,
    /// Processed 16x frame to be reduced by [`process`](Self::process).
    pub input_buffer: [f64; 16],
    down: DownSampler,
}

impl<U: UpSampler<16>> OverSampler16<U> {
    pub const FOLD: usize = 16;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.up.reset();
        self.input_buffer.fill(0.0);
        self.down.reset();
    }

    pub fn latency(&self) -> usize {
        U::LATENCY
    }

    #[inline]
    pub fn push(&mut self, x0: f64) {
        self.up.process(x0);
    }

    /// Up-sampled sample `index` of the last pushed input.
    #[inline]
    pub fn at(&self, index: usize) -> f64 {
        self.up.output()[index]
    }

    #[inline]
    pub fn process(&mut self) -> f64 {
        self.down.input_buffer = self.input_buffer;
        self.down.process()
    }

    /// 2x path: `input_buffer[0]` and `input_buffer[1]` hold the processed
    /// frames taken from `at(0)` and `at(8)`.
    #[inline]
    pub fn process_2x(&mut self) -> f64 {
        self.down.input_buffer = self.input_buffer;
        self.down.process_2x()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn test_cubic_up_sampler_latency() {
        let mut up = CubicUpSampler::<16>::new();
        let firsts: Vec<f64> = (0..4)
            .map(|n| {
                up.process(if n == 0 { 1.0 } else { 0.0 });
                up.output()[0]
            })
            .collect();
        assert_eq!(firsts, vec![0.0, 0.0, 1.0, 0.0]);
        assert_eq!(CubicUpSampler::<16>::LATENCY, 2);
    }

    #[test]
    fn test_cubic_up_sampler_follows_ramp() {
        let mut up = CubicUpSampler::<4>::new();
        for n in 0..8 {
            up.process(n as f64);
        }
        // Newest input 7, frame spans 5..6.
        for (i, &y) in up.output().iter().enumerate() {
            assert_approx_eq!(f64, y, 5.0 + i as f64 / 4.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_linear_up_sampler_interpolates() {
        let mut up = LinearUpSampler::<4>::new();
        up.process(4.0);
        assert_eq!(up.output(), &[0.0, 1.0, 2.0, 3.0]);
        up.process(0.0);
        assert_eq!(up.output(), &[4.0, 3.0, 2.0, 1.0]);
        up.reset();
        up.process(0.0);
        assert_eq!(up.output(), &[0.0; 4]);
    }

    #[test]
    fn test_fir_up_sampler_passes_dc() {
        let mut up = FirUpSampler::new();
        for _ in 0..64 {
            up.process(1.0);
        }
        for &y in up.output() {
            assert_approx_eq!(f64, y, 1.0, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_decimation_lowpass_passes_dc() {
        let mut lp = DecimationLowpass::new();
        for _ in 0..4096 {
            lp.push(1.0);
        }
        assert_approx_eq!(f64, lp.output(), 1.0, epsilon = 1e-9);
        lp.reset();
        assert_eq!(lp.output(), 0.0);
    }

    #[test]
    fn test_down_sampler_2x_uses_first_pair() {
        let mut a = DownSampler::new();
        let mut b = HalfBandIir::new();
        for n in 0..32 {
            a.input_buffer[0] = n as f64;
            a.input_buffer[1] = -(n as f64);
            a.input_buffer[2] = 100.0;
            assert_eq!(a.process_2x(), b.process([n as f64, -(n as f64)]));
        }
    }

    #[test]
    fn test_over_sampler_reports_up_sampler_latency() {
        assert_eq!(OverSampler16::<FirUpSampler>::new().latency(), 16);
        assert_eq!(OverSampler16::<LinearUpSampler<16>>::new().latency(), 1);
    }
}
