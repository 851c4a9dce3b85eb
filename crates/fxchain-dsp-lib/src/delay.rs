// SPDX-License-Identifier: LGPL-3.0-or-later

//! Ring-buffer delay lines.
//!
//! - [`Delay`]: fractional delay with linear interpolation, buffer sized
//!   once by [`Delay::resize`]
//! - [`FixedIntDelay`]: integer delay of a length fixed at construction,
//!   generic over the sample type so it can carry complex values
//!
//! Indices wrap with explicit modulo arithmetic.

/// Fractional delay line with linear interpolation.
///
/// # Examples
/// ```
/// use fxchain_dsp_lib::delay::Delay;
///
/// let mut delay = Delay::new();
/// delay.resize(16);
/// let out: Vec<f64> = (0..5).map(|n| delay.process(n as f64, 2.0)).collect();
/// assert_eq!(out, vec![0.0, 0.0, 0.0, 1.0, 2.0]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Delay {
    buf: Vec<f64>,
    wptr: usize,
}

impl Delay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate room for delays up to `max_delay_samples` and clear.
    ///
    /// The buffer holds at least 4 samples.
    pub fn resize(&mut self, max_delay_samples: usize) {
        let len = if max_delay_samples < 4 {
            4
        } else {
            max_delay_samples + 1
        };
        self.buf.clear();
        self.buf.resize(len, 0.0);
        self.wptr = 0;
    }

    /// Zero the buffer without reallocating.
    pub fn reset(&mut self) {
        self.buf.fill(0.0);
        self.wptr = 0;
    }

    /// Largest delay in samples that [`read_fractional`](Self::read_fractional)
    /// accepts without clamping.
    pub fn max_delay(&self) -> f64 {
        self.buf.len().saturating_sub(1) as f64
    }

    /// Store one sample and advance the write position.
    #[inline]
    pub fn write(&mut self, sample: f64) {
        if self.buf.is_empty() {
            return;
        }
        self.buf[self.wptr] = sample;
        self.wptr = (self.wptr + 1) % self.buf.len();
    }

    /// Read `offset` samples behind the last written sample.
    ///
    /// `offset` is clamped to `[0, capacity - 1]`. Offset 0 returns the
    /// most recent sample.
    #[inline]
    pub fn read_fractional(&self, offset: f64) -> f64 {
        let len = self.buf.len();
        if len == 0 {
            return 0.0;
        }
        let clamped = offset.clamp(0.0, (len - 1) as f64);
        let time_int = clamped as usize;
        let fraction = clamped - time_int as f64;

        let newest = (self.wptr + len - 1) % len;
        let rptr0 = (newest + len - time_int) % len;
        let rptr1 = (rptr0 + len - 1) % len;
        self.buf[rptr0] + fraction * (self.buf[rptr1] - self.buf[rptr0])
    }

    /// Write `input`, then read it back delayed by `time_in_samples`.
    #[inline]
    pub fn process(&mut self, input: f64, time_in_samples: f64) -> f64 {
        self.write(input);
        self.read_fractional(time_in_samples)
    }
}

/// Integer delay of exactly `length` samples.
#[derive(Debug, Clone)]
pub struct FixedIntDelay<T> {
    buf: Vec<T>,
    ptr: usize,
}

impl<T: Copy + Default> FixedIntDelay<T> {
    /// `length` of 0 is treated as 1.
    pub fn new(length: usize) -> Self {
        Self {
            buf: vec![T::default(); length.max(1)],
            ptr: 0,
        }
    }

    pub fn reset(&mut self) {
        self.ptr = 0;
        self.buf.fill(T::default());
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub fn process(&mut self, x0: T) -> T {
        self.ptr += 1;
        if self.ptr >= self.buf.len() {
            self.ptr = 0;
        }
        let output = self.buf[self.ptr];
        self.buf[self.ptr] = x0;
        output
    }
}
