// SPDX-License-Identifier: LGPL-3.0-or-later

//! # fxchain-dsp-lib
//!
//! Low-level, sample-synchronous DSP primitives shared by the fxchain
//! effect family.
//!
//! Every processor in this crate works one sample at a time and keeps its
//! own state. Nothing allocates after construction or `resize`. It includes:
//!
//! - **Scales**: normalized ↔ raw parameter mapping (linear, integer, decibel, ...)
//! - **Smoothers**: exponential parameter smoothing with a shared per-core coefficient
//! - **Filters**: biquad cascades over fixed tables, state-variable filters,
//!   first-order allpass cascades and the two-path half-band IIR
//! - **Hilbert**: analytic signal filter and single-sideband frequency shifter
//! - **Delays**: fractional and fixed integer ring-buffer delays
//! - **Multirate**: 16x polyphase FIR / cubic / linear up-samplers and the
//!   decimation chain bringing 16x back to the base rate
//! - **Float utilities**: denormal flushing and FTZ/DAZ processing context
//!
//! ## Design
//!
//! Internal arithmetic is `f64`. The shipped coefficient tables place poles
//! within a few thousandths of the unit circle, where single precision loses
//! the stopband.

pub mod allpass;
pub mod coeffs;
pub mod context;
pub mod delay;
pub mod float;
pub mod hilbert;
pub mod interpolation;
pub mod multirate;
pub mod scale;
pub mod smoother;
pub mod sos;
pub mod svf;
