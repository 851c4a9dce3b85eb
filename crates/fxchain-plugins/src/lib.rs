// SPDX-License-Identifier: LGPL-3.0-or-later

//! Host-independent DSP cores for the fxchain effect family.
//!
//! Each core implements [`DspCore`] and publishes a static parameter
//! table. A host adapter wraps a core in a [`SharedProcessor`], writes
//! parameters into its [`ParameterStore`](params::ParameterStore) and
//! calls `process_block` from the audio thread.
//!
//! | Core | Inputs | Outputs | Latency |
//! |------|--------|---------|---------|
//! | [`AmplitudeModulatorCore`](amplitude_modulator::AmplitudeModulatorCore) | carrier L/R, modulator L/R | 2 | 0 |
//! | [`EasyOverdriveCore`](easy_overdrive::EasyOverdriveCore) | 2 | 2 | 2 + limiter lookahead |
//! | [`SlopeFilterCore`](slope_filter::SlopeFilterCore) | 2 | 2 | 0 |
//! | [`TwoBandStereoCore`](two_band_stereo::TwoBandStereoCore) | 2 | 2 | 257 |
//!
//! Enable the `serde` feature to serialize
//! [`ParameterSnapshot`](params::ParameterSnapshot)s.

pub mod amplitude_modulator;
pub mod base;
pub mod easy_overdrive;
pub mod error;
pub mod params;
pub mod slope_filter;
pub mod two_band_stereo;

pub use base::{DspCore, SharedProcessor};
pub use error::{Error, Result};
