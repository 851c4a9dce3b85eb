// SPDX-License-Identifier: LGPL-3.0-or-later

//! Stereo spectral tilt built on [`SlopeFilter`] with twelve shelves per
//! channel.

use fxchain_dsp_lib::scale::Scale;
use fxchain_dsp_lib::smoother::SmoothingMode;
use fxchain_dsp_units::filters::slope::{SlopeFilter, SlopeFilterParams};
use once_cell::sync::Lazy;

use crate::base::{DspCore, validate_sample_rate};
use crate::error::{Result, check_buffers};
use crate::params::{ParameterDescriptor, ParameterStore};

const STAGES: usize = 12;

/// Parameter indices into [`SlopeFilterCore::parameters`].
pub mod param {
    pub const SHELVING_TYPE: usize = 0;
    pub const START_HZ: usize = 1;
    pub const SLOPE_DECIBEL: usize = 2;
    pub const OUTPUT_GAIN: usize = 3;
}

static PARAMETERS: Lazy<Vec<ParameterDescriptor>> = Lazy::new(|| {
    vec![
        // 0 is low shelf, 1 is high shelf.
        ParameterDescriptor::with_raw_default("shelvingType", Scale::BOOLEAN, 1.0),
        ParameterDescriptor::new("startHz", Scale::decibel(20.0, 86.84845361644413, false), 0.0),
        ParameterDescriptor::with_raw_default("slopeDecibel", Scale::linear(-20.0, 20.0), 0.0),
        ParameterDescriptor::with_db_default("outputGain", Scale::decibel(-60.0, 60.0, true), 0.0),
    ]
});

#[derive(Debug, Clone)]
pub struct SlopeFilterCore {
    sample_rate: f64,
    filters: [SlopeFilter<STAGES>; 2],
}

impl Default for SlopeFilterCore {
    fn default() -> Self {
        Self {
            sample_rate: 44100.0,
            filters: [SlopeFilter::new(), SlopeFilter::new()],
        }
    }
}

impl SlopeFilterCore {
    pub fn new() -> Self {
        Self::default()
    }

    fn filter_params(&self, params: &ParameterStore) -> SlopeFilterParams {
        SlopeFilterParams {
            sample_rate: self.sample_rate,
            start_hz: params.raw(param::START_HZ),
            slope_db: params.raw(param::SLOPE_DECIBEL),
            output_gain: params.raw(param::OUTPUT_GAIN),
            highshelf: params.raw(param::SHELVING_TYPE) != 0.0,
        }
    }

    fn apply(&mut self, mode: SmoothingMode, params: &ParameterStore) {
        let p = self.filter_params(params);
        for filter in self.filters.iter_mut() {
            filter.apply(mode, &p);
        }
    }
}

impl DspCore for SlopeFilterCore {
    const NUM_INPUTS: usize = 2;
    const NUM_OUTPUTS: usize = 2;

    fn parameters() -> &'static [ParameterDescriptor] {
        &PARAMETERS
    }

    fn setup(&mut self, sample_rate: f64, params: &ParameterStore) -> Result<()> {
        self.sample_rate = validate_sample_rate(sample_rate)?;
        self.reset(params);
        Ok(())
    }

    fn reset(&mut self, params: &ParameterStore) {
        self.apply(SmoothingMode::Reset, params);
    }

    fn latency(&self) -> usize {
        0
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

        for ((filter, input), output) in self
            .filters
            .iter_mut()
            .zip(inputs.iter())
            .zip(outputs.iter_mut())
        {
            for (x, y) in input[..length].iter().zip(output[..length].iter_mut()) {
                *y = filter.process(f64::from(*x)) as f32;
            }
        }
        Ok(())
    }
}
