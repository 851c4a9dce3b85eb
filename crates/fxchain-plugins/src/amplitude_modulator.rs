// SPDX-License-Identifier: LGPL-3.0-or-later

//! Stereo amplitude modulator.
//!
//! Inputs are carrier left/right followed by modulator left/right. Each
//! channel runs the selected [`AmType`] and crossfades from the dry
//! carrier to the modulated signal by `carrierSideBandMix`.
//! `swapCarrierAndModulator` exchanges left and right in both pairs.

use fxchain_dsp_lib::float::lerp;
use fxchain_dsp_lib::scale::Scale;
use fxchain_dsp_lib::smoother::{ExpSmoother, SmootherCommon, SmoothingMode};
use fxchain_dsp_units::am::{AmType, AmplitudeModulator};
use once_cell::sync::Lazy;

use crate::base::{DspCore, validate_sample_rate};
use crate::error::{Result, check_buffers};
use crate::params::{ParameterDescriptor, ParameterStore};

const SMOOTHING_SECONDS: f64 = 0.1;

/// Parameter indices into [`AmplitudeModulatorCore::parameters`].
pub mod param {
    pub const AM_TYPE: usize = 0;
    pub const CARRIER_SIDE_BAND_MIX: usize = 1;
    pub const OUTPUT_GAIN: usize = 2;
    pub const SWAP_CARRIER_AND_MODULATOR: usize = 3;
}

static PARAMETERS: Lazy<Vec<ParameterDescriptor>> = Lazy::new(|| {
    let gain = Scale::decibel(-60.0, 60.0, true);
    vec![
        ParameterDescriptor::with_raw_default("amType", Scale::uint(31), 0.0),
        ParameterDescriptor::new("carrierSideBandMix", Scale::UNIPOLAR, 0.5),
        ParameterDescriptor::with_db_default("outputGain", gain, 0.0),
        ParameterDescriptor::with_raw_default("swapCarrierAndModulator", Scale::BOOLEAN, 0.0),
    ]
});

#[derive(Debug, Clone, Default)]
pub struct AmplitudeModulatorCore {
    smoother: SmootherCommon,
    am_type: AmType,
    swap: bool,
    mix: ExpSmoother,
    gain: ExpSmoother,
    modulators: [AmplitudeModulator; 2],
}

impl AmplitudeModulatorCore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn am_type(&self) -> AmType {
        self.am_type
    }

    fn apply(&mut self, mode: SmoothingMode, params: &ParameterStore) {
        let am_type = AmType::from_index(params.raw(param::AM_TYPE) as usize);
        if am_type != self.am_type {
            log::debug!("am type {:?} -> {:?}", self.am_type, am_type);
            self.am_type = am_type;
        }
        for modulator in self.modulators.iter_mut() {
            modulator.set_type(am_type);
        }

        self.swap = params.raw(param::SWAP_CARRIER_AND_MODULATOR) != 0.0;
        self.mix.apply(mode, params.raw(param::CARRIER_SIDE_BAND_MIX));
        self.gain.apply(mode, params.raw(param::OUTPUT_GAIN));
    }
}

impl DspCore for AmplitudeModulatorCore {
    const NUM_INPUTS: usize = 4;
    const NUM_OUTPUTS: usize = 2;

    fn parameters() -> &'static [ParameterDescriptor] {
        &PARAMETERS
    }

    fn setup(&mut self, sample_rate: f64, params: &ParameterStore) -> Result<()> {
        let sample_rate = validate_sample_rate(sample_rate)?;
        self.smoother.set_sample_rate(sample_rate);
        self.smoother.set_time(SMOOTHING_SECONDS);
        self.reset(params);
        Ok(())
    }

    fn reset(&mut self, params: &ParameterStore) {
        self.apply(SmoothingMode::Reset, params);
        for modulator in self.modulators.iter_mut() {
            modulator.reset();
        }
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

        // Swap exchanges left and right within each pair.
        let (carriers, modulators) = if self.swap {
            ([inputs[1], inputs[0]], [inputs[3], inputs[2]])
        } else {
            ([inputs[0], inputs[1]], [inputs[2], inputs[3]])
        };

        let kp = self.smoother.kp();
        for i in 0..length {
            let mix = self.mix.process(kp);
            let gain = self.gain.process(kp);
            for (ch, am) in self.modulators.iter_mut().enumerate() {
                let carrier = f64::from(carriers[ch][i]);
                let side_band = am.process(carrier, f64::from(modulators[ch][i]));
                outputs[ch][i] = (gain * lerp(carrier, side_band, mix)) as f32;
            }
        }
        Ok(())
    }
}
