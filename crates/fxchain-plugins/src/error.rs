// SPDX-License-Identifier: LGPL-3.0-or-later

//! Error type for the host-facing entry points.
//!
//! Errors are only raised at block boundaries: `setup`, parameter lookup
//! by name and the channel checks at the start of `process`.

use thiserror::Error;

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("invalid sample rate: {0} Hz")]
    InvalidSampleRate(f64),

    #[error("unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("expected {expected} channels, got {actual}")]
    ChannelCount { expected: usize, actual: usize },

    #[error("channel {channel} holds {actual} samples, {required} required")]
    BufferTooShort {
        channel: usize,
        required: usize,
        actual: usize,
    },

    #[error("process called before setup")]
    NotPrepared,

    /// A previous call panicked while holding the processor lock.
    #[error("processor lock poisoned")]
    Poisoned,
}

/// Check channel counts and that every slice holds at least `length`
/// samples. Output channels are numbered after the inputs.
pub(crate) fn check_buffers(
    length: usize,
    inputs: &[&[f32]],
    outputs: &[&mut [f32]],
    num_inputs: usize,
    num_outputs: usize,
) -> Result<()> {
    if inputs.len() != num_inputs {
        return Err(Error::ChannelCount {
            expected: num_inputs,
            actual: inputs.len(),
        });
    }
    if outputs.len() != num_outputs {
        return Err(Error::ChannelCount {
            expected: num_outputs,
            actual: outputs.len(),
        });
    }

    let lengths = inputs
        .iter()
        .map(|ch| ch.len())
        .chain(outputs.iter().map(|ch| ch.len()));
    for (channel, actual) in lengths.enumerate() {
        if actual < length {
            return Err(Error::BufferTooShort {
                channel,
                required: length,
                actual,
            });
        }
    }
    Ok(())
}
