//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::dsp::voice::DEFAULT_TUNING_PITCH;
use crate::error::SynthResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Output sample rate in Hz.
    pub sample_rate: f64,
    /// Largest frame count a single render call will be asked for.
    pub max_frames_per_render: usize,
    /// Events that can be carried from one render call to the next. Later
    /// events past this bound are dropped and counted. The control queue
    /// has its own capacity, set by `dsp::queue::control_channel`.
    pub event_capacity: usize,
    pub noise_seed: u64,
    /// Frequency of A4 in Hz.
    pub tuning_pitch: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            sample_rate: 44100.0,
            max_frames_per_render: 512,
            event_capacity: 256,
            noise_seed: 0x5EED,
            tuning_pitch: DEFAULT_TUNING_PITCH,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> SynthResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_sample_rate(mut self, sample_rate: f64) -> Self {
        self.sample_rate = sample_rate;
        self
    }
}
