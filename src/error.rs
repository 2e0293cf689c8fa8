use thiserror::Error;

/// Errors reported by the control-side API.
///
/// The render path never produces these: bad control input is rejected
/// here, before it can reach the audio thread.
#[derive(Debug, Error)]
pub enum SynthError {
    /// Parameter address outside the fixed table.
    #[error("Unknown parameter address {0}")]
    UnknownParameter(u64),

    /// Parameter identifier (e.g. from a preset) not in the table.
    #[error("Unknown parameter identifier '{0}'")]
    UnknownParameterId(String),

    #[error("Invalid sample rate {0} Hz")]
    InvalidSampleRate(f64),

    /// Render resources requested before `set_sample_rate`.
    #[error("Sample rate has not been set")]
    SampleRateNotSet,

    #[error("Event {index} at frame {offset} precedes previous event at frame {previous}")]
    EventsOutOfOrder {
        index: usize,
        offset: i64,
        previous: i64,
    },

    #[error("Event {index} at frame {offset} is outside [0, {frame_count})")]
    EventOutOfRange {
        index: usize,
        offset: i64,
        frame_count: usize,
    },

    /// The control queue to the render thread has no free slot.
    #[error("Control queue is full")]
    QueueFull,

    #[error("No preset with index {0}")]
    UnknownPreset(i32),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SynthResult<T> = Result<T, SynthError>;
