//! Offline renderer — drives the engine over a timeline and encodes WAV.

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::SynthResult;

use super::engine::SynthEngine;
use super::event::{Event, EventKind};

/// An event at an absolute frame of the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimedEvent {
    pub frame: u64,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl TimedEvent {
    pub fn new(frame: u64, kind: EventKind) -> Self {
        TimedEvent { frame, kind }
    }
}

/// Parse a JSON array of timed events, e.g.
/// `[{"frame": 0, "type": "noteOn", "note": 60, "velocity": 100}]`.
pub fn parse_timeline(json: &str) -> SynthResult<Vec<TimedEvent>> {
    Ok(serde_json::from_str(json)?)
}

/// Render `total_frames` of stereo audio, calling the engine in blocks of
/// `config.max_frames_per_render`. Events are applied in frame order, ties
/// in list order. Events at or past `total_frames` are never reached.
pub fn render_timeline(
    config: &EngineConfig,
    timeline: &[TimedEvent],
    total_frames: usize,
) -> SynthResult<(Vec<f32>, Vec<f32>)> {
    let mut engine = SynthEngine::with_config(config.clone());
    engine.allocate_render_resources()?;

    let mut timeline = timeline.to_vec();
    timeline.sort_by_key(|e| e.frame);

    let block_size = config.max_frames_per_render.max(1);
    let mut left = vec![0.0; total_frames];
    let mut right = vec![0.0; total_frames];
    let mut block_events: Vec<Event> = Vec::with_capacity(config.event_capacity);
    let mut next = timeline.iter().peekable();

    let mut start = 0;
    while start < total_frames {
        let len = block_size.min(total_frames - start);
        let end = (start + len) as u64;

        block_events.clear();
        while let Some(e) = next.next_if(|e| e.frame < end) {
            block_events.push(Event::new((e.frame - start as u64) as i64, e.kind));
        }

        engine.render(
            len,
            &mut left[start..start + len],
            &mut right[start..start + len],
            &block_events,
        );
        start += len;
    }

    let unreached = next.count();
    if unreached > 0 {
        log::debug!("{unreached} events past the end of a {total_frames}-frame render");
    }
    log::info!(
        "rendered {total_frames} frames ({} events) at {} Hz",
        timeline.len() - unreached,
        config.sample_rate
    );
    Ok((left, right))
}

/// Render a timeline to a WAV file as bytes (16-bit stereo PCM).
pub fn render_wav(
    config: &EngineConfig,
    timeline: &[TimedEvent],
    total_frames: usize,
) -> SynthResult<Vec<u8>> {
    let (left, right) = render_timeline(config, timeline, total_frames)?;
    let pcm: Vec<i16> = left
        .iter()
        .zip(&right)
        .flat_map(|(&l, &r)| [to_i16(l), to_i16(r)])
        .collect();
    Ok(encode_wav(&pcm, config.sample_rate.round() as u32, 2))
}

fn to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

/// Encode interleaved i16 PCM samples to a WAV byte buffer.
fn encode_wav(samples: &[i16], sample_rate: u32, channels: u16) -> Vec<u8> {
    let bits_per_sample: u16 = 16;
    let byte_rate = sample_rate * channels as u32 * (bits_per_sample as u32 / 8);
    let block_align = channels * (bits_per_sample / 8);
    let data_size = (samples.len() * 2) as u32;
    let file_size = 36 + data_size;

    let mut buf = Vec::with_capacity(44 + data_size as usize);

    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&file_size.to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
    buf.extend_from_slice(&channels.to_le_bytes());
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&bits_per_sample.to_le_bytes());

    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());
    for &sample in samples {
        buf.extend_from_slice(&sample.to_le_bytes());
    }

    buf
}
