//! Render events: what happens, and at which frame of the current call.

use serde::{Deserialize, Serialize};

use crate::error::{SynthError, SynthResult};
use crate::params::ParamId;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EventKind {
    NoteOn {
        note: u8,
        velocity: u8,
    },
    NoteOff {
        note: u8,
    },
    #[serde(rename_all = "camelCase")]
    ParameterSet {
        param: ParamId,
        value: f32,
    },
    #[serde(rename_all = "camelCase")]
    ParameterRamp {
        param: ParamId,
        target: f32,
        duration_frames: u32,
    },
    /// A raw 3-byte MIDI channel message.
    Midi {
        bytes: [u8; 3],
    },
}

impl EventKind {
    /// Build a parameter set from a raw address.
    pub fn parameter_set(address: u64, value: f32) -> SynthResult<Self> {
        Ok(EventKind::ParameterSet {
            param: ParamId::try_from(address)?,
            value,
        })
    }

    /// Build a parameter ramp from a raw address.
    pub fn parameter_ramp(address: u64, target: f32, duration_frames: u32) -> SynthResult<Self> {
        Ok(EventKind::ParameterRamp {
            param: ParamId::try_from(address)?,
            target,
            duration_frames,
        })
    }

    pub fn note(note: u8, velocity: u8, is_note_on: bool) -> Self {
        if is_note_on {
            EventKind::NoteOn { note, velocity }
        } else {
            EventKind::NoteOff { note }
        }
    }
}

/// An event due `frame_offset` frames after the start of the render call.
/// Negative offsets are already late and apply immediately.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub frame_offset: i64,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl Event {
    pub fn new(frame_offset: i64, kind: EventKind) -> Self {
        Event { frame_offset, kind }
    }

    pub fn note_on(frame_offset: i64, note: u8, velocity: u8) -> Self {
        Event::new(frame_offset, EventKind::NoteOn { note, velocity })
    }

    pub fn note_off(frame_offset: i64, note: u8) -> Self {
        Event::new(frame_offset, EventKind::NoteOff { note })
    }

    pub fn set(frame_offset: i64, param: ParamId, value: f32) -> Self {
        Event::new(frame_offset, EventKind::ParameterSet { param, value })
    }

    pub fn ramp(frame_offset: i64, param: ParamId, target: f32, duration_frames: u32) -> Self {
        Event::new(
            frame_offset,
            EventKind::ParameterRamp {
                param,
                target,
                duration_frames,
            },
        )
    }
}

/// Parse a JSON array of events for one render call, e.g.
/// `[{"frameOffset": 12, "type": "noteOn", "note": 60, "velocity": 100}]`,
/// rejecting lists that are not in frame order.
pub fn parse_events(json: &str) -> SynthResult<Vec<Event>> {
    let events: Vec<Event> = serde_json::from_str(json)?;
    check_ordered(&events)?;
    Ok(events)
}

/// Check that offsets never decrease. The render loop relies on this and
/// does not sort.
pub fn check_ordered(events: &[Event]) -> SynthResult<()> {
    for (index, pair) in events.windows(2).enumerate() {
        if pair[1].frame_offset < pair[0].frame_offset {
            return Err(SynthError::EventsOutOfOrder {
                index: index + 1,
                offset: pair[1].frame_offset,
                previous: pair[0].frame_offset,
            });
        }
    }
    Ok(())
}

/// Strict entry check for one render call: ordered, and every offset in
/// `[0, frame_count)`.
pub fn validate_events(events: &[Event], frame_count: usize) -> SynthResult<()> {
    check_ordered(events)?;
    for (index, event) in events.iter().enumerate() {
        let in_range = usize::try_from(event.frame_offset).is_ok_and(|o| o < frame_count);
        if !in_range {
            return Err(SynthError::EventOutOfRange {
                index,
                offset: event.frame_offset,
                frame_count,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordered_list_passes() {
        let events = [
            Event::note_on(0, 60, 100),
            Event::set(0, ParamId::MixOsc2Volume, 5.0),
            Event::note_off(31, 60),
        ];
        assert!(validate_events(&events, 32).is_ok());
    }

    #[test]
    fn out_of_order_is_reported() {
        let events = [Event::note_on(10, 60, 100), Event::note_off(5, 60)];
        match check_ordered(&events) {
            Err(SynthError::EventsOutOfOrder {
                index,
                offset,
                previous,
            }) => {
                assert_eq!((index, offset, previous), (1, 5, 10));
            }
            other => panic!("expected EventsOutOfOrder, got {other:?}"),
        }
    }

    #[test]
    fn out_of_range_is_reported() {
        let late = [Event::note_on(64, 60, 100)];
        assert!(matches!(
            validate_events(&late, 64),
            Err(SynthError::EventOutOfRange { offset: 64, .. })
        ));
        let early = [Event::note_on(-1, 60, 100)];
        assert!(matches!(
            validate_events(&early, 64),
            Err(SynthError::EventOutOfRange { offset: -1, .. })
        ));
    }

    #[test]
    fn raw_address_constructors() {
        assert_eq!(
            EventKind::parameter_set(6, 2.0).unwrap(),
            EventKind::ParameterSet {
                param: ParamId::MixOsc2Volume,
                value: 2.0
            }
        );
        assert!(matches!(
            EventKind::parameter_ramp(100, 1.0, 10),
            Err(SynthError::UnknownParameter(100))
        ));
        assert_eq!(
            EventKind::note(60, 0, false),
            EventKind::NoteOff { note: 60 }
        );
    }

    #[test]
    fn event_lists_parse_from_json() {
        let events = parse_events(
            r#"[
                {"frameOffset": 0, "type": "noteOn", "note": 60, "velocity": 100},
                {"frameOffset": 16, "type": "parameterSet", "param": "osc2Detune", "value": 7.0},
                {"frameOffset": 40, "type": "midi", "bytes": [128, 60, 0]}
            ]"#,
        )
        .unwrap();
        assert_eq!(
            events,
            vec![
                Event::note_on(0, 60, 100),
                Event::set(16, ParamId::Osc2Detune, 7.0),
                Event::new(40, EventKind::Midi { bytes: [0x80, 60, 0] }),
            ]
        );

        assert!(matches!(
            parse_events(r#"[{"frameOffset": 9, "type": "noteOff", "note": 1},
                             {"frameOffset": 3, "type": "noteOff", "note": 2}]"#),
            Err(SynthError::EventsOutOfOrder { index: 1, .. })
        ));
        assert!(matches!(
            parse_events(r#"[{"frameOffset": 0, "type": "chord"}]"#),
            Err(SynthError::Json(_))
        ));
    }

    #[test]
    fn kinds_deserialize_from_json() {
        let kind: EventKind = serde_json::from_str(
            r#"{"type":"parameterRamp","param":"mixNoiseVolume","target":5.0,"durationFrames":64}"#,
        )
        .unwrap();
        assert_eq!(
            kind,
            EventKind::ParameterRamp {
                param: ParamId::MixNoiseVolume,
                target: 5.0,
                duration_frames: 64
            }
        );
        let kind: EventKind =
            serde_json::from_str(r#"{"type":"noteOn","note":69,"velocity":127}"#).unwrap();
        assert_eq!(kind, EventKind::NoteOn { note: 69, velocity: 127 });
    }
}
