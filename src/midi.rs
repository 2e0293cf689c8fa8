//! MIDI 1.0 channel-message decoding.

/// Controller number of the "All Notes Off" channel-mode message.
pub const ALL_NOTES_OFF_CC: u8 = 0x7B;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiMessage {
    NoteOff { channel: u8, note: u8, velocity: u8 },
    NoteOn { channel: u8, note: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    /// 14-bit bend, centre 8192.
    PitchBend { channel: u8, value: u16 },
    AllNotesOff { channel: u8 },
}

impl MidiMessage {
    /// Decode a 3-byte channel message. Anything else is `None`.
    ///
    /// Note-on with velocity 0 decodes as note-off.
    pub fn parse(bytes: &[u8]) -> Option<MidiMessage> {
        let &[status, data0, data1] = bytes else {
            return None;
        };
        if status & 0x80 == 0 || data0 & 0x80 != 0 || data1 & 0x80 != 0 {
            return None;
        }
        let channel = status & 0x0F;

        match status & 0xF0 {
            0x80 => Some(MidiMessage::NoteOff {
                channel,
                note: data0,
                velocity: data1,
            }),
            0x90 if data1 == 0 => Some(MidiMessage::NoteOff {
                channel,
                note: data0,
                velocity: 0,
            }),
            0x90 => Some(MidiMessage::NoteOn {
                channel,
                note: data0,
                velocity: data1,
            }),
            0xB0 if data0 == ALL_NOTES_OFF_CC => Some(MidiMessage::AllNotesOff { channel }),
            0xB0 => Some(MidiMessage::ControlChange {
                channel,
                controller: data0,
                value: data1,
            }),
            0xE0 => Some(MidiMessage::PitchBend {
                channel,
                value: (data1 as u16) << 7 | data0 as u16,
            }),
            _ => None,
        }
    }

    pub fn channel(&self) -> u8 {
        match *self {
            MidiMessage::NoteOff { channel, .. }
            | MidiMessage::NoteOn { channel, .. }
            | MidiMessage::ControlChange { channel, .. }
            | MidiMessage::PitchBend { channel, .. }
            | MidiMessage::AllNotesOff { channel } => channel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_on_and_off() {
        assert_eq!(
            MidiMessage::parse(&[0x90, 60, 100]),
            Some(MidiMessage::NoteOn {
                channel: 0,
                note: 60,
                velocity: 100
            })
        );
        assert_eq!(
            MidiMessage::parse(&[0x83, 60, 64]),
            Some(MidiMessage::NoteOff {
                channel: 3,
                note: 60,
                velocity: 64
            })
        );
    }

    #[test]
    fn zero_velocity_note_on_is_note_off() {
        assert_eq!(
            MidiMessage::parse(&[0x91, 72, 0]),
            Some(MidiMessage::NoteOff {
                channel: 1,
                note: 72,
                velocity: 0
            })
        );
    }

    #[test]
    fn controllers() {
        assert_eq!(
            MidiMessage::parse(&[0xB2, ALL_NOTES_OFF_CC, 0]),
            Some(MidiMessage::AllNotesOff { channel: 2 })
        );
        assert_eq!(
            MidiMessage::parse(&[0xB0, 1, 64]),
            Some(MidiMessage::ControlChange {
                channel: 0,
                controller: 1,
                value: 64
            })
        );
    }

    #[test]
    fn pitch_bend_is_fourteen_bit() {
        assert_eq!(
            MidiMessage::parse(&[0xE0, 0x00, 0x40]),
            Some(MidiMessage::PitchBend {
                channel: 0,
                value: 8192
            })
        );
        assert_eq!(
            MidiMessage::parse(&[0xEF, 0x7F, 0x7F]).map(|m| m.channel()),
            Some(15)
        );
    }

    #[test]
    fn rejects_malformed() {
        assert_eq!(MidiMessage::parse(&[0x90, 60]), None);
        assert_eq!(MidiMessage::parse(&[0x90, 60, 100, 0]), None);
        assert_eq!(MidiMessage::parse(&[0x40, 60, 100]), None);
        assert_eq!(MidiMessage::parse(&[0x90, 0x80, 100]), None);
        // Program change and aftertouch are not handled.
        assert_eq!(MidiMessage::parse(&[0xC0, 5, 0]), None);
        assert_eq!(MidiMessage::parse(&[0xA0, 60, 10]), None);
    }
}
