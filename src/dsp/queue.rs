//! Lock-free control queue from the control thread to the render thread.
//!
//! The control side (UI, automation, MIDI input) never touches the engine
//! directly. It pushes [`EventKind`]s into a fixed-size `rtrb` ring buffer;
//! the render call drains the buffer at its frame-0 boundary, so queued
//! commands take effect at the first frame of the next render call.

use crate::error::{SynthError, SynthResult};

use super::event::EventKind;

/// Default number of slots.
pub const CONTROL_QUEUE_CAPACITY: usize = 256;

/// Producer half, owned by the control thread.
pub struct ControlSender {
    producer: rtrb::Producer<EventKind>,
}

/// Consumer half, owned by the render thread.
pub struct ControlReceiver {
    consumer: rtrb::Consumer<EventKind>,
}

pub fn control_channel(capacity: usize) -> (ControlSender, ControlReceiver) {
    let (producer, consumer) = rtrb::RingBuffer::new(capacity);
    (ControlSender { producer }, ControlReceiver { consumer })
}

impl ControlSender {
    /// Enqueue without blocking. Fails with `QueueFull` if the render thread
    /// has fallen behind.
    pub fn send(&mut self, kind: EventKind) -> SynthResult<()> {
        self.producer.push(kind).map_err(|_| {
            log::warn!("control queue full, dropping {kind:?}");
            SynthError::QueueFull
        })
    }

    pub fn set_parameter(&mut self, address: u64, value: f32) -> SynthResult<()> {
        self.send(EventKind::parameter_set(address, value)?)
    }

    pub fn start_ramp(&mut self, address: u64, target: f32, duration_frames: u32) -> SynthResult<()> {
        self.send(EventKind::parameter_ramp(address, target, duration_frames)?)
    }

    pub fn handle_note_event(&mut self, note: u8, velocity: u8, is_note_on: bool) -> SynthResult<()> {
        self.send(EventKind::note(note, velocity, is_note_on))
    }

    pub fn send_midi(&mut self, bytes: [u8; 3]) -> SynthResult<()> {
        self.send(EventKind::Midi { bytes })
    }

    /// Free slots.
    pub fn slots(&self) -> usize {
        self.producer.slots()
    }
}

impl ControlReceiver {
    /// Next queued command, if any. Never blocks or allocates.
    pub fn pop(&mut self) -> Option<EventKind> {
        self.consumer.pop().ok()
    }

    pub fn is_empty(&self) -> bool {
        self.consumer.is_empty()
    }
}
