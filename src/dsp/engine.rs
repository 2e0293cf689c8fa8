//! Synth Engine — sample-accurate event/audio interleaving.
//!
//! One `render` call fills `frame_count` frames. Pending events are applied
//! at their exact frame offset: audio is rendered up to the next event,
//! every event due at that frame is applied, and rendering resumes. The
//! output is identical to applying each event between two separate render
//! calls split at the same frame.
//!
//! The render path does not allocate, lock or log. Events scheduled past
//! the end of the buffer are carried to the next call in a buffer reserved
//! by [`SynthEngine::allocate_render_resources`].

use crate::config::EngineConfig;
use crate::error::{SynthError, SynthResult};
use crate::midi::MidiMessage;
use crate::params::{PARAMETERS, ParamId, parameter_by_identifier};
use crate::preset::Preset;

use super::event::{Event, EventKind};
use super::parameter::ParameterStore;
use super::queue::ControlReceiver;
use super::voice::Voice;

/// Two time-ordered event streams read as one. On equal offsets the
/// carried-over stream wins, since it was scheduled first.
struct PendingEvents<'a> {
    carried: &'a [Event],
    incoming: &'a [Event],
}

impl<'a> PendingEvents<'a> {
    fn new(carried: &'a [Event], incoming: &'a [Event]) -> Self {
        PendingEvents { carried, incoming }
    }

    fn take_incoming(&self) -> Option<bool> {
        match (self.carried.first(), self.incoming.first()) {
            (Some(c), Some(i)) => Some(i.frame_offset < c.frame_offset),
            (Some(_), None) => Some(false),
            (None, Some(_)) => Some(true),
            (None, None) => None,
        }
    }

    fn peek_offset(&self) -> Option<i64> {
        let from_incoming = self.take_incoming()?;
        let event = if from_incoming {
            &self.incoming[0]
        } else {
            &self.carried[0]
        };
        Some(event.frame_offset)
    }

    fn pop(&mut self) -> Option<Event> {
        let stream = if self.take_incoming()? {
            &mut self.incoming
        } else {
            &mut self.carried
        };
        let events: &'a [Event] = *stream;
        let (first, rest) = events.split_first()?;
        *stream = rest;
        Some(*first)
    }
}

/// The monophonic synth: parameter store, voice, and the render loop.
#[derive(Debug)]
pub struct SynthEngine {
    config: EngineConfig,
    sample_rate: Option<f64>,
    allocated: bool,
    params: ParameterStore,
    voice: Voice,
    /// Events past the end of the last call, offsets rebased to the next.
    carried: Vec<Event>,
    /// Second buffer swapped with `carried` so rebasing never allocates.
    spare: Vec<Event>,
    dropped_events: usize,
}

fn valid_sample_rate(hz: f64) -> bool {
    hz.is_finite() && hz > 0.0
}

impl SynthEngine {
    pub fn new(sample_rate: f64) -> Self {
        Self::with_config(EngineConfig::default().with_sample_rate(sample_rate))
    }

    /// Build an engine. The sample rate is taken from `config` if valid;
    /// otherwise `set_sample_rate` must be called before allocating.
    pub fn with_config(config: EngineConfig) -> Self {
        let sample_rate = valid_sample_rate(config.sample_rate).then_some(config.sample_rate);
        if sample_rate.is_none() {
            log::warn!(
                "ignoring invalid configured sample rate {} Hz",
                config.sample_rate
            );
        }
        let mut voice = Voice::new(sample_rate.unwrap_or(0.0), config.noise_seed);
        voice.tuning_pitch = config.tuning_pitch;
        SynthEngine {
            config,
            sample_rate,
            allocated: false,
            params: ParameterStore::new(),
            voice,
            carried: Vec::new(),
            spare: Vec::new(),
            dropped_events: 0,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn sample_rate(&self) -> Option<f64> {
        self.sample_rate
    }

    pub fn is_allocated(&self) -> bool {
        self.allocated
    }

    pub fn voice(&self) -> &Voice {
        &self.voice
    }

    pub fn params(&self) -> &ParameterStore {
        &self.params
    }

    pub fn current_note(&self) -> Option<u8> {
        self.voice.current_note()
    }

    /// Events currently carried over to the next render call.
    pub fn carried_events(&self) -> &[Event] {
        &self.carried
    }

    // ── Lifecycle ──────────────────────────────────────────────

    /// Set the output sample rate. Render resources are released: the
    /// engine must be re-allocated before it renders again.
    pub fn set_sample_rate(&mut self, hz: f64) -> SynthResult<()> {
        if !valid_sample_rate(hz) {
            log::warn!("rejected sample rate {hz} Hz");
            return Err(SynthError::InvalidSampleRate(hz));
        }
        if self.allocated {
            log::info!("sample rate changed while allocated; render resources released");
            self.deallocate_render_resources();
        }
        log::info!("sample rate set to {hz} Hz");
        self.sample_rate = Some(hz);
        self.config.sample_rate = hz;
        self.voice.set_sample_rate(hz);
        Ok(())
    }

    /// Prepare for rendering: parameters back to defaults, oscillator phases
    /// to zero, event buffers reserved.
    pub fn allocate_render_resources(&mut self) -> SynthResult<()> {
        let sample_rate = self.sample_rate.ok_or(SynthError::SampleRateNotSet)?;

        let capacity = self.config.event_capacity;
        self.carried.clear();
        self.spare.clear();
        self.carried.reserve_exact(capacity);
        self.spare.reserve_exact(capacity);
        self.dropped_events = 0;

        self.params.reset();
        self.voice.set_sample_rate(sample_rate);
        self.voice.tuning_pitch = self.config.tuning_pitch;
        self.voice.reset();
        self.voice.apply_params(&self.params);

        self.allocated = true;
        log::info!(
            "render resources allocated: {sample_rate} Hz, up to {} frames per call, {capacity} event slots",
            self.config.max_frames_per_render
        );
        Ok(())
    }

    pub fn deallocate_render_resources(&mut self) {
        if self.allocated {
            log::info!("render resources deallocated");
        }
        self.allocated = false;
        self.carried.clear();
        self.spare.clear();
    }

    // ── Control operations ─────────────────────────────────────
    //
    // These take effect before the next produced frame. Hosts that drive
    // the engine from another thread go through `dsp::queue` instead.

    pub fn set_parameter(&mut self, address: u64, value: f32) -> SynthResult<()> {
        let id = ParamId::try_from(address).inspect_err(|e| log::warn!("{e}"))?;
        self.apply(EventKind::ParameterSet { param: id, value });
        Ok(())
    }

    pub fn get_parameter(&self, address: u64) -> SynthResult<f32> {
        Ok(self.params.get(ParamId::try_from(address)?))
    }

    pub fn start_ramp(&mut self, address: u64, target: f32, duration_frames: u32) -> SynthResult<()> {
        let id = ParamId::try_from(address).inspect_err(|e| log::warn!("{e}"))?;
        self.apply(EventKind::ParameterRamp {
            param: id,
            target,
            duration_frames,
        });
        Ok(())
    }

    pub fn handle_note_event(&mut self, note: u8, velocity: u8, is_note_on: bool) {
        self.apply(EventKind::note(note, velocity, is_note_on));
    }

    pub fn handle_midi(&mut self, bytes: [u8; 3]) {
        self.apply(EventKind::Midi { bytes });
    }

    /// Set every parameter the preset names. Unknown identifiers are
    /// skipped. Returns how many parameters were applied.
    pub fn apply_preset(&mut self, preset: &Preset) -> usize {
        let mut applied = 0;
        for (identifier, &value) in &preset.params {
            match parameter_by_identifier(identifier) {
                Some(def) => {
                    if let Ok(id) = ParamId::try_from(def.address) {
                        self.params.set(id, value);
                        applied += 1;
                    }
                }
                None => log::warn!(
                    "preset '{}' names unknown parameter '{identifier}'",
                    preset.name
                ),
            }
        }
        self.voice.apply_params(&self.params);
        log::debug!(
            "applied preset {} '{}' ({applied}/{} parameters)",
            preset.index,
            preset.name,
            PARAMETERS.len()
        );
        applied
    }

    /// Number of carried events dropped because the carry buffer was full,
    /// reset on read. Logged here, on the control side.
    pub fn take_dropped_events(&mut self) -> usize {
        let dropped = std::mem::take(&mut self.dropped_events);
        if dropped > 0 {
            log::warn!("{dropped} scheduled events dropped: carry buffer full");
        }
        dropped
    }

    // ── Render ─────────────────────────────────────────────────

    /// Fill `frame_count` frames of both channels.
    ///
    /// `events` must be ordered by `frame_offset` (see
    /// [`check_ordered`](super::event::check_ordered)); it is not re-sorted.
    /// Offsets below zero apply at the first frame, offsets at or past
    /// `frame_count` are carried to the next call. At most
    /// `EngineConfig::event_capacity` events are carried; any beyond that
    /// are dropped and counted (see [`take_dropped_events`](Self::take_dropped_events)).
    /// Without a sample rate or allocated resources the output is silence.
    pub fn render(
        &mut self,
        frame_count: usize,
        out_left: &mut [f32],
        out_right: &mut [f32],
        events: &[Event],
    ) {
        self.render_inner(frame_count, out_left, out_right, events, None);
    }

    /// As [`render`](Self::render), first applying everything waiting in
    /// the control queue at frame 0.
    pub fn render_with_queue(
        &mut self,
        frame_count: usize,
        out_left: &mut [f32],
        out_right: &mut [f32],
        events: &[Event],
        receiver: &mut ControlReceiver,
    ) {
        self.render_inner(frame_count, out_left, out_right, events, Some(receiver));
    }

    fn render_inner(
        &mut self,
        frame_count: usize,
        out_left: &mut [f32],
        out_right: &mut [f32],
        events: &[Event],
        receiver: Option<&mut ControlReceiver>,
    ) {
        let frame_count = frame_count.min(out_left.len()).min(out_right.len());
        let out_left = &mut out_left[..frame_count];
        let out_right = &mut out_right[..frame_count];

        if !self.allocated || self.sample_rate.is_none() {
            out_left.fill(0.0);
            out_right.fill(0.0);
            return;
        }

        if let Some(receiver) = receiver {
            while let Some(kind) = receiver.pop() {
                self.apply(kind);
            }
        }

        let carried = std::mem::take(&mut self.carried);
        let mut next_carried = std::mem::take(&mut self.spare);
        let mut pending = PendingEvents::new(&carried, events);
        let end = frame_count as i64;

        let mut cursor = 0;
        while cursor < frame_count {
            while pending
                .peek_offset()
                .is_some_and(|offset| offset <= cursor as i64)
            {
                if let Some(event) = pending.pop() {
                    self.apply(event.kind);
                }
            }

            let next = match pending.peek_offset() {
                Some(offset) if offset < end => offset as usize,
                _ => frame_count,
            };
            self.render_segment(&mut out_left[cursor..next], &mut out_right[cursor..next]);
            cursor = next;
        }

        while let Some(event) = pending.pop() {
            if next_carried.len() < next_carried.capacity() {
                next_carried.push(Event::new(event.frame_offset - end, event.kind));
            } else {
                self.dropped_events += 1;
            }
        }

        let mut carried = carried;
        carried.clear();
        self.spare = carried;
        self.carried = next_carried;
    }

    fn render_segment(&mut self, out_left: &mut [f32], out_right: &mut [f32]) {
        for (left, right) in out_left.iter_mut().zip(out_right.iter_mut()) {
            (*left, *right) = self.voice.next_frame();
            if self.params.tick() {
                self.voice.apply_params(&self.params);
            }
        }
    }

    fn apply(&mut self, kind: EventKind) {
        match kind {
            EventKind::NoteOn { note, velocity } => self.voice.note_on(note, velocity),
            EventKind::NoteOff { note } => self.voice.note_off(note),
            EventKind::ParameterSet { param, value } => {
                self.params.set(param, value);
                self.voice.apply_params(&self.params);
            }
            EventKind::ParameterRamp {
                param,
                target,
                duration_frames,
            } => {
                self.params.start_ramp(param, target, duration_frames);
                self.voice.apply_params(&self.params);
            }
            EventKind::Midi { bytes } => match MidiMessage::parse(&bytes) {
                Some(MidiMessage::NoteOn { note, velocity, .. }) => {
                    self.voice.note_on(note, velocity)
                }
                Some(MidiMessage::NoteOff { note, .. }) => self.voice.note_off(note),
                Some(MidiMessage::AllNotesOff { .. }) => self.voice.all_notes_off(),
                // No modulation destinations for controllers or bend.
                Some(MidiMessage::ControlChange { .. } | MidiMessage::PitchBend { .. }) | None => {}
            },
        }
    }
}
