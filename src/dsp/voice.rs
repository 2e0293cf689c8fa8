//! Voice — the single monophonic voice: two oscillators plus noise.
//!
//! Last-note priority: a new note replaces the sounding one without touching
//! oscillator phase, and a note-off only silences the voice if it names the
//! sounding note.

use crate::params::ParamId;

use super::mixer::Mixer;
use super::noise::Noise;
use super::oscillator::{Generator, Oscillator, clamp_shape};
use super::parameter::ParameterStore;

/// Reference pitch of A4 (MIDI note 69).
pub const DEFAULT_TUNING_PITCH: f64 = 440.0;

/// Octave multipliers for the six range positions: LO, 32', 16', 8', 4', 2'.
pub const RANGE_MULTIPLIERS: [f64; 6] = [0.125, 0.25, 0.5, 1.0, 2.0, 4.0];

/// Equal-tempered frequency of a MIDI note, `tuning_pitch` being A4.
pub fn note_to_frequency(note: u8, tuning_pitch: f64) -> f64 {
    tuning_pitch * (2.0_f64).powf((note as f64 - 69.0) / 12.0)
}

/// `2^(cents / 1200)`
pub fn detune_multiplier(cents: f64) -> f64 {
    (2.0_f64).powf(cents / 1200.0)
}

/// Round an indexed parameter value to a valid index in `0..len`.
fn index_from_value(value: f32, len: usize) -> usize {
    if value.is_nan() {
        return 0;
    }
    (value.round().max(0.0) as usize).min(len - 1)
}

pub fn range_multiplier(value: f32) -> f64 {
    RANGE_MULTIPLIERS[index_from_value(value, RANGE_MULTIPLIERS.len())]
}

/// The six waveform selector positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Triangle,
    Ramp,
    Sawtooth,
    Square,
    /// Narrow pulse, 10% duty.
    Pulse1,
    /// Wide pulse, 25% duty.
    Pulse2,
}

impl Waveform {
    pub const ALL: [Waveform; 6] = [
        Waveform::Triangle,
        Waveform::Ramp,
        Waveform::Sawtooth,
        Waveform::Square,
        Waveform::Pulse1,
        Waveform::Pulse2,
    ];

    pub fn from_value(value: f32) -> Self {
        Waveform::ALL[index_from_value(value, Waveform::ALL.len())]
    }

    pub fn generator(self) -> Generator {
        match self {
            Waveform::Triangle => Generator::SawTriangle { rise: clamp_shape(0.5) },
            Waveform::Ramp => Generator::SawTriangle { rise: clamp_shape(0.75) },
            Waveform::Sawtooth => Generator::SawTriangle { rise: clamp_shape(0.99) },
            Waveform::Square => Generator::SquarePulse { duty: clamp_shape(0.5) },
            Waveform::Pulse1 => Generator::SquarePulse { duty: clamp_shape(0.1) },
            Waveform::Pulse2 => Generator::SquarePulse { duty: clamp_shape(0.25) },
        }
    }
}

#[derive(Debug)]
pub struct Voice {
    pub osc1: Oscillator,
    pub osc2: Oscillator,
    pub noise: Noise,
    pub mixer: Mixer,
    pub tuning_pitch: f64,
    current_note: Option<u8>,
    /// Velocity gain `[0, 1]` of the sounding note.
    velocity: f64,
    osc1_freq_multiplier: f64,
    osc2_freq_multiplier: f64,
    osc2_detune_cents: f64,
    /// Frequency of the last note, kept after note-off so the oscillators
    /// keep their pitch while silent.
    base_frequency: f64,
}

impl Voice {
    pub fn new(sample_rate: f64, noise_seed: u64) -> Self {
        let generator = Waveform::Triangle.generator();
        Voice {
            osc1: Oscillator::new(generator, sample_rate),
            osc2: Oscillator::new(generator, sample_rate),
            noise: Noise::new(noise_seed),
            mixer: Mixer::default(),
            tuning_pitch: DEFAULT_TUNING_PITCH,
            current_note: None,
            velocity: 0.0,
            osc1_freq_multiplier: RANGE_MULTIPLIERS[0],
            osc2_freq_multiplier: RANGE_MULTIPLIERS[0],
            osc2_detune_cents: 0.0,
            base_frequency: 0.0,
        }
    }

    pub fn current_note(&self) -> Option<u8> {
        self.current_note
    }

    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        self.osc1.set_sample_rate(sample_rate);
        self.osc2.set_sample_rate(sample_rate);
    }

    /// Re-derive oscillator shapes, frequency multipliers and mixer gains
    /// from the store.
    pub fn apply_params(&mut self, params: &ParameterStore) {
        self.osc1
            .set_generator(Waveform::from_value(params.get(ParamId::Osc1Waveform)).generator());
        self.osc2
            .set_generator(Waveform::from_value(params.get(ParamId::Osc2Waveform)).generator());

        self.osc1_freq_multiplier = range_multiplier(params.get(ParamId::Osc1Range));
        self.osc2_freq_multiplier = range_multiplier(params.get(ParamId::Osc2Range));
        self.osc2_detune_cents = params.get(ParamId::Osc2Detune) as f64;

        self.mixer = Mixer::from_volumes(
            params.get(ParamId::MixOsc1Volume),
            params.get(ParamId::MixOsc2Volume),
            params.get(ParamId::MixNoiseVolume),
        );

        self.update_oscillators();
    }

    /// Start (or retrigger) a note. Phase is left alone.
    pub fn note_on(&mut self, note: u8, velocity: u8) {
        self.current_note = Some(note);
        self.velocity = velocity.min(127) as f64 / 127.0;
        self.base_frequency = note_to_frequency(note, self.tuning_pitch);
        self.update_oscillators();
    }

    /// Release `note` if it is the sounding one.
    pub fn note_off(&mut self, note: u8) {
        if self.current_note == Some(note) {
            self.all_notes_off();
        }
    }

    pub fn all_notes_off(&mut self) {
        self.current_note = None;
        self.velocity = 0.0;
        self.update_oscillators();
    }

    pub fn osc1_frequency(&self) -> f64 {
        self.osc1.frequency
    }

    pub fn osc2_frequency(&self) -> f64 {
        self.osc2.frequency
    }

    fn update_oscillators(&mut self) {
        let amplitude = if self.current_note.is_some() {
            self.velocity
        } else {
            0.0
        };

        self.osc1.frequency = self.base_frequency * self.osc1_freq_multiplier;
        self.osc1.amplitude = amplitude;

        self.osc2.frequency = self.base_frequency
            * self.osc2_freq_multiplier
            * detune_multiplier(self.osc2_detune_cents);
        self.osc2.amplitude = amplitude;

        self.noise.amplitude = amplitude;
    }

    /// Produce one mixed frame. Every source advances, audible or not.
    pub fn next_frame(&mut self) -> (f32, f32) {
        let osc1 = self.osc1.next_frame();
        let osc2 = self.osc2.next_frame();
        let noise = self.noise.next_frame();
        self.mixer.mix(osc1, osc2, noise)
    }

    /// Back to the initial state: no note, phases and noise rewound.
    pub fn reset(&mut self) {
        self.current_note = None;
        self.velocity = 0.0;
        self.base_frequency = 0.0;
        self.osc1.reset();
        self.osc2.reset();
        self.noise.reset();
        self.update_oscillators();
    }
}
