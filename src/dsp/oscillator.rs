//! Per-sample waveform generators.
//!
//! Naive (non band-limited) shapes. Each oscillator owns a continuous phase
//! accumulator which is never reset by frequency or amplitude changes, so
//! parameter changes during a held note stay click-free.

use std::f64::consts::TAU;

/// Lower/upper bound for rise time and duty cycle. Both must lie strictly
/// inside (0, 1).
pub const MIN_SHAPE: f64 = 0.001;
pub const MAX_SHAPE: f64 = 0.999;

/// Clamp a rise time or duty cycle into the open interval the generators
/// accept. NaN falls back to a symmetric shape.
pub fn clamp_shape(value: f64) -> f64 {
    if value.is_nan() {
        0.5
    } else {
        value.clamp(MIN_SHAPE, MAX_SHAPE)
    }
}

/// Waveform family with its shape parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Generator {
    Sine,
    /// Rises from -1 to +1 over `[0, rise)`, falls back over `[rise, 1)`.
    SawTriangle { rise: f64 },
    /// +1 while the phase is `<= duty`, -1 after.
    SquarePulse { duty: f64 },
}

/// Which accumulator a generator uses. Switching shape within a family keeps
/// the phase; switching family resets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Sine,
    SawTriangle,
    SquarePulse,
}

impl Generator {
    pub fn family(&self) -> Family {
        match self {
            Generator::Sine => Family::Sine,
            Generator::SawTriangle { .. } => Family::SawTriangle,
            Generator::SquarePulse { .. } => Family::SquarePulse,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Oscillator {
    pub generator: Generator,
    pub frequency: f64,
    pub amplitude: f64,
    sample_rate: f64,
    /// Radians for sine, `[0, 1)` for the others.
    phase: f64,
}

impl Oscillator {
    pub fn new(generator: Generator, sample_rate: f64) -> Self {
        Oscillator {
            generator,
            frequency: 0.0,
            amplitude: 0.0,
            sample_rate,
            phase: 0.0,
        }
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Swap the active generator in place. The phase survives unless the
    /// family changes.
    pub fn set_generator(&mut self, generator: Generator) {
        if generator.family() != self.generator.family() {
            self.phase = 0.0;
        }
        self.generator = generator;
    }

    /// Advance one sample period and return the `(left, right)` frame.
    pub fn next_frame(&mut self) -> (f32, f32) {
        let sample = match self.generator {
            Generator::Sine => self.sine(),
            Generator::SawTriangle { rise } => self.saw_triangle(rise),
            Generator::SquarePulse { duty } => self.square_pulse(duty),
        } as f32;
        (sample, sample)
    }

    fn sine(&mut self) -> f64 {
        self.phase += TAU * self.frequency / self.sample_rate;
        if self.phase > TAU {
            self.phase = self.phase.rem_euclid(TAU);
        }
        self.amplitude * self.phase.sin()
    }

    fn advance_relative(&mut self) {
        self.phase += self.frequency / self.sample_rate;
        if self.phase >= 1.0 {
            self.phase = self.phase.fract();
        }
    }

    fn saw_triangle(&mut self, rise: f64) -> f64 {
        self.advance_relative();
        let t = self.phase;
        if t < rise {
            self.amplitude * (-1.0 + 2.0 * t / rise)
        } else {
            self.amplitude * (1.0 - 2.0 * (t - rise) / (1.0 - rise))
        }
    }

    fn square_pulse(&mut self, duty: f64) -> f64 {
        self.advance_relative();
        if self.phase <= duty {
            self.amplitude
        } else {
            -self.amplitude
        }
    }

    /// Zero the accumulator. Only used on (re)initialization.
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}
