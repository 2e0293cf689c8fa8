//! White noise source.

/// Uniform white noise in `[-amplitude, amplitude)`. The only state is the
/// PRNG cursor, so a given seed always yields the same stream.
#[derive(Debug)]
pub struct Noise {
    pub amplitude: f64,
    seed: u64,
    rng: fastrand::Rng,
}

impl Noise {
    pub fn new(seed: u64) -> Self {
        Noise {
            amplitude: 0.0,
            seed,
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    pub fn next_frame(&mut self) -> (f32, f32) {
        let sample = (self.amplitude * (self.rng.f64() * 2.0 - 1.0)) as f32;
        (sample, sample)
    }

    /// Rewind to the start of the seeded stream.
    pub fn reset(&mut self) {
        self.rng = fastrand::Rng::with_seed(self.seed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stays_within_amplitude() {
        let mut n = Noise::new(7);
        n.amplitude = 0.5;
        for _ in 0..10_000 {
            let (l, r) = n.next_frame();
            assert_eq!(l, r);
            assert!(l >= -0.5 && l <= 0.5, "noise out of range: {l}");
        }
    }

    #[test]
    fn roughly_zero_mean() {
        let mut n = Noise::new(1234);
        n.amplitude = 1.0;
        let sum: f64 = (0..100_000).map(|_| n.next_frame().0 as f64).sum();
        let mean = sum / 100_000.0;
        assert!(mean.abs() < 0.02, "noise mean too far from zero: {mean}");
    }

    #[test]
    fn reset_replays_stream() {
        let mut n = Noise::new(99);
        n.amplitude = 1.0;
        let first: Vec<f32> = (0..16).map(|_| n.next_frame().0).collect();
        n.reset();
        let again: Vec<f32> = (0..16).map(|_| n.next_frame().0).collect();
        assert_eq!(first, again);
    }

    #[test]
    fn silent_at_zero_amplitude() {
        let mut n = Noise::new(3);
        assert!((0..100).all(|_| n.next_frame().0 == 0.0));
    }
}
