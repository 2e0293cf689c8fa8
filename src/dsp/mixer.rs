//! Mixer — Sums the two oscillators and the noise source.

/// Full-scale value of a mixer volume control.
pub const MAX_VOLUME: f32 = 10.0;

/// Map a 0–10 mixer volume to a `[0, 1]` gain.
pub fn volume_to_gain(volume: f32) -> f64 {
    (volume.clamp(0.0, MAX_VOLUME) / MAX_VOLUME) as f64
}

/// Per-source gains, already scaled to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mixer {
    pub osc1_gain: f64,
    pub osc2_gain: f64,
    pub noise_gain: f64,
}

impl Default for Mixer {
    fn default() -> Self {
        Mixer {
            osc1_gain: 1.0,
            osc2_gain: 0.0,
            noise_gain: 0.0,
        }
    }
}

impl Mixer {
    pub fn from_volumes(osc1: f32, osc2: f32, noise: f32) -> Self {
        Mixer {
            osc1_gain: volume_to_gain(osc1),
            osc2_gain: volume_to_gain(osc2),
            noise_gain: volume_to_gain(noise),
        }
    }

    /// Mix one stereo frame from each source.
    pub fn mix(&self, osc1: (f32, f32), osc2: (f32, f32), noise: (f32, f32)) -> (f32, f32) {
        let left = osc1.0 as f64 * self.osc1_gain
            + osc2.0 as f64 * self.osc2_gain
            + noise.0 as f64 * self.noise_gain;
        let right = osc1.1 as f64 * self.osc1_gain
            + osc2.1 as f64 * self.osc2_gain
            + noise.1 as f64 * self.noise_gain;
        (left as f32, right as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_scaling() {
        assert_eq!(volume_to_gain(0.0), 0.0);
        assert_eq!(volume_to_gain(10.0), 1.0);
        assert!((volume_to_gain(2.5) - 0.25).abs() < 1e-9);
        assert_eq!(volume_to_gain(42.0), 1.0);
        assert_eq!(volume_to_gain(-1.0), 0.0);
    }

    #[test]
    fn default_passes_only_osc1() {
        let m = Mixer::default();
        let out = m.mix((0.5, 0.5), (1.0, 1.0), (1.0, 1.0));
        assert_eq!(out, (0.5, 0.5));
    }

    #[test]
    fn sums_weighted_sources() {
        let m = Mixer::from_volumes(10.0, 5.0, 2.0);
        let (l, r) = m.mix((0.2, 0.2), (0.4, -0.4), (1.0, 1.0));
        assert!((l - (0.2 + 0.2 + 0.2)).abs() < 1e-6, "left {l}");
        assert!((r - (0.2 - 0.2 + 0.2)).abs() < 1e-6, "right {r}");
    }

    #[test]
    fn silent_when_all_volumes_zero() {
        let m = Mixer::from_volumes(0.0, 0.0, 0.0);
        assert_eq!(m.mix((1.0, 1.0), (1.0, 1.0), (1.0, 1.0)), (0.0, 0.0));
    }
}
