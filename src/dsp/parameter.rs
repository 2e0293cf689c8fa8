//! Parameter store — current value plus an optional linear ramp per control.

use crate::params::{PARAM_COUNT, PARAMETERS, ParamId};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Ramp {
    target: f32,
    increment: f32,
    frames_remaining: u32,
}

/// One addressable control. `value` is always within `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parameter {
    value: f32,
    min: f32,
    max: f32,
    default: f32,
    ramp: Option<Ramp>,
}

impl Parameter {
    pub fn new(min: f32, max: f32, default: f32) -> Self {
        Parameter {
            value: default.clamp(min, max),
            min,
            max,
            default,
            ramp: None,
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn is_ramping(&self) -> bool {
        self.ramp.is_some()
    }

    /// Target and frames left, while a ramp is in flight.
    pub fn ramp_target(&self) -> Option<(f32, u32)> {
        self.ramp.map(|r| (r.target, r.frames_remaining))
    }

    fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            self.value
        } else {
            value.clamp(self.min, self.max)
        }
    }

    fn set(&mut self, value: f32) {
        self.value = self.clamp(value);
        self.ramp = None;
    }

    fn start_ramp(&mut self, target: f32, duration_frames: u32) {
        let target = self.clamp(target);
        if duration_frames == 0 {
            self.set(target);
            return;
        }
        self.ramp = Some(Ramp {
            target,
            increment: (target - self.value) / duration_frames as f32,
            frames_remaining: duration_frames,
        });
    }

    /// Returns true if the value moved.
    fn tick(&mut self) -> bool {
        let Some(ramp) = self.ramp.as_mut() else {
            return false;
        };
        ramp.frames_remaining -= 1;
        if ramp.frames_remaining == 0 {
            self.value = ramp.target;
            self.ramp = None;
        } else {
            self.value = (self.value + ramp.increment).clamp(self.min, self.max);
        }
        true
    }

    fn reset(&mut self) {
        self.value = self.default.clamp(self.min, self.max);
        self.ramp = None;
    }
}

/// Fixed-size store indexed by [`ParamId`]. No operation allocates.
#[derive(Debug, Clone)]
pub struct ParameterStore {
    params: [Parameter; PARAM_COUNT],
    /// Count of parameters with a ramp in flight; lets `tick` bail early.
    active_ramps: usize,
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterStore {
    pub fn new() -> Self {
        let params = std::array::from_fn(|i| {
            let (_, min, max, default) = PARAMETERS[i].range();
            Parameter::new(min, max, default)
        });
        ParameterStore {
            params,
            active_ramps: 0,
        }
    }

    pub fn get(&self, id: ParamId) -> f32 {
        self.params[id.index()].value()
    }

    pub fn parameter(&self, id: ParamId) -> &Parameter {
        &self.params[id.index()]
    }

    /// Clamp and apply immediately, cancelling any ramp.
    pub fn set(&mut self, id: ParamId, value: f32) {
        self.params[id.index()].set(value);
        self.recount();
    }

    /// Ramp linearly to `target` over `duration_frames`; zero frames is a set.
    pub fn start_ramp(&mut self, id: ParamId, target: f32, duration_frames: u32) {
        self.params[id.index()].start_ramp(target, duration_frames);
        self.recount();
    }

    /// Advance every active ramp by one frame. Returns true if any value moved.
    pub fn tick(&mut self) -> bool {
        if self.active_ramps == 0 {
            return false;
        }
        let mut moved = false;
        for p in self.params.iter_mut() {
            moved |= p.tick();
        }
        self.recount();
        moved
    }

    pub fn has_active_ramps(&self) -> bool {
        self.active_ramps > 0
    }

    /// Back to table defaults with no ramps.
    pub fn reset(&mut self) {
        for p in self.params.iter_mut() {
            p.reset();
        }
        self.active_ramps = 0;
    }

    fn recount(&mut self) {
        self.active_ramps = self.params.iter().filter(|p| p.is_ramping()).count();
    }
}
