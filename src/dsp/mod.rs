//! DSP Engine — monophonic two-oscillator synth voice.
//!
//! Everything here is real-time safe once render resources are allocated:
//! the render path does not allocate, lock, log or fail. The same code
//! drives live hosts (via `queue` and the WASM facade) and the offline
//! renderer (WAV export).

pub mod engine;
pub mod event;
pub mod mixer;
pub mod noise;
pub mod oscillator;
pub mod parameter;
pub mod queue;
pub mod renderer;
pub mod voice;
