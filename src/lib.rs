pub mod config;
pub mod dsp;
pub mod error;
pub mod midi;
pub mod params;
pub mod preset;

use crate::config::EngineConfig;
use crate::dsp::engine::SynthEngine;
use crate::dsp::event::Event;
use crate::preset::FactoryPresets;
use wasm_bindgen::prelude::*;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&format!("{e}"))
}

/// WASM-exposed: return the minimoog-core version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

/// WASM-exposed: the parameter description table, for building a UI.
#[wasm_bindgen]
pub fn parameter_table() -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&params::PARAMETERS[..]).map_err(js_error)
}

/// WASM-exposed: render a JSON timeline (see `dsp::renderer::parse_timeline`)
/// to a WAV byte array.
#[wasm_bindgen]
pub fn render_events_wav(
    timeline_json: &str,
    sample_rate: u32,
    total_frames: u32,
) -> Result<Vec<u8>, JsValue> {
    let timeline = dsp::renderer::parse_timeline(timeline_json).map_err(js_error)?;
    let config = EngineConfig::default().with_sample_rate(sample_rate as f64);
    dsp::renderer::render_wav(&config, &timeline, total_frames as usize).map_err(js_error)
}

/// A live synth for an AudioWorklet: control calls between `render` calls
/// take effect at the first frame of the next block.
#[wasm_bindgen]
pub struct WasmSynth {
    engine: SynthEngine,
    presets: FactoryPresets,
    left: Vec<f32>,
    right: Vec<f32>,
}

#[wasm_bindgen]
impl WasmSynth {
    #[wasm_bindgen(constructor)]
    pub fn new(sample_rate: f64) -> Result<WasmSynth, JsValue> {
        let config = EngineConfig::default().with_sample_rate(sample_rate);
        let mut engine = SynthEngine::with_config(config);
        engine.set_sample_rate(sample_rate).map_err(js_error)?;
        engine.allocate_render_resources().map_err(js_error)?;
        let presets = FactoryPresets::builtin().map_err(js_error)?;
        let frames = engine.config().max_frames_per_render;
        Ok(WasmSynth {
            engine,
            presets,
            left: vec![0.0; frames],
            right: vec![0.0; frames],
        })
    }

    pub fn allocate(&mut self) -> Result<(), JsValue> {
        self.engine.allocate_render_resources().map_err(js_error)
    }

    pub fn deallocate(&mut self) {
        self.engine.deallocate_render_resources();
    }

    #[wasm_bindgen(js_name = setParameter)]
    pub fn set_parameter(&mut self, address: u32, value: f32) -> Result<(), JsValue> {
        self.engine
            .set_parameter(address as u64, value)
            .map_err(js_error)
    }

    #[wasm_bindgen(js_name = getParameter)]
    pub fn get_parameter(&self, address: u32) -> Result<f32, JsValue> {
        self.engine.get_parameter(address as u64).map_err(js_error)
    }

    #[wasm_bindgen(js_name = startRamp)]
    pub fn start_ramp(
        &mut self,
        address: u32,
        target: f32,
        duration_frames: u32,
    ) -> Result<(), JsValue> {
        self.engine
            .start_ramp(address as u64, target, duration_frames)
            .map_err(js_error)
    }

    #[wasm_bindgen(js_name = noteOn)]
    pub fn note_on(&mut self, note: u8, velocity: u8) {
        self.engine.handle_note_event(note, velocity, true);
    }

    #[wasm_bindgen(js_name = noteOff)]
    pub fn note_off(&mut self, note: u8) {
        self.engine.handle_note_event(note, 0, false);
    }

    #[wasm_bindgen(js_name = loadPreset)]
    pub fn load_preset(&mut self, index: i32) -> Result<(), JsValue> {
        let preset = self.presets.get(index).map_err(js_error)?;
        self.engine.apply_preset(preset);
        Ok(())
    }

    /// Render `frames` frames, interleaved stereo.
    pub fn render(&mut self, frames: usize) -> Vec<f32> {
        self.render_block(frames, &[])
    }

    /// Render `frames` frames with a JSON list of events timed relative to
    /// the first frame (see `dsp::event::parse_events`).
    #[wasm_bindgen(js_name = renderEvents)]
    pub fn render_events(&mut self, frames: usize, events_json: &str) -> Result<Vec<f32>, JsValue> {
        let events = dsp::event::parse_events(events_json).map_err(js_error)?;
        Ok(self.render_block(frames, &events))
    }
}

impl WasmSynth {
    fn render_block(&mut self, frames: usize, events: &[Event]) -> Vec<f32> {
        if self.left.len() < frames {
            self.left.resize(frames, 0.0);
            self.right.resize(frames, 0.0);
        }
        self.engine.render(
            frames,
            &mut self.left[..frames],
            &mut self.right[..frames],
            events,
        );
        self.left[..frames]
            .iter()
            .zip(&self.right[..frames])
            .flat_map(|(&l, &r)| [l, r])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamId;

    #[test]
    fn version_matches_cargo() {
        assert_eq!(core_version(), env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn wasm_synth_renders_interleaved() {
        let mut synth = WasmSynth::new(48000.0).unwrap();
        synth.load_preset(0).unwrap();
        assert_eq!(
            synth
                .get_parameter(ParamId::Osc1Range.address() as u32)
                .unwrap(),
            3.0
        );

        let silent = synth.render(32);
        assert_eq!(silent.len(), 64);
        assert!(silent.iter().all(|&s| s == 0.0));

        synth.note_on(69, 127);
        let out = synth.render(1024);
        assert_eq!(out.len(), 2048);
        assert!(out.chunks(2).all(|f| f[0] == f[1]), "mono voice, equal channels");
        assert!(out.iter().any(|&s| s != 0.0));

        synth.note_off(69);
        assert!(synth.render(16).iter().all(|&s| s == 0.0));
    }

    #[test]
    fn deallocated_synth_is_silent() {
        let mut synth = WasmSynth::new(44100.0).unwrap();
        synth.note_on(60, 100);
        synth.deallocate();
        assert!(synth.render(64).iter().all(|&s| s == 0.0));
        synth.allocate().unwrap();
        synth.note_on(60, 100);
        assert!(synth.render(64).iter().any(|&s| s != 0.0));
    }

    #[test]
    fn timed_events_through_facade() {
        let mut synth = WasmSynth::new(44100.0).unwrap();
        let out = synth
            .render_events(
                32,
                r#"[{"frameOffset": 8, "type": "noteOn", "note": 72, "velocity": 100},
                    {"frameOffset": 20, "type": "noteOff", "note": 72}]"#,
            )
            .unwrap();
        assert_eq!(out.len(), 64);
        // Interleaved: frame n is out[2n], out[2n + 1].
        assert!(out[..16].iter().all(|&s| s == 0.0));
        assert!(out[16] != 0.0);
        assert!(out[40..].iter().all(|&s| s == 0.0));

        // Offsets past the block carry into the next one.
        let out = synth
            .render_events(8, r#"[{"frameOffset": 12, "type": "noteOn", "note": 60, "velocity": 90}]"#)
            .unwrap();
        assert!(out.iter().all(|&s| s == 0.0));
        let out = synth.render(8);
        assert!(out[..8].iter().all(|&s| s == 0.0));
        assert!(out[8] != 0.0);
    }
}
