//! Factory presets: named parameter snapshots keyed by identifier.
//!
//! The bundled set lives in `presets/factory.json`:
//!
//! ```json
//! { "defaultPresetIndex": 0,
//!   "presets": [{ "index": 0, "name": "Init", "params": { "osc1Range": 3 } }] }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dsp::engine::SynthEngine;
use crate::error::{SynthError, SynthResult};
use crate::params::PARAMETERS;

const FACTORY_PRESETS_JSON: &str = include_str!("../presets/factory.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub index: i32,
    pub name: String,
    /// Parameter identifier → value. Parameters not named keep their
    /// current value when the preset is applied.
    #[serde(default)]
    pub params: BTreeMap<String, f32>,
}

impl Preset {
    pub fn new(index: i32, name: &str) -> Self {
        Preset {
            index,
            name: name.to_string(),
            params: BTreeMap::new(),
        }
    }

    /// Snapshot every parameter of `engine`.
    pub fn from_engine(index: i32, name: &str, engine: &SynthEngine) -> Self {
        let mut preset = Preset::new(index, name);
        for def in PARAMETERS.iter() {
            if let Ok(value) = engine.get_parameter(def.address) {
                preset.params.insert(def.identifier.to_string(), value);
            }
        }
        preset
    }

    pub fn value_for(&self, identifier: &str) -> Option<f32> {
        self.params.get(identifier).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactoryPresets {
    pub default_preset_index: i32,
    pub presets: Vec<Preset>,
}

impl FactoryPresets {
    /// The presets bundled with the crate.
    pub fn builtin() -> SynthResult<Self> {
        Self::from_json(FACTORY_PRESETS_JSON)
    }

    pub fn from_json(json: &str) -> SynthResult<Self> {
        let presets: FactoryPresets = serde_json::from_str(json)?;
        log::debug!("loaded {} factory presets", presets.presets.len());
        Ok(presets)
    }

    pub fn get(&self, index: i32) -> SynthResult<&Preset> {
        self.presets
            .iter()
            .find(|p| p.index == index)
            .ok_or(SynthError::UnknownPreset(index))
    }

    pub fn default_preset(&self) -> SynthResult<&Preset> {
        self.get(self.default_preset_index)
    }

    /// All presets, ordered by index.
    pub fn all(&self) -> Vec<&Preset> {
        let mut all: Vec<&Preset> = self.presets.iter().collect();
        all.sort_by_key(|p| p.index);
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{ParamId, parameter_by_identifier};

    #[test]
    fn builtin_presets_parse() {
        let factory = FactoryPresets::builtin().unwrap();
        assert!(!factory.presets.is_empty());
        assert_eq!(factory.default_preset().unwrap().name, "Init");
    }

    #[test]
    fn builtin_presets_are_in_range() {
        let factory = FactoryPresets::builtin().unwrap();
        for preset in &factory.presets {
            for (identifier, &value) in &preset.params {
                let def = parameter_by_identifier(identifier)
                    .unwrap_or_else(|| panic!("{}: unknown '{identifier}'", preset.name));
                assert!(
                    (def.min..=def.max).contains(&value),
                    "{}: {identifier} = {value} outside [{}, {}]",
                    preset.name,
                    def.min,
                    def.max
                );
            }
        }
    }

    #[test]
    fn lookup_by_index() {
        let factory = FactoryPresets::from_json(
            r#"{"defaultPresetIndex": 7, "presets": [
                {"index": 9, "name": "B", "params": {"osc2Detune": 5}},
                {"index": 7, "name": "A"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(factory.default_preset().unwrap().name, "A");
        assert_eq!(factory.get(9).unwrap().value_for("osc2Detune"), Some(5.0));
        assert_eq!(factory.get(9).unwrap().value_for("osc1Range"), None);
        assert!(matches!(factory.get(3), Err(SynthError::UnknownPreset(3))));

        let order: Vec<i32> = factory.all().iter().map(|p| p.index).collect();
        assert_eq!(order, vec![7, 9]);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            FactoryPresets::from_json(r#"{"presets": 3}"#),
            Err(SynthError::Json(_))
        ));
    }

    #[test]
    fn snapshot_and_restore() {
        let mut engine = SynthEngine::new(44100.0);
        engine.allocate_render_resources().unwrap();
        engine
            .set_parameter(ParamId::Osc2Detune.address(), -30.0)
            .unwrap();
        engine
            .set_parameter(ParamId::Osc1Waveform.address(), 4.0)
            .unwrap();
        let snapshot = Preset::from_engine(100, "Mine", &engine);
        assert_eq!(snapshot.params.len(), PARAMETERS.len());
        assert_eq!(snapshot.value_for("osc2Detune"), Some(-30.0));

        engine.allocate_render_resources().unwrap();
        assert_eq!(engine.params().get(ParamId::Osc2Detune), 0.0);
        engine.apply_preset(&snapshot);
        assert_eq!(engine.params().get(ParamId::Osc2Detune), -30.0);
        assert_eq!(engine.params().get(ParamId::Osc1Waveform), 4.0);
    }

    #[test]
    fn factory_preset_drives_the_voice() {
        let factory = FactoryPresets::builtin().unwrap();
        let mut engine = SynthEngine::new(44100.0);
        engine.allocate_render_resources().unwrap();
        engine.apply_preset(factory.get(3).unwrap());
        engine.handle_note_event(69, 127, true);
        // 8' with osc2 a fifth (700 cents) above.
        assert_eq!(engine.voice().osc1_frequency(), 440.0);
        let fifth = 440.0 * 2f64.powf(700.0 / 1200.0);
        assert!((engine.voice().osc2_frequency() - fifth).abs() < 1e-9);
    }
}
