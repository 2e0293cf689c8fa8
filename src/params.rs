//! Parameter description table.
//!
//! Names, units and display strings for every addressable control. The
//! render core only ever sees `(address, min, max, default)` through
//! [`ParameterDef::range`]; everything else here is for hosts and UIs.

use serde::{Deserialize, Serialize};

use crate::error::SynthError;

/// Addressable controls, in address order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParamId {
    Osc1Range = 0,
    Osc1Waveform = 1,
    Osc2Range = 2,
    Osc2Detune = 3,
    Osc2Waveform = 4,
    MixOsc1Volume = 5,
    MixOsc2Volume = 6,
    MixNoiseVolume = 7,
}

pub const PARAM_COUNT: usize = 8;

impl ParamId {
    pub const ALL: [ParamId; PARAM_COUNT] = [
        ParamId::Osc1Range,
        ParamId::Osc1Waveform,
        ParamId::Osc2Range,
        ParamId::Osc2Detune,
        ParamId::Osc2Waveform,
        ParamId::MixOsc1Volume,
        ParamId::MixOsc2Volume,
        ParamId::MixNoiseVolume,
    ];

    pub fn address(self) -> u64 {
        self as u64
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn def(self) -> &'static ParameterDef {
        &PARAMETERS[self.index()]
    }
}

impl TryFrom<u64> for ParamId {
    type Error = SynthError;

    fn try_from(address: u64) -> Result<Self, Self::Error> {
        usize::try_from(address)
            .ok()
            .and_then(|i| ParamId::ALL.get(i).copied())
            .ok_or(SynthError::UnknownParameter(address))
    }
}

/// How a parameter value is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterUnit {
    /// Integer index into `value_strings`.
    Indexed,
    Cents,
    Generic,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDef {
    pub address: u64,
    pub identifier: &'static str,
    pub name: &'static str,
    pub short_name: &'static str,
    pub min: f32,
    pub max: f32,
    pub default: f32,
    pub unit: ParameterUnit,
    #[serde(skip_serializing_if = "no_value_strings")]
    pub value_strings: &'static [&'static str],
}

fn no_value_strings(strings: &&'static [&'static str]) -> bool {
    strings.is_empty()
}

impl ParameterDef {
    /// `(address, min, max, default)`
    pub fn range(&self) -> (u64, f32, f32, f32) {
        (self.address, self.min, self.max, self.default)
    }
}

const RANGE_NAMES: &[&str] = &["LO", "32'", "16'", "8'", "4'", "2'"];
const WAVEFORM_NAMES: &[&str] = &["Triangle", "Ramp", "Sawtooth", "Square", "Pulse1", "Pulse2"];

pub static PARAMETERS: [ParameterDef; PARAM_COUNT] = [
    ParameterDef {
        address: 0,
        identifier: "osc1Range",
        name: "Oscillator 1 Range",
        short_name: "Range",
        min: 0.0,
        max: 5.0,
        default: 0.0,
        unit: ParameterUnit::Indexed,
        value_strings: RANGE_NAMES,
    },
    ParameterDef {
        address: 1,
        identifier: "osc1Waveform",
        name: "Oscillator 1 Waveform",
        short_name: "Waveform",
        min: 0.0,
        max: 5.0,
        default: 0.0,
        unit: ParameterUnit::Indexed,
        value_strings: WAVEFORM_NAMES,
    },
    ParameterDef {
        address: 2,
        identifier: "osc2Range",
        name: "Oscillator 2 Range",
        short_name: "Range",
        min: 0.0,
        max: 5.0,
        default: 0.0,
        unit: ParameterUnit::Indexed,
        value_strings: RANGE_NAMES,
    },
    ParameterDef {
        address: 3,
        identifier: "osc2Detune",
        name: "Oscillator 2 Detune",
        short_name: "Detune",
        min: -1200.0,
        max: 1200.0,
        default: 0.0,
        unit: ParameterUnit::Cents,
        value_strings: &[],
    },
    ParameterDef {
        address: 4,
        identifier: "osc2Waveform",
        name: "Oscillator 2 Waveform",
        short_name: "Waveform",
        min: 0.0,
        max: 5.0,
        default: 0.0,
        unit: ParameterUnit::Indexed,
        value_strings: WAVEFORM_NAMES,
    },
    ParameterDef {
        address: 5,
        identifier: "mixOsc1Volume",
        name: "Mixer Oscillator 1 Volume",
        short_name: "Osc1",
        min: 0.0,
        max: 10.0,
        default: 10.0,
        unit: ParameterUnit::Generic,
        value_strings: &[],
    },
    ParameterDef {
        address: 6,
        identifier: "mixOsc2Volume",
        name: "Mixer Oscillator 2 Volume",
        short_name: "Osc2",
        min: 0.0,
        max: 10.0,
        default: 0.0,
        unit: ParameterUnit::Generic,
        value_strings: &[],
    },
    ParameterDef {
        address: 7,
        identifier: "mixNoiseVolume",
        name: "Mixer Noise Volume",
        short_name: "Noise",
        min: 0.0,
        max: 10.0,
        default: 0.0,
        unit: ParameterUnit::Generic,
        value_strings: &[],
    },
];

pub fn parameter_def(address: u64) -> Option<&'static ParameterDef> {
    ParamId::try_from(address).ok().map(ParamId::def)
}

pub fn parameter_by_identifier(identifier: &str) -> Option<&'static ParameterDef> {
    PARAMETERS.iter().find(|def| def.identifier == identifier)
}

/// Human-readable value: the value string for indexed parameters,
/// two decimals otherwise.
pub fn display_value(address: u64, value: f32) -> Option<String> {
    let def = parameter_def(address)?;
    match def.unit {
        ParameterUnit::Indexed if !def.value_strings.is_empty() => {
            let last = def.value_strings.len() - 1;
            let index = (value.round().max(0.0) as usize).min(last);
            Some(def.value_strings[index].to_string())
        }
        _ => Some(format!("{value:.2}")),
    }
}
