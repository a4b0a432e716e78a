//! Effect descriptor factories
//!
//! Thin sugar over `EffectDescriptor` construction: one constructor per
//! stock effect type, pre-populated with schema-correct defaults. Passing
//! `ui: true` attaches the built-in table's presentation metadata (bounds,
//! hint, style, options) so the result drives a generated control panel;
//! `ui: false` produces bare scalars. Either way the descriptor passes
//! `finalize` against the global registry.

use crate::model::{EffectDescriptor, ParamValue, Parameter, Value};
use crate::schema::SchemaRegistry;

/// Filter response shape, the closed set the built-in Filter schema accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    LowPass,
    HighPass,
    BandPass,
}

impl FilterMode {
    pub fn as_token(&self) -> &'static str {
        match self {
            FilterMode::LowPass => "LowPass",
            FilterMode::HighPass => "HighPass",
            FilterMode::BandPass => "BandPass",
        }
    }
}

impl std::fmt::Display for FilterMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_token())
    }
}

impl From<FilterMode> for Value {
    fn from(mode: FilterMode) -> Self {
        Value::Text(mode.as_token().to_string())
    }
}

/// Parameter carrying the built-in table's presentation metadata. Falls
/// back to a bare scalar for names the table does not declare, which keeps
/// the factories total.
fn rich(effect: &str, name: &str, value: impl Into<Value>) -> ParamValue {
    let value = value.into();
    let spec = SchemaRegistry::global()
        .resolve(effect)
        .and_then(|entry| entry.param_spec(name));
    match spec {
        Some(spec) => {
            let (min, max) = match spec.bounds {
                Some((lo, hi)) => (Some(lo), Some(hi)),
                None => (None, None),
            };
            ParamValue::from_parameter(Parameter::from_parts(
                value,
                spec.ui,
                spec.style,
                min,
                max,
                spec.options.clone(),
            ))
        }
        None => ParamValue::Scalar(value),
    }
}

fn param(effect: &str, name: &str, value: impl Into<Value>, ui: bool) -> ParamValue {
    if ui {
        rich(effect, name, value)
    } else {
        ParamValue::Scalar(value.into())
    }
}

/// Gain stage, in decibels
pub fn gain(db: f64, ui: bool) -> EffectDescriptor {
    EffectDescriptor::new("Gain").with_param("gain_db", param("Gain", "gain_db", db, ui))
}

/// IIR filter with mode, corner frequency, and resonance
pub fn filter(mode: FilterMode, frequency: f64, q: f64, ui: bool) -> EffectDescriptor {
    EffectDescriptor::new("Filter")
        .with_param("mode", param("Filter", "mode", mode, ui))
        .with_param("frequency", param("Filter", "frequency", frequency, ui))
        .with_param("q", param("Filter", "q", q, ui))
}

/// Algorithmic reverb; remaining parameters take their schema defaults
pub fn reverb(room_size: f64, wet: f64) -> EffectDescriptor {
    EffectDescriptor::new("Reverb")
        .with_param("room_size", room_size)
        .with_param("wet", wet)
}

/// Feedback delay; `time` in seconds
pub fn delay(time: f64, feedback: f64, mix: f64) -> EffectDescriptor {
    EffectDescriptor::new("Delay")
        .with_param("time", time)
        .with_param("feedback", feedback)
        .with_param("mix", mix)
}

/// Downward compressor; `threshold` in dB, times in milliseconds
pub fn compressor(threshold: f64, ratio: f64, attack: f64, release: f64) -> EffectDescriptor {
    EffectDescriptor::new("Compressor")
        .with_param("threshold", threshold)
        .with_param("ratio", ratio)
        .with_param("attack", attack)
        .with_param("release", release)
}

/// Brick-wall limiter
pub fn limiter(threshold: f64, release: f64) -> EffectDescriptor {
    EffectDescriptor::new("Limiter")
        .with_param("threshold", threshold)
        .with_param("release", release)
}

/// Waveshaping drive, 0 to 1
pub fn drive(amount: f64) -> EffectDescriptor {
    EffectDescriptor::new("Drive").with_param("drive", amount)
}

/// Chorus; `rate` in Hz
pub fn chorus(rate: f64, depth: f64, mix: f64) -> EffectDescriptor {
    EffectDescriptor::new("Chorus")
        .with_param("rate", rate)
        .with_param("depth", depth)
        .with_param("mix", mix)
}

/// Phaser; `rate` in Hz
pub fn phaser(rate: f64, depth: f64, mix: f64) -> EffectDescriptor {
    EffectDescriptor::new("Phaser")
        .with_param("rate", rate)
        .with_param("depth", depth)
        .with_param("mix", mix)
}

/// Noise gate; `threshold` in dB
pub fn noise_gate(threshold: f64) -> EffectDescriptor {
    EffectDescriptor::new("NoiseGate").with_param("threshold", threshold)
}

/// Stereo panner, -1 (left) to +1 (right)
pub fn panner(pan: f64) -> EffectDescriptor {
    EffectDescriptor::new("Panner").with_param("pan", pan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Chain, SliderStyle, UiHint, ValidationMode};
    use crate::schema::FILTER_MODES;
    use approx::assert_relative_eq;

    fn finalize(descriptor: EffectDescriptor) -> crate::error::Result<()> {
        let mut chain = Chain::new();
        chain.append(descriptor);
        chain.finalize(SchemaRegistry::global(), ValidationMode::Aggregate)
    }

    #[test]
    fn test_all_factories_validate() {
        for descriptor in [
            gain(-6.0, false),
            gain(-6.0, true),
            filter(FilterMode::BandPass, 500.0, 2.0, false),
            filter(FilterMode::BandPass, 500.0, 2.0, true),
            reverb(0.8, 0.5),
            delay(0.25, 0.4, 0.3),
            compressor(-10.0, 4.0, 5.0, 100.0),
            limiter(-0.1, 50.0),
            drive(0.4),
            chorus(1.5, 0.25, 0.5),
            phaser(0.8, 0.5, 0.5),
            noise_gate(-60.0),
            panner(-0.3),
        ] {
            let type_name = descriptor.type_name().to_string();
            finalize(descriptor).unwrap_or_else(|e| panic!("{type_name}: {e}"));
        }
    }

    #[test]
    fn test_gain_ui_metadata_from_schema() {
        let descriptor = gain(-6.0, true);
        let gain_db = descriptor.get("gain_db").unwrap();
        assert_eq!(gain_db.ui(), Some(UiHint::Slider));
        assert_eq!(gain_db.style(), Some(SliderStyle::Linear));
        assert_relative_eq!(gain_db.min().unwrap(), -60.0);
        assert_relative_eq!(gain_db.max().unwrap(), 12.0);
    }

    #[test]
    fn test_gain_without_ui_is_bare() {
        let descriptor = gain(-6.0, false);
        let gain_db = descriptor.get("gain_db").unwrap();
        assert!(matches!(gain_db, ParamValue::Scalar(_)));
        assert_eq!(gain_db.value().as_number(), Some(-6.0));
    }

    #[test]
    fn test_filter_ui_combobox() {
        let descriptor = filter(FilterMode::HighPass, 120.0, 0.707, true);
        let mode = descriptor.get("mode").unwrap();
        assert_eq!(mode.ui(), Some(UiHint::ComboBox));
        assert_eq!(mode.options(), FILTER_MODES.map(String::from).to_vec());
        assert_eq!(mode.value().as_text(), Some("HighPass"));

        let frequency = descriptor.get("frequency").unwrap();
        assert_eq!(frequency.style(), Some(SliderStyle::Rotary));
        assert_relative_eq!(frequency.max().unwrap(), 20000.0);
    }

    #[test]
    fn test_parameter_order_matches_signature() {
        let descriptor = compressor(-10.0, 4.0, 5.0, 100.0);
        let names: Vec<&str> = descriptor.params().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["threshold", "ratio", "attack", "release"]);
    }
}
