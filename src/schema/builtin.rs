//! Built-in effect schema table
//!
//! Canonical parameter keys, kinds, bounds, options, defaults, and UI hints
//! for the stock effect set. Filter's sub-mode key is `mode`; `type` is
//! reserved for the record-level effect type name.

use crate::model::{SliderStyle, UiHint};
use crate::schema::{ParamSpec, SchemaEntry, SchemaRegistry};

/// Filter mode option tokens, shared with the factory builders
pub const FILTER_MODES: [&str; 3] = ["LowPass", "HighPass", "BandPass"];

/// Panner rule option tokens
pub const PANNER_RULES: [&str; 6] = ["balanced", "linear", "sin3db", "sin4.5db", "sin6db", "square"];

fn slider(min: f64, max: f64, default: f64) -> ParamSpec {
    ParamSpec::number(min, max)
        .with_ui(UiHint::Slider)
        .with_style(SliderStyle::Linear)
        .with_default(default)
}

fn knob(min: f64, max: f64, default: f64) -> ParamSpec {
    ParamSpec::number(min, max)
        .with_ui(UiHint::Slider)
        .with_style(SliderStyle::Rotary)
        .with_default(default)
}

/// Every effect accepts an optional `enabled` toggle
fn with_enabled(entry: SchemaEntry) -> SchemaEntry {
    entry.param("enabled", ParamSpec::boolean().with_default(true))
}

/// Populate `registry` with the stock effect schemas and their aliases
pub fn install(registry: &mut SchemaRegistry) {
    registry.register(with_enabled(
        SchemaEntry::new("Gain")
            .param("gain", slider(0.0, 10.0, 1.0))
            .param("gain_db", slider(-60.0, 12.0, 0.0)),
    ));

    registry.register(with_enabled(
        SchemaEntry::new("Filter")
            .param(
                "mode",
                ParamSpec::options(FILTER_MODES)
                    .required()
                    .with_default("LowPass"),
            )
            .param("frequency", knob(20.0, 20000.0, 1000.0).required())
            .param("q", slider(0.1, 10.0, 0.707)),
    ));

    registry.register(with_enabled(
        SchemaEntry::new("Reverb")
            .param("room_size", knob(0.0, 1.0, 0.5))
            .param("damping", knob(0.0, 1.0, 0.5))
            .param("wet", knob(0.0, 1.0, 0.33))
            .param("dry", knob(0.0, 1.0, 0.4))
            .param("width", knob(0.0, 1.0, 1.0)),
    ));

    registry.register(with_enabled(
        SchemaEntry::new("Delay")
            .param("time", knob(0.0, 4.0, 0.5))
            .param("feedback", knob(0.0, 1.0, 0.3))
            .param("mix", knob(0.0, 1.0, 0.5)),
    ));

    registry.register(with_enabled(
        SchemaEntry::new("Compressor")
            .param("threshold", slider(-60.0, 0.0, -10.0))
            .param("ratio", slider(1.0, 20.0, 4.0))
            .param("attack", knob(0.1, 100.0, 5.0))
            .param("release", knob(10.0, 1000.0, 100.0)),
    ));

    registry.register(with_enabled(
        SchemaEntry::new("Limiter")
            .param("threshold", slider(-60.0, 0.0, -1.0))
            .param("release", knob(10.0, 1000.0, 100.0)),
    ));

    registry.register(with_enabled(
        SchemaEntry::new("Drive").param("drive", knob(0.0, 1.0, 0.0)),
    ));

    registry.register(with_enabled(
        SchemaEntry::new("Chorus")
            .param("rate", knob(0.01, 20.0, 1.0))
            .param("depth", knob(0.0, 1.0, 0.25))
            .param("feedback", knob(-1.0, 1.0, 0.0))
            .param("mix", knob(0.0, 1.0, 0.5))
            .param("delay", knob(1.0, 100.0, 7.0)),
    ));

    registry.register(with_enabled(
        SchemaEntry::new("Phaser")
            .param("rate", knob(0.01, 20.0, 1.0))
            .param("depth", knob(0.0, 1.0, 0.5))
            .param("feedback", knob(-1.0, 1.0, 0.0))
            .param("mix", knob(0.0, 1.0, 0.5))
            .param("centre_frequency", knob(100.0, 5000.0, 1000.0)),
    ));

    registry.register(with_enabled(
        SchemaEntry::new("NoiseGate")
            .param("threshold", slider(-100.0, 0.0, -60.0))
            .param("ratio", slider(1.0, 20.0, 2.0))
            .param("attack", knob(0.1, 100.0, 2.0))
            .param("release", knob(10.0, 1000.0, 100.0)),
    ));

    registry.register(with_enabled(
        SchemaEntry::new("Panner")
            .param("pan", slider(-1.0, 1.0, 0.0))
            .param("rule", ParamSpec::options(PANNER_RULES).with_default("balanced")),
    ));

    registry.alias("EQ", "Filter");
    registry.alias("Distortion", "Drive");
}
