//! Integration Tests
//!
//! End-to-end tests for the fxchain document pipeline: decode, finalize,
//! traverse, re-encode.

use pretty_assertions::assert_eq;
use test_case::test_case;

use fxchain::codec::{decode, encode, Syntax};
use fxchain::factory::{self, FilterMode};
use fxchain::model::{Chain, EffectDescriptor, ParamValue, SliderStyle, UiHint, ValidationMode};
use fxchain::schema::SchemaRegistry;
use fxchain::{FxChainError, SchemaError, Value};

/// Helper to decode and finalize a markup document in one step
fn load_markup(text: &str) -> fxchain::Result<Chain> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut chain = decode(text, Syntax::Markup)?;
    chain.finalize(SchemaRegistry::global(), ValidationMode::Aggregate)?;
    Ok(chain)
}

fn failures(err: FxChainError) -> Vec<fxchain::ValidationFailure> {
    match err {
        FxChainError::Invalid { failures } => failures,
        other => panic!("expected Invalid, got {other:?}"),
    }
}

// === End-to-End Document Loading ===

#[test]
fn test_worked_example() {
    let text = "- type: Gain\n  gain_db: {value: -6.0, ui: Slider, style: Rotary}\n- type: Filter\n  mode: LowPass\n  frequency: 1000.0\n";
    let chain = load_markup(text).unwrap();
    assert_eq!(chain.len(), 2);

    let gain = chain.get(0).unwrap();
    assert_eq!(gain.type_name(), "Gain");
    let gain_db = gain.get("gain_db").unwrap();
    assert!(matches!(gain_db, ParamValue::Full(_)));
    assert_eq!(gain_db.value(), &Value::Number(-6.0));
    assert_eq!(gain_db.ui(), Some(UiHint::Slider));
    assert_eq!(gain_db.style(), Some(SliderStyle::Rotary));

    let filter = chain.get(1).unwrap();
    assert_eq!(filter.type_name(), "Filter");
    assert_eq!(
        filter.get("mode").unwrap(),
        &ParamValue::Scalar(Value::Text("LowPass".to_string()))
    );
    assert_eq!(
        filter.get("frequency").unwrap(),
        &ParamValue::Scalar(Value::Number(1000.0))
    );
}

#[test]
fn test_editor_mockup_document() {
    // The canonical sub-mode key is `mode`; otherwise this is the full
    // mockup preset: gain into filter into compressor into limiter.
    let text = "- type: Gain\n  gain: 0.5\n- type: Filter\n  mode: LowPass\n  frequency: 1000.0\n  q: 0.707\n- type: Compressor\n  threshold: -10.0\n  ratio: 4.0\n  attack: 5.0\n  release: 100.0\n- type: Limiter\n  threshold: -0.1\n  release: 50.0\n";
    let chain = load_markup(text).unwrap();
    let order: Vec<&str> = chain.iter().map(|e| e.type_name()).collect();
    assert_eq!(order, vec!["Gain", "Filter", "Compressor", "Limiter"]);
}

#[test]
fn test_parse_and_schema_errors_are_orthogonal() {
    // Syntactically broken: never reaches validation.
    let parse_err = load_markup("- type: Gain\n  gain_db {value}\n").unwrap_err();
    assert!(matches!(parse_err, FxChainError::Parse(_)));

    // Syntactically fine, semantically broken: decode succeeds first.
    let text = "- type: Gain\n  gain_db: 500.0\n";
    assert!(decode(text, Syntax::Markup).is_ok());
    let schema_err = load_markup(text).unwrap_err();
    assert!(matches!(schema_err, FxChainError::Invalid { .. }));
}

// === Validation ===

#[test]
fn test_unknown_effect_type_rejected() {
    let err = load_markup("- type: Unknown\n  amount: 1.0\n").unwrap_err();
    let failures = failures(err);
    assert!(matches!(
        failures[0].error,
        SchemaError::UnknownEffectType { ref type_name } if type_name == "Unknown"
    ));
}

#[test]
fn test_bounds_enforced_from_document_metadata() {
    let text = "- type: Gain\n  gain_db: {value: 20.0, ui: Slider, min: -60.0, max: 12.0}\n";
    let err = load_markup(text).unwrap_err();
    let failures = failures(err);
    assert_eq!(failures.len(), 1);
    assert!(matches!(
        failures[0].error,
        SchemaError::OutOfRange { value, min, max, .. }
            if value == 20.0 && min == -60.0 && max == 12.0
    ));
}

#[test]
fn test_options_enforced_from_document_metadata() {
    let text = "- type: Filter\n  mode: {value: Notch, ui: ComboBox, options: [LowPass, HighPass, BandPass]}\n  frequency: 1000.0\n";
    let err = load_markup(text).unwrap_err();
    let failures = failures(err);
    assert!(matches!(
        failures[0].error,
        SchemaError::InvalidOption { ref value, .. } if value == "Notch"
    ));
}

#[test]
fn test_aggregate_mode_reports_every_field() {
    let text = "- type: Gain\n  gain_db: 500.0\n- type: Filter\n  mode: Notch\n  frequency: 1000.0\n  slope: 24.0\n";
    let err = load_markup(text).unwrap_err();
    let failures = failures(err);
    assert_eq!(failures.len(), 3);
    assert_eq!(failures[0].effect_index, 0);
    assert!(matches!(failures[0].error, SchemaError::OutOfRange { .. }));
    assert!(matches!(failures[1].error, SchemaError::InvalidOption { .. }));
    assert!(matches!(
        failures[2].error,
        SchemaError::UnknownParameter { ref name, .. } if name == "slope"
    ));
}

#[test]
fn test_fail_fast_mode_stops_at_first() {
    let text = "- type: Gain\n  gain_db: 500.0\n- type: Unknown\n";
    let mut chain = decode(text, Syntax::Markup).unwrap();
    let err = chain
        .finalize(SchemaRegistry::global(), ValidationMode::FailFast)
        .unwrap_err();
    assert_eq!(failures(err).len(), 1);
}

#[test]
fn test_missing_required_parameter() {
    let err = load_markup("- type: Filter\n  q: 0.707\n").unwrap_err();
    let failures = failures(err);
    let missing: Vec<&str> = failures
        .iter()
        .filter_map(|f| match &f.error {
            SchemaError::MissingRequiredParameter { name, .. } => Some(name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(missing, vec!["mode", "frequency"]);
}

#[test_case("EQ" ; "filter alias")]
#[test_case("Distortion" ; "drive alias")]
fn test_alias_types_validate(alias: &str) {
    let text = match alias {
        "EQ" => "- type: EQ\n  mode: HighPass\n  frequency: 120.0\n".to_string(),
        _ => "- type: Distortion\n  drive: 0.3\n".to_string(),
    };
    assert!(load_markup(&text).is_ok());
}

// === Round-Trip ===

#[test_case(Syntax::Markup ; "markup")]
#[test_case(Syntax::Structured ; "structured")]
fn test_round_trip_law(syntax: Syntax) {
    let text = "- type: Gain\n  gain_db: {value: -6.0, ui: Slider, style: Rotary, min: -60.0, max: 12.0}\n- type: Filter\n  mode: {value: BandPass, ui: ComboBox, options: [LowPass, HighPass, BandPass]}\n  frequency: 500.0\n  q: 2.0\n- type: Reverb\n  room_size: 0.8\n  wet: 0.5\n  enabled: true\n";
    let chain = load_markup(text).unwrap();

    let encoded = encode(&chain, syntax);
    let decoded = decode(&encoded, syntax).unwrap();
    assert_eq!(decoded.effects(), chain.effects());
}

#[test]
fn test_markup_encoding_is_canonical() {
    let text = "- type: Gain\n  gain_db: {value: -6.0, ui: Slider, style: Rotary}\n- type: Filter\n  mode: LowPass\n  frequency: 1000.0\n";
    let chain = load_markup(text).unwrap();
    assert_eq!(encode(&chain, Syntax::Markup), text);
}

#[test]
fn test_both_syntaxes_decode_to_identical_chain() {
    let markup = "- type: Delay\n  time: 0.25\n  feedback: {value: 0.4, ui: Slider, style: Rotary}\n  mix: 0.3\n";
    let structured = r#"[
  {
    "type": "Delay",
    "time": 0.25,
    "feedback": {"value": 0.4, "ui": "Slider", "style": "Rotary"},
    "mix": 0.3
  }
]"#;
    let a = decode(markup, Syntax::Markup).unwrap();
    let b = decode(structured, Syntax::Structured).unwrap();
    assert_eq!(a.effects(), b.effects());
}

#[test]
fn test_minimal_form_encoding() {
    let mut chain = Chain::new();
    chain.append(EffectDescriptor::new("Gain").with_param("gain_db", -6.0));
    chain
        .finalize(SchemaRegistry::global(), ValidationMode::FailFast)
        .unwrap();
    // A raw scalar encodes bare, not as a nested record.
    assert_eq!(encode(&chain, Syntax::Markup), "- type: Gain\n  gain_db: -6.0\n");
}

// === Order Significance ===

#[test]
fn test_reorder_reflected_in_encoding() {
    let text = "- type: Drive\n  drive: 0.4\n- type: Reverb\n  wet: 0.3\n";
    let mut chain = load_markup(text).unwrap();

    chain.reorder(1, 0).unwrap();
    assert!(chain.is_finalized());
    assert_eq!(
        encode(&chain, Syntax::Markup),
        "- type: Reverb\n  wet: 0.3\n- type: Drive\n  drive: 0.4\n"
    );
}

// === Programmatic Construction ===

#[test]
fn test_builder_chain_matches_generated_document() {
    // The preset-generator scenario: build programmatically, emit both
    // syntaxes, reload each, get the same chain back.
    let mut chain = Chain::new();
    chain.append(factory::gain(-6.0, true));
    chain.append(factory::filter(FilterMode::BandPass, 500.0, 2.0, true));
    chain.append(factory::reverb(0.8, 0.5));
    chain
        .finalize(SchemaRegistry::global(), ValidationMode::Aggregate)
        .unwrap();

    for syntax in [Syntax::Markup, Syntax::Structured] {
        let reloaded = decode(&encode(&chain, syntax), syntax).unwrap();
        assert_eq!(reloaded.effects(), chain.effects());
    }
}

#[test]
fn test_live_edit_one_knob() {
    let mut chain = load_markup("- type: Filter\n  mode: LowPass\n  frequency: 1000.0\n").unwrap();

    chain
        .set_parameter(0, "frequency", 440.0, SchemaRegistry::global())
        .unwrap();
    assert!(chain.is_finalized());

    let err = chain
        .set_parameter(0, "frequency", 99999.0, SchemaRegistry::global())
        .unwrap_err();
    assert!(matches!(
        err,
        FxChainError::Schema(SchemaError::OutOfRange { .. })
    ));
    assert_eq!(
        chain.get(0).unwrap().get("frequency").unwrap().value(),
        &Value::Number(440.0)
    );
}

// === UI Consumption ===

#[test]
fn test_control_generation_from_document() {
    let text = "- type: Gain\n  gain_db: {value: -6.0, ui: Slider, style: Rotary}\n- type: Filter\n  mode: LowPass\n  frequency: 1000.0\n";
    let chain = load_markup(text).unwrap();
    let registry = SchemaRegistry::global();

    let gain_controls = chain.get(0).unwrap().control_info(registry);
    assert_eq!(gain_controls[0].name, "gain_db");
    assert_eq!(gain_controls[0].ui, Some(UiHint::Slider));
    assert_eq!(gain_controls[0].style, Some(SliderStyle::Rotary));
    // Bounds filled from the schema for slider rendering.
    assert_eq!(gain_controls[0].min, Some(-60.0));
    assert_eq!(gain_controls[0].max, Some(12.0));

    let filter_controls = chain.get(1).unwrap().control_info(registry);
    assert_eq!(filter_controls[0].ui, Some(UiHint::ComboBox));
    assert_eq!(
        filter_controls[0].options,
        ["LowPass", "HighPass", "BandPass"]
    );
    assert_eq!(filter_controls[1].min, Some(20.0));
    assert_eq!(filter_controls[1].max, Some(20000.0));
}

#[test]
fn test_snapshot_for_processing_thread() {
    let mut chain = load_markup("- type: Gain\n  gain_db: -6.0\n").unwrap();

    // The audio side reads a finalized snapshot; later edits on the UI
    // side do not show through.
    let snapshot = chain.clone();
    chain
        .set_parameter(0, "gain_db", 0.0, SchemaRegistry::global())
        .unwrap();
    assert_eq!(
        snapshot.get(0).unwrap().get("gain_db").unwrap().value(),
        &Value::Number(-6.0)
    );
    assert!(snapshot.is_finalized());
}
