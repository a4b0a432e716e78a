//! Parameters and their UI-presentation metadata
//!
//! A parameter is either a bare scalar (`frequency: 1000.0`) or a full
//! record carrying presentation metadata (`gain_db: {value: -6.0, ui:
//! Slider, style: Rotary}`). Metadata is validated, never trusted: the
//! decoder stores whatever the document said, and `validate_against`
//! reports conflicts when the chain is finalized. The programmatic builder
//! rejects the same conflicts up front.

use std::fmt;

use serde_json::{Map, Value as JsonValue};

use crate::error::SchemaError;
use crate::model::value::{Value, ValueKind};
use crate::schema::ParamSpec;

/// Presentation affordance for a parameter. Absence means the parameter is
/// not exposed in a generated UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiHint {
    Slider,
    Rotary,
    ComboBox,
    Toggle,
}

impl UiHint {
    /// Parse a document token. Tokens are case-sensitive; the grammar treats
    /// `ui` as a closed enum.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "Slider" => Some(UiHint::Slider),
            "Rotary" => Some(UiHint::Rotary),
            "ComboBox" => Some(UiHint::ComboBox),
            "Toggle" => Some(UiHint::Toggle),
            _ => None,
        }
    }

    pub fn as_token(&self) -> &'static str {
        match self {
            UiHint::Slider => "Slider",
            UiHint::Rotary => "Rotary",
            UiHint::ComboBox => "ComboBox",
            UiHint::Toggle => "Toggle",
        }
    }
}

impl fmt::Display for UiHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_token())
    }
}

/// Track shape for a slider control. Only meaningful with `UiHint::Slider`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliderStyle {
    Linear,
    Rotary,
}

impl SliderStyle {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "Linear" => Some(SliderStyle::Linear),
            "Rotary" => Some(SliderStyle::Rotary),
            _ => None,
        }
    }

    pub fn as_token(&self) -> &'static str {
        match self {
            SliderStyle::Linear => "Linear",
            SliderStyle::Rotary => "Rotary",
        }
    }
}

impl fmt::Display for SliderStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_token())
    }
}

/// A tunable value plus optional bounds, option list, and UI hints
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    value: Value,
    ui: Option<UiHint>,
    style: Option<SliderStyle>,
    min: Option<f64>,
    max: Option<f64>,
    options: Vec<String>,
}

impl Parameter {
    /// Start building a parameter programmatically. `build()` fails on
    /// conflicting metadata, so a constructed `Parameter` is always
    /// internally consistent.
    pub fn builder(value: impl Into<Value>) -> ParameterBuilder {
        ParameterBuilder {
            inner: Parameter {
                value: value.into(),
                ui: None,
                style: None,
                min: None,
                max: None,
                options: Vec::new(),
            },
        }
    }

    /// Unchecked construction, reserved for the decoder: a document may
    /// carry conflicting metadata and must still decode, with the conflict
    /// reported later by validation.
    pub(crate) fn from_parts(
        value: Value,
        ui: Option<UiHint>,
        style: Option<SliderStyle>,
        min: Option<f64>,
        max: Option<f64>,
        options: Vec<String>,
    ) -> Self {
        Self {
            value,
            ui,
            style,
            min,
            max,
            options,
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn ui(&self) -> Option<UiHint> {
        self.ui
    }

    pub fn style(&self) -> Option<SliderStyle> {
        self.style
    }

    pub fn min(&self) -> Option<f64> {
        self.min
    }

    pub fn max(&self) -> Option<f64> {
        self.max
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub(crate) fn set_value(&mut self, value: Value) {
        self.value = value;
    }

    /// True when any presentation or validity metadata is present
    pub fn has_metadata(&self) -> bool {
        self.ui.is_some()
            || self.style.is_some()
            || self.min.is_some()
            || self.max.is_some()
            || !self.options.is_empty()
    }

    /// First metadata conflict, if any. Shared by the builder and by
    /// validation so both paths agree on what "conflicting" means.
    fn metadata_conflict(&self) -> Option<String> {
        if (self.min.is_some() || self.max.is_some()) && !self.options.is_empty() {
            return Some("numeric bounds and an option list are mutually exclusive".to_string());
        }
        if self.style.is_some() && self.ui != Some(UiHint::Slider) {
            return Some("style requires ui: Slider".to_string());
        }
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min > max {
                return Some(format!("min {} exceeds max {}", min, max));
            }
        }
        if !self.options.is_empty() && self.ui != Some(UiHint::ComboBox) {
            return Some("an option list requires ui: ComboBox".to_string());
        }
        if (self.min.is_some() || self.max.is_some()) && self.value.kind() != ValueKind::Number {
            return Some("numeric bounds on a non-numeric value".to_string());
        }
        if !self.options.is_empty() && self.value.kind() != ValueKind::Text {
            return Some("an option list on a non-text value".to_string());
        }
        None
    }

    /// Validate this parameter against its schema entry.
    ///
    /// Checks run in order: metadata conflicts, value kind, range (the
    /// parameter's own bounds when present, otherwise the schema defaults),
    /// option membership (same precedence). `name` is only used for error
    /// reporting.
    pub fn validate_against(&self, name: &str, spec: &ParamSpec) -> Result<(), SchemaError> {
        if let Some(reason) = self.metadata_conflict() {
            return Err(SchemaError::ConflictingMetadata {
                name: name.to_string(),
                reason,
            });
        }

        if self.value.kind() != spec.kind {
            return Err(SchemaError::TypeMismatch {
                name: name.to_string(),
                expected: spec.kind,
                found: self.value.kind(),
            });
        }

        if let Value::Number(n) = self.value {
            let min = self.min.or(spec.bounds.map(|(lo, _)| lo));
            let max = self.max.or(spec.bounds.map(|(_, hi)| hi));
            if let (Some(lo), Some(hi)) = (min, max) {
                if n < lo || n > hi {
                    return Err(SchemaError::OutOfRange {
                        name: name.to_string(),
                        value: n,
                        min: lo,
                        max: hi,
                    });
                }
            }
        }

        if let Value::Text(ref text) = self.value {
            let options: &[String] = if !self.options.is_empty() {
                &self.options
            } else {
                &spec.options
            };
            if !options.is_empty() && !options.iter().any(|o| o == text) {
                return Err(SchemaError::InvalidOption {
                    name: name.to_string(),
                    value: text.clone(),
                    options: options.to_vec(),
                });
            }
        }

        Ok(())
    }

    /// Canonical minimal mapping: `value` plus only the metadata keys that
    /// are actually present.
    pub fn to_json(&self) -> JsonValue {
        let mut map = Map::new();
        map.insert("value".to_string(), self.value.to_json());
        if let Some(ui) = self.ui {
            map.insert("ui".to_string(), JsonValue::from(ui.as_token()));
        }
        if let Some(style) = self.style {
            map.insert("style".to_string(), JsonValue::from(style.as_token()));
        }
        if let Some(min) = self.min {
            map.insert("min".to_string(), JsonValue::from(min));
        }
        if let Some(max) = self.max {
            map.insert("max".to_string(), JsonValue::from(max));
        }
        if !self.options.is_empty() {
            map.insert(
                "options".to_string(),
                JsonValue::from(self.options.clone()),
            );
        }
        JsonValue::Object(map)
    }
}

/// Builder for programmatic `Parameter` construction
#[derive(Debug, Clone)]
pub struct ParameterBuilder {
    inner: Parameter,
}

impl ParameterBuilder {
    pub fn ui(mut self, ui: UiHint) -> Self {
        self.inner.ui = Some(ui);
        self
    }

    pub fn style(mut self, style: SliderStyle) -> Self {
        self.inner.style = Some(style);
        self
    }

    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.inner.min = Some(min);
        self.inner.max = Some(max);
        self
    }

    pub fn options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inner.options = options.into_iter().map(Into::into).collect();
        self
    }

    /// Finish construction, rejecting conflicting metadata
    pub fn build(self) -> Result<Parameter, SchemaError> {
        if let Some(reason) = self.inner.metadata_conflict() {
            return Err(SchemaError::ConflictingMetadata {
                name: "<unnamed>".to_string(),
                reason,
            });
        }
        Ok(self.inner)
    }
}

/// A named parameter slot inside an effect descriptor: either a bare scalar
/// or a full parameter record.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Bare scalar with no UI metadata, e.g. `frequency: 1000.0`
    Scalar(Value),
    /// Structured record, e.g. `{value: -6.0, ui: Slider, style: Rotary}`
    Full(Parameter),
}

impl ParamValue {
    /// Wrap a parameter, collapsing metadata-free records to bare scalars.
    /// The collapse keeps minimal-form encoding structurally round-trippable.
    pub fn from_parameter(parameter: Parameter) -> Self {
        if parameter.has_metadata() {
            ParamValue::Full(parameter)
        } else {
            ParamValue::Scalar(parameter.value)
        }
    }

    pub fn value(&self) -> &Value {
        match self {
            ParamValue::Scalar(v) => v,
            ParamValue::Full(p) => p.value(),
        }
    }

    pub fn ui(&self) -> Option<UiHint> {
        match self {
            ParamValue::Scalar(_) => None,
            ParamValue::Full(p) => p.ui(),
        }
    }

    pub fn style(&self) -> Option<SliderStyle> {
        match self {
            ParamValue::Scalar(_) => None,
            ParamValue::Full(p) => p.style(),
        }
    }

    pub fn min(&self) -> Option<f64> {
        match self {
            ParamValue::Scalar(_) => None,
            ParamValue::Full(p) => p.min(),
        }
    }

    pub fn max(&self) -> Option<f64> {
        match self {
            ParamValue::Scalar(_) => None,
            ParamValue::Full(p) => p.max(),
        }
    }

    pub fn options(&self) -> &[String] {
        match self {
            ParamValue::Scalar(_) => &[],
            ParamValue::Full(p) => p.options(),
        }
    }

    pub(crate) fn set_value(&mut self, value: Value) {
        match self {
            ParamValue::Scalar(v) => *v = value,
            ParamValue::Full(p) => p.set_value(value),
        }
    }

    /// Validate against a schema entry. Bare scalars check kind and the
    /// schema's default bounds/options; full records additionally check
    /// their own metadata.
    pub fn validate_against(&self, name: &str, spec: &ParamSpec) -> Result<(), SchemaError> {
        match self {
            ParamValue::Scalar(value) => {
                if value.kind() != spec.kind {
                    return Err(SchemaError::TypeMismatch {
                        name: name.to_string(),
                        expected: spec.kind,
                        found: value.kind(),
                    });
                }
                if let Value::Number(n) = value {
                    if let Some((lo, hi)) = spec.bounds {
                        if *n < lo || *n > hi {
                            return Err(SchemaError::OutOfRange {
                                name: name.to_string(),
                                value: *n,
                                min: lo,
                                max: hi,
                            });
                        }
                    }
                }
                if let Value::Text(text) = value {
                    if !spec.options.is_empty() && !spec.options.iter().any(|o| o == text) {
                        return Err(SchemaError::InvalidOption {
                            name: name.to_string(),
                            value: text.clone(),
                            options: spec.options.clone(),
                        });
                    }
                }
                Ok(())
            }
            ParamValue::Full(parameter) => parameter.validate_against(name, spec),
        }
    }

    /// Minimal-form JSON: a bare scalar for `Scalar`, a record for `Full`
    pub fn to_json(&self) -> JsonValue {
        match self {
            ParamValue::Scalar(value) => value.to_json(),
            ParamValue::Full(parameter) => parameter.to_json(),
        }
    }

    /// Decode from a JSON node. Scalars become `Scalar`; objects must carry
    /// a scalar `value` key and may carry `ui`, `style`, `min`, `max`,
    /// `options`. Unrecognized object keys are ignored; unrecognized enum
    /// tokens and ill-typed metadata are errors. The error string carries no
    /// position; the codec attaches context.
    pub fn from_json(json: &JsonValue) -> Result<Self, String> {
        if let Some(value) = Value::from_json(json) {
            return Ok(ParamValue::Scalar(value));
        }

        let record = match json {
            JsonValue::Object(map) => map,
            _ => return Err("parameter value must be a scalar or a record".to_string()),
        };

        let value = match record.get("value") {
            Some(v) => Value::from_json(v)
                .ok_or_else(|| "parameter record key 'value' must be a scalar".to_string())?,
            None => return Err("parameter record is missing the 'value' key".to_string()),
        };

        let ui = match record.get("ui") {
            Some(JsonValue::String(token)) => Some(
                UiHint::from_token(token)
                    .ok_or_else(|| format!("unknown ui hint '{}'", token))?,
            ),
            Some(_) => return Err("parameter record key 'ui' must be a string".to_string()),
            None => None,
        };

        let style = match record.get("style") {
            Some(JsonValue::String(token)) => Some(
                SliderStyle::from_token(token)
                    .ok_or_else(|| format!("unknown style '{}'", token))?,
            ),
            Some(_) => return Err("parameter record key 'style' must be a string".to_string()),
            None => None,
        };

        let min = match record.get("min") {
            Some(v) => Some(
                v.as_f64()
                    .ok_or_else(|| "parameter record key 'min' must be a number".to_string())?,
            ),
            None => None,
        };

        let max = match record.get("max") {
            Some(v) => Some(
                v.as_f64()
                    .ok_or_else(|| "parameter record key 'max' must be a number".to_string())?,
            ),
            None => None,
        };

        let options = match record.get("options") {
            Some(JsonValue::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        "parameter record key 'options' must be a list of strings".to_string()
                    })
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => {
                return Err("parameter record key 'options' must be a list of strings".to_string())
            }
            None => Vec::new(),
        };

        Ok(ParamValue::from_parameter(Parameter::from_parts(
            value, ui, style, min, max, options,
        )))
    }
}

impl From<Value> for ParamValue {
    fn from(value: Value) -> Self {
        ParamValue::Scalar(value)
    }
}

impl From<f64> for ParamValue {
    fn from(n: f64) -> Self {
        ParamValue::Scalar(Value::Number(n))
    }
}

impl From<i32> for ParamValue {
    fn from(n: i32) -> Self {
        ParamValue::Scalar(Value::Number(n as f64))
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Scalar(Value::Text(s.to_string()))
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Scalar(Value::Text(s))
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        ParamValue::Scalar(Value::Bool(b))
    }
}

impl From<Parameter> for ParamValue {
    fn from(parameter: Parameter) -> Self {
        ParamValue::from_parameter(parameter)
    }
}
