//! Effect descriptors
//!
//! An effect descriptor is one link of a chain: a type name plus an ordered
//! parameter set. Construction never validates, letting the decoder read
//! whole documents before any semantic check runs; `validate` is an
//! explicit, registry-driven step.

use serde_json::{Map, Value as JsonValue};

use crate::error::{FxChainError, SchemaError, ValidationFailure};
use crate::model::parameter::{ParamValue, SliderStyle, UiHint};
use crate::model::value::Value;
use crate::model::ValidationMode;
use crate::schema::SchemaRegistry;

/// Everything a UI layer needs to derive one control widget: the
/// parameter's own metadata where present, filled in from the schema
/// defaults where not.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlInfo<'a> {
    pub name: &'a str,
    pub value: &'a Value,
    pub ui: Option<UiHint>,
    pub style: Option<SliderStyle>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub options: &'a [String],
}

/// One effect's type name and parameter set, in insertion order
#[derive(Debug, Clone, PartialEq)]
pub struct EffectDescriptor {
    type_name: String,
    params: Vec<(String, ParamValue)>,
}

impl EffectDescriptor {
    /// Create a descriptor with no parameters
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            params: Vec::new(),
        }
    }

    /// Builder-style parameter insertion
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert a parameter, replacing any existing one with the same name.
    /// First insertion fixes the parameter's position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        let name = name.into();
        let value = value.into();
        match self.params.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.params.push((name, value)),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Parameters in insertion order
    pub fn params(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.params.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Validate this descriptor against the registry.
    ///
    /// In fail-fast mode the first failure is returned alone; in aggregate
    /// mode every failing parameter is reported. Standalone validation
    /// reports `effect_index` 0; `Chain::finalize` supplies real positions.
    pub fn validate(
        &self,
        registry: &SchemaRegistry,
        mode: ValidationMode,
    ) -> Result<(), FxChainError> {
        let mut failures = Vec::new();
        self.collect_failures(0, registry, mode, &mut failures);
        if failures.is_empty() {
            Ok(())
        } else {
            Err(FxChainError::Invalid { failures })
        }
    }

    /// Shared failure collection for `validate` and `Chain::finalize`.
    /// Returns `true` when fail-fast mode should stop the caller.
    pub(crate) fn collect_failures(
        &self,
        effect_index: usize,
        registry: &SchemaRegistry,
        mode: ValidationMode,
        failures: &mut Vec<ValidationFailure>,
    ) -> bool {
        let fail = |parameter: Option<&str>, error: SchemaError| ValidationFailure {
            effect_index,
            effect_type: self.type_name.clone(),
            parameter: parameter.map(str::to_string),
            error,
        };

        let entry = match registry.get(&self.type_name) {
            Ok(entry) => entry,
            Err(error) => {
                // Without a schema there is nothing meaningful to say about
                // the parameters; report the type and stop this descriptor.
                failures.push(fail(None, error));
                return mode == ValidationMode::FailFast;
            }
        };

        for (name, value) in &self.params {
            let result = match entry.param_spec(name) {
                Some(spec) => value.validate_against(name, spec),
                None => Err(SchemaError::UnknownParameter {
                    effect: self.type_name.clone(),
                    name: name.clone(),
                }),
            };
            if let Err(error) = result {
                failures.push(fail(Some(name), error));
                if mode == ValidationMode::FailFast {
                    return true;
                }
            }
        }

        for name in entry.required_params() {
            if self.get(name).is_none() {
                failures.push(fail(
                    Some(name),
                    SchemaError::MissingRequiredParameter {
                        effect: self.type_name.clone(),
                        name: name.to_string(),
                    },
                ));
                if mode == ValidationMode::FailFast {
                    return true;
                }
            }
        }

        false
    }

    /// Set one parameter's value, re-validating only the touched field.
    ///
    /// The new value is checked against the schema (and the parameter's own
    /// metadata, when it has any) before being committed; on failure the
    /// descriptor is left untouched. A parameter not yet present is added
    /// as a bare scalar when the schema declares it.
    pub fn set_parameter(
        &mut self,
        name: &str,
        value: impl Into<Value>,
        registry: &SchemaRegistry,
    ) -> Result<(), SchemaError> {
        let value = value.into();
        let entry = registry.get(&self.type_name)?;
        let spec = entry
            .param_spec(name)
            .ok_or_else(|| SchemaError::UnknownParameter {
                effect: self.type_name.clone(),
                name: name.to_string(),
            })?;

        let mut candidate = match self.get(name) {
            Some(existing) => existing.clone(),
            None => ParamValue::Scalar(value.clone()),
        };
        candidate.set_value(value);
        candidate.validate_against(name, spec)?;
        self.insert(name, candidate);
        Ok(())
    }

    /// Control descriptions for every parameter, in insertion order.
    ///
    /// A parameter's own metadata wins; bare scalars inherit the schema's
    /// default hint, style, bounds, and options. Parameters the schema does
    /// not declare (or an unknown effect type) yield bare controls with no
    /// metadata; callers are expected to have finalized the chain first.
    pub fn control_info<'a>(&'a self, registry: &'a SchemaRegistry) -> Vec<ControlInfo<'a>> {
        let entry = registry.resolve(&self.type_name);
        self.params
            .iter()
            .map(|(name, value)| {
                let spec = entry.and_then(|e| e.param_spec(name));
                let (spec_min, spec_max) = match spec.and_then(|s| s.bounds) {
                    Some((lo, hi)) => (Some(lo), Some(hi)),
                    None => (None, None),
                };
                let options = if !value.options().is_empty() {
                    value.options()
                } else {
                    spec.map(|s| s.options.as_slice()).unwrap_or(&[])
                };
                ControlInfo {
                    name,
                    value: value.value(),
                    ui: value.ui().or_else(|| spec.and_then(|s| s.ui)),
                    style: value.style().or_else(|| spec.and_then(|s| s.style)),
                    min: value.min().or(spec_min),
                    max: value.max().or(spec_max),
                    options,
                }
            })
            .collect()
    }

    /// Encode as a JSON record: `type` first, then parameters in order
    pub fn to_json(&self) -> JsonValue {
        let mut map = Map::new();
        map.insert("type".to_string(), JsonValue::from(self.type_name.as_str()));
        for (name, value) in &self.params {
            map.insert(name.clone(), value.to_json());
        }
        JsonValue::Object(map)
    }

    /// Decode from a JSON record. The `type` key is required and never
    /// becomes a parameter; remaining keys keep their document order.
    pub fn from_json(json: &JsonValue) -> Result<Self, String> {
        let record = match json {
            JsonValue::Object(map) => map,
            _ => return Err("effect record must be a mapping".to_string()),
        };

        let type_name = match record.get("type") {
            Some(JsonValue::String(name)) => name.clone(),
            Some(_) => return Err("effect record key 'type' must be a string".to_string()),
            None => return Err("effect record is missing the 'type' key".to_string()),
        };

        let mut descriptor = EffectDescriptor::new(type_name);
        for (key, node) in record {
            if key == "type" {
                continue;
            }
            let value = ParamValue::from_json(node)
                .map_err(|e| format!("parameter '{}': {}", key, e))?;
            descriptor.insert(key.clone(), value);
        }
        Ok(descriptor)
    }
}
