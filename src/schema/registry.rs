//! Effect schema registry
//!
//! The registry is the authority on which effect types exist, which
//! parameters each one accepts, and what a parameter's kind, bounds,
//! options, and UI presentation look like when the document does not say.
//! It is populated once and shared read-only afterwards; validation and the
//! UI layer both consult the same table.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::error::SchemaError;
use crate::model::{SliderStyle, UiHint, Value, ValueKind};
use crate::schema::builtin;

/// Declaration of a single allowed parameter within an effect schema
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    /// Expected value kind; anything else is a type mismatch.
    pub kind: ValueKind,
    /// Whether the parameter must be present in a valid descriptor.
    pub required: bool,
    /// Default numeric bounds, used when a parameter carries none itself.
    pub bounds: Option<(f64, f64)>,
    /// Default option list for enum-valued parameters.
    pub options: Vec<String>,
    /// Default presentation when a control is generated for a bare scalar.
    pub ui: Option<UiHint>,
    pub style: Option<SliderStyle>,
    /// Value used by the factory builders when the caller does not supply one.
    pub default: Option<Value>,
}

impl ParamSpec {
    /// Numeric parameter with default bounds
    pub fn number(min: f64, max: f64) -> Self {
        Self {
            kind: ValueKind::Number,
            required: false,
            bounds: Some((min, max)),
            options: Vec::new(),
            ui: None,
            style: None,
            default: None,
        }
    }

    /// Enum-valued text parameter with its option list
    pub fn options<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: ValueKind::Text,
            required: false,
            bounds: None,
            options: options.into_iter().map(Into::into).collect(),
            ui: Some(UiHint::ComboBox),
            style: None,
            default: None,
        }
    }

    /// Boolean parameter
    pub fn boolean() -> Self {
        Self {
            kind: ValueKind::Bool,
            required: false,
            bounds: None,
            options: Vec::new(),
            ui: Some(UiHint::Toggle),
            style: None,
            default: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_ui(mut self, ui: UiHint) -> Self {
        self.ui = Some(ui);
        self
    }

    pub fn with_style(mut self, style: SliderStyle) -> Self {
        self.style = Some(style);
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// Schema for one effect type: its canonical name and allowed parameters
/// in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaEntry {
    type_name: String,
    params: Vec<(String, ParamSpec)>,
}

impl SchemaEntry {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            params: Vec::new(),
        }
    }

    /// Declare a parameter. Declaration order is the order the factory
    /// builders and UI generation walk the parameters in.
    pub fn param(mut self, name: impl Into<String>, spec: ParamSpec) -> Self {
        self.params.push((name.into(), spec));
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn param_spec(&self, name: &str) -> Option<&ParamSpec> {
        self.params
            .iter()
            .find(|(param_name, _)| param_name == name)
            .map(|(_, spec)| spec)
    }

    pub fn params(&self) -> impl Iterator<Item = (&str, &ParamSpec)> {
        self.params
            .iter()
            .map(|(name, spec)| (name.as_str(), spec))
    }

    /// Names of parameters that must be present in a valid descriptor
    pub fn required_params(&self) -> impl Iterator<Item = &str> {
        self.params
            .iter()
            .filter(|(_, spec)| spec.required)
            .map(|(name, _)| name.as_str())
    }
}

/// Registry of effect schemas
pub struct SchemaRegistry {
    entries: HashMap<String, SchemaEntry>,
    aliases: HashMap<String, String>,
}

impl SchemaRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            aliases: HashMap::new(),
        }
    }

    /// Create a registry with the built-in stock effect table
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        builtin::install(&mut registry);
        registry
    }

    /// The process-wide built-in registry, initialized on first use and
    /// immutable afterwards.
    pub fn global() -> &'static SchemaRegistry {
        static GLOBAL: OnceLock<SchemaRegistry> = OnceLock::new();
        GLOBAL.get_or_init(SchemaRegistry::with_builtin)
    }

    /// Register an effect schema under its canonical type name
    pub fn register(&mut self, entry: SchemaEntry) {
        self.entries.insert(entry.type_name.clone(), entry);
    }

    /// Register an alternate spelling for an existing canonical type name
    pub fn alias(&mut self, alias: impl Into<String>, canonical: impl Into<String>) {
        self.aliases.insert(alias.into(), canonical.into());
    }

    /// Look up a schema by type name, resolving aliases
    pub fn get(&self, type_name: &str) -> Result<&SchemaEntry, SchemaError> {
        self.resolve(type_name)
            .ok_or_else(|| SchemaError::UnknownEffectType {
                type_name: type_name.to_string(),
            })
    }

    /// Like `get`, but returns `None` instead of an error
    pub fn resolve(&self, type_name: &str) -> Option<&SchemaEntry> {
        if let Some(entry) = self.entries.get(type_name) {
            return Some(entry);
        }
        self.aliases
            .get(type_name)
            .and_then(|canonical| self.entries.get(canonical))
    }

    /// Check if a type name (or alias) is registered
    pub fn has_effect(&self, type_name: &str) -> bool {
        self.resolve(type_name).is_some()
    }

    /// List all canonical effect type names, sorted
    pub fn list_effect_types(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_registry() {
        let registry = SchemaRegistry::new();
        assert!(!registry.has_effect("Gain"));
        assert!(matches!(
            registry.get("Gain"),
            Err(SchemaError::UnknownEffectType { .. })
        ));
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = SchemaRegistry::new();
        registry.register(
            SchemaEntry::new("Bitcrusher")
                .param("depth", ParamSpec::number(1.0, 16.0).with_default(8.0)),
        );
        let entry = registry.get("Bitcrusher").unwrap();
        assert_eq!(entry.type_name(), "Bitcrusher");
        assert!(entry.param_spec("depth").is_some());
        assert!(entry.param_spec("rate").is_none());
    }

    #[test]
    fn test_alias_resolution() {
        let mut registry = SchemaRegistry::new();
        registry.register(SchemaEntry::new("Drive").param("drive", ParamSpec::number(0.0, 1.0)));
        registry.alias("Distortion", "Drive");
        assert_eq!(registry.get("Distortion").unwrap().type_name(), "Drive");
    }

    #[test]
    fn test_required_params() {
        let entry = SchemaEntry::new("Filter")
            .param("mode", ParamSpec::options(["LowPass"]).required())
            .param("q", ParamSpec::number(0.1, 10.0));
        let required: Vec<&str> = entry.required_params().collect();
        assert_eq!(required, vec!["mode"]);
    }

    #[test]
    fn test_global_is_shared() {
        let a = SchemaRegistry::global();
        let b = SchemaRegistry::global();
        assert!(std::ptr::eq(a, b));
        assert!(a.has_effect("Gain"));
    }
}
