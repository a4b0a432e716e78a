//! Effect chains
//!
//! A chain is the ordered signal path: effect 0 processes first.
//! Reordering changes the sound, so every traversal and both codecs
//! preserve order exactly.
//!
//! A decoded or hand-built chain starts out unchecked. `finalize` validates
//! every descriptor against a registry and marks the chain usable;
//! consumers (UI generation, a processing layer) must only read finalized
//! chains. Mutation is a single-writer affair: a concurrent reader takes a
//! `clone()` of a finalized chain as its snapshot.

use log::{debug, warn};
use serde_json::Value as JsonValue;

use crate::error::{FxChainError, Result};
use crate::model::effect::EffectDescriptor;
use crate::model::value::Value;
use crate::schema::SchemaRegistry;

/// Failure-collection strategy for `finalize` and `validate`.
///
/// `Aggregate` reports every invalid field at once, which is what an
/// interactive editor wants; `FailFast` stops at the first failure, which
/// suits batch loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    FailFast,
    Aggregate,
}

/// Ordered sequence of effect descriptors forming a signal path
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chain {
    effects: Vec<EffectDescriptor>,
    finalized: bool,
}

impl Chain {
    /// Create a new empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an effect to the end of the signal path. The chain reverts to
    /// unchecked until the next `finalize`.
    pub fn append(&mut self, effect: EffectDescriptor) {
        self.effects.push(effect);
        self.finalized = false;
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Effects in signal-processing order
    pub fn effects(&self) -> &[EffectDescriptor] {
        &self.effects
    }

    pub fn get(&self, index: usize) -> Option<&EffectDescriptor> {
        self.effects.get(index)
    }

    /// Iterate over effects in signal-processing order
    pub fn iter(&self) -> impl Iterator<Item = &EffectDescriptor> {
        self.effects.iter()
    }

    /// Whether the last `finalize` succeeded and no structural edit has
    /// happened since
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Validate every descriptor in order against `registry`.
    ///
    /// On success the chain is marked finalized and safe to hand to
    /// consumers. On failure the error carries every collected
    /// `ValidationFailure` (one, in fail-fast mode) and the chain stays
    /// unchecked.
    pub fn finalize(&mut self, registry: &SchemaRegistry, mode: ValidationMode) -> Result<()> {
        let mut failures = Vec::new();
        for (index, effect) in self.effects.iter().enumerate() {
            if effect.collect_failures(index, registry, mode, &mut failures) {
                break;
            }
        }

        if failures.is_empty() {
            debug!("chain finalized: {} effect(s)", self.effects.len());
            self.finalized = true;
            Ok(())
        } else {
            warn!(
                "chain validation failed: {} error(s) across {} effect(s)",
                failures.len(),
                self.effects.len()
            );
            self.finalized = false;
            Err(FxChainError::Invalid { failures })
        }
    }

    /// Move the effect at `from` so it sits at `to`.
    ///
    /// Validation is per-descriptor, never cross-descriptor, so reordering
    /// a finalized chain leaves it finalized.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.effects.len();
        let out_of_bounds = |index| FxChainError::IndexOutOfBounds { index, len };
        if from >= len {
            return Err(out_of_bounds(from));
        }
        if to >= len {
            return Err(out_of_bounds(to));
        }
        let effect = self.effects.remove(from);
        self.effects.insert(to, effect);
        Ok(())
    }

    /// Remove and return the effect at `index`
    pub fn remove(&mut self, index: usize) -> Result<EffectDescriptor> {
        if index >= self.effects.len() {
            return Err(FxChainError::IndexOutOfBounds {
                index,
                len: self.effects.len(),
            });
        }
        Ok(self.effects.remove(index))
    }

    /// Set one parameter on the effect at `index`, re-validating only that
    /// field. A finalized chain stays finalized on success.
    pub fn set_parameter(
        &mut self,
        index: usize,
        name: &str,
        value: impl Into<Value>,
        registry: &SchemaRegistry,
    ) -> Result<()> {
        let len = self.effects.len();
        let effect = self
            .effects
            .get_mut(index)
            .ok_or(FxChainError::IndexOutOfBounds { index, len })?;
        effect.set_parameter(name, value, registry)?;
        Ok(())
    }

    /// Encode as a JSON array of effect records
    pub fn to_json(&self) -> JsonValue {
        JsonValue::Array(self.effects.iter().map(EffectDescriptor::to_json).collect())
    }

    /// Decode from a JSON array. The result is unchecked; run `finalize`
    /// before handing it to consumers.
    pub fn from_json(json: &JsonValue) -> std::result::Result<Self, String> {
        let items = match json {
            JsonValue::Array(items) => items,
            _ => return Err("document root must be a sequence of effect records".to_string()),
        };
        let mut chain = Chain::new();
        for (index, item) in items.iter().enumerate() {
            let effect = EffectDescriptor::from_json(item)
                .map_err(|e| format!("effect #{}: {}", index, e))?;
            chain.append(effect);
        }
        Ok(chain)
    }
}

impl<'a> IntoIterator for &'a Chain {
    type Item = &'a EffectDescriptor;
    type IntoIter = std::slice::Iter<'a, EffectDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.effects.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemaError;
    use crate::model::Parameter;
    use crate::model::UiHint;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::with_builtin()
    }

    fn gain_and_filter() -> Chain {
        let mut chain = Chain::new();
        chain.append(EffectDescriptor::new("Gain").with_param("gain_db", -6.0));
        chain.append(
            EffectDescriptor::new("Filter")
                .with_param("mode", "LowPass")
                .with_param("frequency", 1000.0),
        );
        chain
    }

    #[test]
    fn test_new_chain_is_unchecked() {
        let chain = Chain::new();
        assert!(chain.is_empty());
        assert!(!chain.is_finalized());
    }

    #[test]
    fn test_finalize_success() {
        let mut chain = gain_and_filter();
        chain.finalize(&registry(), ValidationMode::Aggregate).unwrap();
        assert!(chain.is_finalized());
    }

    #[test]
    fn test_append_clears_finalized() {
        let mut chain = gain_and_filter();
        chain.finalize(&registry(), ValidationMode::FailFast).unwrap();
        chain.append(EffectDescriptor::new("Drive"));
        assert!(!chain.is_finalized());
    }

    #[test]
    fn test_finalize_unknown_effect_type() {
        let mut chain = Chain::new();
        chain.append(EffectDescriptor::new("Unknown"));
        let err = chain
            .finalize(&registry(), ValidationMode::FailFast)
            .unwrap_err();
        let FxChainError::Invalid { failures } = err else {
            panic!("expected Invalid");
        };
        assert!(matches!(
            failures[0].error,
            SchemaError::UnknownEffectType { ref type_name } if type_name == "Unknown"
        ));
        assert!(!chain.is_finalized());
    }

    #[test]
    fn test_finalize_aggregate_spans_effects() {
        let mut chain = Chain::new();
        chain.append(EffectDescriptor::new("Gain").with_param("gain_db", 40.0));
        chain.append(EffectDescriptor::new("Unknown"));
        chain.append(
            EffectDescriptor::new("Filter")
                .with_param("mode", "Notch")
                .with_param("frequency", 1000.0),
        );

        let err = chain
            .finalize(&registry(), ValidationMode::Aggregate)
            .unwrap_err();
        let FxChainError::Invalid { failures } = err else {
            panic!("expected Invalid");
        };
        assert_eq!(failures.len(), 3);
        assert_eq!(failures[0].effect_index, 0);
        assert!(matches!(failures[0].error, SchemaError::OutOfRange { .. }));
        assert_eq!(failures[1].effect_index, 1);
        assert!(matches!(
            failures[1].error,
            SchemaError::UnknownEffectType { .. }
        ));
        assert_eq!(failures[2].effect_index, 2);
        assert!(matches!(
            failures[2].error,
            SchemaError::InvalidOption { .. }
        ));
    }

    #[test]
    fn test_finalize_fail_fast_returns_first() {
        let mut chain = Chain::new();
        chain.append(EffectDescriptor::new("Gain").with_param("gain_db", 40.0));
        chain.append(EffectDescriptor::new("Unknown"));

        let err = chain
            .finalize(&registry(), ValidationMode::FailFast)
            .unwrap_err();
        let FxChainError::Invalid { failures } = err else {
            panic!("expected Invalid");
        };
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].effect_index, 0);
    }

    #[test]
    fn test_reorder_changes_iteration_order() {
        let mut chain = gain_and_filter();
        chain.finalize(&registry(), ValidationMode::FailFast).unwrap();

        chain.reorder(0, 1).unwrap();
        let order: Vec<&str> = chain.iter().map(|e| e.type_name()).collect();
        assert_eq!(order, vec!["Filter", "Gain"]);
        // Reordering never invalidates per-descriptor validity.
        assert!(chain.is_finalized());
    }

    #[test]
    fn test_reorder_out_of_bounds() {
        let mut chain = gain_and_filter();
        let err = chain.reorder(0, 5).unwrap_err();
        assert!(matches!(
            err,
            FxChainError::IndexOutOfBounds { index: 5, len: 2 }
        ));
        let err = chain.reorder(7, 0).unwrap_err();
        assert!(matches!(err, FxChainError::IndexOutOfBounds { index: 7, .. }));
    }

    #[test]
    fn test_remove() {
        let mut chain = gain_and_filter();
        let removed = chain.remove(0).unwrap();
        assert_eq!(removed.type_name(), "Gain");
        assert_eq!(chain.len(), 1);
        assert!(matches!(
            chain.remove(3),
            Err(FxChainError::IndexOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_set_parameter_keeps_finalized() {
        let mut chain = gain_and_filter();
        chain.finalize(&registry(), ValidationMode::FailFast).unwrap();

        chain
            .set_parameter(1, "frequency", 440.0, &registry())
            .unwrap();
        assert!(chain.is_finalized());
        assert_eq!(
            chain.get(1).unwrap().get("frequency").unwrap().value(),
            &Value::Number(440.0)
        );
    }

    #[test]
    fn test_set_parameter_bad_index() {
        let mut chain = gain_and_filter();
        let err = chain
            .set_parameter(9, "frequency", 440.0, &registry())
            .unwrap_err();
        assert!(matches!(err, FxChainError::IndexOutOfBounds { index: 9, .. }));
    }

    #[test]
    fn test_set_parameter_failure_leaves_chain_valid() {
        let mut chain = gain_and_filter();
        chain.finalize(&registry(), ValidationMode::FailFast).unwrap();

        let err = chain
            .set_parameter(1, "frequency", -3.0, &registry())
            .unwrap_err();
        assert!(matches!(err, FxChainError::Schema(_)));
        assert_eq!(
            chain.get(1).unwrap().get("frequency").unwrap().value(),
            &Value::Number(1000.0)
        );
        assert!(chain.is_finalized());
    }

    #[test]
    fn test_snapshot_clone_is_independent() {
        let mut chain = gain_and_filter();
        chain.finalize(&registry(), ValidationMode::FailFast).unwrap();

        let snapshot = chain.clone();
        chain.set_parameter(0, "gain_db", -12.0, &registry()).unwrap();
        assert_eq!(
            snapshot.get(0).unwrap().get("gain_db").unwrap().value(),
            &Value::Number(-6.0)
        );
    }

    #[test]
    fn test_json_round_trip() {
        let mut chain = gain_and_filter();
        chain.append(
            EffectDescriptor::new("Gain").with_param(
                "gain_db",
                Parameter::builder(-6.0)
                    .ui(UiHint::Slider)
                    .range(-60.0, 12.0)
                    .build()
                    .unwrap(),
            ),
        );
        let json = chain.to_json();
        let decoded = Chain::from_json(&json).unwrap();
        assert_eq!(decoded.effects(), chain.effects());
    }

    #[test]
    fn test_from_json_reports_element_index() {
        let err = Chain::from_json(&serde_json::json!([
            {"type": "Gain"},
            {"gain_db": -6.0}
        ]))
        .unwrap_err();
        assert!(err.contains("effect #1"));
    }
}
