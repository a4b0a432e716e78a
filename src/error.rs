//! Error handling for fxchain
//!
//! Every failure mode is an enumerated value returned to the caller; nothing
//! in the crate panics on malformed input. Parse errors and schema errors are
//! kept orthogonal: the codec only ever reports `ParseError`, validation only
//! ever reports `SchemaError`.

use thiserror::Error;

use crate::model::ValueKind;

/// Result type alias for fxchain operations
pub type Result<T> = std::result::Result<T, FxChainError>;

/// Malformed document. Line and column are 1-based; structural errors found
/// after a successful syntax pass (e.g. a non-record element in the
/// structured form) report position 0:0 and identify the element in the
/// message instead.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("parse error at line {line}, column {column}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }

    /// Structural error with no usable source position.
    pub fn unpositioned(message: impl Into<String>) -> Self {
        Self::new(0, 0, message)
    }
}

/// Semantic validation failure for one effect type or parameter
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("unknown effect type '{type_name}'")]
    UnknownEffectType { type_name: String },

    #[error("effect '{effect}' has no parameter named '{name}'")]
    UnknownParameter { effect: String, name: String },

    #[error("effect '{effect}' requires parameter '{name}'")]
    MissingRequiredParameter { effect: String, name: String },

    #[error("parameter '{name}': expected {expected}, found {found}")]
    TypeMismatch {
        name: String,
        expected: ValueKind,
        found: ValueKind,
    },

    #[error("parameter '{name}': value {value} is outside [{min}, {max}]")]
    OutOfRange {
        name: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("parameter '{name}': '{value}' is not one of [{}]", .options.join(", "))]
    InvalidOption {
        name: String,
        value: String,
        options: Vec<String>,
    },

    #[error("parameter '{name}': {reason}")]
    ConflictingMetadata { name: String, reason: String },
}

/// One validation failure located within a chain, as collected by
/// `Chain::finalize`. `parameter` is `None` for effect-level failures
/// (unknown type).
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationFailure {
    /// Position of the offending effect in the chain (0-based).
    pub effect_index: usize,
    /// Declared type name of the offending effect.
    pub effect_type: String,
    /// Offending parameter name, when the failure is parameter-scoped.
    pub parameter: Option<String>,
    pub error: SchemaError,
}

impl std::fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "effect #{} ({}): {}",
            self.effect_index, self.effect_type, self.error
        )
    }
}

/// Main error type for fxchain operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FxChainError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Result of a failed `finalize`. Holds every collected failure in
    /// aggregate mode and exactly one in fail-fast mode.
    #[error("chain validation failed with {} error(s)", .failures.len())]
    Invalid { failures: Vec<ValidationFailure> },

    #[error("index {index} out of bounds for chain of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
}

impl FxChainError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            FxChainError::Parse(_) => "PARSE_ERROR",
            FxChainError::Schema(e) => e.error_code(),
            FxChainError::Invalid { .. } => "CHAIN_INVALID",
            FxChainError::IndexOutOfBounds { .. } => "INDEX_OUT_OF_BOUNDS",
        }
    }

    /// Check if this error is recoverable by re-editing the document
    pub fn is_recoverable(&self) -> bool {
        match self {
            FxChainError::Parse(_) => true,
            FxChainError::Schema(_) => true,
            FxChainError::Invalid { .. } => true,
            FxChainError::IndexOutOfBounds { .. } => false,
        }
    }
}

impl SchemaError {
    /// Stable machine-readable code, one per variant
    pub fn error_code(&self) -> &'static str {
        match self {
            SchemaError::UnknownEffectType { .. } => "UNKNOWN_EFFECT_TYPE",
            SchemaError::UnknownParameter { .. } => "UNKNOWN_PARAMETER",
            SchemaError::MissingRequiredParameter { .. } => "MISSING_REQUIRED_PARAMETER",
            SchemaError::TypeMismatch { .. } => "TYPE_MISMATCH",
            SchemaError::OutOfRange { .. } => "OUT_OF_RANGE",
            SchemaError::InvalidOption { .. } => "INVALID_OPTION",
            SchemaError::ConflictingMetadata { .. } => "CONFLICTING_METADATA",
        }
    }
}
