//! Effect schema definitions
//!
//! The authoritative table of which parameters are legal, and their
//! kind/bounds/options, per effect type. Shared read-only by validation
//! and by UI generation.

pub mod builtin;
mod registry;

pub use builtin::{FILTER_MODES, PANNER_RULES};
pub use registry::{ParamSpec, SchemaEntry, SchemaRegistry};
