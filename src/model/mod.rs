//! Effect-chain data model
//!
//! Values, parameters, effect descriptors, and chains: the in-memory form
//! both codecs read and write, and the single source of truth for UI
//! generation and signal processing alike.

mod chain;
mod effect;
mod parameter;
mod value;

pub use chain::{Chain, ValidationMode};
pub use effect::{ControlInfo, EffectDescriptor};
pub use parameter::{ParamValue, Parameter, ParameterBuilder, SliderStyle, UiHint};
pub use value::{Value, ValueKind};

pub(crate) use value::format_number;
