//! fxchain - Declarative Effect-Chain Configuration
//!
//! fxchain models an audio preset as data: an ordered sequence of effects,
//! each with named parameters carrying value, bounds, and UI-presentation
//! hints. One document drives both a processing graph and an auto-generated
//! control panel.
//!
//! # Architecture
//!
//! A document flows through three stages:
//! 1. Codec - two equivalent syntaxes (line-oriented markup and a
//!    braces/brackets structured form) decode to the same in-memory chain
//! 2. Validation - `Chain::finalize` checks every effect against the
//!    schema registry; parse errors and schema errors stay orthogonal
//! 3. Consumers - UI and DSP layers traverse the finalized chain read-only
//!
//! ```
//! use fxchain::codec::{decode, encode, Syntax};
//! use fxchain::model::ValidationMode;
//! use fxchain::schema::SchemaRegistry;
//!
//! let text = "- type: Gain\n  gain_db: {value: -6.0, ui: Slider}\n";
//! let mut chain = decode(text, Syntax::Markup)?;
//! chain.finalize(SchemaRegistry::global(), ValidationMode::Aggregate)?;
//! assert_eq!(encode(&chain, Syntax::Markup), text);
//! # Ok::<(), fxchain::FxChainError>(())
//! ```

pub mod codec;
pub mod error;
pub mod factory;
pub mod model;
pub mod schema;

pub use error::{FxChainError, ParseError, Result, SchemaError, ValidationFailure};
pub use model::{Chain, EffectDescriptor, ParamValue, Parameter, ValidationMode, Value};
