//! Braces/brackets structured codec
//!
//! The same record grammar as the markup form, written as a JSON array of
//! effect objects. Object key order is significant and preserved
//! (`serde_json` with `preserve_order`). Syntax errors keep the parser's
//! line/column; structural errors found after parsing identify the element
//! in the message instead.

use serde_json::Value as JsonValue;

use crate::error::ParseError;
use crate::model::Chain;

/// Decode a structured document into an unchecked chain
pub(crate) fn decode(text: &str) -> Result<Chain, ParseError> {
    let json: JsonValue = serde_json::from_str(text)
        .map_err(|e| ParseError::new(e.line(), e.column(), format!("invalid document: {}", e)))?;
    Chain::from_json(&json).map_err(ParseError::unpositioned)
}

/// Encode a chain as a pretty-printed JSON array
pub(crate) fn encode(chain: &Chain) -> String {
    let mut text = serde_json::to_string_pretty(&chain.to_json())
        .expect("encoding an in-memory JSON value cannot fail");
    text.push('\n');
    text
}
