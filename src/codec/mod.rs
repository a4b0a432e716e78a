//! Document codec
//!
//! Two equivalent external syntaxes decode to the identical in-memory
//! chain: the line-oriented markup form and the braces/brackets structured
//! form. Decoding is purely syntactic, so parse errors and schema errors
//! reach the caller independently; a decoded chain is unchecked until
//! `Chain::finalize`. Encoding is deterministic and minimal: insertion order
//! throughout, bare scalars for metadata-free parameters, and only the
//! present optional keys for full parameter records.

mod markup;
mod structured;

use log::debug;

use crate::error::ParseError;
use crate::model::Chain;

/// External document syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    /// Line-oriented block-sequence markup
    Markup,
    /// Braces/brackets structured form (JSON)
    Structured,
}

/// Decode a document into an unchecked chain.
///
/// The result is syntactically well-formed but not yet validated; run
/// `Chain::finalize` before handing it to consumers.
pub fn decode(text: &str, syntax: Syntax) -> Result<Chain, ParseError> {
    let chain = match syntax {
        Syntax::Markup => markup::decode(text),
        Syntax::Structured => structured::decode(text),
    }?;
    debug!("decoded {} effect(s) from {:?} document", chain.len(), syntax);
    Ok(chain)
}

/// Encode a chain as a canonical document in the given syntax.
///
/// For any chain that passed `finalize`, `decode(encode(chain, s), s)` is
/// structurally equal to `chain`.
pub fn encode(chain: &Chain, syntax: Syntax) -> String {
    match syntax {
        Syntax::Markup => markup::encode(chain),
        Syntax::Structured => structured::encode(chain),
    }
}
