//! Line-oriented markup codec
//!
//! The block-sequence form shown in the editor mockups:
//!
//! ```text
//! - type: Gain
//!   gain_db: {value: -6.0, ui: Slider, style: Rotary}
//! - type: Filter
//!   mode: LowPass
//!   frequency: 1000.0
//! ```
//!
//! Each effect record opens with `- ` at column one; its fields are
//! indented `key: value` lines. A parameter record may be written as an
//! inline flow map (above) or as an indented block:
//!
//! ```text
//! - type: Gain
//!   gain_db:
//!     value: -6.0
//!     ui: Slider
//! ```
//!
//! Blank lines and `#` comments are skipped. All errors carry 1-based
//! line/column positions. The decoder is purely syntactic; semantic checks
//! belong to `Chain::finalize`.

use crate::error::ParseError;
use crate::model::format_number;
use crate::model::{
    Chain, EffectDescriptor, ParamValue, Parameter, SliderStyle, UiHint, Value,
};

/// One significant source line: 1-based number, leading-space count, and
/// the end-trimmed content after the indent.
struct Line<'a> {
    no: usize,
    indent: usize,
    text: &'a str,
}

impl Line<'_> {
    /// 1-based column of `text[offset..]` in the original source line
    fn col(&self, offset: usize) -> usize {
        self.indent + offset + 1
    }

    fn error(&self, offset: usize, message: impl Into<String>) -> ParseError {
        ParseError::new(self.no, self.col(offset), message)
    }
}

/// Split a document into significant lines, rejecting tab indentation
fn scan_lines(text: &str) -> Result<Vec<Line<'_>>, ParseError> {
    let mut lines = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let no = index + 1;
        let trimmed_end = raw.trim_end();
        let indent = trimmed_end
            .chars()
            .take_while(|c| *c == ' ')
            .count();
        let content = &trimmed_end[indent..];
        if content.starts_with('\t') {
            return Err(ParseError::new(
                no,
                indent + 1,
                "tab characters are not allowed in indentation",
            ));
        }
        if content.is_empty() || content.starts_with('#') {
            continue;
        }
        lines.push(Line {
            no,
            indent,
            text: content,
        });
    }
    Ok(lines)
}

/// Decode a markup document into an unchecked chain
pub(crate) fn decode(text: &str) -> Result<Chain, ParseError> {
    let lines = scan_lines(text)?;
    let mut chain = Chain::new();
    let mut index = 0;
    while index < lines.len() {
        let (effect, next) = parse_effect(&lines, index)?;
        chain.append(effect);
        index = next;
    }
    Ok(chain)
}

/// Parse one effect record starting at `lines[start]`; returns the
/// descriptor and the index of the first line after the record.
fn parse_effect(
    lines: &[Line<'_>],
    start: usize,
) -> Result<(EffectDescriptor, usize), ParseError> {
    let head = &lines[start];
    if head.indent != 0 || !head.text.starts_with('-') {
        return Err(head.error(0, "expected an effect record starting with '- '"));
    }
    let after_dash = &head.text[1..];
    if !after_dash.is_empty() && !after_dash.starts_with(' ') {
        return Err(head.error(1, "expected a space after '-'"));
    }

    let mut type_name: Option<String> = None;
    let mut params: Vec<(String, ParamValue)> = Vec::new();
    let mut index = start;

    // The head line may carry the record's first field after the dash.
    let inline = after_dash.trim_start();
    if !inline.is_empty() {
        let offset = head.text.len() - inline.len();
        index = parse_field(
            lines,
            start,
            offset,
            &mut type_name,
            &mut params,
        )?;
    } else {
        index += 1;
    }

    // Remaining fields are indented continuation lines.
    let mut record_indent: Option<usize> = None;
    while index < lines.len() {
        let line = &lines[index];
        if line.indent == 0 {
            break;
        }
        let expected = *record_indent.get_or_insert(line.indent);
        if line.indent != expected {
            return Err(line.error(0, "inconsistent indentation within effect record"));
        }
        index = parse_field(lines, index, 0, &mut type_name, &mut params)?;
    }

    let type_name = type_name
        .ok_or_else(|| head.error(0, "effect record is missing the 'type' key"))?;
    let mut descriptor = EffectDescriptor::new(type_name);
    for (name, value) in params {
        descriptor.insert(name, value);
    }
    Ok((descriptor, index))
}

/// Parse a `key: value` field beginning at `lines[index]` (content starting
/// at `offset`), consuming extra lines when the value is a block record.
/// Returns the index of the next unconsumed line.
fn parse_field(
    lines: &[Line<'_>],
    index: usize,
    offset: usize,
    type_name: &mut Option<String>,
    params: &mut Vec<(String, ParamValue)>,
) -> Result<usize, ParseError> {
    let line = &lines[index];
    let text = &line.text[offset..];

    let colon = text
        .find(':')
        .ok_or_else(|| line.error(offset, "expected 'key: value'"))?;
    let key = text[..colon].trim();
    if key.is_empty() {
        return Err(line.error(offset, "expected a key before ':'"));
    }
    let rest_offset = offset + colon + 1;
    let rest = line.text[rest_offset..].trim_start();
    let rest_col_offset = line.text.len() - rest.len();

    let duplicate = key == "type" && type_name.is_some()
        || params.iter().any(|(name, _)| name == key);
    if duplicate {
        return Err(line.error(offset, format!("duplicate key '{}'", key)));
    }

    if key == "type" {
        if rest.is_empty() || rest.starts_with('{') || rest.starts_with('[') {
            return Err(line.error(rest_col_offset, "effect type must be a text scalar"));
        }
        match parse_scalar_rest(line, rest_col_offset)? {
            Value::Text(name) => {
                *type_name = Some(name);
                return Ok(index + 1);
            }
            _ => return Err(line.error(rest_col_offset, "effect type must be a text scalar")),
        }
    }

    if rest.is_empty() {
        // Block-style parameter record on the following deeper lines.
        let (entries, next) = parse_block_record(lines, index)?;
        let value = build_parameter(entries, line, offset)?;
        params.push((key.to_string(), value));
        return Ok(next);
    }

    if rest.starts_with('{') {
        let entries = parse_flow_record(line, rest_col_offset)?;
        let value = build_parameter(entries, line, rest_col_offset)?;
        params.push((key.to_string(), value));
        return Ok(index + 1);
    }

    if rest.starts_with('[') {
        return Err(line.error(
            rest_col_offset,
            "parameter value must be a scalar or a record",
        ));
    }

    let value = parse_scalar_rest(line, rest_col_offset)?;
    params.push((key.to_string(), ParamValue::Scalar(value)));
    Ok(index + 1)
}

/// A key/value entry inside a parameter record, with its source position
struct RecordEntry {
    key: String,
    value: RecordValue,
    line: usize,
    col: usize,
}

enum RecordValue {
    Scalar(Value),
    List(Vec<Value>),
}

/// Parse an indented block record under `lines[field_index]`
fn parse_block_record(
    lines: &[Line<'_>],
    field_index: usize,
) -> Result<(Vec<RecordEntry>, usize), ParseError> {
    let field_line = &lines[field_index];
    let mut entries = Vec::new();
    let mut nested_indent: Option<usize> = None;
    let mut index = field_index + 1;

    while index < lines.len() {
        let line = &lines[index];
        if line.indent <= field_line.indent {
            break;
        }
        let expected = *nested_indent.get_or_insert(line.indent);
        if line.indent != expected {
            return Err(line.error(0, "inconsistent indentation within parameter record"));
        }

        let colon = line
            .text
            .find(':')
            .ok_or_else(|| line.error(0, "expected 'key: value'"))?;
        let key = line.text[..colon].trim();
        if key.is_empty() {
            return Err(line.error(0, "expected a key before ':'"));
        }
        let rest = line.text[colon + 1..].trim_start();
        let rest_offset = line.text.len() - rest.len();

        let value = if rest.starts_with('[') {
            let mut cursor = FlowCursor::new(line, rest_offset);
            let list = cursor.parse_list()?;
            cursor.expect_end()?;
            RecordValue::List(list)
        } else if rest.starts_with('{') || rest.is_empty() {
            return Err(line.error(rest_offset, "parameter records do not nest"));
        } else {
            RecordValue::Scalar(parse_scalar_rest(line, rest_offset)?)
        };

        entries.push(RecordEntry {
            key: key.to_string(),
            value,
            line: line.no,
            col: line.col(0),
        });
        index += 1;
    }

    if entries.is_empty() {
        return Err(field_line.error(0, "expected an indented parameter record after ':'"));
    }
    Ok((entries, index))
}

/// Parse an inline `{key: value, ...}` record starting at `offset`
fn parse_flow_record(line: &Line<'_>, offset: usize) -> Result<Vec<RecordEntry>, ParseError> {
    let mut cursor = FlowCursor::new(line, offset);
    cursor.expect('{')?;
    let mut entries = Vec::new();

    cursor.skip_spaces();
    if cursor.peek() == Some('}') {
        cursor.bump();
        cursor.expect_end()?;
        return Ok(entries);
    }

    loop {
        cursor.skip_spaces();
        let key_col = cursor.col();
        let key_line = cursor.line_no();
        let key = cursor.take_until(&[':', ',', '}'])?;
        if cursor.peek() != Some(':') {
            return Err(cursor.error("expected ':' after key"));
        }
        cursor.bump();
        cursor.skip_spaces();

        let value = if cursor.peek() == Some('[') {
            RecordValue::List(cursor.parse_list()?)
        } else {
            RecordValue::Scalar(cursor.parse_scalar(&[',', '}'])?)
        };
        entries.push(RecordEntry {
            key,
            value,
            line: key_line,
            col: key_col,
        });

        cursor.skip_spaces();
        match cursor.peek() {
            Some(',') => {
                cursor.bump();
            }
            Some('}') => {
                cursor.bump();
                cursor.expect_end()?;
                return Ok(entries);
            }
            _ => return Err(cursor.error("expected ',' or '}' in record")),
        }
    }
}

/// Character cursor over one line's flow syntax (`{...}` / `[...]`)
struct FlowCursor<'a> {
    line: &'a Line<'a>,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> FlowCursor<'a> {
    fn new(line: &'a Line<'a>, offset: usize) -> Self {
        Self {
            line,
            chars: line.text.chars().collect(),
            pos: offset,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn col(&self) -> usize {
        self.line.col(self.pos)
    }

    fn line_no(&self) -> usize {
        self.line.no
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(self.line.no, self.col(), message)
    }

    fn skip_spaces(&mut self) {
        while self.peek() == Some(' ') {
            self.pos += 1;
        }
    }

    fn expect(&mut self, wanted: char) -> Result<(), ParseError> {
        if self.peek() == Some(wanted) {
            self.bump();
            Ok(())
        } else {
            Err(self.error(format!("expected '{}'", wanted)))
        }
    }

    /// After a closed record or list: only spaces or a comment may follow
    fn expect_end(&mut self) -> Result<(), ParseError> {
        self.skip_spaces();
        match self.peek() {
            None | Some('#') => Ok(()),
            Some(_) => Err(self.error("unexpected trailing content")),
        }
    }

    /// Take a bare token up to one of `stops`, trimmed
    fn take_until(&mut self, stops: &[char]) -> Result<String, ParseError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if stops.contains(&c) {
                break;
            }
            self.pos += 1;
        }
        let token: String = self.chars[start..self.pos].iter().collect();
        let token = token.trim().to_string();
        if token.is_empty() {
            self.pos = start;
            return Err(self.error("expected a token"));
        }
        Ok(token)
    }

    /// Parse one scalar terminated by a delimiter in `stops`
    fn parse_scalar(&mut self, stops: &[char]) -> Result<Value, ParseError> {
        self.skip_spaces();
        let col = self.pos;
        if self.peek() == Some('"') {
            return self.parse_quoted();
        }
        let token = self.take_until(stops)?;
        scalar_from_token(&token)
            .ok_or_else(|| ParseError::new(self.line.no, self.line.col(col), "expected a value"))
    }

    fn parse_quoted(&mut self) -> Result<Value, ParseError> {
        let open = self.pos;
        self.bump(); // opening quote
        let mut out = String::new();
        while let Some(c) = self.bump() {
            match c {
                '"' => return Ok(Value::Text(out)),
                '\\' => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('"') => out.push('"'),
                    Some('\\') => out.push('\\'),
                    _ => return Err(self.error("invalid escape sequence")),
                },
                _ => out.push(c),
            }
        }
        Err(ParseError::new(
            self.line.no,
            self.line.col(open),
            "unterminated string",
        ))
    }

    /// Parse a `[a, b, c]` list of scalars
    fn parse_list(&mut self) -> Result<Vec<Value>, ParseError> {
        self.expect('[')?;
        let mut items = Vec::new();
        self.skip_spaces();
        if self.peek() == Some(']') {
            self.bump();
            return Ok(items);
        }
        loop {
            items.push(self.parse_scalar(&[',', ']'])?);
            self.skip_spaces();
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some(']') => {
                    self.bump();
                    return Ok(items);
                }
                _ => return Err(self.error("expected ',' or ']' in list")),
            }
        }
    }
}

/// Parse a scalar occupying the rest of a line (minus a trailing comment)
fn parse_scalar_rest(line: &Line<'_>, offset: usize) -> Result<Value, ParseError> {
    let rest = &line.text[offset..];
    if rest.trim_start().starts_with('"') {
        let mut cursor = FlowCursor::new(line, offset);
        cursor.skip_spaces();
        let value = cursor.parse_quoted()?;
        cursor.expect_end()?;
        return Ok(value);
    }
    // Cut an unquoted scalar at a trailing comment.
    let body = match rest.find(" #") {
        Some(pos) => &rest[..pos],
        None => rest,
    };
    let token = body.trim();
    scalar_from_token(token).ok_or_else(|| line.error(offset, "expected a value"))
}

/// Interpret a bare token: boolean, number, or text
fn scalar_from_token(token: &str) -> Option<Value> {
    if token.is_empty() {
        return None;
    }
    match token {
        "true" => return Some(Value::Bool(true)),
        "false" => return Some(Value::Bool(false)),
        _ => {}
    }
    if token.starts_with(['-', '+', '.']) || token.starts_with(|c: char| c.is_ascii_digit()) {
        if let Ok(n) = token.parse::<f64>() {
            return Some(Value::Number(n));
        }
    }
    Some(Value::Text(token.to_string()))
}

/// Assemble a parameter from record entries, enforcing the record grammar.
/// Unrecognized keys are ignored; recognized keys must be well-typed.
fn build_parameter(
    entries: Vec<RecordEntry>,
    record_line: &Line<'_>,
    record_offset: usize,
) -> Result<ParamValue, ParseError> {
    let mut value: Option<Value> = None;
    let mut ui: Option<UiHint> = None;
    let mut style: Option<SliderStyle> = None;
    let mut min: Option<f64> = None;
    let mut max: Option<f64> = None;
    let mut options: Vec<String> = Vec::new();
    let mut seen: Vec<String> = Vec::new();

    for entry in entries {
        let at = |message: String| ParseError::new(entry.line, entry.col, message);
        if seen.contains(&entry.key) {
            return Err(at(format!("duplicate key '{}'", entry.key)));
        }
        seen.push(entry.key.clone());

        match (entry.key.as_str(), &entry.value) {
            ("value", RecordValue::Scalar(v)) => value = Some(v.clone()),
            ("value", RecordValue::List(_)) => {
                return Err(at("parameter record key 'value' must be a scalar".to_string()))
            }
            ("ui", RecordValue::Scalar(Value::Text(token))) => {
                ui = Some(
                    UiHint::from_token(token)
                        .ok_or_else(|| at(format!("unknown ui hint '{}'", token)))?,
                );
            }
            ("ui", _) => {
                return Err(at("parameter record key 'ui' must be a string".to_string()))
            }
            ("style", RecordValue::Scalar(Value::Text(token))) => {
                style = Some(
                    SliderStyle::from_token(token)
                        .ok_or_else(|| at(format!("unknown style '{}'", token)))?,
                );
            }
            ("style", _) => {
                return Err(at("parameter record key 'style' must be a string".to_string()))
            }
            ("min", RecordValue::Scalar(Value::Number(n))) => min = Some(*n),
            ("min", _) => {
                return Err(at("parameter record key 'min' must be a number".to_string()))
            }
            ("max", RecordValue::Scalar(Value::Number(n))) => max = Some(*n),
            ("max", _) => {
                return Err(at("parameter record key 'max' must be a number".to_string()))
            }
            ("options", RecordValue::List(items)) => {
                options = items
                    .iter()
                    .map(|item| match item {
                        Value::Text(s) => Ok(s.clone()),
                        _ => Err(at("options entries must be strings".to_string())),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
            }
            ("options", RecordValue::Scalar(_)) => {
                return Err(at(
                    "parameter record key 'options' must be a list of strings".to_string(),
                ))
            }
            // Forward compatibility: unrecognized record keys are ignored.
            _ => {}
        }
    }

    let value = value.ok_or_else(|| {
        record_line.error(record_offset, "parameter record is missing the 'value' key")
    })?;
    Ok(ParamValue::from_parameter(Parameter::from_parts(
        value, ui, style, min, max, options,
    )))
}

// ============================================================================
// Encoding
// ============================================================================

/// Encode a chain in canonical markup: insertion order, minimal form,
/// inline flow records for parameters with metadata.
pub(crate) fn encode(chain: &Chain) -> String {
    let mut out = String::new();
    for effect in chain.iter() {
        out.push_str("- type: ");
        out.push_str(&encode_text(effect.type_name()));
        out.push('\n');
        for (name, value) in effect.params() {
            out.push_str("  ");
            out.push_str(name);
            out.push_str(": ");
            match value {
                ParamValue::Scalar(v) => out.push_str(&encode_scalar(v)),
                ParamValue::Full(p) => out.push_str(&encode_record(p)),
            }
            out.push('\n');
        }
    }
    out
}

fn encode_record(parameter: &Parameter) -> String {
    let mut parts = vec![format!("value: {}", encode_scalar(parameter.value()))];
    if let Some(ui) = parameter.ui() {
        parts.push(format!("ui: {}", ui.as_token()));
    }
    if let Some(style) = parameter.style() {
        parts.push(format!("style: {}", style.as_token()));
    }
    if let Some(min) = parameter.min() {
        parts.push(format!("min: {}", format_number(min)));
    }
    if let Some(max) = parameter.max() {
        parts.push(format!("max: {}", format_number(max)));
    }
    if !parameter.options().is_empty() {
        let items: Vec<String> = parameter.options().iter().map(|o| encode_text(o)).collect();
        parts.push(format!("options: [{}]", items.join(", ")));
    }
    format!("{{{}}}", parts.join(", "))
}

fn encode_scalar(value: &Value) -> String {
    match value {
        Value::Number(n) => format_number(*n),
        Value::Bool(b) => b.to_string(),
        Value::Text(s) => encode_text(s),
    }
}

/// Write text bare when it will read back as the same text, quoted otherwise
fn encode_text(text: &str) -> String {
    let reads_back = matches!(scalar_from_token(text), Some(Value::Text(_)));
    let safe_chars = text
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ' ' | '/'));
    let trimmed = !text.is_empty() && text.trim() == text;
    if reads_back && safe_chars && trimmed && !text.contains(" #") {
        text.to_string()
    } else {
        let mut out = String::from("\"");
        for c in text.chars() {
            match c {
                '"' => out.push_str("\\\""),
                '\\' => out.push_str("\\\\"),
                '\n' => out.push_str("\\n"),
                '\t' => out.push_str("\\t"),
                _ => out.push(c),
            }
        }
        out.push('"');
        out
    }
}
