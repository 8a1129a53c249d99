//! Extraction of function calls from raw model output.
//!
//! The model emits calls in a loose, non-JSON format:
//!
//! ```text
//! <start_function_call>call:check_pin{pin:<escape>7979<escape>}<end_function_call>
//! ```
//!
//! Keys are bare identifiers and string values are wrapped in `<escape>` tokens. Instead of
//! rewriting that into JSON, the argument block is read by a small scanner with explicit
//! failure modes. Quoted keys, JSON-style quoted strings and bare numbers/booleans are
//! accepted as well since models drift between the two styles. Bare scalars keep their type:
//! `{pin:7979}` carries a number, not the text `"7979"`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

pub const START_MARKER: &str = "<start_function_call>";
pub const END_MARKER: &str = "<end_function_call>";
pub const ESCAPE_TOKEN: &str = "<escape>";
const CALL_PREFIX: &str = "call:";

/// A single argument value as written by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArgValue {
    /// `<escape>`-wrapped or double-quoted text.
    Text(String),
    /// Bare numeric literal, kept verbatim.
    Number(String),
    Bool(bool),
}

impl ArgValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ArgValue::Text(s) => Some(s),
            ArgValue::Number(_) | ArgValue::Bool(_) => None,
        }
    }
}

impl std::fmt::Display for ArgValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArgValue::Text(s) => write!(f, "{s:?}"),
            ArgValue::Number(n) => f.write_str(n),
            ArgValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedCall {
    pub function_name: String,
    pub arguments: BTreeMap<String, ArgValue>,
}

impl ParsedCall {
    pub fn argument(&self, name: &str) -> Option<&ArgValue> {
        self.arguments.get(name)
    }

    /// The argument's text, if it was given as a string.
    pub fn text_argument(&self, name: &str) -> Option<&str> {
        self.argument(name).and_then(ArgValue::as_text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallParseError {
    #[error("no `<start_function_call>` marker in output")]
    MissingStartMarker,

    #[error("no `<end_function_call>` marker after the call start")]
    MissingEndMarker,

    #[error("expected a call to `{expected}`, got `{found}`")]
    UnexpectedFunction { expected: String, found: String },

    #[error("call has no argument block")]
    MissingArgumentBlock,

    #[error("unterminated `<escape>` segment starting at byte {0}")]
    UnterminatedEscape(usize),

    #[error("malformed arguments at byte {pos}: {reason}")]
    Malformed { pos: usize, reason: &'static str },
}

/// Extracts a call to `expected_function` from `raw`.
///
/// Returns `None` when the output holds no call, a call to another function, or a call whose
/// arguments cannot be read. Never panics on arbitrary input.
pub fn parse_function_call(raw: &str, expected_function: &str) -> Option<ParsedCall> {
    match try_parse_function_call(raw, expected_function) {
        Ok(call) => Some(call),
        Err(e @ (CallParseError::MissingStartMarker | CallParseError::MissingEndMarker)) => {
            log::debug!("no function call in model output: {e}");
            None
        }
        Err(e) => {
            log::warn!("error parsing function call: {e}");
            None
        }
    }
}

/// Same as [`parse_function_call`] but reports why extraction failed.
pub fn try_parse_function_call(
    raw: &str,
    expected_function: &str,
) -> Result<ParsedCall, CallParseError> {
    let start = raw
        .find(START_MARKER)
        .ok_or(CallParseError::MissingStartMarker)?
        + START_MARKER.len();
    let len = raw[start..]
        .find(END_MARKER)
        .ok_or(CallParseError::MissingEndMarker)?;
    let body = &raw[start..start + len];

    let rest = body
        .strip_prefix(CALL_PREFIX)
        .and_then(|r| r.strip_prefix(expected_function))
        // `call:check_pinned{..}` names a different function.
        .filter(|r| !r.starts_with(is_ident_char))
        .ok_or_else(|| CallParseError::UnexpectedFunction {
            expected: expected_function.to_string(),
            found: called_name(body).to_string(),
        })?;

    let brace = rest.find('{').ok_or(CallParseError::MissingArgumentBlock)?;
    if !rest[..brace].trim().is_empty() {
        return Err(CallParseError::MissingArgumentBlock);
    }

    let arguments = Scanner::new(&rest[brace..]).parse_arguments()?;
    Ok(ParsedCall {
        function_name: expected_function.to_string(),
        arguments,
    })
}

/// Renders a call in the model's wire format, e.g. for backends that return structured calls.
pub fn render_function_call<'a>(
    function_name: &str,
    arguments: impl IntoIterator<Item = (&'a str, &'a ArgValue)>,
) -> String {
    let args: Vec<String> = arguments
        .into_iter()
        .map(|(k, v)| match v {
            ArgValue::Text(s) => format!("{k}:{ESCAPE_TOKEN}{s}{ESCAPE_TOKEN}"),
            ArgValue::Number(n) => format!("{k}:{n}"),
            ArgValue::Bool(b) => format!("{k}:{b}"),
        })
        .collect();
    format!(
        "{START_MARKER}{CALL_PREFIX}{function_name}{{{}}}{END_MARKER}",
        args.join(",")
    )
}

fn called_name(body: &str) -> &str {
    let name = body.strip_prefix(CALL_PREFIX).unwrap_or(body);
    let end = name.find(|c: char| !is_ident_char(c)).unwrap_or(name.len());
    &name[..end]
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

struct Scanner<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.src.len() - trimmed.len();
    }

    fn error(&self, reason: &'static str) -> CallParseError {
        CallParseError::Malformed {
            pos: self.pos,
            reason,
        }
    }

    fn expect(&mut self, want: char, reason: &'static str) -> Result<(), CallParseError> {
        if self.peek() == Some(want) {
            self.pos += want.len_utf8();
            Ok(())
        } else {
            Err(self.error(reason))
        }
    }

    fn parse_arguments(mut self) -> Result<BTreeMap<String, ArgValue>, CallParseError> {
        let mut args = BTreeMap::new();
        self.expect('{', "expected `{`")?;
        self.skip_ws();

        if self.peek() == Some('}') {
            self.bump();
        } else {
            loop {
                let key = self.parse_key()?;
                self.skip_ws();
                self.expect(':', "expected `:` after key")?;
                self.skip_ws();
                // A `null` value leaves the argument absent.
                if let Some(value) = self.parse_value()? {
                    args.insert(key, value);
                }
                self.skip_ws();
                match self.bump() {
                    Some(',') => self.skip_ws(),
                    Some('}') => break,
                    Some(_) => return Err(self.error("expected `,` or `}`")),
                    None => return Err(self.error("unbalanced braces")),
                }
            }
        }

        self.skip_ws();
        if !self.rest().is_empty() {
            return Err(self.error("unexpected text after argument block"));
        }
        Ok(args)
    }

    fn parse_key(&mut self) -> Result<String, CallParseError> {
        if self.peek() == Some('"') {
            return self.parse_quoted();
        }
        let rest = self.rest();
        let len = rest.find(|c: char| !is_ident_char(c)).unwrap_or(rest.len());
        if len == 0 {
            return Err(self.error("expected argument name"));
        }
        self.pos += len;
        Ok(rest[..len].to_string())
    }

    fn parse_value(&mut self) -> Result<Option<ArgValue>, CallParseError> {
        if let Some(inner) = self.rest().strip_prefix(ESCAPE_TOKEN) {
            let begin = self.pos;
            let len = inner
                .find(ESCAPE_TOKEN)
                .ok_or(CallParseError::UnterminatedEscape(begin))?;
            self.pos += ESCAPE_TOKEN.len() + len + ESCAPE_TOKEN.len();
            return Ok(Some(ArgValue::Text(inner[..len].to_string())));
        }

        match self.peek() {
            Some('"') => self.parse_quoted().map(|s| Some(ArgValue::Text(s))),
            Some('{' | '[') => Err(self.error("nested values are not supported")),
            None => Err(self.error("unbalanced braces")),
            Some(_) => self.parse_scalar(),
        }
    }

    fn parse_scalar(&mut self) -> Result<Option<ArgValue>, CallParseError> {
        let rest = self.rest();
        let len = rest
            .find(|c: char| c == ',' || c == '}' || c.is_whitespace())
            .unwrap_or(rest.len());
        let word = &rest[..len];
        let value = match word {
            "null" => None,
            "true" => Some(ArgValue::Bool(true)),
            "false" => Some(ArgValue::Bool(false)),
            w if is_number(w) => Some(ArgValue::Number(w.to_string())),
            _ => return Err(self.error("expected a value")),
        };
        self.pos += len;
        Ok(value)
    }

    fn parse_quoted(&mut self) -> Result<String, CallParseError> {
        self.expect('"', "expected `\"`")?;
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(out),
                Some('\\') => {
                    let c = match self.bump() {
                        Some('"') => '"',
                        Some('\\') => '\\',
                        Some('/') => '/',
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('r') => '\r',
                        _ => return Err(self.error("invalid escape in string")),
                    };
                    out.push(c);
                }
                Some(c) => out.push(c),
                None => return Err(self.error("unterminated string")),
            }
        }
    }
}

fn is_number(word: &str) -> bool {
    let starts_ok = word
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || c == '-');
    starts_ok
        && word
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E'))
        && word.parse::<f64>().is_ok()
}
