// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Format strings and icon/sound URI resolution for notification
//! rendering (spec §9 Design Notes).
//!
//! Format tokens: `${name}`, `${name[key]}` (dictionary sub-key),
//! `${name@joiner}` (array join), `${name+index}` (array element).
//! Grounded on the original's `libeventd-helpers` format-string expander,
//! re-expressed as a small token AST rather than re-scanning the string
//! on every substitution.

use crate::value::Value;
use indexmap::IndexMap;
use std::fmt::Write as _;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Literal(String),
    Name(String),
    NameKey(String, String),
    NameJoiner(String, String),
    NameIndex(String, i64),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("unterminated `${{` in format string at byte {0}")]
    Unterminated(usize),
    #[error("empty substitution name in format string at byte {0}")]
    EmptyName(usize),
}

/// A parsed format string, ready to render against event data repeatedly.
#[derive(Debug, Clone, PartialEq)]
pub struct Format {
    tokens: Vec<Token>,
}

impl Format {
    pub fn parse(template: &str) -> Result<Format, FormatError> {
        let mut tokens = Vec::new();
        let mut literal = String::new();
        let bytes = template.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'$' && bytes.get(i + 1) == Some(&b'{') {
                let start = i;
                let close = template[i + 2..]
                    .find('}')
                    .map(|p| i + 2 + p)
                    .ok_or(FormatError::Unterminated(start))?;
                if !literal.is_empty() {
                    tokens.push(Token::Literal(std::mem::take(&mut literal)));
                }
                let inner = &template[i + 2..close];
                tokens.push(parse_substitution(inner, start)?);
                i = close + 1;
            } else {
                let ch_len = template[i..].chars().next().map(char::len_utf8).unwrap_or(1);
                literal.push_str(&template[i..i + ch_len]);
                i += ch_len;
            }
        }
        if !literal.is_empty() {
            tokens.push(Token::Literal(literal));
        }
        Ok(Format { tokens })
    }

    /// Render against `data`, substituting unresolvable tokens with an
    /// empty string (spec: missing data never aborts rendering).
    pub fn render(&self, data: &IndexMap<String, Value>) -> String {
        let mut out = String::new();
        for token in &self.tokens {
            match token {
                Token::Literal(s) => out.push_str(s),
                Token::Name(name) => {
                    if let Some(v) = data.get(name) {
                        let _ = write!(out, "{v}");
                    }
                }
                Token::NameKey(name, key) => {
                    if let Some(sub) = data.get(name).and_then(|v| v.get(key)) {
                        let _ = write!(out, "{sub}");
                    }
                }
                Token::NameJoiner(name, joiner) => {
                    if let Some(Value::Array(items)) = data.get(name) {
                        for (i, item) in items.iter().enumerate() {
                            if i > 0 {
                                out.push_str(joiner);
                            }
                            let _ = write!(out, "{item}");
                        }
                    }
                }
                Token::NameIndex(name, idx) => {
                    if let Some(Value::Array(items)) = data.get(name) {
                        let resolved = if *idx >= 0 {
                            usize::try_from(*idx).ok()
                        } else {
                            items.len().checked_sub(idx.unsigned_abs() as usize)
                        };
                        if let Some(item) = resolved.and_then(|i| items.get(i)) {
                            let _ = write!(out, "{item}");
                        }
                    }
                }
            }
        }
        out
    }
}

fn parse_substitution(inner: &str, at: usize) -> Result<Token, FormatError> {
    if let Some(pos) = inner.find('[') {
        let name = &inner[..pos];
        let key = inner[pos + 1..].strip_suffix(']').unwrap_or(&inner[pos + 1..]);
        if name.is_empty() {
            return Err(FormatError::EmptyName(at));
        }
        return Ok(Token::NameKey(name.to_string(), key.to_string()));
    }
    if let Some(pos) = inner.find('@') {
        let name = &inner[..pos];
        if name.is_empty() {
            return Err(FormatError::EmptyName(at));
        }
        return Ok(Token::NameJoiner(name.to_string(), inner[pos + 1..].to_string()));
    }
    if let Some(pos) = inner.find('+') {
        let name = &inner[..pos];
        if name.is_empty() {
            return Err(FormatError::EmptyName(at));
        }
        let idx = inner[pos + 1..].parse::<i64>().unwrap_or(0);
        return Ok(Token::NameIndex(name.to_string(), idx));
    }
    if inner.is_empty() {
        return Err(FormatError::EmptyName(at));
    }
    Ok(Token::Name(inner.to_string()))
}

/// A resolved icon/sound reference (spec §9): a local file, inline
/// base64 data, or a named theme icon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UriRef {
    File(String),
    Data { mime: Option<String>, bytes: Vec<u8> },
    Theme { theme: Option<String>, name: String },
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UriError {
    #[error("unrecognized URI scheme in `{0}`")]
    UnknownScheme(String),
    #[error("malformed data: URI `{0}`")]
    MalformedData(String),
}

/// Resolve an icon/sound reference string into its [`UriRef`].
///
/// Grounded on the original's `eventd_nd_notification_set_image` resolver:
/// `file://`, `data:[<mime>];base64,<payload>`, and `theme:[<theme>/]<name>`.
pub fn resolve_uri(s: &str) -> Result<UriRef, UriError> {
    if let Some(path) = s.strip_prefix("file://") {
        return Ok(UriRef::File(path.to_string()));
    }
    if let Some(rest) = s.strip_prefix("data:") {
        let (meta, payload) = rest.split_once(',').ok_or_else(|| UriError::MalformedData(s.to_string()))?;
        let mime = meta.strip_suffix(";base64").map(|m| m.to_string()).filter(|m| !m.is_empty());
        let bytes = base64::Engine::decode(&base64::engine::general_purpose::STANDARD, payload)
            .map_err(|_| UriError::MalformedData(s.to_string()))?;
        return Ok(UriRef::Data { mime, bytes });
    }
    if let Some(rest) = s.strip_prefix("theme:") {
        return Ok(match rest.split_once('/') {
            Some((theme, name)) => UriRef::Theme { theme: Some(theme.to_string()), name: name.to_string() },
            None => UriRef::Theme { theme: None, name: rest.to_string() },
        });
    }
    Err(UriError::UnknownScheme(s.to_string()))
}

#[cfg(test)]
#[path = "format_tests.rs"]
mod tests;
