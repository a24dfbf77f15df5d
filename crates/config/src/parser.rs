// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A hand-rolled lexer/parser for the keyfile grammar in SPEC_FULL.md §6.
//!
//! No example repo depends on an INI-family crate, and the grammar's
//! group-header quoting rule (`[app]` vs `["app ping"]` vs `["app *"]`)
//! doesn't map onto a TOML/JSON-shaped format crate without contortion —
//! grounded on the teacher's own precedent of hand-rolling `oj-shell`'s
//! lexer/parser with nothing but `std`.

use crate::document::{Document, Group};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("line {line}: expected a `[Header]` group before any key")]
    KeyBeforeGroup { line: usize },
    #[error("line {line}: malformed group header `{text}`")]
    MalformedHeader { line: usize, text: String },
    #[error("line {line}: expected `Key = value`, found `{text}`")]
    MalformedEntry { line: usize, text: String },
    #[error("line {line}: unterminated quoted header `{text}`")]
    UnterminatedHeader { line: usize, text: String },
}

/// Parse one keyfile's contents into a [`Document`].
pub fn parse(input: &str) -> Result<Document, ConfigError> {
    let mut doc = Document::new();
    let mut current_header: Option<String> = None;
    let mut current_group = Group::default();

    for (idx, raw_line) in input.lines().enumerate() {
        let line = idx + 1;
        let trimmed = raw_line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if let Some(inner) = strip_brackets(trimmed) {
            if let Some(header) = current_header.take() {
                doc.push_group(header, std::mem::take(&mut current_group));
            }
            current_header = Some(dequote_header(inner, line)?);
            continue;
        }

        if current_header.is_none() {
            return Err(ConfigError::KeyBeforeGroup { line });
        }
        let (key, value) = trimmed
            .split_once('=')
            .ok_or_else(|| ConfigError::MalformedEntry { line, text: trimmed.to_string() })?;
        let key = key.trim();
        let value = value.trim();
        if key.is_empty() {
            return Err(ConfigError::MalformedEntry { line, text: trimmed.to_string() });
        }
        current_group.insert(key, value);
    }

    if let Some(header) = current_header {
        doc.push_group(header, current_group);
    }

    Ok(doc)
}

fn strip_brackets(line: &str) -> Option<&str> {
    let inner = line.strip_prefix('[')?;
    inner.strip_suffix(']')
}

fn dequote_header(inner: &str, line: usize) -> Result<String, ConfigError> {
    let trimmed = inner.trim();
    match trimmed.strip_prefix('"') {
        Some(rest) => rest
            .strip_suffix('"')
            .filter(|body| !body.contains('"'))
            .map(str::to_string)
            .ok_or_else(|| ConfigError::UnterminatedHeader { line, text: inner.to_string() }),
        None => {
            if trimmed.is_empty() || trimmed.contains('"') {
                return Err(ConfigError::MalformedHeader { line, text: inner.to_string() });
            }
            Ok(trimmed.to_string())
        }
    }
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
