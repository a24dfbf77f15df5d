// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resolves `[File] Extends=<id>` chains: a document extending a parent
//! loads the parent first, then overlays its own groups on top.

use crate::document::Document;
use crate::parser::{self, ConfigError};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("reading `{path}`: {source}")]
    Io { path: String, #[source] source: std::io::Error },
    #[error(transparent)]
    Parse(#[from] ConfigError),
    #[error("`{id}` extends unknown config id `{parent}`")]
    UnknownParent { id: String, parent: String },
    #[error("extends cycle detected at `{id}`")]
    ExtendsCycle { id: String },
}

/// Resolves a config id (e.g. an event-match file's basename) to its
/// on-disk path. Supplied by the daemon's config-directory scan.
pub trait IdResolver {
    fn resolve(&self, id: &str) -> Option<std::path::PathBuf>;
}

/// Load `path` and follow any `[File] Extends=` chain to completion.
///
/// `id` identifies `path` for cycle detection and error messages; it need
/// not match the filesystem name.
pub fn load_with_extends(
    id: &str,
    path: &Path,
    resolver: &dyn IdResolver,
) -> Result<Document, LoadError> {
    load_chain(id, path, resolver, &mut Vec::new())
}

fn load_chain(
    id: &str,
    path: &Path,
    resolver: &dyn IdResolver,
    visiting: &mut Vec<String>,
) -> Result<Document, LoadError> {
    if visiting.iter().any(|v| v == id) {
        return Err(LoadError::ExtendsCycle { id: id.to_string() });
    }
    visiting.push(id.to_string());

    let text = std::fs::read_to_string(path)
        .map_err(|source| LoadError::Io { path: path.display().to_string(), source })?;
    let doc = parser::parse(&text)?;

    let result = match doc.get("File").and_then(|g| g.get("Extends")) {
        Some(parent_id) => {
            let parent_id = parent_id.to_string();
            let parent_path = resolver
                .resolve(&parent_id)
                .ok_or_else(|| LoadError::UnknownParent { id: id.to_string(), parent: parent_id.clone() })?;
            let base = load_chain(&parent_id, &parent_path, resolver, visiting)?;
            Ok(doc.merge_onto(base))
        }
        None => Ok(doc),
    };
    visiting.pop();
    result
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
