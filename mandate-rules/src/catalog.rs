//! Catalog loading and load-time validation.
//!
//! A catalog is an ordered list of rules. Order matters: hits are reported
//! in catalog order, so loading is deterministic (directory entries are
//! sorted by file name). Titles are validated once here — non-empty and
//! unique — and each rule receives a stable internal key that the engine
//! uses to join obligations back to their rule.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use mandate_protocol::Rule;
use serde::Deserialize;

use crate::error::CatalogError;

/// A rule plus the internal key assigned at load time.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub key: usize,
    pub rule: Rule,
}

/// A validated, ordered rule catalog.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    rules: Vec<Rule>,
}

impl Catalog {
    /// Validates the rule list and assigns internal keys, preserving the
    /// given order. Titles must be non-empty and unique: the public id is
    /// derived from the title, so duplicates would alias.
    pub fn from_rules(rules: Vec<Rule>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for (index, rule) in rules.iter().enumerate() {
            let title = rule.title.trim();
            if title.is_empty() {
                return Err(CatalogError::EmptyTitle { index });
            }
            if !seen.insert(title.to_string()) {
                return Err(CatalogError::DuplicateTitle {
                    title: title.to_string(),
                });
            }
        }

        let entries = rules
            .into_iter()
            .enumerate()
            .map(|(key, rule)| CatalogEntry { key, rule })
            .collect();
        Ok(Self { entries })
    }

    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }

    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.entries.iter().map(|entry| &entry.rule)
    }

    /// Looks a rule up by its internal key.
    pub fn rule(&self, key: usize) -> Option<&Rule> {
        self.entries.get(key).map(|entry| &entry.rule)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_rules(self) -> Vec<Rule> {
        self.entries.into_iter().map(|entry| entry.rule).collect()
    }
}

/// Loads and validates a catalog from a file or directory.
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Catalog, CatalogError> {
    Catalog::from_rules(load_rules(path)?)
}

/// Loads rules from a file or directory without validating them. A
/// directory is read non-recursively; only `.json`, `.yaml`, and `.yml`
/// entries are considered, in file-name order.
pub fn load_rules(path: impl AsRef<Path>) -> Result<Vec<Rule>, CatalogError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(CatalogError::MissingPath(path.display().to_string()));
    }

    if path.is_dir() {
        let mut files: Vec<PathBuf> = Vec::new();
        for entry in fs::read_dir(path).map_err(|err| CatalogError::from_io(path, err))? {
            let entry = entry.map_err(|err| CatalogError::from_io(path, err))?;
            let entry_path = entry.path();
            if entry_path.is_dir() {
                continue;
            }
            if matches!(
                entry_path.extension().and_then(|ext| ext.to_str()),
                Some("json" | "yaml" | "yml")
            ) {
                files.push(entry_path);
            }
        }
        files.sort();

        let mut rules = Vec::new();
        for file in files {
            rules.extend(load_rules_file(&file)?);
        }
        Ok(rules)
    } else {
        load_rules_file(path)
    }
}

fn load_rules_file(path: &Path) -> Result<Vec<Rule>, CatalogError> {
    let raw = fs::read_to_string(path).map_err(|err| CatalogError::from_io(path, err))?;
    let is_yaml = matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml" | "yml")
    );
    if is_yaml {
        parse_yaml(path, &raw)
    } else {
        parse_json(path, &raw)
    }
}

// Catalog files may hold a wrapper document, a bare list, or a single rule;
// the shapes are tried in that order.
fn parse_json(path: &Path, raw: &str) -> Result<Vec<Rule>, CatalogError> {
    if let Ok(document) = serde_json::from_str::<CatalogDocument>(raw) {
        return Ok(document.rules);
    }
    if let Ok(rules) = serde_json::from_str::<Vec<Rule>>(raw) {
        return Ok(rules);
    }
    match serde_json::from_str::<Rule>(raw) {
        Ok(rule) => Ok(vec![rule]),
        Err(err) => Err(CatalogError::parse_error(path, err.to_string())),
    }
}

fn parse_yaml(path: &Path, raw: &str) -> Result<Vec<Rule>, CatalogError> {
    if let Ok(document) = serde_yaml::from_str::<CatalogDocument>(raw) {
        return Ok(document.rules);
    }
    if let Ok(rules) = serde_yaml::from_str::<Vec<Rule>>(raw) {
        return Ok(rules);
    }
    match serde_yaml::from_str::<Rule>(raw) {
        Ok(rule) => Ok(vec![rule]),
        Err(err) => Err(CatalogError::parse_error(path, err.to_string())),
    }
}
