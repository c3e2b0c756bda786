//! Extension to factory mapping.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::factory::SharedFactory;

/// Known template file extensions and the factory each one is parsed with.
///
/// Extensions are stored with their leading `.`; one is prepended when
/// missing. Each extension maps to exactly one factory, the last one
/// registered. Iteration is lexicographic, which makes search-path fallback
/// deterministic when several candidates exist.
#[derive(Clone, Default)]
pub struct Extensions {
    map: BTreeMap<String, SharedFactory>,
}

impl Extensions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `ext` to `factory`, replacing any previous binding.
    ///
    /// Empty extensions are ignored.
    pub fn insert(&mut self, ext: impl Into<String>, factory: SharedFactory) {
        if let Some(ext) = normalize(ext.into()) {
            self.map.insert(ext, factory);
        }
    }

    /// Returns the factory bound to exactly `ext`.
    pub fn get(&self, ext: &str) -> Option<&SharedFactory> {
        self.map.get(ext)
    }

    pub fn contains(&self, ext: &str) -> bool {
        self.map.contains_key(ext)
    }

    /// Extensions in lexicographic order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SharedFactory)> {
        self.map.iter().map(|(ext, factory)| (ext.as_str(), factory))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns the longest known extension that is a proper suffix of `name`.
    pub fn matching_suffix(&self, name: &str) -> Option<&str> {
        self.keys()
            .filter(|ext| name.len() > ext.len() && name.ends_with(ext))
            .max_by_key(|ext| ext.len())
    }
}

impl fmt::Debug for Extensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.map.iter().map(|(ext, factory)| (ext, Arc::as_ptr(factory))))
            .finish()
    }
}

fn normalize(ext: String) -> Option<String> {
    if ext.is_empty() {
        None
    } else if ext.starts_with('.') {
        Some(ext)
    } else {
        Some(format!(".{ext}"))
    }
}
