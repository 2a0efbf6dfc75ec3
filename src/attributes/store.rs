// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Per-mesh attribute cache

use super::{AttributeTable, ElementDomain};
use crate::error::{MeshError, Result};
use ahash::AHashMap;

#[derive(Debug, Clone)]
struct StoredAttribute {
    domain: ElementDomain,
    table: AttributeTable,
}

/// Cached attribute tables keyed by name; owned by exactly one mesh
#[derive(Debug, Clone, Default)]
pub struct AttributeStore {
    entries: AHashMap<String, StoredAttribute>,
}

impl AttributeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Result<&AttributeTable> {
        self.entries
            .get(name)
            .map(|entry| &entry.table)
            .ok_or_else(|| MeshError::NotFound(format!("attribute {}", name)))
    }

    pub fn domain(&self, name: &str) -> Option<ElementDomain> {
        self.entries.get(name).map(|entry| entry.domain)
    }

    pub fn insert(
        &mut self,
        name: impl Into<String>,
        domain: ElementDomain,
        table: AttributeTable,
    ) {
        self.entries.insert(name.into(), StoredAttribute { domain, table });
    }

    pub fn remove(&mut self, name: &str) -> Option<AttributeTable> {
        self.entries.remove(name).map(|entry| entry.table)
    }

    /// Cached names in alphabetical order
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
