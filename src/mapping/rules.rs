//! Rule tables and their compilation from a mapping file.

use std::collections::{HashMap, HashSet};

use super::MappingError;
use super::filter::{RelationTagFilter, TagFilter};
use crate::config::{GeometryType, MappingConfig};

/// Rule value that accepts every value of its key.
pub const ANY_VALUE: &str = "__any__";

/// Tag matching rules of one or more geometry types.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleTable {
    values: HashMap<String, HashSet<String>>,
    extra_tags: HashSet<String>,
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `value` for `key`. Use [`ANY_VALUE`] to accept all values.
    pub fn insert_rule(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values
            .entry(key.into())
            .or_default()
            .insert(value.into());
    }

    /// Keep `key` on filtered elements even if it matches no rule.
    pub fn insert_extra_tag(&mut self, key: impl Into<String>) {
        self.extra_tags.insert(key.into());
    }

    /// Union of keys, per-key union of values and union of extra tags.
    pub fn merge(&mut self, other: &RuleTable) {
        for (key, values) in &other.values {
            self.values
                .entry(key.clone())
                .or_default()
                .extend(values.iter().cloned());
        }
        self.extra_tags.extend(other.extra_tags.iter().cloned());
    }

    pub fn matches(&self, key: &str, value: &str) -> bool {
        self.values
            .get(key)
            .is_some_and(|values| values.contains(ANY_VALUE) || values.contains(value))
    }

    pub fn is_extra_tag(&self, key: &str) -> bool {
        self.extra_tags.contains(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.extra_tags.is_empty()
    }
}

/// Compiled mapping: one merged rule table per geometry type.
#[derive(Debug, Clone, Default)]
pub struct Mapping {
    tables: HashMap<GeometryType, RuleTable>,
}

impl Mapping {
    /// Compile a mapping from config.
    pub fn compile(config: &MappingConfig) -> Result<Self, MappingError> {
        let mut tables: HashMap<GeometryType, RuleTable> = HashMap::new();

        for (name, table) in &config.tables {
            let rules = tables.entry(table.geometry).or_default();
            for (key, values) in &table.mapping {
                if values.is_empty() {
                    return Err(MappingError::EmptyValues {
                        table: name.clone(),
                        key: key.clone(),
                    });
                }
                for value in values {
                    rules.insert_rule(key.as_str(), value.as_str());
                }
            }
            for key in &table.extra_tags {
                rules.insert_extra_tag(key.as_str());
            }
            tracing::debug!(
                "Mapping: table '{}' ({}) with {} keys",
                name,
                table.geometry.label(),
                table.mapping.len()
            );
        }

        Ok(Mapping { tables })
    }

    /// Rules of a single geometry type; empty if no table uses it.
    pub fn rule_table(&self, geometry: GeometryType) -> RuleTable {
        self.tables.get(&geometry).cloned().unwrap_or_default()
    }

    fn merged(&self, geometries: &[GeometryType]) -> RuleTable {
        let mut merged = RuleTable::new();
        for geometry in geometries {
            if let Some(table) = self.tables.get(geometry) {
                merged.merge(table);
            }
        }
        merged
    }

    pub fn node_tag_filter(&self) -> TagFilter {
        TagFilter::new(self.merged(&[GeometryType::Point]))
    }

    /// Ways can become linestrings or polygons, so both rule sets apply.
    pub fn way_tag_filter(&self) -> TagFilter {
        TagFilter::new(self.merged(&[GeometryType::Linestring, GeometryType::Polygon]))
    }

    pub fn relation_tag_filter(&self) -> RelationTagFilter {
        RelationTagFilter::new(self.merged(&[GeometryType::Linestring, GeometryType::Polygon]))
    }
}
