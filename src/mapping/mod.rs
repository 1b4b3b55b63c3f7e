//! Tag mapping: which elements and which of their tags are imported.
//!
//! A [`Mapping`] is compiled from the tables of a mapping file and yields
//! one filter per element kind. Nodes use the point rules, ways and
//! relations the merged linestring and polygon rules.

mod filter;
mod rules;

pub use filter::{RELATION_TYPE_KEY, RelationTagFilter, TagFilter};
pub use rules::{ANY_VALUE, Mapping, RuleTable};

#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    #[error("failed to load mapping file: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("invalid mapping YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("table '{table}' maps key '{key}' to an empty value list")]
    EmptyValues { table: String, key: String },
}
