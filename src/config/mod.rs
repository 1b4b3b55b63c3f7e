use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::mapping::MappingError;

/// Tag mapping file: a set of tables, each bound to one geometry type.
#[derive(Debug, Deserialize, Serialize)]
pub struct MappingConfig {
    pub tables: HashMap<String, TableConfig>,
}

impl MappingConfig {
    pub fn load(path: &Path) -> Result<Self, MappingError> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, MappingError> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TableConfig {
    #[serde(rename = "type")]
    pub geometry: GeometryType,
    /// Tag key to accepted values. `__any__` accepts every value.
    #[serde(default)]
    pub mapping: HashMap<String, Vec<String>>,
    /// Keys kept on matching elements even when they select nothing.
    #[serde(default)]
    pub extra_tags: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum GeometryType {
    Point,
    Linestring,
    Polygon,
}

impl GeometryType {
    pub fn label(&self) -> &'static str {
        match self {
            GeometryType::Point => "point",
            GeometryType::Linestring => "linestring",
            GeometryType::Polygon => "polygon",
        }
    }
}

/// Per-run switches for the change pipeline.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct RuntimeConfig {
    /// Capture version, user, changeset and timestamp of every element.
    pub metadata: bool,
    /// Also write elements that match no mapping rule.
    pub keep_irrelevant: bool,
}
