//! OSM element records produced by the changeset decoder.

use serde::Serialize;
use std::collections::HashMap;
use std::str::FromStr;
use time::OffsetDateTime;

/// Key/value tags of a single element.
pub type Tags = HashMap<String, String>;

/// Provenance attributes of an element, only captured by `parse_full`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metadata {
    pub version: i32,
    pub uid: i64,
    pub user: String,
    pub changeset: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            version: 0,
            uid: 0,
            user: String::new(),
            changeset: 0,
            timestamp: OffsetDateTime::UNIX_EPOCH,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Node {
    pub id: i64,
    pub lat: f64,
    pub lon: f64,
    pub tags: Tags,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Way {
    pub id: i64,
    pub refs: Vec<i64>,
    pub tags: Tags,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Relation {
    pub id: i64,
    pub members: Vec<Member>,
    pub tags: Tags,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    #[serde(rename = "type")]
    pub kind: MemberType,
    #[serde(rename = "ref")]
    pub id: i64,
    pub role: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberType {
    Node,
    Way,
    Relation,
}

impl FromStr for MemberType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "node" => Ok(MemberType::Node),
            "way" => Ok(MemberType::Way),
            "relation" => Ok(MemberType::Relation),
            _ => Err(format!("invalid member type: {value}")),
        }
    }
}

/// A node, way or relation. Exactly one kind per change.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Element {
    Node(Node),
    Way(Way),
    Relation(Relation),
}

impl Element {
    pub fn id(&self) -> i64 {
        match self {
            Element::Node(node) => node.id,
            Element::Way(way) => way.id,
            Element::Relation(rel) => rel.id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Element::Node(_) => "node",
            Element::Way(_) => "way",
            Element::Relation(_) => "relation",
        }
    }

    pub fn tags(&self) -> &Tags {
        match self {
            Element::Node(node) => &node.tags,
            Element::Way(way) => &way.tags,
            Element::Relation(rel) => &rel.tags,
        }
    }

    pub fn tags_mut(&mut self) -> &mut Tags {
        match self {
            Element::Node(node) => &mut node.tags,
            Element::Way(way) => &mut way.tags,
            Element::Relation(rel) => &mut rel.tags,
        }
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        match self {
            Element::Node(node) => node.metadata.as_ref(),
            Element::Way(way) => way.metadata.as_ref(),
            Element::Relation(rel) => rel.metadata.as_ref(),
        }
    }
}
