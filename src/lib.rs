//! Ingestion core for OSM change files.
//!
//! [`changeset`] streams the elements of a gzip compressed `osmChange`
//! file as typed change events. [`mapping`] decides which of those
//! elements, and which of their tags, the import keeps.

pub mod app;
pub mod changeset;
pub mod config;
pub mod element;
pub mod mapping;
pub mod pipeline;
pub mod sinks;
