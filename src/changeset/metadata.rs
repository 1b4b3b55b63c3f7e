use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use super::reader::parse_or_zero;
use crate::element::Metadata;

/// Apply one provenance attribute of a `node`/`way`/`relation` marker.
/// Attributes that are not provenance fields are ignored.
pub(super) fn apply_metadata_attr(meta: &mut Metadata, key: &[u8], value: &str) {
    match key {
        b"version" => meta.version = parse_or_zero("version", value),
        b"uid" => meta.uid = parse_or_zero("uid", value),
        b"user" => meta.user = value.to_string(),
        b"changeset" => meta.changeset = parse_or_zero("changeset", value),
        b"timestamp" => meta.timestamp = parse_timestamp(value),
        _ => {}
    }
}

/// Parse an RFC 3339 timestamp, falling back to the Unix epoch.
pub fn parse_timestamp(value: &str) -> OffsetDateTime {
    match OffsetDateTime::parse(value, &Rfc3339) {
        Ok(ts) => ts,
        Err(err) => {
            tracing::warn!(value, %err, "unparsable timestamp, using epoch");
            OffsetDateTime::UNIX_EPOCH
        }
    }
}
