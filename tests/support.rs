use flate2::Compression;
use flate2::write::GzEncoder;
use std::io::Write;
use tempfile::NamedTempFile;

/// Write `xml` gzip compressed to a temporary `.osc.gz` file.
pub fn gzip_fixture(xml: &str) -> NamedTempFile {
    let file = NamedTempFile::with_suffix(".osc.gz").expect("create fixture");
    let mut encoder = GzEncoder::new(file.reopen().expect("reopen fixture"), Compression::default());
    encoder.write_all(xml.as_bytes()).expect("write fixture");
    encoder.finish().expect("finish gzip stream");
    file
}

pub const SAMPLE_CHANGE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<osmChange version="0.6" generator="test">
  <create>
    <node id="100" version="1" timestamp="2024-05-01T10:00:00Z" uid="7" user="alice" changeset="500" lat="52.5" lon="13.4">
      <tag k="amenity" v="restaurant"/>
      <tag k="name" v="Zur Post"/>
      <tag k="fixme" v="check hours"/>
    </node>
    <node id="101" version="1" timestamp="2024-05-01T10:00:00Z" uid="7" user="alice" changeset="500" lat="52.6" lon="13.5"/>
    <way id="200" version="1" timestamp="2024-05-01T10:00:01Z" uid="7" user="alice" changeset="500">
      <nd ref="100"/>
      <nd ref="101"/>
      <tag k="highway" v="residential"/>
    </way>
  </create>
  <modify>
    <relation id="300" version="3" timestamp="2024-05-02T08:15:00Z" uid="8" user="bob" changeset="501">
      <member type="way" ref="200" role="outer"/>
      <member type="bogus" ref="5" role=""/>
      <tag k="type" v="multipolygon"/>
      <tag k="landuse" v="forest"/>
    </relation>
    <relation id="301" version="2" timestamp="2024-05-02T08:15:00Z" uid="8" user="bob" changeset="501">
      <member type="node" ref="100" role="stop"/>
      <tag k="type" v="route"/>
    </relation>
  </modify>
  <delete>
    <node id="102" version="4" timestamp="2024-05-03T00:00:00Z" uid="9" user="carol" changeset="502" lat="0" lon="0"/>
  </delete>
</osmChange>
"#;

#[allow(dead_code)]
pub const SAMPLE_MAPPING: &str = r#"tables:
  pois:
    type: point
    mapping:
      amenity: [__any__]
    extra_tags: [name]
  roads:
    type: linestring
    mapping:
      highway: [residential, primary]
  landuse:
    type: polygon
    mapping:
      landuse: [forest, meadow]
"#;
