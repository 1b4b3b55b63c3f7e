//! Streaming `osmChange` state machine.

use flate2::bufread::MultiGzDecoder;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::mem;
use std::path::Path;
use std::str::FromStr;

use super::error::DecodeError;
use super::metadata::apply_metadata_attr;
use super::{ChangeEvent, Operation};
use crate::element::{Element, Member, MemberType, Metadata, Node, Relation, Tags, Way};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Buffered reader over a gzip compressed file.
pub type GzFileReader = BufReader<MultiGzDecoder<BufReader<File>>>;

/// Pull-based decoder yielding one [`ChangeEvent`] per closed element.
///
/// The iterator is finite and not restartable. A fatal error is yielded
/// as the last item.
pub struct ChangeReader<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    state: ParseState,
    done: bool,
}

enum Step {
    Continue,
    Emit(ChangeEvent),
    Finish,
}

/// Scratch state shared between markers. The per-kind builders are moved
/// out on hand-off and left empty for the next element.
#[derive(Default)]
struct ParseState {
    with_metadata: bool,
    operation: Option<Operation>,
    node: Node,
    way: Way,
    relation: Relation,
    tags: Tags,
}

impl<R: BufRead> ChangeReader<R> {
    /// Decode uncompressed markup from any buffered reader.
    pub fn new(inner: R, with_metadata: bool) -> Self {
        let mut reader = Reader::from_reader(inner);
        reader.trim_text(true);
        Self {
            reader,
            buf: Vec::new(),
            state: ParseState {
                with_metadata,
                ..ParseState::default()
            },
            done: false,
        }
    }

    fn next_change(&mut self) -> Result<Option<ChangeEvent>, DecodeError> {
        loop {
            self.buf.clear();
            let step = match self.reader.read_event_into(&mut self.buf)? {
                Event::Start(e) => {
                    self.state.start(&e)?;
                    Step::Continue
                }
                Event::Empty(e) => {
                    self.state.start(&e)?;
                    self.state.end(e.local_name().as_ref())
                }
                Event::End(e) => self.state.end(e.local_name().as_ref()),
                Event::Eof => return Err(DecodeError::UnexpectedEof),
                _ => Step::Continue,
            };

            match step {
                Step::Continue => {}
                Step::Emit(change) => return Ok(Some(change)),
                Step::Finish => return Ok(None),
            }
        }
    }
}

impl ChangeReader<GzFileReader> {
    /// Open a gzip compressed changeset file.
    pub fn from_path(path: &Path, with_metadata: bool) -> Result<Self, DecodeError> {
        let file = File::open(path).map_err(|source| DecodeError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let mut file = BufReader::new(file);

        let head = file.fill_buf()?;
        if !head.starts_with(&GZIP_MAGIC) {
            let reason = if head.is_empty() {
                "file is empty".to_string()
            } else {
                "missing gzip header".to_string()
            };
            return Err(DecodeError::Gzip {
                path: path.to_path_buf(),
                reason,
            });
        }

        let decoder = BufReader::new(MultiGzDecoder::new(file));
        Ok(Self::new(decoder, with_metadata))
    }
}

impl<R: BufRead> Iterator for ChangeReader<R> {
    type Item = Result<ChangeEvent, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_change() {
            Ok(Some(change)) => Some(Ok(change)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl ParseState {
    fn start(&mut self, e: &BytesStart<'_>) -> Result<(), DecodeError> {
        match e.local_name().as_ref() {
            b"create" => self.operation = Some(Operation::Added),
            b"modify" => self.operation = Some(Operation::Modified),
            b"delete" => self.operation = Some(Operation::Deleted),
            b"node" => {
                let node = &mut self.node;
                let mut meta = self.with_metadata.then(Metadata::default);
                for_each_attr(e, |key, value| {
                    match key {
                        b"id" => node.id = parse_or_zero("id", &value),
                        b"lat" => node.lat = parse_or_zero("lat", &value),
                        b"lon" => node.lon = parse_or_zero("lon", &value),
                        _ => {}
                    }
                    if let Some(meta) = meta.as_mut() {
                        apply_metadata_attr(meta, key, &value);
                    }
                })?;
                node.metadata = meta;
            }
            b"way" => {
                let way = &mut self.way;
                let mut meta = self.with_metadata.then(Metadata::default);
                for_each_attr(e, |key, value| {
                    if key == b"id" {
                        way.id = parse_or_zero("id", &value);
                    }
                    if let Some(meta) = meta.as_mut() {
                        apply_metadata_attr(meta, key, &value);
                    }
                })?;
                way.metadata = meta;
            }
            b"relation" => {
                let rel = &mut self.relation;
                let mut meta = self.with_metadata.then(Metadata::default);
                for_each_attr(e, |key, value| {
                    if key == b"id" {
                        rel.id = parse_or_zero("id", &value);
                    }
                    if let Some(meta) = meta.as_mut() {
                        apply_metadata_attr(meta, key, &value);
                    }
                })?;
                rel.metadata = meta;
            }
            b"nd" => {
                let refs = &mut self.way.refs;
                for_each_attr(e, |key, value| {
                    if key == b"ref" {
                        refs.push(parse_or_zero("ref", &value));
                    }
                })?;
            }
            b"member" => {
                if let Some(member) = parse_member(e)? {
                    self.relation.members.push(member);
                }
            }
            b"tag" => {
                let mut k = String::new();
                let mut v = String::new();
                for_each_attr(e, |key, value| match key {
                    b"k" => k = value.into_owned(),
                    b"v" => v = value.into_owned(),
                    _ => {}
                })?;
                self.tags.insert(k, v);
            }
            b"osmChange" => {}
            other => {
                tracing::warn!(
                    "unhandled XML tag {} in OSC",
                    String::from_utf8_lossy(other)
                );
            }
        }
        Ok(())
    }

    fn end(&mut self, name: &[u8]) -> Step {
        let mut element = match name {
            b"node" => Element::Node(mem::take(&mut self.node)),
            b"way" => Element::Way(mem::take(&mut self.way)),
            b"relation" => Element::Relation(mem::take(&mut self.relation)),
            b"osmChange" => return Step::Finish,
            _ => return Step::Continue,
        };
        *element.tags_mut() = mem::take(&mut self.tags);

        match self.operation {
            Some(operation) => Step::Emit(ChangeEvent { operation, element }),
            None => {
                tracing::warn!(
                    kind = element.kind(),
                    id = element.id(),
                    "element outside of create/modify/delete section, skipping"
                );
                Step::Continue
            }
        }
    }
}

/// Returns `None` when the member has to be dropped: unknown or missing
/// `type`, or a non-numeric `ref`.
fn parse_member(e: &BytesStart<'_>) -> Result<Option<Member>, DecodeError> {
    let mut kind = None;
    let mut id = 0;
    let mut role = String::new();
    let mut valid = true;

    for_each_attr(e, |key, value| match key {
        b"type" => match MemberType::from_str(&value) {
            Ok(member_type) => kind = Some(member_type),
            Err(err) => {
                tracing::debug!("{err}, dropping relation member");
                valid = false;
            }
        },
        b"ref" => match value.parse() {
            Ok(member_id) => id = member_id,
            Err(_) => {
                tracing::debug!(value = %value, "invalid member ref, dropping relation member");
                valid = false;
            }
        },
        b"role" => role = value.into_owned(),
        _ => {}
    })?;

    match kind {
        Some(kind) if valid => Ok(Some(Member { kind, id, role })),
        _ => Ok(None),
    }
}

fn for_each_attr<F>(e: &BytesStart<'_>, mut f: F) -> Result<(), DecodeError>
where
    F: FnMut(&[u8], Cow<'_, str>),
{
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let value = attr.unescape_value()?;
        f(attr.key.local_name().as_ref(), value);
    }
    Ok(())
}

/// Lenient numeric parsing: malformed values become zero.
pub(super) fn parse_or_zero<T>(field: &'static str, value: &str) -> T
where
    T: FromStr + Default,
{
    match value.parse() {
        Ok(parsed) => parsed,
        Err(_) => {
            tracing::warn!(field, value, "unparsable numeric attribute, using zero");
            T::default()
        }
    }
}
