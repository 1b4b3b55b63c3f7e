//! Decoder for gzip compressed OSM change files (`.osc.gz`).
//!
//! [`parse`] and [`parse_full`] scan the file on a dedicated thread and
//! hand each closed `node`/`way`/`relation` element to the consumer through
//! a rendezvous channel, in file order. A fatal error is delivered as the
//! last item of the stream. [`ChangeReader`] exposes the same state machine
//! as a plain iterator over any buffered reader.
//!
//! Malformed numbers and unknown relation members are tolerated: numbers
//! default to zero and bad members are dropped, so real-world diffs with
//! small defects still apply.

mod error;
mod metadata;
mod reader;

use crossbeam_channel::{Receiver, Sender, bounded};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

use crate::element::Element;

pub use self::error::DecodeError;
pub use self::metadata::parse_timestamp;
pub use self::reader::{ChangeReader, GzFileReader};

/// Section of the change file an element was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Operation {
    #[serde(rename = "create")]
    Added,
    #[serde(rename = "modify")]
    Modified,
    #[serde(rename = "delete")]
    Deleted,
}

/// One element together with the operation that applies to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeEvent {
    #[serde(rename = "op")]
    pub operation: Operation,
    #[serde(flatten)]
    pub element: Element,
}

/// Items of a [`ChangeStream`].
pub type ChangeResult = Result<ChangeEvent, DecodeError>;

/// Decode a change file without provenance metadata.
pub fn parse(path: impl AsRef<Path>) -> ChangeStream {
    ChangeStream::spawn(path.as_ref().to_path_buf(), false)
}

/// Decode a change file and capture version, user, changeset and
/// timestamp of every element.
pub fn parse_full(path: impl AsRef<Path>) -> ChangeStream {
    ChangeStream::spawn(path.as_ref().to_path_buf(), true)
}

/// Change events produced by a background decoder thread.
///
/// Dropping the stream stops the decoder at its next hand-off and joins
/// the thread; the file is closed on every exit path.
pub struct ChangeStream {
    receiver: Option<Receiver<ChangeResult>>,
    worker: Option<JoinHandle<()>>,
}

impl ChangeStream {
    fn spawn(path: PathBuf, with_metadata: bool) -> Self {
        let (tx, rx) = bounded::<ChangeResult>(0);
        let worker = std::thread::spawn(move || run_decoder(&path, with_metadata, &tx));
        Self {
            receiver: Some(rx),
            worker: Some(worker),
        }
    }
}

impl Iterator for ChangeStream {
    type Item = ChangeResult;

    fn next(&mut self) -> Option<Self::Item> {
        self.receiver.as_ref()?.recv().ok()
    }
}

impl Drop for ChangeStream {
    fn drop(&mut self) {
        // Disconnect first so a decoder blocked on send can exit.
        drop(self.receiver.take());
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            tracing::error!("changeset decoder thread panicked");
        }
    }
}

fn run_decoder(path: &Path, with_metadata: bool, tx: &Sender<ChangeResult>) {
    tracing::debug!("decoding changeset {:?} (metadata: {})", path, with_metadata);

    let reader = match ChangeReader::from_path(path, with_metadata) {
        Ok(reader) => reader,
        Err(err) => {
            let _ = tx.send(Err(err));
            return;
        }
    };

    for item in reader {
        if tx.send(item).is_err() {
            tracing::debug!("change stream dropped, stopping decoder for {:?}", path);
            return;
        }
    }
}
