use std::io;
use std::path::PathBuf;

/// Fatal decoder failures. Each one ends the change stream.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("failed to open changeset {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("changeset {path:?} is not a gzip stream: {reason}")]
    Gzip { path: PathBuf, reason: String },

    #[error("I/O error while reading changeset: {0}")]
    Io(#[from] io::Error),

    #[error("malformed changeset markup: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("changeset ended before </osmChange>")]
    UnexpectedEof,
}
