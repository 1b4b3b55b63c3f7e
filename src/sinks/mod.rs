use anyhow::Result;
use serde::Serialize;

use crate::changeset::ChangeEvent;

pub mod jsonl;

pub use self::jsonl::JsonlSink;

/// A filtered change ready to be written.
#[derive(Clone, Debug, Serialize)]
pub struct ChangeRecord {
    #[serde(flatten)]
    pub change: ChangeEvent,
    pub relevant: bool,
}

pub trait ChangeSink: Send {
    fn add_change(&mut self, record: ChangeRecord) -> Result<()>;
    fn finish(&mut self) -> Result<()>;
}
