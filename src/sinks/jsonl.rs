use super::{ChangeRecord, ChangeSink};
use anyhow::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes one JSON object per change, newline delimited.
pub struct JsonlSink {
    writer: BufWriter<Box<dyn Write + Send>>,
}

impl JsonlSink {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::from_writer(Box::new(file)))
    }

    pub fn stdout() -> Self {
        Self::from_writer(Box::new(std::io::stdout()))
    }

    pub fn from_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: BufWriter::new(writer),
        }
    }
}

impl ChangeSink for JsonlSink {
    fn add_change(&mut self, record: ChangeRecord) -> Result<()> {
        serde_json::to_writer(&mut self.writer, &record)?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changeset::Operation;
    use crate::element::{Element, Way};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn writes_one_line_per_change() {
        let buf = SharedBuf::default();
        let mut sink = JsonlSink::from_writer(Box::new(buf.clone()));

        for id in [1, 2] {
            let change = crate::changeset::ChangeEvent {
                operation: Operation::Deleted,
                element: Element::Way(Way {
                    id,
                    refs: vec![10, 11],
                    ..Way::default()
                }),
            };
            sink.add_change(ChangeRecord {
                change,
                relevant: false,
            })
            .unwrap();
        }
        sink.finish().unwrap();

        let output = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        let lines: Vec<serde_json::Value> = output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["op"], "delete");
        assert_eq!(lines[0]["kind"], "way");
        assert_eq!(lines[1]["id"], 2);
        assert_eq!(lines[1]["refs"], serde_json::json!([10, 11]));
        assert_eq!(lines[1]["relevant"], false);
    }
}
