use crate::error::{CrawlError, Result};
use crate::result::CrawlRecord;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Receives records one at a time as the crawler produces them.
pub trait RecordSink: Send + Sync {
    fn write(&self, record: &CrawlRecord) -> Result<()>;
}

/// Callback invoked for every record, e.g. to drive progress output
pub type RecordCallback = Arc<dyn Fn(&CrawlRecord) + Send + Sync>;

/// Appends one JSON object per line, flushing after every record so a
/// crash never loses pages that were already crawled.
pub struct JsonlSink {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl JsonlSink {
    pub fn append(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSink for JsonlSink {
    fn write(&self, record: &CrawlRecord) -> Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| CrawlError::Sink(format!("writer for {} poisoned", self.path.display())))?;
        serde_json::to_writer(&mut *writer, record)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

/// Forwards each record to a callback.
pub struct CallbackSink {
    callback: RecordCallback,
}

impl CallbackSink {
    pub fn new(callback: RecordCallback) -> Self {
        Self { callback }
    }
}

impl RecordSink for CallbackSink {
    fn write(&self, record: &CrawlRecord) -> Result<()> {
        (self.callback)(record);
        Ok(())
    }
}

/// Reads back a JSONL file written by `JsonlSink`.
pub fn read_jsonl(path: impl AsRef<Path>) -> Result<Vec<CrawlRecord>> {
    let content = std::fs::read_to_string(path)?;
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).map_err(CrawlError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(title: &str, depth: usize) -> CrawlRecord {
        CrawlRecord::new(
            format!("https://en.wikipedia.org/wiki/{}", title),
            title.to_string(),
            format!("https://en.wikipedia.org/wiki/{}", title),
            format!("About {}", title),
            depth,
        )
    }

    #[test]
    fn test_jsonl_sink_appends_lines() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join("wiki.jsonl");

        let sink = JsonlSink::append(&path)?;
        sink.write(&record("Encryption", 0))?;
        sink.write(&record("Cipher", 1))?;
        drop(sink);

        // Reopening keeps the earlier lines
        let sink = JsonlSink::append(&path)?;
        sink.write(&record("Key", 2))?;

        let content = std::fs::read_to_string(&path)?;
        assert_eq!(content.lines().count(), 3);

        let records = read_jsonl(&path)?;
        let titles: Vec<_> = records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Encryption", "Cipher", "Key"]);
        Ok(())
    }

    #[test]
    fn test_callback_sink_forwards() -> Result<()> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let sink = CallbackSink::new(Arc::new(move |r: &CrawlRecord| {
            seen_clone.lock().unwrap().push(r.title.clone());
        }));
        sink.write(&record("A", 0))?;
        sink.write(&record("B", 1))?;
        assert_eq!(*seen.lock().unwrap(), vec!["A".to_string(), "B".to_string()]);
        Ok(())
    }
}
