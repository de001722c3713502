//! Streaming JSON array output.
//!
//! Dataset files are JSON arrays that can grow far past memory, so records
//! are serialized one at a time into a buffered destination: an opening
//! `[`, comma-separated compact elements, then a closing `]`. Only the
//! record currently being serialized is held in memory, no matter how many
//! elements or destination files a run produces.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::errors::GenerationError;

/// Element count and byte size of one finished destination.
#[derive(Debug, Clone, Copy)]
pub struct FileStats {
    pub records: u64,
    pub bytes: u64,
}

/// Incremental writer for one JSON array destination.
///
/// The destination stays open between [`push`](Self::push) calls, which is
/// what lets the transaction stream span an entire run while session
/// chunks rotate through their own short-lived writers.
pub struct JsonArrayWriter<W: Write> {
    writer: CountingWriter<W>,
    records: u64,
}

impl JsonArrayWriter<BufWriter<File>> {
    /// Opens `path` (creating parent directories) and writes the array
    /// header.
    pub fn create(path: &Path) -> Result<Self, GenerationError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        Self::from_writer(BufWriter::new(File::create(path)?))
    }
}

impl<W: Write> JsonArrayWriter<W> {
    pub fn from_writer(inner: W) -> Result<Self, GenerationError> {
        let mut writer = CountingWriter::new(inner);
        writer.write_all(b"[\n")?;
        Ok(Self { writer, records: 0 })
    }

    /// Serializes one element, preceded by a separator after the first.
    pub fn push<T: Serialize>(&mut self, record: &T) -> Result<(), GenerationError> {
        if self.records > 0 {
            self.writer.write_all(b",\n")?;
        }
        serde_json::to_writer(&mut self.writer, record)?;
        self.records += 1;
        Ok(())
    }

    /// Elements written so far.
    pub fn records(&self) -> u64 {
        self.records
    }

    /// Writes the array footer and flushes the destination.
    pub fn finish(mut self) -> Result<FileStats, GenerationError> {
        self.writer.write_all(b"\n]\n")?;
        self.writer.flush()?;
        Ok(FileStats {
            records: self.records,
            bytes: self.writer.bytes_written(),
        })
    }
}

/// Writes a whole record source as one JSON array file. `progress` is
/// invoked with the running count every `progress_every` elements; pass 0
/// to disable it.
pub fn write_json_array<T, I, F>(
    path: &Path,
    records: I,
    progress_every: u64,
    mut progress: F,
) -> Result<FileStats, GenerationError>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
    F: FnMut(u64),
{
    let mut writer = JsonArrayWriter::create(path)?;
    for record in records {
        writer.push(&record)?;
        if progress_every > 0 && writer.records() % progress_every == 0 {
            progress(writer.records());
        }
    }
    writer.finish()
}

struct CountingWriter<W: Write> {
    inner: W,
    bytes: u64,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, bytes: 0 }
    }

    fn bytes_written(&self) -> u64 {
        self.bytes
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let size = self.inner.write(buf)?;
        self.bytes = self.bytes.saturating_add(size as u64);
        Ok(size)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
