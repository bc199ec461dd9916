//! Persistent record of batch outcomes
//!
//! The log is a JSON array with one object per submitted batch, closed by an
//! empty-object sentinel:
//!
//! ```text
//! [{
//!     "batch": 0,
//!     "candidates": [
//!         "fr"
//!     ],
//!     "loaded": [
//!         75
//!     ],
//!     "model": "res.country",
//!     "state": "success",
//!     "x_msgs": []
//! },{}]
//! ```
//!
//! Keys are sorted, indentation is four spaces and non-ASCII text is written
//! as `\uXXXX` escapes. The whole file is rewritten through a temporary file
//! after every batch, so a crash never leaves a truncated array behind.

use crate::store::{LoadResult, LoadState};
use dagload_common::{LoadError, Result};
use serde::{Deserialize, Serialize};
use serde_json::ser::{Formatter, PrettyFormatter};
use std::collections::HashSet;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const SENTINEL: &[u8] = b"{}]";

/// One persisted batch outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub batch: usize,
    #[serde(default)]
    pub candidates: Vec<String>,
    #[serde(default, deserialize_with = "ids_or_false")]
    pub loaded: Vec<i64>,
    pub model: String,
    pub state: LoadState,
    #[serde(default)]
    pub x_msgs: Vec<String>,
}

impl From<&LoadResult> for LogEntry {
    fn from(result: &LoadResult) -> Self {
        Self {
            batch: result.batch,
            candidates: result.candidates.clone(),
            loaded: result.loaded.clone(),
            model: result.model.clone(),
            state: result.state,
            x_msgs: result.messages.clone(),
        }
    }
}

/// Older logs carry `"loaded": false` for batches that wrote nothing
fn ids_or_false<'de, D>(deserializer: D) -> std::result::Result<Vec<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Ids {
        List(Vec<i64>),
        Flag(bool),
    }

    match Option::<Ids>::deserialize(deserializer)? {
        Some(Ids::List(ids)) => Ok(ids),
        Some(Ids::Flag(false)) | None => Ok(Vec::new()),
        Some(Ids::Flag(true)) => Err(serde::de::Error::custom("expected a list of ids or false")),
    }
}

#[derive(Debug)]
pub struct DedupLog {
    path: PathBuf,
    entries: Vec<LogEntry>,
}

impl DedupLog {
    /// Read the log at `path`; a missing or empty file is an empty log
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match std::fs::read(&path) {
            Ok(content) => parse(&path, &content)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        debug!(path = %path.display(), entries = entries.len(), "Opened dedup log");
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Index values already written into `model` by an earlier batch
    pub fn loaded_identifiers(&self, model: &str) -> HashSet<String> {
        self.entries
            .iter()
            .filter(|e| e.model == model && e.state == LoadState::Success)
            .flat_map(|e| e.candidates.iter().cloned())
            .collect()
    }

    /// Fail early when the log's directory does not accept new files
    ///
    /// Called before the first store write so an outcome is never committed
    /// without a place to record it.
    pub fn ensure_writable(&self) -> Result<()> {
        let probe = tempfile::NamedTempFile::new_in(self.dir())?;
        probe.close()?;
        Ok(())
    }

    /// Append one outcome and persist the log
    ///
    /// The whole file is rewritten on every call, so a run that records `b`
    /// batches on top of `n` existing entries writes O(b * (n + b)) bytes.
    /// Logs are meant to be rotated per data migration, not kept forever.
    pub fn record(&mut self, result: &LoadResult) -> Result<()> {
        self.entries.push(LogEntry::from(result));
        self.persist()
    }

    /// The file contents for the current entries
    pub fn render(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        out.push(b'[');
        for entry in &self.entries {
            let mut ser = serde_json::Serializer::with_formatter(&mut out, AsciiPrettyFormatter::new());
            entry.serialize(&mut ser)?;
            out.push(b',');
        }
        out.extend_from_slice(SENTINEL);
        Ok(out)
    }

    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }

    fn persist(&self) -> Result<()> {
        let mut tmp = tempfile::NamedTempFile::new_in(self.dir())?;
        tmp.write_all(&self.render()?)?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|e| LoadError::Io(e.error))?;
        Ok(())
    }
}

fn parse(path: &Path, content: &[u8]) -> Result<Vec<LogEntry>> {
    let trimmed = content.trim_ascii();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let values: Vec<serde_json::Value> = match serde_json::from_slice(trimmed) {
        Ok(values) => values,
        Err(e) => {
            // Interrupted run: "[" and "<entry>," items without the closing sentinel
            let unterminated = trimmed.starts_with(b"[") && (trimmed.ends_with(b",") || trimmed == b"[");
            if !unterminated {
                return Err(LoadError::parse(path.display().to_string(), e.to_string()));
            }
            warn!(path = %path.display(), "Dedup log was not closed, recovering");
            let mut closed = trimmed.to_vec();
            closed.extend_from_slice(SENTINEL);
            serde_json::from_slice(&closed)
                .map_err(|e| LoadError::parse(path.display().to_string(), e.to_string()))?
        }
    };

    values
        .into_iter()
        .filter(|v| !v.as_object().is_some_and(|o| o.is_empty()))
        .map(|v| {
            serde_json::from_value(v).map_err(|e| LoadError::parse(path.display().to_string(), e.to_string()))
        })
        .collect()
}

/// Pretty printer with four-space indentation that escapes non-ASCII text
struct AsciiPrettyFormatter<'a> {
    inner: PrettyFormatter<'a>,
}

impl AsciiPrettyFormatter<'_> {
    fn new() -> Self {
        Self {
            inner: PrettyFormatter::with_indent(b"    "),
        }
    }
}

impl Formatter for AsciiPrettyFormatter<'_> {
    fn write_string_fragment<W: ?Sized + Write>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()> {
        let mut start = 0;
        for (i, c) in fragment.char_indices() {
            if (c as u32) < 0x7f {
                continue;
            }
            writer.write_all(&fragment.as_bytes()[start..i])?;
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = i + c.len_utf8();
        }
        writer.write_all(&fragment.as_bytes()[start..])
    }

    fn begin_array<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_array(writer)
    }

    fn end_array<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.inner.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_object(writer)
    }

    fn end_object<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.inner.begin_object_key(writer, first)
    }

    fn begin_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.inner.end_object_value(writer)
    }
}
