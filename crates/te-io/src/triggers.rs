//! Trigger sources aligned to offline events by identifier.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::iter::Peekable;
use std::path::Path;

use te_core::{Alignment, Direction, Error, PathId, Result, TriggerSource};

use crate::records::{TriggerRecord, event_id_hint};

enum StreamItem {
    Record(TriggerRecord),
    /// Undecodable line; `event` is set when the id could still be read.
    Malformed { event: Option<u64>, reason: String },
}

impl StreamItem {
    fn event(&self) -> Option<u64> {
        match self {
            StreamItem::Record(rec) => Some(rec.event),
            StreamItem::Malformed { event, .. } => *event,
        }
    }
}

type RecordIter = Box<dyn Iterator<Item = Result<StreamItem>> + Send>;

/// Forward-only trigger stream.
///
/// Records must be ordered by event identifier. Loading event `id` skips
/// records with smaller identifiers (events the offline sample does not
/// have) and reports the event missing when the next record is already past
/// `id`. A record for `id` that does not decode reports the event malformed;
/// an undecodable line without a readable id is dropped.
pub struct RecordTriggerSource {
    records: Peekable<RecordIter>,
    paths: Vec<String>,
    current: Vec<Vec<Direction>>,
    current_event: Option<u64>,
}

impl std::fmt::Debug for RecordTriggerSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordTriggerSource")
            .field("paths", &self.paths)
            .field("current_event", &self.current_event)
            .finish_non_exhaustive()
    }
}

impl RecordTriggerSource {
    fn from_boxed(records: RecordIter) -> Self {
        Self {
            records: records.peekable(),
            paths: Vec::new(),
            current: Vec::new(),
            current_event: None,
        }
    }

    /// Stream over in-memory records.
    pub fn from_records(records: Vec<TriggerRecord>) -> Self {
        Self::from_boxed(Box::new(records.into_iter().map(|r| Ok(StreamItem::Record(r)))))
    }

    /// Stream over a JSON-lines reader. Blank lines are ignored.
    pub fn from_reader<R: BufRead + Send + 'static>(reader: R, origin: impl Into<String>) -> Self {
        let origin = origin.into();
        let iter = reader.lines().enumerate().filter_map(move |(i, line)| {
            let line = match line {
                Ok(l) => l,
                Err(e) => return Some(Err(Error::Io(e))),
            };
            if line.trim().is_empty() {
                return None;
            }
            let item = match serde_json::from_str::<TriggerRecord>(&line) {
                Ok(rec) => StreamItem::Record(rec),
                Err(e) => StreamItem::Malformed {
                    event: event_id_hint(&line),
                    reason: format!("{origin}:{}: {e}", i + 1),
                },
            };
            Some(Ok(item))
        });
        Self::from_boxed(Box::new(iter))
    }

    /// Open a JSON-lines file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        log::info!("opened trigger stream {}", path.display());
        Ok(Self::from_reader(BufReader::new(file), path.display().to_string()))
    }

    /// Event the source is positioned on, if any.
    pub fn current_event(&self) -> Option<u64> {
        self.current_event
    }

    fn clear(&mut self) {
        self.current.iter_mut().for_each(Vec::clear);
        self.current_event = None;
    }
}

impl TriggerSource for RecordTriggerSource {
    fn register_path(&mut self, name: &str) -> PathId {
        if let Some(i) = self.paths.iter().position(|p| p == name) {
            return PathId(i);
        }
        self.paths.push(name.to_string());
        self.current.push(Vec::new());
        PathId(self.paths.len() - 1)
    }

    fn load_for_event(&mut self, event_id: u64) -> Result<Alignment> {
        self.clear();
        loop {
            let next = match self.records.peek() {
                None => return Ok(Alignment::Missing),
                Some(Ok(item)) => item.event(),
                Some(Err(_)) => {
                    return Err(self.records.next().and_then(|r| r.err()).unwrap_or_else(|| {
                        Error::Source("trigger stream ended while reading an error".to_string())
                    }));
                }
            };
            let Some(next) = next else {
                if let Some(Ok(StreamItem::Malformed { reason, .. })) = self.records.next() {
                    log::warn!("dropping unreadable trigger record: {reason}");
                }
                continue;
            };
            if next > event_id {
                return Ok(Alignment::Missing);
            }
            let Some(Ok(item)) = self.records.next() else {
                return Ok(Alignment::Missing);
            };
            if next < event_id {
                continue;
            }
            let mut rec = match item {
                StreamItem::Record(rec) => rec,
                StreamItem::Malformed { reason, .. } => {
                    log::warn!("event {event_id}: unreadable trigger record, skipping: {reason}");
                    return Ok(Alignment::Malformed);
                }
            };
            for (slot, name) in self.current.iter_mut().zip(&self.paths) {
                if let Some(objects) = rec.paths.remove(name) {
                    *slot = objects;
                }
            }
            self.current_event = Some(event_id);
            return Ok(Alignment::Aligned);
        }
    }

    fn online_objects(&self, path: PathId) -> &[Direction] {
        self.current.get(path.0).map(|v| v.as_slice()).unwrap_or(&[])
    }
}
