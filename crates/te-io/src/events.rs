//! Offline event sources.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use te_core::{Error, EventSource, OfflineEvent, Result};

use crate::records::OfflineRecord;

/// Event source over decoded events held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryEventSource {
    events: Vec<OfflineEvent>,
    malformed: u64,
}

impl MemoryEventSource {
    /// Wrap decoded events.
    pub fn new(events: Vec<OfflineEvent>) -> Self {
        Self { events, malformed: 0 }
    }

    /// Read a JSON-lines dump of [`OfflineRecord`]s. Blank lines are ignored.
    ///
    /// Lines that do not decode (bad JSON, bad kinematics) are dropped with a
    /// warning and counted; read failures are errors.
    pub fn from_reader<R: BufRead>(reader: R, origin: &str) -> Result<Self> {
        let mut events = Vec::new();
        let mut malformed = 0u64;
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let decoded = serde_json::from_str::<OfflineRecord>(&line)
                .map_err(Error::from)
                .and_then(OfflineRecord::into_event);
            match decoded {
                Ok(ev) => events.push(ev),
                Err(e) => {
                    log::warn!("{origin}:{}: dropping unreadable event record: {e}", i + 1);
                    malformed += 1;
                }
            }
        }
        Ok(Self { events, malformed })
    }

    /// Open a JSON-lines file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let src = Self::from_reader(BufReader::new(file), &path.display().to_string())?;
        log::info!("read {} offline events from {}", src.events.len(), path.display());
        Ok(src)
    }

    /// Decoded events.
    pub fn events(&self) -> &[OfflineEvent] {
        &self.events
    }
}

impl EventSource for MemoryEventSource {
    fn entry_count(&self) -> usize {
        self.events.len()
    }

    fn load_entry(&mut self, index: usize) -> Result<&OfflineEvent> {
        let n = self.events.len();
        self.events
            .get(index)
            .ok_or_else(|| Error::Source(format!("entry {index} out of range ({n} entries)")))
    }

    fn malformed_entries(&self) -> u64 {
        self.malformed
    }
}
