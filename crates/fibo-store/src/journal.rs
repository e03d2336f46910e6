//! Append-only JSON-lines journal backing a `Memoizer`.
//!
//! Each write appends one `CacheEntry` record. Opening the journal replays
//! it into an in-memory table; later records for an ordinal replace earlier
//! ones. Lines that fail to decode are skipped. A final line without its
//! newline (a write torn by a crash) is cut off on open, so the next append
//! starts on a fresh line.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use fibo_core::{CacheEntry, CacheError, Memoizer, Number};

struct Journal {
    table: HashMap<u64, Number>,
    file: File,
    /// Records currently in the file, live or superseded.
    records: usize,
}

/// File-backed cache: an in-memory table plus its on-disk journal.
pub struct JournalCache {
    path: PathBuf,
    inner: Mutex<Journal>,
}

impl JournalCache {
    /// Open (or create) the journal at `path` and replay it.
    ///
    /// Compacts the file first when superseded or unreadable records
    /// outnumber live ones.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CacheError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let Replay {
            table,
            records,
            complete_len,
            file_len,
        } = if path.exists() {
            replay(&path)?
        } else {
            Replay::default()
        };
        if complete_len < file_len {
            warn!(
                path = %path.display(),
                discarded = file_len - complete_len,
                "Truncating torn record at end of cache journal"
            );
            let file = OpenOptions::new().write(true).open(&path)?;
            file.set_len(complete_len)?;
            file.sync_data()?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        info!(
            path = %path.display(),
            entries = table.len(),
            records,
            "Opened cache journal"
        );

        let cache = Self {
            path,
            inner: Mutex::new(Journal {
                table,
                file,
                records,
            }),
        };

        let (live, records) = cache.counts();
        if records - live > live {
            cache.compact()?;
        }
        Ok(cache)
    }

    /// Location of the journal file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().table.len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().table.is_empty()
    }

    /// Records in the file, including superseded ones.
    #[must_use]
    pub fn records(&self) -> usize {
        self.inner.lock().records
    }

    fn counts(&self) -> (usize, usize) {
        let journal = self.inner.lock();
        (journal.table.len(), journal.records)
    }

    /// Rewrite the journal so it holds exactly one record per live entry.
    ///
    /// The new file is written beside the old one and renamed over it, so a
    /// crash leaves either the old or the new journal intact.
    pub fn compact(&self) -> Result<(), CacheError> {
        let mut journal = self.inner.lock();

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let mut ordinals: Vec<u64> = journal.table.keys().copied().collect();
        ordinals.sort_unstable();
        {
            let mut out = std::io::BufWriter::new(File::create(&tmp)?);
            for ordinal in ordinals {
                let entry = CacheEntry::new(ordinal, journal.table[&ordinal].clone());
                writeln!(out, "{}", encode(&entry)?)?;
            }
            out.into_inner()
                .map_err(|e| CacheError::Io(e.into_error()))?
                .sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;

        let before = journal.records;
        journal.file = OpenOptions::new().append(true).open(&self.path)?;
        journal.records = journal.table.len();
        info!(
            path = %self.path.display(),
            before,
            after = journal.records,
            "Compacted cache journal"
        );
        Ok(())
    }
}

impl Memoizer for JournalCache {
    fn read(&self, ordinal: u64) -> Result<Option<Number>, CacheError> {
        Ok(self.inner.lock().table.get(&ordinal).cloned())
    }

    fn write(&self, ordinal: u64, value: &Number) -> Result<(), CacheError> {
        let mut journal = self.inner.lock();
        if journal.table.get(&ordinal) == Some(value) {
            return Ok(());
        }

        let entry = CacheEntry::new(ordinal, value.clone());
        let mut line = encode(&entry)?;
        line.push('\n');
        journal.file.write_all(line.as_bytes())?;
        journal.records += 1;
        journal.table.insert(entry.ordinal, entry.value);
        debug!(ordinal, "Appended cache journal record");
        Ok(())
    }

    fn clear(&self) -> Result<(), CacheError> {
        let mut journal = self.inner.lock();
        journal.file.set_len(0)?;
        journal.file.sync_data()?;
        journal.table.clear();
        journal.records = 0;
        info!(path = %self.path.display(), "Cleared cache journal");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "journal"
    }
}

fn encode(entry: &CacheEntry) -> Result<String, CacheError> {
    serde_json::to_string(entry).map_err(|e| CacheError::Storage(e.to_string()))
}

#[derive(Default)]
struct Replay {
    table: HashMap<u64, Number>,
    /// Newline-terminated records read, decodable or not.
    records: usize,
    /// Byte length up to and including the last newline.
    complete_len: u64,
    file_len: u64,
}

/// Load every decodable record from the journal.
fn replay(path: &Path) -> Result<Replay, CacheError> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut out = Replay::default();
    let mut buf = Vec::new();
    let mut line_no = 0usize;

    loop {
        buf.clear();
        let read = reader.read_until(b'\n', &mut buf)?;
        if read == 0 {
            break;
        }
        out.file_len += read as u64;
        if buf.last() != Some(&b'\n') {
            // Torn tail; `open` truncates it.
            break;
        }
        out.complete_len = out.file_len;
        line_no += 1;

        let line = String::from_utf8_lossy(&buf);
        if line.trim().is_empty() {
            continue;
        }
        out.records += 1;
        match serde_json::from_str::<CacheEntry>(line.trim_end()) {
            Ok(entry) => {
                out.table.insert(entry.ordinal, entry.value);
            }
            Err(err) => warn!(
                path = %path.display(),
                line = line_no,
                error = %err,
                "Skipping malformed cache journal record"
            ),
        }
    }

    Ok(out)
}
