//! Sheet metadata and the persisted metadata store
//!
//! Metadata is derived from a grid independently of any compression choice
//! and kept in `metadata_index.json`, a JSON object keyed by sheet id. The
//! store is the only state shared between sheets processed in parallel:
//! every update is a locked read-merge-write of the whole file.

use crate::error::CompressResult;
use chrono::{DateTime, NaiveDateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sheetllm_core::{DataType, SheetMatrix};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// File name of the persisted store
pub const METADATA_FILE: &str = "metadata_index.json";

/// Lower-case terms that mark a text value as a key metric
pub const KEY_METRIC_TERMS: &[&str] = &[
    "revenue", "profit", "margin", "ebitda", "income", "expense", "cost", "cash", "total",
    "net", "growth", "sales",
];

/// Query words that make a sheet's date range relevant
const TIME_WORDS: &[&str] = &["year", "month", "quarter", "date"];

/// Sheets scoring at least this are relevant to a query
pub const RELEVANCE_THRESHOLD: u32 = 2;

/// Earliest and latest date/time value of a sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub min: NaiveDateTime,
    pub max: NaiveDateTime,
}

/// Summary of a sheet used for relevance filtering
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetMetadata {
    /// Rendered values of row 1
    pub headers: Vec<String>,
    /// Every data type observed in the sheet
    pub data_types: BTreeSet<DataType>,
    /// Extent of date/time values, if any
    pub date_range: Option<DateRange>,
    /// Text values mentioning a key-metric term, first occurrence order
    pub key_metrics: Vec<String>,
}

impl SheetMetadata {
    /// Compute the metadata of a grid
    pub fn compute(grid: &SheetMatrix) -> Self {
        let headers = grid.row_cells(1).map(|c| c.value.to_string()).collect();

        let mut data_types = BTreeSet::new();
        let mut date_range: Option<DateRange> = None;
        let mut key_metrics: Vec<String> = Vec::new();

        for cell in grid.populated() {
            data_types.insert(cell.data_type);

            if let Some(dt) = cell.value.as_datetime() {
                date_range = Some(match date_range {
                    Some(range) => DateRange {
                        min: range.min.min(dt),
                        max: range.max.max(dt),
                    },
                    None => DateRange { min: dt, max: dt },
                });
            }

            if let Some(text) = cell.value.as_text() {
                let lower = text.to_lowercase();
                let is_metric = KEY_METRIC_TERMS.iter().any(|term| lower.contains(term));
                if is_metric && !key_metrics.iter().any(|m| m == text) {
                    key_metrics.push(text.to_string());
                }
            }
        }

        Self {
            headers,
            data_types,
            date_range,
            key_metrics,
        }
    }

    /// Relevance of this sheet to a free-text query
    ///
    /// Each header found in the query scores 2, each key metric 3, and a
    /// query mentioning a time period scores 1 more when the sheet has dates.
    pub fn relevance(&self, query: &str) -> u32 {
        let query = query.to_lowercase();
        let mentions = |s: &String| !s.is_empty() && query.contains(&s.to_lowercase());

        let mut score = 0;
        score += 2 * self.headers.iter().filter(|h| mentions(h)).count() as u32;
        score += 3 * self.key_metrics.iter().filter(|m| mentions(m)).count() as u32;
        if self.date_range.is_some() && TIME_WORDS.iter().any(|w| query.contains(w)) {
            score += 1;
        }
        score
    }
}

/// A persisted store entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreEntry {
    pub last_updated: DateTime<Utc>,
    #[serde(flatten)]
    pub metadata: SheetMetadata,
}

/// Process-wide metadata store backed by `metadata_index.json`
#[derive(Debug)]
pub struct MetadataStore {
    path: PathBuf,
    index: Mutex<BTreeMap<String, StoreEntry>>,
}

impl MetadataStore {
    /// Open the store in `dir`, creating the directory if needed
    ///
    /// A missing file is an empty store. An unreadable or corrupt file is
    /// logged and also treated as empty.
    pub fn open<P: AsRef<Path>>(dir: P) -> CompressResult<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(METADATA_FILE);
        let index = load_index(&path).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "ignoring unreadable metadata index");
            BTreeMap::new()
        });
        debug!(path = %path.display(), sheets = index.len(), "opened metadata store");

        Ok(Self {
            path,
            index: Mutex::new(index),
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record metadata for a sheet and persist the store
    ///
    /// The file is re-read first and merged entry by entry, the newer
    /// `last_updated` winning, so updates made by other stores since this
    /// one last read the file are kept. The in-memory index holds the new
    /// entry even if persisting fails; the write error is still returned.
    pub fn update(&self, sheet_id: &str, metadata: SheetMetadata) -> CompressResult<()> {
        let entry = StoreEntry {
            last_updated: Utc::now(),
            metadata,
        };

        let mut index = self.index.lock();
        match load_index(&self.path) {
            Ok(on_disk) => merge_newer(&mut index, on_disk),
            Err(e) => warn!(path = %self.path.display(), error = %e, "not merging unreadable metadata index"),
        }
        index.insert(sheet_id.to_string(), entry);

        let result = write_atomic(&self.path, &index);
        if let Err(e) = &result {
            warn!(path = %self.path.display(), error = %e, "failed to save metadata index");
        }
        result
    }

    /// Get the entry of a sheet
    pub fn get(&self, sheet_id: &str) -> Option<StoreEntry> {
        self.index.lock().get(sheet_id).cloned()
    }

    /// Ids of every stored sheet, sorted
    pub fn sheet_ids(&self) -> Vec<String> {
        self.index.lock().keys().cloned().collect()
    }

    /// Number of stored sheets
    pub fn len(&self) -> usize {
        self.index.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sheets relevant to a query, best score first (ties by id)
    pub fn relevant_sheets(&self, query: &str) -> Vec<(String, u32)> {
        let index = self.index.lock();
        let mut hits: Vec<(String, u32)> = index
            .iter()
            .map(|(id, entry)| (id.clone(), entry.metadata.relevance(query)))
            .filter(|(_, score)| *score >= RELEVANCE_THRESHOLD)
            .collect();
        hits.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        hits
    }
}

fn load_index(path: &Path) -> CompressResult<BTreeMap<String, StoreEntry>> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Take entries from `on_disk` unless the in-memory copy is strictly newer
fn merge_newer(index: &mut BTreeMap<String, StoreEntry>, on_disk: BTreeMap<String, StoreEntry>) {
    for (id, entry) in on_disk {
        match index.get(&id) {
            Some(mine) if mine.last_updated > entry.last_updated => {}
            _ => {
                index.insert(id, entry);
            }
        }
    }
}

/// Write to a uniquely named temp file next to `path`, then rename over it
fn write_atomic(path: &Path, index: &BTreeMap<String, StoreEntry>) -> CompressResult<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut tmp, index)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
