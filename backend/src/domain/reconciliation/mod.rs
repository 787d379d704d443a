//! Import batch shapes, the per-record report, and the export file shape.
//!
//! The upload contract is shared with the legacy export files:
//! `{"habits": [{"name", "emoji"?, "order"?, "entries": [{"date",
//! "completed", "journal"?}]}]}`. Parsing is deliberately two-phase: the
//! top-level shape is a hard failure, while each habit element decodes
//! independently so one malformed record never poisons its siblings.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::Error;

pub mod service;

pub use service::ReconciliationService;

/// One habit element of an upload, after tolerant decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportHabitRecord {
    /// Habit name; required but validated during processing so the failure
    /// lands in the report instead of rejecting the batch.
    #[serde(default)]
    pub name: Option<String>,
    /// Decorative emoji; empty when omitted.
    #[serde(default)]
    pub emoji: Option<String>,
    /// Explicit display rank from the file, or `None` for next-available.
    #[serde(default, rename = "order")]
    pub position: Option<i32>,
    /// Dated completion records; may be empty.
    #[serde(default)]
    pub entries: Vec<ImportEntryRecord>,
}

/// One entry element of an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportEntryRecord {
    /// Calendar day as text; unparseable dates skip the entry.
    #[serde(default)]
    pub date: Option<String>,
    /// Completion state; absent means not completed.
    #[serde(default)]
    pub completed: bool,
    /// Journal text folded into the per-day journal when non-empty.
    #[serde(default)]
    pub journal: Option<String>,
}

/// A habit element as queued for processing: decoded, or rejected with the
/// decode failure preserved for the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportRecord {
    /// The element decoded into the expected shape.
    Habit(ImportHabitRecord),
    /// The element did not decode; processing records a failure outcome.
    Malformed {
        /// Best-effort name lifted from the raw element for the report.
        name: Option<String>,
        /// Decode failure description.
        reason: String,
    },
}

/// A decoded upload ready for reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBatch {
    /// Habit elements in file order.
    pub records: Vec<ImportRecord>,
}

impl ImportBatch {
    /// Decode an upload payload.
    ///
    /// # Errors
    /// Returns [`Error::invalid_request`] when the payload is not an object
    /// carrying a `habits` array — the one hard failure the import
    /// contract defines. Individual elements that fail to decode become
    /// [`ImportRecord::Malformed`] instead.
    pub fn from_value(payload: Value) -> Result<Self, Error> {
        let Some(habits) = payload.get("habits") else {
            return Err(Error::invalid_request(
                "import payload must contain a habits array",
            ));
        };
        let Some(elements) = habits.as_array() else {
            return Err(Error::invalid_request("habits must be an array"));
        };

        let records = elements
            .iter()
            .map(|element| {
                let name = element
                    .get("name")
                    .and_then(Value::as_str)
                    .map(ToOwned::to_owned);
                match serde_json::from_value::<ImportHabitRecord>(element.clone()) {
                    Ok(record) => ImportRecord::Habit(record),
                    Err(err) => ImportRecord::Malformed {
                        name,
                        reason: format!("processing error: {err}"),
                    },
                }
            })
            .collect();

        Ok(Self { records })
    }
}

/// Parse an entry date: plain `YYYY-MM-DD` or the date part of an RFC 3339
/// timestamp (older export files carried full timestamps).
pub fn parse_entry_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if let Ok(date) = trimmed.parse::<NaiveDate>() {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|ts| ts.date_naive())
}

/// An entry that was skipped while processing a habit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedEntry {
    /// Index of the entry within the habit record's `entries` array.
    pub index: usize,
    /// Why the entry was skipped.
    pub reason: String,
}

/// Entry counters for one processed habit record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryStats {
    /// Entries written via upsert.
    pub upserted: usize,
    /// Entries skipped, with reasons.
    pub skipped: Vec<SkippedEntry>,
}

/// How one habit record resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum RecordOutcome {
    /// A new habit row was inserted.
    Created {
        /// Entry counters.
        entries: EntryStats,
    },
    /// An existing habit absorbed the record.
    Merged {
        /// True when the match was an inactive habit that was revived.
        reactivated: bool,
        /// Entry counters.
        entries: EntryStats,
    },
    /// The record was not processed.
    Failed {
        /// Why processing failed.
        reason: String,
    },
}

/// Report line for one habit record, in file order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitOutcome {
    /// Name from the record, when one was present.
    pub name: Option<String>,
    /// How the record resolved.
    #[serde(flatten)]
    pub outcome: RecordOutcome,
}

/// Batch result: one outcome per input record, never silently dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    /// Outcomes in input order.
    pub results: Vec<HabitOutcome>,
}

impl ImportReport {
    /// Number of records that failed outright.
    pub fn failure_count(&self) -> usize {
        self.results
            .iter()
            .filter(|outcome| matches!(outcome.outcome, RecordOutcome::Failed { .. }))
            .count()
    }
}

/// Export shape for one habit: identical to the import element shape so
/// exported files can be re-imported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitExport {
    /// Habit name.
    pub name: String,
    /// Decorative emoji, empty when unset.
    pub emoji: String,
    /// Display rank.
    #[serde(rename = "order")]
    pub position: i32,
    /// Entries ascending by date.
    pub entries: Vec<EntryExport>,
}

/// Export shape for one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryExport {
    /// Calendar day.
    pub date: NaiveDate,
    /// Completion state.
    pub completed: bool,
    /// Journal text for the day, present on the first habit in display
    /// order that has an entry for it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub journal: Option<String>,
}
