//! Reconciliation engine: merges uploaded batches into the habit, entry,
//! and journal stores, and serves the matching export read path.
//!
//! Records are processed sequentially in file order. Failures are scoped as
//! narrowly as possible: a bad entry skips that entry, a bad record fails
//! that record, and only a malformed top level (rejected before this
//! service is reached) or a broken store fails the call.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::domain::habits::{Habit, HabitName};
use crate::domain::ports::{
    EntryRepository, ExportQuery, HabitRepository, HabitRepositoryError, ImportCommand, NewHabit,
    JournalRepository,
};
use crate::domain::reconciliation::{
    EntryExport, EntryStats, HabitExport, HabitOutcome, ImportBatch, ImportHabitRecord,
    ImportRecord, ImportReport, RecordOutcome, SkippedEntry, parse_entry_date,
};
use crate::domain::{Error, UserId};

/// Reconciliation service implementing [`ImportCommand`] and [`ExportQuery`].
#[derive(Clone)]
pub struct ReconciliationService<H, E, J> {
    habits: Arc<H>,
    entries: Arc<E>,
    journals: Arc<J>,
}

impl<H, E, J> ReconciliationService<H, E, J> {
    /// Create a new service over the three stores.
    pub fn new(habits: Arc<H>, entries: Arc<E>, journals: Arc<J>) -> Self {
        Self {
            habits,
            entries,
            journals,
        }
    }
}

/// Where the record landed during match-or-create.
enum Disposition {
    Created,
    Merged { reactivated: bool },
}

impl<H, E, J> ReconciliationService<H, E, J>
where
    H: HabitRepository,
    E: EntryRepository,
    J: JournalRepository,
{
    /// Match the record against existing habits or create a new one.
    ///
    /// Match order: active habit by name, then inactive habit by name
    /// (revived in place), then insert.
    async fn match_or_create(
        &self,
        user_id: &UserId,
        name: HabitName,
        emoji: String,
        position: Option<i32>,
    ) -> Result<(Habit, Disposition), HabitRepositoryError> {
        if let Some(existing) = self.habits.find_by_name(user_id, &name, true).await? {
            self.habits
                .update_import_meta(&existing.id, &emoji, position)
                .await?;
            return Ok((existing, Disposition::Merged { reactivated: false }));
        }

        if let Some(dormant) = self.habits.find_by_name(user_id, &name, false).await? {
            self.habits.set_active(&dormant.id, true).await?;
            self.habits
                .update_import_meta(&dormant.id, &emoji, position)
                .await?;
            return Ok((dormant, Disposition::Merged { reactivated: true }));
        }

        let habit = self
            .habits
            .insert(NewHabit {
                user_id: user_id.clone(),
                name,
                emoji,
                position,
            })
            .await?;
        Ok((habit, Disposition::Created))
    }

    /// Upsert the record's entries, collecting per-entry skips.
    async fn apply_entries(
        &self,
        user_id: &UserId,
        habit: &Habit,
        entries: &[ImportEntryRecordRef<'_>],
    ) -> EntryStats {
        let mut stats = EntryStats::default();
        for entry in entries {
            let Some(date) = entry.date.and_then(parse_entry_date) else {
                let raw = entry.date.unwrap_or("<missing>");
                stats.skipped.push(SkippedEntry {
                    index: entry.index,
                    reason: format!("invalid date: {raw}"),
                });
                continue;
            };

            match self.entries.upsert(&habit.id, date, entry.completed).await {
                Ok(_) => {
                    stats.upserted += 1;
                    if let Some(body) = entry.journal.map(str::trim).filter(|b| !b.is_empty()) {
                        if let Err(err) = self.journals.upsert(user_id, date, body).await {
                            warn!(
                                habit = %habit.name,
                                date = %date,
                                error = %err,
                                "journal text not saved during import"
                            );
                            stats.skipped.push(SkippedEntry {
                                index: entry.index,
                                reason: format!("journal not saved: {err}"),
                            });
                        }
                    }
                }
                Err(err) => stats.skipped.push(SkippedEntry {
                    index: entry.index,
                    reason: format!("storage error: {err}"),
                }),
            }
        }
        stats
    }

    /// Process one decoded record into its report outcome.
    async fn process_record(
        &self,
        user_id: &UserId,
        record: ImportHabitRecord,
    ) -> RecordOutcome {
        let Some(name) = record
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
        else {
            return RecordOutcome::Failed {
                reason: "missing name".to_owned(),
            };
        };

        let name = match HabitName::new(name) {
            Ok(name) => name,
            Err(err) => {
                return RecordOutcome::Failed {
                    reason: err.to_string(),
                };
            }
        };

        let emoji = record.emoji.clone().unwrap_or_default();
        let (habit, disposition) = match self
            .match_or_create(user_id, name, emoji, record.position)
            .await
        {
            Ok(matched) => matched,
            Err(err) => {
                return RecordOutcome::Failed {
                    reason: format!("processing error: {err}"),
                };
            }
        };

        let entries: Vec<ImportEntryRecordRef<'_>> = record
            .entries
            .iter()
            .enumerate()
            .map(|(index, entry)| ImportEntryRecordRef {
                index,
                date: entry.date.as_deref(),
                completed: entry.completed,
                journal: entry.journal.as_deref(),
            })
            .collect();
        let stats = self.apply_entries(user_id, &habit, &entries).await;

        match disposition {
            Disposition::Created => RecordOutcome::Created { entries: stats },
            Disposition::Merged { reactivated } => RecordOutcome::Merged {
                reactivated,
                entries: stats,
            },
        }
    }
}

/// Borrowed entry view carrying its index for skip reporting.
struct ImportEntryRecordRef<'a> {
    index: usize,
    date: Option<&'a str>,
    completed: bool,
    journal: Option<&'a str>,
}

#[async_trait]
impl<H, E, J> ImportCommand for ReconciliationService<H, E, J>
where
    H: HabitRepository,
    E: EntryRepository,
    J: JournalRepository,
{
    async fn import(&self, user_id: &UserId, batch: ImportBatch) -> Result<ImportReport, Error> {
        let mut report = ImportReport::default();
        for record in batch.records {
            let outcome = match record {
                ImportRecord::Malformed { name, reason } => HabitOutcome {
                    name,
                    outcome: RecordOutcome::Failed { reason },
                },
                ImportRecord::Habit(record) => {
                    let name = record.name.clone();
                    let outcome = self.process_record(user_id, record).await;
                    HabitOutcome { name, outcome }
                }
            };
            report.results.push(outcome);
        }
        debug!(
            records = report.results.len(),
            failures = report.failure_count(),
            "import batch reconciled"
        );
        Ok(report)
    }
}

fn map_habit_repo_error(error: HabitRepositoryError) -> Error {
    match error {
        HabitRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("habit repository unavailable: {message}"))
        }
        other => Error::internal(format!("habit repository error: {other}")),
    }
}

#[async_trait]
impl<H, E, J> ExportQuery for ReconciliationService<H, E, J>
where
    H: HabitRepository,
    E: EntryRepository,
    J: JournalRepository,
{
    async fn export(&self, user_id: &UserId) -> Result<Vec<HabitExport>, Error> {
        let habits = self
            .habits
            .list_active(user_id)
            .await
            .map_err(map_habit_repo_error)?;
        let journals = self
            .journals
            .list_for_user(user_id)
            .await
            .map_err(crate::domain::journal::map_journal_repo_error)?;

        // Each date's journal is attached once, to the first habit in
        // display order holding an entry for that date, so the file
        // round-trips through import.
        let mut journal_by_date: BTreeMap<NaiveDate, String> = journals
            .into_iter()
            .map(|journal| (journal.date, journal.body))
            .collect();

        let mut export = Vec::with_capacity(habits.len());
        for habit in habits {
            let entries = self
                .entries
                .list_for_habit(&habit.id)
                .await
                .map_err(crate::domain::habits::service::map_entry_repo_error)?;
            let entries = entries
                .into_iter()
                .map(|entry| {
                    let journal = journal_by_date
                        .remove(&entry.date)
                        .filter(|body| !body.is_empty());
                    EntryExport {
                        date: entry.date,
                        completed: entry.completed,
                        journal,
                    }
                })
                .collect();
            export.push(HabitExport {
                name: habit.name.as_str().to_owned(),
                emoji: habit.emoji,
                position: habit.position,
                entries,
            });
        }
        Ok(export)
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod service_tests;
