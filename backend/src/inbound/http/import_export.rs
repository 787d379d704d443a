//! Import/export HTTP handlers.
//!
//! ```text
//! POST /api/v1/import
//! GET  /api/v1/export
//! ```
//!
//! Both ends speak the same file shape, so an exported file can be fed
//! straight back into import. The import response carries one result line
//! per uploaded record; per-record failures keep the call at 200.

use actix_web::{post, get, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::reconciliation::{
    EntryExport, EntryStats, HabitExport, HabitOutcome, ImportBatch, ImportReport,
    RecordOutcome, SkippedEntry,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// One skipped entry in an import result line.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SkippedEntryResponse {
    pub index: usize,
    pub reason: String,
}

impl From<SkippedEntry> for SkippedEntryResponse {
    fn from(value: SkippedEntry) -> Self {
        Self {
            index: value.index,
            reason: value.reason,
        }
    }
}

/// Entry counters for one import result line.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntryStatsResponse {
    pub upserted: usize,
    pub skipped: Vec<SkippedEntryResponse>,
}

impl From<EntryStats> for EntryStatsResponse {
    fn from(value: EntryStats) -> Self {
        Self {
            upserted: value.upserted,
            skipped: value
                .skipped
                .into_iter()
                .map(SkippedEntryResponse::from)
                .collect(),
        }
    }
}

/// One result line of the import response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportResultEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// `created`, `merged`, or `failed`.
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reactivated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entries: Option<EntryStatsResponse>,
}

impl From<HabitOutcome> for ImportResultEntry {
    fn from(value: HabitOutcome) -> Self {
        let HabitOutcome { name, outcome } = value;
        match outcome {
            RecordOutcome::Created { entries } => Self {
                name,
                status: "created".to_owned(),
                reason: None,
                reactivated: None,
                entries: Some(EntryStatsResponse::from(entries)),
            },
            RecordOutcome::Merged {
                reactivated,
                entries,
            } => Self {
                name,
                status: "merged".to_owned(),
                reason: None,
                reactivated: Some(reactivated),
                entries: Some(EntryStatsResponse::from(entries)),
            },
            RecordOutcome::Failed { reason } => Self {
                name,
                status: "failed".to_owned(),
                reason: Some(reason),
                reactivated: None,
                entries: None,
            },
        }
    }
}

/// Import response: a summary plus one line per uploaded record.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    pub message: String,
    pub failures: usize,
    pub results: Vec<ImportResultEntry>,
}

impl From<ImportReport> for ImportResponse {
    fn from(report: ImportReport) -> Self {
        let failures = report.failure_count();
        Self {
            message: "import completed".to_owned(),
            failures,
            results: report
                .results
                .into_iter()
                .map(ImportResultEntry::from)
                .collect(),
        }
    }
}

/// One exported entry.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExportEntryResponse {
    pub date: String,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub journal: Option<String>,
}

impl From<EntryExport> for ExportEntryResponse {
    fn from(value: EntryExport) -> Self {
        Self {
            date: value.date.to_string(),
            completed: value.completed,
            journal: value.journal,
        }
    }
}

/// One exported habit with nested dated entries.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExportHabitResponse {
    pub name: String,
    pub emoji: String,
    pub order: i32,
    pub entries: Vec<ExportEntryResponse>,
}

impl From<HabitExport> for ExportHabitResponse {
    fn from(value: HabitExport) -> Self {
        Self {
            name: value.name,
            emoji: value.emoji,
            order: value.position,
            entries: value
                .entries
                .into_iter()
                .map(ExportEntryResponse::from)
                .collect(),
        }
    }
}

/// Merge an uploaded batch into the caller's habits.
///
/// A malformed top level is rejected with 400 before any writes; every
/// other failure is reported per record in the 200 response.
#[utoipa::path(
    post,
    path = "/api/v1/import",
    request_body = serde_json::Value,
    responses(
        (status = 200, description = "Per-record import results", body = ImportResponse),
        (status = 400, description = "Malformed batch", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["import-export"],
    operation_id = "importHabits"
)]
#[post("/import")]
pub async fn import_habits(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<serde_json::Value>,
) -> ApiResult<web::Json<ImportResponse>> {
    let user_id = session.require_user_id()?;
    let batch = ImportBatch::from_value(payload.into_inner())?;

    let report = state.import.import(&user_id, batch).await?;
    Ok(web::Json(ImportResponse::from(report)))
}

/// Export the caller's habits in the import file shape.
#[utoipa::path(
    get,
    path = "/api/v1/export",
    responses(
        (status = 200, description = "Habits in display order", body = [ExportHabitResponse]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["import-export"],
    operation_id = "exportHabits"
)]
#[get("/export")]
pub async fn export_habits(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<ExportHabitResponse>>> {
    let user_id = session.require_user_id()?;
    let habits = state.export.export(&user_id).await?;
    Ok(web::Json(
        habits.into_iter().map(ExportHabitResponse::from).collect(),
    ))
}
