//! Journal HTTP handlers.
//!
//! ```text
//! GET /api/v1/journal/{date}
//! PUT /api/v1/journal/{date}
//! ```
//!
//! One note per user per calendar day, keyed by date alone.

use actix_web::{get, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::habits::JournalResponse;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{missing_field_error, parse_date};

/// Journal upsert request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JournalBody {
    pub body: Option<String>,
}

/// Fetch the note for a day.
#[utoipa::path(
    get,
    path = "/api/v1/journal/{date}",
    params(("date" = String, Path, description = "Calendar day (YYYY-MM-DD)")),
    responses(
        (status = 200, description = "Journal note", body = JournalResponse),
        (status = 400, description = "Invalid date", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "No note for this day", body = Error)
    ),
    tags = ["journal"],
    operation_id = "getJournal"
)]
#[get("/journal/{date}")]
pub async fn get_journal(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<JournalResponse>> {
    let user_id = session.require_user_id()?;
    let date = parse_date(&path.into_inner(), "date")?;

    let journal = state
        .journal_query
        .fetch_journal(&user_id, date)
        .await?
        .ok_or_else(|| Error::not_found("no journal for this day"))?;
    Ok(web::Json(JournalResponse::from(journal)))
}

/// Insert or overwrite the note for a day.
#[utoipa::path(
    put,
    path = "/api/v1/journal/{date}",
    request_body = JournalBody,
    params(("date" = String, Path, description = "Calendar day (YYYY-MM-DD)")),
    responses(
        (status = 200, description = "Stored note", body = JournalResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["journal"],
    operation_id = "upsertJournal"
)]
#[put("/journal/{date}")]
pub async fn upsert_journal(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<JournalBody>,
) -> ApiResult<web::Json<JournalResponse>> {
    let user_id = session.require_user_id()?;
    let date = parse_date(&path.into_inner(), "date")?;
    let body = payload
        .into_inner()
        .body
        .ok_or_else(|| missing_field_error("body"))?;

    let journal = state.journal.upsert_journal(&user_id, date, body).await?;
    Ok(web::Json(JournalResponse::from(journal)))
}
