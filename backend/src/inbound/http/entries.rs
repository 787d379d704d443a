//! Entry HTTP handlers.
//!
//! ```text
//! PUT /api/v1/entries
//! ```
//!
//! The daily grid toggle: one upsert per habit per day.

use actix_web::{put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::ports::UpsertEntryRequest;
use crate::inbound::http::ApiResult;
use crate::inbound::http::habits::EntryResponse;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{missing_field_error, parse_date, parse_uuid};

/// Entry upsert request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntryBody {
    pub habit_id: Option<String>,
    pub date: Option<String>,
    pub completed: Option<bool>,
}

/// Insert or overwrite the completion record for one habit and day.
#[utoipa::path(
    put,
    path = "/api/v1/entries",
    request_body = EntryBody,
    responses(
        (status = 200, description = "Stored entry", body = EntryResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Habit not found", body = Error)
    ),
    tags = ["entries"],
    operation_id = "upsertEntry"
)]
#[put("/entries")]
pub async fn upsert_entry(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<EntryBody>,
) -> ApiResult<web::Json<EntryResponse>> {
    let user_id = session.require_user_id()?;
    let EntryBody {
        habit_id,
        date,
        completed,
    } = payload.into_inner();

    let habit_id = habit_id.ok_or_else(|| missing_field_error("habitId"))?;
    let date = date.ok_or_else(|| missing_field_error("date"))?;

    let entry = state
        .entries
        .upsert_entry(UpsertEntryRequest {
            user_id,
            habit_id: parse_uuid(&habit_id, "habitId")?,
            date: parse_date(&date, "date")?,
            completed: completed.unwrap_or(false),
        })
        .await?;
    Ok(web::Json(EntryResponse::from(entry)))
}
