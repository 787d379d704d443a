//! Habit HTTP handlers.
//!
//! ```text
//! GET    /api/v1/habits
//! POST   /api/v1/habits
//! PATCH  /api/v1/habits/{id}
//! DELETE /api/v1/habits/{id}
//! PUT    /api/v1/habits/reorder
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::{
    CreateHabitRequest, HabitGrid, RemoveHabitOutcome, RenameHabitRequest,
};
use crate::domain::{Error, Habit, HabitEntry, HabitName, HabitWithEntries, Journal};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    invalid_field_error, missing_field_error, parse_uuid_list,
};

/// Create/rename request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HabitBody {
    pub name: Option<String>,
    /// Only honoured on create.
    pub emoji: Option<String>,
}

/// Reorder request body: habit ids in their new display order.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReorderBody {
    pub ordered_ids: Option<Vec<String>>,
}

/// One habit as returned by the habit endpoints.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HabitResponse {
    pub id: String,
    pub name: String,
    pub emoji: String,
    pub active: bool,
    /// Display rank; the import/export file shape calls this `order`.
    pub order: i32,
    pub created_at: String,
}

impl From<Habit> for HabitResponse {
    fn from(value: Habit) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name.to_string(),
            emoji: value.emoji,
            active: value.active,
            order: value.position,
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

/// One entry nested in the grid response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntryResponse {
    pub id: String,
    pub habit_id: String,
    pub date: String,
    pub completed: bool,
}

impl From<HabitEntry> for EntryResponse {
    fn from(value: HabitEntry) -> Self {
        Self {
            id: value.id.to_string(),
            habit_id: value.habit_id.to_string(),
            date: value.date.to_string(),
            completed: value.completed,
        }
    }
}

/// One habit with its entries, as rendered in the grid.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HabitWithEntriesResponse {
    #[serde(flatten)]
    pub habit: HabitResponse,
    pub entries: Vec<EntryResponse>,
}

impl From<HabitWithEntries> for HabitWithEntriesResponse {
    fn from(value: HabitWithEntries) -> Self {
        Self {
            habit: HabitResponse::from(value.habit),
            entries: value.entries.into_iter().map(EntryResponse::from).collect(),
        }
    }
}

/// One journal note in the grid response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JournalResponse {
    pub date: String,
    pub body: String,
    pub updated_at: String,
}

impl From<Journal> for JournalResponse {
    fn from(value: Journal) -> Self {
        Self {
            date: value.date.to_string(),
            body: value.body,
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}

/// The grid: ordered habits with entries plus journals.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GridResponse {
    pub habits: Vec<HabitWithEntriesResponse>,
    pub journals: Vec<JournalResponse>,
}

impl From<HabitGrid> for GridResponse {
    fn from(value: HabitGrid) -> Self {
        Self {
            habits: value
                .habits
                .into_iter()
                .map(HabitWithEntriesResponse::from)
                .collect(),
            journals: value
                .journals
                .into_iter()
                .map(JournalResponse::from)
                .collect(),
        }
    }
}

/// Removal outcome payload.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RemoveResponse {
    /// `deleted` when the row was removed, `deactivated` otherwise.
    pub status: String,
}

fn parse_name(raw: Option<String>) -> Result<HabitName, Error> {
    let raw = raw.ok_or_else(|| missing_field_error("name"))?;
    HabitName::new(&raw).map_err(|err| invalid_field_error("name", err.to_string()))
}

/// Fetch the authenticated user's grid.
#[utoipa::path(
    get,
    path = "/api/v1/habits",
    responses(
        (status = 200, description = "Ordered habits with entries and journals", body = GridResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["habits"],
    operation_id = "getHabits"
)]
#[get("/habits")]
pub async fn get_habits(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<GridResponse>> {
    let user_id = session.require_user_id()?;
    let grid = state.habits_query.grid(&user_id).await?;
    Ok(web::Json(GridResponse::from(grid)))
}

/// Create a habit, reviving an inactive one of the same name if present.
#[utoipa::path(
    post,
    path = "/api/v1/habits",
    request_body = HabitBody,
    responses(
        (status = 201, description = "Habit created", body = HabitResponse),
        (status = 200, description = "Inactive habit reactivated", body = HabitResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 409, description = "Active habit with this name exists", body = Error)
    ),
    tags = ["habits"],
    operation_id = "createHabit"
)]
#[post("/habits")]
pub async fn create_habit(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<HabitBody>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let HabitBody { name, emoji } = payload.into_inner();

    let outcome = state
        .habits
        .create(CreateHabitRequest {
            user_id,
            name: parse_name(name)?,
            emoji: emoji.unwrap_or_default(),
        })
        .await?;

    let body = HabitResponse::from(outcome.habit);
    if outcome.reactivated {
        Ok(HttpResponse::Ok().json(body))
    } else {
        Ok(HttpResponse::Created().json(body))
    }
}

/// Rename a habit.
#[utoipa::path(
    patch,
    path = "/api/v1/habits/{id}",
    request_body = HabitBody,
    params(("id" = Uuid, Path, description = "Habit identifier")),
    responses(
        (status = 200, description = "Renamed habit", body = HabitResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Habit not found", body = Error)
    ),
    tags = ["habits"],
    operation_id = "renameHabit"
)]
#[patch("/habits/{id}")]
pub async fn rename_habit(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<HabitBody>,
) -> ApiResult<web::Json<HabitResponse>> {
    let user_id = session.require_user_id()?;
    let HabitBody { name, .. } = payload.into_inner();

    let habit = state
        .habits
        .rename(RenameHabitRequest {
            user_id,
            habit_id: path.into_inner(),
            name: parse_name(name)?,
        })
        .await?;
    Ok(web::Json(HabitResponse::from(habit)))
}

/// Remove a habit: delete when it has no entries, deactivate otherwise.
#[utoipa::path(
    delete,
    path = "/api/v1/habits/{id}",
    params(("id" = Uuid, Path, description = "Habit identifier")),
    responses(
        (status = 200, description = "Removal outcome", body = RemoveResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Habit not found", body = Error)
    ),
    tags = ["habits"],
    operation_id = "removeHabit"
)]
#[delete("/habits/{id}")]
pub async fn remove_habit(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<RemoveResponse>> {
    let user_id = session.require_user_id()?;
    let outcome = state.habits.remove(&user_id, &path.into_inner()).await?;
    let status = match outcome {
        RemoveHabitOutcome::Deleted => "deleted",
        RemoveHabitOutcome::Deactivated => "deactivated",
    };
    Ok(web::Json(RemoveResponse {
        status: status.to_owned(),
    }))
}

/// Persist a drag-reorder. All-or-nothing; responds with the new order so
/// clients refresh from the response instead of re-fetching.
#[utoipa::path(
    put,
    path = "/api/v1/habits/reorder",
    request_body = ReorderBody,
    responses(
        (status = 200, description = "Habits in their new order", body = [HabitResponse]),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "A habit is not owned by the caller", body = Error)
    ),
    tags = ["habits"],
    operation_id = "reorderHabits"
)]
#[put("/habits/reorder")]
pub async fn reorder_habits(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ReorderBody>,
) -> ApiResult<web::Json<Vec<HabitResponse>>> {
    let user_id = session.require_user_id()?;
    let ordered_ids = payload
        .into_inner()
        .ordered_ids
        .ok_or_else(|| missing_field_error("orderedIds"))?;
    let ordered_ids = parse_uuid_list(&ordered_ids, "orderedIds")?;

    state.reorder.reorder(&user_id, ordered_ids).await?;
    let habits = state.ordered.list_ordered(&user_id).await?;
    Ok(web::Json(
        habits.into_iter().map(HabitResponse::from).collect(),
    ))
}
