//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct generating the OpenAPI specification for
//! the REST API: every HTTP endpoint from the inbound layer, the request
//! and response schemas, and the session cookie security scheme. The
//! generated document backs Swagger UI in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::accounts::{LoginBody, ProfileBody, ProfileResponse, RegisterBody};
use crate::inbound::http::entries::EntryBody;
use crate::inbound::http::habits::{
    EntryResponse, GridResponse, HabitBody, HabitResponse, HabitWithEntriesResponse,
    JournalResponse, RemoveResponse, ReorderBody,
};
use crate::inbound::http::import_export::{
    EntryStatsResponse, ExportEntryResponse, ExportHabitResponse, ImportResponse,
    ImportResultEntry, SkippedEntryResponse,
};
use crate::inbound::http::journal::JournalBody;

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Habitgrid backend API",
        description = "HTTP interface for habit tracking: habits, daily entries, journals, and import/export."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::accounts::register,
        crate::inbound::http::accounts::login,
        crate::inbound::http::accounts::logout,
        crate::inbound::http::accounts::get_profile,
        crate::inbound::http::accounts::update_profile,
        crate::inbound::http::habits::get_habits,
        crate::inbound::http::habits::create_habit,
        crate::inbound::http::habits::rename_habit,
        crate::inbound::http::habits::remove_habit,
        crate::inbound::http::habits::reorder_habits,
        crate::inbound::http::entries::upsert_entry,
        crate::inbound::http::journal::get_journal,
        crate::inbound::http::journal::upsert_journal,
        crate::inbound::http::import_export::import_habits,
        crate::inbound::http::import_export::export_habits,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        RegisterBody,
        LoginBody,
        ProfileBody,
        ProfileResponse,
        HabitBody,
        ReorderBody,
        HabitResponse,
        EntryResponse,
        HabitWithEntriesResponse,
        JournalResponse,
        GridResponse,
        RemoveResponse,
        EntryBody,
        JournalBody,
        ImportResponse,
        ImportResultEntry,
        EntryStatsResponse,
        SkippedEntryResponse,
        ExportHabitResponse,
        ExportEntryResponse,
    )),
    tags(
        (name = "accounts", description = "Registration, login, and profile management"),
        (name = "habits", description = "Habit CRUD and display ordering"),
        (name = "entries", description = "Daily completion records"),
        (name = "journal", description = "Per-day journal notes"),
        (name = "import-export", description = "Batch import and export"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
