//! Backend entry-point: wires the REST surface, persistence, and OpenAPI docs.

use std::env;
use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Key, SameSite};
use actix_web::{App, HttpServer, web};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use habitgrid::ApiDoc;
use habitgrid::Trace;
use habitgrid::domain::{
    AccountService, HabitService, JournalService, OrderingService, ReconciliationService,
};
use habitgrid::inbound::http::accounts::{get_profile, login, logout, register, update_profile};
use habitgrid::inbound::http::entries::upsert_entry;
use habitgrid::inbound::http::habits::{
    create_habit, get_habits, remove_habit, rename_habit, reorder_habits,
};
use habitgrid::inbound::http::health::{HealthState, live, ready};
use habitgrid::inbound::http::import_export::{export_habits, import_habits};
use habitgrid::inbound::http::journal::{get_journal, upsert_journal};
use habitgrid::inbound::http::session_config::session_settings_from_env;
use habitgrid::inbound::http::state::HttpState;
use habitgrid::outbound::persistence::{
    DbPool, DieselEntryRepository, DieselHabitRepository, DieselJournalRepository,
    DieselUserRepository, PoolConfig, run_pending_migrations,
};
use habitgrid::outbound::security::BcryptPasswordHasher;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let database_url = env::var("DATABASE_URL")
        .map_err(|_| std::io::Error::other("DATABASE_URL must be set"))?;
    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into());

    let settings = session_settings_from_env().map_err(std::io::Error::other)?;

    let migration_url = database_url.clone();
    tokio::task::spawn_blocking(move || run_pending_migrations(&migration_url))
        .await
        .map_err(std::io::Error::other)?
        .map_err(std::io::Error::other)?;
    info!("database migrations applied");

    let pool = DbPool::new(PoolConfig::new(&database_url))
        .await
        .map_err(std::io::Error::other)?;
    let state = build_state(&pool);

    let health_state = web::Data::new(HealthState::new());
    // Clone for the server factory so the readiness probe stays reachable.
    let server_health_state = health_state.clone();
    let key = settings.key;
    let cookie_secure = settings.cookie_secure;
    let server = HttpServer::new(move || {
        build_app(
            server_health_state.clone(),
            state.clone(),
            key.clone(),
            cookie_secure,
        )
    })
    .bind(bind_addr)?;

    health_state.mark_ready();
    server.run().await
}

/// Wire the domain services over the Diesel adapters.
fn build_state(pool: &DbPool) -> HttpState {
    let habit_repo = Arc::new(DieselHabitRepository::new(pool.clone()));
    let entry_repo = Arc::new(DieselEntryRepository::new(pool.clone()));
    let journal_repo = Arc::new(DieselJournalRepository::new(pool.clone()));
    let user_repo = Arc::new(DieselUserRepository::new(pool.clone()));
    let hasher = Arc::new(BcryptPasswordHasher::new());

    let habit_service = Arc::new(HabitService::new(
        habit_repo.clone(),
        entry_repo.clone(),
        journal_repo.clone(),
    ));
    let ordering_service = Arc::new(OrderingService::new(habit_repo.clone()));
    let reconciliation = Arc::new(ReconciliationService::new(
        habit_repo,
        entry_repo,
        journal_repo.clone(),
    ));
    let journal_service = Arc::new(JournalService::new(journal_repo));
    let accounts = Arc::new(AccountService::new(user_repo, hasher));

    HttpState {
        registration: accounts.clone(),
        login: accounts.clone(),
        profile: accounts.clone(),
        profile_query: accounts,
        habits: habit_service.clone(),
        habits_query: habit_service.clone(),
        entries: habit_service,
        reorder: ordering_service.clone(),
        ordered: ordering_service,
        journal: journal_service.clone(),
        journal_query: journal_service,
        import: reconciliation.clone(),
        export: reconciliation,
    }
}

fn build_app(
    health_state: web::Data<HealthState>,
    state: HttpState,
    key: Key,
    cookie_secure: bool,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_same_site(SameSite::Lax)
        .build();

    let api = web::scope("/api/v1")
        .wrap(session)
        .service(register)
        .service(login)
        .service(logout)
        .service(get_profile)
        .service(update_profile)
        .service(get_habits)
        .service(create_habit)
        .service(reorder_habits)
        .service(rename_habit)
        .service(remove_habit)
        .service(upsert_entry)
        .service(get_journal)
        .service(upsert_journal)
        .service(import_habits)
        .service(export_habits);

    #[cfg_attr(not(debug_assertions), expect(unused_mut, reason = "swagger mount is debug-only"))]
    let mut app = App::new()
        .app_data(health_state)
        .app_data(web::Data::new(state))
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    {
        app = app.service(SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()));
    }

    app
}
