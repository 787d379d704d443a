//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::{HttpResponse, web};

use crate::domain::ports::{
    EntriesCommand, ExportQuery, HabitsCommand, HabitsQuery, ImportCommand, JournalCommand,
    JournalQuery, LoginService, MockEntriesCommand, MockExportQuery, MockHabitsCommand,
    MockHabitsQuery, MockImportCommand, MockJournalCommand, MockJournalQuery, MockLoginService,
    MockOrderedHabitsQuery, MockProfileCommand, MockProfileQuery, MockRegistrationCommand,
    MockReorderCommand, OrderedHabitsQuery, ProfileCommand, ProfileQuery, RegistrationCommand,
    ReorderCommand,
};
use crate::domain::{Error, UserId};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Fixed user id persisted by [`seed_session`].
pub(crate) const TEST_USER_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

/// Cookie-session middleware with a throwaway key for handler tests.
pub(crate) fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".into())
        .cookie_secure(false)
        .build()
}

/// Route handler that logs in [`TEST_USER_ID`]; mount under `/test/login`.
pub(crate) fn seed_session() -> actix_web::Route {
    web::get().to(|session: SessionContext| async move {
        let id = UserId::new(TEST_USER_ID).expect("test user id");
        session.persist_user(&id)?;
        Ok::<_, Error>(HttpResponse::Ok())
    })
}

/// Call `/test/login` and return the resulting session cookie.
pub(crate) async fn obtain_session_cookie<S, B>(app: &S) -> Cookie<'static>
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse<B>,
            Error = actix_web::Error,
        >,
    B: actix_web::body::MessageBody,
{
    let res = actix_web::test::call_service(
        app,
        actix_web::test::TestRequest::get()
            .uri("/test/login")
            .to_request(),
    )
    .await;
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}

/// Builder assembling an [`HttpState`] from unconfigured mocks.
///
/// Every port defaults to a mock with no expectations, so a handler that
/// touches a port the test did not stub panics loudly instead of passing
/// by accident.
pub(crate) struct StateBuilder {
    registration: Arc<dyn RegistrationCommand>,
    login: Arc<dyn LoginService>,
    profile: Arc<dyn ProfileCommand>,
    profile_query: Arc<dyn ProfileQuery>,
    habits: Arc<dyn HabitsCommand>,
    habits_query: Arc<dyn HabitsQuery>,
    entries: Arc<dyn EntriesCommand>,
    reorder: Arc<dyn ReorderCommand>,
    ordered: Arc<dyn OrderedHabitsQuery>,
    journal: Arc<dyn JournalCommand>,
    journal_query: Arc<dyn JournalQuery>,
    import: Arc<dyn ImportCommand>,
    export: Arc<dyn ExportQuery>,
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self {
            registration: Arc::new(MockRegistrationCommand::new()),
            login: Arc::new(MockLoginService::new()),
            profile: Arc::new(MockProfileCommand::new()),
            profile_query: Arc::new(MockProfileQuery::new()),
            habits: Arc::new(MockHabitsCommand::new()),
            habits_query: Arc::new(MockHabitsQuery::new()),
            entries: Arc::new(MockEntriesCommand::new()),
            reorder: Arc::new(MockReorderCommand::new()),
            ordered: Arc::new(MockOrderedHabitsQuery::new()),
            journal: Arc::new(MockJournalCommand::new()),
            journal_query: Arc::new(MockJournalQuery::new()),
            import: Arc::new(MockImportCommand::new()),
            export: Arc::new(MockExportQuery::new()),
        }
    }
}

impl StateBuilder {
    pub(crate) fn registration(mut self, port: impl RegistrationCommand + 'static) -> Self {
        self.registration = Arc::new(port);
        self
    }

    pub(crate) fn login(mut self, port: impl LoginService + 'static) -> Self {
        self.login = Arc::new(port);
        self
    }

    pub(crate) fn profile(mut self, port: impl ProfileCommand + 'static) -> Self {
        self.profile = Arc::new(port);
        self
    }

    pub(crate) fn profile_query(mut self, port: impl ProfileQuery + 'static) -> Self {
        self.profile_query = Arc::new(port);
        self
    }

    pub(crate) fn habits(mut self, port: impl HabitsCommand + 'static) -> Self {
        self.habits = Arc::new(port);
        self
    }

    pub(crate) fn habits_query(mut self, port: impl HabitsQuery + 'static) -> Self {
        self.habits_query = Arc::new(port);
        self
    }

    pub(crate) fn entries(mut self, port: impl EntriesCommand + 'static) -> Self {
        self.entries = Arc::new(port);
        self
    }

    pub(crate) fn reorder(mut self, port: impl ReorderCommand + 'static) -> Self {
        self.reorder = Arc::new(port);
        self
    }

    pub(crate) fn ordered(mut self, port: impl OrderedHabitsQuery + 'static) -> Self {
        self.ordered = Arc::new(port);
        self
    }

    pub(crate) fn journal(mut self, port: impl JournalCommand + 'static) -> Self {
        self.journal = Arc::new(port);
        self
    }

    pub(crate) fn journal_query(mut self, port: impl JournalQuery + 'static) -> Self {
        self.journal_query = Arc::new(port);
        self
    }

    pub(crate) fn import(mut self, port: impl ImportCommand + 'static) -> Self {
        self.import = Arc::new(port);
        self
    }

    pub(crate) fn export(mut self, port: impl ExportQuery + 'static) -> Self {
        self.export = Arc::new(port);
        self
    }

    pub(crate) fn build(self) -> HttpState {
        HttpState {
            registration: self.registration,
            login: self.login,
            profile: self.profile,
            profile_query: self.profile_query,
            habits: self.habits,
            habits_query: self.habits_query,
            entries: self.entries,
            reorder: self.reorder,
            ordered: self.ordered,
            journal: self.journal,
            journal_query: self.journal_query,
            import: self.import,
            export: self.export,
        }
    }
}
