//! In-memory adapters and app assembly for HTTP integration tests.
//!
//! The real domain services run against these stores, so the tests cover
//! everything except the Diesel layer itself.

use std::sync::{Arc, Mutex};

use actix_http::Request;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{App, test, web};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use habitgrid::domain::habits::{Habit, HabitEntry, HabitName};
use habitgrid::domain::journal::Journal;
use habitgrid::domain::ports::{
    CredentialUser, EntryRepository, EntryRepositoryError, HabitRepository,
    HabitRepositoryError, JournalRepository, JournalRepositoryError, NewHabit, NewUserRecord,
    PasswordHasher, PasswordHasherError, UserRepository, UserRepositoryError,
};
use habitgrid::domain::user::{DisplayName, EmailAddress, UserId, UserProfile, Username};
use habitgrid::domain::{
    AccountService, HabitService, JournalService, OrderingService, ReconciliationService,
};
use habitgrid::inbound::http::accounts::{get_profile, login, logout, register, update_profile};
use habitgrid::inbound::http::entries::upsert_entry;
use habitgrid::inbound::http::habits::{
    create_habit, get_habits, remove_habit, rename_habit, reorder_habits,
};
use habitgrid::inbound::http::import_export::{export_habits, import_habits};
use habitgrid::inbound::http::journal::{get_journal, upsert_journal};
use habitgrid::inbound::http::state::HttpState;

#[derive(Default)]
struct StoreState {
    habits: Vec<Habit>,
    entries: Vec<HabitEntry>,
    journals: Vec<Journal>,
}

/// In-memory stand-in for the habit, entry, and journal stores.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
}

impl InMemoryStore {
    pub fn habits(&self) -> Vec<Habit> {
        self.state.lock().expect("store lock").habits.clone()
    }

    pub fn entries(&self) -> Vec<HabitEntry> {
        self.state.lock().expect("store lock").entries.clone()
    }

    pub fn journals(&self) -> Vec<Journal> {
        self.state.lock().expect("store lock").journals.clone()
    }
}

#[async_trait]
impl HabitRepository for InMemoryStore {
    async fn find_by_name(
        &self,
        user_id: &UserId,
        name: &HabitName,
        active: bool,
    ) -> Result<Option<Habit>, HabitRepositoryError> {
        let state = self.state.lock().expect("store lock");
        Ok(state
            .habits
            .iter()
            .find(|h| h.user_id == *user_id && h.name == *name && h.active == active)
            .cloned())
    }

    async fn find_owned(
        &self,
        user_id: &UserId,
        habit_id: &Uuid,
    ) -> Result<Option<Habit>, HabitRepositoryError> {
        let state = self.state.lock().expect("store lock");
        Ok(state
            .habits
            .iter()
            .find(|h| h.user_id == *user_id && h.id == *habit_id)
            .cloned())
    }

    async fn list_active(&self, user_id: &UserId) -> Result<Vec<Habit>, HabitRepositoryError> {
        let state = self.state.lock().expect("store lock");
        let mut habits: Vec<Habit> = state
            .habits
            .iter()
            .filter(|h| h.user_id == *user_id && h.active)
            .cloned()
            .collect();
        habits.sort_by(|a, b| {
            a.position
                .cmp(&b.position)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        Ok(habits)
    }

    async fn insert(&self, habit: NewHabit) -> Result<Habit, HabitRepositoryError> {
        let mut state = self.state.lock().expect("store lock");
        let next = state
            .habits
            .iter()
            .filter(|h| h.user_id == habit.user_id)
            .map(|h| h.position)
            .max()
            .map_or(0, |max| max + 1);
        let stored = Habit {
            id: Uuid::new_v4(),
            user_id: habit.user_id,
            name: habit.name,
            emoji: habit.emoji,
            active: true,
            position: habit.position.unwrap_or(next),
            created_at: Utc::now(),
        };
        state.habits.push(stored.clone());
        Ok(stored)
    }

    async fn update_import_meta(
        &self,
        habit_id: &Uuid,
        emoji: &str,
        position: Option<i32>,
    ) -> Result<(), HabitRepositoryError> {
        let mut state = self.state.lock().expect("store lock");
        let habit = state
            .habits
            .iter_mut()
            .find(|h| h.id == *habit_id)
            .ok_or_else(|| HabitRepositoryError::query("record not found"))?;
        habit.emoji = emoji.to_owned();
        if let Some(position) = position {
            habit.position = position;
        }
        Ok(())
    }

    async fn set_active(&self, habit_id: &Uuid, active: bool) -> Result<(), HabitRepositoryError> {
        let mut state = self.state.lock().expect("store lock");
        let habit = state
            .habits
            .iter_mut()
            .find(|h| h.id == *habit_id)
            .ok_or_else(|| HabitRepositoryError::query("record not found"))?;
        habit.active = active;
        Ok(())
    }

    async fn rename(
        &self,
        habit_id: &Uuid,
        name: &HabitName,
    ) -> Result<Habit, HabitRepositoryError> {
        let mut state = self.state.lock().expect("store lock");
        let habit = state
            .habits
            .iter_mut()
            .find(|h| h.id == *habit_id)
            .ok_or_else(|| HabitRepositoryError::query("record not found"))?;
        habit.name = name.clone();
        Ok(habit.clone())
    }

    async fn delete(&self, habit_id: &Uuid) -> Result<(), HabitRepositoryError> {
        let mut state = self.state.lock().expect("store lock");
        state.habits.retain(|h| h.id != *habit_id);
        state.entries.retain(|e| e.habit_id != *habit_id);
        Ok(())
    }

    async fn reorder(
        &self,
        user_id: &UserId,
        ordered_ids: &[Uuid],
    ) -> Result<(), HabitRepositoryError> {
        let mut state = self.state.lock().expect("store lock");
        for id in ordered_ids {
            let owned = state
                .habits
                .iter()
                .any(|h| h.id == *id && h.user_id == *user_id);
            if !owned {
                return Err(HabitRepositoryError::not_owned(*id));
            }
        }
        for (index, id) in ordered_ids.iter().enumerate() {
            if let Some(habit) = state.habits.iter_mut().find(|h| h.id == *id) {
                habit.position = i32::try_from(index).expect("test index fits i32");
            }
        }
        Ok(())
    }
}

#[async_trait]
impl EntryRepository for InMemoryStore {
    async fn upsert(
        &self,
        habit_id: &Uuid,
        date: NaiveDate,
        completed: bool,
    ) -> Result<HabitEntry, EntryRepositoryError> {
        let mut state = self.state.lock().expect("store lock");
        if let Some(entry) = state
            .entries
            .iter_mut()
            .find(|e| e.habit_id == *habit_id && e.date == date)
        {
            entry.completed = completed;
            return Ok(entry.clone());
        }
        let entry = HabitEntry {
            id: Uuid::new_v4(),
            habit_id: *habit_id,
            date,
            completed,
        };
        state.entries.push(entry.clone());
        Ok(entry)
    }

    async fn list_for_habit(
        &self,
        habit_id: &Uuid,
    ) -> Result<Vec<HabitEntry>, EntryRepositoryError> {
        let state = self.state.lock().expect("store lock");
        let mut entries: Vec<HabitEntry> = state
            .entries
            .iter()
            .filter(|e| e.habit_id == *habit_id)
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.date);
        Ok(entries)
    }

    async fn count_for_habit(&self, habit_id: &Uuid) -> Result<u64, EntryRepositoryError> {
        let state = self.state.lock().expect("store lock");
        let count = state
            .entries
            .iter()
            .filter(|e| e.habit_id == *habit_id)
            .count();
        Ok(count as u64)
    }
}

#[async_trait]
impl JournalRepository for InMemoryStore {
    async fn upsert(
        &self,
        user_id: &UserId,
        date: NaiveDate,
        body: &str,
    ) -> Result<Journal, JournalRepositoryError> {
        let mut state = self.state.lock().expect("store lock");
        if let Some(journal) = state
            .journals
            .iter_mut()
            .find(|j| j.user_id == *user_id && j.date == date)
        {
            journal.body = body.to_owned();
            journal.updated_at = Utc::now();
            return Ok(journal.clone());
        }
        let journal = Journal {
            user_id: user_id.clone(),
            date,
            body: body.to_owned(),
            updated_at: Utc::now(),
        };
        state.journals.push(journal.clone());
        Ok(journal)
    }

    async fn find(
        &self,
        user_id: &UserId,
        date: NaiveDate,
    ) -> Result<Option<Journal>, JournalRepositoryError> {
        let state = self.state.lock().expect("store lock");
        Ok(state
            .journals
            .iter()
            .find(|j| j.user_id == *user_id && j.date == date)
            .cloned())
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Journal>, JournalRepositoryError> {
        let state = self.state.lock().expect("store lock");
        let mut journals: Vec<Journal> = state
            .journals
            .iter()
            .filter(|j| j.user_id == *user_id)
            .cloned()
            .collect();
        journals.sort_by_key(|j| j.date);
        Ok(journals)
    }
}

/// In-memory account store.
#[derive(Default)]
pub struct InMemoryUsers {
    accounts: Mutex<Vec<(UserProfile, String)>>,
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn insert(&self, record: NewUserRecord) -> Result<UserProfile, UserRepositoryError> {
        let mut accounts = self.accounts.lock().expect("accounts lock");
        if accounts.iter().any(|(p, _)| p.email == record.email) {
            return Err(UserRepositoryError::DuplicateEmail);
        }
        if accounts.iter().any(|(p, _)| p.username == record.username) {
            return Err(UserRepositoryError::DuplicateUsername);
        }
        let profile = UserProfile {
            id: UserId::random(),
            email: record.email,
            username: record.username,
            display_name: record.display_name,
        };
        accounts.push((profile.clone(), record.password_hash));
        Ok(profile)
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<CredentialUser>, UserRepositoryError> {
        let accounts = self.accounts.lock().expect("accounts lock");
        Ok(accounts
            .iter()
            .find(|(p, _)| p.email == *email)
            .map(|(profile, hash)| CredentialUser {
                profile: profile.clone(),
                password_hash: hash.clone(),
            }))
    }

    async fn find_by_id(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UserProfile>, UserRepositoryError> {
        let accounts = self.accounts.lock().expect("accounts lock");
        Ok(accounts
            .iter()
            .find(|(p, _)| p.id == *user_id)
            .map(|(profile, _)| profile.clone()))
    }

    async fn username_exists(&self, username: &Username) -> Result<bool, UserRepositoryError> {
        let accounts = self.accounts.lock().expect("accounts lock");
        Ok(accounts.iter().any(|(p, _)| p.username == *username))
    }

    async fn username_taken_by_other(
        &self,
        username: &Username,
        user_id: &UserId,
    ) -> Result<bool, UserRepositoryError> {
        let accounts = self.accounts.lock().expect("accounts lock");
        Ok(accounts
            .iter()
            .any(|(p, _)| p.username == *username && p.id != *user_id))
    }

    async fn update_profile(
        &self,
        user_id: &UserId,
        display_name: Option<&DisplayName>,
        username: Option<&Username>,
    ) -> Result<UserProfile, UserRepositoryError> {
        let mut accounts = self.accounts.lock().expect("accounts lock");
        let (profile, _) = accounts
            .iter_mut()
            .find(|(p, _)| p.id == *user_id)
            .ok_or_else(|| UserRepositoryError::query("record not found"))?;
        if let Some(display_name) = display_name {
            profile.display_name = display_name.clone();
        }
        if let Some(username) = username {
            profile.username = username.clone();
        }
        Ok(profile.clone())
    }
}

/// Transparent "hash" so tests never pay bcrypt cost.
pub struct PlainHasher;

impl PasswordHasher for PlainHasher {
    fn hash(&self, password: &str) -> Result<String, PasswordHasherError> {
        Ok(format!("plain:{password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHasherError> {
        Ok(hash == format!("plain:{password}"))
    }
}

/// Shared handle to the backing store, for direct assertions.
pub struct TestStores {
    pub store: Arc<InMemoryStore>,
}

fn build_state(store: &Arc<InMemoryStore>) -> HttpState {
    let store = store.clone();
    let users = Arc::new(InMemoryUsers::default());
    let hasher = Arc::new(PlainHasher);

    let habit_service = Arc::new(HabitService::new(store.clone(), store.clone(), store.clone()));
    let ordering_service = Arc::new(OrderingService::new(store.clone()));
    let reconciliation = Arc::new(ReconciliationService::new(
        store.clone(),
        store.clone(),
        store.clone(),
    ));
    let journal_service = Arc::new(JournalService::new(store));
    let accounts = Arc::new(AccountService::new(users, hasher));

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

/// Build the full API app over fresh in-memory stores.
pub async fn spawn_app() -> (
    impl Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
    TestStores,
) {
    let store = Arc::new(InMemoryStore::default());
    let state = build_state(&store);
    let stores = TestStores { store };

    let session = SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".into())
        .cookie_secure(false)
        .build();

    let app = test::init_service(
        App::new().app_data(web::Data::new(state)).service(
            web::scope("/api/v1")
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
                .service(export_habits),
        ),
    )
    .await;

    (app, stores)
}

/// Register a fresh account and return its session cookie.
pub async fn register_account<S>(app: &S, email: &str) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/v1/register")
            .set_json(serde_json::json!({
                "email": email,
                "password": "correct horse battery",
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), actix_web::http::StatusCode::CREATED);
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("registration sets a session cookie")
        .into_owned()
}
