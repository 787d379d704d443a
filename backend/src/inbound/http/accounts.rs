//! Account HTTP handlers.
//!
//! ```text
//! POST  /api/v1/register
//! POST  /api/v1/login
//! POST  /api/v1/logout
//! GET   /api/v1/users/me
//! PATCH /api/v1/users/me
//! ```

use actix_web::{HttpResponse, get, patch, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{ProfileUpdateRequest, RegistrationRequest};
use crate::domain::{
    DisplayName, EmailAddress, Error, LoginCredentials, LoginValidationError, UserProfile,
    Username,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{invalid_field_error, missing_field_error};

/// Registration request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBody {
    pub email: Option<String>,
    pub password: Option<String>,
    /// Desired handle; generated uniquely when omitted.
    pub username: Option<String>,
    /// Display name; derived from the handle when omitted.
    pub name: Option<String>,
}

/// Login request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginBody {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Profile update request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileBody {
    pub name: Option<String>,
    pub username: Option<String>,
}

/// Public account view returned by the account endpoints.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: String,
    pub email: String,
    pub username: String,
    pub display_name: String,
}

impl From<UserProfile> for ProfileResponse {
    fn from(value: UserProfile) -> Self {
        Self {
            id: value.id.to_string(),
            email: value.email.to_string(),
            username: value.username.to_string(),
            display_name: value.display_name.to_string(),
        }
    }
}

fn parse_email(raw: Option<String>) -> Result<EmailAddress, Error> {
    let raw = raw.ok_or_else(|| missing_field_error("email"))?;
    EmailAddress::new(&raw).map_err(|err| invalid_field_error("email", err.to_string()))
}

fn parse_optional_username(raw: Option<String>) -> Result<Option<Username>, Error> {
    raw.map(|value| {
        Username::new(&value).map_err(|err| invalid_field_error("username", err.to_string()))
    })
    .transpose()
}

fn parse_optional_name(raw: Option<String>) -> Result<Option<DisplayName>, Error> {
    raw.map(|value| {
        DisplayName::new(&value).map_err(|err| invalid_field_error("name", err.to_string()))
    })
    .transpose()
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::EmptyEmail => missing_field_error("email"),
        LoginValidationError::EmptyPassword => missing_field_error("password"),
    }
}

/// Create a credential account and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/register",
    request_body = RegisterBody,
    responses(
        (status = 201, description = "Account created", body = ProfileResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Email or username already taken", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RegisterBody>,
) -> ApiResult<HttpResponse> {
    let RegisterBody {
        email,
        password,
        username,
        name,
    } = payload.into_inner();

    let request = RegistrationRequest {
        email: parse_email(email)?,
        password: password.ok_or_else(|| missing_field_error("password"))?,
        username: parse_optional_username(username)?,
        display_name: parse_optional_name(name)?,
    };

    let profile = state.registration.register(request).await?;
    session.persist_user(&profile.id)?;
    Ok(HttpResponse::Created().json(ProfileResponse::from(profile)))
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginBody,
    responses(
        (status = 200, description = "Login success", body = ProfileResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginBody>,
) -> ApiResult<HttpResponse> {
    let LoginBody { email, password } = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(
        email.as_deref().unwrap_or_default(),
        password.as_deref().unwrap_or_default(),
    )
    .map_err(map_login_validation_error)?;

    let profile = state.login.authenticate(&credentials).await?;
    session.persist_user(&profile.id)?;
    Ok(HttpResponse::Ok().json(ProfileResponse::from(profile)))
}

/// Drop the current session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["accounts"],
    operation_id = "logout",
    security([])
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}

/// Fetch the authenticated user's profile.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Account removed", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "getProfile"
)]
#[get("/users/me")]
pub async fn get_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<ProfileResponse>> {
    let user_id = session.require_user_id()?;
    let profile = state.profile_query.fetch(&user_id).await?;
    Ok(web::Json(ProfileResponse::from(profile)))
}

/// Update the authenticated user's display name and/or username.
#[utoipa::path(
    patch,
    path = "/api/v1/users/me",
    request_body = ProfileBody,
    responses(
        (status = 200, description = "Updated profile", body = ProfileResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 409, description = "Username already taken", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "updateProfile"
)]
#[patch("/users/me")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ProfileBody>,
) -> ApiResult<web::Json<ProfileResponse>> {
    let user_id = session.require_user_id()?;
    let ProfileBody { name, username } = payload.into_inner();

    let profile = state
        .profile
        .update(ProfileUpdateRequest {
            user_id,
            display_name: parse_optional_name(name)?,
            username: parse_optional_username(username)?,
        })
        .await?;
    Ok(web::Json(ProfileResponse::from(profile)))
}
