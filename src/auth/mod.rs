use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use chrono::{Days, NaiveDateTime, Utc};
use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use serde::{Deserialize, Serialize};

use crate::{
    permission::UserType,
    schema::users,
    state::{DbPool, ThreadSafeConn},
    util_resp::FailureResponse,
};

pub mod login;
pub mod manager;
pub mod password;
pub mod register;
pub mod view;

pub const LOGIN_COOKIE: &str = "teambuilder_session";

#[derive(Debug, Queryable, Serialize, Deserialize, Clone)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub date_joined: NaiveDateTime,
    pub last_login: Option<NaiveDateTime>,
    pub is_active: bool,
    pub is_admin: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_coach: bool,
    pub user_type: String,
    pub team_id: Option<String>,
}

impl User {
    pub fn role(&self) -> UserType {
        // the column is constrained to valid codes; fall back to the role with
        // the fewest permissions regardless
        UserType::from_code(&self.user_type).unwrap_or(UserType::Parent)
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn fetch(
        id: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> QueryResult<Option<User>> {
        users::table
            .filter(users::id.eq(id))
            .first::<User>(conn)
            .optional()
    }

    pub fn fetch_by_email(
        email: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> QueryResult<Option<User>> {
        users::table
            .filter(users::email.eq(manager::normalize_email(email)))
            .first::<User>(conn)
            .optional()
    }

    pub fn set_team(
        &mut self,
        team_id: Option<&str>,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> QueryResult<()> {
        diesel::update(users::table.filter(users::id.eq(&self.id)))
            .set(users::team_id.eq(team_id))
            .execute(conn)?;
        self.team_id = team_id.map(str::to_string);
        Ok(())
    }

    pub fn record_login(
        &mut self,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> QueryResult<()> {
        let now = Utc::now().naive_utc();
        diesel::update(users::table.filter(users::id.eq(&self.id)))
            .set(users::last_login.eq(now))
            .execute(conn)?;
        self.last_login = Some(now);
        Ok(())
    }
}

impl std::fmt::Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.first_name, self.last_name)
    }
}

/// Re-derives an account from raw credentials. Inactive accounts and accounts
/// without a usable password never authenticate.
#[tracing::instrument(skip(password, conn))]
pub fn authenticate(
    email: &str,
    password: &str,
    conn: &mut impl LoadConnection<Backend = Sqlite>,
) -> QueryResult<Option<User>> {
    let user = match User::fetch_by_email(email, conn)? {
        Some(user) => user,
        None => {
            tracing::debug!("no account for email");
            return Ok(None);
        }
    };

    if user.is_active
        && password::verify_password(password, &user.password_hash)
    {
        Ok(Some(user))
    } else {
        tracing::debug!("credentials rejected");
        Ok(None)
    }
}

#[derive(Debug)]
pub enum AuthError {
    CookieMissingOrMalformed,
    NoDatabase,
    Unauthorized,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AuthError::CookieMissingOrMalformed => {
                (StatusCode::UNAUTHORIZED, "Cookie missing or malformed")
            }
            AuthError::NoDatabase => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error")
            }
            AuthError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, "Unauthorized")
            }
        };
        (status, body).into_response()
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
pub struct LoginSession {
    id: String,
    expiry: NaiveDateTime,
}

#[async_trait]
impl<S> FromRequestParts<S> for User
where
    S: Send + Sync,
    DbPool: FromRef<S>,
    Key: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let jar: PrivateCookieJar<Key> =
            PrivateCookieJar::from_request_parts(parts, state)
                .await
                .map_err(|_| AuthError::CookieMissingOrMalformed)?;

        let login_cookie = match jar.get(LOGIN_COOKIE) {
            Some(cookie) => cookie,
            None => return Err(AuthError::Unauthorized),
        };

        let login: LoginSession =
            match serde_json::from_str::<LoginSession>(login_cookie.value()) {
                Ok(t) if Utc::now().naive_utc() < t.expiry => t,
                _ => {
                    return Err(AuthError::Unauthorized);
                }
            };

        let conn_wrapper = ThreadSafeConn::from_request_parts(parts, state)
            .await
            .map_err(|_| AuthError::NoDatabase)?;

        let mut conn = conn_wrapper
            .inner
            .try_lock()
            .map_err(|_| AuthError::NoDatabase)?;

        let user =
            User::fetch(&login.id, &mut *conn).map_err(|_| AuthError::NoDatabase)?;

        match user {
            Some(user) if user.is_active => Ok(user),
            _ => Err(AuthError::Unauthorized),
        }
    }
}

/// Starts a session for the given account. Sessions last for seven days.
pub fn set_login_cookie(
    id: String,
    jar: PrivateCookieJar,
) -> Result<PrivateCookieJar, FailureResponse> {
    let session = serde_json::to_string(&LoginSession {
        id,
        expiry: Utc::now().naive_utc() + Days::new(7),
    })
    .map_err(|e| {
        tracing::error!("failed to serialize session: {e}");
        FailureResponse::ServerError(())
    })?;

    Ok(jar.add(
        Cookie::build((LOGIN_COOKIE, session))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax),
    ))
}

pub fn clear_login_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.remove(Cookie::build(LOGIN_COOKIE).path("/"))
}

#[cfg(test)]
mod tests {
    use super::{authenticate, manager::*};
    use crate::test::test_conn;

    #[test]
    fn authenticate_checks_password() {
        let mut conn = test_conn();
        create_user(
            &mut conn,
            "jane@Example.com",
            "Jane",
            "Doe",
            Some("secret123"),
            NewUserConfig::standard(),
        )
        .unwrap();

        let user = authenticate("jane@EXAMPLE.com", "secret123", &mut conn)
            .unwrap()
            .expect("credentials should be accepted");
        assert_eq!(user.email, "jane@example.com");

        assert!(
            authenticate("jane@example.com", "wrong-password", &mut conn)
                .unwrap()
                .is_none()
        );
        assert!(
            authenticate("john@example.com", "secret123", &mut conn)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn no_password_cannot_authenticate() {
        let mut conn = test_conn();
        let user = create_user(
            &mut conn,
            "jane@example.com",
            "Jane",
            "Doe",
            None,
            NewUserConfig::standard(),
        )
        .unwrap();

        assert!(
            authenticate("jane@example.com", "", &mut conn)
                .unwrap()
                .is_none()
        );
        assert!(
            authenticate("jane@example.com", &user.password_hash, &mut conn)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn inactive_cannot_authenticate() {
        let mut conn = test_conn();
        create_user(
            &mut conn,
            "jane@example.com",
            "Jane",
            "Doe",
            Some("secret123"),
            NewUserConfig {
                is_active: false,
                ..NewUserConfig::standard()
            },
        )
        .unwrap();

        assert!(
            authenticate("jane@example.com", "secret123", &mut conn)
                .unwrap()
                .is_none()
        );
    }
}
