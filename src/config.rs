use axum::{
    Router, middleware,
    routing::{get, post},
};
use axum_extra::extract::cookie::Key;
use diesel_migrations::MigrationHarness;
use hypertext::prelude::*;
use tokio::task::spawn_blocking;
use tower_http::trace::TraceLayer;

use crate::{
    MIGRATIONS,
    auth::{
        User,
        login::{do_login, do_logout, login_page},
        register::{do_register, register_page},
        view::profile_page,
    },
    permission::Permission,
    state::{AppState, Conn, DbPool, make_pool, transaction_layer},
    teams::{
        Team,
        create::{create_team_page, do_create_team},
        evaluations::manage::{
            create_evaluation_page, do_create_evaluation,
            team_evaluations_page,
        },
        fixtures::manage::{
            create_fixture_page, do_create_fixture, team_fixtures_page,
        },
        join::{do_join_team, join_team_page},
        videos::manage::{create_video_page, do_create_video, team_videos_page},
        view::{do_delete_team, view_team_page},
    },
    template::Page,
    util_resp::{StandardResponse, success},
    widgets::alert::InfoAlert,
};

pub const DEFAULT_DATABASE_URL: &str = ":memory:";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("could not open the database: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    #[error("could not run migrations: {0}")]
    Migrations(String),
    #[error("could not bind: {0}")]
    Io(#[from] std::io::Error),
}

/// Settings read from the environment. Command line flags take precedence
/// and are applied by the binary.
pub struct Settings {
    pub database_url: String,
    pub secret_key: Option<String>,
    pub bind_addr: String,
}

impl Settings {
    pub fn from_env() -> Self {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        let bind_addr = std::env::var("BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        Settings {
            database_url,
            secret_key: std::env::var("SECRET_KEY").ok(),
            bind_addr,
        }
    }

    /// The key used to encrypt session cookies.
    pub fn cookie_key(&self) -> Key {
        secret_key(self.secret_key.as_deref())
    }
}

/// Uses the configured key if it is long enough (64 bytes). Otherwise a
/// random key is generated, which means sessions do not survive a restart.
pub fn secret_key(configured: Option<&str>) -> Key {
    match configured {
        Some(secret) => match Key::try_from(secret.as_bytes()) {
            Ok(key) => key,
            Err(e) => {
                tracing::warn!(
                    "SECRET_KEY is unusable ({e}), generating a random key"
                );
                Key::generate()
            }
        },
        None => {
            tracing::warn!("SECRET_KEY is not set, generating a random key");
            Key::generate()
        }
    }
}

pub async fn run_migrations(pool: &DbPool) -> Result<(), SetupError> {
    let pool = pool.clone();
    spawn_blocking(move || -> Result<(), SetupError> {
        let mut conn = pool.get()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| SetupError::Migrations(e.to_string()))?;
        tracing::info!(count = applied.len(), "applied migrations");
        Ok(())
    })
    .await
    .map_err(|e| SetupError::Migrations(e.to_string()))?
}

/// Opens the database and brings its schema up to date.
pub async fn prepare_database(db_url: &str) -> Result<DbPool, SetupError> {
    tracing::info!(location = db_url, "opening database");
    let pool = make_pool(db_url)?;
    run_migrations(&pool).await?;
    Ok(pool)
}

pub async fn home(user: Option<User>, mut conn: Conn) -> StandardResponse {
    let team = match user.as_ref().and_then(|user| user.team_id.as_deref()) {
        Some(team_id) => Some(Team::fetch(team_id, &mut *conn)?),
        None => None,
    };
    let can_create = user
        .as_ref()
        .is_some_and(|user| user.role_grants(Permission::ManageTeam));
    let logged_in = user.is_some();

    success(
        Page::new()
            .user_opt(user)
            .body(maud! {
                h1 { "TeamBuilder" }
                @if !logged_in {
                    InfoAlert msg="Log in or register to see your team.";
                }
                ul {
                    @if let Some(team) = &team {
                        li {
                            a href=(format!("/teams/{}", team.id)) { (team.name) }
                        }
                    } @else {
                        @if logged_in {
                            li { a href="/teams/join" { "Join a team" } }
                        }
                    }
                    @if can_create {
                        li { a href="/teams/create" { "Create a new team" } }
                    }
                }
            })
            .render(),
    )
}

pub fn create_app(pool: DbPool, key: Key) -> Router {
    let state = AppState {
        pool: pool.clone(),
        key,
    };

    Router::new()
        .route("/", get(home))
        .route("/register", get(register_page).post(do_register))
        .route("/login", get(login_page).post(do_login))
        .route("/logout", post(do_logout))
        .route("/user", get(profile_page))
        .route("/teams/create", get(create_team_page).post(do_create_team))
        .route("/teams/join", get(join_team_page).post(do_join_team))
        .route("/teams/:team_id", get(view_team_page))
        .route("/teams/:team_id/delete", post(do_delete_team))
        .route("/teams/:team_id/videos", get(team_videos_page))
        .route(
            "/teams/:team_id/videos/create",
            get(create_video_page).post(do_create_video),
        )
        .route("/teams/:team_id/fixtures", get(team_fixtures_page))
        .route(
            "/teams/:team_id/fixtures/create",
            get(create_fixture_page).post(do_create_fixture),
        )
        .route("/teams/:team_id/evaluations", get(team_evaluations_page))
        .route(
            "/teams/:team_id/evaluations/create",
            get(create_evaluation_page).post(do_create_evaluation),
        )
        .layer(middleware::from_fn_with_state(pool, transaction_layer))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_secret_is_replaced() {
        // must not panic, a fresh key is generated instead
        let _ = secret_key(Some("too short"));
        let _ = secret_key(None);
    }

    #[test]
    fn long_secret_is_used() {
        let secret = "k".repeat(64);
        let a = secret_key(Some(&secret));
        let b = secret_key(Some(&secret));
        assert_eq!(a.master(), b.master());
    }
}
