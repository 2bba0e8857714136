//! Test helpers, and tests which drive the whole application over HTTP.

use axum_extra::extract::cookie::Key;
use axum_test::{TestServer, TestServerConfig};
use diesel::{Connection, SqliteConnection, connection::SimpleConnection};
use diesel_migrations::MigrationHarness;

use crate::{
    MIGRATIONS,
    config::create_app,
    state::{DbPool, make_pool},
};

mod registration;

/// A fresh in-memory database with the schema applied.
pub fn test_conn() -> SqliteConnection {
    let mut conn = SqliteConnection::establish(":memory:").unwrap();
    conn.batch_execute("PRAGMA foreign_keys = ON;").unwrap();
    conn.run_pending_migrations(MIGRATIONS).unwrap();
    conn
}

/// The application backed by a fresh in-memory database. The pool holds a
/// single connection, so do not keep one checked out while making requests.
pub struct TestApp {
    pub pool: DbPool,
    key: Key,
}

impl TestApp {
    pub fn new() -> Self {
        let pool = make_pool(":memory:").unwrap();
        {
            let mut conn = pool.get().unwrap();
            conn.run_pending_migrations(MIGRATIONS).unwrap();
        }
        assert_eq!(pool.state().idle_connections, 1);

        TestApp {
            pool,
            key: Key::generate(),
        }
    }

    /// A client with its own cookies, so each one can be logged in as a
    /// different user.
    pub fn client(&self) -> TestServer {
        TestServer::new_with_config(
            create_app(self.pool.clone(), self.key.clone()),
            TestServerConfig {
                save_cookies: true,
                ..TestServerConfig::default()
            },
        )
        .unwrap()
    }
}

/// Registers (and thereby logs in) an account of the given type.
pub async fn register(
    server: &TestServer,
    email: &str,
    user_type: &str,
    team_code: &str,
) -> axum_test::TestResponse {
    server
        .post("/register")
        .form(&[
            ("email", email),
            ("first_name", "Jane"),
            ("last_name", "Doe"),
            ("user_type", user_type),
            ("team_code", team_code),
            ("password1", "secret123"),
            ("password2", "secret123"),
        ])
        .await
}
