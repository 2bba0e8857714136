use std::{
    ops::{Deref, DerefMut},
    sync::Arc,
    time::Duration,
};

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Request, State},
    http::{StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::Key;
use diesel::{
    SqliteConnection,
    connection::{SimpleConnection, TransactionManager},
    r2d2::{ConnectionManager, CustomizeConnection, Pool, PooledConnection},
};

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

type PooledConn = PooledConnection<ConnectionManager<SqliteConnection>>;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub key: Key,
}

impl FromRef<AppState> for DbPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.key.clone()
    }
}

/// SQLite only honours `ON DELETE` clauses once foreign keys are switched on,
/// and the setting is per connection.
#[derive(Debug)]
pub struct ForeignKeys;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error>
    for ForeignKeys
{
    fn on_acquire(
        &self,
        conn: &mut SqliteConnection,
    ) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute("PRAGMA foreign_keys = ON;")
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Sizing and recycling for the connection pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolLimits {
    pub max_size: u32,
    pub idle_timeout: Option<Duration>,
    pub max_lifetime: Option<Duration>,
}

impl PoolLimits {
    /// An in-memory database lives and dies with its only connection, so that
    /// connection is never recycled.
    pub fn for_url(db_url: &str) -> Self {
        if db_url == ":memory:" {
            PoolLimits {
                max_size: 1,
                idle_timeout: None,
                max_lifetime: None,
            }
        } else {
            PoolLimits {
                max_size: 10,
                idle_timeout: Some(Duration::from_secs(10 * 60)),
                max_lifetime: Some(Duration::from_secs(30 * 60)),
            }
        }
    }
}

pub fn make_pool(db_url: &str) -> Result<DbPool, diesel::r2d2::PoolError> {
    let limits = PoolLimits::for_url(db_url);
    Pool::builder()
        .max_size(limits.max_size)
        .idle_timeout(limits.idle_timeout)
        .max_lifetime(limits.max_lifetime)
        .connection_customizer(Box::new(ForeignKeys))
        .build(ConnectionManager::<SqliteConnection>::new(db_url))
}

/// The connection (and open transaction) belonging to a single request.
#[derive(Clone)]
pub struct ThreadSafeConn {
    pub inner: Arc<tokio::sync::Mutex<PooledConn>>,
}

/// Opens a transaction for every request and stores it in the request
/// extensions. The transaction is committed if the handler produced a
/// successful or redirecting response, and rolled back otherwise.
pub async fn transaction_layer(
    State(pool): State<DbPool>,
    mut req: Request,
    next: Next,
) -> Response {
    let conn = tokio::task::spawn_blocking(move || {
        let mut conn = pool.get().map_err(|e| e.to_string())?;
        <PooledConn as diesel::Connection>::TransactionManager::begin_transaction(
            &mut conn,
        )
        .map_err(|e| e.to_string())?;
        Ok::<_, String>(conn)
    })
    .await;

    let conn = match conn {
        Ok(Ok(conn)) => conn,
        Ok(Err(e)) => {
            tracing::error!("failed to acquire connection: {e}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
        Err(e) => {
            tracing::error!("connection task failed: {e}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let shared = ThreadSafeConn {
        inner: Arc::new(tokio::sync::Mutex::new(conn)),
    };
    req.extensions_mut().insert(shared.clone());

    let res = next.run(req).await;

    let mut conn = shared.inner.lock().await;
    let status = res.status();
    let outcome = if status.is_success()
        || status.is_redirection()
        || status.is_informational()
    {
        <PooledConn as diesel::Connection>::TransactionManager::commit_transaction(
            &mut *conn,
        )
    } else {
        <PooledConn as diesel::Connection>::TransactionManager::rollback_transaction(
            &mut *conn,
        )
    };

    match outcome {
        Ok(()) => res,
        Err(e) => {
            tracing::error!("failed to finish transaction: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ThreadSafeConn
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<ThreadSafeConn>()
            .cloned()
            .ok_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

/// Exclusive access to the request's connection for the lifetime of a
/// handler. Extract this after any [`crate::auth::User`].
pub struct Conn {
    inner: tokio::sync::OwnedMutexGuard<PooledConn>,
}

impl Deref for Conn {
    type Target = PooledConn;

    fn deref(&self) -> &Self::Target {
        self.inner.deref()
    }
}

impl DerefMut for Conn {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.inner.deref_mut()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Conn
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let conn = ThreadSafeConn::from_request_parts(parts, state).await?;
        let inner = conn
            .inner
            .try_lock_owned()
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
        Ok(Conn { inner })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{PoolLimits, make_pool};

    #[test]
    fn memory_connection_is_never_recycled() {
        let limits = PoolLimits::for_url(":memory:");
        assert_eq!(limits.max_size, 1);
        assert_eq!(limits.idle_timeout, None);
        assert_eq!(limits.max_lifetime, None);

        let pool = make_pool(":memory:").unwrap();
        assert_eq!(pool.max_size(), 1);
    }

    #[test]
    fn file_connections_are_recycled() {
        let limits = PoolLimits::for_url("teambuilder.sqlite3");
        assert_eq!(limits.max_size, 10);
        assert_eq!(limits.idle_timeout, Some(Duration::from_secs(600)));
        assert_eq!(limits.max_lifetime, Some(Duration::from_secs(1800)));
    }
}
