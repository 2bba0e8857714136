//! Account creation.
//!
//! Accounts are only ever created through [`create_user`] or
//! [`create_superuser`], both of which validate their input before anything is
//! written.

use chrono::Utc;
use diesel::{
    connection::LoadConnection,
    prelude::*,
    result::{DatabaseErrorKind, Error as DieselError},
    sqlite::Sqlite,
};
use uuid::Uuid;

use crate::{
    auth::{User, password},
    permission::UserType,
    schema::users,
};

#[derive(Debug, thiserror::Error)]
pub enum CreateUserError {
    #[error("Users must have an email address")]
    MissingEmail,
    #[error("Users must enter their first name")]
    MissingFirstName,
    #[error("Users must enter their last name")]
    MissingLastName,
    #[error("Superusers must have a password")]
    MissingPassword,
    #[error("A user with that email address already exists")]
    DuplicateEmail,
    #[error("could not hash password: {0}")]
    Hash(String),
    #[error(transparent)]
    Database(DieselError),
}

impl From<DieselError> for CreateUserError {
    fn from(e: DieselError) -> Self {
        match e {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                CreateUserError::DuplicateEmail
            }
            e => CreateUserError::Database(e),
        }
    }
}

/// Everything about a new account other than its identity and credentials.
///
/// Every default is spelled out in [`NewUserConfig::standard`], rather than
/// being left to the column defaults.
#[derive(Debug, Clone)]
pub struct NewUserConfig {
    pub user_type: UserType,
    pub is_active: bool,
    pub is_admin: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_coach: bool,
    pub team_id: Option<String>,
}

impl NewUserConfig {
    pub fn standard() -> Self {
        NewUserConfig {
            user_type: UserType::Coach,
            is_active: true,
            is_admin: false,
            is_staff: false,
            is_superuser: false,
            is_coach: false,
            team_id: None,
        }
    }
}

/// Lowercases the domain part of an email address. The local part is left
/// as-is, as some mail servers treat it case-sensitively.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => email.to_string(),
    }
}

#[tracing::instrument(skip(conn, password))]
pub fn create_user(
    conn: &mut impl LoadConnection<Backend = Sqlite>,
    email: &str,
    first_name: &str,
    last_name: &str,
    password: Option<&str>,
    config: NewUserConfig,
) -> Result<User, CreateUserError> {
    if email.trim().is_empty() {
        return Err(CreateUserError::MissingEmail);
    }
    if first_name.trim().is_empty() {
        return Err(CreateUserError::MissingFirstName);
    }
    if last_name.trim().is_empty() {
        return Err(CreateUserError::MissingLastName);
    }

    let password_hash = match password {
        Some(password) => {
            password::hash_password(password).map_err(CreateUserError::Hash)?
        }
        None => password::make_unusable_password(),
    };

    let user = User {
        id: Uuid::now_v7().to_string(),
        email: normalize_email(email),
        password_hash,
        first_name: first_name.trim().to_string(),
        last_name: last_name.trim().to_string(),
        date_joined: Utc::now().naive_utc(),
        last_login: None,
        is_active: config.is_active,
        is_admin: config.is_admin,
        is_staff: config.is_staff,
        is_superuser: config.is_superuser,
        is_coach: config.is_coach,
        user_type: config.user_type.code().to_string(),
        team_id: config.team_id,
    };

    diesel::insert_into(users::table)
        .values((
            users::id.eq(&user.id),
            users::email.eq(&user.email),
            users::password_hash.eq(&user.password_hash),
            users::first_name.eq(&user.first_name),
            users::last_name.eq(&user.last_name),
            users::date_joined.eq(user.date_joined),
            users::last_login.eq(user.last_login),
            users::is_active.eq(user.is_active),
            users::is_admin.eq(user.is_admin),
            users::is_staff.eq(user.is_staff),
            users::is_superuser.eq(user.is_superuser),
            users::is_coach.eq(user.is_coach),
            users::user_type.eq(&user.user_type),
            users::team_id.eq(&user.team_id),
        ))
        .execute(conn)?;

    tracing::info!(user_id = %user.id, "created user");

    Ok(user)
}

/// Creates an account holding the administrator, staff and superuser flags.
/// The flags are raised by a second write once the account exists; both
/// writes share a transaction, so a failure leaves no account behind.
#[tracing::instrument(skip(conn, password))]
pub fn create_superuser(
    conn: &mut impl LoadConnection<Backend = Sqlite>,
    email: &str,
    first_name: &str,
    last_name: &str,
    password: &str,
) -> Result<User, CreateUserError> {
    if password.is_empty() {
        return Err(CreateUserError::MissingPassword);
    }

    conn.transaction(|conn| {
        let mut user = create_user(
            conn,
            email,
            first_name,
            last_name,
            Some(password),
            NewUserConfig::standard(),
        )?;

        diesel::update(users::table.filter(users::id.eq(&user.id)))
            .set((
                users::is_admin.eq(true),
                users::is_staff.eq(true),
                users::is_superuser.eq(true),
            ))
            .execute(conn)?;

        user.is_admin = true;
        user.is_staff = true;
        user.is_superuser = true;

        Ok(user)
    })
}
