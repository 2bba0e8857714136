use diesel_migrations::{EmbeddedMigrations, embed_migrations};

pub mod auth;
pub mod config;
pub mod permission;
pub mod schema;
pub mod state;
pub mod teams;
pub mod template;
pub mod util_resp;
pub mod validation;
pub mod widgets;

#[cfg(test)]
mod test;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();
