use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::User,
    permission::Permission,
    schema::{teams, users},
    util_resp::FailureResponse,
};

pub mod code;
pub mod create;
pub mod evaluations;
pub mod fixtures;
pub mod join;
pub mod videos;
pub mod view;

#[derive(Serialize, Deserialize, Queryable, Clone, Debug, PartialEq, Eq)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub code: String,
    /// The coach who created the team. Only they (and administrators) may
    /// manage it; anyone else joins with the code.
    pub created_by: Option<String>,
}

impl Team {
    /// Creates a team. This is the only place a join code is assigned, so a
    /// team keeps its code for as long as it exists.
    #[tracing::instrument(skip(conn))]
    pub fn create(
        name: &str,
        created_by: Option<&str>,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> QueryResult<Team> {
        let team = Team {
            id: Uuid::now_v7().to_string(),
            name: name.to_string(),
            code: code::get_unique_team_code(conn)?,
            created_by: created_by.map(str::to_string),
        };

        diesel::insert_into(teams::table)
            .values((
                teams::id.eq(&team.id),
                teams::name.eq(&team.name),
                teams::code.eq(&team.code),
                teams::created_by.eq(&team.created_by),
            ))
            .execute(conn)?;

        tracing::info!(team_id = %team.id, "created team");

        Ok(team)
    }

    #[tracing::instrument(skip(conn))]
    pub fn fetch(
        team_id: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Team, FailureResponse> {
        teams::table
            .filter(teams::id.eq(team_id))
            .first::<Team>(conn)
            .optional()?
            .ok_or(FailureResponse::NotFound(()))
    }

    pub fn fetch_by_code(
        code: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> QueryResult<Option<Team>> {
        teams::table
            .filter(teams::code.eq(code.trim()))
            .first::<Team>(conn)
            .optional()
    }

    /// Changes the display name. The join code is left alone.
    pub fn rename(
        &mut self,
        name: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> QueryResult<()> {
        diesel::update(teams::table.filter(teams::id.eq(&self.id)))
            .set(teams::name.eq(name))
            .execute(conn)?;
        self.name = name.to_string();
        Ok(())
    }

    /// Deletes the team. Its videos, evaluations and fixture associations
    /// go with it; members stay, with their team cleared.
    #[tracing::instrument(skip(conn))]
    pub fn delete(
        self,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> QueryResult<()> {
        diesel::delete(teams::table.filter(teams::id.eq(&self.id)))
            .execute(conn)?;
        Ok(())
    }

    pub fn members(
        &self,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> QueryResult<Vec<User>> {
        users::table
            .filter(users::team_id.eq(&self.id))
            .order_by((users::last_name.asc(), users::first_name.asc()))
            .load::<User>(conn)
    }

    pub fn is_created_by(&self, user: &User) -> bool {
        self.created_by.as_deref() == Some(user.id.as_str())
    }

    /// Returns a 403 unless the user may act on this team in the given way.
    pub fn check_permission(
        &self,
        user: &User,
        permission: Permission,
    ) -> Result<(), FailureResponse> {
        if user.can(permission, self) {
            Ok(())
        } else {
            Err(FailureResponse::Unauthorized(()))
        }
    }
}

impl std::fmt::Display for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use diesel::prelude::*;

    use super::Team;
    use crate::{
        auth::manager::{NewUserConfig, create_user},
        schema::users,
        teams::code::CODE_LEN,
        test::test_conn,
    };

    #[test]
    fn create_assigns_code() {
        let mut conn = test_conn();
        let team = Team::create("Hawks", None, &mut conn).unwrap();

        assert_eq!(team.code.chars().count(), CODE_LEN);
        assert!(team.code.chars().all(|c| c.is_ascii_alphanumeric()));

        let stored = Team::fetch(&team.id, &mut conn).unwrap();
        assert_eq!(stored, team);
    }

    #[test]
    fn rename_keeps_code() {
        let mut conn = test_conn();
        let mut team = Team::create("Hawks", None, &mut conn).unwrap();
        let code = team.code.clone();

        team.rename("Falcons", &mut conn).unwrap();

        let stored = Team::fetch(&team.id, &mut conn).unwrap();
        assert_eq!(stored.name, "Falcons");
        assert_eq!(stored.code, code);
    }

    #[test]
    fn fetch_by_code_trims() {
        let mut conn = test_conn();
        let team = Team::create("Hawks", None, &mut conn).unwrap();

        let found =
            Team::fetch_by_code(&format!(" {} ", team.code), &mut conn)
                .unwrap();
        assert_eq!(found, Some(team));
        assert_eq!(Team::fetch_by_code("zzzzzz", &mut conn).unwrap(), None);
    }

    #[test]
    fn delete_clears_member_team() {
        let mut conn = test_conn();
        let team = Team::create("Hawks", None, &mut conn).unwrap();
        let user = create_user(
            &mut conn,
            "jane@example.com",
            "Jane",
            "Doe",
            Some("secret123"),
            NewUserConfig {
                team_id: Some(team.id.clone()),
                ..NewUserConfig::standard()
            },
        )
        .unwrap();
        assert_eq!(team.members(&mut conn).unwrap().len(), 1);

        team.delete(&mut conn).unwrap();

        let team_id: Option<String> = users::table
            .filter(users::id.eq(&user.id))
            .select(users::team_id)
            .first(&mut conn)
            .unwrap();
        assert_eq!(team_id, None);
    }
}
