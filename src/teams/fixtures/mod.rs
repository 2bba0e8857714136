use chrono::NaiveDateTime;
use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    schema::{fixture_teams, fixtures, teams},
    teams::Team,
};

pub mod manage;

#[derive(Serialize, Deserialize, Queryable, Clone, Debug, PartialEq, Eq)]
pub struct Fixture {
    pub id: String,
    pub name: String,
    pub address_1: Option<String>,
    pub address_2: Option<String>,
    pub city: Option<String>,
    pub zip_code: Option<String>,
    pub date: Option<NaiveDateTime>,
}

/// The details of a fixture which is yet to be saved.
#[derive(Debug, Default, Clone)]
pub struct NewFixture {
    pub name: String,
    pub address_1: Option<String>,
    pub address_2: Option<String>,
    pub city: Option<String>,
    pub zip_code: Option<String>,
    pub date: Option<NaiveDateTime>,
}

impl Fixture {
    /// Saves the fixture and associates it with each of the given teams.
    #[tracing::instrument(skip(conn))]
    pub fn create(
        new: NewFixture,
        team_ids: &[&str],
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> QueryResult<Fixture> {
        let fixture = Fixture {
            id: Uuid::now_v7().to_string(),
            name: new.name,
            address_1: new.address_1,
            address_2: new.address_2,
            city: new.city,
            zip_code: new.zip_code,
            date: new.date,
        };

        diesel::insert_into(fixtures::table)
            .values((
                fixtures::id.eq(&fixture.id),
                fixtures::name.eq(&fixture.name),
                fixtures::address_1.eq(&fixture.address_1),
                fixtures::address_2.eq(&fixture.address_2),
                fixtures::city.eq(&fixture.city),
                fixtures::zip_code.eq(&fixture.zip_code),
                fixtures::date.eq(fixture.date),
            ))
            .execute(conn)?;

        for team_id in team_ids {
            fixture.add_team(team_id, conn)?;
        }

        Ok(fixture)
    }

    /// Associates a team with this fixture. Adding a team which is already
    /// associated does nothing.
    pub fn add_team(
        &self,
        team_id: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> QueryResult<()> {
        let exists = diesel::dsl::select(diesel::dsl::exists(
            fixture_teams::table.filter(
                fixture_teams::fixture_id
                    .eq(&self.id)
                    .and(fixture_teams::team_id.eq(team_id)),
            ),
        ))
        .get_result::<bool>(conn)?;

        if !exists {
            diesel::insert_into(fixture_teams::table)
                .values((
                    fixture_teams::id.eq(Uuid::now_v7().to_string()),
                    fixture_teams::fixture_id.eq(&self.id),
                    fixture_teams::team_id.eq(team_id),
                ))
                .execute(conn)?;
        }

        Ok(())
    }

    /// All fixtures the team takes part in, earliest first. Fixtures without
    /// a date come before any with one.
    pub fn for_team(
        team_id: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> QueryResult<Vec<Fixture>> {
        fixtures::table
            .inner_join(fixture_teams::table)
            .filter(fixture_teams::team_id.eq(team_id))
            .select(fixtures::all_columns)
            .order_by((fixtures::date.asc(), fixtures::id.asc()))
            .load::<Fixture>(conn)
    }

    pub fn teams(
        &self,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> QueryResult<Vec<Team>> {
        teams::table
            .inner_join(fixture_teams::table)
            .filter(fixture_teams::fixture_id.eq(&self.id))
            .select(teams::all_columns)
            .order_by(teams::name.asc())
            .load::<Team>(conn)
    }

    /// One line summary of where the fixture is played.
    pub fn location(&self) -> String {
        [&self.address_1, &self.address_2, &self.city, &self.zip_code]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::test::test_conn;

    fn at(day: u32) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(2025, 10, day)
            .and_then(|d| d.and_hms_opt(18, 30, 0))
    }

    #[test]
    fn listed_by_ascending_date() {
        let mut conn = test_conn();
        let team = Team::create("Hawks", None, &mut conn).unwrap();

        for (name, day) in [("Third", 20), ("First", 2), ("Second", 9)] {
            Fixture::create(
                NewFixture {
                    name: name.to_string(),
                    date: at(day),
                    ..Default::default()
                },
                &[team.id.as_str()],
                &mut conn,
            )
            .unwrap();
        }

        let names: Vec<String> = Fixture::for_team(&team.id, &mut conn)
            .unwrap()
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, ["First", "Second", "Third"]);
    }

    #[test]
    fn team_deletion_only_drops_association() {
        let mut conn = test_conn();
        let hawks = Team::create("Hawks", None, &mut conn).unwrap();
        let eagles = Team::create("Eagles", None, &mut conn).unwrap();

        let fixture = Fixture::create(
            NewFixture {
                name: "Derby".to_string(),
                city: Some("Leeds".to_string()),
                date: at(4),
                ..Default::default()
            },
            &[hawks.id.as_str(), eagles.id.as_str()],
            &mut conn,
        )
        .unwrap();
        assert_eq!(fixture.teams(&mut conn).unwrap().len(), 2);

        hawks.delete(&mut conn).unwrap();

        let remaining = fixture.teams(&mut conn).unwrap();
        assert_eq!(remaining, vec![eagles.clone()]);
        assert_eq!(Fixture::for_team(&eagles.id, &mut conn).unwrap().len(), 1);
    }

    #[test]
    fn adding_team_twice_is_harmless() {
        let mut conn = test_conn();
        let hawks = Team::create("Hawks", None, &mut conn).unwrap();
        let fixture =
            Fixture::create(NewFixture::default(), &[hawks.id.as_str()], &mut conn)
                .unwrap();
        fixture.add_team(&hawks.id, &mut conn).unwrap();
        assert_eq!(fixture.teams(&mut conn).unwrap().len(), 1);
    }

    #[test]
    fn location_skips_blank_parts() {
        let fixture = Fixture {
            id: "f".to_string(),
            name: String::new(),
            address_1: Some("1 High Street".to_string()),
            address_2: Some(String::new()),
            city: Some("Leeds".to_string()),
            zip_code: None,
            date: None,
        };
        assert_eq!(fixture.location(), "1 High Street, Leeds");
    }
}
