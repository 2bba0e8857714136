use chrono::NaiveDate;
use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::evaluations;

pub mod manage;

/// Per-game statistics recorded against a team.
#[derive(Serialize, Deserialize, Queryable, Clone, Debug, PartialEq, Eq)]
pub struct Evaluation {
    pub id: String,
    pub name: String,
    pub team_id: String,
    pub date: NaiveDate,
    pub points: String,
    pub assists: String,
    pub rebounds: String,
    pub blocks: String,
    pub steals: String,
    pub turnovers: String,
    pub three_pointers: String,
}

#[derive(Debug, Clone)]
pub struct NewEvaluation {
    pub name: String,
    pub date: NaiveDate,
    pub stats: Stats,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    pub points: String,
    pub assists: String,
    pub rebounds: String,
    pub blocks: String,
    pub steals: String,
    pub turnovers: String,
    pub three_pointers: String,
}

/// Form field names and display labels of the statistics, in display order.
pub const STAT_FIELDS: [(&str, &str); 7] = [
    ("points", "Points"),
    ("assists", "Assists"),
    ("rebounds", "Rebounds"),
    ("blocks", "Blocks"),
    ("steals", "Steals"),
    ("turnovers", "Turnovers"),
    ("three_pointers", "Three pointers"),
];

impl Stats {
    /// Values in the order of [`STAT_FIELDS`].
    pub fn values(&self) -> [&str; 7] {
        [
            &self.points,
            &self.assists,
            &self.rebounds,
            &self.blocks,
            &self.steals,
            &self.turnovers,
            &self.three_pointers,
        ]
    }

    /// Display labels paired with their values.
    pub fn labelled(&self) -> [(&'static str, &str); 7] {
        let values = self.values();
        std::array::from_fn(|i| (STAT_FIELDS[i].1, values[i]))
    }
}

impl Evaluation {
    #[tracing::instrument(skip(conn))]
    pub fn create(
        team_id: &str,
        new: NewEvaluation,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> QueryResult<Evaluation> {
        let Stats {
            points,
            assists,
            rebounds,
            blocks,
            steals,
            turnovers,
            three_pointers,
        } = new.stats;

        let evaluation = Evaluation {
            id: Uuid::now_v7().to_string(),
            name: new.name,
            team_id: team_id.to_string(),
            date: new.date,
            points,
            assists,
            rebounds,
            blocks,
            steals,
            turnovers,
            three_pointers,
        };

        diesel::insert_into(evaluations::table)
            .values((
                evaluations::id.eq(&evaluation.id),
                evaluations::name.eq(&evaluation.name),
                evaluations::team_id.eq(&evaluation.team_id),
                evaluations::date.eq(evaluation.date),
                evaluations::points.eq(&evaluation.points),
                evaluations::assists.eq(&evaluation.assists),
                evaluations::rebounds.eq(&evaluation.rebounds),
                evaluations::blocks.eq(&evaluation.blocks),
                evaluations::steals.eq(&evaluation.steals),
                evaluations::turnovers.eq(&evaluation.turnovers),
                evaluations::three_pointers.eq(&evaluation.three_pointers),
            ))
            .execute(conn)?;

        Ok(evaluation)
    }

    /// Earliest first.
    pub fn for_team(
        team_id: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> QueryResult<Vec<Evaluation>> {
        evaluations::table
            .filter(evaluations::team_id.eq(team_id))
            .order_by((evaluations::date.asc(), evaluations::id.asc()))
            .load::<Evaluation>(conn)
    }

    pub fn stats(&self) -> Stats {
        Stats {
            points: self.points.clone(),
            assists: self.assists.clone(),
            rebounds: self.rebounds.clone(),
            blocks: self.blocks.clone(),
            steals: self.steals.clone(),
            turnovers: self.turnovers.clone(),
            three_pointers: self.three_pointers.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{teams::Team, test::test_conn};

    fn game(name: &str, day: u32) -> NewEvaluation {
        NewEvaluation {
            name: name.to_string(),
            date: NaiveDate::from_ymd_opt(2025, 11, day).unwrap(),
            stats: Stats {
                points: "12".to_string(),
                assists: "3".to_string(),
                rebounds: "7".to_string(),
                blocks: "0".to_string(),
                steals: "2".to_string(),
                turnovers: "1".to_string(),
                three_pointers: "2".to_string(),
            },
        }
    }

    #[test]
    fn listed_by_ascending_date() {
        let mut conn = test_conn();
        let team = Team::create("Hawks", None, &mut conn).unwrap();
        Evaluation::create(&team.id, game("Final", 29), &mut conn).unwrap();
        Evaluation::create(&team.id, game("Opener", 1), &mut conn).unwrap();

        let names: Vec<String> = Evaluation::for_team(&team.id, &mut conn)
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, ["Opener", "Final"]);
    }

    #[test]
    fn stats_survive_storage() {
        let mut conn = test_conn();
        let team = Team::create("Hawks", None, &mut conn).unwrap();
        let new = game("Opener", 1);
        let stats = new.stats.clone();
        Evaluation::create(&team.id, new, &mut conn).unwrap();

        let stored = Evaluation::for_team(&team.id, &mut conn).unwrap();
        assert_eq!(stored[0].stats(), stats);
    }

    #[test]
    fn labels_follow_field_order() {
        let stats = game("Opener", 1).stats;
        let labelled = stats.labelled();
        assert_eq!(labelled[0], ("Points", "12"));
        assert_eq!(labelled[6], ("Three pointers", "2"));
        assert_eq!(labelled.map(|(_, value)| value), stats.values());
    }

    #[test]
    fn deleted_with_team() {
        let mut conn = test_conn();
        let team = Team::create("Hawks", None, &mut conn).unwrap();
        Evaluation::create(&team.id, game("Opener", 1), &mut conn).unwrap();

        team.delete(&mut conn).unwrap();

        let remaining: i64 =
            evaluations::table.count().get_result(&mut conn).unwrap();
        assert_eq!(remaining, 0);
    }
}
