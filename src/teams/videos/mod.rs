use chrono::{NaiveDateTime, Utc};
use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::videos;

pub mod manage;

/// Directory (relative to media storage) which video references live under.
pub const VIDEO_DIR: &str = "videos/";

#[derive(Serialize, Deserialize, Queryable, Clone, Debug, PartialEq, Eq)]
pub struct Video {
    pub id: String,
    pub name: String,
    pub file: String,
    pub team_id: String,
    pub created_at: NaiveDateTime,
}

/// Turns a submitted file name into a reference under [`VIDEO_DIR`].
/// Anything which could escape the directory is rejected.
pub fn file_reference(file: &str) -> Option<String> {
    let file = file.trim();
    let name = file.strip_prefix(VIDEO_DIR).unwrap_or(file);
    if name.is_empty()
        || name.contains("..")
        || name.starts_with('/')
        || name.contains('\\')
    {
        return None;
    }
    Some(format!("{VIDEO_DIR}{name}"))
}

impl Video {
    #[tracing::instrument(skip(conn))]
    pub fn create(
        team_id: &str,
        name: &str,
        file: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> QueryResult<Video> {
        let video = Video {
            id: Uuid::now_v7().to_string(),
            name: name.to_string(),
            file: file.to_string(),
            team_id: team_id.to_string(),
            created_at: Utc::now().naive_utc(),
        };

        diesel::insert_into(videos::table)
            .values((
                videos::id.eq(&video.id),
                videos::name.eq(&video.name),
                videos::file.eq(&video.file),
                videos::team_id.eq(&video.team_id),
                videos::created_at.eq(video.created_at),
            ))
            .execute(conn)?;

        Ok(video)
    }

    /// Newest first.
    pub fn for_team(
        team_id: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> QueryResult<Vec<Video>> {
        videos::table
            .filter(videos::team_id.eq(team_id))
            .order_by(videos::created_at.desc())
            .load::<Video>(conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{teams::Team, test::test_conn};

    #[test]
    fn references_stay_in_video_dir() {
        assert_eq!(
            file_reference("game1.mp4").as_deref(),
            Some("videos/game1.mp4")
        );
        assert_eq!(
            file_reference("videos/game1.mp4").as_deref(),
            Some("videos/game1.mp4")
        );
        assert_eq!(file_reference(""), None);
        assert_eq!(file_reference("../secrets"), None);
        assert_eq!(file_reference("/etc/passwd"), None);
    }

    #[test]
    fn deleted_with_team() {
        let mut conn = test_conn();
        let team = Team::create("Hawks", None, &mut conn).unwrap();
        let other = Team::create("Eagles", None, &mut conn).unwrap();
        Video::create(&team.id, "Game 1", "videos/g1.mp4", &mut conn).unwrap();
        Video::create(&other.id, "Game 1", "videos/e1.mp4", &mut conn)
            .unwrap();

        team.delete(&mut conn).unwrap();

        let remaining: i64 =
            videos::table.count().get_result(&mut conn).unwrap();
        assert_eq!(remaining, 1);
        assert_eq!(Video::for_team(&other.id, &mut conn).unwrap().len(), 1);
    }
}
