use axum::{
    extract::{Form, Path},
    response::Redirect,
};
use chrono::NaiveDateTime;
use hypertext::prelude::*;
use serde::Deserialize;

use crate::{
    auth::User,
    permission::Permission,
    state::Conn,
    teams::{
        Team,
        fixtures::{Fixture, NewFixture},
    },
    template::Page,
    util_resp::{StandardResponse, bad_request, see_other_ok, success},
    validation::is_within,
    widgets::{actions::Actions, alert::ErrorAlert},
};

pub async fn team_fixtures_page(
    Path(team_id): Path<String>,
    user: User,
    mut conn: Conn,
) -> StandardResponse {
    let team = Team::fetch(&team_id, &mut *conn)?;
    team.check_permission(&user, Permission::ViewTeam)?;

    let fixtures = Fixture::for_team(&team.id, &mut *conn)?;
    let mut rows = Vec::with_capacity(fixtures.len());
    for fixture in fixtures {
        let opponents = fixture
            .teams(&mut *conn)?
            .into_iter()
            .filter(|t| t.id != team.id)
            .map(|t| t.name)
            .collect::<Vec<_>>()
            .join(", ");
        rows.push((fixture, opponents));
    }

    let can_manage = user.can(Permission::ManageFixtures, &team);
    let create = format!("/teams/{}/fixtures/create", team.id);
    let links = [(create.as_str(), "Add fixture")];
    let options: &[(&str, &str)] = if can_manage { &links } else { &[] };

    success(
        Page::new()
            .user(user)
            .team(team.clone())
            .body(maud! {
                h1 { "Fixtures" }
                Actions options=(options) posts=(&[]);
                @if rows.is_empty() {
                    p { "No fixtures scheduled." }
                } @else {
                    table class="table" {
                        thead {
                            tr {
                                th scope="col" { "Date" }
                                th scope="col" { "Fixture" }
                                th scope="col" { "Against" }
                                th scope="col" { "Where" }
                            }
                        }
                        tbody {
                            @for (fixture, opponents) in &rows {
                                tr {
                                    td {
                                        @if let Some(date) = fixture.date {
                                            (date.format("%a %-d %b %Y, %H:%M").to_string())
                                        } @else {
                                            "TBC"
                                        }
                                    }
                                    td { (fixture.name) }
                                    td { (opponents) }
                                    td { (fixture.location()) }
                                }
                            }
                        }
                    }
                }
            })
            .render(),
    )
}

pub async fn create_fixture_page(
    Path(team_id): Path<String>,
    user: User,
    mut conn: Conn,
) -> StandardResponse {
    let team = Team::fetch(&team_id, &mut *conn)?;
    team.check_permission(&user, Permission::ManageFixtures)?;

    success(
        Page::new()
            .user(user)
            .team(team.clone())
            .body(maud! {
                h1 { "New fixture for " (team.name) }
                form method="post" class="mt-4" {
                    div class="mb-3" {
                        label for="name" class="form-label" { "Name" }
                        input type="text" class="form-control" id="name" name="name" maxlength="100";
                    }
                    div class="mb-3" {
                        label for="opponent_code" class="form-label" { "Opponent team code" }
                        input type="text" class="form-control" id="opponent_code" name="opponent_code" maxlength="6";
                        div class="form-text" {
                            "Optional. If the other team uses TeamBuilder, the
                             fixture will show up for them too."
                        }
                    }
                    div class="mb-3" {
                        label for="address_1" class="form-label" { "Address line 1" }
                        input type="text" class="form-control" id="address_1" name="address_1" maxlength="100";
                    }
                    div class="mb-3" {
                        label for="address_2" class="form-label" { "Address line 2" }
                        input type="text" class="form-control" id="address_2" name="address_2" maxlength="100";
                    }
                    div class="mb-3" {
                        label for="city" class="form-label" { "City" }
                        input type="text" class="form-control" id="city" name="city" maxlength="50";
                    }
                    div class="mb-3" {
                        label for="zip_code" class="form-label" { "Postcode" }
                        input type="text" class="form-control" id="zip_code" name="zip_code" maxlength="10";
                    }
                    div class="mb-3" {
                        label for="date" class="form-label" { "Date and time" }
                        input type="datetime-local" class="form-control" id="date" name="date";
                    }
                    button type="submit" class="btn btn-primary" { "Save" }
                }
            })
            .render(),
    )
}

#[derive(Deserialize, Default, Debug)]
#[serde(default)]
pub struct CreateFixtureForm {
    pub name: String,
    pub opponent_code: String,
    pub address_1: String,
    pub address_2: String,
    pub city: String,
    pub zip_code: String,
    pub date: String,
}

fn blank_to_none(value: &str) -> Option<String> {
    match value.trim() {
        "" => None,
        value => Some(value.to_string()),
    }
}

/// Accepts the value of a `datetime-local` input, with or without seconds.
pub fn parse_fixture_date(value: &str) -> Result<Option<NaiveDateTime>, String> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .map(Some)
        .map_err(|_| "Enter a valid date and time.".to_string())
}

impl CreateFixtureForm {
    fn validate(&self) -> Result<NewFixture, String> {
        is_within(&self.name, 100, "Name")?;
        is_within(&self.address_1, 100, "Address line 1")?;
        is_within(&self.address_2, 100, "Address line 2")?;
        is_within(&self.city, 50, "City")?;
        is_within(&self.zip_code, 10, "Postcode")?;

        Ok(NewFixture {
            name: self.name.trim().to_string(),
            address_1: blank_to_none(&self.address_1),
            address_2: blank_to_none(&self.address_2),
            city: blank_to_none(&self.city),
            zip_code: blank_to_none(&self.zip_code),
            date: parse_fixture_date(&self.date)?,
        })
    }
}

#[tracing::instrument(skip(user, conn))]
pub async fn do_create_fixture(
    Path(team_id): Path<String>,
    user: User,
    mut conn: Conn,
    Form(form): Form<CreateFixtureForm>,
) -> StandardResponse {
    let team = Team::fetch(&team_id, &mut *conn)?;
    team.check_permission(&user, Permission::ManageFixtures)?;

    let opponent = match form.opponent_code.trim() {
        "" => None,
        code => match Team::fetch_by_code(code, &mut *conn)? {
            Some(opponent) => Some(opponent),
            None => {
                return bad_request(
                    Page::new()
                        .user(user)
                        .team(team)
                        .body(maud! { ErrorAlert msg="No team has that code."; })
                        .render(),
                );
            }
        },
    };

    let new = match form.validate() {
        Ok(new) => new,
        Err(e) => {
            return bad_request(
                Page::new()
                    .user(user)
                    .team(team)
                    .body(maud! { ErrorAlert msg=(&e); })
                    .render(),
            );
        }
    };

    let mut team_ids = vec![team.id.as_str()];
    if let Some(opponent) = &opponent {
        team_ids.push(opponent.id.as_str());
    }
    Fixture::create(new, &team_ids, &mut *conn)?;

    see_other_ok(Redirect::to(&format!("/teams/{}/fixtures", team.id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_from_datetime_local() {
        assert_eq!(parse_fixture_date(""), Ok(None));
        let parsed = parse_fixture_date("2025-10-04T18:30").unwrap().unwrap();
        assert_eq!(parsed.format("%Y-%m-%d %H:%M").to_string(), "2025-10-04 18:30");
        assert!(parse_fixture_date("2025-10-04T18:30:15").unwrap().is_some());
        assert!(parse_fixture_date("next tuesday").is_err());
    }

    #[test]
    fn blank_address_parts_are_absent() {
        let form = CreateFixtureForm {
            name: "Derby".to_string(),
            city: "  ".to_string(),
            zip_code: "LS1 1AA".to_string(),
            ..Default::default()
        };
        let new = form.validate().unwrap();
        assert_eq!(new.city, None);
        assert_eq!(new.zip_code.as_deref(), Some("LS1 1AA"));
        assert_eq!(new.date, None);
    }

    #[test]
    fn overlong_postcode_rejected() {
        let form = CreateFixtureForm {
            zip_code: "ABCDEFGHIJK".to_string(),
            ..Default::default()
        };
        assert!(form.validate().is_err());
    }
}
