use axum::{extract::Form, response::Redirect};
use hypertext::prelude::*;
use serde::Deserialize;

use crate::{
    auth::User,
    state::Conn,
    teams::Team,
    template::Page,
    util_resp::{StandardResponse, bad_request, see_other_ok, success},
    widgets::alert::{ErrorAlert, InfoAlert},
};

pub async fn join_team_page(user: User) -> StandardResponse {
    let already_member = user.team_id.is_some();

    success(
        Page::new()
            .user(user)
            .body(maud! {
                h1 { "Join a team" }
                @if already_member {
                    InfoAlert msg="Joining another team will take you off your current one.";
                }
                form method="post" {
                    div class="mb-3" {
                        label for="code" class="form-label" { "Team code" }
                        input type="text"
                              class="form-control"
                              id="code"
                              name="code"
                              maxlength="6"
                              required;
                    }
                    button type="submit" class="btn btn-primary" { "Join" }
                }
            })
            .render(),
    )
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct JoinTeamForm {
    code: String,
}

#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn do_join_team(
    mut user: User,
    mut conn: Conn,
    Form(form): Form<JoinTeamForm>,
) -> StandardResponse {
    let team = match Team::fetch_by_code(&form.code, &mut *conn)? {
        Some(team) => team,
        None => {
            return bad_request(
                Page::new()
                    .user(user)
                    .body(maud! {
                        ErrorAlert msg="No team has that code. Please check it
                                        with your coach and try again.";
                    })
                    .render(),
            );
        }
    };

    user.set_team(Some(&team.id), &mut *conn)?;
    tracing::info!(team_id = %team.id, "joined team");

    see_other_ok(Redirect::to(&format!("/teams/{}", team.id)))
}
