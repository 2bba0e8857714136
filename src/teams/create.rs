use axum::{extract::Form, response::Redirect};
use hypertext::prelude::*;
use serde::Deserialize;

use crate::{
    auth::User,
    permission::Permission,
    state::Conn,
    teams::Team,
    template::Page,
    util_resp::{
        StandardResponse, bad_request, see_other_ok, success, unauthorized,
    },
    validation::is_present_within,
    widgets::alert::ErrorAlert,
};

pub async fn create_team_page(user: User) -> StandardResponse {
    if !user.role_grants(Permission::ManageTeam) {
        return unauthorized();
    }

    success(
        Page::new()
            .user(user)
            .body(maud! {
                h1 { "Create a team" }
                form method="post" {
                    div class="mb-3" {
                        label for="teamName" class="form-label" {
                            "Team name"
                        }
                        input type="text"
                              class="form-control"
                              id="teamName"
                              aria-describedby="teamNameHelp"
                              maxlength="60"
                              required
                              name="name";
                        div id="teamNameHelp" class="form-text" {
                            "Once created, the team gets a join code which
                             you can share with parents and players."
                        }
                    }
                    button type="submit" class="btn btn-primary" {
                        "Submit"
                    }
                }
            })
            .render(),
    )
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct CreateTeamForm {
    name: String,
}

/// Creates a team, which the user creating it then joins.
#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn do_create_team(
    mut user: User,
    mut conn: Conn,
    Form(form): Form<CreateTeamForm>,
) -> StandardResponse {
    if !user.role_grants(Permission::ManageTeam) {
        return unauthorized();
    }

    if let Err(e) = is_present_within(&form.name, 60, "Team name") {
        return bad_request(
            Page::new()
                .user(user)
                .body(maud! {
                    ErrorAlert msg=(&e);
                })
                .render(),
        );
    }

    let team =
        Team::create(form.name.trim(), Some(user.id.as_str()), &mut *conn)?;
    user.set_team(Some(&team.id), &mut *conn)?;

    see_other_ok(Redirect::to(&format!("/teams/{}", team.id)))
}
