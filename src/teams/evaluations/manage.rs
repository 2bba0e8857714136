use axum::{
    extract::{Form, Path},
    response::Redirect,
};
use chrono::NaiveDate;
use hypertext::prelude::*;
use serde::Deserialize;

use crate::{
    auth::User,
    permission::Permission,
    state::Conn,
    teams::{
        Team,
        evaluations::{Evaluation, NewEvaluation, STAT_FIELDS, Stats},
    },
    template::Page,
    util_resp::{StandardResponse, bad_request, see_other_ok, success},
    validation::{is_present_within, is_stat_value},
    widgets::{actions::Actions, alert::ErrorAlert},
};

pub async fn team_evaluations_page(
    Path(team_id): Path<String>,
    user: User,
    mut conn: Conn,
) -> StandardResponse {
    let team = Team::fetch(&team_id, &mut *conn)?;
    team.check_permission(&user, Permission::ViewTeam)?;

    let rows: Vec<(Evaluation, Stats)> =
        Evaluation::for_team(&team.id, &mut *conn)?
            .into_iter()
            .map(|evaluation| {
                let stats = evaluation.stats();
                (evaluation, stats)
            })
            .collect();
    let can_record = user.can(Permission::RecordEvaluations, &team);
    let create = format!("/teams/{}/evaluations/create", team.id);
    let links = [(create.as_str(), "Record evaluation")];
    let options: &[(&str, &str)] = if can_record { &links } else { &[] };

    success(
        Page::new()
            .user(user)
            .team(team.clone())
            .body(maud! {
                h1 { "Evaluations" }
                Actions options=(options) posts=(&[]);
                @if rows.is_empty() {
                    p { "No evaluations recorded." }
                } @else {
                    table class="table table-sm" {
                        thead {
                            tr {
                                th scope="col" { "Date" }
                                th scope="col" { "Name" }
                                @for (_, label) in STAT_FIELDS {
                                    th scope="col" { (label) }
                                }
                            }
                        }
                        tbody {
                            @for (evaluation, stats) in &rows {
                                tr {
                                    td { (evaluation.date.format("%Y-%m-%d").to_string()) }
                                    td { (evaluation.name) }
                                    @for value in stats.values() {
                                        td { (value) }
                                    }
                                }
                            }
                        }
                    }
                }
            })
            .render(),
    )
}

pub async fn create_evaluation_page(
    Path(team_id): Path<String>,
    user: User,
    mut conn: Conn,
) -> StandardResponse {
    let team = Team::fetch(&team_id, &mut *conn)?;
    team.check_permission(&user, Permission::RecordEvaluations)?;

    success(
        Page::new()
            .user(user)
            .team(team.clone())
            .body(maud! {
                h1 { "Record an evaluation for " (team.name) }
                form method="post" class="mt-4" {
                    div class="mb-3" {
                        label for="name" class="form-label" { "Name" }
                        input type="text" class="form-control" id="name" name="name" maxlength="100" required;
                    }
                    div class="mb-3" {
                        label for="date" class="form-label" { "Date" }
                        input type="date" class="form-control" id="date" name="date" required;
                    }
                    div class="row" {
                        @for (name, label) in STAT_FIELDS {
                            div class="col-md-3 mb-3" {
                                label for=(name) class="form-label" { (label) }
                                input type="number" class="form-control" id=(name) name=(name) min="0" max="99" value="0" required;
                            }
                        }
                    }
                    button type="submit" class="btn btn-primary" { "Save" }
                }
            })
            .render(),
    )
}

#[derive(Deserialize, Default, Debug)]
#[serde(default)]
pub struct CreateEvaluationForm {
    pub name: String,
    pub date: String,
    pub points: String,
    pub assists: String,
    pub rebounds: String,
    pub blocks: String,
    pub steals: String,
    pub turnovers: String,
    pub three_pointers: String,
}

impl CreateEvaluationForm {
    fn validate(self) -> Result<NewEvaluation, String> {
        is_present_within(&self.name, 100, "Name")?;
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .map_err(|_| "Enter a valid date.".to_string())?;

        let stats = Stats {
            points: self.points.trim().to_string(),
            assists: self.assists.trim().to_string(),
            rebounds: self.rebounds.trim().to_string(),
            blocks: self.blocks.trim().to_string(),
            steals: self.steals.trim().to_string(),
            turnovers: self.turnovers.trim().to_string(),
            three_pointers: self.three_pointers.trim().to_string(),
        };
        for (label, value) in stats.labelled() {
            is_stat_value(value).map_err(|e| format!("{label} {e}."))?;
        }

        Ok(NewEvaluation {
            name: self.name.trim().to_string(),
            date,
            stats,
        })
    }
}

#[tracing::instrument(skip(user, conn))]
pub async fn do_create_evaluation(
    Path(team_id): Path<String>,
    user: User,
    mut conn: Conn,
    Form(form): Form<CreateEvaluationForm>,
) -> StandardResponse {
    let team = Team::fetch(&team_id, &mut *conn)?;
    team.check_permission(&user, Permission::RecordEvaluations)?;

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

    Evaluation::create(&team.id, new, &mut *conn)?;

    see_other_ok(Redirect::to(&format!("/teams/{}/evaluations", team.id)))
}
