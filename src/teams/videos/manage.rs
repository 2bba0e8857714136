use axum::{
    extract::{Form, Path},
    response::Redirect,
};
use hypertext::prelude::*;
use serde::Deserialize;

use crate::{
    auth::User,
    permission::Permission,
    state::Conn,
    teams::{
        Team,
        videos::{Video, file_reference},
    },
    template::Page,
    util_resp::{StandardResponse, bad_request, see_other_ok, success},
    validation::is_present_within,
    widgets::{actions::Actions, alert::ErrorAlert},
};

pub async fn team_videos_page(
    Path(team_id): Path<String>,
    user: User,
    mut conn: Conn,
) -> StandardResponse {
    let team = Team::fetch(&team_id, &mut *conn)?;
    team.check_permission(&user, Permission::ViewTeam)?;

    let videos = Video::for_team(&team.id, &mut *conn)?;
    let can_upload = user.can(Permission::UploadVideo, &team);
    let create = format!("/teams/{}/videos/create", team.id);
    let links = [(create.as_str(), "Add video")];
    let options: &[(&str, &str)] = if can_upload { &links } else { &[] };

    success(
        Page::new()
            .user(user)
            .team(team.clone())
            .body(maud! {
                h1 { "Videos" }
                Actions options=(options) posts=(&[]);
                @if videos.is_empty() {
                    p { "No videos yet." }
                } @else {
                    table class="table" {
                        thead {
                            tr {
                                th scope="col" { "Name" }
                                th scope="col" { "File" }
                                th scope="col" { "Added" }
                            }
                        }
                        tbody {
                            @for video in &videos {
                                tr {
                                    td { (video.name) }
                                    td { code { (video.file) } }
                                    td { (video.created_at.format("%Y-%m-%d %H:%M").to_string()) }
                                }
                            }
                        }
                    }
                }
            })
            .render(),
    )
}

pub async fn create_video_page(
    Path(team_id): Path<String>,
    user: User,
    mut conn: Conn,
) -> StandardResponse {
    let team = Team::fetch(&team_id, &mut *conn)?;
    team.check_permission(&user, Permission::UploadVideo)?;

    success(
        Page::new()
            .user(user)
            .team(team.clone())
            .body(maud! {
                h1 { "Add a video to " (team.name) }
                form method="post" class="mt-4" {
                    div class="mb-3" {
                        label for="name" class="form-label" { "Name" }
                        input type="text" class="form-control" id="name" name="name" maxlength="60" required;
                    }
                    div class="mb-3" {
                        label for="file" class="form-label" { "File" }
                        input type="text" class="form-control" id="file" name="file" required;
                        div class="form-text" {
                            "The name of the uploaded file, e.g. game1.mp4."
                        }
                    }
                    button type="submit" class="btn btn-primary" { "Add" }
                }
            })
            .render(),
    )
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct CreateVideoForm {
    pub name: String,
    pub file: String,
}

#[tracing::instrument(skip(user, conn, form))]
pub async fn do_create_video(
    Path(team_id): Path<String>,
    user: User,
    mut conn: Conn,
    Form(form): Form<CreateVideoForm>,
) -> StandardResponse {
    let team = Team::fetch(&team_id, &mut *conn)?;
    team.check_permission(&user, Permission::UploadVideo)?;

    let file = match (is_present_within(&form.name, 60, "Name"), file_reference(&form.file)) {
        (Ok(()), Some(file)) => file,
        (Err(e), _) => {
            return bad_request(
                Page::new()
                    .user(user)
                    .team(team)
                    .body(maud! { ErrorAlert msg=(&e); })
                    .render(),
            );
        }
        (_, None) => {
            return bad_request(
                Page::new()
                    .user(user)
                    .team(team)
                    .body(maud! { ErrorAlert msg="Invalid file name."; })
                    .render(),
            );
        }
    };

    Video::create(&team.id, form.name.trim(), &file, &mut *conn)?;

    see_other_ok(Redirect::to(&format!("/teams/{}/videos", team.id)))
}
