use axum::{extract::Path, response::Redirect};
use hypertext::prelude::*;

use crate::{
    auth::User,
    permission::Permission,
    state::Conn,
    teams::Team,
    template::Page,
    util_resp::{StandardResponse, see_other_ok, success},
    widgets::actions::Actions,
};

pub async fn view_team_page(
    Path(team_id): Path<String>,
    user: User,
    mut conn: Conn,
) -> StandardResponse {
    let team = Team::fetch(&team_id, &mut *conn)?;
    team.check_permission(&user, Permission::ViewTeam)?;

    let members = team.members(&mut *conn)?;
    let show_code = user.can(Permission::ManageTeam, &team);
    let can_delete = user.can(Permission::DeleteTeam, &team);

    let fixtures = format!("/teams/{}/fixtures", team.id);
    let evaluations = format!("/teams/{}/evaluations", team.id);
    let videos = format!("/teams/{}/videos", team.id);
    let delete = format!("/teams/{}/delete", team.id);
    let links = [
        (fixtures.as_str(), "Fixtures"),
        (evaluations.as_str(), "Evaluations"),
        (videos.as_str(), "Videos"),
    ];
    let delete_action = [(delete.as_str(), "Delete team")];
    let posts: &[(&str, &str)] = if can_delete { &delete_action } else { &[] };

    success(
        Page::new()
            .user(user)
            .team(team.clone())
            .body(maud! {
                h1 { (team.name) }
                @if show_code {
                    p {
                        "Join code: "
                        code { (team.code) }
                    }
                }
                Actions options=(&links) posts=(posts);
                h2 { "Members" }
                table class="table" {
                    thead {
                        tr {
                            th scope="col" { "Name" }
                            th scope="col" { "Role" }
                        }
                    }
                    tbody {
                        @for member in &members {
                            tr {
                                td { (member.full_name()) }
                                td { (member.role().to_string()) }
                            }
                        }
                    }
                }
            })
            .render(),
    )
}

#[tracing::instrument(skip(user, conn))]
pub async fn do_delete_team(
    Path(team_id): Path<String>,
    user: User,
    mut conn: Conn,
) -> StandardResponse {
    let team = Team::fetch(&team_id, &mut *conn)?;
    team.check_permission(&user, Permission::DeleteTeam)?;

    team.delete(&mut *conn)?;
    tracing::info!(user_id = %user.id, "deleted team");

    see_other_ok(Redirect::to("/"))
}
