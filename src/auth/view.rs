use hypertext::prelude::*;

use crate::{
    auth::User,
    state::Conn,
    teams::Team,
    template::Page,
    util_resp::{StandardResponse, success},
};

pub async fn profile_page(user: User, mut conn: Conn) -> StandardResponse {
    let team = match &user.team_id {
        Some(team_id) => Some(Team::fetch(team_id, &mut *conn)?),
        None => None,
    };

    let joined = user.date_joined.format("%-d %B %Y").to_string();
    let last_login = user
        .last_login
        .map(|t| t.format("%-d %B %Y %H:%M").to_string())
        .unwrap_or_else(|| "never".to_string());

    success(
        Page::new()
            .user(user.clone())
            .body(maud! {
                h1 { (user.full_name()) }
                dl class="row" {
                    dt class="col-sm-3" { "Email" }
                    dd class="col-sm-9" { (user.email) }
                    dt class="col-sm-3" { "Role" }
                    dd class="col-sm-9" { (user.role().to_string()) }
                    dt class="col-sm-3" { "Joined" }
                    dd class="col-sm-9" { (joined) }
                    dt class="col-sm-3" { "Last login" }
                    dd class="col-sm-9" { (last_login) }
                    dt class="col-sm-3" { "Team" }
                    dd class="col-sm-9" {
                        @if let Some(team) = &team {
                            a href=(format!("/teams/{}", team.id)) { (team.name) }
                        } @else {
                            a href="/teams/join" { "Join a team" }
                        }
                    }
                }
            })
            .render(),
    )
}
