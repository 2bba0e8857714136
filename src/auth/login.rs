use axum::{
    extract::{Form, Query},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;
use hypertext::prelude::*;
use serde::Deserialize;
use url::Url;

use crate::{
    auth::{User, authenticate, clear_login_cookie, set_login_cookie},
    state::Conn,
    template::Page,
    util_resp::{FailureResponse, StandardResponse, bad_request, success},
    widgets::alert::ErrorAlert,
};

#[derive(Deserialize)]
pub struct NextQuery {
    next: Option<String>,
}

pub async fn login_page(user: Option<User>) -> StandardResponse {
    if user.is_some() {
        return bad_request(
            Page::new()
                .user_opt(user)
                .body(maud! {
                    ErrorAlert
                        msg = "You are already logged in, so cannot log in!";
                })
                .render(),
        );
    }

    success(Page::new().body(maud! {
        h1 { "Log in" }
        form method="post" class="mt-4" {
            div class="mb-3" {
                label for="email" class="form-label" { "Email address" }
                input type="email" class="form-control" id="email" name="email" placeholder="Enter email";
            }
            div class="mb-3" {
                label for="password" class="form-label" { "Password" }
                input type="password" class="form-control" id="password" name="password" placeholder="Password";
            }
            button type="submit" class="btn btn-primary" { "Submit" }
        }
    }).render())
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct LoginForm {
    email: String,
    password: String,
}

/// Only the path of `next` is kept, so that logging in can never send a user
/// to another site.
fn redirect_target(next: Option<&str>) -> String {
    let base = Url::parse("http://localhost/").ok();
    match (base, next) {
        (Some(base), Some(next)) => match base.join(next) {
            Ok(url) => url.path().to_string(),
            Err(_) => "/".to_string(),
        },
        _ => "/".to_string(),
    }
}

#[tracing::instrument(skip_all)]
pub async fn do_login(
    user: Option<User>,
    jar: PrivateCookieJar,
    Query(query): Query<NextQuery>,
    mut conn: Conn,
    Form(form): Form<LoginForm>,
) -> Result<Response, FailureResponse> {
    let mut account =
        match authenticate(&form.email, &form.password, &mut *conn)? {
            Some(account) => account,
            None => {
                // todo: password rate limiting
                return Err(FailureResponse::BadRequest(
                    Page::new()
                        .user_opt(user)
                        .body(maud! {
                            ErrorAlert msg =
                                "Incorrect email or password. Please return to
                                 the previous page and try again.";
                        })
                        .render(),
                ));
            }
        };

    account.record_login(&mut *conn)?;
    tracing::info!(user_id = %account.id, "logged in");

    let jar = set_login_cookie(account.id, jar)?;

    Ok((jar, Redirect::to(&redirect_target(query.next.as_deref())))
        .into_response())
}

pub async fn do_logout(jar: PrivateCookieJar) -> Response {
    (clear_login_cookie(jar), Redirect::to("/")).into_response()
}

#[cfg(test)]
mod tests {
    use super::redirect_target;

    #[test]
    fn next_is_reduced_to_a_path() {
        assert_eq!(redirect_target(None), "/");
        assert_eq!(redirect_target(Some("/teams/abc")), "/teams/abc");
        assert_eq!(
            redirect_target(Some("https://evil.example.com/steal")),
            "/steal"
        );
    }
}
