use axum::{
    extract::Form,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;
use hypertext::prelude::*;
use serde::Deserialize;

use crate::{
    auth::{
        User, authenticate,
        manager::{CreateUserError, NewUserConfig, create_user, normalize_email},
        set_login_cookie,
    },
    permission::UserType,
    state::Conn,
    teams::Team,
    template::{
        Page,
        form::{FieldErrors, FormField},
    },
    util_resp::{FailureResponse, StandardResponse, see_other_ok, success},
    validation::*,
};

/// Where a newly registered user is sent.
pub const REGISTERED_REDIRECT: &str = "/user";

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct RegisterForm {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub user_type: String,
    pub team_code: String,
    pub password1: String,
    pub password2: String,
}

pub struct RegisterFormView<'r> {
    pub form: &'r RegisterForm,
    pub errors: &'r FieldErrors,
}

impl Renderable for RegisterFormView<'_> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        let selected = if self.form.user_type.is_empty() {
            UserType::Coach.code()
        } else {
            self.form.user_type.as_str()
        };
        let user_type_class = if self.errors.has("user_type") {
            "form-select is-invalid"
        } else {
            "form-select"
        };

        maud! {
            h1 {"Register"}
            form method="post" class="mt-4" {
                FormField label="Email" name="email" kind="email"
                    value=(self.form.email.as_str()) error=(self.errors.get("email"));
                FormField label="First name" name="first_name" kind="text"
                    value=(self.form.first_name.as_str())
                    error=(self.errors.get("first_name"));
                FormField label="Last name" name="last_name" kind="text"
                    value=(self.form.last_name.as_str())
                    error=(self.errors.get("last_name"));
                div class="mb-3" {
                    label for="user_type" class="form-label" { "I am a" }
                    select class=(user_type_class) id="user_type" name="user_type" {
                        @for user_type in UserType::ALL {
                            @if user_type.code() == selected {
                                option value=(user_type.code()) selected {
                                    (user_type.to_string())
                                }
                            } @else {
                                option value=(user_type.code()) {
                                    (user_type.to_string())
                                }
                            }
                        }
                    }
                    @if let Some(error) = self.errors.get("user_type") {
                        div class="invalid-feedback" { (error) }
                    }
                }
                FormField label="Team code (optional)" name="team_code"
                    kind="text" value=(self.form.team_code.as_str())
                    error=(self.errors.get("team_code"));
                FormField label="Password" name="password1" kind="password"
                    value="" error=(self.errors.get("password1"));
                FormField label="Confirm password" name="password2"
                    kind="password" value=""
                    error=(self.errors.get("password2"));
                button type="submit" class="btn btn-primary" { "Register" }
            }
        }
        .render_to(buffer);
    }
}

pub async fn register_page(user: Option<User>) -> StandardResponse {
    if user.is_some() {
        return see_other_ok(Redirect::to("/"));
    }

    let form = RegisterForm::default();
    let errors = FieldErrors::default();

    success(
        Page::new()
            .body(maud! {
                RegisterFormView form=(&form) errors=(&errors);
            })
            .render(),
    )
}

/// Checks a submission, returning the team named by the code (if one was
/// given) when everything is in order.
fn validate(
    form: &RegisterForm,
    conn: &mut Conn,
) -> Result<(Option<Team>, FieldErrors), FailureResponse> {
    let mut errors = FieldErrors::default();

    let email = form.email.trim();
    if email.is_empty() {
        errors.add("email", "This field is required.");
    } else {
        errors.check("email", is_within(email, 60, "Email"));
        errors.check("email", is_valid_email(email));
        if !errors.has("email")
            && User::fetch_by_email(email, &mut **conn)?.is_some()
        {
            errors.add("email", "User with this email already exists.");
        }
    }

    errors.check(
        "first_name",
        is_present_within(&form.first_name, 50, "First name"),
    );
    errors.check(
        "last_name",
        is_present_within(&form.last_name, 50, "Last name"),
    );

    if !form.user_type.is_empty()
        && UserType::from_code(&form.user_type).is_none()
    {
        errors.add("user_type", "Select a valid choice.");
    }

    let team = match form.team_code.trim() {
        "" => None,
        code => {
            let team = Team::fetch_by_code(code, &mut **conn)?;
            if team.is_none() {
                errors.add("team_code", "No team has that code.");
            }
            team
        }
    };

    if form.password1.is_empty() {
        errors.add("password1", "This field is required.");
    } else {
        errors.check("password1", is_acceptable_password(&form.password1));
    }
    if form.password2.is_empty() {
        errors.add("password2", "This field is required.");
    } else if form.password1 != form.password2 {
        errors.add("password2", "The two password fields didn't match.");
    }

    Ok((team, errors))
}

/// The form again, with the submitted values and the errors found in them.
fn try_again(form: &RegisterForm, errors: &FieldErrors) -> Response {
    Html(
        Page::new()
            .body(maud! {
                RegisterFormView form=(form) errors=(errors);
            })
            .render()
            .into_inner(),
    )
    .into_response()
}

#[tracing::instrument(skip_all)]
pub async fn do_register(
    user: Option<User>,
    jar: PrivateCookieJar,
    mut conn: Conn,
    Form(form): Form<RegisterForm>,
) -> Result<Response, FailureResponse> {
    if user.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let (team, mut errors) = validate(&form, &mut conn)?;
    if !errors.is_empty() {
        tracing::debug!(?errors, "registration rejected");
        return Ok(try_again(&form, &errors));
    }

    let user_type =
        UserType::from_code(&form.user_type).unwrap_or(UserType::Coach);

    let created = create_user(
        &mut *conn,
        &form.email,
        &form.first_name,
        &form.last_name,
        Some(&form.password1),
        NewUserConfig {
            user_type,
            is_coach: user_type == UserType::Coach,
            team_id: team.map(|team| team.id),
            ..NewUserConfig::standard()
        },
    );

    match created {
        Ok(_) => (),
        Err(e @ CreateUserError::MissingEmail) => {
            errors.add("email", e.to_string());
            return Ok(try_again(&form, &errors));
        }
        Err(e @ CreateUserError::MissingFirstName) => {
            errors.add("first_name", e.to_string());
            return Ok(try_again(&form, &errors));
        }
        Err(e @ CreateUserError::MissingLastName) => {
            errors.add("last_name", e.to_string());
            return Ok(try_again(&form, &errors));
        }
        Err(e) => {
            tracing::error!("failed to create user: {e}");
            return Err(FailureResponse::ServerError(()));
        }
    }

    let email = normalize_email(&form.email);
    let mut account = match authenticate(&email, &form.password1, &mut *conn)? {
        Some(account) => account,
        None => {
            tracing::error!("newly registered account failed to authenticate");
            return Err(FailureResponse::ServerError(()));
        }
    };
    account.record_login(&mut *conn)?;

    let jar = set_login_cookie(account.id, jar)?;

    Ok((jar, Redirect::to(REGISTERED_REDIRECT)).into_response())
}
