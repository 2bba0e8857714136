use axum::http::StatusCode;
use diesel::{connection::SimpleConnection, prelude::*};

use crate::{
    auth::manager::{NewUserConfig, create_user},
    schema::users,
    test::{TestApp, register},
};

fn user_count(app: &TestApp) -> i64 {
    let mut conn = app.pool.get().unwrap();
    users::table.count().get_result(&mut conn).unwrap()
}

#[tokio::test]
async fn registering_logs_in_and_redirects() {
    let app = TestApp::new();
    let client = app.client();

    let res = register(&client, "jane@Example.COM", "CO", "").await;
    assert_eq!(res.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(res.header("location"), "/user");

    let profile = client.get("/user").await;
    assert_eq!(profile.status_code(), StatusCode::OK);
    let body = profile.text();
    assert!(body.contains("jane@example.com"), "{body}");
    assert!(body.contains("Coach"), "{body}");

    let mut conn = app.pool.get().unwrap();
    let last_login: Option<chrono::NaiveDateTime> = users::table
        .select(users::last_login)
        .first(&mut conn)
        .unwrap();
    assert!(last_login.is_some());
}

#[tokio::test]
async fn empty_email_rerenders_form() {
    let app = TestApp::new();
    let client = app.client();

    let res = register(&client, "", "CO", "").await;
    assert_eq!(res.status_code(), StatusCode::OK);
    let body = res.text();
    assert!(body.contains("This field is required."), "{body}");
    // submitted values are kept, passwords are not
    assert!(body.contains("Jane"), "{body}");
    assert!(!body.contains("secret123"), "{body}");

    assert_eq!(user_count(&app), 0);
    assert_eq!(client.get("/user").await.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn mismatched_passwords_rejected() {
    let app = TestApp::new();
    let client = app.client();

    let res = client
        .post("/register")
        .form(&[
            ("email", "jane@example.com"),
            ("first_name", "Jane"),
            ("last_name", "Doe"),
            ("user_type", "PA"),
            ("password1", "secret123"),
            ("password2", "secret124"),
        ])
        .await;
    assert_eq!(res.status_code(), StatusCode::OK);
    assert!(res.text().contains("The two password fields"));
    assert_eq!(user_count(&app), 0);
}

#[tokio::test]
async fn duplicate_email_rejected() {
    let app = TestApp::new();

    let first = register(&app.client(), "jane@example.com", "CO", "").await;
    assert_eq!(first.status_code(), StatusCode::SEE_OTHER);

    let second = register(&app.client(), "jane@EXAMPLE.com", "PA", "").await;
    assert_eq!(second.status_code(), StatusCode::OK);
    assert!(second.text().contains("User with this email already exists."));

    assert_eq!(user_count(&app), 1);
}

/// The address is taken after the form has been checked but before the
/// account is written.
#[tokio::test]
async fn email_taken_at_insert_is_a_server_error() {
    let app = TestApp::new();
    {
        let mut conn = app.pool.get().unwrap();
        conn.batch_execute(
            "CREATE TRIGGER claim_email BEFORE INSERT ON users
             WHEN NEW.id <> 'claimed'
             BEGIN
                 INSERT INTO users (id, email, password_hash, first_name,
                                    last_name, date_joined)
                 VALUES ('claimed', NEW.email, '!', 'Other', 'Person',
                         CURRENT_TIMESTAMP);
             END;",
        )
        .unwrap();
    }

    let client = app.client();
    let res = register(&client, "jane@example.com", "CO", "").await;
    assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

    // the whole request is rolled back, including the competing row
    assert_eq!(user_count(&app), 0);
    assert_eq!(client.get("/user").await.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_team_code_rejected() {
    let app = TestApp::new();
    let res = register(&app.client(), "jane@example.com", "PL", "nope00").await;
    assert_eq!(res.status_code(), StatusCode::OK);
    assert!(res.text().contains("No team has that code."));
    assert_eq!(user_count(&app), 0);
}

#[tokio::test]
async fn login_and_logout() {
    let app = TestApp::new();
    register(&app.client(), "jane@example.com", "CO", "").await;

    let client = app.client();
    let wrong = client
        .post("/login")
        .form(&[("email", "jane@example.com"), ("password", "secret124")])
        .await;
    assert_eq!(wrong.status_code(), StatusCode::BAD_REQUEST);

    let right = client
        .post("/login?next=/teams/join")
        .form(&[("email", "jane@example.com"), ("password", "secret123")])
        .await;
    assert_eq!(right.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(right.header("location"), "/teams/join");
    assert_eq!(client.get("/user").await.status_code(), StatusCode::OK);

    let out = client.post("/logout").await;
    assert_eq!(out.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(client.get("/user").await.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn account_without_password_cannot_log_in() {
    let app = TestApp::new();
    {
        let mut conn = app.pool.get().unwrap();
        create_user(
            &mut conn,
            "jane@example.com",
            "Jane",
            "Doe",
            None,
            NewUserConfig::standard(),
        )
        .unwrap();
    }

    let res = app
        .client()
        .post("/login")
        .form(&[("email", "jane@example.com"), ("password", "")])
        .await;
    assert_eq!(res.status_code(), StatusCode::BAD_REQUEST);
}
