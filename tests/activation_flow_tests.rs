use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use enroll::{
    config::RegistrationConfig,
    handlers,
    repositories::{SqliteRegistrationTokenRepository, SqliteUserRepository, UserRepository},
    services::RegistrationService,
    test_utils::test_helpers::{self, RecordingEmailService, SentMail},
    AppState,
};
use std::sync::{Arc, Mutex};
use tower::util::ServiceExt;

async fn test_app() -> (axum::Router, Arc<Mutex<Vec<SentMail>>>, sqlx::SqlitePool) {
    let pool = test_helpers::create_test_db().await.unwrap();

    let config = RegistrationConfig::new(
        "/activate".to_string(),
        60,
        "Activate your account".to_string(),
        "Please visit {activation_link} to activate your account.".to_string(),
    )
    .unwrap();

    let email = RecordingEmailService::default();
    let sent = email.sent_mails();

    let registration_service = Arc::new(RegistrationService::new(
        config,
        Arc::new(SqliteRegistrationTokenRepository::new(pool.clone())),
        Arc::new(SqliteUserRepository::new(pool.clone())),
        Box::new(email),
    ));

    let state = AppState {
        registration_service,
        pool: pool.clone(),
    };

    (handlers::router(state), sent, pool)
}

fn register_request(email: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/register")
        .header(header::HOST, "example.org")
        .header("x-forwarded-proto", "https")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(format!(r#"{{"email":"{email}"}}"#)))
        .unwrap()
}

fn token_from_body(body: &str) -> String {
    body.split("?token=")
        .nth(1)
        .expect("mail body should contain a token parameter")
        .chars()
        .take_while(|c| c.is_ascii_hexdigit())
        .collect()
}

#[tokio::test]
async fn register_then_activate_end_to_end() {
    let (app, sent, pool) = test_app().await;

    let response = app
        .clone()
        .oneshot(register_request("new@example.com"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let token = {
        let mails = sent.lock().unwrap();
        assert_eq!(mails.len(), 1);
        assert_eq!(mails[0].to, "new@example.com");
        assert!(mails[0].body.contains("https://example.org/activate?token="));
        token_from_body(&mails[0].body)
    };

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/activate?token={token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let users = SqliteUserRepository::new(pool);
    let user = users
        .find_by_email("new@example.com")
        .await
        .unwrap()
        .unwrap();
    assert!(user.email_verified);

    // The token was deleted on activation; replaying the link fails
    let replay = app
        .oneshot(
            Request::builder()
                .uri(format!("/activate?token={token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(replay.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn registering_a_verified_address_sends_nothing_but_looks_identical() {
    let (app, sent, pool) = test_app().await;

    test_helpers::insert_test_user(&pool, "done@example.com", true)
        .await
        .unwrap();

    let response = app
        .oneshot(register_request("done@example.com"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn invalid_email_is_rejected() {
    let (app, sent, _pool) = test_app().await;

    let response = app.oneshot(register_request("not-an-email")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn missing_host_header_sends_no_mail() {
    let (app, sent, _pool) = test_app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"email":"new@example.com"}"#))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_token_is_not_found() {
    let (app, _sent, _pool) = test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/activate?token=deadbeef")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
