use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::{DateTime, Duration, TimeZone, Utc};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use pollbox_api::{AppState, AppStateInner};
use pollbox_db::Database;
use pollbox_types::FixedClock;

fn reference_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap()
}

fn test_app() -> (Router, AppState) {
    let state: AppState = Arc::new(AppStateInner {
        db: Database::open_in_memory().expect("in-memory db"),
        clock: Arc::new(FixedClock(reference_now())),
    });
    (pollbox_api::router(state.clone()), state)
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.expect("request");
    let status = resp.status();
    let bytes = resp.into_body().collect().await.expect("body").to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, body)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Creates a question published `days` offset from the fixed clock (negative
/// for the past, positive for the future). Returns its id.
async fn create_question(app: &Router, question_text: &str, days: i64) -> String {
    create_question_with_choices(app, question_text, days, &[]).await
}

async fn create_question_with_choices(
    app: &Router,
    question_text: &str,
    days: i64,
    choices: &[&str],
) -> String {
    let pub_date = reference_now() + Duration::days(days);
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/questions",
            json!({
                "question_text": question_text,
                "pub_date": pub_date,
                "choices": choices,
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().expect("question id").to_string()
}

#[tokio::test]
async fn no_questions() {
    let (app, _) = test_app();

    let (status, body) = send(&app, get("/questions")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "No polls are available.");
    assert_eq!(body["questions"], json!([]));
}

#[tokio::test]
async fn past_question_is_listed() {
    let (app, _) = test_app();
    let id = create_question(&app, "Past question.", -30).await;

    let (status, body) = send(&app, get("/questions")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], Value::Null);
    assert_eq!(body["questions"][0]["id"], id.as_str());
    assert_eq!(body["questions"][0]["question_text"], "Past question.");
}

#[tokio::test]
async fn future_question_is_not_listed() {
    let (app, _) = test_app();
    create_question(&app, "Future question.", 30).await;

    let (_, body) = send(&app, get("/questions")).await;

    assert_eq!(body["message"], "No polls are available.");
    assert_eq!(body["questions"], json!([]));
}

#[tokio::test]
async fn only_past_questions_are_listed() {
    let (app, _) = test_app();
    let past = create_question(&app, "Past question.", -30).await;
    create_question(&app, "Future question.", 30).await;

    let (_, body) = send(&app, get("/questions")).await;

    let ids: Vec<&str> = body["questions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, [past.as_str()]);
}

#[tokio::test]
async fn two_past_questions_ordered_most_recent_first() {
    let (app, _) = test_app();
    let older = create_question(&app, "Past question 1.", -30).await;
    let newer = create_question(&app, "Past question 2.", -5).await;

    let (_, body) = send(&app, get("/questions")).await;

    let ids: Vec<&str> = body["questions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, [newer.as_str(), older.as_str()]);
}

#[tokio::test]
async fn list_marks_recent_questions() {
    let (app, _) = test_app();
    create_question(&app, "Last month.", -30).await;
    let (_, body) = send(&app, get("/questions")).await;
    assert_eq!(body["questions"][0]["was_published_recently"], false);

    let (app, _) = test_app();
    let pub_date = reference_now() - Duration::hours(12);
    send(
        &app,
        json_request(
            "POST",
            "/questions",
            json!({ "question_text": "This morning.", "pub_date": pub_date }),
        ),
    )
    .await;
    let (_, body) = send(&app, get("/questions")).await;
    assert_eq!(body["questions"][0]["was_published_recently"], true);
}

#[tokio::test]
async fn detail_of_future_question_is_not_found() {
    let (app, _) = test_app();
    let id = create_question(&app, "Future question.", 5).await;

    let (status, _) = send(&app, get(&format!("/questions/{id}"))).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn detail_of_past_question_shows_its_text() {
    let (app, _) = test_app();
    let id = create_question_with_choices(&app, "Past Question.", -5, &["Yes", "No"]).await;

    let (status, body) = send(&app, get(&format!("/questions/{id}"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["question_text"], "Past Question.");
    let choices = body["choices"].as_array().unwrap();
    assert_eq!(choices.len(), 2);
    assert_eq!(choices[0]["choice_text"], "Yes");
    assert_eq!(choices[0]["votes"], 0);
}

#[tokio::test]
async fn detail_of_unknown_question_is_not_found() {
    let (app, _) = test_app();
    let (status, _) = send(
        &app,
        get("/questions/00000000-0000-0000-0000-000000000999"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_rejects_overlong_text() {
    let (app, _) = test_app();
    let long = "x".repeat(201);

    let (status, body) = send(
        &app,
        json_request("POST", "/questions", json!({ "question_text": long })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("question_text"));
}

#[tokio::test]
async fn create_rejects_overlong_choice_text() {
    let (app, _) = test_app();
    let long = "x".repeat(201);

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/questions",
            json!({ "question_text": "Ok?", "choices": [long] }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_accepts_max_length_text() {
    let (app, _) = test_app();
    let exact = "x".repeat(200);

    let (status, _) = send(
        &app,
        json_request("POST", "/questions", json!({ "question_text": exact })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn create_defaults_pub_date_to_now() {
    let (app, _) = test_app();

    let (status, body) = send(
        &app,
        json_request("POST", "/questions", json!({ "question_text": "Right now?" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let pub_date: DateTime<Utc> = body["pub_date"].as_str().unwrap().parse().unwrap();
    assert_eq!(pub_date, reference_now());
    assert_eq!(body["was_published_recently"], true);
}

#[tokio::test]
async fn add_choice_to_existing_question() {
    let (app, _) = test_app();
    let id = create_question(&app, "Pick one.", -1).await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            &format!("/questions/{id}/choices"),
            json!({ "choice_text": "Option A" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["question_id"], id.as_str());
    assert_eq!(body["votes"], 0);
}

#[tokio::test]
async fn add_choice_to_unknown_question_is_not_found() {
    let (app, _) = test_app();

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/questions/00000000-0000-0000-0000-000000000999/choices",
            json!({ "choice_text": "Option A" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn vote_increments_tally() {
    let (app, _) = test_app();
    let id = create_question_with_choices(&app, "Pick one.", -1, &["Yes", "No"]).await;

    let (_, detail) = send(&app, get(&format!("/questions/{id}"))).await;
    let choice_id = detail["choices"][0]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            &format!("/questions/{id}/vote"),
            json!({ "choice_id": choice_id }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["votes"], 1);

    let (_, body) = send(
        &app,
        json_request(
            "POST",
            &format!("/questions/{id}/vote"),
            json!({ "choice_id": choice_id }),
        ),
    )
    .await;
    assert_eq!(body["votes"], 2);
}

#[tokio::test]
async fn vote_on_choice_of_other_question_is_not_found() {
    let (app, _) = test_app();
    let first = create_question_with_choices(&app, "First?", -1, &["A"]).await;
    let second = create_question_with_choices(&app, "Second?", -1, &["B"]).await;

    let (_, detail) = send(&app, get(&format!("/questions/{first}"))).await;
    let foreign_choice = detail["choices"][0]["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            &format!("/questions/{second}/vote"),
            json!({ "choice_id": foreign_choice }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn vote_on_future_question_is_not_found() {
    let (app, state) = test_app();
    let id = create_question_with_choices(&app, "Not yet.", 5, &["A"]).await;

    // The detail view 404s for future questions, so read the choice id
    // straight from the store
    let choice_id = state.db.choices_for_question(&id).unwrap()[0].id.clone();

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            &format!("/questions/{id}/vote"),
            json!({ "choice_id": choice_id }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_question_cascades_to_choices() {
    let (app, state) = test_app();
    let id = create_question_with_choices(&app, "Doomed.", -1, &["A", "B"]).await;

    let (_, detail) = send(&app, get(&format!("/questions/{id}"))).await;
    let choice_id = detail["choices"][0]["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        Request::builder()
            .method("DELETE")
            .uri(format!("/questions/{id}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, get(&format!("/questions/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Owned choices are gone from the store as well
    assert!(state.db.get_choice(&choice_id).unwrap().is_none());
    assert!(state.db.choices_for_question(&id).unwrap().is_empty());
}

#[tokio::test]
async fn delete_unknown_question_is_not_found() {
    let (app, _) = test_app();

    let (status, _) = send(
        &app,
        Request::builder()
            .method("DELETE")
            .uri("/questions/00000000-0000-0000-0000-000000000999")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
