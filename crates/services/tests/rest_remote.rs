use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};

use services::{AuthUser, RemoteError, RemoteProgressStore, RestRemoteStore};
use vocab_core::model::{
    Level, MasteredWordRow, ProgressRecord, QuizResultRow, RemoteProgressRow, SyncSettingsDraft,
    UserId, WordId,
};
use vocab_core::time::fixed_now;

#[derive(Debug, Clone)]
struct Captured {
    method: Method,
    table: String,
    query: HashMap<String, String>,
    headers: HeaderMap,
    body: Value,
}

#[derive(Clone, Default)]
struct Backend {
    requests: Arc<Mutex<Vec<Captured>>>,
    progress_rows: Arc<Mutex<Vec<Value>>>,
    fail_with: Option<StatusCode>,
}

async fn table(
    State(backend): State<Backend>,
    method: Method,
    Path(table): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, Json<Value>) {
    let body = serde_json::from_str(&body).unwrap_or(Value::Null);
    backend.requests.lock().unwrap().push(Captured {
        method: method.clone(),
        table: table.clone(),
        query,
        headers,
        body,
    });

    if let Some(status) = backend.fail_with {
        return (status, Json(json!({ "message": "unavailable" })));
    }
    if method == Method::GET && table == "user_progress" {
        let rows = backend.progress_rows.lock().unwrap().clone();
        return (StatusCode::OK, Json(Value::Array(rows)));
    }
    (StatusCode::CREATED, Json(Value::Null))
}

async fn serve(backend: Backend) -> SocketAddr {
    let app = Router::new()
        .route("/rest/v1/:table", get(table).post(table))
        .with_state(backend);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn client(addr: SocketAddr) -> RestRemoteStore {
    let settings = SyncSettingsDraft {
        base_url: Some(format!("http://{addr}")),
        api_key: Some("anon-key".into()),
        request_timeout_secs: Some(5),
    }
    .validate()
    .unwrap()
    .expect("enabled");
    RestRemoteStore::new(settings).unwrap()
}

#[tokio::test]
async fn fetch_sends_filter_and_auth_headers() {
    let backend = Backend::default();
    let addr = serve(backend.clone()).await;
    let store = client(addr);
    let user = AuthUser::new(UserId::random(), "user-token");

    assert!(store.fetch_progress(&user).await.unwrap().is_none());

    backend.progress_rows.lock().unwrap().push(json!({
        "user_id": user.id.to_string(),
        "total_points": 150,
        "current_level": "B1",
        "mastered_words": [2, 3],
        "badges": null
    }));
    let row = store.fetch_progress(&user).await.unwrap().expect("row");
    assert_eq!(row.total_points, Some(150));
    assert_eq!(row.current_level, Some(Level::B1));
    assert_eq!(row.mastered_words, Some(vec![WordId::new(2), WordId::new(3)]));

    let requests = backend.requests.lock().unwrap();
    let first = &requests[0];
    assert_eq!(first.method, Method::GET);
    assert_eq!(first.table, "user_progress");
    assert_eq!(first.query.get("user_id"), Some(&format!("eq.{}", user.id)));
    assert_eq!(first.headers["apikey"], "anon-key");
    assert_eq!(first.headers["authorization"], "Bearer user-token");
}

#[tokio::test]
async fn writes_use_conflict_targets() {
    let backend = Backend::default();
    let addr = serve(backend.clone()).await;
    let store = client(addr);
    let user = AuthUser::new(UserId::random(), "user-token");

    let row = RemoteProgressRow::from_record(user.id, &ProgressRecord::default(), fixed_now());
    store.upsert_progress(&user, &row).await.unwrap();
    store
        .upsert_mastered_words(
            &user,
            &[MasteredWordRow {
                user_id: user.id,
                word_id: WordId::new(5),
                mastered_at: fixed_now(),
            }],
        )
        .await
        .unwrap();
    store.upsert_mastered_words(&user, &[]).await.unwrap();
    store
        .insert_quiz_result(
            &user,
            &QuizResultRow {
                user_id: user.id,
                level: Level::A1,
                total_questions: 5,
                correct_answers: 4,
                accuracy: 80,
                points_earned: 36,
                completed_at: fixed_now(),
            },
        )
        .await
        .unwrap();

    let requests = backend.requests.lock().unwrap();
    assert_eq!(requests.len(), 3);

    let progress = &requests[0];
    assert_eq!(progress.table, "user_progress");
    assert_eq!(progress.query.get("on_conflict").map(String::as_str), Some("user_id"));
    assert!(
        progress.headers["prefer"]
            .to_str()
            .unwrap()
            .contains("resolution=merge-duplicates")
    );
    assert_eq!(progress.body["current_level"], "A1");
    assert_eq!(progress.body["user_id"], user.id.to_string());

    let mastered = &requests[1];
    assert_eq!(mastered.table, "user_mastered_words");
    assert_eq!(
        mastered.query.get("on_conflict").map(String::as_str),
        Some("user_id,word_id")
    );
    assert_eq!(mastered.body[0]["word_id"], 5);

    let quiz = &requests[2];
    assert_eq!(quiz.table, "quiz_results");
    assert!(quiz.query.get("on_conflict").is_none());
    assert_eq!(quiz.body["points_earned"], 36);
}

#[tokio::test]
async fn error_status_is_reported() {
    let backend = Backend {
        fail_with: Some(StatusCode::SERVICE_UNAVAILABLE),
        ..Backend::default()
    };
    let addr = serve(backend).await;
    let store = client(addr);
    let user = AuthUser::new(UserId::random(), "user-token");

    let err = store.fetch_progress(&user).await.unwrap_err();
    assert!(matches!(
        err,
        RemoteError::HttpStatus(status) if status == reqwest::StatusCode::SERVICE_UNAVAILABLE
    ));
}
