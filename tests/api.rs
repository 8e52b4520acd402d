use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    extract::State,
    http::{HeaderMap, Method, Request, StatusCode, Uri, header},
};
use nearby_posts::{
    AppState,
    config::Config,
    database::{MemoryPostStore, PostStore, StorageError},
    models::{Post, PostId},
    nearby::RADIUS_KEY,
    router::create_router,
    utils::vws_authorization_header,
};
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tower::ServiceExt;

async fn app_with_radius(radius: Option<Value>) -> (Router, Arc<MemoryPostStore>) {
    let store = Arc::new(MemoryPostStore::new());
    if let Some(radius) = radius {
        store.set_config(RADIUS_KEY, radius).await;
    }
    let app = create_router(AppState::new(Config::default(), store.clone()));
    (app, store)
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn written_post_is_found_with_server_time_and_id() {
    let (app, _store) = app_with_radius(Some(json!(100))).await;

    let (status, body) = send(
        &app,
        post_json(
            "/post",
            json!({
                "author": "alice",
                "time": 5,
                "type": "text",
                "location": [37.0, -122.0]
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"Ok");

    let (status, body) = send(&app, get("/posts/37.0/-122.0")).await;
    assert_eq!(status, StatusCode::OK);

    let posts: Vec<Value> = serde_json::from_slice(&body).unwrap();
    assert_eq!(posts.len(), 1);
    let post = &posts[0];
    assert_eq!(post["author"], "alice");
    assert_eq!(post["type"], "text");
    assert_eq!(post["location"], json!([37.0, -122.0]));
    assert!(!post["id"].as_str().unwrap().is_empty());
    assert_ne!(post["time"], json!(5));
    assert!(post["time"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn far_posts_are_filtered_out() {
    let (app, store) = app_with_radius(Some(json!(1000))).await;

    for (author, location) in [("here", [37.0, -122.0]), ("there", [38.0, -122.0])] {
        let (status, _) = send(
            &app,
            post_json(
                "/post",
                json!({ "author": author, "type": "image", "url": "https://x/y.png", "location": location }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
    assert_eq!(store.read_all_posts().await.unwrap().len(), 2);

    let (status, body) = send(&app, get("/posts/37.0001/-122.0")).await;
    assert_eq!(status, StatusCode::OK);
    let posts: Vec<Value> = serde_json::from_slice(&body).unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["author"], "here");
}

#[tokio::test]
async fn missing_radius_is_bad_request_with_empty_array() {
    let (app, _store) = app_with_radius(None).await;

    let (status, body) = send(&app, get("/posts/37.0/-122.0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(serde_json::from_slice::<Value>(&body).unwrap(), json!([]));
}

#[tokio::test]
async fn unparsable_coordinates_are_bad_request() {
    let (app, _store) = app_with_radius(Some(json!(1000))).await;

    for uri in ["/posts/abc/1", "/posts/1/NaN"] {
        let (status, body) = send(&app, get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(serde_json::from_slice::<Value>(&body).unwrap(), json!([]));
    }
}

#[tokio::test]
async fn unknown_post_type_is_rejected() {
    let (app, store) = app_with_radius(Some(json!(1000))).await;

    let (status, _) = send(
        &app,
        post_json("/post", json!({ "author": "x", "type": "audio", "location": [0.0, 0.0] })),
    )
    .await;
    assert!(status.is_client_error());
    assert!(store.read_all_posts().await.unwrap().is_empty());
}

struct BrokenStore;

#[async_trait]
impl PostStore for BrokenStore {
    async fn append_post(&self, _post: &Post) -> Result<PostId, StorageError> {
        Err(StorageError::Unavailable("write refused".into()))
    }

    async fn read_all_posts(&self) -> Result<Vec<(PostId, Post)>, StorageError> {
        Err(StorageError::Unavailable("read refused".into()))
    }

    async fn read_config(&self, _key: &str) -> Result<Option<Value>, StorageError> {
        Ok(Some(json!(1000)))
    }
}

#[tokio::test]
async fn write_failure_is_reported() {
    let app = create_router(AppState::new(Config::default(), Arc::new(BrokenStore)));

    let (status, body) = send(
        &app,
        post_json("/post", json!({ "author": "x", "type": "text", "location": [0.0, 0.0] })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, b"Error");
}

#[tokio::test]
async fn snapshot_failure_is_bad_request() {
    let app = create_router(AppState::new(Config::default(), Arc::new(BrokenStore)));

    let (status, body) = send(&app, get("/posts/0/0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(serde_json::from_slice::<Value>(&body).unwrap(), json!([]));
}

#[tokio::test]
async fn target_update_requires_metadata() {
    let config = Config {
        // 不可达地址，确保不会真的发出请求
        vuforia_base_url: "http://127.0.0.1:9".into(),
        ..Config::default()
    };
    let app = create_router(AppState::new(config, Arc::new(MemoryPostStore::new())));

    let (status, body) = send(&app, post_json("/target", json!({ "id": "abc", "metadata": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, b"No new metadata passed");

    let (status, body) = send(&app, post_json("/target", json!({ "id": "abc" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, b"No new metadata passed");
}

#[tokio::test]
async fn radius_from_config_serves_queries_in_memory_mode() {
    let config = Config {
        radius_in_ft: Some(500.0),
        ..Config::default()
    };
    let store = Arc::new(MemoryPostStore::seeded(&config).await);
    let app = create_router(AppState::new(config, store));

    let (status, _) = send(
        &app,
        post_json("/post", json!({ "author": "op", "type": "text", "location": [12.0, 34.0] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, get("/posts/12.0/34.0")).await;
    assert_eq!(status, StatusCode::OK);
    let posts: Vec<Value> = serde_json::from_slice(&body).unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["author"], "op");
}

// 模拟 VWS 服务端收到的请求
struct SeenRequest {
    method: Method,
    path: String,
    headers: HeaderMap,
    body: String,
}

#[derive(Clone)]
struct FakeVws {
    seen: Arc<Mutex<Vec<SeenRequest>>>,
    status: StatusCode,
    body: String,
}

async fn fake_vws_handler(
    State(fake): State<FakeVws>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    fake.seen.lock().await.push(SeenRequest {
        method,
        path: uri.path().to_string(),
        headers,
        body,
    });
    (fake.status, fake.body.clone())
}

async fn spawn_fake_vws(status: StatusCode, body: &str) -> (String, Arc<Mutex<Vec<SeenRequest>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let fake = FakeVws {
        seen: seen.clone(),
        status,
        body: body.to_string(),
    };
    let app = Router::new().fallback(fake_vws_handler).with_state(fake);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), seen)
}

fn vws_app(base_url: String) -> Router {
    let config = Config {
        vuforia_access_key: "access-key".into(),
        vuforia_secret_key: "secret-key".into(),
        vuforia_base_url: base_url,
        ..Config::default()
    };
    create_router(AppState::new(config, Arc::new(MemoryPostStore::new())))
}

#[tokio::test]
async fn target_update_sends_signed_put_and_relays_response() {
    let (base_url, seen) =
        spawn_fake_vws(StatusCode::CREATED, r#"{"result_code":"Success"}"#).await;
    let app = vws_app(base_url);

    let (status, body) = send(
        &app,
        post_json("/target", json!({ "id": "abc123", "metadata": "hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, br#"{"result_code":"Success"}"#);

    let seen = seen.lock().await;
    assert_eq!(seen.len(), 1);
    let req = &seen[0];
    assert_eq!(req.method, Method::PUT);
    assert_eq!(req.path, "/targets/abc123");
    // "hello" 的 base64 为 aGVsbG8=
    assert_eq!(req.body, r#"{"application_metadata" : "aGVsbG8="}"#);
    assert_eq!(req.headers[header::CONTENT_TYPE], "application/json");
    assert_eq!(req.headers[header::ACCEPT], "application/json");

    let date = req.headers[header::DATE].to_str().unwrap();
    assert!(date.ends_with(" GMT"), "{date}");

    let expected = vws_authorization_header(
        "access-key",
        "secret-key",
        "PUT",
        req.body.as_bytes(),
        "application/json",
        date,
        "/targets/abc123",
    )
    .unwrap();
    assert_eq!(req.headers[header::AUTHORIZATION], expected.as_str());
    assert!(expected.starts_with("VWS access-key:"));
}

#[tokio::test]
async fn target_update_relays_large_upstream_error() {
    let upstream_body = "e".repeat(2000);
    let (base_url, _seen) = spawn_fake_vws(StatusCode::SERVICE_UNAVAILABLE, &upstream_body).await;
    let app = vws_app(base_url);

    let (status, body) = send(
        &app,
        post_json("/target", json!({ "id": "abc123", "metadata": "hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, upstream_body.into_bytes());
}

#[tokio::test]
async fn target_update_unreachable_upstream_is_bad_gateway() {
    // 绑定后立即释放端口，连接会被拒绝
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let app = vws_app(format!("http://{}", addr));

    let (status, body) = send(
        &app,
        post_json("/target", json!({ "id": "abc123", "metadata": "hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body, b"Error");
}

#[tokio::test]
async fn target_update_rejects_path_like_ids() {
    let (base_url, seen) = spawn_fake_vws(StatusCode::OK, "{}").await;
    let app = vws_app(base_url);

    for id in ["abc/../summary", "abc?x=1", "abc#frag", ""] {
        let (status, body) = send(
            &app,
            post_json("/target", json!({ "id": id, "metadata": "hello" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{id}");
        assert_eq!(body, b"Invalid target id");
    }
    assert!(seen.lock().await.is_empty());
}
