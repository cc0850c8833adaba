#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;
use warp::filters::BoxedFilter;
use warp::http::StatusCode;
use warp::hyper::body::Bytes;
use warp::reply::Response as RouteResponse;

use ladder_persistence::connect_to_memory_database;
use ladder_server::auth::AuthService;
use ladder_server::config::Config;
use ladder_server::mailer::{EmailMessage, Mailer};
use ladder_server::{AppState, create_routes};
use ladder_types::{ErrorBody, ErrorCode, RegisterRequest, User};
use migration::{Migrator, MigratorTrait};

/// Keeps outgoing mail so tests can read invite links.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<EmailMessage>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &EmailMessage) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

impl RecordingMailer {
    pub fn messages_to(&self, to: &str) -> Vec<EmailMessage> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.to == to)
            .cloned()
            .collect()
    }

    /// Waits for background sends to land.
    pub async fn wait_for(&self, to: &str) -> EmailMessage {
        for _ in 0..100 {
            if let Some(message) = self.messages_to(to).pop() {
                return message;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("no email sent to {to}");
    }
}

pub type Response = warp::http::Response<Bytes>;

pub struct TestApp {
    pub routes: BoxedFilter<(RouteResponse,)>,
    pub state: AppState,
    pub mailer: Arc<RecordingMailer>,
}

pub async fn setup() -> TestApp {
    setup_with(Config::for_tests()).await
}

pub async fn setup_with(config: Config) -> TestApp {
    let db = connect_to_memory_database().await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    let mailer = Arc::new(RecordingMailer::default());
    let state = AppState::new(
        db,
        config,
        Arc::new(AuthService::new_dev_mode()),
        mailer.clone(),
    );
    TestApp {
        routes: create_routes(state.clone()),
        state,
        mailer,
    }
}

/// Dev-mode token for `uid`, with a verified email derived from it.
pub fn token(uid: &str) -> String {
    format!("Bearer {uid}:{uid}@example.com:{uid}")
}

impl TestApp {
    pub async fn send(
        &self,
        method: &str,
        path: &str,
        uid: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> Response {
        let mut request = warp::test::request().method(method).path(path);
        if let Some(uid) = uid {
            request = request.header("authorization", token(uid));
        }
        if let Some(body) = body {
            request = request.json(&body);
        }
        request.reply(&self.routes).await
    }

    pub async fn get(&self, path: &str, uid: &str) -> Response {
        self.send("GET", path, Some(uid), None).await
    }

    pub async fn post<T: Serialize>(&self, path: &str, uid: &str, body: &T) -> Response {
        let body = serde_json::to_value(body).unwrap();
        self.send("POST", path, Some(uid), Some(body)).await
    }

    pub async fn post_empty(&self, path: &str, uid: &str) -> Response {
        self.send("POST", path, Some(uid), None).await
    }

    pub async fn patch<T: Serialize>(&self, path: &str, uid: &str, body: &T) -> Response {
        let body = serde_json::to_value(body).unwrap();
        self.send("PATCH", path, Some(uid), Some(body)).await
    }

    pub async fn delete(&self, path: &str, uid: &str) -> Response {
        self.send("DELETE", path, Some(uid), None).await
    }

    /// Registers `username` under the identity `uid-<username>`.
    pub async fn register(&self, username: &str) -> User {
        let response = self
            .post(
                "/auth/register",
                &uid(username),
                &RegisterRequest {
                    username: username.to_string(),
                    name: Some(capitalize(username)),
                    email: None,
                    dupr_rating: None,
                    invite_token: None,
                },
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED, "{:?}", response.body());
        body(&response)
    }

    pub async fn make_admin(&self, user: &User) {
        self.state.users.set_admin(user.id, true).await.unwrap();
    }

    pub async fn befriend(&self, a: &User, b: &User) {
        self.state.friends.befriend(a.id, b.id).await.unwrap();
    }
}

pub fn uid(username: &str) -> String {
    format!("uid-{username}")
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn body<T: DeserializeOwned>(response: &Response) -> T {
    serde_json::from_slice(response.body()).unwrap()
}

pub fn error_code(response: &Response) -> ErrorCode {
    body::<ErrorBody>(response).code
}

pub fn singles(opponent: Uuid, mine: i32, theirs: i32) -> serde_json::Value {
    serde_json::json!({
        "match_type": "singles",
        "player1": null,
        "partner": null,
        "player2": opponent,
        "opponent2": null,
        "player1_score": mine,
        "player2_score": theirs,
        "match_date": null,
        "group_id": null,
        "tournament_id": null,
    })
}
