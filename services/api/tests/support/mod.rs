//! Shared harness for router tests: an in-memory app and signed tokens

#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use common::token::{Claims, TokenType};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use playlist_api::{
    AppState,
    middleware::JwtVerifier,
    models::User,
    repositories::MemoryRepository,
    routes::create_router,
};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

const PRIVATE_KEY: &str = include_str!("../../../../keys/dev/jwt_private.pem");
const PUBLIC_KEY: &str = include_str!("../../../../keys/dev/jwt_public.pem");

pub struct TestApp {
    pub router: Router,
    pub repository: MemoryRepository,
}

impl TestApp {
    pub fn new() -> Self {
        let repository = MemoryRepository::new();
        let jwt = JwtVerifier::from_rsa_pem(PUBLIC_KEY).unwrap();
        let router = create_router(AppState::in_memory(repository.clone(), jwt));
        Self { router, repository }
    }

    /// Store a user and return it with a valid access token
    pub async fn user(&self, first_name: &str) -> (User, String) {
        let email = format!("{}@example.com", first_name.to_lowercase());
        let user = User::new(first_name, "Tester", &email);
        self.repository.insert_user(user.clone()).await;
        let token = token_for(user.id, TokenType::Access, 900);
        (user, token)
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, Some(token), None).await
    }

    /// Create a playlist through the API and return its id
    pub async fn create_playlist(&self, token: &str, name: &str) -> Uuid {
        let (status, body) = self
            .post(
                "/api/playlists",
                token,
                serde_json::json!({ "name": name, "thumbnail": "cover.png" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        id_of(&body)
    }

    /// Create a song through the API and return its id
    pub async fn create_song(&self, token: &str, name: &str) -> Uuid {
        let (status, body) = self
            .post(
                "/api/songs",
                token,
                serde_json::json!({ "name": name, "thumbnail": "art.png", "track": "track.mp3" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        id_of(&body)
    }
}

pub fn token_for(user_id: Uuid, token_type: TokenType, ttl_seconds: u64) -> String {
    let claims = Claims::new(user_id, token_type, ttl_seconds);
    jsonwebtoken::encode(
        &Header::new(Algorithm::RS256),
        &claims,
        &EncodingKey::from_rsa_pem(PRIVATE_KEY.as_bytes()).unwrap(),
    )
    .unwrap()
}

pub fn id_of(body: &Value) -> Uuid {
    body["id"].as_str().unwrap().parse().unwrap()
}

pub fn ids(values: &Value) -> Vec<Uuid> {
    values
        .as_array()
        .unwrap()
        .iter()
        .map(|v| match v {
            Value::String(s) => s.parse().unwrap(),
            other => id_of(other),
        })
        .collect()
}
