mod support;

use axum::http::StatusCode;
use common::token::TokenType;
use serde_json::json;
use uuid::Uuid;

use crate::support::{TestApp, ids, token_for};

#[tokio::test]
async fn test_liked_lists_start_empty() {
    let app = TestApp::new();
    let (_, token) = app.user("Ada").await;

    let (status, body) = app.get("/api/users/liked-songs", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, body) = app.get("/api/users/liked-playlists", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_liked_lists_need_a_user_record() {
    let app = TestApp::new();
    let token = token_for(Uuid::new_v4(), TokenType::Access, 900);

    for uri in ["/api/users/liked-songs", "/api/users/liked-playlists"] {
        let (status, body) = app.get(uri, Some(&token)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "User not found");
    }
}

#[tokio::test]
async fn test_deleted_playlist_drops_out_of_liked_playlists() {
    let app = TestApp::new();
    let (_, token) = app.user("Ada").await;
    let kept = app.create_playlist(&token, "Kept").await;
    let gone = app.create_playlist(&token, "Gone").await;

    for playlist in [gone, kept] {
        app.post(&format!("/api/playlists/{}/like", playlist), &token, json!({}))
            .await;
    }
    app.delete(&format!("/api/playlists/{}", gone), &token).await;

    let (status, liked) = app.get("/api/users/liked-playlists", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&liked), vec![kept]);

    // The dangling like can still be toggled off
    let (status, body) = app
        .post(&format!("/api/playlists/{}/like", gone), &token, json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Playlist removed from liked playlists");
}
