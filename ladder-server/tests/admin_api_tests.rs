mod test_helpers;

use std::collections::BTreeMap;

use ladder_persistence::NewUser;
use ladder_types::{
    AdminStats, Announcement, AnnouncementLevel, Dashboard, ErrorCode, FriendGraph, User,
};
use test_helpers::{TestApp, body, error_code, setup, singles, uid};
use warp::http::StatusCode;

async fn admin_app() -> (TestApp, User) {
    let app = setup().await;
    let admin = app.register("root").await;
    app.make_admin(&admin).await;
    (app, admin)
}

#[tokio::test]
async fn test_admin_routes_require_admin() {
    let (app, _) = admin_app().await;
    app.register("alice").await;

    let response = app.get("/admin/stats", &uid("alice")).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(error_code(&response), ErrorCode::Forbidden);

    let response = app.get("/admin/stats", &uid("root")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_stats_and_friend_graph() {
    let (app, admin) = admin_app().await;
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;
    app.befriend(&alice, &bob).await;
    app.post("/matches", &uid("alice"), &singles(bob.id, 11, 4)).await;

    let stats: AdminStats = body(&app.get("/admin/stats", &uid("root")).await);
    assert_eq!(stats.total_users, 3);
    assert_eq!(stats.recent_matches, 1);
    assert_eq!(stats.active_tournaments, 0);

    let graph: FriendGraph = body(&app.get("/admin/friend-graph", &uid("root")).await);
    assert_eq!(graph.nodes.len(), 3);
    assert!(graph.nodes.iter().any(|n| n.id == admin.id && n.label == "root"));
    assert_eq!(graph.edges.len(), 1);
    let edge = &graph.edges[0];
    assert!(
        (edge.from == alice.id && edge.to == bob.id) || (edge.from == bob.id && edge.to == alice.id)
    );
}

#[tokio::test]
async fn test_promote_and_delete() {
    let (app, admin) = admin_app().await;
    let alice = app.register("alice").await;

    let promoted: User = body(
        &app.post_empty(&format!("/admin/users/{}/promote", alice.id), &uid("root"))
            .await,
    );
    assert!(promoted.is_admin);
    assert_eq!(app.get("/admin/stats", &uid("alice")).await.status(), StatusCode::OK);

    let missing = app
        .post_empty(&format!("/admin/users/{}/promote", uuid::Uuid::new_v4()), &uid("root"))
        .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let own = app.delete(&format!("/admin/users/{}", admin.id), &uid("root")).await;
    assert_eq!(own.status(), StatusCode::BAD_REQUEST);

    let response = app.delete(&format!("/admin/users/{}", alice.id), &uid("root")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(app.state.users.find_by_id(alice.id).await.unwrap().is_none());
    let response = app.get("/me", &uid("alice")).await;
    assert_eq!(error_code(&response), ErrorCode::RegistrationRequired);
}

#[tokio::test]
async fn test_merge_moves_history() {
    let (app, _) = admin_app().await;
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;
    let ghost = app
        .state
        .users
        .create_ghost("old-bob@example.com", Some("Bob".to_string()))
        .await
        .unwrap();
    app.post("/matches", &uid("alice"), &singles(ghost.id, 11, 8)).await;

    let same = app
        .post(
            "/admin/merge",
            &uid("root"),
            &serde_json::json!({ "source_id": bob.id, "target_id": bob.id }),
        )
        .await;
    assert_eq!(same.status(), StatusCode::BAD_REQUEST);

    let response = app
        .post(
            "/admin/merge",
            &uid("root"),
            &serde_json::json!({ "source_id": ghost.id, "target_id": bob.id }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let merged: User = body(&response);
    assert_eq!(merged.id, bob.id);
    assert_eq!(merged.record.losses, 1);

    assert!(app.state.users.find_by_id(ghost.id).await.unwrap().is_none());
    let history = app.state.matches.all_for_user(bob.id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert!(history[0].involves(alice.id));
}

#[tokio::test]
async fn test_email_verification_setting() {
    let (app, _) = admin_app().await;
    let unverified = app
        .state
        .users
        .create_user(NewUser {
            auth_uid: Some("uid-zed".to_string()),
            username: "zed".to_string(),
            email: Some("zed@example.com".to_string()),
            name: None,
            dupr_rating: None,
            is_ghost: false,
            email_verified: false,
        })
        .await
        .unwrap();
    let zed_token = r#"Bearer {"uid":"uid-zed","email_verified":false}"#;
    let me = || {
        warp::test::request()
            .method("GET")
            .path("/me")
            .header("authorization", zed_token)
            .reply(&app.routes)
    };

    assert_eq!(me().await.status(), StatusCode::OK);

    let settings: BTreeMap<String, bool> = body(&app.get("/admin/settings", &uid("root")).await);
    assert_eq!(settings.get("enforce_email_verification"), Some(&false));

    let response = app
        .post_empty("/admin/settings/enforce_email_verification/toggle", &uid("root"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let toggled: serde_json::Value = body(&response);
    assert_eq!(toggled["value"], true);

    assert_eq!(me().await.status(), StatusCode::FORBIDDEN);
    // Verified identities are still let through.
    assert_eq!(app.get("/me", &uid("root")).await.status(), StatusCode::OK);

    let response = app
        .post_empty(&format!("/admin/users/{}/verify", unverified.id), &uid("root"))
        .await;
    assert!(body::<User>(&response).email_verified);
    assert_eq!(me().await.status(), StatusCode::OK);

    let unknown = app.post_empty("/admin/settings/dark_launch/toggle", &uid("root")).await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_announcement_reaches_dashboard_while_active() {
    let (app, _) = admin_app().await;
    app.register("alice").await;

    let banner = serde_json::json!({
        "text": "  Courts resurfaced this weekend  ",
        "level": "warning",
        "is_active": true,
    });
    let response = app.post("/admin/announcement", &uid("alice"), &banner).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let dashboard: Dashboard = body(&app.get("/dashboard", &uid("alice")).await);
    assert!(dashboard.announcement.is_none());

    let response = app.post("/admin/announcement", &uid("root"), &banner).await;
    assert_eq!(response.status(), StatusCode::OK);
    let stored: Announcement = body(&response);
    assert_eq!(stored.text, "Courts resurfaced this weekend");
    assert_eq!(stored.level, AnnouncementLevel::Warning);

    let dashboard: Dashboard = body(&app.get("/dashboard", &uid("alice")).await);
    assert_eq!(dashboard.announcement, Some(stored.clone()));

    // Switching it off keeps the text for the admin form but hides the banner.
    let off = serde_json::json!({ "text": stored.text, "is_active": false });
    let response = app.post("/admin/announcement", &uid("root"), &off).await;
    assert_eq!(body::<Announcement>(&response).level, AnnouncementLevel::Info);
    let dashboard: Dashboard = body(&app.get("/dashboard", &uid("alice")).await);
    assert!(dashboard.announcement.is_none());
    let current: Option<Announcement> = body(&app.get("/admin/announcement", &uid("root")).await);
    assert_eq!(current.map(|a| a.text), Some(stored.text));

    let empty = serde_json::json!({ "text": "   ", "is_active": true });
    let response = app.post("/admin/announcement", &uid("root"), &empty).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&response), ErrorCode::Validation);
}
