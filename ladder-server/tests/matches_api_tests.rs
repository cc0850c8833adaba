mod test_helpers;

use ladder_types::{
    Badge, BadgeId, Dashboard, ErrorCode, GlobalLeaderboard, MatchPage, MatchView, Outcome,
    Prediction, Side,
};
use test_helpers::{body, error_code, setup, singles, uid};
use warp::http::StatusCode;

#[tokio::test]
async fn test_record_singles_match() {
    let app = setup().await;
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;

    let response = app.post("/matches", &uid("alice"), &singles(bob.id, 11, 7)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let recorded: MatchView = body(&response);
    assert_eq!(recorded.winner, Side::Team1);
    assert_eq!(recorded.team1[0].id, alice.id);
    assert_eq!(recorded.team2[0].id, bob.id);
    assert_eq!(recorded.viewer_outcome, Some(Outcome::Win));

    let seen_by_bob: MatchView =
        body(&app.get(&format!("/matches/{}", recorded.id), &uid("bob")).await);
    assert_eq!(seen_by_bob.viewer_outcome, Some(Outcome::Loss));

    let dashboard: Dashboard = body(&app.get("/dashboard", &uid("alice")).await);
    assert_eq!(dashboard.stats.wins, 1);
    assert_eq!(dashboard.user.record.wins, 1);
    assert_eq!(dashboard.recent_opponents[0].id, bob.id);
    assert!(dashboard.badges.iter().any(|b| b.id == BadgeId::Rookie));
}

#[tokio::test]
async fn test_invalid_scores_are_rejected() {
    let app = setup().await;
    app.register("alice").await;
    let bob = app.register("bob").await;

    for (mine, theirs) in [(11, 11), (11, 10), (7, 5), (-1, 11)] {
        let response = app
            .post("/matches", &uid("alice"), &singles(bob.id, mine, theirs))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{mine}-{theirs}");
        assert_eq!(error_code(&response), ErrorCode::Validation);
    }
}

#[tokio::test]
async fn test_recorder_must_play_unless_admin() {
    let app = setup().await;
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;
    let carol = app.register("carol").await;

    let mut submission = singles(bob.id, 11, 4);
    submission["player1"] = serde_json::json!(alice.id);

    let response = app.post("/matches", &uid("carol"), &submission).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    app.make_admin(&carol).await;
    let response = app.post("/matches", &uid("carol"), &submission).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_unknown_opponent_is_not_found() {
    let app = setup().await;
    app.register("alice").await;

    let response = app
        .post("/matches", &uid("alice"), &singles(uuid::Uuid::new_v4(), 11, 3))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_future_match_date_is_rejected() {
    let app = setup().await;
    app.register("alice").await;
    let bob = app.register("bob").await;

    let tomorrow = chrono::Utc::now().date_naive() + chrono::Duration::days(2);
    let mut submission = singles(bob.id, 11, 3);
    submission["match_date"] = serde_json::json!(tomorrow);
    let response = app.post("/matches", &uid("alice"), &submission).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_match_history_pages_with_cursor() {
    let app = setup().await;
    app.register("alice").await;
    let bob = app.register("bob").await;

    for theirs in 0..5 {
        let response = app
            .post("/matches", &uid("alice"), &singles(bob.id, 11, theirs))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let first: MatchPage = body(&app.get("/matches?limit=2", &uid("alice")).await);
    assert_eq!(first.matches.len(), 2);
    let cursor = first.next_cursor.expect("more pages");

    let second: MatchPage = body(
        &app.get(&format!("/matches?limit=2&before={cursor}"), &uid("alice"))
            .await,
    );
    assert_eq!(second.matches.len(), 2);
    assert!(second.matches.iter().all(|m| first.matches.iter().all(|f| f.id != m.id)));
    assert!(second.matches[0].match_date <= first.matches[1].match_date);

    let cursor = second.next_cursor.expect("one more page");
    let last: MatchPage = body(
        &app.get(&format!("/matches?limit=2&before={cursor}"), &uid("alice"))
            .await,
    );
    assert_eq!(last.matches.len(), 1);
    assert!(last.next_cursor.is_none());

    let bad = app.get("/matches?before=garbage!", &uid("alice")).await;
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_global_leaderboard_and_latest_matches() {
    let app = setup().await;
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;
    app.register("carol").await;

    app.post("/matches", &uid("alice"), &singles(bob.id, 11, 5)).await;
    app.post("/matches", &uid("alice"), &singles(bob.id, 11, 9)).await;

    let board: GlobalLeaderboard = body(&app.get("/leaderboard", &uid("carol")).await);
    // Carol has not played and stays off the board.
    assert_eq!(board.players.len(), 2);
    assert_eq!(board.players[0].user.id, alice.id);
    assert_eq!(board.players[0].win_percentage, 100.0);
    assert_eq!(board.latest_matches.len(), 2);
    assert!(board.latest_matches.iter().all(|m| m.viewer_outcome.is_none()));
}

#[tokio::test]
async fn test_predict_favours_the_stronger_record() {
    let app = setup().await;
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;

    for _ in 0..3 {
        app.post("/matches", &uid("alice"), &singles(bob.id, 11, 2)).await;
    }

    let path = format!("/predict?team1={}&team2={}", alice.id, bob.id);
    let prediction: Prediction = body(&app.get(&path, &uid("bob")).await);
    assert!(prediction.team1_probability > prediction.team2_probability);
    assert_eq!(prediction.team1_probability + prediction.team2_probability, 100);

    let path = format!("/predict?team1={}&team2={}", alice.id, alice.id);
    let response = app.get(&path, &uid("bob")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_recording_is_rate_limited() {
    let mut config = ladder_server::config::Config::for_tests();
    config.match_rate_limit_burst = 2;
    config.match_rate_limit_refill_seconds = 3600;
    let app = test_helpers::setup_with(config).await;
    app.register("alice").await;
    let bob = app.register("bob").await;

    for _ in 0..2 {
        let response = app.post("/matches", &uid("alice"), &singles(bob.id, 11, 1)).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }
    let response = app.post("/matches", &uid("alice"), &singles(bob.id, 11, 1)).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(error_code(&response), ErrorCode::RateLimited);
}

#[tokio::test]
async fn test_rejected_submissions_do_not_spend_rate_limit() {
    let mut config = ladder_server::config::Config::for_tests();
    config.match_rate_limit_burst = 2;
    config.match_rate_limit_refill_seconds = 3600;
    let app = test_helpers::setup_with(config).await;
    app.register("alice").await;
    let bob = app.register("bob").await;

    for _ in 0..5 {
        let response = app.post("/matches", &uid("alice"), &singles(bob.id, 11, 10)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
    for _ in 0..2 {
        let response = app.post("/matches", &uid("alice"), &singles(bob.id, 11, 1)).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }
    let response = app.post("/matches", &uid("alice"), &singles(bob.id, 11, 1)).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_hot_streak_awarded_once() {
    let app = setup().await;
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;

    let hot_streaks = |badges: &[Badge]| {
        badges.iter().filter(|b| b.id == BadgeId::HotStreak).count()
    };

    for _ in 0..2 {
        let response = app.post("/matches", &uid("alice"), &singles(bob.id, 11, 6)).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }
    let dashboard: Dashboard = body(&app.get("/dashboard", &uid("alice")).await);
    assert_eq!(hot_streaks(&dashboard.badges), 0);

    let response = app.post("/matches", &uid("alice"), &singles(bob.id, 11, 6)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let dashboard: Dashboard = body(&app.get("/dashboard", &uid("alice")).await);
    assert_eq!(dashboard.stats.current_streak, 3);
    assert_eq!(hot_streaks(&dashboard.badges), 1);

    let response = app.post("/matches", &uid("alice"), &singles(bob.id, 11, 6)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let badges = app.state.badges.badges_for(alice.id).await.unwrap();
    assert_eq!(hot_streaks(&badges), 1);
    let badges = app.state.badges.badges_for(bob.id).await.unwrap();
    assert_eq!(hot_streaks(&badges), 0);
}

#[tokio::test]
async fn test_doubles_match_builds_team() {
    let app = setup().await;
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;
    let carol = app.register("carol").await;
    let dave = app.register("dave").await;

    let submission = serde_json::json!({
        "match_type": "doubles",
        "player1": alice.id,
        "partner": bob.id,
        "player2": carol.id,
        "opponent2": dave.id,
        "player1_score": 11,
        "player2_score": 8,
        "match_date": null,
        "group_id": null,
        "tournament_id": null,
    });
    let response = app.post("/matches", &uid("alice"), &submission).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let team = app
        .state
        .teams
        .find_by_pair(alice.id, bob.id)
        .await
        .unwrap()
        .expect("team created");
    let details: ladder_types::TeamDetails =
        body(&app.get(&format!("/teams/{}", team.id), &uid("alice")).await);
    assert_eq!(details.team.wins, 1);
    assert_eq!(details.members.len(), 2);
    assert_eq!(details.recent_matches.len(), 1);
}

#[tokio::test]
async fn test_only_partners_rename_team() {
    let app = setup().await;
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;
    app.register("carol").await;
    let team = app.state.teams.get_or_create(alice.id, bob.id, "").await.unwrap();
    let path = format!("/teams/{}", team.id);

    let rename = serde_json::json!({ "name": "Kitchen Kings" });
    let response = app.patch(&path, &uid("carol"), &rename).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(error_code(&response), ErrorCode::Forbidden);

    let response = app.patch(&path, &uid("bob"), &serde_json::json!({ "name": " " })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.patch(&path, &uid("bob"), &rename).await;
    assert_eq!(response.status(), StatusCode::OK);
    let renamed: ladder_types::Team = body(&response);
    assert_eq!(renamed.name, "Kitchen Kings");

    let details: ladder_types::TeamDetails = body(&app.get(&path, &uid("carol")).await);
    assert_eq!(details.team.name, "Kitchen Kings");

    let missing = format!("/teams/{}", uuid::Uuid::new_v4());
    let response = app.patch(&missing, &uid("alice"), &rename).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
