mod test_helpers;

use ladder_types::{
    BadgeId, ParticipantStatus, Standing, Tournament, TournamentDetails, TournamentStatus, User,
};
use test_helpers::{TestApp, body, setup, singles, uid};
use warp::http::StatusCode;

async fn create_tournament(app: &TestApp, organizer: &str, match_type: &str) -> Tournament {
    let response = app
        .post(
            "/tournaments",
            &uid(organizer),
            &serde_json::json!({
                "name": "Spring Open",
                "date": "2026-05-01",
                "location": "Riverside Courts",
                "match_type": match_type,
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body(&response)
}

async fn invite_and_accept(app: &TestApp, tournament: &Tournament, organizer: &str, player: &User) {
    let response = app
        .post(
            &format!("/tournaments/{}/invite", tournament.id),
            &uid(organizer),
            &serde_json::json!({ "user_id": player.id }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = app
        .post_empty(&format!("/tournaments/{}/accept", tournament.id), &uid(&player.username))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

fn tournament_match(opponent: &User, tournament: &Tournament, mine: i32, theirs: i32) -> serde_json::Value {
    let mut submission = singles(opponent.id, mine, theirs);
    submission["tournament_id"] = serde_json::json!(tournament.id);
    submission
}

#[tokio::test]
async fn test_create_and_invite() {
    let app = setup().await;
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;
    app.befriend(&alice, &bob).await;
    let tournament = create_tournament(&app, "alice", "singles").await;
    assert_eq!(tournament.status, TournamentStatus::Active);

    let path = format!("/tournaments/{}", tournament.id);
    let details: TournamentDetails = body(&app.get(&path, &uid("alice")).await);
    assert!(details.is_owner);
    assert_eq!(details.participants.len(), 1);
    assert_eq!(details.participants[0].status, ParticipantStatus::Accepted);
    assert_eq!(details.invitable_users.len(), 1);
    assert_eq!(details.invitable_users[0].id, bob.id);

    let invite = serde_json::json!({ "user_id": bob.id });
    let response = app
        .post(&format!("{path}/invite"), &uid("bob"), &invite)
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.post(&format!("{path}/invite"), &uid("alice"), &invite).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = app.post(&format!("{path}/invite"), &uid("alice"), &invite).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let listed: Vec<Tournament> = body(&app.get("/tournaments", &uid("bob")).await);
    assert_eq!(listed.len(), 1);

    let details: TournamentDetails = body(&app.get(&path, &uid("alice")).await);
    assert!(details.invitable_users.is_empty());
    let pending = details
        .participants
        .iter()
        .find(|p| p.user.id == bob.id)
        .expect("bob is listed");
    assert_eq!(pending.status, ParticipantStatus::Pending);
}

#[tokio::test]
async fn test_decline_removes_invitation() {
    let app = setup().await;
    app.register("alice").await;
    let carol = app.register("carol").await;
    let tournament = create_tournament(&app, "alice", "singles").await;

    let path = format!("/tournaments/{}", tournament.id);
    app.post(&format!("{path}/invite"), &uid("alice"), &serde_json::json!({ "user_id": carol.id }))
        .await;

    let response = app.post_empty(&format!("{path}/decline"), &uid("carol")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = app.post_empty(&format!("{path}/decline"), &uid("carol")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = app.post_empty(&format!("{path}/accept"), &uid("carol")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invite_group_adds_members() {
    let app = setup().await;
    app.register("alice").await;
    app.register("bob").await;
    app.register("carol").await;

    let group: ladder_types::Group = body(
        &app.post(
            "/groups",
            &uid("alice"),
            &serde_json::json!({ "name": "Picklers", "description": null, "is_public": true, "profile_picture_url": null }),
        )
        .await,
    );
    for name in ["bob", "carol"] {
        app.post_empty(&format!("/groups/{}/join", group.id), &uid(name)).await;
    }

    let tournament = create_tournament(&app, "alice", "singles").await;
    let response = app
        .post(
            &format!("/tournaments/{}/invite-group", tournament.id),
            &uid("alice"),
            &serde_json::json!({ "group_id": group.id }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let invited: serde_json::Value = body(&response);
    // The organizer is already on the list.
    assert_eq!(invited["invited"], 2);
}

#[tokio::test]
async fn test_tournament_matches_need_accepted_players() {
    let app = setup().await;
    app.register("alice").await;
    let bob = app.register("bob").await;
    let tournament = create_tournament(&app, "alice", "singles").await;

    let response = app
        .post("/matches", &uid("alice"), &tournament_match(&bob, &tournament, 11, 5))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    invite_and_accept(&app, &tournament, "alice", &bob).await;
    let response = app
        .post("/matches", &uid("alice"), &tournament_match(&bob, &tournament, 11, 5))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let standings: Vec<Standing> = body(
        &app.get(&format!("/tournaments/{}/standings", tournament.id), &uid("bob"))
            .await,
    );
    assert_eq!(standings.len(), 2);
    assert_eq!(standings[0].name, "alice");
    assert_eq!(standings[0].point_diff, 6);
    assert_eq!(standings[1].losses, 1);
}

#[tokio::test]
async fn test_match_type_is_locked_after_play() {
    let app = setup().await;
    app.register("alice").await;
    let bob = app.register("bob").await;
    let tournament = create_tournament(&app, "alice", "singles").await;
    let path = format!("/tournaments/{}", tournament.id);

    let renamed: Tournament = body(
        &app.patch(&path, &uid("alice"), &serde_json::json!({ "name": "Summer Open" }))
            .await,
    );
    assert_eq!(renamed.name, "Summer Open");

    invite_and_accept(&app, &tournament, "alice", &bob).await;
    app.post("/matches", &uid("alice"), &tournament_match(&bob, &tournament, 11, 9))
        .await;

    let response = app
        .patch(&path, &uid("alice"), &serde_json::json!({ "match_type": "doubles" }))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_complete_awards_champion_and_emails_results() {
    let app = setup().await;
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;
    let tournament = create_tournament(&app, "alice", "singles").await;
    invite_and_accept(&app, &tournament, "alice", &bob).await;

    for (mine, theirs) in [(11, 7), (9, 11), (11, 3)] {
        let response = app
            .post("/matches", &uid("alice"), &tournament_match(&bob, &tournament, mine, theirs))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let complete = format!("/tournaments/{}/complete", tournament.id);
    assert_eq!(
        app.post_empty(&complete, &uid("bob")).await.status(),
        StatusCode::FORBIDDEN
    );

    let response = app.post_empty(&complete, &uid("alice")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let standings: Vec<Standing> = body(&response);
    assert_eq!(standings[0].id, alice.id);
    assert_eq!(standings[0].wins, 2);

    let badges = app.state.badges.badges_for(alice.id).await.unwrap();
    assert!(badges.iter().any(|b| b.id == BadgeId::Champion));
    let badges = app.state.badges.badges_for(bob.id).await.unwrap();
    assert!(!badges.iter().any(|b| b.id == BadgeId::Champion));

    for user in [&alice, &bob] {
        let email = user.email.as_deref().unwrap();
        let sent = app.mailer.messages_to(email);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "Results: Spring Open");
        assert!(sent[0].body.contains("Congratulations to alice"));
    }

    let details: TournamentDetails =
        body(&app.get(&format!("/tournaments/{}", tournament.id), &uid("bob")).await);
    assert_eq!(details.tournament.status, TournamentStatus::Completed);
    assert_eq!(details.podium.len(), 2);

    assert_eq!(app.post_empty(&complete, &uid("alice")).await.status(), StatusCode::CONFLICT);
    let response = app
        .post("/matches", &uid("alice"), &tournament_match(&bob, &tournament, 11, 2))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_complete_after_champion_already_awarded() {
    let app = setup().await;
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;
    let tournament = create_tournament(&app, "alice", "singles").await;
    invite_and_accept(&app, &tournament, "alice", &bob).await;

    let response = app
        .post("/matches", &uid("alice"), &tournament_match(&bob, &tournament, 11, 5))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // An earlier attempt got as far as the badge but never closed the tournament.
    assert!(app.state.badges.award(alice.id, BadgeId::Champion).await.unwrap());
    let details: TournamentDetails =
        body(&app.get(&format!("/tournaments/{}", tournament.id), &uid("alice")).await);
    assert_ne!(details.tournament.status, TournamentStatus::Completed);

    let complete = format!("/tournaments/{}/complete", tournament.id);
    assert_eq!(app.post_empty(&complete, &uid("alice")).await.status(), StatusCode::OK);

    let badges = app.state.badges.badges_for(alice.id).await.unwrap();
    assert_eq!(badges.iter().filter(|b| b.id == BadgeId::Champion).count(), 1);
    let details: TournamentDetails =
        body(&app.get(&format!("/tournaments/{}", tournament.id), &uid("alice")).await);
    assert_eq!(details.tournament.status, TournamentStatus::Completed);
}

#[tokio::test]
async fn test_doubles_participants_name_their_team() {
    let app = setup().await;
    let alice = app.register("alice").await;
    let singles_event = create_tournament(&app, "alice", "singles").await;
    let doubles_event = create_tournament(&app, "alice", "doubles").await;
    let body_json = serde_json::json!({ "team_name": " Dink Dynasty " });

    let response = app
        .post(&format!("/tournaments/{}/team-name", singles_event.id), &uid("alice"), &body_json)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .post(&format!("/tournaments/{}/team-name", doubles_event.id), &uid("alice"), &body_json)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let details: TournamentDetails =
        body(&app.get(&format!("/tournaments/{}", doubles_event.id), &uid("alice")).await);
    let me = details
        .participants
        .iter()
        .find(|p| p.user.id == alice.id)
        .expect("organizer is a participant");
    assert_eq!(me.team_name.as_deref(), Some("Dink Dynasty"));

    app.register("bob").await;
    let response = app
        .post(&format!("/tournaments/{}/team-name", doubles_event.id), &uid("bob"), &body_json)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
