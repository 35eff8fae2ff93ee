//! Integration tests for the event bounded context.

mod common;

use std::collections::HashMap;
use std::time::Duration;

use axum::http::StatusCode;
use serde_json::{Value, json};

/// Registers four Jokeren and four Rikken players and returns the event id
/// and participant ids in registration order.
async fn registered_event(state: &kaartmiddag_api::state::AppState) -> (String, Vec<String>) {
    let (status, event) = common::post_json(
        common::build_test_app(state),
        "/api/v1/events",
        &json!({ "title": "Kaartmiddag september" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let event_id = event["id"].as_str().unwrap().to_owned();

    let mut last = Value::Null;
    for (name, game) in [
        ("a", "Jokeren"),
        ("b", "Jokeren"),
        ("c", "Jokeren"),
        ("d", "Jokeren"),
        ("e", "Rikken"),
        ("f", "Rikken"),
        ("g", "Rikken"),
        ("h", "Rikken"),
    ] {
        let (status, json) = common::post_json(
            common::build_test_app(state),
            &format!("/api/v1/events/{event_id}/participants"),
            &json!({ "name": name, "game": game }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        last = json;
    }
    let participants = last["participants"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap().to_owned())
        .collect();
    (event_id, participants)
}

/// Starts the next round, seats everyone at table 1 of their game and enters
/// the given scores in registration order.
async fn play_round(
    state: &kaartmiddag_api::state::AppState,
    event_id: &str,
    round_index: usize,
    players: &[String],
    scores: [i64; 8],
) {
    let (status, _) = common::post_empty(
        common::build_test_app(state),
        &format!("/api/v1/events/{event_id}/start-round"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let numbers: HashMap<&str, &str> = players.iter().map(|p| (p.as_str(), "1")).collect();
    let (status, _) = common::post_json(
        common::build_test_app(state),
        &format!("/api/v1/events/{event_id}/rounds/{round_index}/tables"),
        &json!({ "tableNumbers": numbers }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    for (player, score) in players.iter().zip(scores) {
        let (status, _) = common::post_json(
            common::build_test_app(state),
            &format!("/api/v1/events/{event_id}/rounds/{round_index}/scores"),
            &json!({ "participantId": player, "value": score.to_string() }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
}

fn names(game: &Value) -> Vec<&str> {
    game["standings"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_full_afternoon_from_registration_to_results() {
    // Arrange
    let state = common::test_state();
    let (event_id, players) = registered_event(&state).await;

    // Act
    play_round(&state, &event_id, 0, &players, [5, -5, 10, -10, 3, -3, 1, -1]).await;
    let (finished, _) = common::post_empty(
        common::build_test_app(&state),
        &format!("/api/v1/events/{event_id}/finish-round"),
    )
    .await;
    play_round(&state, &event_id, 1, &players, [0; 8]).await;
    let (closed, event) = common::post_empty(
        common::build_test_app(&state),
        &format!("/api/v1/events/{event_id}/finish-event"),
    )
    .await;
    let (status, results) = common::get_json(
        common::build_test_app(&state),
        &format!("/api/v1/events/{event_id}/results"),
    )
    .await;

    // Assert
    assert_eq!(finished, StatusCode::OK);
    assert_eq!(closed, StatusCode::OK);
    assert_eq!(event["status"], "RESULTS");
    assert_eq!(status, StatusCode::OK);

    let jokeren = &results["games"][0];
    assert_eq!(jokeren["game"], "Jokeren");
    assert_eq!(names(jokeren), vec!["c", "a", "b", "d"]);
    assert_eq!(jokeren["standings"][0]["roundScores"], json!([10, 0]));
    assert_eq!(jokeren["standings"][3]["isPoedelPrize"], true);
    assert_eq!(jokeren["standings"][1]["hasPositivePrize"], true);
    assert_eq!(jokeren["standings"][2]["hasPositivePrize"], false);

    let rikken = &results["games"][1];
    assert_eq!(names(rikken), vec!["e", "g", "h", "f"]);
    assert_eq!(rikken["standings"][3]["isPoedelPrize"], true);
}

#[tokio::test]
async fn test_extreme_scores_cannot_wrap_a_table_into_balance() {
    // Arrange
    let state = common::test_state();
    let (event_id, players) = registered_event(&state).await;
    let max = i64::MAX;
    play_round(&state, &event_id, 0, &players, [max, max, 1, 1, 0, 0, 0, 0]).await;

    // Act
    let (status, error) = common::post_empty(
        common::build_test_app(&state),
        &format!("/api/v1/events/{event_id}/finish-round"),
    )
    .await;
    let (_, balance) = common::get_json(
        common::build_test_app(&state),
        &format!("/api/v1/events/{event_id}/rounds/0/balance"),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error["details"]["kind"], "unbalanced_tables");
    assert!(
        error["message"]
            .as_str()
            .unwrap()
            .contains("Jokeren table 1 sums to 18446744073709551616")
    );
    assert_eq!(balance["balanced"], false);
}

#[tokio::test]
async fn test_results_status_locks_everything_but_rename() {
    // Arrange
    let state = common::test_state();
    let (event_id, players) = registered_event(&state).await;
    play_round(&state, &event_id, 0, &players, [0; 8]).await;
    common::post_empty(
        common::build_test_app(&state),
        &format!("/api/v1/events/{event_id}/finish-round"),
    )
    .await;
    play_round(&state, &event_id, 1, &players, [0; 8]).await;
    common::post_empty(
        common::build_test_app(&state),
        &format!("/api/v1/events/{event_id}/finish-event"),
    )
    .await;

    // Act
    let (added, _) = common::post_json(
        common::build_test_app(&state),
        &format!("/api/v1/events/{event_id}/participants"),
        &json!({ "name": "laatkomer", "game": "Rikken" }),
    )
    .await;
    let (reset, _) = common::post_empty(
        common::build_test_app(&state),
        &format!("/api/v1/events/{event_id}/rounds/0/reset"),
    )
    .await;
    let (renamed, event) = common::post_json(
        common::build_test_app(&state),
        &format!("/api/v1/events/{event_id}/rename"),
        &json!({ "title": "Kaartmiddag oktober" }),
    )
    .await;

    // Assert
    assert_eq!(added, StatusCode::CONFLICT);
    assert_eq!(reset, StatusCode::CONFLICT);
    assert_eq!(renamed, StatusCode::OK);
    assert_eq!(event["title"], "Kaartmiddag oktober");
}

#[tokio::test]
async fn test_reset_tables_allows_correcting_a_finished_round() {
    // Arrange
    let state = common::test_state();
    let (event_id, players) = registered_event(&state).await;
    play_round(&state, &event_id, 0, &players, [1, -1, 0, 0, 0, 0, 0, 0]).await;
    common::post_empty(
        common::build_test_app(&state),
        &format!("/api/v1/events/{event_id}/finish-round"),
    )
    .await;

    // Act
    let (status, event) = common::post_empty(
        common::build_test_app(&state),
        &format!("/api/v1/events/{event_id}/rounds/0/reset"),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(event["status"], "ROUND1");
    assert_eq!(event["rounds"][0]["finished"], false);
    assert_eq!(event["rounds"][0]["tables"], json!([]));
    assert_eq!(event["rounds"][0]["scores"], json!({}));
}

#[tokio::test]
async fn test_change_game_is_refused_once_seated() {
    // Arrange
    let state = common::test_state();
    let (event_id, players) = registered_event(&state).await;
    let uri = format!("/api/v1/events/{event_id}/participants/{}/game", players[0]);
    let (before, event) =
        common::post_json(common::build_test_app(&state), &uri, &json!({ "game": "Rikken" }))
            .await;
    common::post_json(common::build_test_app(&state), &uri, &json!({ "game": "Jokeren" })).await;
    play_round(&state, &event_id, 0, &players, [0; 8]).await;

    // Act
    let (after, error) =
        common::post_json(common::build_test_app(&state), &uri, &json!({ "game": "Rikken" }))
            .await;

    // Assert
    assert_eq!(before, StatusCode::OK);
    assert_eq!(event["participants"][0]["game"], "Rikken");
    assert_eq!(after, StatusCode::CONFLICT);
    assert_eq!(error["error"], "invalid_transition");
}

#[tokio::test]
async fn test_catalog_follows_store_changes() {
    // Arrange
    let state = common::test_state();
    let watcher = std::sync::Arc::clone(&state.catalog).watch().unwrap();

    // Act
    common::post_json(
        common::build_test_app(&state),
        "/api/v1/events",
        &json!({ "title": "Kaartmiddag september" }),
    )
    .await;

    // Assert
    let mut listed = Value::Null;
    for _ in 0..100 {
        let (_, json) = common::get_json(common::build_test_app(&state), "/api/v1/events").await;
        if json.as_array().is_some_and(|events| !events.is_empty()) {
            listed = json;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(listed[0]["title"], "Kaartmiddag september");
    assert_eq!(listed[0]["status"], "REGISTRATION");
    assert_eq!(listed[0]["participantCount"], 0);
    watcher.abort();
}
