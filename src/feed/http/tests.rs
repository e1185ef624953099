//! Unit tests for the HTTP feed

use super::*;
use crate::cli::types::{NbaTeamId, PlayerId, PlayerStatus};
use crate::core::http::header_map_with_token;
use crate::core::{retry_with_backoff, RetryPolicy};
use serde_json::json;
use wiremock::{
    matchers::{header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

fn feed(server: &MockServer) -> HttpFeed {
    let headers = header_map_with_token(Some("s3cret")).unwrap();
    HttpFeed::with_headers(server.uri(), Duration::from_secs(5), headers)
        .unwrap()
        .with_league_id(LeagueId::new(12345))
}

#[tokio::test]
async fn test_players_request_and_decode() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/players.json"))
        .and(query_param("league_id", "12345"))
        .and(header("accept", "application/json"))
        .and(header("authorization", "Bearer s3cret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "player_id": "1628370", "full_name": "Malik Monk", "team_id": 5,
                  "eligible_positions": ["SG", "G"], "injury_status": "GTD" },
                { "player_id": 1629029 }
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let listing = feed(&mock_server).players().await.unwrap();
    assert_eq!(listing.len(), 2);

    let monk = listing[0].as_ref().unwrap();
    assert_eq!(monk.source_id, Some(PlayerId::new(1628370)));
    assert_eq!(monk.name, "Malik Monk");
    assert_eq!(monk.nba_team, Some(NbaTeamId::new(5)));
    assert_eq!(monk.status, Some(PlayerStatus::GameTimeDecision));
    assert!(matches!(listing[1], Err(SyncError::InvalidRecord { .. })));
}

#[tokio::test]
async fn test_schedule_carries_season() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/schedule.json"))
        .and(query_param("season", "2026"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "date": "2025-10-21", "home_team_name": "Oklahoma City Thunder",
              "visiting_team": "Houston Rockets" }
        ])))
        .mount(&mock_server)
        .await;

    let listing = feed(&mock_server).schedule(Season::new(2026)).await.unwrap();
    let game = listing[0].as_ref().unwrap();
    assert_eq!(game.game_date, NaiveDate::from_ymd_opt(2025, 10, 21).unwrap());
    assert_eq!(game.away_team, "Houston Rockets");
}

#[tokio::test]
async fn test_missing_optional_documents_are_empty() {
    let mock_server = MockServer::start().await;
    let feed = feed(&mock_server);

    let date = NaiveDate::from_ymd_opt(2025, 12, 25).unwrap();
    assert!(feed.box_scores(date).await.unwrap().is_empty());
    assert!(feed.salaries(Season::new(2026)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_required_document_is_permanent() {
    let mock_server = MockServer::start().await;

    match feed(&mock_server).rosters().await {
        Err(e @ SyncError::UpstreamFetch { .. }) => assert!(!e.is_transient()),
        other => panic!("Expected UpstreamFetch, got {:?}", other),
    }
}

#[tokio::test]
async fn test_server_error_is_transient_and_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/nba_teams.json"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/nba_teams.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "name": "Sacramento Kings", "abbreviation": "sac" }
        ])))
        .mount(&mock_server)
        .await;

    let feed = feed(&mock_server);
    match feed.nba_teams().await {
        Err(e) => assert!(e.is_transient()),
        Ok(_) => panic!("Expected a 503 on the first call"),
    }

    let policy = RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(1),
    };
    let listing = retry_with_backoff(&policy, "NBA teams", || feed.nba_teams())
        .await
        .unwrap();
    assert_eq!(listing[0].as_ref().unwrap().team_code, "SAC");
}

#[tokio::test]
async fn test_malformed_body_is_permanent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/match_ups.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&mock_server)
        .await;

    let err = feed(&mock_server).match_ups().await.unwrap_err();
    assert!(!err.is_transient());
}

#[test]
fn test_base_url_trailing_slash() {
    let feed = HttpFeed::with_headers(
        "https://feed.example.com/v1/",
        DEFAULT_TIMEOUT,
        HeaderMap::new(),
    )
    .unwrap();
    assert_eq!(feed.base_url(), "https://feed.example.com/v1");
}

#[tokio::test]
async fn test_default_headers_ask_for_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/nba_teams.json"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1610612760, "name": "Oklahoma City Thunder", "code": "OKC" }
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let feed = HttpFeed::new(mock_server.uri(), Duration::from_secs(5)).unwrap();
    let listing = feed.nba_teams().await.unwrap();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].as_ref().unwrap().team_code, "OKC");
}
