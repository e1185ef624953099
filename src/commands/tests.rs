//! Tests for command handlers against a temporary store and snapshot feed

use super::aliases::{handle_alias_add, handle_alias_list};
use super::common::{build_feed, load_settings, ConfigOverrides};
use super::season::{handle_init_season, handle_update_season, SeasonParams};
use super::status::handle_status;
use crate::cli::types::{PlayerId, Season};
use crate::config::HoopsConfig;
use crate::error::SyncError;
use chrono::NaiveDate;
use serde_json::json;
use std::path::Path;
use tempfile::TempDir;

fn write_json(dir: &Path, file: &str, value: serde_json::Value) {
    let path = dir.join(file);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, serde_json::to_vec(&value).unwrap()).unwrap();
}

fn write_snapshot(dir: &Path) {
    write_json(
        dir,
        "fantasy_teams.json",
        json!([{ "team_id": 1, "team_name": "Jo Quinoa", "manager": "Ann" }]),
    );
    write_json(
        dir,
        "nba_teams.json",
        json!([
            { "team_id": 1, "team_name": "Chicago Bulls", "team_code": "CHI" },
            { "team_id": 2, "team_name": "Phoenix Suns", "team_code": "PHX" }
        ]),
    );
    write_json(
        dir,
        "players.json",
        json!([
            { "id": 10, "name": "Zach LaVine", "team_id": 1, "positions": ["SG", "G"] },
            { "id": 11, "name": "Devin Booker", "team_id": 2, "injury_status": "DTD" }
        ]),
    );
    write_json(
        dir,
        "salaries.json",
        json!([{ "name": "Zach LaVine", "salary": "$43,031,940" }]),
    );
    write_json(
        dir,
        "rosters.json",
        json!([{ "team_id": 1, "player_name": "Zach LaVine" }]),
    );
    write_json(
        dir,
        "schedule.json",
        json!([{ "date": "2025-10-22", "home_team": "Chicago Bulls", "visiting_team": "PHX" }]),
    );
    write_json(
        dir,
        "match_ups.json",
        json!([{
            "team_id": 1, "week": 1,
            "week_start": "2025-10-21", "week_end": "2025-10-26"
        }]),
    );
    write_json(
        dir,
        "box_scores/2025-10-22.json",
        json!([
            { "player": "Zach LaVine", "tm": "CHI", "mp": "36", "pts": 31, "trb": 5 },
            { "player": "Devin Booker", "tm": "PHX", "mp": 38, "pts": "27", "ast": 8 }
        ]),
    );
}

struct Workspace {
    _dir: TempDir,
    overrides: ConfigOverrides,
}

fn workspace() -> Workspace {
    let dir = TempDir::new().unwrap();
    let snapshot = dir.path().join("feed");
    write_snapshot(&snapshot);

    let config = dir.path().join("hoops-sync.toml");
    std::fs::write(&config, "season = 2026\n\n[retry]\nmax_attempts = 1\n").unwrap();

    let overrides = ConfigOverrides {
        config: Some(config),
        database: Some(dir.path().join("db").join("league.db")),
        snapshot_dir: Some(snapshot),
        ..ConfigOverrides::default()
    };
    Workspace {
        _dir: dir,
        overrides,
    }
}

fn params(ws: &Workspace) -> SeasonParams {
    SeasonParams {
        overrides: ws.overrides.clone(),
        as_of: NaiveDate::from_ymd_opt(2025, 10, 23),
        ..SeasonParams::default()
    }
}

#[test]
fn test_flags_override_file_feed() {
    let mut config = HoopsConfig::from_toml_str(
        r#"
        [feed]
        api_url = "https://feed.example.com"
        "#,
    )
    .unwrap();

    ConfigOverrides {
        snapshot_dir: Some("/tmp/snap".into()),
        season: Some(Season::new(2025)),
        ..ConfigOverrides::default()
    }
    .apply(&mut config);

    assert_eq!(config.feed.api_url, None);
    assert_eq!(config.feed.snapshot_dir, Some("/tmp/snap".into()));
    assert_eq!(config.season, Some(Season::new(2025)));
}

#[test]
fn test_missing_explicit_config_is_an_error() {
    let overrides = ConfigOverrides {
        config: Some("/definitely/not/here/hoops-sync.toml".into()),
        ..ConfigOverrides::default()
    };
    assert!(matches!(
        load_settings(&overrides),
        Err(SyncError::Config { .. })
    ));
}

#[test]
fn test_http_feed_needs_league_id() {
    let mut config = HoopsConfig::default();
    config.feed.api_url = Some("https://feed.example.com".to_string());
    config.league_id = Some("4242".parse().unwrap());
    let feed = build_feed(&config).unwrap();
    assert!(feed.source_name().contains("feed.example.com"));
}

#[tokio::test]
async fn test_init_then_update_is_idempotent() {
    let ws = workspace();

    let first = handle_init_season(params(&ws)).await.unwrap();
    assert!(first.is_complete());
    assert!(first.net_changes() > 0);

    let second = handle_update_season(params(&ws)).await.unwrap();
    assert!(second.is_complete());
    assert_eq!(second.net_changes(), 0);

    let counts = handle_status(&ws.overrides, true).unwrap();
    assert_eq!(counts.players, 2);
    assert_eq!(counts.rosters, 1);
    assert_eq!(counts.game_logs, 2);
    assert_eq!(counts.latest_game_date, NaiveDate::from_ymd_opt(2025, 10, 22));
}

#[tokio::test]
async fn test_alias_commands() {
    let ws = workspace();
    handle_init_season(params(&ws)).await.unwrap();

    assert!(handle_alias_add(&ws.overrides, PlayerId::new(10), "Zach La Vine").unwrap());
    assert!(!handle_alias_add(&ws.overrides, PlayerId::new(10), "Zach La Vine").unwrap());
    assert!(matches!(
        handle_alias_add(&ws.overrides, PlayerId::new(10), "Devin Booker"),
        Err(SyncError::InvalidRecord { .. })
    ));

    let all = handle_alias_list(&ws.overrides, None, true).unwrap();
    assert_eq!(all.len(), 1);
    assert!(all[&PlayerId::new(10)].contains("Zach La Vine"));

    let none = handle_alias_list(&ws.overrides, Some(PlayerId::new(11)), false).unwrap();
    assert!(none.is_empty());
}
