//! Unit tests for storage functionality

use super::*;
use crate::cli::types::{FantasyTeamId, NbaTeamId, PlayerId, PlayerStatus, Position, Week};
use crate::error::SyncError;
use chrono::NaiveDate;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn create_test_db() -> LeagueDatabase {
    LeagueDatabase::new_in_memory().unwrap()
}

fn create_test_db_with_teams() -> LeagueDatabase {
    let db = create_test_db();

    db.insert_nba_team(&NbaTeam {
        team_id: NbaTeamId::new(1),
        team_name: "Chicago Bulls".to_string(),
        team_code: "CHI".to_string(),
    })
    .unwrap();
    db.insert_nba_team(&NbaTeam {
        team_id: NbaTeamId::new(2),
        team_name: "Portland Trail Blazers".to_string(),
        team_code: "POR".to_string(),
    })
    .unwrap();
    db.insert_fantasy_team(&FantasyTeam {
        team_id: FantasyTeamId::new(1),
        team_name: "Jo Quinoa".to_string(),
        manager: "Joakim".to_string(),
    })
    .unwrap();

    db
}

fn test_player(id: u64, name: &str) -> Player {
    let mut player = Player::new(PlayerId::new(id), name);
    player.nba_team_id = Some(NbaTeamId::new(1));
    player.positions = [Position::SG, Position::SF].into();
    player
}

#[test]
fn test_database_creation() {
    let db = create_test_db();
    assert_eq!(db.counts().unwrap(), StoreCounts::default());
}

#[test]
fn test_insert_and_get_player_with_defaults() {
    let db = create_test_db_with_teams();

    let player = test_player(23, "Michael Jordan");
    db.insert_player(&player).unwrap();

    let stored = db.get_player(PlayerId::new(23)).unwrap().unwrap();
    assert_eq!(stored, player);
    assert_eq!(stored.status, PlayerStatus::Active);
    assert!(stored.is_available);
    assert_eq!(stored.salary, None);
}

#[test]
fn test_get_player_nonexistent() {
    let db = create_test_db();
    assert!(db.get_player(PlayerId::new(999)).unwrap().is_none());
    assert!(!db.player_exists(PlayerId::new(999)).unwrap());
}

#[test]
fn test_update_player_keeps_name_and_aliases() {
    let db = create_test_db_with_teams();
    let mut player = test_player(33, "Scottie Pippen");
    player.aliases.insert("Pip".to_string());
    db.insert_player(&player).unwrap();

    let mut changed = player.clone();
    changed.name = "Somebody Else".to_string();
    changed.salary = Some(18_000_000);
    changed.status = PlayerStatus::Injured;
    changed.nba_team_id = Some(NbaTeamId::new(2));
    db.update_player(&changed).unwrap();

    let stored = db.get_player(PlayerId::new(33)).unwrap().unwrap();
    assert_eq!(stored.name, "Scottie Pippen");
    assert_eq!(stored.salary, Some(18_000_000));
    assert_eq!(stored.status, PlayerStatus::Injured);
    assert_eq!(stored.nba_team_id, Some(NbaTeamId::new(2)));
    assert!(stored.aliases.contains("Pip"));
}

#[test]
fn test_add_alias_is_idempotent() {
    let db = create_test_db_with_teams();
    db.insert_player(&test_player(5, "Mohamed Bamba")).unwrap();

    assert!(db.add_alias(PlayerId::new(5), "Mo Bamba").unwrap());
    assert!(!db.add_alias(PlayerId::new(5), "Mo Bamba").unwrap());

    let aliases = db.get_aliases(PlayerId::new(5)).unwrap();
    assert_eq!(aliases.len(), 1);

    let all = db.all_aliases().unwrap();
    assert!(all[&PlayerId::new(5)].contains("Mo Bamba"));
}

#[test]
fn test_player_foreign_key_on_nba_team() {
    let db = create_test_db();
    let mut player = Player::new(PlayerId::new(1), "Nobody");
    player.nba_team_id = Some(NbaTeamId::new(42));

    match db.insert_player(&player) {
        Err(SyncError::ConstraintViolation(_)) => (),
        other => panic!("Expected ConstraintViolation, got {:?}", other),
    }
}

#[test]
fn test_next_player_id() {
    let db = create_test_db_with_teams();
    assert_eq!(db.next_player_id().unwrap(), PlayerId::new(1));

    db.insert_player(&test_player(41, "Dirk Nowitzki")).unwrap();
    assert_eq!(db.next_player_id().unwrap(), PlayerId::new(42));
}

#[test]
fn test_find_nba_team_by_name_or_code() {
    let db = create_test_db_with_teams();

    let by_name = db.find_nba_team("chicago bulls").unwrap().unwrap();
    assert_eq!(by_name.team_id, NbaTeamId::new(1));

    let by_code = db.find_nba_team("por").unwrap().unwrap();
    assert_eq!(by_code.team_name, "Portland Trail Blazers");

    assert!(db.find_nba_team("Seattle SuperSonics").unwrap().is_none());
}

#[test]
fn test_roster_player_on_one_team_only() {
    let db = create_test_db_with_teams();
    db.insert_fantasy_team(&FantasyTeam {
        team_id: FantasyTeamId::new(2),
        team_name: "Comin' Up Rose's".to_string(),
        manager: "Derrick".to_string(),
    })
    .unwrap();
    db.insert_player(&test_player(1, "Zach LaVine")).unwrap();

    let entry = RosterEntry {
        player_id: PlayerId::new(1),
        team_id: FantasyTeamId::new(1),
    };
    db.insert_roster_entry(&entry).unwrap();

    let elsewhere = RosterEntry {
        player_id: PlayerId::new(1),
        team_id: FantasyTeamId::new(2),
    };
    assert!(matches!(
        db.insert_roster_entry(&elsewhere),
        Err(SyncError::ConstraintViolation(_))
    ));

    assert!(db.delete_roster_entry(&entry).unwrap());
    db.insert_roster_entry(&elsewhere).unwrap();

    let entries = db.list_roster_entries().unwrap();
    assert_eq!(entries.into_iter().collect::<Vec<_>>(), vec![elsewhere]);
}

#[test]
fn test_schedule_dates_between() {
    let db = create_test_db_with_teams();
    for (day, home, away) in [(19, 1, 2), (19, 2, 1), (21, 1, 2), (23, 2, 1)] {
        db.insert_schedule_entry(&ScheduleEntry {
            game_date: date(2025, 11, day),
            home_team_id: NbaTeamId::new(home),
            away_team_id: NbaTeamId::new(away),
        })
        .unwrap();
    }

    let all = db.schedule_dates_between(None, date(2025, 11, 22)).unwrap();
    assert_eq!(all, vec![date(2025, 11, 19), date(2025, 11, 21)]);

    let from = db
        .schedule_dates_between(Some(date(2025, 11, 21)), date(2025, 12, 1))
        .unwrap();
    assert_eq!(from, vec![date(2025, 11, 21), date(2025, 11, 23)]);
}

#[test]
fn test_match_up_round_trip() {
    let db = create_test_db_with_teams();
    let match_up = MatchUp {
        team_id: FantasyTeamId::new(1),
        week: Week::new(3),
        week_start: date(2025, 11, 3),
        week_end: date(2025, 11, 9),
        is_playoffs: false,
    };
    db.insert_match_up(&match_up).unwrap();

    let stored = db
        .get_match_up(FantasyTeamId::new(1), Week::new(3))
        .unwrap()
        .unwrap();
    assert_eq!(stored, match_up);
    assert!(db
        .get_match_up(FantasyTeamId::new(1), Week::new(4))
        .unwrap()
        .is_none());
}

#[test]
fn test_game_log_and_latest_date() {
    let db = create_test_db_with_teams();
    db.insert_player(&test_player(1, "Zach LaVine")).unwrap();
    assert_eq!(db.latest_game_date().unwrap(), None);

    let entry = GameLogEntry {
        player_id: PlayerId::new(1),
        game_date: date(2025, 11, 19),
        stats: StatLine {
            minutes: 36,
            points: 33,
            rebounds: 6,
            three_pointers: 2,
            turnovers: 4,
            ..StatLine::default()
        },
    };
    db.insert_game_log(&entry).unwrap();

    assert_eq!(
        db.get_game_log(PlayerId::new(1), date(2025, 11, 19)).unwrap(),
        Some(entry.clone())
    );
    assert_eq!(db.latest_game_date().unwrap(), Some(date(2025, 11, 19)));
    assert!(matches!(
        db.insert_game_log(&entry),
        Err(SyncError::ConstraintViolation(_))
    ));
}

#[test]
fn test_transaction_rolls_back_on_error() {
    let db = create_test_db_with_teams();

    let result: crate::Result<()> = db.in_transaction(|tx| {
        tx.insert_player(&test_player(7, "Rolled Back"))?;
        Err(SyncError::ConstraintViolation("forced".to_string()))
    });
    assert!(result.is_err());
    assert!(!db.player_exists(PlayerId::new(7)).unwrap());

    db.in_transaction(|tx| tx.insert_player(&test_player(8, "Committed")))
        .unwrap();
    assert!(db.player_exists(PlayerId::new(8)).unwrap());
}

#[test]
fn test_season_reset_keeps_players_and_schedule() {
    let db = create_test_db_with_teams();
    db.insert_player(&test_player(1, "Zach LaVine")).unwrap();
    db.insert_roster_entry(&RosterEntry {
        player_id: PlayerId::new(1),
        team_id: FantasyTeamId::new(1),
    })
    .unwrap();

    db.season_reset().unwrap();

    let counts = db.counts().unwrap();
    assert_eq!(counts.rosters, 0);
    assert_eq!(counts.fantasy_teams, 0);
    assert_eq!(counts.players, 1);
    assert_eq!(counts.nba_teams, 2);
}
