//! Statistics reconciliation and presentation.
//!
//! The stats tables are populated lazily: nothing writes a row when a
//! player is added, instead the reconciler runs at the top of any
//! handler needing the rows and ensures one aggregate row per player
//! plus one season row per (player, season) exists, batching the
//! inserts rather than issuing one query per player.

use crate::{
    database::{
        entities::{player_stats, players, season_stats},
        DatabaseConnection, DbResult,
    },
    utils::types::{PlayerID, SeasonYear},
};
use sea_orm::{
    ActiveModelTrait,
    ActiveValue::{NotSet, Set},
    ConnectionTrait, EntityTrait, IntoActiveModel, TransactionTrait,
};
use std::collections::HashMap;

/// Outcome of ensuring the aggregate rows exist
pub struct AggregateEnsure {
    /// Complete mapping of player name to aggregate row
    pub by_name: HashMap<String, player_stats::Model>,
    /// Whether any row had to be created
    pub created: bool,
}

/// Outcome of ensuring the season rows exist
pub struct SeasonEnsure {
    /// Complete mapping of player ID to season row
    pub by_player: HashMap<PlayerID, season_stats::Model>,
    /// IDs of the players whose rows were just created
    pub created_players: Vec<PlayerID>,
}

impl SeasonEnsure {
    pub fn created(&self) -> bool {
        !self.created_players.is_empty()
    }
}

/// Combined outcome of a [reconcile] run
pub struct ReconcileOutcome {
    pub aggregate: AggregateEnsure,
    pub season: SeasonEnsure,
}

impl ReconcileOutcome {
    /// Whether the run created anything rather than finding every row
    /// already in place
    pub fn created(&self) -> bool {
        self.aggregate.created || self.season.created()
    }
}

/// Ensures every provided player has exactly one aggregate stats row,
/// loading the existing rows in one query and batch inserting the
/// missing ones in one write. The returned mapping includes the
/// freshly inserted rows without requiring a second query.
pub async fn ensure_aggregate<C: ConnectionTrait>(
    db: &C,
    players: &[players::Model],
) -> DbResult<AggregateEnsure> {
    let existing = player_stats::Model::all(db).await?;
    let mut by_name: HashMap<String, player_stats::Model> = existing
        .into_iter()
        .map(|stat| (stat.player.clone(), stat))
        .collect();

    let missing: Vec<player_stats::ActiveModel> = players
        .iter()
        .filter(|player| !by_name.contains_key(&player.name))
        .map(|player| player_stats::ActiveModel {
            id: NotSet,
            player: Set(player.name.clone()),
            goals: Set(0),
            assists: Set(0),
            player_of_match: Set(0),
            clean_sheets: Set(0),
            yellow_cards: Set(0),
            red_cards: Set(0),
        })
        .collect();

    let created = !missing.is_empty();
    if created {
        let inserted = player_stats::Entity::insert_many(missing)
            .exec_with_returning_many(db)
            .await?;
        for stat in inserted {
            by_name.insert(stat.player.clone(), stat);
        }
    }

    Ok(AggregateEnsure { by_name, created })
}

/// Ensures every provided player has exactly one season stats row for
/// the provided season. An empty player list returns an empty mapping
/// without touching the database.
pub async fn ensure_season<C: ConnectionTrait>(
    db: &C,
    players: &[players::Model],
    season_year: SeasonYear,
) -> DbResult<SeasonEnsure> {
    if players.is_empty() {
        return Ok(SeasonEnsure {
            by_player: HashMap::new(),
            created_players: Vec::new(),
        });
    }

    let player_ids: Vec<PlayerID> = players.iter().map(|player| player.id).collect();
    let existing =
        season_stats::Model::by_season_for_players(db, season_year, player_ids).await?;
    let mut by_player: HashMap<PlayerID, season_stats::Model> = existing
        .into_iter()
        .map(|stat| (stat.player_id, stat))
        .collect();

    let created_players: Vec<PlayerID> = players
        .iter()
        .filter(|player| !by_player.contains_key(&player.id))
        .map(|player| player.id)
        .collect();

    if !created_players.is_empty() {
        let missing: Vec<season_stats::ActiveModel> = created_players
            .iter()
            .map(|player_id| season_stats::ActiveModel {
                id: NotSet,
                player_id: Set(*player_id),
                season_year: Set(season_year),
                goals: Set(0),
                assists: Set(0),
                player_of_match: Set(0),
                yellow_cards: Set(0),
                red_cards: Set(0),
            })
            .collect();

        let inserted = season_stats::Entity::insert_many(missing)
            .exec_with_returning_many(db)
            .await?;
        for stat in inserted {
            by_player.insert(stat.player_id, stat);
        }
    }

    Ok(SeasonEnsure {
        by_player,
        created_players,
    })
}

/// Seeds the just-created season rows by copying the counters from
/// the matching aggregate row (by player name). A one-shot copy at
/// creation time, not a live link: rows that already existed are
/// never touched, and later edits to either table are independent.
pub async fn backfill_new_season_rows<C: ConnectionTrait>(
    db: &C,
    players: &[players::Model],
    aggregate: &AggregateEnsure,
    season: &mut SeasonEnsure,
) -> DbResult<()> {
    // Season rows key on identity, the names live on the players
    let names: HashMap<PlayerID, &str> = players
        .iter()
        .map(|player| (player.id, player.name.as_str()))
        .collect();

    for player_id in &season.created_players {
        let base = names
            .get(player_id)
            .and_then(|name| aggregate.by_name.get(*name));
        let base = match base {
            Some(value) => value,
            None => continue,
        };

        let row = match season.by_player.remove(player_id) {
            Some(value) => value,
            None => continue,
        };

        let mut model = row.into_active_model();
        model.goals = Set(base.goals);
        model.assists = Set(base.assists);
        model.player_of_match = Set(base.player_of_match);
        model.yellow_cards = Set(base.yellow_cards);
        model.red_cards = Set(base.red_cards);
        let updated = model.update(db).await?;

        season.by_player.insert(*player_id, updated);
    }

    Ok(())
}

/// Runs the full reconcile flow inside a single transaction: ensure
/// the aggregate rows, ensure the season rows, backfill the new
/// season rows, then commit once so the two tables can never be left
/// partially written.
pub async fn reconcile(
    db: &DatabaseConnection,
    players: &[players::Model],
    season_year: SeasonYear,
) -> DbResult<ReconcileOutcome> {
    let txn = db.begin().await?;

    let aggregate = ensure_aggregate(&txn, players).await?;
    let mut season = ensure_season(&txn, players, season_year).await?;

    if season.created() {
        backfill_new_season_rows(&txn, players, &aggregate, &mut season).await?;
    }

    txn.commit().await?;

    Ok(ReconcileOutcome { aggregate, season })
}

/// Fields the stats tables can be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Player,
    Goals,
    Assists,
    PlayerOfMatch,
    YellowCards,
    RedCards,
}

impl SortField {
    /// Parses a query parameter against the allow-list
    pub fn from_param(value: &str) -> Option<SortField> {
        Some(match value {
            "player" => SortField::Player,
            "goals" => SortField::Goals,
            "assists" => SortField::Assists,
            "player_of_match" => SortField::PlayerOfMatch,
            "yellow_cards" => SortField::YellowCards,
            "red_cards" => SortField::RedCards,
            _ => return None,
        })
    }
}

/// Resolves the raw field name and direction, falling back to player
/// ascending for anything outside the allow-list. Callers validate
/// the field up-front, the fallback is defense in depth only.
fn resolve_sort(field: &str, descending: bool) -> (SortField, bool) {
    match SortField::from_param(field) {
        Some(field) => (field, descending),
        None => (SortField::Player, false),
    }
}

/// Returns a new ordering of the aggregate rows by the provided
/// field. Name sorting is case-folded; the sort is stable so ties
/// keep their original relative order.
pub fn sort_aggregate_stats(
    stats: &[player_stats::Model],
    field: &str,
    descending: bool,
) -> Vec<player_stats::Model> {
    let (field, descending) = resolve_sort(field, descending);

    let mut sorted = stats.to_vec();
    sorted.sort_by(|a, b| {
        let ordering = match field {
            SortField::Player => a.player.to_lowercase().cmp(&b.player.to_lowercase()),
            SortField::Goals => a.goals.cmp(&b.goals),
            SortField::Assists => a.assists.cmp(&b.assists),
            SortField::PlayerOfMatch => a.player_of_match.cmp(&b.player_of_match),
            SortField::YellowCards => a.yellow_cards.cmp(&b.yellow_cards),
            SortField::RedCards => a.red_cards.cmp(&b.red_cards),
        };
        if descending {
            ordering.reverse()
        } else {
            ordering
        }
    });
    sorted
}

/// Returns a new ordering of the season rows by the provided field.
/// The player name is resolved through the linked player, absent
/// links sort as the empty string.
pub fn sort_season_stats(
    stats: &[(season_stats::Model, Option<players::Model>)],
    field: &str,
    descending: bool,
) -> Vec<(season_stats::Model, Option<players::Model>)> {
    let (field, descending) = resolve_sort(field, descending);

    let name_key = |player: &Option<players::Model>| -> String {
        player
            .as_ref()
            .map(|player| player.name.to_lowercase())
            .unwrap_or_default()
    };

    let mut sorted = stats.to_vec();
    sorted.sort_by(|(a, a_player), (b, b_player)| {
        let ordering = match field {
            SortField::Player => name_key(a_player).cmp(&name_key(b_player)),
            SortField::Goals => a.goals.cmp(&b.goals),
            SortField::Assists => a.assists.cmp(&b.assists),
            SortField::PlayerOfMatch => a.player_of_match.cmp(&b.player_of_match),
            SortField::YellowCards => a.yellow_cards.cmp(&b.yellow_cards),
            SortField::RedCards => a.red_cards.cmp(&b.red_cards),
        };
        if descending {
            ordering.reverse()
        } else {
            ordering
        }
    });
    sorted
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::database::{
        connect_test,
        entities::{player_stats, players, season_stats},
    };

    async fn seed_players(db: &DatabaseConnection, names: &[&str]) -> Vec<players::Model> {
        let mut seeded = Vec::with_capacity(names.len());
        for name in names {
            seeded.push(players::Model::create(db, name.to_string()).await.unwrap());
        }
        seeded
    }

    /// Missing aggregate rows are created zero-initialized once, the
    /// second run finds them all and creates nothing
    #[tokio::test]
    async fn test_ensure_aggregate_idempotent() {
        let db = connect_test().await;
        let players = seed_players(&db, &["Ann", "Ben", "Cid"]).await;

        let first = ensure_aggregate(&db, &players).await.unwrap();
        assert!(first.created);
        assert_eq!(first.by_name.len(), 3);
        for player in &players {
            let stat = first.by_name.get(&player.name).expect("Missing stats row");
            assert_eq!(stat.goals, 0);
            assert_eq!(stat.assists, 0);
            assert_eq!(stat.clean_sheets, 0);
        }

        let second = ensure_aggregate(&db, &players).await.unwrap();
        assert!(!second.created);
        assert_eq!(second.by_name.len(), 3);

        // No duplicate rows were written
        let rows = player_stats::Model::all(&db).await.unwrap();
        assert_eq!(rows.len(), 3);
    }

    /// New season rows copy the aggregate counters at creation time,
    /// and later aggregate edits don't propagate backwards
    #[tokio::test]
    async fn test_season_rows_seed_once() {
        let db = connect_test().await;
        let players = seed_players(&db, &["Ann", "Ben"]).await;

        // Give Ann some aggregate history before the season exists
        let aggregate = ensure_aggregate(&db, &players).await.unwrap();
        let ann = aggregate.by_name.get("Ann").unwrap().clone();
        ann.set_counters(&db, 7, 3, 2, 1, 0).await.unwrap();

        let outcome = reconcile(&db, &players, 2026).await.unwrap();
        assert!(outcome.created());

        let ann_season = outcome
            .season
            .by_player
            .get(&players[0].id)
            .expect("Missing season row");
        assert_eq!(ann_season.goals, 7);
        assert_eq!(ann_season.assists, 3);
        assert_eq!(ann_season.player_of_match, 2);
        assert_eq!(ann_season.yellow_cards, 1);

        // Ben had no history, his season row starts at zero
        let ben_season = outcome.season.by_player.get(&players[1].id).unwrap();
        assert_eq!(ben_season.goals, 0);

        // Bump Ann's aggregate and reconcile again: the already
        // created season row keeps its one-time snapshot
        let ann = outcome.aggregate.by_name.get("Ann").unwrap().clone();
        ann.set_counters(&db, 20, 3, 2, 1, 0).await.unwrap();

        let again = reconcile(&db, &players, 2026).await.unwrap();
        assert!(!again.created());
        let ann_season = again.season.by_player.get(&players[0].id).unwrap();
        assert_eq!(ann_season.goals, 7);
    }

    /// An empty roster reconciles to empty mappings without creating
    /// anything
    #[tokio::test]
    async fn test_ensure_season_empty_roster() {
        let db = connect_test().await;

        let season = ensure_season(&db, &[], 2026).await.unwrap();
        assert!(season.by_player.is_empty());
        assert!(!season.created());
    }

    /// A player added after a season was reconciled gets a row on the
    /// next run while existing rows are left alone
    #[tokio::test]
    async fn test_late_joiner_only_creates_missing_row() {
        let db = connect_test().await;
        let mut players = seed_players(&db, &["Ann"]).await;

        let outcome = reconcile(&db, &players, 2026).await.unwrap();
        let ann_row_id = outcome.season.by_player.get(&players[0].id).unwrap().id;

        players.push(players::Model::create(&db, "Ben".to_string()).await.unwrap());

        let again = reconcile(&db, &players, 2026).await.unwrap();
        assert_eq!(again.season.created_players, vec![players[1].id]);
        // Ann keeps her original row
        assert_eq!(again.season.by_player.get(&players[0].id).unwrap().id, ann_row_id);
    }

    fn aggregate_row(id: u32, player: &str, goals: u32) -> player_stats::Model {
        player_stats::Model {
            id,
            player: player.to_string(),
            goals,
            assists: 0,
            player_of_match: 0,
            clean_sheets: 0,
            yellow_cards: 0,
            red_cards: 0,
        }
    }

    /// Name sorting is case-insensitive and reversible
    #[test]
    fn test_sort_by_player_case_folded() {
        let stats = vec![
            aggregate_row(1, "Zed", 0),
            aggregate_row(2, "Ann", 0),
            aggregate_row(3, "mid", 0),
        ];

        let sorted = sort_aggregate_stats(&stats, "player", false);
        let names: Vec<&str> = sorted.iter().map(|stat| stat.player.as_str()).collect();
        assert_eq!(names, ["Ann", "mid", "Zed"]);

        let sorted = sort_aggregate_stats(&stats, "player", true);
        let names: Vec<&str> = sorted.iter().map(|stat| stat.player.as_str()).collect();
        assert_eq!(names, ["Zed", "mid", "Ann"]);
    }

    /// Counter sorting orders numerically and the input is untouched
    #[test]
    fn test_sort_by_counter() {
        let stats = vec![
            aggregate_row(1, "Ann", 2),
            aggregate_row(2, "Ben", 9),
            aggregate_row(3, "Cid", 4),
        ];

        let sorted = sort_aggregate_stats(&stats, "goals", true);
        let goals: Vec<u32> = sorted.iter().map(|stat| stat.goals).collect();
        assert_eq!(goals, [9, 4, 2]);

        // Input order untouched
        assert_eq!(stats[0].player, "Ann");
    }

    /// Anything outside the allow-list behaves as player ascending,
    /// even when descending was requested
    #[test]
    fn test_sort_unknown_field_falls_back() {
        let stats = vec![
            aggregate_row(1, "Zed", 5),
            aggregate_row(2, "Ann", 1),
        ];

        let sorted = sort_aggregate_stats(&stats, "clean_sheets_x", true);
        let names: Vec<&str> = sorted.iter().map(|stat| stat.player.as_str()).collect();
        assert_eq!(names, ["Ann", "Zed"]);
    }

    /// Season rows sort by the linked player's name, absent links
    /// sort as empty string
    #[test]
    fn test_sort_season_resolves_player_names() {
        let season_row = |id: u32, player_id: u32| season_stats::Model {
            id,
            player_id,
            season_year: 2026,
            goals: 0,
            assists: 0,
            player_of_match: 0,
            yellow_cards: 0,
            red_cards: 0,
        };
        let player = |id: u32, name: &str| players::Model {
            id,
            name: name.to_string(),
            preferred_position: None,
            shirt_number: None,
            beer_duty_date: None,
            support_offered: None,
        };

        let stats = vec![
            (season_row(1, 1), Some(player(1, "zara"))),
            (season_row(2, 2), None),
            (season_row(3, 3), Some(player(3, "Ben"))),
        ];

        let sorted = sort_season_stats(&stats, "player", false);
        let ids: Vec<u32> = sorted.iter().map(|(stat, _)| stat.id).collect();
        assert_eq!(ids, [2, 3, 1]);
    }
}
