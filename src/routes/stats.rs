use crate::{
    database::{
        entities::{player_stats, players, season_stats, Player},
        DatabaseConnection, DbErr,
    },
    middleware::auth::{AdminAuth, Auth},
    services::stats::{self, SortField},
    utils::types::SeasonYear,
};
use axum::{
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Extension, Form, Json, Router,
};
use log::debug;
use sea_orm::TransactionTrait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;
use thiserror::Error;

/// Season shown in its own table alongside the aggregate counters
const UPCOMING_SEASON: SeasonYear = 2026;

/// Router function creates a new router with all the underlying
/// routes for this file.
///
/// Prefix: /api/stats
pub fn router() -> Router {
    Router::new().route("/", get(get_stats).post(update_stats))
}

/// Enum for errors that could occur when accessing any of
/// the stats routes
#[derive(Debug, Error)]
enum StatsError {
    /// Database error
    #[error("Internal server error")]
    ServerError,
}

type StatsResult<T> = Result<T, StatsError>;

fn default_sort() -> String {
    "player".to_string()
}

fn default_order() -> String {
    "asc".to_string()
}

/// Sorting parameters for the two stats tables
#[derive(Deserialize)]
struct StatsQuery {
    /// Sort field for the aggregate table
    #[serde(default = "default_sort")]
    sort: String,
    /// Sort direction for the aggregate table, "asc" or "desc"
    #[serde(default = "default_order")]
    order: String,
    /// Sort field for the season table
    #[serde(default = "default_sort")]
    season_sort: String,
    /// Sort direction for the season table
    #[serde(default = "default_order")]
    season_order: String,
}

/// Validates a requested sort field against the allow-list, anything
/// unknown becomes the player name sort
fn sanitize_sort(field: &str) -> &str {
    match SortField::from_param(field) {
        Some(_) => field,
        None => "player",
    }
}

/// One season table row with the player name resolved through the
/// linked roster entry
#[derive(Serialize)]
struct SeasonStatEntry {
    #[serde(flatten)]
    stat: season_stats::Model,
    player: Option<String>,
}

#[derive(Serialize)]
struct StatsResponse {
    /// Aggregate counters, one row per player
    stats: Vec<player_stats::Model>,
    /// The year the season table covers
    season_year: SeasonYear,
    /// Season counters, one row per player
    season_stats: Vec<SeasonStatEntry>,
}

/// Loads the roster and reconciles both stats tables against it,
/// returning the roster alongside the outcome
async fn load_reconciled(
    db: &DatabaseConnection,
) -> StatsResult<(Vec<players::Model>, stats::ReconcileOutcome)> {
    let start = Instant::now();
    let players = Player::all_by_name(db).await?;
    let outcome = stats::reconcile(db, &players, UPCOMING_SEASON).await?;
    debug!(
        "Stats reconcile took {:?} (created rows: {})",
        start.elapsed(),
        outcome.created()
    );
    Ok((players, outcome))
}

/// GET /api/stats
///
/// Retrieves the aggregate and season tables, reconciling missing
/// rows first so every roster player appears in both
async fn get_stats(
    Extension(db): Extension<DatabaseConnection>,
    _auth: Auth,
    Query(query): Query<StatsQuery>,
) -> StatsResult<Json<StatsResponse>> {
    let (players, outcome) = load_reconciled(&db).await?;

    let aggregate: Vec<player_stats::Model> =
        outcome.aggregate.by_name.values().cloned().collect();
    let aggregate = stats::sort_aggregate_stats(
        &aggregate,
        sanitize_sort(&query.sort),
        query.order == "desc",
    );

    let season: Vec<(season_stats::Model, Option<players::Model>)> = players
        .iter()
        .filter_map(|player| {
            let stat = outcome.season.by_player.get(&player.id)?;
            Some((stat.clone(), Some(player.clone())))
        })
        .collect();
    let season = stats::sort_season_stats(
        &season,
        sanitize_sort(&query.season_sort),
        query.season_order == "desc",
    );

    Ok(Json(StatsResponse {
        stats: aggregate,
        season_year: UPCOMING_SEASON,
        season_stats: season
            .into_iter()
            .map(|(stat, player)| SeasonStatEntry {
                stat,
                player: player.map(|player| player.name),
            })
            .collect(),
    }))
}

/// Reads one submitted counter. A missing field counts as zero while
/// a present but non-numeric value yields None so the caller can
/// skip the row.
fn counter_value(form: &HashMap<String, String>, key: String) -> Option<u32> {
    match form.get(&key) {
        Some(value) => value.parse().ok(),
        None => Some(0),
    }
}

/// Reads the five submitted counters for a row keyed by the provided
/// ID, or None when any of them fails to parse
fn counter_row(form: &HashMap<String, String>, id: u32) -> Option<(u32, u32, u32, u32, u32)> {
    Some((
        counter_value(form, format!("goals_{id}"))?,
        counter_value(form, format!("assists_{id}"))?,
        counter_value(form, format!("player_of_match_{id}"))?,
        counter_value(form, format!("yellow_cards_{id}"))?,
        counter_value(form, format!("red_cards_{id}"))?,
    ))
}

/// POST /api/stats
///
/// Bulk counter update for one of the two tables, selected by the
/// `season_year` form field. The season table keys its fields by
/// player ID while the aggregate table keys by stats row ID. Rows
/// with any non-numeric counter are skipped, leaving their stored
/// values unchanged.
async fn update_stats(
    Extension(db): Extension<DatabaseConnection>,
    _auth: AdminAuth,
    Form(form): Form<HashMap<String, String>>,
) -> StatsResult<StatusCode> {
    let (players, outcome) = load_reconciled(&db).await?;

    let start = Instant::now();
    let season_year = form
        .get("season_year")
        .map(|value| value.as_str())
        .unwrap_or("2025");

    let txn = db.begin().await?;

    if season_year == "2026" {
        for player in &players {
            let stat = match outcome.season.by_player.get(&player.id) {
                Some(stat) => stat.clone(),
                None => continue,
            };
            if let Some((goals, assists, potm, yellow, red)) = counter_row(&form, player.id) {
                stat.set_counters(&txn, goals, assists, potm, yellow, red)
                    .await?;
            }
        }
    } else {
        for stat in outcome.aggregate.by_name.values() {
            if let Some((goals, assists, potm, yellow, red)) = counter_row(&form, stat.id) {
                stat.clone()
                    .set_counters(&txn, goals, assists, potm, yellow, red)
                    .await?;
            }
        }
    }

    txn.commit().await?;
    debug!("Stats update ({season_year}) took {:?}", start.elapsed());

    Ok(StatusCode::OK)
}

impl From<DbErr> for StatsError {
    fn from(_: DbErr) -> Self {
        StatsError::ServerError
    }
}

/// IntoResponse implementation for StatsError to allow it to be
/// used within the result type as a error response
impl IntoResponse for StatsError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod test {
    use super::{counter_row, counter_value, router, sanitize_sort, UPCOMING_SEASON};
    use crate::{
        database::{
            connect_test,
            entities::{player_stats, Player},
        },
        services::{sessions::Sessions, stats},
    };
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
        Extension,
    };
    use std::collections::HashMap;
    use std::sync::Arc;
    use tower::ServiceExt;

    #[test]
    fn test_counter_value_defaults_missing_to_zero() {
        let form: HashMap<String, String> = HashMap::new();
        assert_eq!(counter_value(&form, "goals_1".to_string()), Some(0));
    }

    #[test]
    fn test_counter_row_skips_bad_values() {
        let mut form = HashMap::new();
        form.insert("goals_1".to_string(), "4".to_string());
        form.insert("assists_1".to_string(), "three".to_string());

        // One bad counter rejects the whole row
        assert_eq!(counter_row(&form, 1), None);

        form.insert("assists_1".to_string(), "3".to_string());
        assert_eq!(counter_row(&form, 1), Some((4, 3, 0, 0, 0)));
    }

    #[test]
    fn test_sanitize_sort() {
        assert_eq!(sanitize_sort("goals"), "goals");
        assert_eq!(sanitize_sort("player"), "player");
        assert_eq!(sanitize_sort("clean_sheets"), "player");
        assert_eq!(sanitize_sort("drop table"), "player");
    }

    /// A submission with one non-numeric counter row leaves that row
    /// at its stored values while the sibling rows update
    #[tokio::test]
    async fn test_bad_counter_row_skipped_others_update() {
        let db = connect_test().await;
        let ann = Player::create(&db, "Ann".to_string()).await.unwrap();
        let ben = Player::create(&db, "Ben".to_string()).await.unwrap();

        let roster = vec![ann, ben];
        let outcome = stats::reconcile(&db, &roster, UPCOMING_SEASON).await.unwrap();
        let ann_stat = outcome.aggregate.by_name.get("Ann").unwrap().clone();
        let ben_stat = outcome.aggregate.by_name.get("Ben").unwrap().clone();

        // Give Ann stored counters the bad row must not disturb
        let ann_stat = ann_stat.set_counters(&db, 2, 1, 0, 0, 0).await.unwrap();

        let sessions = Arc::new(Sessions::new());
        let token = sessions.create_admin();
        let app = router()
            .layer(Extension(db.clone()))
            .layer(Extension(sessions));

        let body = format!(
            "goals_{}=oops&goals_{}=9&assists_{}=3",
            ann_stat.id, ben_stat.id, ben_stat.id
        );
        let req = Request::builder()
            .uri("/")
            .method(Method::POST)
            .header("X-Token", &token)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let rows = player_stats::Model::all(&db).await.unwrap();
        let ann_row = rows.iter().find(|row| row.player == "Ann").unwrap();
        let ben_row = rows.iter().find(|row| row.player == "Ben").unwrap();

        assert_eq!(ann_row.goals, 2);
        assert_eq!(ann_row.assists, 1);
        assert_eq!(ben_row.goals, 9);
        assert_eq!(ben_row.assists, 3);
        // Counters Ben's row didn't submit reset to zero
        assert_eq!(ben_row.player_of_match, 0);
    }
}
