use crate::{
    database::{
        entities::{
            events::{AssistEntry, Cards, GoalScorer, MatchResult},
            Event,
        },
        DatabaseConnection, DbErr,
    },
    middleware::auth::{AdminAuth, Auth},
    utils::types::EventID,
};
use axum::{
    extract::Path,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Extension, Json, Router,
};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Router function creates a new router with all the underlying
/// routes for this file.
///
/// Prefix: /api/results
pub fn router() -> Router {
    Router::new()
        .route("/", get(get_results))
        .route("/{id}", axum::routing::put(update_result).delete(delete_result))
}

/// Enum for errors that could occur when accessing any of
/// the results routes
#[derive(Debug, Error)]
enum ResultsError {
    /// The event with the requested ID was not found
    #[error("Unable to find requested event")]
    EventNotFound,
    /// Database error
    #[error("Internal server error")]
    ServerError,
}

type ResultsResult<T> = Result<T, ResultsError>;

/// Response grouping every match by calendar year
#[derive(Serialize)]
struct ResultsResponse {
    events_by_year: BTreeMap<i32, Vec<Event>>,
}

/// GET /api/results
///
/// Retrieves every match with its result grouped by year
async fn get_results(
    Extension(db): Extension<DatabaseConnection>,
    _auth: Auth,
) -> ResultsResult<Json<ResultsResponse>> {
    let events = Event::all_by_date(&db).await?;

    let mut events_by_year: BTreeMap<i32, Vec<Event>> = BTreeMap::new();
    for event in events {
        events_by_year.entry(event.date.year()).or_default().push(event);
    }

    Ok(Json(ResultsResponse { events_by_year }))
}

/// One submitted scorer or assist row. The count arrives as text
/// straight from the form input.
#[derive(Deserialize)]
struct CountedEntry {
    #[serde(default)]
    player: String,
    #[serde(default)]
    count: String,
}

impl CountedEntry {
    /// Resolves the entry to a (player, count) pair, dropping rows
    /// with a blank player or an unparseable count
    fn resolve(&self) -> Option<(String, u32)> {
        if self.player.is_empty() {
            return None;
        }
        let count: u32 = self.count.parse().ok()?;
        Some((self.player.clone(), count))
    }
}

/// Request to replace the result of a match
#[derive(Deserialize)]
struct UpdateResultRequest {
    #[serde(default)]
    home_score: String,
    #[serde(default)]
    away_score: String,
    #[serde(default)]
    goal_scorers: Vec<CountedEntry>,
    #[serde(default)]
    assists: Vec<CountedEntry>,
    #[serde(default)]
    yellow_cards: Vec<String>,
    #[serde(default)]
    red_cards: Vec<String>,
}

/// PUT /api/results/{id}
///
/// Replaces the result document of a match. Incomplete scorer and
/// assist rows are dropped, blank card names likewise.
async fn update_result(
    Extension(db): Extension<DatabaseConnection>,
    _auth: AdminAuth,
    Path(event_id): Path<EventID>,
    Json(req): Json<UpdateResultRequest>,
) -> ResultsResult<Json<Event>> {
    let event = Event::by_id(&db, event_id)
        .await?
        .ok_or(ResultsError::EventNotFound)?;

    let goal_scorers = req
        .goal_scorers
        .iter()
        .filter_map(CountedEntry::resolve)
        .map(|(player, goals)| GoalScorer { player, goals })
        .collect();
    let assists = req
        .assists
        .iter()
        .filter_map(CountedEntry::resolve)
        .map(|(player, assists)| AssistEntry { player, assists })
        .collect();
    let cards = Cards {
        yellow: req.yellow_cards.into_iter().filter(|name| !name.is_empty()).collect(),
        red: req.red_cards.into_iter().filter(|name| !name.is_empty()).collect(),
    };

    let result = MatchResult {
        home_score: req.home_score,
        away_score: req.away_score,
        goal_scorers,
        assists,
        cards,
    };

    let event = event.set_result(&db, result).await?;
    Ok(Json(event))
}

/// DELETE /api/results/{id}
///
/// Clears the result of a match back to the empty document. The
/// match itself stays on the schedule.
async fn delete_result(
    Extension(db): Extension<DatabaseConnection>,
    _auth: AdminAuth,
    Path(event_id): Path<EventID>,
) -> ResultsResult<StatusCode> {
    let event = Event::by_id(&db, event_id)
        .await?
        .ok_or(ResultsError::EventNotFound)?;
    event.set_result(&db, MatchResult::default()).await?;
    Ok(StatusCode::OK)
}

impl From<DbErr> for ResultsError {
    fn from(_: DbErr) -> Self {
        ResultsError::ServerError
    }
}

/// IntoResponse implementation for ResultsError to allow it to be
/// used within the result type as a error response
impl IntoResponse for ResultsError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::EventNotFound => StatusCode::NOT_FOUND,
            Self::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, self.to_string()).into_response()
    }
}
