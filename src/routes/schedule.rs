use crate::{
    database::{
        entities::{
            events::{Lineup, AWAY_SLOT, LINEUP_POSITIONS},
            Event, Player,
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
use chrono::{Datelike, Local, NaiveDate};
use sea_orm::ModelTrait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

/// Router function creates a new router with all the underlying
/// routes for this file.
///
/// Prefix: /api/schedule
pub fn router() -> Router {
    Router::new()
        .route("/", get(get_schedule).post(add_event))
        .route("/next", get(next_match))
        .route("/{id}", axum::routing::put(update_event).delete(delete_event))
}

/// Enum for errors that could occur when accessing any of
/// the schedule routes
#[derive(Debug, Error)]
enum ScheduleError {
    /// The event with the requested ID was not found
    #[error("Unable to find requested event")]
    EventNotFound,
    /// The provided date was not in YYYY-MM-DD form
    #[error("Invalid date format. Use YYYY-MM-DD.")]
    InvalidDate,
    /// Database error
    #[error("Internal server error")]
    ServerError,
}

type ScheduleResult<T> = Result<T, ScheduleError>;

/// Response grouping the full schedule by calendar year
#[derive(Serialize)]
struct ScheduleResponse {
    events_by_year: BTreeMap<i32, Vec<Event>>,
}

/// GET /api/schedule
///
/// Retrieves every event ordered by date and grouped by year
async fn get_schedule(
    Extension(db): Extension<DatabaseConnection>,
    _auth: Auth,
) -> ScheduleResult<Json<ScheduleResponse>> {
    let events = Event::all_by_date(&db).await?;

    let mut events_by_year: BTreeMap<i32, Vec<Event>> = BTreeMap::new();
    for event in events {
        events_by_year.entry(event.date.year()).or_default().push(event);
    }

    Ok(Json(ScheduleResponse { events_by_year }))
}

/// Request to schedule a new match
#[derive(Deserialize)]
struct AddEventRequest {
    /// Match date in YYYY-MM-DD form
    date: String,
    time: String,
    field: String,
    #[serde(default)]
    opponent: Option<String>,
}

fn parse_date(value: &str) -> Result<NaiveDate, ScheduleError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| ScheduleError::InvalidDate)
}

/// POST /api/schedule
///
/// Schedules a new match with an empty lineup and result
async fn add_event(
    Extension(db): Extension<DatabaseConnection>,
    _auth: AdminAuth,
    Json(req): Json<AddEventRequest>,
) -> ScheduleResult<Json<Event>> {
    let date = parse_date(&req.date)?;
    let event = Event::create(&db, date, req.time, req.field, req.opponent).await?;
    Ok(Json(event))
}

/// Response for the game day view: the next match and whoever is on
/// beer duty for its date
#[derive(Serialize)]
struct NextMatchResponse {
    event: Option<Event>,
    beer_duty_player: Option<Player>,
}

/// GET /api/schedule/next
///
/// Finds the earliest match scheduled for today or later. When no
/// match is upcoming both fields are null rather than an error.
async fn next_match(
    Extension(db): Extension<DatabaseConnection>,
    _auth: Auth,
) -> ScheduleResult<Json<NextMatchResponse>> {
    let today = Local::now().date_naive();
    let event = Event::next_match(&db, today).await?;

    let beer_duty_player = match &event {
        Some(event) => Player::by_beer_duty_date(&db, event.date).await?,
        None => None,
    };

    Ok(Json(NextMatchResponse {
        event,
        beer_duty_player,
    }))
}

/// Request to update a match and its lineup
#[derive(Deserialize)]
struct UpdateEventRequest {
    date: String,
    time: String,
    field: String,
    #[serde(default)]
    opponent: Option<String>,
    /// Position to player name assignments. Unknown positions are
    /// dropped, unassigned positions become empty.
    #[serde(default)]
    lineup: BTreeMap<String, String>,
}

/// PUT /api/schedule/{id}
///
/// Updates the match details and replaces the lineup. The away slot
/// is never taken from the request, it's recomputed as the comma
/// joined names of every roster player left without a position.
async fn update_event(
    Extension(db): Extension<DatabaseConnection>,
    _auth: AdminAuth,
    Path(event_id): Path<EventID>,
    Json(req): Json<UpdateEventRequest>,
) -> ScheduleResult<Json<Event>> {
    let event = Event::by_id(&db, event_id)
        .await?
        .ok_or(ScheduleError::EventNotFound)?;
    let date = parse_date(&req.date)?;

    let mut selected: HashSet<&str> = HashSet::new();
    let mut lineup: BTreeMap<String, String> = BTreeMap::new();
    for position in LINEUP_POSITIONS {
        let player = req
            .lineup
            .get(*position)
            .map(|player| player.as_str())
            .unwrap_or_default();
        if !player.is_empty() {
            selected.insert(player);
        }
        lineup.insert(position.to_string(), player.to_string());
    }

    let players = Player::all_by_name(&db).await?;
    let away: Vec<&str> = players
        .iter()
        .map(|player| player.name.as_str())
        .filter(|name| !selected.contains(name))
        .collect();
    lineup.insert(AWAY_SLOT.to_string(), away.join(","));

    let event = event
        .set_details(&db, date, req.time, req.field, req.opponent, Lineup(lineup))
        .await?;
    Ok(Json(event))
}

/// DELETE /api/schedule/{id}
///
/// Removes a scheduled match entirely
async fn delete_event(
    Extension(db): Extension<DatabaseConnection>,
    _auth: AdminAuth,
    Path(event_id): Path<EventID>,
) -> ScheduleResult<StatusCode> {
    let event = Event::by_id(&db, event_id)
        .await?
        .ok_or(ScheduleError::EventNotFound)?;
    event.delete(&db).await?;
    Ok(StatusCode::OK)
}

impl From<DbErr> for ScheduleError {
    fn from(_: DbErr) -> Self {
        ScheduleError::ServerError
    }
}

/// IntoResponse implementation for ScheduleError to allow it to be
/// used within the result type as a error response
impl IntoResponse for ScheduleError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::EventNotFound => StatusCode::NOT_FOUND,
            Self::InvalidDate => StatusCode::BAD_REQUEST,
            Self::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, self.to_string()).into_response()
    }
}
