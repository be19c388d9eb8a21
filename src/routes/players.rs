use crate::{
    database::{
        entities::{player_stats, Player},
        DatabaseConnection, DbErr,
    },
    middleware::auth::{AdminAuth, Auth},
    utils::types::PlayerID,
};
use axum::{
    extract::Path,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get},
    Extension, Form, Json, Router,
};
use chrono::NaiveDate;
use sea_orm::TransactionTrait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Router function creates a new router with all the underlying
/// routes for this file.
///
/// Prefix: /api/players
pub fn router() -> Router {
    Router::new()
        .route(
            "/",
            get(get_players).post(add_player).put(update_players),
        )
        .route("/{id}", delete(delete_player))
}

/// Enum for errors that could occur when accessing any of
/// the players routes
#[derive(Debug, Error)]
enum PlayersError {
    /// The player with the requested ID was not found
    #[error("Unable to find requested player")]
    PlayerNotFound,
    /// Database error
    #[error("Internal server error")]
    ServerError,
}

type PlayersResult<T> = Result<T, PlayersError>;

/// GET /api/players
///
/// Route for retrieving the full roster ordered by display name
async fn get_players(
    Extension(db): Extension<DatabaseConnection>,
    _auth: Auth,
) -> PlayersResult<Json<Vec<Player>>> {
    let players = Player::all_by_name(&db).await?;
    Ok(Json(players))
}

/// Request to add a new player to the roster
#[derive(Deserialize)]
struct AddPlayerRequest {
    name: String,
}

/// Response telling whether a player row was actually created
#[derive(Serialize)]
struct AddPlayerResponse {
    created: bool,
}

/// POST /api/players
///
/// Adds a player by name. A blank name or a name already on the
/// roster is silently skipped rather than treated as an error.
async fn add_player(
    Extension(db): Extension<DatabaseConnection>,
    _auth: AdminAuth,
    Json(req): Json<AddPlayerRequest>,
) -> PlayersResult<Json<AddPlayerResponse>> {
    let name = req.name.trim();
    if name.is_empty() || Player::by_name(&db, name).await?.is_some() {
        return Ok(Json(AddPlayerResponse { created: false }));
    }

    Player::create(&db, name.to_string()).await?;
    Ok(Json(AddPlayerResponse { created: true }))
}

/// Reads the optional detail field for a row, mapping an absent or
/// empty value to None
fn detail_field(form: &HashMap<String, String>, key: String) -> Option<String> {
    form.get(&key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(|value| value.to_string())
}

/// PUT /api/players
///
/// Bulk detail update. The form keys every field by player ID, e.g.
/// `name_3` and `beer_duty_date_3` for the player with ID 3. A row
/// with no fields present keeps its current name and clears the
/// optional details, matching an empty submitted form row. Renames
/// carry the aggregate stats row along since it keys on the name.
async fn update_players(
    Extension(db): Extension<DatabaseConnection>,
    _auth: AdminAuth,
    Form(form): Form<HashMap<String, String>>,
) -> PlayersResult<StatusCode> {
    let players = Player::all_by_name(&db).await?;

    let txn = db.begin().await?;

    for player in players {
        let id = player.id;

        let new_name = form
            .get(&format!("name_{id}"))
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .map(|value| value.to_string())
            .unwrap_or_else(|| player.name.clone());
        if new_name != player.name {
            player_stats::Model::rename(&txn, &player.name, &new_name).await?;
        }

        let preferred_position = detail_field(&form, format!("preferred_position_{id}"));
        let shirt_number = detail_field(&form, format!("shirt_{id}"));
        let support_offered = detail_field(&form, format!("support_offered_{id}"));

        // An unparseable date clears the duty assignment
        let beer_duty_date = form
            .get(&format!("beer_duty_date_{id}"))
            .and_then(|value| NaiveDate::parse_from_str(value, "%Y-%m-%d").ok());

        player
            .set_details(
                &txn,
                new_name,
                preferred_position,
                shirt_number,
                beer_duty_date,
                support_offered,
            )
            .await?;
    }

    txn.commit().await?;

    Ok(StatusCode::OK)
}

/// DELETE /api/players/{id}
///
/// Removes a player along with its aggregate stats row and every
/// season stats row referencing it. A second delete of the same ID
/// responds not found.
async fn delete_player(
    Extension(db): Extension<DatabaseConnection>,
    _auth: AdminAuth,
    Path(player_id): Path<PlayerID>,
) -> PlayersResult<StatusCode> {
    let player = Player::by_id(&db, player_id)
        .await?
        .ok_or(PlayersError::PlayerNotFound)?;

    let txn = db.begin().await?;
    player.delete_cascade(&txn).await?;
    txn.commit().await?;

    Ok(StatusCode::OK)
}

impl From<DbErr> for PlayersError {
    fn from(_: DbErr) -> Self {
        PlayersError::ServerError
    }
}

/// IntoResponse implementation for PlayersError to allow it to be
/// used within the result type as a error response
impl IntoResponse for PlayersError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::PlayerNotFound => StatusCode::NOT_FOUND,
            Self::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod test {
    use super::router;
    use crate::{
        database::{connect_test, entities::Player},
        services::sessions::Sessions,
    };
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
        Extension,
    };
    use std::sync::Arc;
    use tower::ServiceExt;

    /// Deleting the same player twice responds not found the second
    /// time with nothing left behind
    #[tokio::test]
    async fn test_repeat_delete_not_found() {
        let db = connect_test().await;
        let player = Player::create(&db, "Ann".to_string()).await.unwrap();

        let sessions = Arc::new(Sessions::new());
        let token = sessions.create_admin();
        let app = router()
            .layer(Extension(db.clone()))
            .layer(Extension(sessions));

        let request = || {
            Request::builder()
                .uri(format!("/{}", player.id))
                .method(Method::DELETE)
                .header("X-Token", &token)
                .body(Body::empty())
                .unwrap()
        };

        let res = app.clone().oneshot(request()).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(Player::by_id(&db, player.id).await.unwrap().is_none());

        let res = app.oneshot(request()).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
