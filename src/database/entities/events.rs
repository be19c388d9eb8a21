use crate::{database::DbResult, utils::types::EventID};
use sea_orm::{
    entity::prelude::*,
    ActiveValue::{NotSet, Set},
    FromJsonQueryResult, IntoActiveModel, QueryOrder,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The fixed position set a lineup document always carries. "Beer
/// Duty" travels with the lineup since it's assigned per match.
pub const LINEUP_POSITIONS: &[&str] = &[
    "Striker",
    "Left Wing",
    "Right Wing",
    "Attacking Mid",
    "Defensive Mid 1",
    "Defensive Mid 2",
    "Right Back",
    "Left Back",
    "Centre Back 1",
    "Centre Back 2",
    "Goalkeeper",
    "Sub 1",
    "Sub 2",
    "Sub 3",
    "Sub 4",
    "Sub 5",
    "Beer Duty",
];

/// Lineup slot that collects everyone not assigned to a position
pub const AWAY_SLOT: &str = "Away";

/// Structure for a scheduled match
#[derive(Serialize, Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "events")]
pub struct Model {
    /// Unique Identifier for the event
    #[sea_orm(primary_key)]
    pub id: EventID,
    /// Match date
    pub date: Date,
    /// Kick-off time in "HH:MM" form
    pub time: String,
    /// Pitch the match is played on
    pub field: String,
    /// Opposing team name
    pub opponent: Option<String>,
    /// Lineup document mapping positions to player names
    pub lineup: Lineup,
    /// Result document with scores, scorers, assists and cards
    pub result: MatchResult,
}

/// Position name to assigned player name mapping for one match. Never
/// queried across matches, only displayed and edited whole.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct Lineup(pub BTreeMap<String, String>);

impl Default for Lineup {
    fn default() -> Self {
        let mut positions: BTreeMap<String, String> = LINEUP_POSITIONS
            .iter()
            .map(|position| (ToString::to_string(position), String::new()))
            .collect();
        positions.insert(AWAY_SLOT.to_string(), String::new());
        Lineup(positions)
    }
}

/// Score and scorer record for one match. Display-only, never
/// aggregated into the stats tables.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize, FromJsonQueryResult)]
pub struct MatchResult {
    #[serde(default)]
    pub home_score: String,
    #[serde(default)]
    pub away_score: String,
    #[serde(default)]
    pub goal_scorers: Vec<GoalScorer>,
    #[serde(default)]
    pub assists: Vec<AssistEntry>,
    #[serde(default)]
    pub cards: Cards,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalScorer {
    /// Name of the scoring player
    pub player: String,
    /// Goals scored in this match
    pub goals: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistEntry {
    /// Name of the assisting player
    pub player: String,
    /// Assists provided in this match
    pub assists: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cards {
    #[serde(default)]
    pub yellow: Vec<String>,
    #[serde(default)]
    pub red: Vec<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Retrieves every event ordered by date ascending
    pub async fn all_by_date<C: ConnectionTrait>(db: &C) -> DbResult<Vec<Model>> {
        Entity::find().order_by_asc(Column::Date).all(db).await
    }

    /// Finds an event by its unique ID
    pub async fn by_id<C: ConnectionTrait>(db: &C, id: EventID) -> DbResult<Option<Model>> {
        Entity::find_by_id(id).one(db).await
    }

    /// Finds the next match scheduled for today or later
    pub async fn next_match<C: ConnectionTrait>(db: &C, today: Date) -> DbResult<Option<Model>> {
        Entity::find()
            .filter(Column::Date.gte(today))
            .order_by_asc(Column::Date)
            .one(db)
            .await
    }

    /// Creates a new match with default lineup and result documents
    pub async fn create<C: ConnectionTrait>(
        db: &C,
        date: Date,
        time: String,
        field: String,
        opponent: Option<String>,
    ) -> DbResult<Model> {
        ActiveModel {
            id: NotSet,
            date: Set(date),
            time: Set(time),
            field: Set(field),
            opponent: Set(opponent),
            lineup: Set(Lineup::default()),
            result: Set(MatchResult::default()),
        }
        .insert(db)
        .await
    }

    /// Updates the match details and replaces the lineup document
    pub async fn set_details<C: ConnectionTrait>(
        self,
        db: &C,
        date: Date,
        time: String,
        field: String,
        opponent: Option<String>,
        lineup: Lineup,
    ) -> DbResult<Model> {
        let mut model = self.into_active_model();
        model.date = Set(date);
        model.time = Set(time);
        model.field = Set(field);
        model.opponent = Set(opponent);
        model.lineup = Set(lineup);
        model.update(db).await
    }

    /// Replaces the result document for this match
    pub async fn set_result<C: ConnectionTrait>(self, db: &C, result: MatchResult) -> DbResult<Model> {
        let mut model = self.into_active_model();
        model.result = Set(result);
        model.update(db).await
    }
}

#[cfg(test)]
mod test {
    use super::Model as Event;
    use crate::database::connect_test;
    use chrono::NaiveDate;

    /// The next match lookup should skip past matches and pick the
    /// earliest of today-or-later
    #[tokio::test]
    async fn test_next_match() {
        let db = connect_test().await;

        let dates = [
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 5, 14).unwrap(),
            NaiveDate::from_ymd_opt(2026, 6, 2).unwrap(),
        ];
        for date in dates {
            Event::create(&db, date, "14:00".to_string(), "Pitch 2".to_string(), None)
                .await
                .unwrap();
        }

        let today = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
        let next = Event::next_match(&db, today)
            .await
            .unwrap()
            .expect("Expected an upcoming match");
        assert_eq!(next.date, dates[1]);

        // Past every match there is no upcoming one
        let later = NaiveDate::from_ymd_opt(2026, 7, 1).unwrap();
        assert!(Event::next_match(&db, later).await.unwrap().is_none());
    }
}
