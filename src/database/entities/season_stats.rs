use crate::{
    database::DbResult,
    utils::types::{PlayerID, SeasonYear},
};
use sea_orm::{entity::prelude::*, ActiveValue::Set, DeleteResult, IntoActiveModel};
use serde::Serialize;

/// Per-season counters for one player. Unique per (player, season
/// year); seeded once from the aggregate row when first created.
#[derive(Serialize, Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "season_stats")]
pub struct Model {
    /// Unique Identifier for the stats row
    #[sea_orm(primary_key)]
    pub id: u32,
    /// ID of the player the row belongs to
    pub player_id: PlayerID,
    /// Calendar year of the season
    pub season_year: SeasonYear,
    pub goals: u32,
    pub assists: u32,
    pub player_of_match: u32,
    pub yellow_cards: u32,
    pub red_cards: u32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::players::Entity",
        from = "Column::PlayerId",
        to = "super::players::Column::Id"
    )]
    Player,
}

impl Related<super::players::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Player.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Retrieves the season rows for the provided season filtered to
    /// the provided player IDs in a single query
    pub async fn by_season_for_players<C: ConnectionTrait>(
        db: &C,
        season_year: SeasonYear,
        player_ids: Vec<PlayerID>,
    ) -> DbResult<Vec<Model>> {
        Entity::find()
            .filter(Column::SeasonYear.eq(season_year))
            .filter(Column::PlayerId.is_in(player_ids))
            .all(db)
            .await
    }

    /// Deletes every season row referencing the provided player
    pub async fn delete_for_player<C: ConnectionTrait>(
        db: &C,
        player_id: PlayerID,
    ) -> DbResult<DeleteResult> {
        Entity::delete_many()
            .filter(Column::PlayerId.eq(player_id))
            .exec(db)
            .await
    }

    /// Replaces the counters on this row with the provided values
    pub async fn set_counters<C: ConnectionTrait>(
        self,
        db: &C,
        goals: u32,
        assists: u32,
        player_of_match: u32,
        yellow_cards: u32,
        red_cards: u32,
    ) -> DbResult<Model> {
        let mut model = self.into_active_model();
        model.goals = Set(goals);
        model.assists = Set(assists);
        model.player_of_match = Set(player_of_match);
        model.yellow_cards = Set(yellow_cards);
        model.red_cards = Set(red_cards);
        model.update(db).await
    }
}
