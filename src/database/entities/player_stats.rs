use crate::database::DbResult;
use sea_orm::{entity::prelude::*, ActiveValue::Set, DeleteResult, IntoActiveModel};
use serde::Serialize;

/// Lifetime-to-date counters for one player, keyed by display name.
/// Rows are created lazily by the stats reconciler the first time
/// statistics are viewed.
#[derive(Serialize, Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "player_stats")]
pub struct Model {
    /// Unique Identifier for the stats row
    #[sea_orm(primary_key)]
    pub id: u32,
    /// Display name of the player the counters belong to
    pub player: String,
    pub goals: u32,
    pub assists: u32,
    pub player_of_match: u32,
    pub clean_sheets: u32,
    pub yellow_cards: u32,
    pub red_cards: u32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Retrieves every aggregate stats row
    pub async fn all<C: ConnectionTrait>(db: &C) -> DbResult<Vec<Model>> {
        Entity::find().all(db).await
    }

    /// Moves the name key of the row belonging to `old_name`, keeping
    /// its counters. No-op when no row exists for the old name.
    pub async fn rename<C: ConnectionTrait>(db: &C, old_name: &str, new_name: &str) -> DbResult<()> {
        let existing = Entity::find()
            .filter(Column::Player.eq(old_name))
            .one(db)
            .await?;

        if let Some(existing) = existing {
            let mut model = existing.into_active_model();
            model.player = Set(new_name.to_string());
            model.update(db).await?;
        }

        Ok(())
    }

    /// Deletes the aggregate row for the provided player name
    pub async fn delete_by_player<C: ConnectionTrait>(db: &C, name: &str) -> DbResult<DeleteResult> {
        Entity::delete_many()
            .filter(Column::Player.eq(name))
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
