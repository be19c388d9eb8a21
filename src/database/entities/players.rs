use crate::{database::DbResult, utils::types::PlayerID};
use sea_orm::{
    entity::prelude::*,
    ActiveValue::{NotSet, Set},
    IntoActiveModel, QueryOrder,
};
use serde::Serialize;

/// Structure for a roster player
#[derive(Serialize, Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "players")]
pub struct Model {
    /// Unique Identifier for the player
    #[sea_orm(primary_key)]
    pub id: PlayerID,
    /// Unique display name, also the key into the aggregate stats table
    pub name: String,
    /// Preferred field position
    pub preferred_position: Option<String>,
    /// Shirt number kept as text, it's never computed with
    pub shirt_number: Option<String>,
    /// Date the player is on beer duty
    pub beer_duty_date: Option<Date>,
    /// Free text notes on offered support
    pub support_offered: Option<String>,
}

/// The relationships for the player
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::season_stats::Entity")]
    SeasonStats,
}

impl Related<super::season_stats::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SeasonStats.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Retrieves all players ordered by display name
    pub async fn all_by_name<C: ConnectionTrait>(db: &C) -> DbResult<Vec<Model>> {
        Entity::find().order_by_asc(Column::Name).all(db).await
    }

    /// Finds a player by its unique ID
    pub async fn by_id<C: ConnectionTrait>(db: &C, id: PlayerID) -> DbResult<Option<Model>> {
        Entity::find_by_id(id).one(db).await
    }

    /// Finds a player by its display name
    pub async fn by_name<C: ConnectionTrait>(db: &C, name: &str) -> DbResult<Option<Model>> {
        Entity::find().filter(Column::Name.eq(name)).one(db).await
    }

    /// Finds the player on beer duty for the provided date
    pub async fn by_beer_duty_date<C: ConnectionTrait>(
        db: &C,
        date: Date,
    ) -> DbResult<Option<Model>> {
        Entity::find()
            .filter(Column::BeerDutyDate.eq(date))
            .one(db)
            .await
    }

    /// Creates a new player with the provided name and no other details
    pub async fn create<C: ConnectionTrait>(db: &C, name: String) -> DbResult<Model> {
        ActiveModel {
            id: NotSet,
            name: Set(name),
            preferred_position: NotSet,
            shirt_number: NotSet,
            beer_duty_date: NotSet,
            support_offered: NotSet,
        }
        .insert(db)
        .await
    }

    /// Updates the player details. A rename is the caller's concern,
    /// the aggregate stats row keys on the name and must follow it.
    pub async fn set_details<C: ConnectionTrait>(
        self,
        db: &C,
        name: String,
        preferred_position: Option<String>,
        shirt_number: Option<String>,
        beer_duty_date: Option<Date>,
        support_offered: Option<String>,
    ) -> DbResult<Model> {
        let mut model = self.into_active_model();
        model.name = Set(name);
        model.preferred_position = Set(preferred_position);
        model.shirt_number = Set(shirt_number);
        model.beer_duty_date = Set(beer_duty_date);
        model.support_offered = Set(support_offered);
        model.update(db).await
    }

    /// Deletes the player along with its aggregate stats row (matched
    /// by name) and every season stats row referencing it
    pub async fn delete_cascade<C: ConnectionTrait>(self, db: &C) -> DbResult<()> {
        let name = self.name.clone();
        let player_id = self.id;

        self.delete(db).await?;
        super::player_stats::Model::delete_by_player(db, &name).await?;
        super::season_stats::Model::delete_for_player(db, player_id).await?;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::Model as Player;
    use crate::{
        database::{connect_test, entities::player_stats},
        services::stats,
    };

    /// Renaming moves the aggregate row's name key keeping its
    /// counters, season rows key on the ID and are unaffected
    #[tokio::test]
    async fn test_rename_moves_stats_row() {
        let db = connect_test().await;
        let player = Player::create(&db, "Ann".to_string()).await.unwrap();

        let outcome = stats::reconcile(&db, &[player.clone()], 2026).await.unwrap();
        let stat = outcome.aggregate.by_name.get("Ann").unwrap().clone();
        let stat = stat.set_counters(&db, 5, 2, 1, 0, 0).await.unwrap();
        let season_id = outcome.season.by_player.get(&player.id).unwrap().id;

        player_stats::Model::rename(&db, "Ann", "Annika").await.unwrap();

        let rows = player_stats::Model::all(&db).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, stat.id);
        assert_eq!(rows[0].player, "Annika");
        assert_eq!(rows[0].goals, 5);

        // Renaming a name without a stats row is a no-op
        player_stats::Model::rename(&db, "Nobody", "Somebody").await.unwrap();
        assert_eq!(player_stats::Model::all(&db).await.unwrap().len(), 1);

        let season = crate::database::entities::season_stats::Model::by_season_for_players(
            &db,
            2026,
            vec![player.id],
        )
        .await
        .unwrap();
        assert_eq!(season[0].id, season_id);
    }

    /// Deleting a player takes its aggregate row and every season row
    /// with it, leaving nothing dangling
    #[tokio::test]
    async fn test_delete_cascade() {
        let db = connect_test().await;
        let ann = Player::create(&db, "Ann".to_string()).await.unwrap();
        let ben = Player::create(&db, "Ben".to_string()).await.unwrap();

        let roster = vec![ann.clone(), ben.clone()];
        stats::reconcile(&db, &roster, 2026).await.unwrap();

        ann.clone().delete_cascade(&db).await.unwrap();

        assert!(Player::by_id(&db, ann.id).await.unwrap().is_none());
        assert!(Player::by_id(&db, ben.id).await.unwrap().is_some());

        let rows = player_stats::Model::all(&db).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].player, "Ben");

        let season = crate::database::entities::season_stats::Model::by_season_for_players(
            &db,
            2026,
            vec![ann.id, ben.id],
        )
        .await
        .unwrap();
        assert_eq!(season.len(), 1);
        assert_eq!(season[0].player_id, ben.id);
    }
}
