pub use sea_orm_migration::prelude::*;

mod m20250211_140236_players_table;
mod m20250211_152010_events_table;
mod m20250218_103355_player_stats_table;
mod m20250402_091847_season_stats_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250211_140236_players_table::Migration),
            Box::new(m20250211_152010_events_table::Migration),
            Box::new(m20250218_103355_player_stats_table::Migration),
            Box::new(m20250402_091847_season_stats_table::Migration),
        ]
    }
}
