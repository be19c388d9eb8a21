use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PlayerStats::Table)
                    .if_not_exists()
                    .col(pk_auto(PlayerStats::Id))
                    .col(string_uniq(PlayerStats::Player))
                    .col(unsigned(PlayerStats::Goals).default(0).to_owned())
                    .col(unsigned(PlayerStats::Assists).default(0).to_owned())
                    .col(unsigned(PlayerStats::PlayerOfMatch).default(0).to_owned())
                    .col(unsigned(PlayerStats::CleanSheets).default(0).to_owned())
                    .col(unsigned(PlayerStats::YellowCards).default(0).to_owned())
                    .col(unsigned(PlayerStats::RedCards).default(0).to_owned())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PlayerStats::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum PlayerStats {
    Table,
    /// Unique ID of the stats row
    Id,
    /// Player display name, the identity key for aggregate stats
    Player,
    Goals,
    Assists,
    PlayerOfMatch,
    CleanSheets,
    YellowCards,
    RedCards,
}
