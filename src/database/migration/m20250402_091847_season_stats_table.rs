use sea_orm_migration::{prelude::*, schema::*};

use super::m20250211_140236_players_table::Players;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SeasonStats::Table)
                    .if_not_exists()
                    .col(pk_auto(SeasonStats::Id))
                    .col(unsigned(SeasonStats::PlayerId))
                    .col(integer(SeasonStats::SeasonYear))
                    .col(unsigned(SeasonStats::Goals).default(0).to_owned())
                    .col(unsigned(SeasonStats::Assists).default(0).to_owned())
                    .col(unsigned(SeasonStats::PlayerOfMatch).default(0).to_owned())
                    .col(unsigned(SeasonStats::YellowCards).default(0).to_owned())
                    .col(unsigned(SeasonStats::RedCards).default(0).to_owned())
                    .foreign_key(
                        ForeignKey::create()
                            .from(SeasonStats::Table, SeasonStats::PlayerId)
                            .to(Players::Table, Players::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .unique()
                    .name("uq-player-season")
                    .table(SeasonStats::Table)
                    .col(SeasonStats::PlayerId)
                    .col(SeasonStats::SeasonYear)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .table(SeasonStats::Table)
                    .name("uq-player-season")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(SeasonStats::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum SeasonStats {
    Table,
    /// Unique ID of the season stats row
    Id,
    /// Player the row belongs to
    PlayerId,
    /// Calendar year of the season
    SeasonYear,
    Goals,
    Assists,
    PlayerOfMatch,
    YellowCards,
    RedCards,
}
