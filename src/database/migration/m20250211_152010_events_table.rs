use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Events::Table)
                    .if_not_exists()
                    .col(pk_auto(Events::Id))
                    .col(date(Events::Date))
                    .col(string(Events::Time))
                    .col(string(Events::Field))
                    .col(string_null(Events::Opponent))
                    .col(json_binary(Events::Lineup))
                    .col(json_binary(Events::Result))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Events::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Events {
    Table,
    /// Unique ID of the event
    Id,
    /// Match date
    Date,
    /// Kick-off time in "HH:MM" form
    Time,
    /// Pitch the match is played on
    Field,
    /// Opposing team name
    Opponent,
    /// Lineup document mapping positions to player names
    Lineup,
    /// Result document with scores, scorers, assists and cards
    Result,
}
