use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Players::Table)
                    .if_not_exists()
                    .col(pk_auto(Players::Id))
                    .col(string_uniq(Players::Name))
                    .col(string_null(Players::PreferredPosition))
                    .col(string_null(Players::ShirtNumber))
                    .col(date_null(Players::BeerDutyDate))
                    .col(text_null(Players::SupportOffered))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Players::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Players {
    Table,
    /// Unique ID of the player
    Id,
    /// Unique display name, also the key into the aggregate stats
    Name,
    /// Preferred field position
    PreferredPosition,
    /// Shirt number as printed, kept as text ("10", "7b")
    ShirtNumber,
    /// Date the player is on beer duty
    BeerDutyDate,
    /// Free text notes on offered support
    SupportOffered,
}
