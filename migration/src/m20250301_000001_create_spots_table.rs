use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Spots::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Spots::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Spots::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(Spots::Name).string().not_null())
                    .col(ColumnDef::new(Spots::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Spots::UpdatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Spots::DeletedAt).timestamp())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Spots::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Spots {
    Table,
    Id,
    OwnerId,
    Name,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
