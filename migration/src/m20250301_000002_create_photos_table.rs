use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Photos::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Photos::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Photos::ParentId).uuid().not_null())
                    .col(ColumnDef::new(Photos::UploaderId).uuid().not_null())
                    .col(
                        ColumnDef::new(Photos::IsMain)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Photos::PathOriginal).string_len(255).not_null())
                    .col(ColumnDef::new(Photos::PathMedium).string_len(255).not_null())
                    .col(ColumnDef::new(Photos::PathThumbnail).string_len(255).not_null())
                    .col(ColumnDef::new(Photos::MimeType).string_len(50).not_null())
                    .col(ColumnDef::new(Photos::FileSize).big_integer().not_null())
                    .col(ColumnDef::new(Photos::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Photos::UpdatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Photos::DeletedAt).timestamp())
                    // Rows are removed by the parent sweep, never by cascade.
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_photos_parent_id")
                            .from(Photos::Table, Photos::ParentId)
                            .to(Spots::Table, Spots::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_photos_parent_id")
                    .table(Photos::Table)
                    .col(Photos::ParentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_photos_uploader_id")
                    .table(Photos::Table)
                    .col(Photos::UploaderId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_photos_parent_main")
                    .table(Photos::Table)
                    .col(Photos::ParentId)
                    .col(Photos::IsMain)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Photos::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Photos {
    Table,
    Id,
    ParentId,
    UploaderId,
    IsMain,
    PathOriginal,
    PathMedium,
    PathThumbnail,
    MimeType,
    FileSize,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum Spots {
    Table,
    Id,
}
