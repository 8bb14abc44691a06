//! Relational persistence for photo metadata.
//!
//! Queries named "active" only see rows that are not soft-deleted and whose
//! variant paths have been committed. Pending uploads are invisible to them.

use chrono::{NaiveDateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::photo::{self, Column, Entity as Photo};

#[derive(Clone)]
pub struct PhotoStore {
    db: DatabaseConnection,
}

impl PhotoStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn active() -> Condition {
        Condition::all()
            .add(Column::DeletedAt.is_null())
            .add(Column::PathOriginal.ne(""))
    }

    /// Inserts a pending record (empty paths, not main).
    pub async fn create(
        &self,
        parent_id: Uuid,
        uploader_id: Uuid,
        mime_type: &str,
    ) -> Result<photo::Model, DbErr> {
        let now = Utc::now().naive_utc();

        photo::ActiveModel {
            id: Set(Uuid::new_v4()),
            parent_id: Set(parent_id),
            uploader_id: Set(uploader_id),
            is_main: Set(false),
            path_original: Set(String::new()),
            path_medium: Set(String::new()),
            path_thumbnail: Set(String::new()),
            mime_type: Set(mime_type.to_string()),
            file_size: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        }
        .insert(&self.db)
        .await
    }

    /// Overwrites every column of the stored row with `photo`.
    pub async fn update(&self, photo: photo::Model) -> Result<photo::Model, DbErr> {
        let mut active = photo.into_active_model().reset_all();
        active.updated_at = Set(Utc::now().naive_utc());
        active.update(&self.db).await
    }

    /// Commits the variant paths of a pending record.
    ///
    /// Only a pending, non-deleted row is touched. Returns `None` when the row
    /// was reclaimed or committed by someone else in the meantime.
    pub async fn commit_paths(
        &self,
        photo: &photo::Model,
    ) -> Result<Option<photo::Model>, DbErr> {
        let result = Photo::update_many()
            .col_expr(Column::PathOriginal, Expr::value(photo.path_original.clone()))
            .col_expr(Column::PathMedium, Expr::value(photo.path_medium.clone()))
            .col_expr(Column::PathThumbnail, Expr::value(photo.path_thumbnail.clone()))
            .col_expr(Column::FileSize, Expr::value(photo.file_size))
            .col_expr(Column::UpdatedAt, Expr::value(Utc::now().naive_utc()))
            .filter(Column::Id.eq(photo.id))
            .filter(Column::DeletedAt.is_null())
            .filter(Column::PathOriginal.eq(""))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Ok(None);
        }

        self.find_by_id(photo.id).await
    }

    /// Soft delete. Also drops the main flag so a deleted row can never compete for it.
    pub async fn delete(&self, id: Uuid) -> Result<(), DbErr> {
        let now = Utc::now().naive_utc();

        Photo::update_many()
            .col_expr(Column::DeletedAt, Expr::value(now))
            .col_expr(Column::IsMain, Expr::value(false))
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(Column::Id.eq(id))
            .filter(Column::DeletedAt.is_null())
            .exec(&self.db)
            .await?;

        Ok(())
    }

    /// Permanent removal, reserved for the parent cascade.
    pub async fn hard_delete(&self, id: Uuid) -> Result<(), DbErr> {
        Photo::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }

    /// Non-deleted record by id, pending ones included.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<photo::Model>, DbErr> {
        Photo::find_by_id(id)
            .filter(Column::DeletedAt.is_null())
            .one(&self.db)
            .await
    }

    pub async fn find_by_parent_id(&self, parent_id: Uuid) -> Result<Vec<photo::Model>, DbErr> {
        Photo::find()
            .filter(Column::ParentId.eq(parent_id))
            .filter(Self::active())
            .order_by_asc(Column::CreatedAt)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
    }

    /// Every record of the parent, soft-deleted and pending ones included.
    pub async fn find_by_parent_id_unscoped(
        &self,
        parent_id: Uuid,
    ) -> Result<Vec<photo::Model>, DbErr> {
        Photo::find()
            .filter(Column::ParentId.eq(parent_id))
            .order_by_asc(Column::CreatedAt)
            .all(&self.db)
            .await
    }

    pub async fn count_by_parent_id(&self, parent_id: Uuid) -> Result<u64, DbErr> {
        Photo::find()
            .filter(Column::ParentId.eq(parent_id))
            .filter(Self::active())
            .count(&self.db)
            .await
    }

    pub async fn get_main_photo(&self, parent_id: Uuid) -> Result<Option<photo::Model>, DbErr> {
        Photo::find()
            .filter(Column::ParentId.eq(parent_id))
            .filter(Column::IsMain.eq(true))
            .filter(Self::active())
            .one(&self.db)
            .await
    }

    /// Makes `photo_id` the only main photo of `parent_id` in one transaction.
    ///
    /// The parent's rows are locked first so concurrent calls for the same
    /// parent serialize. Returns `false` without touching anything when
    /// `photo_id` is not an active photo of `parent_id`.
    pub async fn set_main_photo(&self, photo_id: Uuid, parent_id: Uuid) -> Result<bool, DbErr> {
        let txn = self.db.begin().await?;

        let siblings = Photo::find()
            .filter(Column::ParentId.eq(parent_id))
            .filter(Column::DeletedAt.is_null())
            .lock_exclusive()
            .all(&txn)
            .await?;

        if !siblings.iter().any(|p| p.id == photo_id && p.has_paths()) {
            txn.commit().await?;
            return Ok(false);
        }

        let now = Utc::now().naive_utc();

        Photo::update_many()
            .col_expr(Column::IsMain, Expr::value(false))
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(Column::ParentId.eq(parent_id))
            .filter(Column::DeletedAt.is_null())
            .filter(Column::IsMain.eq(true))
            .filter(Column::Id.ne(photo_id))
            .exec(&txn)
            .await?;

        Photo::update_many()
            .col_expr(Column::IsMain, Expr::value(true))
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(Column::Id.eq(photo_id))
            .filter(Column::ParentId.eq(parent_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        Ok(true)
    }

    /// Pending records created at or before `cutoff`.
    pub async fn find_stale_pending(
        &self,
        cutoff: NaiveDateTime,
    ) -> Result<Vec<photo::Model>, DbErr> {
        Photo::find()
            .filter(Column::DeletedAt.is_null())
            .filter(Column::PathOriginal.eq(""))
            .filter(Column::CreatedAt.lte(cutoff))
            .order_by_asc(Column::CreatedAt)
            .all(&self.db)
            .await
    }
}
