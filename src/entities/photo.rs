use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::variant::Variant;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "photos")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub parent_id: Uuid,
    pub uploader_id: Uuid,
    pub is_main: bool,
    // The three paths stay empty while the upload is pending.
    pub path_original: String,
    pub path_medium: String,
    pub path_thumbnail: String,
    pub mime_type: String,
    pub file_size: i64,
    pub created_at: DateTime,
    pub updated_at: DateTime,
    pub deleted_at: Option<DateTime>,
}

impl Model {
    /// A photo is active once all variant paths are committed and it is not soft-deleted.
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none() && self.has_paths()
    }

    pub fn has_paths(&self) -> bool {
        !self.path_original.is_empty()
            && !self.path_medium.is_empty()
            && !self.path_thumbnail.is_empty()
    }

    pub fn path(&self, variant: Variant) -> &str {
        match variant {
            Variant::Original => &self.path_original,
            Variant::Medium => &self.path_medium,
            Variant::Thumbnail => &self.path_thumbnail,
        }
    }

    pub fn set_path(&mut self, variant: Variant, path: String) {
        match variant {
            Variant::Original => self.path_original = path,
            Variant::Medium => self.path_medium = path,
            Variant::Thumbnail => self.path_thumbnail = path,
        }
    }

    /// Non-empty variant paths, used when cleaning up the object store.
    pub fn stored_paths(&self) -> Vec<&str> {
        [
            self.path_original.as_str(),
            self.path_medium.as_str(),
            self.path_thumbnail.as_str(),
        ]
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::spot::Entity",
        from = "Column::ParentId",
        to = "super::spot::Column::Id"
    )]
    Spot,
}

impl Related<super::spot::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Spot.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
