use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::entities::spot::{self, Entity as Spot};

/// What the photo engine needs to know about a parent entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentRef {
    pub id: Uuid,
    pub owner_id: Uuid,
}

/// Lookup into the parent entity (spot/bench) repository.
#[async_trait::async_trait]
pub trait ParentRepository: Send + Sync {
    async fn find_by_id(&self, parent_id: Uuid) -> Result<Option<ParentRef>, DbErr>;
}

#[derive(Clone)]
pub struct SpotRepository {
    db: DatabaseConnection,
}

impl SpotRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl ParentRepository for SpotRepository {
    async fn find_by_id(&self, parent_id: Uuid) -> Result<Option<ParentRef>, DbErr> {
        let spot = Spot::find_by_id(parent_id)
            .filter(spot::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?;

        Ok(spot.map(|s| ParentRef {
            id: s.id,
            owner_id: s.owner_id,
        }))
    }
}
