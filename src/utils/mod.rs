pub mod image_processor;

use uuid::Uuid;

use crate::models::variant::Variant;

/// Object key for one variant: `{parent_type}/{parent_id}/photos/{photo_id}_{variant}.jpg`.
pub fn photo_key(parent_type: &str, parent_id: Uuid, photo_id: Uuid, variant: Variant) -> String {
    format!(
        "{}/{}/photos/{}_{}.jpg",
        parent_type.trim_matches('/'),
        parent_id,
        photo_id,
        variant.as_str()
    )
}
