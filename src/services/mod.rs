pub mod cleanup;
pub mod object_store;
pub mod parents;
pub mod photo_store;
pub mod photos;
pub mod s3;
