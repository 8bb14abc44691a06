pub mod photo;
pub mod variant;
