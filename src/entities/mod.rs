pub mod photo;
pub mod spot;
