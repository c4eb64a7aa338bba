pub mod generate_types;
pub mod image_types;
pub mod prediction_types;
