pub mod classifier_client;
pub mod description_client;
pub mod image_prep;
pub mod multipart;
