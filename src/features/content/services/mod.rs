mod content_service;
mod image_service;
pub mod markdown;

pub use content_service::ContentService;
pub use image_service::{read_image_form, ImageUploadService, MAX_IMAGE_SIZE};
