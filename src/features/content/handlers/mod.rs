pub mod admin_content_handler;
pub mod image_upload_handler;
pub mod public_content_handler;

pub use admin_content_handler::*;
pub use image_upload_handler::*;
pub use public_content_handler::*;
