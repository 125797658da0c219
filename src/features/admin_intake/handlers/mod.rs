pub mod admin_intake_handler;

pub use admin_intake_handler::*;
