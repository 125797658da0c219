mod admin_intake_dto;

pub use admin_intake_dto::*;
