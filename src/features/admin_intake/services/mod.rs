mod admin_intake_service;

pub use admin_intake_service::{filter_intakes, AdminIntakeService};
