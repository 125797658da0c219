//! Intake (business diagnosis) form.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | POST | `/api/intake` | No | Submit the form, JSON or multipart with attachments |
//!
//! A submission is validated, its files are uploaded to private storage,
//! the record is inserted and then the admin and submitter emails are sent.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::{IntakeNotifier, IntakeService};
