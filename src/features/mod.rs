//! Features layer - one directory per API area
//!
//! Each feature owns its DTOs, handlers, routes and services.

pub mod admin_intake;
pub mod auth;
pub mod contact;
pub mod content;
pub mod intake;
