//! Modules layer - Infrastructure components for external integrations
//!
//! Contains clients and adapters for object storage and transactional email.

pub mod email;
pub mod storage;
