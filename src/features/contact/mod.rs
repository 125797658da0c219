//! Contact form.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | POST | `/api/contact` | No | Send the contact form to the site operators |

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;

pub use services::ContactService;
