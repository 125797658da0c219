//! Admin review of intake submissions.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/admin/intake` | Admin | Filtered, paginated list |
//! | GET | `/api/admin/intake/summary` | Admin | Count per status |
//! | GET | `/api/admin/intake/{id}` | Admin | Detail with signed attachment URLs |
//! | PATCH | `/api/admin/intake/{id}/status` | Admin | Update status and note |

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;

pub use services::AdminIntakeService;
