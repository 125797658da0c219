//! News (announcements) and blog posts.
//!
//! Both kinds share one implementation; a [`ContentService`] is built per
//! [`ContentKind`] and its routers mount at the kind's paths.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Auth | Description |
//! |--------|----------|------|-------------|
//! | GET | `/api/news`, `/api/blog` | - | Published items, newest first |
//! | GET | `/api/{news,blog}/categories` | - | Categories of published items |
//! | GET | `/api/{news,blog}/{slug}` | - | Published item with rendered HTML |
//! | GET | `/api/admin/{announcements,blog}` | Admin | All items, filtered |
//! | POST | `/api/admin/{announcements,blog}` | Admin | Create |
//! | GET | `/api/admin/{announcements,blog}/{id}` | Admin | Get by ID |
//! | PATCH | `/api/admin/{announcements,blog}/{id}` | Admin | Partial update |
//! | DELETE | `/api/admin/{announcements,blog}/{id}` | Admin | Delete |
//! | POST | `/api/admin/uploads/images` | Admin | Upload a public image |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use models::ContentKind;
pub use services::{ContentService, ImageUploadService};
