//! API Module
//!
//! HTTP handlers and routing for the catalog REST API.
//!
//! # Endpoints
//! - `GET /api/properties` - Filtered, paginated listing
//! - `GET /api/properties/:id` - Single property
//! - `POST /api/properties` - Create (admin)
//! - `PUT /api/properties/:id` - Partial update (admin)
//! - `DELETE /api/properties/:id` - Delete (admin)
//! - `POST /api/contact` - Contact form
//! - `POST /api/login` - Exchange credentials for a token (rate limited per client)
//! - `GET /api/auth-check` - Validate a token
//! - `GET /api/health` - Health check endpoint

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use handlers::*;
pub use middleware::LoginLimiter;
pub use routes::create_router;
