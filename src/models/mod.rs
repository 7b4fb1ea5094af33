//! Domain model and request/response DTOs for the catalog API
//!
//! This module defines the property record and the types used for
//! serializing/deserializing HTTP request and response bodies.

pub mod property;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use property::{NewProperty, Property, PropertyPatch, PropertyStatus};
pub use requests::{
    ContactMessage, ContactRequest, CreatePropertyRequest, ListingParams, LoginRequest,
    UpdatePropertyRequest,
};
pub use responses::{
    AuthCheckResponse, ContactResponse, DatabaseHealth, HealthResponse, ListingResponse,
    LoginResponse, MessageResponse, Pagination, UserInfo,
};
