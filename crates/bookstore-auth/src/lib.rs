//! # bookstore-auth
//!
//! HS256 access tokens for the bookstore API. Tokens carry the principal's
//! id, role, and display name; the API layer turns verified claims into a
//! request context.

pub mod jwt;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};
