//! API-level shared code (authentication primitives)

pub mod auth;
