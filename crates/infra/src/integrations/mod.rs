//! External service integrations

pub mod hubspot;
