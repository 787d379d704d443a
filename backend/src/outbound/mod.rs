//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! `persistence` holds the Diesel/PostgreSQL repositories; `security` holds
//! the bcrypt password-hasher adapter.

pub mod persistence;
pub mod security;
