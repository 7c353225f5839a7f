//! PostgreSQL persistence adapters.
//!
//! Thin translators between Diesel rows and domain types, pooled through
//! `bb8` with `diesel-async`. Row structs and table definitions stay private
//! to this module.

mod diesel_alias_recipient_repository;
mod diesel_error_mapping;
mod models;
mod pool;
mod schema;

pub use diesel_alias_recipient_repository::DieselAliasRecipientRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
