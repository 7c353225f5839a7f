//! Outbound adapters implementing driven ports.
//!
//! Only PostgreSQL persistence is needed; see [`persistence`].

pub mod persistence;
