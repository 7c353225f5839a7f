//! HTTP inbound adapter exposing REST endpoints.

pub mod alias_recipients;
pub mod error;
pub mod health;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
pub mod validation;

pub use error::ApiResult;
