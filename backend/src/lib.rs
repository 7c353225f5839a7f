//! Alias recipient management backend.
//!
//! `domain` holds the assignment rules and ports, `inbound` the HTTP
//! adapters and `outbound` the PostgreSQL adapters.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
