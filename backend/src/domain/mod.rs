//! Domain primitives, services and ports.
//!
//! Purpose: model aliases, recipients and the links between them, and hold the
//! rules for replacing an alias's recipient set. Types here know nothing about
//! HTTP or SQL; adapters reach them through [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and stable identifiers.
//! - Alias, Recipient, AliasRecipients: entities returned by the service.
//! - RecipientSelection / RecipientChangeSet: request validation and planning.
//! - AliasRecipientsService: implementation of the driving ports.

pub mod error;
pub mod ports;
pub mod trace_id;
pub mod user;

mod alias;
mod alias_recipients;
mod alias_recipients_service;
mod identifiers;
mod identity;
mod recipient;

pub use self::alias::Alias;
pub use self::alias_recipients::{
    AliasRecipients, DEFAULT_MAX_RECIPIENTS, RecipientChangeSet, RecipientLimit,
    RecipientSelection, RecipientSelectionError, ZeroRecipientLimit,
};
pub use self::alias_recipients_service::AliasRecipientsService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::identifiers::{AliasId, RecipientId};
pub use self::identity::IdentityContext;
pub use self::recipient::Recipient;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{UserId, UserValidationError};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use alias_relay::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::not_found("no such alias"))
/// }
/// # assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
