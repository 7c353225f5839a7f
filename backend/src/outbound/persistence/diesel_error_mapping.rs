//! Translation of pool and Diesel failures into repository port errors.
//!
//! Messages handed to the domain are stable and generic; the raw database
//! message is only logged at debug level.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::AliasRecipientRepositoryError;

use super::pool::PoolError;

pub(crate) fn map_pool_error(error: PoolError) -> AliasRecipientRepositoryError {
    AliasRecipientRepositoryError::connection(error.into_message())
}

pub(crate) fn map_diesel_error(error: DieselError) -> AliasRecipientRepositoryError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::NotFound => AliasRecipientRepositoryError::query("record not found"),
        DieselError::QueryBuilderError(_) => {
            AliasRecipientRepositoryError::query("database query error")
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            AliasRecipientRepositoryError::connection("database connection error")
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
            AliasRecipientRepositoryError::query("recipient or alias was removed concurrently")
        }
        _ => AliasRecipientRepositoryError::query("database error"),
    }
}
