//! Driving port for reading an alias's recipients.

use async_trait::async_trait;

use crate::domain::{Alias, AliasId, AliasRecipients, Error, IdentityContext};

/// Request to list the recipients linked to an alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRecipientsRequest {
    pub identity: IdentityContext,
    pub alias_id: AliasId,
}

/// Driving port for alias recipient reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AliasRecipientsQuery: Send + Sync {
    /// Return the alias and its recipients ordered by email.
    ///
    /// # Errors
    ///
    /// Returns `not_found` when the caller does not own the alias.
    async fn list(&self, request: ListRecipientsRequest) -> Result<AliasRecipients, Error>;
}

/// Fixture implementation returning an alias without recipients.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAliasRecipientsQuery;

#[async_trait]
impl AliasRecipientsQuery for FixtureAliasRecipientsQuery {
    async fn list(&self, request: ListRecipientsRequest) -> Result<AliasRecipients, Error> {
        Ok(AliasRecipients {
            alias: Alias {
                id: request.alias_id,
                user_id: request.identity.user_id().clone(),
                email: format!("{}@fixture.invalid", request.alias_id),
            },
            recipients: Vec::new(),
        })
    }
}
