//! Driving port for replacing an alias's recipients.
//!
//! HTTP handlers call [`AliasRecipientsCommand`] with the acting user's
//! [`IdentityContext`]; the implementation validates ownership, verification
//! and the recipient cap before touching any link.

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::{
    Alias, AliasId, AliasRecipients, Error, IdentityContext, Recipient, RecipientId,
};

/// Request to replace the full recipient set of an alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignRecipientsRequest {
    pub identity: IdentityContext,
    pub alias_id: AliasId,
    /// Desired recipients. Duplicates are collapsed; an empty list detaches
    /// every recipient.
    pub recipient_ids: Vec<RecipientId>,
}

/// Driving port for alias recipient mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AliasRecipientsCommand: Send + Sync {
    /// Replace the recipients of an alias, all or nothing.
    ///
    /// # Errors
    ///
    /// - `validation_failed` when the request exceeds the recipient cap or
    ///   names an unverified recipient.
    /// - `not_found` when the alias or a recipient is not owned by the caller.
    /// - `conflict` when concurrent updates keep invalidating the plan.
    /// - `service_unavailable` or `internal_error` on storage failures.
    async fn assign(&self, request: AssignRecipientsRequest) -> Result<AliasRecipients, Error>;
}

/// Fixture implementation used when no database is configured.
///
/// Echoes the request back as if every recipient existed and was verified.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAliasRecipientsCommand;

#[async_trait]
impl AliasRecipientsCommand for FixtureAliasRecipientsCommand {
    async fn assign(&self, request: AssignRecipientsRequest) -> Result<AliasRecipients, Error> {
        let owner = request.identity.user_id().clone();
        let verified_at = Some(Utc::now());
        let mut recipients: Vec<Recipient> = Vec::new();
        for id in request.recipient_ids {
            if recipients.iter().any(|r| r.id == id) {
                continue;
            }
            recipients.push(Recipient {
                id,
                user_id: owner.clone(),
                email: format!("{id}@fixture.invalid"),
                verified_at,
            });
        }

        Ok(AliasRecipients {
            alias: Alias {
                id: request.alias_id,
                user_id: owner,
                email: format!("{}@fixture.invalid", request.alias_id),
            },
            recipients,
        })
    }
}
