//! Alias recipient assignment service.
//!
//! Implements the driving ports for alias recipients on top of an
//! [`AliasRecipientRepository`]. Every check runs before the first write, so a
//! rejected request leaves the stored links exactly as they were.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::domain::ports::{
    AliasRecipientRepository, AliasRecipientRepositoryError, AliasRecipientsCommand,
    AliasRecipientsQuery, AssignRecipientsRequest, ListRecipientsRequest,
};
use crate::domain::{
    Alias, AliasId, AliasRecipients, Error, IdentityContext, Recipient, RecipientChangeSet,
    RecipientId, RecipientLimit, RecipientSelection, RecipientSelectionError,
};

/// Attempts made to apply a change set before reporting a conflict.
const MAX_APPLY_ATTEMPTS: usize = 3;

/// Service implementing [`AliasRecipientsCommand`] and [`AliasRecipientsQuery`].
#[derive(Clone)]
pub struct AliasRecipientsService<R> {
    repo: Arc<R>,
    limit: RecipientLimit,
}

impl<R> AliasRecipientsService<R> {
    /// Create a service enforcing `limit` recipients per alias.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use alias_relay::domain::ports::FixtureAliasRecipientRepository;
    /// use alias_relay::domain::{AliasRecipientsService, RecipientLimit};
    ///
    /// let service = AliasRecipientsService::new(
    ///     Arc::new(FixtureAliasRecipientRepository),
    ///     RecipientLimit::default(),
    /// );
    /// assert_eq!(service.limit().get(), 10);
    /// ```
    pub fn new(repo: Arc<R>, limit: RecipientLimit) -> Self {
        Self { repo, limit }
    }

    pub fn limit(&self) -> RecipientLimit {
        self.limit
    }
}

impl<R> AliasRecipientsService<R>
where
    R: AliasRecipientRepository,
{
    fn map_repository_error(error: AliasRecipientRepositoryError) -> Error {
        match error {
            AliasRecipientRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("alias repository unavailable: {message}"))
            }
            AliasRecipientRepositoryError::Query { message } => {
                Error::internal(format!("alias repository error: {message}"))
            }
            AliasRecipientRepositoryError::StaleLinks => Self::concurrent_update_conflict(),
            AliasRecipientRepositoryError::AliasMissing => {
                Error::not_found("alias not found").with_details(Self::alias_details())
            }
        }
    }

    fn concurrent_update_conflict() -> Error {
        Error::conflict("alias recipients were modified concurrently; retry the request")
            .with_details(json!({
                "field": "recipient_ids",
                "code": "concurrent_update",
            }))
    }

    fn selection_error(error: RecipientSelectionError) -> Error {
        match error {
            RecipientSelectionError::TooMany { limit, requested } => {
                Error::validation_failed(error.to_string()).with_details(json!({
                    "field": "recipient_ids",
                    "code": "too_many_recipients",
                    "limit": limit,
                    "requested": requested,
                }))
            }
        }
    }

    fn alias_not_found(alias_id: AliasId) -> Error {
        Error::not_found(format!("alias {alias_id} not found"))
            .with_details(Self::alias_details())
    }

    fn alias_details() -> serde_json::Value {
        json!({
            "field": "alias_id",
            "code": "alias_not_found",
        })
    }

    fn recipients_not_found(ids: &[RecipientId]) -> Error {
        Error::not_found("one or more recipients were not found").with_details(json!({
            "field": "recipient_ids",
            "code": "recipient_not_found",
            "recipientIds": ids,
        }))
    }

    fn unverified_recipients(ids: &[RecipientId]) -> Error {
        Error::validation_failed("all recipients must be verified").with_details(json!({
            "field": "recipient_ids",
            "code": "unverified_recipient",
            "recipientIds": ids,
        }))
    }

    async fn owned_alias(
        &self,
        identity: &IdentityContext,
        alias_id: AliasId,
    ) -> Result<Alias, Error> {
        self.repo
            .find_alias(identity.user_id(), &alias_id)
            .await
            .map_err(Self::map_repository_error)?
            .ok_or_else(|| Self::alias_not_found(alias_id))
    }

    /// Resolve the selection to owned, verified recipients in selection order.
    async fn eligible_recipients(
        &self,
        identity: &IdentityContext,
        selection: &RecipientSelection,
    ) -> Result<Vec<Recipient>, Error> {
        if selection.is_empty() {
            return Ok(Vec::new());
        }

        let found = self
            .repo
            .find_recipients(identity.user_id(), selection.ids())
            .await
            .map_err(Self::map_repository_error)?;
        let mut by_id: HashMap<RecipientId, Recipient> = found
            .into_iter()
            .filter(|recipient| &recipient.user_id == identity.user_id())
            .map(|recipient| (recipient.id, recipient))
            .collect();

        let missing: Vec<RecipientId> = selection
            .ids()
            .iter()
            .filter(|id| !by_id.contains_key(id))
            .copied()
            .collect();
        if !missing.is_empty() {
            return Err(Self::recipients_not_found(&missing));
        }

        let unverified: Vec<RecipientId> = selection
            .ids()
            .iter()
            .filter(|id| by_id.get(id).is_some_and(|r| !r.is_verified()))
            .copied()
            .collect();
        if !unverified.is_empty() {
            return Err(Self::unverified_recipients(&unverified));
        }

        Ok(selection
            .ids()
            .iter()
            .filter_map(|id| by_id.remove(id))
            .collect())
    }

    /// Re-read the stored links and apply the diff.
    ///
    /// Returns `false` when the store reports the plan as stale.
    async fn replace_links(
        &self,
        identity: &IdentityContext,
        alias_id: AliasId,
        selection: &RecipientSelection,
    ) -> Result<bool, Error> {
        let existing = self
            .repo
            .linked_recipient_ids(&alias_id)
            .await
            .map_err(Self::map_repository_error)?;
        let changes = RecipientChangeSet::between(alias_id, existing, selection);
        if changes.is_noop() {
            return Ok(true);
        }

        match self.repo.apply_changes(identity.user_id(), &changes).await {
            Ok(()) => Ok(true),
            Err(AliasRecipientRepositoryError::StaleLinks) => Ok(false),
            Err(err) => Err(Self::map_repository_error(err)),
        }
    }
}

#[async_trait]
impl<R> AliasRecipientsCommand for AliasRecipientsService<R>
where
    R: AliasRecipientRepository,
{
    async fn assign(&self, request: AssignRecipientsRequest) -> Result<AliasRecipients, Error> {
        let AssignRecipientsRequest {
            identity,
            alias_id,
            recipient_ids,
        } = request;

        let selection =
            RecipientSelection::new(recipient_ids, self.limit).map_err(Self::selection_error)?;

        // Each attempt re-checks ownership and verification against fresh reads.
        for _ in 0..MAX_APPLY_ATTEMPTS {
            let alias = self.owned_alias(&identity, alias_id).await?;
            let recipients = self.eligible_recipients(&identity, &selection).await?;

            if self.replace_links(&identity, alias_id, &selection).await? {
                return Ok(AliasRecipients { alias, recipients });
            }
        }
        Err(Self::concurrent_update_conflict())
    }
}

#[async_trait]
impl<R> AliasRecipientsQuery for AliasRecipientsService<R>
where
    R: AliasRecipientRepository,
{
    async fn list(&self, request: ListRecipientsRequest) -> Result<AliasRecipients, Error> {
        let alias = self.owned_alias(&request.identity, request.alias_id).await?;
        let recipients = self
            .repo
            .list_alias_recipients(&request.alias_id)
            .await
            .map_err(Self::map_repository_error)?;
        Ok(AliasRecipients { alias, recipients })
    }
}

#[cfg(test)]
#[path = "alias_recipients_service_tests.rs"]
mod tests;
