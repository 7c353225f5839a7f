//! Port for alias, recipient and link persistence.
//!
//! Every lookup takes the owning user so adapters can scope queries by owner;
//! a row owned by someone else is reported exactly like a missing row.

use async_trait::async_trait;

use crate::domain::{Alias, AliasId, Recipient, RecipientChangeSet, RecipientId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by alias recipient repository adapters.
    pub enum AliasRecipientRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "alias recipient repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "alias recipient repository query failed: {message}",
        /// The stored links, or a recipient being added, changed after the
        /// change set was planned.
        StaleLinks =>
            "alias recipient links changed concurrently",
        /// The alias disappeared, or changed owner, before the change applied.
        AliasMissing =>
            "alias no longer exists for this owner",
    }
}

/// Storage for aliases, recipients and the links between them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AliasRecipientRepository: Send + Sync {
    /// Fetch an alias owned by `owner`.
    async fn find_alias(
        &self,
        owner: &UserId,
        alias_id: &AliasId,
    ) -> Result<Option<Alias>, AliasRecipientRepositoryError>;

    /// Fetch the subset of `ids` that exist and belong to `owner`.
    ///
    /// Order of the returned recipients is unspecified.
    async fn find_recipients(
        &self,
        owner: &UserId,
        ids: &[RecipientId],
    ) -> Result<Vec<Recipient>, AliasRecipientRepositoryError>;

    /// Identifiers of the recipients currently linked to an alias.
    async fn linked_recipient_ids(
        &self,
        alias_id: &AliasId,
    ) -> Result<Vec<RecipientId>, AliasRecipientRepositoryError>;

    /// Recipients currently linked to an alias, ordered by email.
    async fn list_alias_recipients(
        &self,
        alias_id: &AliasId,
    ) -> Result<Vec<Recipient>, AliasRecipientRepositoryError>;

    /// Apply a planned change set atomically.
    ///
    /// Implementations must serialise concurrent calls for the same alias and
    /// return [`AliasRecipientRepositoryError::StaleLinks`] without mutating
    /// anything when the stored links no longer equal
    /// [`RecipientChangeSet::expected`], or when a recipient in
    /// [`RecipientChangeSet::to_add`] is no longer owned by `owner` and
    /// verified. Links present in both sets are left untouched.
    async fn apply_changes(
        &self,
        owner: &UserId,
        changes: &RecipientChangeSet,
    ) -> Result<(), AliasRecipientRepositoryError>;
}

/// Fixture implementation used when no database is configured.
///
/// Knows no aliases or recipients and accepts every change set.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAliasRecipientRepository;

#[async_trait]
impl AliasRecipientRepository for FixtureAliasRecipientRepository {
    async fn find_alias(
        &self,
        _owner: &UserId,
        _alias_id: &AliasId,
    ) -> Result<Option<Alias>, AliasRecipientRepositoryError> {
        Ok(None)
    }

    async fn find_recipients(
        &self,
        _owner: &UserId,
        _ids: &[RecipientId],
    ) -> Result<Vec<Recipient>, AliasRecipientRepositoryError> {
        Ok(Vec::new())
    }

    async fn linked_recipient_ids(
        &self,
        _alias_id: &AliasId,
    ) -> Result<Vec<RecipientId>, AliasRecipientRepositoryError> {
        Ok(Vec::new())
    }

    async fn list_alias_recipients(
        &self,
        _alias_id: &AliasId,
    ) -> Result<Vec<Recipient>, AliasRecipientRepositoryError> {
        Ok(Vec::new())
    }

    async fn apply_changes(
        &self,
        _owner: &UserId,
        _changes: &RecipientChangeSet,
    ) -> Result<(), AliasRecipientRepositoryError> {
        Ok(())
    }
}
