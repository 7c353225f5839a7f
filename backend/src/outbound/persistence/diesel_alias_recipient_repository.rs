//! PostgreSQL-backed `AliasRecipientRepository`.
//!
//! Lookups are filtered by owner in SQL. `apply_changes` locks the alias row
//! for the duration of its transaction, so concurrent replacements of the
//! same alias run one after another and each sees the links the previous one
//! committed. Recipients being added are share-locked and re-checked for
//! ownership and verification inside the same transaction.

use std::collections::BTreeSet;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{AliasRecipientRepository, AliasRecipientRepositoryError};
use crate::domain::{Alias, AliasId, Recipient, RecipientChangeSet, RecipientId, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{AliasRow, NewAliasRecipientRow, RecipientRow};
use super::pool::DbPool;
use super::schema::{alias_recipients, aliases, recipients};

/// Diesel implementation of [`AliasRecipientRepository`].
///
/// # Examples
/// ```no_run
/// use alias_relay::outbound::persistence::{DbPool, DieselAliasRecipientRepository, PoolConfig};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = DbPool::new(PoolConfig::new("postgres://localhost/relay")).await?;
/// let _repo = DieselAliasRecipientRepository::new(pool);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct DieselAliasRecipientRepository {
    pool: DbPool,
}

impl DieselAliasRecipientRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Reasons an `apply_changes` transaction rolls back.
#[derive(Debug)]
enum ApplyFailure {
    Database(diesel::result::Error),
    AliasMissing,
    Stale,
}

impl From<diesel::result::Error> for ApplyFailure {
    fn from(error: diesel::result::Error) -> Self {
        Self::Database(error)
    }
}

impl From<ApplyFailure> for AliasRecipientRepositoryError {
    fn from(failure: ApplyFailure) -> Self {
        match failure {
            ApplyFailure::Database(error) => map_diesel_error(error),
            ApplyFailure::AliasMissing => Self::alias_missing(),
            ApplyFailure::Stale => Self::stale_links(),
        }
    }
}

fn uuids(ids: &[RecipientId]) -> Vec<Uuid> {
    ids.iter().map(|id| *id.as_uuid()).collect()
}

#[async_trait]
impl AliasRecipientRepository for DieselAliasRecipientRepository {
    async fn find_alias(
        &self,
        owner: &UserId,
        alias_id: &AliasId,
    ) -> Result<Option<Alias>, AliasRecipientRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<AliasRow> = aliases::table
            .filter(aliases::id.eq(alias_id.as_uuid()))
            .filter(aliases::user_id.eq(owner.as_uuid()))
            .select(AliasRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(Alias::from))
    }

    async fn find_recipients(
        &self,
        owner: &UserId,
        ids: &[RecipientId],
    ) -> Result<Vec<Recipient>, AliasRecipientRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<RecipientRow> = recipients::table
            .filter(recipients::user_id.eq(owner.as_uuid()))
            .filter(recipients::id.eq_any(uuids(ids)))
            .select(RecipientRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(Recipient::from).collect())
    }

    async fn linked_recipient_ids(
        &self,
        alias_id: &AliasId,
    ) -> Result<Vec<RecipientId>, AliasRecipientRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let ids: Vec<Uuid> = alias_recipients::table
            .filter(alias_recipients::alias_id.eq(alias_id.as_uuid()))
            .select(alias_recipients::recipient_id)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(ids.into_iter().map(RecipientId::from_uuid).collect())
    }

    async fn list_alias_recipients(
        &self,
        alias_id: &AliasId,
    ) -> Result<Vec<Recipient>, AliasRecipientRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<RecipientRow> = alias_recipients::table
            .inner_join(recipients::table)
            .filter(alias_recipients::alias_id.eq(alias_id.as_uuid()))
            .order(recipients::email.asc())
            .select(RecipientRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(Recipient::from).collect())
    }

    async fn apply_changes(
        &self,
        owner: &UserId,
        changes: &RecipientChangeSet,
    ) -> Result<(), AliasRecipientRepositoryError> {
        let owner = *owner.as_uuid();
        let alias_id = *changes.alias_id().as_uuid();
        let expected: BTreeSet<Uuid> = changes.expected().iter().map(|id| *id.as_uuid()).collect();
        let to_remove = uuids(changes.to_remove());
        let to_add = uuids(changes.to_add());
        let new_rows: Vec<NewAliasRecipientRow> = to_add
            .iter()
            .map(|recipient_id| NewAliasRecipientRow {
                alias_id,
                recipient_id: *recipient_id,
            })
            .collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction::<_, ApplyFailure, _>(|conn| {
            async move {
                let locked: Option<Uuid> = aliases::table
                    .filter(aliases::id.eq(alias_id))
                    .filter(aliases::user_id.eq(owner))
                    .select(aliases::id)
                    .for_update()
                    .get_result(conn)
                    .await
                    .optional()?;
                if locked.is_none() {
                    return Err(ApplyFailure::AliasMissing);
                }

                let current: BTreeSet<Uuid> = alias_recipients::table
                    .filter(alias_recipients::alias_id.eq(alias_id))
                    .select(alias_recipients::recipient_id)
                    .load::<Uuid>(conn)
                    .await?
                    .into_iter()
                    .collect();
                if current != expected {
                    debug!(%alias_id, "alias links changed since planning");
                    return Err(ApplyFailure::Stale);
                }

                if !to_add.is_empty() {
                    let addable: Vec<Uuid> = recipients::table
                        .filter(recipients::id.eq_any(&to_add))
                        .filter(recipients::user_id.eq(owner))
                        .filter(recipients::verified_at.is_not_null())
                        .select(recipients::id)
                        .for_share()
                        .load(conn)
                        .await?;
                    if addable.len() != to_add.len() {
                        debug!(%alias_id, "recipients changed since planning");
                        return Err(ApplyFailure::Stale);
                    }
                }

                if !to_remove.is_empty() {
                    diesel::delete(
                        alias_recipients::table
                            .filter(alias_recipients::alias_id.eq(alias_id))
                            .filter(alias_recipients::recipient_id.eq_any(&to_remove)),
                    )
                    .execute(conn)
                    .await?;
                }
                if !new_rows.is_empty() {
                    diesel::insert_into(alias_recipients::table)
                        .values(&new_rows)
                        .on_conflict_do_nothing()
                        .execute(conn)
                        .await?;
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(AliasRecipientRepositoryError::from)
    }
}
