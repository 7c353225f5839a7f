//! Test utilities for the backend crate.
//!
//! Compiled for unit tests and, behind the `test-support` feature, for the
//! integration suites in `tests/`.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::{Clock, DefaultClock};

use crate::domain::ports::{AliasRecipientRepository, AliasRecipientRepositoryError};
use crate::domain::{Alias, AliasId, Recipient, RecipientChangeSet, RecipientId, UserId};

#[derive(Default)]
struct Store {
    aliases: HashMap<AliasId, Alias>,
    recipients: HashMap<RecipientId, Recipient>,
    links: HashMap<(AliasId, RecipientId), DateTime<Utc>>,
}

/// In-memory [`AliasRecipientRepository`] with seeding helpers.
///
/// Applies change sets under a single lock, so the stale-link check behaves
/// like the row lock taken by the database adapter.
///
/// # Examples
/// ```
/// use alias_relay::domain::UserId;
/// use alias_relay::test_support::InMemoryAliasRecipientRepository;
///
/// let repo = InMemoryAliasRecipientRepository::default();
/// let owner = UserId::random();
/// let alias = repo.add_alias(&owner, "shop@relay.example");
/// assert_eq!(repo.link_count(&alias.id), 0);
/// ```
pub struct InMemoryAliasRecipientRepository {
    store: Mutex<Store>,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryAliasRecipientRepository {
    fn default() -> Self {
        Self::with_clock(Arc::new(DefaultClock))
    }
}

impl InMemoryAliasRecipientRepository {
    /// Stamp new links with timestamps from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            store: Mutex::new(Store::default()),
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        match self.store.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Seed an alias owned by `owner`.
    pub fn add_alias(&self, owner: &UserId, email: &str) -> Alias {
        let alias = Alias {
            id: AliasId::random(),
            user_id: owner.clone(),
            email: email.to_owned(),
        };
        self.lock().aliases.insert(alias.id, alias.clone());
        alias
    }

    /// Seed a recipient owned by `owner`, verified or not.
    pub fn add_recipient(&self, owner: &UserId, email: &str, verified: bool) -> Recipient {
        let recipient = Recipient {
            id: RecipientId::random(),
            user_id: owner.clone(),
            email: email.to_owned(),
            verified_at: verified.then(|| self.clock.utc()),
        };
        self.lock()
            .recipients
            .insert(recipient.id, recipient.clone());
        recipient
    }

    /// Clear a recipient's verification, as the verification workflow would.
    pub fn revoke_verification(&self, recipient_id: &RecipientId) {
        if let Some(recipient) = self.lock().recipients.get_mut(recipient_id) {
            recipient.verified_at = None;
        }
    }

    /// Link a recipient directly, bypassing every check.
    pub fn link(&self, alias_id: &AliasId, recipient_id: &RecipientId) {
        let now = self.clock.utc();
        self.lock().links.insert((*alias_id, *recipient_id), now);
    }

    /// Remove an alias and, as the database cascade would, its links.
    pub fn remove_alias(&self, alias_id: &AliasId) {
        let mut store = self.lock();
        store.aliases.remove(alias_id);
        store.links.retain(|(alias, _), _| alias != alias_id);
    }

    /// Number of recipients linked to an alias.
    pub fn link_count(&self, alias_id: &AliasId) -> usize {
        self.lock()
            .links
            .keys()
            .filter(|(alias, _)| alias == alias_id)
            .count()
    }

    /// Linked recipient identifiers, sorted.
    pub fn linked(&self, alias_id: &AliasId) -> BTreeSet<RecipientId> {
        linked_in(&self.lock(), alias_id)
    }

    /// When a link was created, if it exists.
    pub fn link_created_at(
        &self,
        alias_id: &AliasId,
        recipient_id: &RecipientId,
    ) -> Option<DateTime<Utc>> {
        self.lock().links.get(&(*alias_id, *recipient_id)).copied()
    }
}

fn linked_in(store: &Store, alias_id: &AliasId) -> BTreeSet<RecipientId> {
    store
        .links
        .keys()
        .filter(|(alias, _)| alias == alias_id)
        .map(|(_, recipient)| *recipient)
        .collect()
}

#[async_trait]
impl AliasRecipientRepository for InMemoryAliasRecipientRepository {
    async fn find_alias(
        &self,
        owner: &UserId,
        alias_id: &AliasId,
    ) -> Result<Option<Alias>, AliasRecipientRepositoryError> {
        Ok(self
            .lock()
            .aliases
            .get(alias_id)
            .filter(|alias| alias.is_owned_by(owner))
            .cloned())
    }

    async fn find_recipients(
        &self,
        owner: &UserId,
        ids: &[RecipientId],
    ) -> Result<Vec<Recipient>, AliasRecipientRepositoryError> {
        let store = self.lock();
        let unique: BTreeSet<&RecipientId> = ids.iter().collect();
        Ok(unique
            .into_iter()
            .filter_map(|id| store.recipients.get(id))
            .filter(|recipient| &recipient.user_id == owner)
            .cloned()
            .collect())
    }

    async fn linked_recipient_ids(
        &self,
        alias_id: &AliasId,
    ) -> Result<Vec<RecipientId>, AliasRecipientRepositoryError> {
        Ok(self.linked(alias_id).into_iter().collect())
    }

    async fn list_alias_recipients(
        &self,
        alias_id: &AliasId,
    ) -> Result<Vec<Recipient>, AliasRecipientRepositoryError> {
        let store = self.lock();
        let mut recipients: Vec<Recipient> = linked_in(&store, alias_id)
            .iter()
            .filter_map(|id| store.recipients.get(id))
            .cloned()
            .collect();
        recipients.sort_by(|left, right| left.email.cmp(&right.email));
        Ok(recipients)
    }

    async fn apply_changes(
        &self,
        owner: &UserId,
        changes: &RecipientChangeSet,
    ) -> Result<(), AliasRecipientRepositoryError> {
        let now = self.clock.utc();
        let mut store = self.lock();
        let alias_id = changes.alias_id();

        let owned = store
            .aliases
            .get(&alias_id)
            .is_some_and(|alias| alias.is_owned_by(owner));
        if !owned {
            return Err(AliasRecipientRepositoryError::alias_missing());
        }
        if &linked_in(&store, &alias_id) != changes.expected() {
            return Err(AliasRecipientRepositoryError::stale_links());
        }
        let addable = changes.to_add().iter().all(|id| {
            store
                .recipients
                .get(id)
                .is_some_and(|recipient| &recipient.user_id == owner && recipient.is_verified())
        });
        if !addable {
            return Err(AliasRecipientRepositoryError::stale_links());
        }

        for recipient_id in changes.to_remove() {
            store.links.remove(&(alias_id, *recipient_id));
        }
        for recipient_id in changes.to_add() {
            store.links.entry((alias_id, *recipient_id)).or_insert(now);
        }
        Ok(())
    }
}
