//! Validation and planning for alias recipient replacement.
//!
//! A request names the complete recipient set an alias should end up with.
//! [`RecipientSelection`] normalises that request and enforces the per-alias
//! cap; [`RecipientChangeSet`] diffs it against the links already stored so
//! unchanged links are never rewritten.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::num::NonZeroU16;

use serde::{Deserialize, Serialize};

use super::{Alias, AliasId, Recipient, RecipientId};

/// Default cap on recipients linked to one alias.
pub const DEFAULT_MAX_RECIPIENTS: u16 = 10;

/// Upper bound on the number of recipients linked to a single alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecipientLimit(NonZeroU16);

/// Raised when a configured limit cannot be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("recipient limit must be at least 1")]
pub struct ZeroRecipientLimit;

impl RecipientLimit {
    /// Validate a configured limit.
    ///
    /// # Examples
    /// ```
    /// use alias_relay::domain::RecipientLimit;
    ///
    /// assert_eq!(RecipientLimit::new(3).expect("non-zero").get(), 3);
    /// assert!(RecipientLimit::new(0).is_err());
    /// ```
    pub fn new(limit: u16) -> Result<Self, ZeroRecipientLimit> {
        NonZeroU16::new(limit).map(Self).ok_or(ZeroRecipientLimit)
    }

    pub fn get(self) -> u16 {
        self.0.get()
    }
}

impl Default for RecipientLimit {
    fn default() -> Self {
        Self(NonZeroU16::MIN.saturating_add(DEFAULT_MAX_RECIPIENTS - 1))
    }
}

impl fmt::Display for RecipientLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors raised while normalising a requested recipient set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RecipientSelectionError {
    #[error("an alias may have at most {limit} recipients, {requested} requested")]
    TooMany { limit: u16, requested: usize },
}

/// Distinct recipient identifiers in first-seen order, within the limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientSelection {
    ids: Vec<RecipientId>,
}

impl RecipientSelection {
    /// Collapse duplicates and enforce `limit`.
    ///
    /// The count is taken after collapsing, since a replace leaves the alias
    /// with exactly the distinct requested recipients.
    ///
    /// # Examples
    /// ```
    /// use alias_relay::domain::{RecipientId, RecipientLimit, RecipientSelection};
    ///
    /// let a = RecipientId::random();
    /// let b = RecipientId::random();
    /// let limit = RecipientLimit::new(2).expect("non-zero");
    /// let selection = RecipientSelection::new(vec![a, b, a], limit).expect("within limit");
    /// assert_eq!(selection.ids(), &[a, b]);
    /// ```
    pub fn new(
        requested: impl IntoIterator<Item = RecipientId>,
        limit: RecipientLimit,
    ) -> Result<Self, RecipientSelectionError> {
        let mut seen = HashSet::new();
        let ids: Vec<RecipientId> = requested
            .into_iter()
            .filter(|id| seen.insert(*id))
            .collect();

        if ids.len() > usize::from(limit.get()) {
            return Err(RecipientSelectionError::TooMany {
                limit: limit.get(),
                requested: ids.len(),
            });
        }
        Ok(Self { ids })
    }

    pub fn ids(&self) -> &[RecipientId] {
        &self.ids
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }
}

/// Link mutations that turn an alias's stored set into the requested one.
///
/// `expected` records the stored set the plan was computed from. Adapters
/// compare it with the links they see inside their transaction and refuse to
/// apply a plan made against a set that has since changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientChangeSet {
    alias_id: AliasId,
    expected: BTreeSet<RecipientId>,
    to_add: Vec<RecipientId>,
    to_remove: Vec<RecipientId>,
}

impl RecipientChangeSet {
    /// Diff the stored links against `selection`.
    pub fn between(
        alias_id: AliasId,
        existing: impl IntoIterator<Item = RecipientId>,
        selection: &RecipientSelection,
    ) -> Self {
        let expected: BTreeSet<RecipientId> = existing.into_iter().collect();
        let requested: HashSet<RecipientId> = selection.ids().iter().copied().collect();

        let to_add = selection
            .ids()
            .iter()
            .filter(|id| !expected.contains(id))
            .copied()
            .collect();
        let to_remove = expected
            .iter()
            .filter(|id| !requested.contains(id))
            .copied()
            .collect();

        Self {
            alias_id,
            expected,
            to_add,
            to_remove,
        }
    }

    pub fn alias_id(&self) -> AliasId {
        self.alias_id
    }

    pub fn expected(&self) -> &BTreeSet<RecipientId> {
        &self.expected
    }

    pub fn to_add(&self) -> &[RecipientId] {
        &self.to_add
    }

    pub fn to_remove(&self) -> &[RecipientId] {
        &self.to_remove
    }

    /// `true` when the stored set already matches the request.
    pub fn is_noop(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// An alias together with its linked recipients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AliasRecipients {
    pub alias: Alias,
    pub recipients: Vec<Recipient>,
}
