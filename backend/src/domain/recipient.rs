//! Recipient mailboxes that aliases forward to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{RecipientId, UserId};

/// A destination mailbox registered by a user.
///
/// Only verified recipients may be linked to an alias. Verification itself
/// happens elsewhere; this service reads `verified_at` and never writes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    pub id: RecipientId,
    pub user_id: UserId,
    pub email: String,
    pub verified_at: Option<DateTime<Utc>>,
}

impl Recipient {
    /// Returns `true` once the mailbox owner has confirmed the address.
    ///
    /// # Examples
    /// ```
    /// use alias_relay::domain::{Recipient, RecipientId, UserId};
    ///
    /// let recipient = Recipient {
    ///     id: RecipientId::random(),
    ///     user_id: UserId::random(),
    ///     email: "me@example.com".into(),
    ///     verified_at: None,
    /// };
    /// assert!(!recipient.is_verified());
    /// ```
    pub fn is_verified(&self) -> bool {
        self.verified_at.is_some()
    }
}
