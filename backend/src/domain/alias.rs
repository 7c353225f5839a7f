//! Forwarding alias owned by a user.

use serde::{Deserialize, Serialize};

use super::{AliasId, UserId};

/// An email alias whose inbound mail is forwarded to its recipients.
///
/// ## Invariants
/// - `user_id` owns the alias; every linked recipient shares this owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alias {
    pub id: AliasId,
    pub user_id: UserId,
    /// Forwarding address, e.g. `shop@relay.example`.
    pub email: String,
}

impl Alias {
    /// Whether `user_id` owns this alias.
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }
}
