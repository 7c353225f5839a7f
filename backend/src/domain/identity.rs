//! Acting-user context resolved once per request.

use super::UserId;

/// The authenticated user on whose behalf an operation runs.
///
/// Built by inbound adapters from the session and passed explicitly into
/// domain services. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityContext {
    user_id: UserId,
}

impl IdentityContext {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    /// The acting user; every lookup is scoped to this owner.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }
}
