//! Internal Diesel row structs.
//!
//! Persistence details only; repositories convert these into domain types
//! before returning.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{Alias, AliasId, Recipient, RecipientId, UserId};

use super::schema::{alias_recipients, aliases, recipients};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = aliases)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AliasRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub email: String,
}

impl From<AliasRow> for Alias {
    fn from(row: AliasRow) -> Self {
        Self {
            id: AliasId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            email: row.email,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = recipients)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RecipientRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub email: String,
    pub verified_at: Option<DateTime<Utc>>,
}

impl From<RecipientRow> for Recipient {
    fn from(row: RecipientRow) -> Self {
        Self {
            id: RecipientId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            email: row.email,
            verified_at: row.verified_at,
        }
    }
}

/// New link; `created_at` is filled by the column default.
#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = alias_recipients)]
pub(crate) struct NewAliasRecipientRow {
    pub alias_id: Uuid,
    pub recipient_id: Uuid,
}
