//! Diesel table definitions for the PostgreSQL schema.
//!
//! Must match `backend/migrations` exactly; regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Owners of aliases and recipients. Managed by the account service.
    users (id) {
        id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Forwarding aliases; `email` is globally unique.
    aliases (id) {
        id -> Uuid,
        user_id -> Uuid,
        email -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Destination mailboxes; unique per `(user_id, email)`.
    recipients (id) {
        id -> Uuid,
        user_id -> Uuid,
        email -> Varchar,
        /// Null until the owner confirms the address.
        verified_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Join table linking aliases to recipients. Rows cascade away with
    /// either side.
    alias_recipients (alias_id, recipient_id) {
        alias_id -> Uuid,
        recipient_id -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(aliases -> users (user_id));
diesel::joinable!(recipients -> users (user_id));
diesel::joinable!(alias_recipients -> aliases (alias_id));
diesel::joinable!(alias_recipients -> recipients (recipient_id));

diesel::allow_tables_to_appear_in_same_query!(users, aliases, recipients, alias_recipients);
