//! Domain ports for the hexagonal boundary.
//!
//! Driving ports ([`AliasRecipientsCommand`], [`AliasRecipientsQuery`]) are
//! called by inbound adapters. The driven port ([`AliasRecipientRepository`])
//! is implemented by persistence adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod alias_recipient_repository;
mod alias_recipients_command;
mod alias_recipients_query;

#[cfg(test)]
pub use alias_recipient_repository::MockAliasRecipientRepository;
pub use alias_recipient_repository::{
    AliasRecipientRepository, AliasRecipientRepositoryError, FixtureAliasRecipientRepository,
};
#[cfg(test)]
pub use alias_recipients_command::MockAliasRecipientsCommand;
pub use alias_recipients_command::{
    AliasRecipientsCommand, AssignRecipientsRequest, FixtureAliasRecipientsCommand,
};
#[cfg(test)]
pub use alias_recipients_query::MockAliasRecipientsQuery;
pub use alias_recipients_query::{
    AliasRecipientsQuery, FixtureAliasRecipientsQuery, ListRecipientsRequest,
};
