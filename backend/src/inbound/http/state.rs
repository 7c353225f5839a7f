//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and depend only on driving
//! ports, so they can be exercised without a database.

use std::sync::Arc;

use crate::domain::ports::{
    AliasRecipientsCommand, AliasRecipientsQuery, FixtureAliasRecipientsCommand,
    FixtureAliasRecipientsQuery,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub alias_recipients: Arc<dyn AliasRecipientsCommand>,
    pub alias_recipients_query: Arc<dyn AliasRecipientsQuery>,
}

impl HttpState {
    /// Bundle the command and query ports.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use alias_relay::domain::ports::{FixtureAliasRecipientsCommand, FixtureAliasRecipientsQuery};
    /// use alias_relay::inbound::http::state::HttpState;
    ///
    /// let state = HttpState::new(
    ///     Arc::new(FixtureAliasRecipientsCommand),
    ///     Arc::new(FixtureAliasRecipientsQuery),
    /// );
    /// let _command = state.alias_recipients.clone();
    /// ```
    pub fn new(
        alias_recipients: Arc<dyn AliasRecipientsCommand>,
        alias_recipients_query: Arc<dyn AliasRecipientsQuery>,
    ) -> Self {
        Self {
            alias_recipients,
            alias_recipients_query,
        }
    }

    /// Wire one service that implements both driving ports.
    pub fn from_service<S>(service: Arc<S>) -> Self
    where
        S: AliasRecipientsCommand + AliasRecipientsQuery + 'static,
    {
        Self {
            alias_recipients: service.clone(),
            alias_recipients_query: service,
        }
    }

    /// State backed by fixture ports, used when no database is configured.
    pub fn fixtures() -> Self {
        Self::new(
            Arc::new(FixtureAliasRecipientsCommand),
            Arc::new(FixtureAliasRecipientsQuery),
        )
    }
}
