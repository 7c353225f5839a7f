//! Builders for HTTP state ports.

use std::sync::Arc;

use actix_web::web;

use alias_relay::domain::ports::AliasRecipientRepository;
use alias_relay::domain::{AliasRecipientsService, RecipientLimit};
use alias_relay::inbound::http::state::HttpState;
use alias_relay::outbound::persistence::DieselAliasRecipientRepository;

use super::ServerConfig;

/// Build HTTP state from a repository when one is available, otherwise from
/// fixture ports.
fn build_state_with<Pool, R>(
    pool: &Option<Pool>,
    limit: RecipientLimit,
    make_repo: impl FnOnce(&Pool) -> R,
) -> HttpState
where
    R: AliasRecipientRepository + 'static,
{
    match pool {
        Some(pool) => {
            let service = AliasRecipientsService::new(Arc::new(make_repo(pool)), limit);
            HttpState::from_service(Arc::new(service))
        }
        None => HttpState::fixtures(),
    }
}

/// Build the shared HTTP state for the configured storage.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    web::Data::new(build_state_with(
        &config.db_pool,
        config.recipient_limit,
        |pool| DieselAliasRecipientRepository::new(pool.clone()),
    ))
}
