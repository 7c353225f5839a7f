//! Shared Actix app wiring for alias recipient integration suites.

use std::sync::Arc;

use actix_http::Request;
use actix_web::body::BoxBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{App, test, web};
use alias_relay::Trace;
use alias_relay::domain::{AliasRecipientsService, RecipientLimit};
use alias_relay::inbound::http::alias_recipients::{assign_recipients, list_recipients};
use alias_relay::inbound::http::state::HttpState;
use alias_relay::inbound::http::test_utils::test_session_middleware;
use alias_relay::inbound::http::validation::json_config;
use alias_relay::test_support::InMemoryAliasRecipientRepository;

/// Build the HTTP surface over `repo`, as the server does with a database.
pub async fn init_app(
    repo: Arc<InMemoryAliasRecipientRepository>,
    limit: RecipientLimit,
) -> impl Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error> {
    let service = Arc::new(AliasRecipientsService::new(repo, limit));
    test::init_service(
        App::new()
            .app_data(web::Data::new(HttpState::from_service(service)))
            .app_data(json_config())
            .wrap(Trace)
            .wrap(test_session_middleware())
            .service(assign_recipients)
            .service(list_recipients),
    )
    .await
}
