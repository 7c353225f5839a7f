//! Alias recipient HTTP handlers.
//!
//! ```text
//! POST /alias-recipients
//! GET  /aliases/{alias_id}/recipients
//! ```

use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::domain::ports::{AssignRecipientsRequest, ListRecipientsRequest};
use crate::domain::{Alias, AliasId, AliasRecipients, Error, Recipient, RecipientId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, missing_field_error, parse_uuid, parse_uuid_list,
};

const ALIAS_ID: FieldName = FieldName::new("alias_id");
const RECIPIENT_IDS: FieldName = FieldName::new("recipient_ids");

/// Request payload replacing an alias's recipients.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct AssignRecipientsBody {
    /// Alias to update; must belong to the session user.
    #[schema(example = "6f1c2a9e-4c3b-4d7a-9a55-1b2c3d4e5f60")]
    pub alias_id: Option<String>,
    /// Complete desired recipient set. Duplicates are ignored; an empty list
    /// detaches every recipient.
    pub recipient_ids: Option<Vec<String>>,
}

/// Alias summary returned with its recipients.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AliasResponse {
    pub id: String,
    #[schema(example = "shop@relay.example")]
    pub email: String,
}

impl From<Alias> for AliasResponse {
    fn from(value: Alias) -> Self {
        Self {
            id: value.id.to_string(),
            email: value.email,
        }
    }
}

/// Recipient linked to an alias.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipientResponse {
    pub id: String,
    pub email: String,
    pub verified_at: Option<DateTime<Utc>>,
}

impl From<Recipient> for RecipientResponse {
    fn from(value: Recipient) -> Self {
        Self {
            id: value.id.to_string(),
            email: value.email,
            verified_at: value.verified_at,
        }
    }
}

/// Alias together with its current recipient set.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AliasRecipientsResponse {
    pub alias: AliasResponse,
    pub recipients: Vec<RecipientResponse>,
}

impl From<AliasRecipients> for AliasRecipientsResponse {
    fn from(value: AliasRecipients) -> Self {
        Self {
            alias: value.alias.into(),
            recipients: value.recipients.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
struct ParsedAssignment {
    alias_id: AliasId,
    recipient_ids: Vec<RecipientId>,
}

fn parse_assignment_request(body: AssignRecipientsBody) -> Result<ParsedAssignment, Error> {
    let alias_id = body.alias_id.ok_or_else(|| missing_field_error(ALIAS_ID))?;
    let recipient_ids = body
        .recipient_ids
        .ok_or_else(|| missing_field_error(RECIPIENT_IDS))?;

    Ok(ParsedAssignment {
        alias_id: parse_uuid(&alias_id, ALIAS_ID)?,
        recipient_ids: parse_uuid_list(&recipient_ids, RECIPIENT_IDS)?,
    })
}

/// Replace the recipients of an alias owned by the session user.
#[utoipa::path(
    post,
    path = "/alias-recipients",
    request_body = AssignRecipientsBody,
    responses(
        (status = 200, description = "Recipients replaced", body = AliasRecipientsResponse),
        (status = 400, description = "Malformed request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Alias or recipient not found", body = ErrorSchema),
        (status = 409, description = "Concurrent modification", body = ErrorSchema),
        (
            status = 422,
            description = "Unverified recipient or too many recipients",
            body = ErrorSchema
        ),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["aliases"],
    operation_id = "assignAliasRecipients"
)]
#[post("/alias-recipients")]
pub async fn assign_recipients(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<AssignRecipientsBody>,
) -> ApiResult<web::Json<AliasRecipientsResponse>> {
    let identity = session.require_identity()?;
    let parsed = parse_assignment_request(payload.into_inner())?;
    let requested = parsed.recipient_ids.len();

    let response = state
        .alias_recipients
        .assign(AssignRecipientsRequest {
            identity,
            alias_id: parsed.alias_id,
            recipient_ids: parsed.recipient_ids,
        })
        .await?;

    info!(
        alias_id = %response.alias.id,
        requested,
        linked = response.recipients.len(),
        "alias recipients replaced"
    );
    Ok(web::Json(response.into()))
}

/// List the recipients currently linked to an alias.
#[utoipa::path(
    get,
    path = "/aliases/{alias_id}/recipients",
    params(("alias_id" = String, Path, description = "Alias identifier")),
    responses(
        (status = 200, description = "Current recipients", body = AliasRecipientsResponse),
        (status = 400, description = "Malformed alias id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Alias not found", body = ErrorSchema)
    ),
    tags = ["aliases"],
    operation_id = "listAliasRecipients"
)]
#[get("/aliases/{alias_id}/recipients")]
pub async fn list_recipients(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let identity = session.require_identity()?;
    let alias_id = parse_uuid(&path.into_inner(), ALIAS_ID)?;

    let response = state
        .alias_recipients_query
        .list(ListRecipientsRequest { identity, alias_id })
        .await?;

    Ok(HttpResponse::Ok()
        .insert_header(("Cache-Control", "private, no-cache"))
        .json(AliasRecipientsResponse::from(response)))
}

#[cfg(test)]
#[path = "alias_recipients_tests.rs"]
mod tests;
