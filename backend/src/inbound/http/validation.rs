//! Request payload validation helpers.
//!
//! Failures become `400 invalid_request` errors whose details name the field,
//! a machine-readable code and, for lists, the offending index.

use actix_web::web;
use serde_json::json;
use uuid::Uuid;

use crate::domain::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValidationCode {
    MissingField,
    InvalidUuid,
}

impl ValidationCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidUuid => "invalid_uuid",
        }
    }
}

/// Name of a request field as the client spelled it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub(crate) fn as_str(self) -> &'static str {
        self.0
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("missing required field: {field}")).with_details(json!({
        "field": field,
        "code": ValidationCode::MissingField.as_str(),
    }))
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("{field} must be a valid UUID")).with_details(json!({
        "field": field,
        "value": value,
        "code": ValidationCode::InvalidUuid.as_str(),
    }))
}

fn invalid_uuid_index_error(field: FieldName, index: usize, value: &str) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("{field} must contain valid UUIDs")).with_details(json!({
        "field": field,
        "index": index,
        "value": value,
        "code": ValidationCode::InvalidUuid.as_str(),
    }))
}

/// Parse a single UUID-backed identifier.
pub(crate) fn parse_uuid<T: From<Uuid>>(value: &str, field: FieldName) -> Result<T, Error> {
    Uuid::parse_str(value)
        .map(T::from)
        .map_err(|_| invalid_uuid_error(field, value))
}

/// Parse a list of identifiers, reporting the first bad index.
pub(crate) fn parse_uuid_list<T: From<Uuid>>(
    values: &[String],
    field: FieldName,
) -> Result<Vec<T>, Error> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            Uuid::parse_str(value)
                .map(T::from)
                .map_err(|_| invalid_uuid_index_error(field, index, value))
        })
        .collect()
}

/// JSON extractor settings that report body errors in the API error format.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|error, _req| {
        Error::invalid_request(format!("invalid JSON body: {error}"))
            .with_details(json!({"code": "invalid_json"}))
            .into()
    })
}
