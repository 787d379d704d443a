//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every helper returns the domain error shape with a `field`/`code`
//! details object so clients can map failures back onto form fields.

use chrono::NaiveDate;
use serde_json::json;
use uuid::Uuid;

use crate::domain::Error;

pub(crate) fn missing_field_error(field: &'static str) -> Error {
    Error::invalid_request(format!("missing required field: {field}")).with_details(json!({
        "field": field,
        "code": "missing_field",
    }))
}

pub(crate) fn invalid_field_error(field: &'static str, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": "invalid_field",
    }))
}

pub(crate) fn parse_uuid(value: &str, field: &'static str) -> Result<Uuid, Error> {
    Uuid::parse_str(value).map_err(|_| {
        Error::invalid_request(format!("{field} must be a valid UUID")).with_details(json!({
            "field": field,
            "value": value,
            "code": "invalid_uuid",
        }))
    })
}

pub(crate) fn parse_uuid_list(values: &[String], field: &'static str) -> Result<Vec<Uuid>, Error> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            Uuid::parse_str(value).map_err(|_| {
                Error::invalid_request(format!("{field} must contain valid UUIDs")).with_details(
                    json!({
                        "field": field,
                        "index": index,
                        "value": value,
                        "code": "invalid_uuid",
                    }),
                )
            })
        })
        .collect()
}

pub(crate) fn parse_date(value: &str, field: &'static str) -> Result<NaiveDate, Error> {
    crate::domain::reconciliation::parse_entry_date(value).ok_or_else(|| {
        Error::invalid_request(format!("{field} must be a calendar date (YYYY-MM-DD)"))
            .with_details(json!({
                "field": field,
                "value": value,
                "code": "invalid_date",
            }))
    })
}
