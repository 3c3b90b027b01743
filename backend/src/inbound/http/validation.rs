//! Shared validation helpers for inbound HTTP adapters.
//!
//! All helpers produce `invalid_request` errors carrying a `details` object
//! with the offending field so clients can attribute failures.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::therapist::SlotTime;

pub(crate) fn missing_field_error(field: &str) -> Error {
    Error::invalid_request(format!("missing required field: {field}")).with_details(json!({
        "field": field,
        "code": "missing_field",
    }))
}

pub(crate) fn invalid_value_error(field: &str, message: impl Into<String>, value: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "value": value,
        "code": "invalid_value",
    }))
}

/// Parse an enum-like value via its `FromStr` implementation.
pub(crate) fn parse_enum<T: FromStr>(value: String, field: &str) -> Result<T, Error> {
    value
        .parse()
        .map_err(|_| invalid_value_error(field, format!("invalid {field} value"), &value))
}

pub(crate) fn parse_optional_enum<T: FromStr>(
    value: Option<String>,
    field: &str,
) -> Result<Option<T>, Error> {
    value.map(|raw| parse_enum(raw, field)).transpose()
}

/// Parse a `YYYY-MM-DD` calendar date.
pub(crate) fn parse_date(value: String, field: &str) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(&value, "%Y-%m-%d")
        .map_err(|_| invalid_value_error(field, format!("{field} must be a YYYY-MM-DD date"), &value))
}

pub(crate) fn parse_optional_date(
    value: Option<String>,
    field: &str,
) -> Result<Option<NaiveDate>, Error> {
    value.map(|raw| parse_date(raw, field)).transpose()
}

/// Parse a `HH:MM` time-of-day label.
pub(crate) fn parse_slot_time(value: String, field: &str) -> Result<SlotTime, Error> {
    SlotTime::new(value.clone())
        .map_err(|_| invalid_value_error(field, format!("{field} must be HH:MM"), &value))
}

/// Parse an RFC 3339 timestamp.
pub(crate) fn parse_rfc3339(value: String, field: &str) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(&value)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|_| {
            invalid_value_error(field, format!("{field} must be an RFC 3339 timestamp"), &value)
        })
}

pub(crate) fn parse_optional_rfc3339(
    value: Option<String>,
    field: &str,
) -> Result<Option<DateTime<Utc>>, Error> {
    value.map(|raw| parse_rfc3339(raw, field)).transpose()
}

/// Parse a UUID path or body value.
pub(crate) fn parse_uuid(value: String, field: &str) -> Result<Uuid, Error> {
    Uuid::parse_str(&value)
        .map_err(|_| invalid_value_error(field, format!("{field} must be a valid UUID"), &value))
}

pub(crate) fn parse_optional_uuid(
    value: Option<String>,
    field: &str,
) -> Result<Option<Uuid>, Error> {
    value.map(|raw| parse_uuid(raw, field)).transpose()
}

/// Reject empty or whitespace-only required strings.
pub(crate) fn require_non_empty(value: String, field: &str) -> Result<String, Error> {
    if value.trim().is_empty() {
        return Err(
            Error::invalid_request(format!("{field} must not be empty")).with_details(json!({
                "field": field,
                "code": "empty_value",
            })),
        );
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::user::UserRole;
    use serde_json::Value;

    #[test]
    fn enum_parse_reports_field_and_value() {
        let err = parse_enum::<UserRole>("wizard".into(), "role").expect_err("invalid role");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        let details = err.details().and_then(Value::as_object).expect("details");
        assert_eq!(details.get("field").and_then(Value::as_str), Some("role"));
        assert_eq!(details.get("value").and_then(Value::as_str), Some("wizard"));
    }

    #[test]
    fn date_parse_accepts_iso_dates() {
        let date = parse_date("2026-03-01".into(), "date").expect("valid date");
        assert_eq!(date.to_string(), "2026-03-01");
        assert!(parse_date("03/01/2026".into(), "date").is_err());
    }

    #[test]
    fn empty_required_strings_are_rejected() {
        assert!(require_non_empty("  ".into(), "username").is_err());
        assert_eq!(
            require_non_empty("ada".into(), "username").expect("non-empty"),
            "ada"
        );
    }
}
