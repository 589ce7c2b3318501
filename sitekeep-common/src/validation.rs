use serde_json::{Map, Value};
use thiserror::Error;

/// First required field found missing or blank, in check order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MissingField {
    #[error("Missing required field: brand.name.")]
    BrandName,
    #[error("Missing required field: contact.")]
    Contact,
    #[error("Missing required field: contact.phone.")]
    ContactPhone,
    #[error("Missing required field: contact.email.")]
    ContactEmail,
    #[error("Missing required field: contact.address.")]
    ContactAddress,
}

/// Reasons a replace body is refused. The `Display` text is the exact
/// message returned to HTTP callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PayloadError {
    #[error("Empty request body.")]
    Empty,
    #[error("Invalid JSON payload.")]
    Malformed,
    #[error("Invalid JSON format.")]
    NotAnObject,
    #[error(transparent)]
    Missing(#[from] MissingField),
}

/// Runs the replace checks in order and hands back the parsed object.
///
/// The caller is expected to persist the original bytes, not a
/// re-serialization of the returned map.
pub fn validate_payload(body: &[u8]) -> Result<Map<String, Value>, PayloadError> {
    let text = std::str::from_utf8(body).map_err(|_| PayloadError::Malformed)?;
    if text.trim().is_empty() {
        return Err(PayloadError::Empty);
    }

    let value: Value = serde_json::from_str(text).map_err(|_| PayloadError::Malformed)?;
    let Value::Object(root) = value else {
        return Err(PayloadError::NotAnObject);
    };

    check_required_fields(&root)?;
    Ok(root)
}

/// `brand.name`, then `contact`, then each contact field.
///
/// A `contact` that is present but not an object is reported as a missing
/// `contact`, since none of its fields can be read.
pub fn check_required_fields(root: &Map<String, Value>) -> Result<(), MissingField> {
    if !has_text(root.get("brand"), "name") {
        return Err(MissingField::BrandName);
    }

    let contact = match root.get("contact") {
        Some(contact @ Value::Object(_)) => contact,
        _ => return Err(MissingField::Contact),
    };

    if !has_text(Some(contact), "phone") {
        return Err(MissingField::ContactPhone);
    }
    if !has_text(Some(contact), "email") {
        return Err(MissingField::ContactEmail);
    }
    if !has_text(Some(contact), "address") {
        return Err(MissingField::ContactAddress);
    }

    Ok(())
}

fn has_text(section: Option<&Value>, key: &str) -> bool {
    section
        .and_then(|section| section.get(key))
        .and_then(Value::as_str)
        .is_some_and(|value| !value.trim().is_empty())
}
