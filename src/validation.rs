//! Field rules for contact bodies.
//!
//! Checks run in a fixed order (`firstName`, `lastName`, `email`, `phone`,
//! then phone uniqueness) and stop at the first failure, so the error only
//! describes one problem even if the body has several.

use serde_json::{Map, Value};

use crate::phone_index::{phone_exists, phone_owner};
use crate::store::{Contact, ContactStore, StoreError};

/// Smallest accepted phone number (ten digits, boundary excluded).
pub const PHONE_MIN: u64 = 1_000_000_001;
/// Largest accepted phone number (ten digits, boundary excluded).
pub const PHONE_MAX: u64 = 9_999_999_999;

pub const FIRST_NAME_REQUIRED: &str = "First name is a mandatory field";
pub const FIRST_NAME_NOT_STRING: &str = "First name must be a string";
pub const LAST_NAME_NOT_STRING: &str = "Last name must be a string";
pub const EMAIL_NOT_STRING: &str = "Email must be a string";
pub const PHONE_REQUIRED: &str = "Phone number is a mandatory field";
pub const PHONE_NOT_NUMBER: &str = "Phone number must be a number";
pub const PHONE_NOT_INTEGER: &str = "Phone number must be a whole number";
pub const PHONE_WRONG_LENGTH: &str = "Phone number must be 10 digits long";
pub const PHONE_DUPLICATE: &str = "Phone number already in DB";

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// The body broke a field rule; the message is client-facing.
    #[error("{0}")]
    Invalid(&'static str),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Fields of a contact about to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContact {
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: u64,
}

impl NewContact {
    pub fn into_contact(self) -> Contact {
        Contact::new(self.first_name, self.last_name, self.email, self.phone)
    }
}

/// Partial update. The outer `Option` says whether the field was supplied;
/// for `last_name` and `email` an inner `None` clears the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactPatch {
    pub first_name: Option<String>,
    pub last_name: Option<Option<String>>,
    pub email: Option<Option<String>>,
    pub phone: Option<u64>,
}

impl ContactPatch {
    /// Merge the supplied fields into `contact`. `id` and `createdAt` never
    /// change.
    pub fn apply(&self, contact: &mut Contact) {
        if let Some(first_name) = &self.first_name {
            contact.first_name = first_name.clone();
        }
        if let Some(last_name) = &self.last_name {
            contact.last_name = last_name.clone();
        }
        if let Some(email) = &self.email {
            contact.email = email.clone();
        }
        if let Some(phone) = self.phone {
            contact.phone = phone;
        }
    }
}

/// Check a create body and make sure its phone is not already stored.
///
/// Reloads `store` before the uniqueness check.
pub fn validate_new_contact(
    body: &Value,
    store: &mut ContactStore,
) -> Result<NewContact, ValidationError> {
    let contact = check_new_contact(fields(body))?;
    store.load()?;
    if phone_exists(store.all(), contact.phone) {
        return Err(ValidationError::Invalid(PHONE_DUPLICATE));
    }
    Ok(contact)
}

/// Check a PATCH body against `current`. A supplied phone must not belong to
/// any other contact in `existing`.
pub fn validate_patch(
    body: &Value,
    current: &Contact,
    existing: &[Contact],
) -> Result<ContactPatch, ValidationError> {
    let fields = fields(body);
    let mut patch = ContactPatch::default();

    if let Some(value) = fields.get("firstName") {
        patch.first_name = Some(first_name(Some(value))?);
    }
    if let Some(value) = fields.get("lastName") {
        patch.last_name = Some(optional_text(Some(value), LAST_NAME_NOT_STRING)?);
    }
    if let Some(value) = fields.get("email") {
        patch.email = Some(optional_text(Some(value), EMAIL_NOT_STRING)?);
    }
    if let Some(value) = fields.get("phone") {
        let phone = phone(Some(value))?;
        if phone_owner(existing, phone).is_some_and(|owner| owner.id != current.id) {
            return Err(ValidationError::Invalid(PHONE_DUPLICATE));
        }
        patch.phone = Some(phone);
    }

    Ok(patch)
}

/// Per-field checks for a create body, without the uniqueness lookup.
pub fn check_new_contact(fields: &Map<String, Value>) -> Result<NewContact, ValidationError> {
    Ok(NewContact {
        first_name: first_name(fields.get("firstName"))?,
        last_name: optional_text(fields.get("lastName"), LAST_NAME_NOT_STRING)?,
        email: optional_text(fields.get("email"), EMAIL_NOT_STRING)?,
        phone: phone(fields.get("phone"))?,
    })
}

fn fields(body: &Value) -> &Map<String, Value> {
    static EMPTY: std::sync::OnceLock<Map<String, Value>> = std::sync::OnceLock::new();
    match body {
        Value::Object(map) => map,
        _ => EMPTY.get_or_init(Map::new),
    }
}

fn first_name(value: Option<&Value>) -> Result<String, ValidationError> {
    match value {
        None | Some(Value::Null) => Err(ValidationError::Invalid(FIRST_NAME_REQUIRED)),
        Some(Value::String(s)) if s.is_empty() => {
            Err(ValidationError::Invalid(FIRST_NAME_REQUIRED))
        }
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(ValidationError::Invalid(FIRST_NAME_NOT_STRING)),
    }
}

fn optional_text(
    value: Option<&Value>,
    not_string: &'static str,
) -> Result<Option<String>, ValidationError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ValidationError::Invalid(not_string)),
    }
}

fn phone(value: Option<&Value>) -> Result<u64, ValidationError> {
    let number = match value {
        None | Some(Value::Null) => return Err(ValidationError::Invalid(PHONE_REQUIRED)),
        Some(Value::Number(n)) => n,
        Some(_) => return Err(ValidationError::Invalid(PHONE_NOT_NUMBER)),
    };

    // Every ten-digit number is exact as an f64.
    let value = number
        .as_f64()
        .ok_or(ValidationError::Invalid(PHONE_NOT_NUMBER))?;
    if value == 0.0 {
        return Err(ValidationError::Invalid(PHONE_REQUIRED));
    }
    if value.fract() != 0.0 {
        return Err(ValidationError::Invalid(PHONE_NOT_INTEGER));
    }
    if value < PHONE_MIN as f64 || value > PHONE_MAX as f64 {
        return Err(ValidationError::Invalid(PHONE_WRONG_LENGTH));
    }
    Ok(value as u64)
}
