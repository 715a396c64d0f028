//! Contact CRUD, listing and search handlers.

use std::cmp::Ordering;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::Value;

use crate::logging;
use crate::store::Contact;
use crate::validation::{validate_new_contact, validate_patch, ValidationError};
use crate::web::state::SharedState;
use crate::web::utils::{api_error, internal_error, ok_json};

// ---------------------------------------------------------------------------
// Sorting and search
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    FirstName,
    LastName,
    CreatedAt,
}

impl SortKey {
    /// Parse the `sort` query value. Unknown keys leave the list unsorted.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "firstname" => Some(SortKey::FirstName),
            "lastname" => Some(SortKey::LastName),
            "createdAt" => Some(SortKey::CreatedAt),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Anything other than `desc` sorts ascending.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        }
    }
}

fn compare(key: SortKey, a: &Contact, b: &Contact) -> Ordering {
    match key {
        SortKey::FirstName => a
            .first_name
            .to_lowercase()
            .cmp(&b.first_name.to_lowercase())
            .then_with(|| a.first_name.cmp(&b.first_name)),
        SortKey::LastName => {
            let upper = |c: &Contact| c.last_name.as_deref().unwrap_or("").to_uppercase();
            upper(a).cmp(&upper(b))
        }
        SortKey::CreatedAt => {
            let parsed = |c: &Contact| chrono::DateTime::parse_from_rfc3339(&c.created_at).ok();
            match (parsed(a), parsed(b)) {
                (Some(x), Some(y)) => x.cmp(&y),
                _ => a.created_at.cmp(&b.created_at),
            }
        }
    }
}

/// Stable sort of `contacts` by `key`.
pub fn sort_contacts(contacts: &mut [Contact], key: SortKey, order: SortOrder) {
    contacts.sort_by(|a, b| {
        let ord = compare(key, a, b);
        match order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
}

/// Contacts with `query` as a case-insensitive substring of any text field.
pub fn search_contacts(contacts: &[Contact], query: &str) -> Vec<Contact> {
    let needle = query.to_lowercase();
    contacts
        .iter()
        .filter(|c| {
            c.text_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `{ "message": ... }` body used by the update route.
fn message_response(status: StatusCode, message: &str) -> Response {
    (status, axum::Json(serde_json::json!({ "message": message }))).into_response()
}

/// Request body as untyped JSON. A request without a JSON content type is
/// treated as an empty body and left to field validation; other rejections
/// (malformed JSON, unreadable body) are returned to the caller.
fn json_body(body: Result<axum::Json<Value>, JsonRejection>) -> Result<Value, JsonRejection> {
    match body {
        Ok(axum::Json(value)) => Ok(value),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(Value::Null),
        Err(rejection) => Err(rejection),
    }
}

#[derive(Deserialize)]
pub struct ListQuery {
    sort: Option<String>,
    order: Option<String>,
}

pub async fn list_contacts_handler(
    State(state): State<SharedState>,
    Query(params): Query<ListQuery>,
) -> Response {
    let mut st = state.lock().await;
    if let Err(e) = st.store.load() {
        return internal_error(&e);
    }

    let mut contacts = st.store.all().to_vec();
    if let Some(key) = params.sort.as_deref().and_then(SortKey::parse) {
        sort_contacts(&mut contacts, key, SortOrder::parse(params.order.as_deref()));
    }
    (StatusCode::OK, axum::Json(contacts)).into_response()
}

pub async fn get_contact_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Response {
    let mut st = state.lock().await;
    if let Err(e) = st.store.load() {
        return internal_error(&e);
    }

    match st.store.get(&id) {
        Some(contact) => (StatusCode::OK, axum::Json(contact)).into_response(),
        None => api_error(StatusCode::NOT_FOUND, "Contact not found"),
    }
}

pub async fn create_contact_handler(
    State(state): State<SharedState>,
    body: Result<axum::Json<Value>, JsonRejection>,
) -> Response {
    let body = match json_body(body) {
        Ok(body) => body,
        Err(rejection) => return api_error(rejection.status(), rejection.body_text()),
    };

    let mut st = state.lock().await;

    let new_contact = match validate_new_contact(&body, &mut st.store) {
        Ok(c) => c,
        Err(ValidationError::Invalid(message)) => {
            return api_error(StatusCode::BAD_REQUEST, message);
        }
        Err(ValidationError::Store(e)) => return internal_error(&e),
    };

    let contact = new_contact.into_contact();
    if let Err(e) = st.store.append(contact.clone()) {
        return internal_error(&e);
    }

    tracing::info!("created contact {}", logging::contact_id(&contact.id));
    ok_json(serde_json::json!({
        "success": "Created new contact",
        "data": contact,
    }))
}

pub async fn update_contact_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    body: Result<axum::Json<Value>, JsonRejection>,
) -> Response {
    let body = match json_body(body) {
        Ok(body) => body,
        Err(rejection) => return message_response(rejection.status(), &rejection.body_text()),
    };

    let mut st = state.lock().await;
    if let Err(e) = st.store.load() {
        return internal_error(&e);
    }

    let mut contacts = st.store.all().to_vec();
    let Some(index) = contacts.iter().position(|c| c.id == id) else {
        return message_response(StatusCode::NOT_FOUND, "Contact not found");
    };

    let patch = match validate_patch(&body, &contacts[index], &contacts) {
        Ok(p) => p,
        Err(ValidationError::Invalid(message)) => {
            return message_response(StatusCode::BAD_REQUEST, message);
        }
        Err(ValidationError::Store(e)) => return internal_error(&e),
    };
    patch.apply(&mut contacts[index]);
    let updated = contacts[index].clone();

    if let Err(e) = st.store.save(contacts) {
        return internal_error(&e);
    }

    tracing::info!("updated contact {}", logging::contact_id(&id));
    ok_json(serde_json::json!({
        "message": "Contact updated successfully",
        "contact": updated,
    }))
}

pub async fn delete_all_contacts_handler(State(state): State<SharedState>) -> Response {
    let mut st = state.lock().await;
    if let Err(e) = st.store.clear() {
        return internal_error(&e);
    }

    tracing::info!("removed all contacts");
    ok_json(serde_json::json!({ "success": "All contacts have been removed." }))
}

pub async fn delete_contact_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Response {
    let mut st = state.lock().await;
    match st.store.delete_by_id(&id) {
        Ok(true) => {
            tracing::info!("deleted contact {}", logging::contact_id(&id));
            ok_json(serde_json::json!({ "success": "Contact is Deleted" }))
        }
        Ok(false) => api_error(StatusCode::BAD_REQUEST, "Error while deleting the contact"),
        Err(e) => internal_error(&e),
    }
}

#[derive(Deserialize)]
pub struct SearchQuery {
    q: Option<String>,
}

pub async fn search_contacts_handler(
    State(state): State<SharedState>,
    Query(params): Query<SearchQuery>,
) -> Response {
    let Some(query) = params.q else {
        return api_error(StatusCode::BAD_REQUEST, "Missing search query parameter q");
    };

    let mut st = state.lock().await;
    if let Err(e) = st.store.load() {
        return internal_error(&e);
    }

    let matches = search_contacts(st.store.all(), &query);
    (StatusCode::OK, axum::Json(matches)).into_response()
}
