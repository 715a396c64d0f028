//! Axum router construction.

use axum::middleware;
use axum::routing::{delete, get, post};
use axum::Router;

use crate::web::handlers;
use crate::web::state::{SharedLimiter, SharedState};
use crate::web::throttle::throttle;

/// Build the complete router. Every route passes through the rate limiter
/// before its handler runs.
pub fn build_router(state: SharedState, limiter: SharedLimiter) -> Router {
    Router::new()
        .route("/", get(handlers::help::help_handler))
        // Listing and search
        .route(
            "/contacts",
            get(handlers::contacts::list_contacts_handler),
        )
        .route(
            "/contacts/search",
            get(handlers::contacts::search_contacts_handler),
        )
        // Single contact
        .route(
            "/contact/:id",
            get(handlers::contacts::get_contact_handler),
        )
        .route(
            "/contacts/:id",
            get(handlers::contacts::get_contact_handler)
                .patch(handlers::contacts::update_contact_handler),
        )
        .route(
            "/createContact",
            post(handlers::contacts::create_contact_handler),
        )
        .route(
            "/deleteContact/:id",
            delete(handlers::contacts::delete_contact_handler),
        )
        // Bulk delete, under both spellings the help text has used
        .route(
            "/removeAllcontacts",
            delete(handlers::contacts::delete_all_contacts_handler),
        )
        .route(
            "/removeallContacts",
            delete(handlers::contacts::delete_all_contacts_handler),
        )
        .layer(middleware::from_fn_with_state(limiter, throttle))
        .with_state(state)
}
