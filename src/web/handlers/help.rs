//! Plain-text route listing served at `/`.

use axum::http::StatusCode;
use axum::response::IntoResponse;

pub(crate) const HELP_TEXT: &str = "
    Welcome to the contact book

    Pages you can try:

    1. GET      /                                           - this help text
    2. GET      /contacts?sort=firstname&order=asc|desc     - all contacts sorted by first name
    3. GET      /contacts?sort=lastname&order=asc|desc      - all contacts sorted by last name
    4. GET      /contacts?sort=createdAt&order=asc|desc     - all contacts sorted by creation time
    5. GET      /contact/:id                                - a contact by id
    6. GET      /contacts/search?q=                         - case-insensitive search over every field
    7. POST     /createContact                              - add a new contact
    8. PATCH    /contacts/:id                               - update a contact
    9. DELETE   /removeAllcontacts                          - delete all contacts
    10. DELETE  /deleteContact/:id                          - delete a contact by id
";

pub async fn help_handler() -> impl IntoResponse {
    (StatusCode::OK, HELP_TEXT)
}
