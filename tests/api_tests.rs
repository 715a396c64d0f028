//! End-to-end tests for the contact-book HTTP API.
//!
//! Each test starts the real router on an ephemeral port with its own CSV
//! file and drives it with blocking HTTP calls.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::sync::oneshot;

use contact_book::rate_limit::{RateLimitConfig, RateLimiter};
use contact_book::store::ContactStore;
use contact_book::web::router::build_router;
use contact_book::web::state::shared_state;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct TestServer {
    base_url: String,
    data_file: PathBuf,
    shutdown_tx: oneshot::Sender<()>,
    _tmp: TempDir,
}

async fn start_server(max_requests: u32) -> TestServer {
    let tmp = TempDir::new().expect("temp dir");
    let data_file = tmp.path().join("contacts.csv");
    let limiter = Arc::new(RateLimiter::new(RateLimitConfig {
        max_requests,
        window: Duration::from_secs(60),
    }));
    let router = build_router(shared_state(ContactStore::new(&data_file)), limiter);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind server");
    let addr: SocketAddr = listener.local_addr().expect("local addr");
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
        })
        .await
        .ok();
    });

    TestServer {
        base_url: format!("http://{addr}"),
        data_file,
        shutdown_tx,
        _tmp: tmp,
    }
}

/// Perform one request, returning the status and raw body.
fn call(method: &str, url: &str, body: Option<Value>) -> (u16, String) {
    let req = ureq::request(method, url);
    let result = match body {
        Some(json) => req
            .set("Content-Type", "application/json")
            .send_string(&json.to_string()),
        None => req.call(),
    };
    match result {
        Ok(r) => (r.status(), r.into_string().unwrap_or_default()),
        Err(ureq::Error::Status(code, r)) => (code, r.into_string().unwrap_or_default()),
        Err(e) => panic!("request failed: {e}"),
    }
}

fn call_json(method: &str, url: &str, body: Option<Value>) -> (u16, Value) {
    let (status, text) = call(method, url, body);
    let value = serde_json::from_str(&text)
        .unwrap_or_else(|e| panic!("response is not JSON ({e}): {text}"));
    (status, value)
}

fn create(base_url: &str, body: Value) -> (u16, Value) {
    call_json("POST", &format!("{base_url}/createContact"), Some(body))
}

fn list(base_url: &str, query: &str) -> Vec<Value> {
    let (status, value) = call_json("GET", &format!("{base_url}/contacts{query}"), None);
    assert_eq!(status, 200);
    value.as_array().cloned().expect("array of contacts")
}

fn first_names(contacts: &[Value]) -> Vec<String> {
    contacts
        .iter()
        .map(|c| c["firstName"].as_str().unwrap_or_default().to_string())
        .collect()
}

async fn blocking<T: Send + 'static>(f: impl FnOnce() -> T + Send + 'static) -> T {
    tokio::task::spawn_blocking(f).await.expect("blocking task")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_assigns_id_and_timestamp() {
    let server = start_server(1_000).await;
    let base = server.base_url.clone();

    blocking(move || {
        let (status, body) = create(
            &base,
            json!({
                "firstName": "Ada",
                "lastName": "Lovelace",
                "email": "ada@example.com",
                "phone": 5551234567u64,
            }),
        );
        assert_eq!(status, 200);
        assert_eq!(body["success"], "Created new contact");
        let data = &body["data"];
        assert!(!data["id"].as_str().unwrap().is_empty());
        let created_at = data["createdAt"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(created_at).is_ok());
        assert_eq!(data["phone"], 5551234567u64);

        let contacts = list(&base, "");
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0]["id"], data["id"]);
        assert_eq!(contacts[0]["lastName"], "Lovelace");
    })
    .await;

    let mut store = ContactStore::new(&server.data_file);
    store.load().unwrap();
    assert_eq!(store.all().len(), 1);
    assert_eq!(store.all()[0].email.as_deref(), Some("ada@example.com"));

    let _ = server.shutdown_tx.send(());
}

#[tokio::test]
async fn create_rejects_bad_phone_lengths_and_duplicates() {
    let server = start_server(1_000).await;
    let base = server.base_url.clone();

    blocking(move || {
        for phone in [999_999_999u64, 10_000_000_000u64] {
            let (status, body) = create(&base, json!({ "firstName": "Ada", "phone": phone }));
            assert_eq!(status, 400);
            assert_eq!(body["error"], "Phone number must be 10 digits long");
        }

        let (status, body) = create(&base, json!({ "phone": 5551234567u64 }));
        assert_eq!(status, 400);
        assert_eq!(body["error"], "First name is a mandatory field");

        let (status, _) = create(&base, json!({ "firstName": "Ada", "phone": 5551234567u64 }));
        assert_eq!(status, 200);
        let (status, body) =
            create(&base, json!({ "firstName": "Grace", "phone": 5551234567u64 }));
        assert_eq!(status, 400);
        assert_eq!(body["error"], "Phone number already in DB");

        assert_eq!(list(&base, "").len(), 1);
    })
    .await;

    let _ = server.shutdown_tx.send(());
}

#[tokio::test]
async fn delete_by_id_removes_exactly_one() {
    let server = start_server(1_000).await;
    let base = server.base_url.clone();

    blocking(move || {
        let mut ids = Vec::new();
        for (name, phone) in [("Ada", 5550000001u64), ("Bob", 5550000002), ("Cy", 5550000003)] {
            let (_, body) = create(&base, json!({ "firstName": name, "phone": phone }));
            ids.push(body["data"]["id"].as_str().unwrap().to_string());
        }

        let (status, body) =
            call_json("DELETE", &format!("{base}/deleteContact/missing"), None);
        assert_eq!(status, 400);
        assert_eq!(body["error"], "Error while deleting the contact");
        assert_eq!(list(&base, "").len(), 3);

        let (status, body) =
            call_json("DELETE", &format!("{base}/deleteContact/{}", ids[1]), None);
        assert_eq!(status, 200);
        assert_eq!(body["success"], "Contact is Deleted");
        assert_eq!(first_names(&list(&base, "")), vec!["Ada", "Cy"]);

        let (status, _) = call_json("GET", &format!("{base}/contact/{}", ids[1]), None);
        assert_eq!(status, 404);
    })
    .await;

    let _ = server.shutdown_tx.send(());
}

#[tokio::test]
async fn remove_all_empties_the_store() {
    let server = start_server(1_000).await;
    let base = server.base_url.clone();

    blocking(move || {
        create(&base, json!({ "firstName": "Ada", "phone": 5550000001u64 }));
        create(&base, json!({ "firstName": "Bob", "phone": 5550000002u64 }));

        let (status, body) = call_json("DELETE", &format!("{base}/removeAllcontacts"), None);
        assert_eq!(status, 200);
        assert_eq!(body["success"], "All contacts have been removed.");
        assert!(list(&base, "").is_empty());

        // The phone is free again once the store is cleared.
        let (status, _) = create(&base, json!({ "firstName": "Ada", "phone": 5550000001u64 }));
        assert_eq!(status, 200);
    })
    .await;

    let _ = server.shutdown_tx.send(());
}

#[tokio::test]
async fn list_sorts_by_requested_field() {
    let server = start_server(1_000).await;
    let base = server.base_url.clone();

    blocking(move || {
        for (first, last, phone) in [
            ("bob", "Young", 5550000002u64),
            ("Alice", "zed", 5550000001),
            ("carol", "adams", 5550000003),
        ] {
            let (status, _) = create(
                &base,
                json!({ "firstName": first, "lastName": last, "phone": phone }),
            );
            assert_eq!(status, 200);
            std::thread::sleep(Duration::from_millis(5));
        }

        assert_eq!(first_names(&list(&base, "")), vec!["bob", "Alice", "carol"]);
        assert_eq!(
            first_names(&list(&base, "?sort=firstname&order=desc")),
            vec!["carol", "bob", "Alice"]
        );
        assert_eq!(
            first_names(&list(&base, "?sort=firstname")),
            vec!["Alice", "bob", "carol"]
        );
        assert_eq!(
            first_names(&list(&base, "?sort=lastname&order=asc")),
            vec!["carol", "bob", "Alice"]
        );
        assert_eq!(
            first_names(&list(&base, "?sort=createdAt&order=desc")),
            vec!["carol", "Alice", "bob"]
        );
    })
    .await;

    let _ = server.shutdown_tx.send(());
}

#[tokio::test]
async fn search_is_case_insensitive_across_fields() {
    let server = start_server(1_000).await;
    let base = server.base_url.clone();

    blocking(move || {
        // Queries avoid hex letters so they cannot hit the generated ids.
        create(
            &base,
            json!({ "firstName": "Sam", "email": "SAM@Example.com", "phone": 5550000001u64 }),
        );
        create(
            &base,
            json!({ "firstName": "Bob", "lastName": "Samson", "phone": 5550000002u64 }),
        );
        create(&base, json!({ "firstName": "Cy", "phone": 5550000003u64 }));

        let search = |q: &str| {
            let url = format!("{base}/contacts/search?q={q}");
            let (status, value) = call_json("GET", &url, None);
            assert_eq!(status, 200);
            first_names(value.as_array().unwrap())
        };

        assert_eq!(search("sam"), vec!["Sam", "Bob"]);
        assert_eq!(search("EXAMPLE"), vec!["Sam"]);
        assert_eq!(search("0000003"), vec!["Cy"]);
        assert!(search("nobody").is_empty());

        let (status, body) = call_json("GET", &format!("{base}/contacts/search"), None);
        assert_eq!(status, 400);
        assert!(body["error"].is_string());
    })
    .await;

    let _ = server.shutdown_tx.send(());
}

#[tokio::test]
async fn update_merges_fields_and_keeps_phones_unique() {
    let server = start_server(1_000).await;
    let base = server.base_url.clone();

    blocking(move || {
        let (_, ada) = create(
            &base,
            json!({ "firstName": "Ada", "lastName": "Byron", "phone": 5550000001u64 }),
        );
        let (_, bob) = create(&base, json!({ "firstName": "Bob", "phone": 5550000002u64 }));
        let ada_id = ada["data"]["id"].as_str().unwrap().to_string();
        let bob_phone = bob["data"]["phone"].clone();

        let url = format!("{base}/contacts/{ada_id}");
        let patch = json!({ "lastName": "Lovelace", "id": "hijack" });
        let (status, body) = call_json("PATCH", &url, Some(patch));
        assert_eq!(status, 200);
        assert_eq!(body["message"], "Contact updated successfully");
        assert_eq!(body["contact"]["id"], ada_id.as_str());
        assert_eq!(body["contact"]["lastName"], "Lovelace");
        assert_eq!(body["contact"]["firstName"], "Ada");
        assert_eq!(body["contact"]["createdAt"], ada["data"]["createdAt"]);

        let (status, body) = call_json("PATCH", &url, Some(json!({ "phone": bob_phone })));
        assert_eq!(status, 400);
        assert_eq!(body["message"], "Phone number already in DB");

        let (status, body) = call_json("PATCH", &url, Some(json!({ "phone": 123 })));
        assert_eq!(status, 400);
        assert_eq!(body["message"], "Phone number must be 10 digits long");

        let (status, body) = call_json("PATCH", &url, Some(json!({ "phone": 5550000009u64 })));
        assert_eq!(status, 200);
        assert_eq!(body["contact"]["phone"], 5550000009u64);

        let missing = format!("{base}/contacts/missing");
        let (status, body) = call_json("PATCH", &missing, Some(json!({ "firstName": "X" })));
        assert_eq!(status, 404);
        assert_eq!(body["message"], "Contact not found");

        let (_, fetched) = call_json("GET", &format!("{base}/contact/{ada_id}"), None);
        assert_eq!(fetched["lastName"], "Lovelace");
        assert_eq!(fetched["phone"], 5550000009u64);
    })
    .await;

    let _ = server.shutdown_tx.send(());
}

#[tokio::test]
async fn ids_and_phones_stay_unique_after_mixed_operations() {
    let server = start_server(1_000).await;
    let base = server.base_url.clone();

    blocking(move || {
        let mut ids = Vec::new();
        for i in 1..=6u64 {
            let phone = 5550000000u64 + i;
            let (_, body) = create(&base, json!({ "firstName": format!("P{i}"), "phone": phone }));
            ids.push(body["data"]["id"].as_str().unwrap().to_string());
            // Rejected: same phone as the contact just created.
            create(&base, json!({ "firstName": "Dup", "phone": phone }));
        }
        let patch = |id: &str, phone: u64| {
            call_json("PATCH", &format!("{base}/contacts/{id}"), Some(json!({ "phone": phone })))
        };
        call_json("DELETE", &format!("{base}/deleteContact/{}", ids[2]), None);
        assert_eq!(patch(&ids[0], 5550000002).0, 400);
        assert_eq!(patch(&ids[1], 5550000003).0, 200);
        create(&base, json!({ "firstName": "Late", "phone": 5550000001u64 }));

        let contacts = list(&base, "");
        assert_eq!(contacts.len(), 5);
        let ids: HashSet<String> = contacts.iter().map(|c| c["id"].to_string()).collect();
        let phones: HashSet<String> = contacts.iter().map(|c| c["phone"].to_string()).collect();
        assert_eq!(ids.len(), contacts.len());
        assert_eq!(phones.len(), contacts.len());
    })
    .await;

    let _ = server.shutdown_tx.send(());
}

#[tokio::test]
async fn exceeding_the_window_yields_429() {
    let server = start_server(3).await;
    let base = server.base_url.clone();

    blocking(move || {
        for _ in 0..3 {
            let (status, _) = call("GET", &format!("{base}/"), None);
            assert_eq!(status, 200);
        }
        let (status, text) = call("GET", &format!("{base}/contacts"), None);
        assert_eq!(status, 429);
        assert_eq!(text, "Too many requests, try again after some time");
    })
    .await;

    let _ = server.shutdown_tx.send(());
}
