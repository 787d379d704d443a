//! End-to-end coverage of the REST surface over in-memory stores.
//!
//! These tests drive the same handler wiring as `main`, with the Diesel
//! adapters swapped for in-memory implementations, so every contract from
//! session auth through reconciliation is exercised over real HTTP
//! request/response cycles.

mod support;

use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::{Value, json};

use support::{register_account, spawn_app};

#[actix_web::test]
async fn data_routes_reject_anonymous_callers() {
    let (app, _stores) = spawn_app().await;

    for (method, uri) in [
        ("GET", "/api/v1/habits"),
        ("GET", "/api/v1/export"),
        ("GET", "/api/v1/users/me"),
        ("POST", "/api/v1/import"),
    ] {
        let req = match method {
            "GET" => test::TestRequest::get().uri(uri),
            _ => test::TestRequest::post().uri(uri).set_json(json!({ "habits": [] })),
        };
        let res = test::call_service(&app, req.to_request()).await;
        assert_eq!(
            res.status(),
            StatusCode::UNAUTHORIZED,
            "{method} {uri} must require a session"
        );
    }
}

#[actix_web::test]
async fn duplicate_email_registration_conflicts() {
    let (app, _stores) = spawn_app().await;
    let _first = register_account(&app, "ada@example.com").await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/register")
            .set_json(json!({ "email": "ada@example.com", "password": "correct horse battery" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn login_round_trip_after_logout() {
    let (app, _stores) = spawn_app().await;
    let cookie = register_account(&app, "ada@example.com").await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/logout")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(json!({ "email": "ada@example.com", "password": "correct horse battery" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body.get("email").and_then(Value::as_str), Some("ada@example.com"));

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(json!({ "email": "ada@example.com", "password": "wrong" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn habits_are_created_with_contiguous_positions() {
    let (app, _stores) = spawn_app().await;
    let cookie = register_account(&app, "ada@example.com").await;

    for (name, expected_order) in [("Reading", 0), ("Stretching", 1), ("Hydration", 2)] {
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/habits")
                .cookie(cookie.clone())
                .set_json(json!({ "name": name }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(
            body.get("order").and_then(Value::as_i64),
            Some(expected_order),
            "{name} gets the next-available position"
        );
    }
}

#[actix_web::test]
async fn reorder_is_atomic_and_ownership_checked() {
    let (app, stores) = spawn_app().await;
    let ada = register_account(&app, "ada@example.com").await;
    let grace = register_account(&app, "grace@example.com").await;

    for name in ["Reading", "Stretching"] {
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/habits")
                .cookie(ada.clone())
                .set_json(json!({ "name": name }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
    }
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/habits")
            .cookie(grace.clone())
            .set_json(json!({ "name": "Running" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let habits = stores.store.habits();
    let ada_ids: Vec<String> = habits
        .iter()
        .filter(|h| h.name.as_str() != "Running")
        .map(|h| h.id.to_string())
        .collect();
    let foreign_id = habits
        .iter()
        .find(|h| h.name.as_str() == "Running")
        .map(|h| h.id.to_string())
        .expect("grace's habit exists");

    // Mixing in a foreign habit fails the whole reorder and changes nothing.
    let positions_before: Vec<i32> = stores.store.habits().iter().map(|h| h.position).collect();
    let res = test::call_service(
        &app,
        test::TestRequest::put()
            .uri("/api/v1/habits/reorder")
            .cookie(ada.clone())
            .set_json(json!({ "orderedIds": [foreign_id.clone(), ada_ids[0].clone()] }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let positions_after: Vec<i32> = stores.store.habits().iter().map(|h| h.position).collect();
    assert_eq!(positions_before, positions_after, "failed reorder changed nothing");

    // A valid reorder assigns dense positions and returns the new order.
    let reversed: Vec<String> = ada_ids.iter().rev().cloned().collect();
    let res = test::call_service(
        &app,
        test::TestRequest::put()
            .uri("/api/v1/habits/reorder")
            .cookie(ada.clone())
            .set_json(json!({ "orderedIds": reversed }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    let reordered = body.as_array().expect("array");
    let names: Vec<&str> = reordered
        .iter()
        .map(|h| h.get("name").and_then(Value::as_str).expect("name"))
        .collect();
    assert_eq!(names, ["Stretching", "Reading"]);
    let orders: Vec<i64> = reordered
        .iter()
        .map(|h| h.get("order").and_then(Value::as_i64).expect("order"))
        .collect();
    assert_eq!(orders, [0, 1], "positions are contiguous from 0");

    // The grid read reflects the persisted order.
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/habits")
            .cookie(ada)
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(res).await;
    let grid_names: Vec<&str> = body
        .get("habits")
        .and_then(Value::as_array)
        .expect("habits")
        .iter()
        .map(|h| h.get("name").and_then(Value::as_str).expect("name"))
        .collect();
    assert_eq!(grid_names, ["Stretching", "Reading"]);
}

#[actix_web::test]
async fn entry_upsert_keeps_one_row_per_day() {
    let (app, stores) = spawn_app().await;
    let cookie = register_account(&app, "ada@example.com").await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/habits")
            .cookie(cookie.clone())
            .set_json(json!({ "name": "Reading" }))
            .to_request(),
    )
    .await;
    let habit: Value = test::read_body_json(res).await;
    let habit_id = habit.get("id").and_then(Value::as_str).expect("id");

    for completed in [true, false] {
        let res = test::call_service(
            &app,
            test::TestRequest::put()
                .uri("/api/v1/entries")
                .cookie(cookie.clone())
                .set_json(json!({
                    "habitId": habit_id,
                    "date": "2024-01-05",
                    "completed": completed
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    let entries = stores.store.entries();
    assert_eq!(entries.len(), 1, "upsert reuses the (habit, date) row");
    assert!(!entries[0].completed, "latest write wins");
}

#[actix_web::test]
async fn removal_deletes_or_deactivates_and_recreate_revives() {
    let (app, stores) = spawn_app().await;
    let cookie = register_account(&app, "ada@example.com").await;

    // Habit without entries: hard delete.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/habits")
            .cookie(cookie.clone())
            .set_json(json!({ "name": "Fleeting" }))
            .to_request(),
    )
    .await;
    let habit: Value = test::read_body_json(res).await;
    let fleeting_id = habit.get("id").and_then(Value::as_str).expect("id");

    let res = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/v1/habits/{fleeting_id}"))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body.get("status").and_then(Value::as_str), Some("deleted"));
    assert!(stores.store.habits().is_empty(), "row removed entirely");

    // Habit with an entry: deactivate, entries intact, revivable by name.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/habits")
            .cookie(cookie.clone())
            .set_json(json!({ "name": "Reading" }))
            .to_request(),
    )
    .await;
    let habit: Value = test::read_body_json(res).await;
    let reading_id = habit.get("id").and_then(Value::as_str).expect("id").to_owned();

    let res = test::call_service(
        &app,
        test::TestRequest::put()
            .uri("/api/v1/entries")
            .cookie(cookie.clone())
            .set_json(json!({
                "habitId": reading_id.clone(),
                "date": "2024-01-05",
                "completed": true
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/v1/habits/{reading_id}"))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(
        body.get("status").and_then(Value::as_str),
        Some("deactivated")
    );
    assert_eq!(stores.store.entries().len(), 1, "entries survive deactivation");

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/habits")
            .cookie(cookie.clone())
            .set_json(json!({ "name": "Reading" }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK, "recreate revives, not 201");
    let revived: Value = test::read_body_json(res).await;
    assert_eq!(
        revived.get("id").and_then(Value::as_str),
        Some(reading_id.as_str()),
        "same habit row, original entries still attached"
    );
}

#[actix_web::test]
async fn import_reports_partial_failures_and_export_round_trips() {
    let (app, stores) = spawn_app().await;
    let cookie = register_account(&app, "ada@example.com").await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/import")
            .cookie(cookie.clone())
            .set_json(json!({
                "habits": [
                    {
                        "name": "Reading",
                        "emoji": "📚",
                        "entries": [
                            { "date": "2024-01-05", "completed": true, "journal": "slow morning" },
                            { "date": "bogus", "completed": true }
                        ]
                    },
                    { "emoji": "🏃" }
                ]
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK, "soft failures keep the call at 200");
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body.get("failures").and_then(Value::as_u64), Some(1));
    let results = body.get("results").and_then(Value::as_array).expect("results");
    assert_eq!(
        results[0].get("status").and_then(Value::as_str),
        Some("created")
    );
    assert_eq!(
        results[0]
            .get("entries")
            .and_then(|e| e.get("skipped"))
            .and_then(Value::as_array)
            .map(Vec::len),
        Some(1),
        "the bogus date is reported, not silently dropped"
    );
    assert_eq!(
        results[1].get("reason").and_then(Value::as_str),
        Some("missing name")
    );

    // The journal landed keyed by day, not on the entry row.
    assert_eq!(stores.store.journals().len(), 1);

    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/journal/2024-01-05")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(
        body.get("body").and_then(Value::as_str),
        Some("slow morning")
    );

    // Export reproduces the file shape, journal attached to the entry.
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/export")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    let exported = body.as_array().expect("array");
    assert_eq!(exported.len(), 1);
    assert_eq!(
        exported[0].get("name").and_then(Value::as_str),
        Some("Reading")
    );
    let entries = exported[0]
        .get("entries")
        .and_then(Value::as_array)
        .expect("entries");
    assert_eq!(entries.len(), 1, "only the valid entry was stored");
    assert_eq!(
        entries[0].get("journal").and_then(Value::as_str),
        Some("slow morning")
    );

    // Importing the same payload again merges instead of duplicating.
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/import")
            .cookie(cookie)
            .set_json(json!({ "habits": [{ "name": "Reading" }] }))
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(
        body.get("results")
            .and_then(Value::as_array)
            .expect("results")[0]
            .get("status")
            .and_then(Value::as_str),
        Some("merged")
    );
    assert_eq!(stores.store.habits().len(), 1, "no duplicate habit row");
}
