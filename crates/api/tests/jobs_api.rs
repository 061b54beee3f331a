//! Integration tests for the job, bid, message and payment endpoints.

mod common;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, StatusCode};
use common::{body_bytes, body_json, create_job, get_as, post_json, send, TestUser};
use serde_json::json;
use tower::ServiceExt;

async fn release(
    app: axum::Router,
    job_id: &str,
    who: &TestUser,
    key: Option<&str>,
) -> axum::http::Response<axum::body::Body> {
    let headers: Vec<(&str, &str)> = key.map(|k| ("Idempotency-Key", k)).into_iter().collect();
    send(
        app,
        Method::POST,
        &format!("/api/v1/jobs/{job_id}/release"),
        Some(who),
        None,
        &headers,
    )
    .await
}

// ---------------------------------------------------------------------------
// Jobs
// ---------------------------------------------------------------------------

#[tokio::test]
async fn client_creates_and_reads_job() {
    let state = common::test_state();
    let owner = common::client(&state);
    let app = common::build_test_app(state);

    let job_id = create_job(app.clone(), &owner, 900.0).await;
    let response = get_as(app, &format!("/api/v1/jobs/{job_id}"), &owner).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "OPEN");
    assert_eq!(json["data"]["paymentState"], "PENDING_ESCROW");
    assert_eq!(json["data"]["ownerId"], owner.id.to_string());
    assert_eq!(json["data"]["budget"], 900.0);
}

#[tokio::test]
async fn freelancer_cannot_create_job() {
    let state = common::test_state();
    let worker = common::freelancer(&state);
    let app = common::build_test_app(state);

    let response = post_json(
        app,
        "/api/v1/jobs",
        &worker,
        json!({ "title": "x", "category": "y", "budget": 1.0 }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn invalid_job_returns_422_with_details() {
    let state = common::test_state();
    let owner = common::client(&state);
    let app = common::build_test_app(state);

    let response = post_json(
        app,
        "/api/v1/jobs",
        &owner,
        json!({ "title": "   ", "category": "design", "budget": -1.0 }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    let details = json["error"]["details"].as_array().unwrap();
    assert!(details.iter().any(|d| d.as_str().unwrap().starts_with("budget")));
    assert!(details.iter().any(|d| d.as_str().unwrap().starts_with("title")));
}

#[tokio::test]
async fn unknown_job_returns_404() {
    let state = common::test_state();
    let owner = common::client(&state);
    let app = common::build_test_app(state);

    let missing = jobroom_core::types::new_id();
    let response = get_as(app, &format!("/api/v1/jobs/{missing}"), &owner).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn job_list_is_paginated_and_filtered() {
    let state = common::test_state();
    let owner = common::client(&state);
    let app = common::build_test_app(state);
    for _ in 0..3 {
        create_job(app.clone(), &owner, 100.0).await;
    }

    let response = get_as(app.clone(), "/api/v1/jobs?page=1&pageSize=2", &owner).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["items"].as_array().unwrap().len(), 2);
    assert_eq!(json["data"]["total"], 3);
    assert_eq!(json["data"]["pageSize"], 2);

    let response = get_as(app.clone(), "/api/v1/jobs?page=2&pageSize=2", &owner).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["items"].as_array().unwrap().len(), 1);

    let response = get_as(app, "/api/v1/jobs?status=COMPLETED", &owner).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["total"], 0);
}

// ---------------------------------------------------------------------------
// Status transitions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn invalid_transition_returns_409_with_from_and_to() {
    let state = common::test_state();
    let owner = common::client(&state);
    let app = common::build_test_app(state);
    let job_id = create_job(app.clone(), &owner, 50.0).await;

    let response = post_json(
        app,
        &format!("/api/v1/jobs/{job_id}/status"),
        &owner,
        json!({ "status": "COMPLETED" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "INVALID_TRANSITION");
    assert_eq!(json["error"]["details"]["from"], "OPEN");
    assert_eq!(json["error"]["details"]["to"], "COMPLETED");
}

#[tokio::test]
async fn owner_drives_job_to_completion() {
    let state = common::test_state();
    let owner = common::client(&state);
    let app = common::build_test_app(state);
    let job_id = create_job(app.clone(), &owner, 50.0).await;

    for status in ["IN_PROGRESS", "COMPLETED"] {
        let response = post_json(
            app.clone(),
            &format!("/api/v1/jobs/{job_id}/status"),
            &owner,
            json!({ "status": status }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["data"]["status"], status);
    }
}

#[tokio::test]
async fn other_client_cannot_change_status() {
    let state = common::test_state();
    let owner = common::client(&state);
    let other = common::client(&state);
    let app = common::build_test_app(state);
    let job_id = create_job(app.clone(), &owner, 50.0).await;

    let response = post_json(
        app,
        &format!("/api/v1/jobs/{job_id}/status"),
        &other,
        json!({ "status": "CANCELLED" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Bids and access
// ---------------------------------------------------------------------------

#[tokio::test]
async fn bidding_grants_access_to_job_context() {
    let state = common::test_state();
    let owner = common::client(&state);
    let worker = common::freelancer(&state);
    let rival = common::freelancer(&state);
    let app = common::build_test_app(state);
    let job_id = create_job(app.clone(), &owner, 900.0).await;
    let bids_uri = format!("/api/v1/jobs/{job_id}/bids");

    let response = get_as(app.clone(), &bids_uri, &worker).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    for who in [&worker, &rival] {
        let response = post_json(
            app.clone(),
            &bids_uri,
            who,
            json!({ "amount": 850.0, "message": "  Ready to start  " }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    // A bidder sees only their own bids.
    let response = get_as(app.clone(), &bids_uri, &worker).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let bids = json["data"].as_array().unwrap();
    assert_eq!(bids.len(), 1);
    assert_eq!(bids[0]["bidderId"], worker.id.to_string());
    assert_eq!(bids[0]["message"], "Ready to start");

    // The owner sees all of them.
    let response = get_as(app, &bids_uri, &owner).await;
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn bids_close_once_job_leaves_open() {
    let state = common::test_state();
    let owner = common::client(&state);
    let worker = common::freelancer(&state);
    let app = common::build_test_app(state);
    let job_id = create_job(app.clone(), &owner, 100.0).await;

    post_json(
        app.clone(),
        &format!("/api/v1/jobs/{job_id}/status"),
        &owner,
        json!({ "status": "CANCELLED" }),
    )
    .await;

    let response = post_json(
        app,
        &format!("/api/v1/jobs/{job_id}/bids"),
        &worker,
        json!({ "amount": 80.0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

#[tokio::test]
async fn posted_messages_appear_in_history() {
    let state = common::test_state();
    let owner = common::client(&state);
    let stranger = common::freelancer(&state);
    let app = common::build_test_app(state);
    let job_id = create_job(app.clone(), &owner, 100.0).await;
    let uri = format!("/api/v1/jobs/{job_id}/messages");

    for text in ["one", "two"] {
        let response = post_json(app.clone(), &uri, &owner, json!({ "text": text })).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = get_as(app.clone(), &uri, &owner).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["total"], 2);
    assert_eq!(json["data"]["items"][0]["text"], "one");
    assert_eq!(json["data"]["items"][1]["text"], "two");

    let response = get_as(app.clone(), &uri, &stranger).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_json(app, &uri, &owner, json!({ "text": "  " })).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// ---------------------------------------------------------------------------
// Escrow and release
// ---------------------------------------------------------------------------

#[tokio::test]
async fn escrow_then_idempotent_release() {
    let state = common::test_state();
    let owner = common::client(&state);
    let worker = common::freelancer(&state);
    let app = common::build_test_app(state);
    let job_id = create_job(app.clone(), &owner, 900.0).await;

    let response = post_json(
        app.clone(),
        &format!("/api/v1/jobs/{job_id}/bids"),
        &worker,
        json!({ "amount": 850.0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = post_json(
        app.clone(),
        &format!("/api/v1/jobs/{job_id}/escrow"),
        &owner,
        json!({ "amount": 900.0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["job"]["status"], "IN_PROGRESS");
    assert_eq!(json["data"]["job"]["paymentState"], "ESCROWED");
    assert_eq!(json["data"]["transaction"]["type"], "ESCROW");
    assert_eq!(json["data"]["transaction"]["amount"], -900.0);

    // First release completes the job.
    let first = release(app.clone(), &job_id, &owner, Some("release-1")).await;
    assert_eq!(first.status(), StatusCode::OK);
    let first_bytes = body_bytes(first).await;
    let json: serde_json::Value = serde_json::from_slice(&first_bytes).unwrap();
    assert_eq!(json["data"]["job"]["status"], "COMPLETED");
    assert_eq!(json["data"]["job"]["paymentState"], "RELEASED");
    assert_eq!(json["data"]["payment"]["state"], "RELEASED");

    // Same key: the stored response, byte for byte.
    let replay = release(app.clone(), &job_id, &owner, Some("release-1")).await;
    assert_eq!(replay.status(), StatusCode::OK);
    assert_eq!(body_bytes(replay).await, first_bytes);

    // Fresh key: the payment is no longer in escrow.
    let fresh = release(app.clone(), &job_id, &owner, Some("release-2")).await;
    assert_eq!(fresh.status(), StatusCode::CONFLICT);

    // The ledger holds only the escrow debit.
    let response = get_as(app, "/api/v1/wallet/transactions", &owner).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["total"], 1);
    assert_eq!(json["data"]["items"][0]["amount"], -900.0);
}

#[tokio::test]
async fn stored_failure_is_replayed_after_state_changes() {
    let state = common::test_state();
    let owner = common::client(&state);
    let app = common::build_test_app(state);
    let job_id = create_job(app.clone(), &owner, 200.0).await;

    let early = release(app.clone(), &job_id, &owner, Some("early")).await;
    assert_eq!(early.status(), StatusCode::CONFLICT);
    let early_bytes = body_bytes(early).await;

    post_json(
        app.clone(),
        &format!("/api/v1/jobs/{job_id}/escrow"),
        &owner,
        json!({ "amount": 200.0 }),
    )
    .await;

    let again = release(app.clone(), &job_id, &owner, Some("early")).await;
    assert_eq!(again.status(), StatusCode::CONFLICT);
    assert_eq!(body_bytes(again).await, early_bytes);

    let response = release(app, &job_id, &owner, Some("late")).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn release_requires_idempotency_key() {
    let state = common::test_state();
    let owner = common::client(&state);
    let app = common::build_test_app(state);
    let job_id = create_job(app.clone(), &owner, 200.0).await;

    let response = release(app.clone(), &job_id, &owner, None).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = release(app, &job_id, &owner, Some("   ")).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn escrow_rejects_non_positive_amounts() {
    let state = common::test_state();
    let owner = common::client(&state);
    let app = common::build_test_app(state);
    let job_id = create_job(app.clone(), &owner, 200.0).await;

    let response = post_json(
        app.clone(),
        &format!("/api/v1/jobs/{job_id}/escrow"),
        &owner,
        json!({ "amount": 0.0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = get_as(app, &format!("/api/v1/jobs/{job_id}/payments"), &owner).await;
    assert_eq!(body_json(response).await["data"], json!([]));
}

#[tokio::test]
async fn concurrent_releases_with_one_key_complete_once() {
    let state = common::test_state();
    let owner = common::client(&state);
    let app = common::build_test_app(state);
    let job_id = create_job(app.clone(), &owner, 400.0).await;
    let response = post_json(
        app.clone(),
        &format!("/api/v1/jobs/{job_id}/escrow"),
        &owner,
        json!({ "amount": 400.0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let mut handles = Vec::new();
    for _ in 0..12 {
        let (app, job_id, owner) = (app.clone(), job_id.clone(), owner.clone());
        handles.push(tokio::spawn(async move {
            let response = release(app, &job_id, &owner, Some("same-key")).await;
            (response.status(), body_bytes(response).await)
        }));
    }
    let mut outcomes = Vec::new();
    for handle in handles {
        outcomes.push(handle.await.unwrap());
    }

    let (status, body) = &outcomes[0];
    assert_eq!(*status, StatusCode::OK);
    assert!(outcomes.iter().all(|(s, b)| s == status && b == body));
    let json: serde_json::Value = serde_json::from_slice(body).unwrap();
    assert_eq!(json["data"]["job"]["status"], "COMPLETED");

    // The release ran once: a different key now sees the settled state.
    let fresh = release(app.clone(), &job_id, &owner, Some("other-key")).await;
    assert_eq!(fresh.status(), StatusCode::CONFLICT);

    let response = get_as(app, &format!("/api/v1/jobs/{job_id}/payments"), &owner).await;
    let payments = body_json(response).await;
    assert_eq!(payments["data"].as_array().unwrap().len(), 1);
    assert_eq!(payments["data"][0]["state"], "RELEASED");
}

#[tokio::test]
async fn other_client_cannot_escrow_or_release() {
    let state = common::test_state();
    let owner = common::client(&state);
    let other = common::client(&state);
    let app = common::build_test_app(state);
    let job_id = create_job(app.clone(), &owner, 200.0).await;

    let response = post_json(
        app.clone(),
        &format!("/api/v1/jobs/{job_id}/escrow"),
        &other,
        json!({ "amount": 200.0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = release(app, &job_id, &other, Some("k")).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Malformed requests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn malformed_json_body_is_a_json_bad_request() {
    let state = common::test_state();
    let owner = common::client(&state);
    let app = common::build_test_app(state);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/jobs")
        .header(AUTHORIZATION, format!("Bearer {}", owner.token))
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{\"title\": "))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn body_missing_a_field_is_a_validation_error() {
    let state = common::test_state();
    let owner = common::client(&state);
    let app = common::build_test_app(state);

    let response = post_json(app, "/api/v1/jobs", &owner, json!({ "title": "x" })).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"]["message"], "Invalid request body");
    let detail = json["error"]["details"][0].as_str().unwrap();
    assert!(detail.contains("missing field"), "{detail}");
}

#[tokio::test]
async fn non_uuid_job_id_is_a_json_bad_request() {
    let state = common::test_state();
    let owner = common::client(&state);
    let app = common::build_test_app(state);

    let response = get_as(app, "/api/v1/jobs/not-a-uuid", &owner).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn unknown_status_filter_is_a_validation_error() {
    let state = common::test_state();
    let owner = common::client(&state);
    let app = common::build_test_app(state);

    let response = get_as(app, "/api/v1/jobs?status=BOGUS", &owner).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"]["message"], "Invalid query parameters");
}
