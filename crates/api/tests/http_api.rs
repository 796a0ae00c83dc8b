//! End-to-end tests over the assembled router.
//!
//! Each test builds an isolated `AppState` with in-memory stores and
//! drives the router with `tower::ServiceExt::oneshot`; no socket is
//! bound and no external service is contacted.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use sipclub_api::config::ApiConfig;
use sipclub_api::directory::InMemoryDirectory;
use sipclub_api::ledger::InMemoryLedgerStore;
use sipclub_api::state::AppState;
use sipclub_core::rewards::{RewardsConfig, Tier, TierSchedule};
use sipclub_core::types::{BusinessId, BusinessLocation, Coordinate};
use tower::ServiceExt;

fn test_config() -> ApiConfig {
    let mut config = ApiConfig::default();
    config.rewards = RewardsConfig {
        tier_schedule: TierSchedule::new(vec![(Tier::Silver, 100), (Tier::Gold, 500)])
            .expect("valid schedule"),
        free_drink_milestone: 2,
    };
    config
}

fn seattle_locations() -> Vec<BusinessLocation> {
    let mk = |id: &str, lat: f64, lng: f64| BusinessLocation {
        id: BusinessId::new(id),
        name: format!("SipClub {id}"),
        coordinate: Coordinate::new(lat, lng),
        city: "Seattle".to_owned(),
        state: "WA".to_owned(),
        address: "1 Pike St".to_owned(),
    };
    vec![
        mk("cap-hill", 47.6230, -122.3210),
        mk("downtown", 47.6097, -122.3331),
        mk("ballard", 47.6685, -122.3843),
    ]
}

fn app_with(config: ApiConfig, locations: Vec<BusinessLocation>) -> Router {
    let state = AppState::new(
        config,
        Arc::new(InMemoryDirectory::new(locations)),
        Arc::new(InMemoryLedgerStore::new()),
    )
    .expect("state builds without a geocoder");
    sipclub_api::app(state)
}

fn app() -> Router {
    app_with(test_config(), seattle_locations())
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_endpoints_respond() {
    let app = app();
    let response = app.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/health/ready")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn search_by_region_lists_businesses() {
    let response = app()
        .oneshot(get("/search?city=Seattle&state=WA"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let businesses = body["businesses"].as_array().unwrap();
    assert_eq!(businesses.len(), 3);
    // No point supplied, so no distances.
    assert!(businesses[0].get("distance_km").is_none());
}

#[tokio::test]
async fn search_with_point_sorts_nearest_first() {
    // Query point is downtown Seattle.
    let response = app()
        .oneshot(get("/search?city=Seattle&state=WA&lat=47.6097&lng=-122.3331"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let businesses = body["businesses"].as_array().unwrap();
    assert_eq!(businesses[0]["id"], "downtown");
    let first = businesses[0]["distance_km"].as_f64().unwrap();
    let last = businesses[2]["distance_km"].as_f64().unwrap();
    assert!(first <= last);
}

#[tokio::test]
async fn club_detail_returns_the_record() {
    let response = app().oneshot(get("/clubs/downtown")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["id"], "downtown");
    assert_eq!(body["city"], "Seattle");
}

#[tokio::test]
async fn unknown_club_is_not_found() {
    let response = app().oneshot(get("/clubs/nowhere")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(response).await;
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn search_without_locator_is_bad_request() {
    let response = app().oneshot(get("/search")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn search_rejects_out_of_range_coordinates() {
    let response = app()
        .oneshot(get("/search?lat=95.0&lng=-122.3"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn search_by_address_without_geocoder_is_unavailable() {
    let response = app()
        .oneshot(get("/search?address=400%20Broad%20St%20Seattle"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = body_json(response).await;
    assert_eq!(body["error"], "address_search_disabled");
}

#[tokio::test]
async fn redirect_sends_to_nearest_club_page() {
    let response = app()
        .oneshot(get("/redirect?lat=47.6097&lng=-122.3331&near=me"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers()[header::LOCATION],
        "/clubs/downtown"
    );
}

#[tokio::test]
async fn redirect_falls_back_when_directory_is_empty() {
    let response = app_with(test_config(), Vec::new())
        .oneshot(get("/redirect?lat=47.6&lng=-122.3&near=me"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/clubs");
}

#[tokio::test]
async fn redirect_falls_back_without_a_point() {
    let response = app().oneshot(get("/redirect?near=me")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/clubs");
}

#[tokio::test]
async fn earn_then_read_account_snapshot() {
    let app = app();

    let response = app
        .clone()
        .oneshot(post_json(
            "/rewards/u-1/earn",
            &json!({"club_id": "club-a", "points": 150, "order_id": "order-9"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["account"]["tier"], "SILVER");
    assert_eq!(body["account"]["current_points"], 150);

    let response = app
        .oneshot(get("/rewards/u-1?club_id=club-a"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["account"]["total_points_earned"], 150);
}

#[tokio::test]
async fn unknown_account_is_not_found() {
    let response = app()
        .oneshot(get("/rewards/nobody?club_id=club-a"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn over_redemption_is_rejected_with_reason() {
    let app = app();
    let _ = app
        .clone()
        .oneshot(post_json(
            "/rewards/u-1/earn",
            &json!({"club_id": "club-a", "points": 50}),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(post_json(
            "/rewards/u-1/redeem",
            &json!({"club_id": "club-a", "points": 80}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["error"], "insufficient_points");
}

#[tokio::test]
async fn milestone_token_round_trip_over_http() {
    let app = app();

    // Milestone is 2 in the test config.
    let _ = app
        .clone()
        .oneshot(post_json(
            "/rewards/u-1/earn",
            &json!({"club_id": "club-a", "points": 10}),
        ))
        .await
        .unwrap();
    let response = app
        .clone()
        .oneshot(post_json(
            "/rewards/u-1/earn",
            &json!({"club_id": "club-a", "points": 10}),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    let token = body["redemption_token"].as_str().expect("token minted").to_owned();

    let response = app
        .clone()
        .oneshot(post_json(
            "/rewards/redeem-token",
            &json!({"token": token, "club_id": "club-a"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["account"]["consecutive_purchases"], 0);
}

#[tokio::test]
async fn token_presented_at_wrong_club_is_rejected() {
    let app = app();
    let _ = app
        .clone()
        .oneshot(post_json(
            "/rewards/u-1/earn",
            &json!({"club_id": "club-a", "points": 10}),
        ))
        .await
        .unwrap();
    let response = app
        .clone()
        .oneshot(post_json(
            "/rewards/u-1/earn",
            &json!({"club_id": "club-a", "points": 10}),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    let token = body["redemption_token"].as_str().unwrap().to_owned();

    let response = app
        .oneshot(post_json(
            "/rewards/redeem-token",
            &json!({"token": token, "club_id": "club-b"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["error"], "token_club_mismatch");
}

#[tokio::test]
async fn garbage_token_is_malformed() {
    let response = app()
        .oneshot(post_json(
            "/rewards/redeem-token",
            &json!({"token": "not a token", "club_id": "club-a"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["error"], "token_malformed");
}

#[tokio::test]
async fn zero_point_earn_is_bad_request() {
    let response = app()
        .oneshot(post_json(
            "/rewards/u-1/earn",
            &json!({"club_id": "club-a", "points": 0}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn search_budget_returns_429_when_exhausted() {
    let mut config = test_config();
    config.rate_limit.search_limit = 2;
    let app = app_with(config, seattle_locations());

    let request = || {
        Request::builder()
            .uri("/search?city=Seattle&state=WA")
            .header("x-real-ip", "203.0.113.7")
            .body(Body::empty())
            .unwrap()
    };

    for _ in 0..2 {
        let response = app.clone().oneshot(request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
    let response = app.clone().oneshot(request()).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let body = body_json(response).await;
    assert_eq!(body["error"], "rate_limited");

    // A different client still has budget.
    let other = Request::builder()
        .uri("/search?city=Seattle&state=WA")
        .header("x-real-ip", "203.0.113.8")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(other).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn rewards_and_search_budgets_are_separate() {
    let mut config = test_config();
    config.rate_limit.search_limit = 1;
    config.rate_limit.rewards_limit = 30;
    let app = app_with(config, seattle_locations());

    let search = || {
        Request::builder()
            .uri("/search?city=Seattle&state=WA")
            .header("x-real-ip", "203.0.113.9")
            .body(Body::empty())
            .unwrap()
    };
    let _ = app.clone().oneshot(search()).await.unwrap();
    let response = app.clone().oneshot(search()).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    // Same client key, different category: still allowed.
    let mut earn = post_json(
        "/rewards/u-1/earn",
        &json!({"club_id": "club-a", "points": 10}),
    );
    earn.headers_mut()
        .insert("x-real-ip", "203.0.113.9".parse().unwrap());
    let response = app.oneshot(earn).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
