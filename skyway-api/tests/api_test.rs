use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use skyway_api::{ApiClient, ApiError, SessionEvent};
use skyway_core::search::FlightTab;
use skyway_core::user::{Gender, RegisterRequest};
use skyway_core::{CoreError, FlightQuery, FlightStatus, ReportType, Role, User};
use skyway_store::app_config::ApiConfig;
use skyway_store::{AuthScheme, MemorySessionStore, Session, SessionStore, UserCache};
use std::sync::Arc;

struct TestSetup {
    server: ServerGuard,
    client: ApiClient,
    store: Arc<MemorySessionStore>,
}

fn user_json(balance: f64) -> serde_json::Value {
    json!({
        "user_id": 7,
        "first_name": "Ana",
        "last_name": "Kovac",
        "email": "ana@example.com",
        "role": "USER",
        "account_balance": balance
    })
}

fn user(balance: f64) -> User {
    serde_json::from_value(user_json(balance)).unwrap()
}

/// Shaped like the flight service's response: Decimal price as a string,
/// preformatted duration, trimmed airport relations.
fn flight_json(id: i64, status: &str) -> serde_json::Value {
    json!({
        "flight_id": id,
        "flight_name": format!("SW-{}", id),
        "airline_id": 1,
        "airline": {"id": 1, "name": "Skyway Air"},
        "flight_distance_km": 1700,
        "flight_duration": "2:30:00",
        "departure_time": "2025-06-01T10:00:00",
        "arrival_time": "2025-06-01T12:30:00",
        "departure_airport_id": 1,
        "departure_airport": {"id": 1, "name": "Nikola Tesla", "code": "BEG"},
        "arrival_airport_id": 2,
        "arrival_airport": {"id": 2, "name": "Heathrow", "code": "LHR"},
        "created_by": 4,
        "price": "149.99",
        "total_seats": 180,
        "available_seats": 12,
        "status": status,
        "rejection_reason": null,
        "created_at": "2025-05-20T09:12:44.123456"
    })
}

async fn setup(scheme: AuthScheme, session: Option<Session>) -> TestSetup {
    let server = Server::new_async().await;
    let config = ApiConfig {
        base_url: server.url(),
        prefix: "/api/v1".to_string(),
        auth_scheme: scheme,
        timeout_secs: 5,
    };
    let store = Arc::new(match session {
        Some(session) => MemorySessionStore::with_session(session),
        None => MemorySessionStore::new(),
    });
    let cache = Arc::new(UserCache::new(chrono::Duration::minutes(5)));
    let client = ApiClient::new(&config, store.clone(), cache).unwrap();

    TestSetup { server, client, store }
}

async fn signed_in() -> TestSetup {
    setup(AuthScheme::Bearer, Some(Session::new("tok", user(50.0)))).await
}

#[tokio::test]
async fn test_login_persists_session() {
    let mut t = setup(AuthScheme::Bearer, None).await;
    let mock = t
        .server
        .mock("POST", "/api/v1/auth/login")
        .match_header("authorization", Matcher::Missing)
        .match_body(Matcher::Json(json!({"email": "ana@example.com", "password": "hunter22"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"token": "fresh-token", "user": user_json(10.0)}).to_string())
        .expect(1)
        .create_async()
        .await;

    let mut events = t.client.subscribe();
    let user = t.client.auth().login(" ana@example.com ", "hunter22").await.unwrap();

    mock.assert_async().await;
    assert_eq!(user.user_id, 7);
    let stored = t.store.load().await.unwrap().unwrap();
    assert_eq!(stored.token(), "fresh-token");
    assert!(matches!(events.try_recv(), Ok(SessionEvent::SignedIn(_))));
}

#[tokio::test]
async fn test_flight_pagination_round_trip() {
    let mut t = signed_in().await;
    let mock = t
        .server
        .mock("GET", "/api/v1/flights")
        .match_header("authorization", "Bearer tok")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("page".into(), "2".into()),
            Matcher::UrlEncoded("per_page".into(), "5".into()),
            Matcher::UrlEncoded("status".into(), "APPROVED".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "flights": [flight_json(11, "APPROVED")],
                "total": 11,
                "page": 2,
                "per_page": 5,
                "pages": 3
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let query = FlightQuery::page(2, 5).with_status(FlightStatus::Approved);
    let page = t.client.flights().list(&query).await.unwrap();

    mock.assert_async().await;
    assert_eq!((page.page, page.per_page, page.total), (2, 5, 11));
    assert!(page.has_next() && page.has_previous());
    assert_eq!(page.items[0].flight_name, "SW-11");
    assert_eq!(page.items[0].route_label(), "BEG → LHR");
    assert_eq!(page.items[0].price, 149.99);
    assert_eq!(page.items[0].flight_duration.as_deref(), Some("2:30:00"));
}

#[tokio::test]
async fn test_unauthorized_clears_session_and_redirects() {
    let mut t = signed_in().await;
    t.server
        .mock("GET", "/api/v1/users/bookings")
        .with_status(401)
        .with_body(r#"{"message":"Token expired"}"#)
        .create_async()
        .await;

    let mut events = t.client.subscribe();
    let err = t.client.bookings().list_mine().await.unwrap_err();

    assert!(matches!(err, ApiError::SessionExpired { redirect: "/login" }));
    assert!(t.store.load().await.unwrap().is_none());
    assert_eq!(events.try_recv().unwrap(), SessionEvent::Expired { redirect: "/login" });
}

#[tokio::test]
async fn test_user_id_header_scheme() {
    let mut t = setup(AuthScheme::UserId, Some(Session::new("tok", user(0.0)))).await;
    let mock = t
        .server
        .mock("GET", "/api/v1/airlines")
        .match_header("user-id", "7")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"airlines":[{"id":1,"name":"Skyway Air","code":"SW"}]}"#)
        .expect(1)
        .create_async()
        .await;

    let airlines = t.client.airlines().list().await.unwrap();

    mock.assert_async().await;
    assert_eq!(airlines[0].name.as_deref(), Some("Skyway Air"));
}

#[tokio::test]
async fn test_missing_session_sends_nothing() {
    let mut t = setup(AuthScheme::Bearer, None).await;
    let mock = t
        .server
        .mock("GET", "/api/v1/users/bookings")
        .expect(0)
        .create_async()
        .await;

    let err = t.client.bookings().list_mine().await.unwrap_err();

    assert!(matches!(err, ApiError::NotAuthenticated));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_rating_rejected_locally() {
    let mut t = signed_in().await;
    let mock = t.server.mock("POST", "/api/v1/ratings").expect(0).create_async().await;

    let not_landed = t.client.ratings().create(3, FlightStatus::Approved, 4).await.unwrap_err();
    assert_eq!(
        not_landed.user_message("Failed to submit rating"),
        "You can only rate completed flights"
    );

    let unselected = t.client.ratings().create(3, FlightStatus::Completed, 0).await.unwrap_err();
    assert!(matches!(
        unselected,
        ApiError::Validation(CoreError::ValidationError(ref m)) if m == "Please select a rating"
    ));

    mock.assert_async().await;
}

#[tokio::test]
async fn test_rejection_reason_checked_before_sending() {
    let mut t = signed_in().await;
    let rejected = t
        .server
        .mock("PATCH", "/api/v1/flights/3/status")
        .match_body(Matcher::Json(json!({
            "status": "REJECTED",
            "rejection_reason": "Crew unavailable for route"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(flight_json(3, "REJECTED").to_string())
        .expect(1)
        .create_async()
        .await;

    let err = t.client.flights().reject(3, "too short").await.unwrap_err();
    assert_eq!(
        err.user_message("Failed to reject flight"),
        "Rejection reason must be at least 10 characters"
    );

    let flight = t.client.flights().reject(3, "  Crew unavailable for route ").await.unwrap();
    assert_eq!(flight.status, FlightStatus::Rejected);
    rejected.assert_async().await;
}

#[tokio::test]
async fn test_server_error_messages() {
    let mut t = signed_in().await;
    t.server
        .mock("GET", "/api/v1/flights/99")
        .with_status(404)
        .with_body(r#"{"message":"Flight not found"}"#)
        .create_async()
        .await;
    t.server
        .mock("GET", "/api/v1/flights/100")
        .with_status(502)
        .with_body("<html>Bad gateway</html>")
        .create_async()
        .await;

    let not_found = t.client.flights().get(99).await.unwrap_err();
    assert!(matches!(
        not_found,
        ApiError::Server { status: 404, ref message } if message == "Flight not found"
    ));

    let gateway = t.client.flights().get(100).await.unwrap_err();
    assert_eq!(gateway.user_message("ignored"), "Failed to load flight");
    assert_eq!(gateway.status(), Some(502));
    // a non-401 error leaves the session alone
    assert!(t.store.load().await.unwrap().is_some());
}

#[tokio::test]
async fn test_report_returns_pdf_bytes() {
    let mut t = signed_in().await;
    let mock = t
        .server
        .mock("POST", "/api/v1/reports/flights")
        .match_body(Matcher::Json(json!({"report_types": ["upcoming", "completed"]})))
        .with_status(200)
        .with_header("content-type", "application/pdf")
        .with_body(b"%PDF-1.4\n%fake")
        .expect(1)
        .create_async()
        .await;

    let pdf = t
        .client
        .reports()
        .generate(&[ReportType::Upcoming, ReportType::Completed, ReportType::Upcoming])
        .await
        .unwrap();
    assert!(pdf.starts_with(b"%PDF"));

    let empty = t.client.reports().generate(&[]).await.unwrap_err();
    assert!(matches!(empty, ApiError::Validation(_)));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_balance_operations_refresh_user() {
    let mut t = signed_in().await;
    let profile = t
        .server
        .mock("GET", "/api/v1/users/7")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(user_json(75.5).to_string())
        .expect(2)
        .create_async()
        .await;
    let withdraw = t.server.mock("PATCH", "/api/v1/users/withdraw").expect(0).create_async().await;
    let deposit = t
        .server
        .mock("PATCH", "/api/v1/users/deposit")
        .match_body(Matcher::Json(json!({"amount": 25.5})))
        .with_status(200)
        .with_body(r#"{"message":"Deposit successful"}"#)
        .expect(1)
        .create_async()
        .await;

    let err = t.client.users().withdraw("80").await.unwrap_err();
    assert_eq!(err.user_message("Withdrawal failed"), "Insufficient balance for this withdrawal");

    let user = t.client.users().deposit("25.5x").await.unwrap();
    assert_eq!(user.account_balance, 75.5);
    assert_eq!(t.store.load().await.unwrap().unwrap().user.account_balance, 75.5);

    profile.assert_async().await;
    withdraw.assert_async().await;
    deposit.assert_async().await;
}

#[tokio::test]
async fn test_flight_ratings_filtered_client_side() {
    let mut t = signed_in().await;
    t.server
        .mock("GET", "/api/v1/ratings")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("page".into(), "1".into()),
            Matcher::UrlEncoded("per_page".into(), "10".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "ratings": [
                    {"id": 1, "user_id": 2, "flight_id": 3, "rating": 5},
                    {"id": 2, "user_id": 2, "flight_id": 4, "rating": 2},
                    {"rating_id": 3, "user_id": 5, "flight_id": 3, "rating": 4}
                ],
                "total": 3, "page": 1, "per_page": 10, "pages": 1
            })
            .to_string(),
        )
        .create_async()
        .await;

    let page = t.client.ratings().list_for_flight(3, 1, 10).await.unwrap();

    assert_eq!(page.items.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 3]);
    assert_eq!(page.total, 3);
}

#[tokio::test]
async fn test_user_list_accepts_bare_array() {
    let mut t = signed_in().await;
    t.server
        .mock("GET", "/api/v1/users/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!([user_json(1.0), user_json(2.0)]).to_string())
        .create_async()
        .await;

    let users = t.client.users().list().await.unwrap();
    assert_eq!(users.len(), 2);
}

#[tokio::test]
async fn test_logout_survives_server_failure() {
    let mut t = signed_in().await;
    let mock = t
        .server
        .mock("POST", "/api/v1/auth/logout")
        .with_status(500)
        .expect(1)
        .create_async()
        .await;

    let mut events = t.client.subscribe();
    t.client.auth().logout().await.unwrap();

    mock.assert_async().await;
    assert!(t.store.load().await.unwrap().is_none());
    assert_eq!(events.try_recv().unwrap(), SessionEvent::SignedOut);
}

#[tokio::test]
async fn test_tab_listing_round_trips_pagination() {
    let mut t = signed_in().await;
    let mock = t
        .server
        .mock("GET", "/api/v1/flights/tabs/in-progress")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("page".into(), "3".into()),
            Matcher::UrlEncoded("per_page".into(), "4".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "flights": [flight_json(31, "IN_PROGRESS")],
                "total": 9,
                "page": 3,
                "per_page": 4,
                "pages": 3,
                "tab": "in-progress"
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let page = t
        .client
        .flights()
        .list_by_tab(FlightTab::InProgress, &FlightQuery::page(3, 4))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!((page.page, page.per_page, page.pages), (3, 4, 3));
    assert!(!page.has_next() && page.has_previous());
    assert_eq!(page.tab.as_deref(), Some("in-progress"));
    assert_eq!(page.items[0].status, FlightStatus::InProgress);
}

#[tokio::test]
async fn test_my_ratings_round_trip_pagination() {
    let mut t = signed_in().await;
    let mock = t
        .server
        .mock("GET", "/api/v1/users/ratings")
        .match_header("authorization", "Bearer tok")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("page".into(), "2".into()),
            Matcher::UrlEncoded("per_page".into(), "20".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "ratings": [{"id": 4, "user_id": 7, "flight_id": 3, "rating": 5}],
                "total": 21, "page": 2, "per_page": 20, "pages": 2
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let page = t.client.ratings().list_mine(2, 20).await.unwrap();

    mock.assert_async().await;
    assert_eq!((page.page, page.per_page, page.total), (2, 20, 21));
    assert_eq!(page.items[0].rating, 5);
}

#[tokio::test]
async fn test_register_persists_session() {
    let mut t = setup(AuthScheme::Bearer, None).await;
    let mock = t
        .server
        .mock("POST", "/api/v1/auth/register")
        .match_header("authorization", Matcher::Missing)
        .match_body(Matcher::PartialJson(json!({
            "email": "ana@example.com",
            "password": "secret-pass",
            "gender": "FEMALE",
            "house_number": 12
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(json!({"token": "new-token", "user": user_json(0.0)}).to_string())
        .expect(1)
        .create_async()
        .await;

    let request = RegisterRequest {
        first_name: "Ana".to_string(),
        last_name: "Kovac".to_string(),
        email: "ana@example.com".to_string(),
        password: "secret-pass".into(),
        birth_date: "1990-04-02".to_string(),
        gender: Gender::Female,
        country: "Serbia".to_string(),
        city: "Belgrade".to_string(),
        street: "Knez Mihailova".to_string(),
        house_number: 12,
        profile_picture: None,
    };
    let user = t.client.auth().register(&request).await.unwrap();

    mock.assert_async().await;
    assert_eq!(user.user_id, 7);
    assert_eq!(t.store.load().await.unwrap().unwrap().token(), "new-token");
}

#[tokio::test]
async fn test_flight_status_actions() {
    let mut t = signed_in().await;
    let approve = t
        .server
        .mock("PATCH", "/api/v1/flights/4/status")
        .match_body(Matcher::Json(json!({"status": "APPROVED"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(flight_json(4, "APPROVED").to_string())
        .expect(1)
        .create_async()
        .await;
    let cancel = t
        .server
        .mock("POST", "/api/v1/flights/4/cancel")
        .match_body(Matcher::Json(json!({})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(flight_json(4, "CANCELLED").to_string())
        .expect(1)
        .create_async()
        .await;
    let delete = t
        .server
        .mock("DELETE", "/api/v1/flights/4")
        .match_header("authorization", "Bearer tok")
        .with_status(200)
        .with_body(r#"{"message":"Flight deleted"}"#)
        .expect(1)
        .create_async()
        .await;

    assert_eq!(t.client.flights().approve(4).await.unwrap().status, FlightStatus::Approved);
    assert_eq!(t.client.flights().cancel(4).await.unwrap().status, FlightStatus::Cancelled);
    t.client.flights().delete(4).await.unwrap();

    approve.assert_async().await;
    cancel.assert_async().await;
    delete.assert_async().await;
}

#[tokio::test]
async fn test_booking_changes_drop_cached_user() {
    let mut t = signed_in().await;
    let create = t
        .server
        .mock("POST", "/api/v1/bookings")
        .match_body(Matcher::Json(json!({"flight_id": 4})))
        .with_status(201)
        .with_body(r#"{"message":"Booking created"}"#)
        .expect(1)
        .create_async()
        .await;
    let cancel = t
        .server
        .mock("DELETE", "/api/v1/bookings/12")
        .with_status(200)
        .with_body(r#"{"message":"Booking cancelled"}"#)
        .expect(1)
        .create_async()
        .await;

    t.client.user_cache().put(user(50.0)).await;
    t.client.bookings().create(4).await.unwrap();
    assert!(t.client.user_cache().get_fresh().await.is_none());

    t.client.user_cache().put(user(50.0)).await;
    t.client.bookings().cancel(12).await.unwrap();
    assert!(t.client.user_cache().get_fresh().await.is_none());

    create.assert_async().await;
    cancel.assert_async().await;
}

#[tokio::test]
async fn test_user_administration() {
    let mut t = signed_in().await;
    let other = t
        .server
        .mock("PATCH", "/api/v1/users/9")
        .match_body(Matcher::Json(json!({"role": "MANAGER"})))
        .with_status(200)
        .with_body(r#"{"message":"Role updated"}"#)
        .expect(1)
        .create_async()
        .await;
    let own = t
        .server
        .mock("PATCH", "/api/v1/users/7")
        .match_body(Matcher::Json(json!({"role": "ADMINISTRATOR"})))
        .with_status(200)
        .with_body(r#"{"message":"Role updated"}"#)
        .expect(1)
        .create_async()
        .await;
    let delete = t
        .server
        .mock("DELETE", "/api/v1/users/9")
        .with_status(200)
        .with_body(r#"{"message":"User deleted"}"#)
        .expect(1)
        .create_async()
        .await;

    t.client.user_cache().put(user(50.0)).await;
    t.client.users().update_role(9, Role::Manager).await.unwrap();
    // someone else's role leaves the cached user alone
    assert!(t.client.user_cache().get_fresh().await.is_some());

    t.client.users().update_role(7, Role::Administrator).await.unwrap();
    assert!(t.client.user_cache().get_fresh().await.is_none());

    t.client.users().delete(9).await.unwrap();

    other.assert_async().await;
    own.assert_async().await;
    delete.assert_async().await;
}

#[tokio::test]
async fn test_avatar_upload_sends_data_url() {
    let mut t = signed_in().await;
    let patch = t
        .server
        .mock("PATCH", "/api/v1/users/")
        .match_body(Matcher::Json(json!({"profile_picture": "data:image/png;base64,iVBORw=="})))
        .with_status(200)
        .with_body(r#"{"message":"Profile updated"}"#)
        .expect(1)
        .create_async()
        .await;
    let mut refreshed = user_json(50.0);
    refreshed["profile_picture"] = json!("data:image/png;base64,iVBORw==");
    let profile = t
        .server
        .mock("GET", "/api/v1/users/7")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(refreshed.to_string())
        .expect(1)
        .create_async()
        .await;

    let user = t.client.users().upload_avatar("image/png", b"\x89PNG").await.unwrap();
    assert_eq!(user.profile_picture.as_deref(), Some("data:image/png;base64,iVBORw=="));

    let err = t.client.users().upload_avatar("text/plain", b"hello").await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));

    patch.assert_async().await;
    profile.assert_async().await;
}
