//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};

use api::{AppState, Config};
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use common::PlantId;
use metrics_exporter_prometheus::PrometheusHandle;
use rust_decimal::dec;
use serde_json::{Value, json};
use store::{InMemoryStore, NewPlant, Plant, PlantStore, Seller};
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

struct TestApp {
    router: axum::Router,
    state: Arc<AppState<InMemoryStore>>,
    store: InMemoryStore,
}

impl TestApp {
    fn new() -> Self {
        Self::with_secret("test-secret")
    }

    fn with_secret(secret: &str) -> Self {
        let config = Config::with_secret(secret);
        let store = InMemoryStore::new();
        let state = AppState::new(store.clone(), &config);
        let router = api::create_app(state.clone(), get_metrics_handle(), &config);
        Self {
            router,
            state,
            store,
        }
    }

    /// A session cookie header for the given email.
    fn cookie(&self, email: &str) -> String {
        let identity = match json!({ "email": email }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let token = self.state.sessions.issue(identity).unwrap();
        format!("token={token}")
    }

    async fn seed_plant(&self, name: &str, quantity: u32) -> PlantId {
        self.store
            .insert_plant(Plant::from_new(
                PlantId::new(),
                NewPlant {
                    name: name.to_string(),
                    description: "Easy care".to_string(),
                    category: "Indoor".to_string(),
                    price: dec!(12.50),
                    quantity,
                    image: format!("{name}.jpg"),
                    seller: Seller {
                        name: "Rosa".to_string(),
                        image: None,
                        email: "rosa@example.com".to_string(),
                    },
                },
            ))
            .await
            .unwrap()
    }

    async fn quantity(&self, id: PlantId) -> u32 {
        self.store.get_plant(id).await.unwrap().unwrap().quantity
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        read_response(response).await
    }
}

async fn read_response(
    response: axum::response::Response,
) -> (StatusCode, HeaderMap, Value) {
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&body).into_owned())
        })
    };
    (status, headers, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn plant_body(name: &str, quantity: u32) -> Value {
    json!({
        "name": name,
        "description": "Glossy leaves",
        "category": "Indoor",
        "price": 24.5,
        "quantity": quantity,
        "image": "https://img.example.com/plant.jpg",
        "seller": {
            "name": "Rosa",
            "image": "https://img.example.com/rosa.jpg",
            "email": "rosa@example.com"
        }
    })
}

fn purchase_body(plant_id: PlantId, quantity: u32) -> Value {
    json!({
        "plantId": plant_id,
        "customer": {
            "name": "Ana",
            "email": "ana@example.com",
            "image": "https://img.example.com/ana.jpg"
        },
        "quantity": quantity,
        "address": "1 Garden Way"
    })
}

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new();

    let (status, _, json) = app.send(get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");

    let (status, _, body) = app.send(get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Hello from the plant nursery server");
}

#[tokio::test]
async fn test_jwt_sets_session_cookie() {
    let app = TestApp::new();

    let (status, headers, json) = app
        .send(json_request(
            "POST",
            "/jwt",
            None,
            json!({ "email": "ana@example.com", "name": "Ana" }),
        ))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);

    let set_cookie = headers
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("token="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Strict"));
    assert!(set_cookie.contains("Path=/"));

    // The issued cookie opens protected routes.
    let cookie = set_cookie.split(';').next().unwrap();
    let (status, _, _) = app.send(get_with_cookie("/plants/seller", cookie)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_jwt_without_email_is_rejected() {
    let app = TestApp::new();

    let (status, headers, _) = app
        .send(json_request("POST", "/jwt", None, json!({ "name": "Ana" })))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(headers.get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let app = TestApp::new();

    let (status, headers, json) = app.send(get("/logout")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);

    let set_cookie = headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(set_cookie.starts_with("token=;"));
    assert!(set_cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_create_plant_requires_session() {
    let app = TestApp::new();

    let (status, _, json) = app
        .send(json_request("POST", "/plants", None, plant_body("Monstera", 3)))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"], "unauthorized access");

    let (status, _, _) = app
        .send(json_request(
            "POST",
            "/plants",
            Some("token=not-a-real-token"),
            plant_body("Monstera", 3),
        ))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert_eq!(app.store.plant_count().await, 0);
}

#[tokio::test]
async fn test_token_from_other_server_is_rejected() {
    let app = TestApp::new();
    let other = TestApp::with_secret("another-secret");
    let foreign_cookie = other.cookie("ana@example.com");

    let (status, _, _) = app
        .send(json_request(
            "POST",
            "/plants",
            Some(&foreign_cookie),
            plant_body("Monstera", 3),
        ))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.store.plant_count().await, 0);
}

#[tokio::test]
async fn test_create_and_get_plant() {
    let app = TestApp::new();
    let cookie = app.cookie("rosa@example.com");

    let (status, _, json) = app
        .send(json_request(
            "POST",
            "/plants",
            Some(&cookie),
            plant_body("Monstera", 3),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = json["insertedId"].as_str().unwrap().to_string();

    let (status, _, plant) = app.send(get(&format!("/plants/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(plant["_id"], id);
    assert_eq!(plant["name"], "Monstera");
    assert_eq!(plant["price"], 24.5);
    assert_eq!(plant["quantity"], 3);
    assert_eq!(plant["seller"]["email"], "rosa@example.com");
}

#[tokio::test]
async fn test_create_plant_validates_input() {
    let app = TestApp::new();
    let cookie = app.cookie("rosa@example.com");

    let mut body = plant_body("  ", 3);
    let (status, _, _) = app
        .send(json_request("POST", "/plants", Some(&cookie), body.clone()))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    body["name"] = json!("Fern");
    body["price"] = json!(-1.0);
    let (status, _, _) = app
        .send(json_request("POST", "/plants", Some(&cookie), body))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(app.store.plant_count().await, 0);
}

#[tokio::test]
async fn test_create_plant_for_another_seller_is_forbidden() {
    let app = TestApp::new();
    let cookie = app.cookie("mallory@example.com");

    let (status, _, json) = app
        .send(json_request(
            "POST",
            "/plants",
            Some(&cookie),
            plant_body("Monstera", 3),
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(json["error"].is_string());
    assert_eq!(app.store.plant_count().await, 0);
}

#[tokio::test]
async fn test_get_missing_plant_is_null() {
    let app = TestApp::new();

    let (status, _, json) = app.send(get(&format!("/plants/{}", PlantId::new()))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, Value::Null);
}

#[tokio::test]
async fn test_invalid_plant_id_format() {
    let app = TestApp::new();

    let (status, _, json) = app.send(get("/plants/not-a-uuid")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("Invalid plant id"));
}

#[tokio::test]
async fn test_list_plants_is_capped() {
    let app = TestApp::new();
    for i in 0..25 {
        app.seed_plant(&format!("plant-{i:02}"), 1).await;
    }

    let (status, _, json) = app.send(get("/plants")).await;
    assert_eq!(status, StatusCode::OK);
    let plants = json.as_array().unwrap();
    assert_eq!(plants.len(), 20);
    assert_eq!(plants[0]["name"], "plant-00");

    let (_, _, json) = app.send(get("/plants?limit=3")).await;
    assert_eq!(json.as_array().unwrap().len(), 3);

    let (_, _, json) = app.send(get("/plants?limit=500")).await;
    assert_eq!(json.as_array().unwrap().len(), 20);
}

#[tokio::test]
async fn test_seller_sees_own_plants() {
    let app = TestApp::new();
    app.seed_plant("Pothos", 2).await;

    let (status, _, json) = app
        .send(get_with_cookie("/plants/seller", &app.cookie("rosa@example.com")))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 1);

    let (_, _, json) = app
        .send(get_with_cookie("/plants/seller", &app.cookie("ana@example.com")))
        .await;
    assert!(json.as_array().unwrap().is_empty());

    let (status, _, _) = app.send(get("/plants/seller")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_update_and_delete_plant() {
    let app = TestApp::new();
    let cookie = app.cookie("rosa@example.com");
    let id = app.seed_plant("Pothos", 2).await;

    let (status, _, json) = app
        .send(json_request(
            "PUT",
            &format!("/plants/{id}"),
            Some(&cookie),
            json!({
                "name": "Golden Pothos",
                "description": "Trailing",
                "category": "Indoor",
                "price": 9.0,
                "quantity": 7,
                "image": "pothos.jpg"
            }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "Golden Pothos");
    assert_eq!(json["quantity"], 7);
    assert_eq!(json["seller"]["email"], "rosa@example.com");

    let delete = |cookie: &str| {
        Request::builder()
            .method("DELETE")
            .uri(format!("/plants/{id}"))
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap()
    };

    let (status, _, json) = app.send(delete(&cookie)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["deletedCount"], 1);

    let (status, _, json) = app.send(delete(&cookie)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["deletedCount"], 0);

    let (status, _, _) = app
        .send(json_request(
            "PUT",
            &format!("/plants/{id}"),
            Some(&cookie),
            json!({
                "name": "Ghost",
                "price": 1.0,
                "quantity": 1,
                "image": "ghost.jpg"
            }),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_adjust_quantity() {
    let app = TestApp::new();
    let cookie = app.cookie("rosa@example.com");
    let id = app.seed_plant("Fern", 5).await;
    let uri = format!("/plants/quantity/{id}");

    let (status, _, json) = app
        .send(json_request(
            "PATCH",
            &uri,
            Some(&cookie),
            json!({ "quantityUpdate": 2 }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["quantity"], 3);

    let (status, _, _) = app
        .send(json_request(
            "PATCH",
            &uri,
            Some(&cookie),
            json!({ "quantityUpdate": 4 }),
        ))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(app.quantity(id).await, 3);

    // A negative amount restocks.
    let (status, _, json) = app
        .send(json_request(
            "PATCH",
            &uri,
            Some(&cookie),
            json!({ "quantityUpdate": -10 }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["quantity"], 13);

    let (status, _, _) = app
        .send(json_request(
            "PATCH",
            &format!("/plants/quantity/{}", PlantId::new()),
            Some(&cookie),
            json!({ "quantityUpdate": 1 }),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = app
        .send(json_request(
            "PATCH",
            &uri,
            None,
            json!({ "quantityUpdate": 1 }),
        ))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.quantity(id).await, 13);
}

#[tokio::test]
async fn test_adjust_quantity_with_extreme_amounts() {
    let app = TestApp::new();
    let cookie = app.cookie("rosa@example.com");
    let id = app.seed_plant("Fern", 5).await;
    let uri = format!("/plants/quantity/{id}");

    // Restocking by i64::MAX must not overflow.
    let (status, _, json) = app
        .send(json_request(
            "PATCH",
            &uri,
            Some(&cookie),
            json!({ "quantityUpdate": -9223372036854775807i64 }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());

    let (status, _, _) = app
        .send(json_request(
            "PATCH",
            &uri,
            Some(&cookie),
            json!({ "quantityUpdate": i64::MIN }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = app
        .send(json_request(
            "PATCH",
            &uri,
            Some(&cookie),
            json!({ "quantityUpdate": i64::MAX }),
        ))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    assert_eq!(app.quantity(id).await, 5);
}

#[tokio::test]
async fn test_other_sellers_cannot_change_plant() {
    let app = TestApp::new();
    let intruder = app.cookie("mallory@example.com");
    let id = app.seed_plant("Pothos", 4).await;

    let (status, _, _) = app
        .send(json_request(
            "PUT",
            &format!("/plants/{id}"),
            Some(&intruder),
            json!({
                "name": "Stolen Pothos",
                "price": 1.0,
                "quantity": 1,
                "image": "pothos.jpg"
            }),
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, _) = app
        .send(json_request(
            "PATCH",
            &format!("/plants/quantity/{id}"),
            Some(&intruder),
            json!({ "quantityUpdate": 4 }),
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, _) = app
        .send(
            Request::builder()
                .method("DELETE")
                .uri(format!("/plants/{id}"))
                .header(header::COOKIE, &intruder)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let plant = app.store.get_plant(id).await.unwrap().unwrap();
    assert_eq!(plant.name, "Pothos");
    assert_eq!(plant.quantity, 4);
    assert_eq!(app.store.plant_count().await, 1);
}

#[tokio::test]
async fn test_checkout() {
    let app = TestApp::new();
    let cookie = app.cookie("ana@example.com");
    let id = app.seed_plant("Fern", 5).await;

    let (status, _, json) = app
        .send(json_request(
            "POST",
            "/purchases",
            Some(&cookie),
            purchase_body(id, 2),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(json["insertedId"].as_str().is_some());
    assert_eq!(json["remainingQuantity"], 3);
    assert_eq!(json["price"], 25.0);
    assert_eq!(app.quantity(id).await, 3);
}

#[tokio::test]
async fn test_checkout_rejects_oversell() {
    let app = TestApp::new();
    let cookie = app.cookie("ana@example.com");
    let id = app.seed_plant("Fern", 2).await;

    let (status, _, json) = app
        .send(json_request(
            "POST",
            "/purchases",
            Some(&cookie),
            purchase_body(id, 3),
        ))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json["error"].as_str().unwrap().contains("Insufficient stock"));
    assert_eq!(app.quantity(id).await, 2);
    assert_eq!(app.store.purchase_count().await, 0);
}

#[tokio::test]
async fn test_checkout_requires_session() {
    let app = TestApp::new();
    let id = app.seed_plant("Fern", 2).await;

    let (status, _, _) = app
        .send(json_request("POST", "/purchases", None, purchase_body(id, 1)))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.quantity(id).await, 2);
    assert_eq!(app.store.purchase_count().await, 0);
}

#[tokio::test]
async fn test_checkout_of_missing_plant() {
    let app = TestApp::new();
    let cookie = app.cookie("ana@example.com");

    let (status, _, _) = app
        .send(json_request(
            "POST",
            "/purchases",
            Some(&cookie),
            purchase_body(PlantId::new(), 1),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_failed_purchase_write_restores_stock() {
    let app = TestApp::new();
    let cookie = app.cookie("ana@example.com");
    let id = app.seed_plant("Fern", 4).await;
    app.store.set_fail_on_insert_purchase(true);

    let (status, _, _) = app
        .send(json_request(
            "POST",
            "/purchases",
            Some(&cookie),
            purchase_body(id, 2),
        ))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(app.quantity(id).await, 4);
    assert_eq!(app.store.purchase_count().await, 0);
}

#[tokio::test]
async fn test_concurrent_full_stock_checkouts() {
    let app = TestApp::new();
    let cookie = app.cookie("ana@example.com");
    let id = app.seed_plant("Fern", 3).await;

    let responses = futures_util::future::join_all((0..2).map(|_| {
        let router = app.router.clone();
        let request = json_request("POST", "/purchases", Some(&cookie), purchase_body(id, 3));
        tokio::spawn(async move { router.oneshot(request).await.unwrap().status() })
    }))
    .await;

    let mut statuses: Vec<StatusCode> = responses.into_iter().map(|r| r.unwrap()).collect();
    statuses.sort_by_key(|s| s.as_u16());
    assert_eq!(statuses, vec![StatusCode::CREATED, StatusCode::CONFLICT]);
    assert_eq!(app.quantity(id).await, 0);
    assert_eq!(app.store.purchase_count().await, 1);
}

#[tokio::test]
async fn test_purchase_history() {
    let app = TestApp::new();
    let cookie = app.cookie("ana@example.com");
    let id = app.seed_plant("Fern", 5).await;

    for quantity in [1, 2] {
        let (status, _, _) = app
            .send(json_request(
                "POST",
                "/purchases",
                Some(&cookie),
                purchase_body(id, quantity),
            ))
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, _, json) = app
        .send(get_with_cookie("/purchases/ana@example.com", &cookie))
        .await;
    assert_eq!(status, StatusCode::OK);
    let purchases = json.as_array().unwrap();
    assert_eq!(purchases.len(), 2);
    assert_eq!(purchases[0]["quantity"], 1);
    assert_eq!(purchases[1]["quantity"], 2);
    assert_eq!(purchases[0]["name"], "Fern");
    assert_eq!(purchases[0]["category"], "Indoor");
    assert_eq!(purchases[0]["image"], "Fern.jpg");
    assert_eq!(purchases[0]["plantId"], id.to_string());
    assert!(purchases[0]["timestamp"].as_str().is_some());

    let (_, _, json) = app
        .send(get_with_cookie("/purchases/bob@example.com", &cookie))
        .await;
    assert!(json.as_array().unwrap().is_empty());

    let (status, _, _) = app.send(get("/purchases/ana@example.com")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_save_user_first_write_wins() {
    let app = TestApp::new();

    let (status, _, json) = app
        .send(json_request(
            "POST",
            "/users/ana@example.com",
            None,
            json!({ "name": "Ana", "image": "ana.png" }),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["email"], "ana@example.com");
    assert_eq!(json["role"], "customer");
    assert_eq!(json["name"], "Ana");

    let (status, _, json) = app
        .send(json_request(
            "POST",
            "/users/ana@example.com",
            None,
            json!({ "name": "Someone else", "role": "admin" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "Ana");
    assert_eq!(json["role"], "customer");

    let (status, _, json) = app.send(get("/users/role/ana@example.com")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["role"], "customer");

    let (status, _, _) = app.send(get("/users/role/nobody@example.com")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_save_user_rejects_invalid_email() {
    let app = TestApp::new();

    let (status, _, _) = app
        .send(json_request(
            "POST",
            "/users/not-an-email",
            None,
            json!({ "name": "Ana" }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_bearer_token_is_accepted() {
    let app = TestApp::new();
    let cookie = app.cookie("rosa@example.com");
    let token = cookie.trim_start_matches("token=");

    let (status, _, _) = app
        .send(
            Request::builder()
                .uri("/plants/seller")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_cors_allows_client_origin_with_credentials() {
    let app = TestApp::new();

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/plants")
                .header(header::ORIGIN, "http://localhost:5173")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://localhost:5173"
    );
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
        "true"
    );
}

#[tokio::test]
async fn test_metrics_endpoint_reports_checkouts() {
    let app = TestApp::new();
    let cookie = app.cookie("ana@example.com");
    let id = app.seed_plant("Fern", 1).await;

    app.send(json_request(
        "POST",
        "/purchases",
        Some(&cookie),
        purchase_body(id, 1),
    ))
    .await;

    let response = app.router.clone().oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("checkout_attempts_total"));
}

fn metric_value(text: &str, name: &str) -> f64 {
    text.lines()
        .find_map(|line| line.strip_prefix(name)?.strip_prefix(' ')?.trim().parse().ok())
        .unwrap_or(0.0)
}

#[tokio::test]
async fn test_checkout_duration_is_recorded_for_rejections() {
    let app = TestApp::new();
    let cookie = app.cookie("ana@example.com");
    let id = app.seed_plant("Fern", 1).await;
    let handle = get_metrics_handle();
    let before = metric_value(&handle.render(), "checkout_duration_seconds_count");

    let (status, _, _) = app
        .send(json_request(
            "POST",
            "/purchases",
            Some(&cookie),
            purchase_body(id, 0),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = app
        .send(json_request(
            "POST",
            "/purchases",
            Some(&cookie),
            purchase_body(id, 5),
        ))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let after = metric_value(&handle.render(), "checkout_duration_seconds_count");
    assert!(after >= before + 2.0, "before {before}, after {after}");
}
