use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use partsledger_api::app::{AppServices, build_app_with};
use partsledger_auth::{JwtClaims, Role};
use partsledger_core::UserId;
use reqwest::StatusCode;
use serde_json::json;

const JWT_SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod over in-memory stores, bound to an ephemeral port.
        let app = build_app_with(AppServices::in_memory(), JWT_SECRET);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            handle,
        }
    }

    async fn get(&self, token: &str, path: &str) -> (StatusCode, serde_json::Value) {
        let res = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(token)
            .send()
            .await
            .unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(serde_json::Value::Null))
    }

    async fn post(&self, token: &str, path: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let res = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(serde_json::Value::Null))
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(roles: Vec<Role>, confirmed: bool) -> String {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: UserId::new(),
        roles,
        confirmed,
        issued_at: now,
        expires_at: now + ChronoDuration::minutes(10),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("failed to encode jwt")
}

/// Register one part and two warehouses as admin; returns (part_id, wh_a, wh_b).
async fn seed_catalog(srv: &TestServer, admin: &str) -> (String, i64, i64) {
    let (status, part) = srv
        .post(
            admin,
            "/parts",
            json!({ "id": "P1", "name": "Oil filter", "brand": "Bosch" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(part["id"], "P1");

    let mut ids = Vec::new();
    for name in ["Central", "East"] {
        let (status, wh) = srv
            .post(admin, "/warehouses", json!({ "name": name, "location": null }))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        ids.push(wh["id"].as_i64().unwrap());
    }

    ("P1".to_string(), ids[0], ids[1])
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn().await;

    let res = srv
        .client
        .get(format!("{}/whoami", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let (status, body) = srv.get("not-a-jwt", "/stock/parts/P1").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let res = srv
        .client
        .get(format!("{}/health", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn token_signed_with_another_secret_is_rejected() {
    let srv = TestServer::spawn().await;

    let now = Utc::now();
    let claims = JwtClaims {
        sub: UserId::new(),
        roles: vec![Role::ADMIN],
        confirmed: true,
        issued_at: now,
        expires_at: now + ChronoDuration::minutes(10),
    };
    let forged = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(b"other-secret"),
    )
    .unwrap();

    let (status, _) = srv.get(&forged, "/whoami").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn principal_context_is_derived_from_token() {
    let srv = TestServer::spawn().await;
    let token = mint_jwt(vec![Role::CLERK], true);

    let (status, body) = srv.get(&token, "/whoami").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["confirmed"], true);
    assert!(body["roles"].as_array().unwrap().iter().any(|r| r == "clerk"));
    assert!(
        body["permissions"]
            .as_array()
            .unwrap()
            .iter()
            .any(|p| p == "stock.transfer")
    );
}

#[tokio::test]
async fn unconfirmed_user_is_forbidden() {
    let srv = TestServer::spawn().await;
    let token = mint_jwt(vec![Role::ADMIN], false);

    let (status, body) = srv.get(&token, "/stock/parts/P1").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    let (status, _) = srv
        .post(&token, "/parts", json!({ "name": "Spark plug" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn permissions_follow_roles() {
    let srv = TestServer::spawn().await;
    let admin = mint_jwt(vec![Role::ADMIN], true);
    let clerk = mint_jwt(vec![Role::CLERK], true);
    let reader = mint_jwt(vec![], true);
    let (part, a, _) = seed_catalog(&srv, &admin).await;

    let (status, _) = srv
        .post(&clerk, "/warehouses", json!({ "name": "West" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = srv
        .post(
            &reader,
            "/stock/receive",
            json!({ "part_id": part, "warehouse_id": a, "quantity": 1 }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = srv.get(&reader, "/parts").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn receive_transfer_query_flow() {
    let srv = TestServer::spawn().await;
    let admin = mint_jwt(vec![Role::ADMIN], true);
    let clerk = mint_jwt(vec![Role::CLERK], true);
    let (part, a, b) = seed_catalog(&srv, &admin).await;

    // Never-stocked pair reads as zero.
    let (status, body) = srv
        .get(&clerk, &format!("/stock/parts/{part}/warehouses/{b}"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["quantity"], 0);

    let (status, body) = srv
        .post(
            &clerk,
            "/stock/receive",
            json!({ "part_id": part, "warehouse_id": a, "quantity": 10 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["destination"]["quantity"], 10);
    assert_eq!(body["movement"]["type"], "inventory.stock.received");

    let (status, body) = srv
        .post(
            &clerk,
            "/stock/transfer",
            json!({
                "part_id": part,
                "from_warehouse_id": a,
                "to_warehouse_id": b,
                "quantity": 4,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"]["quantity"], 6);
    assert_eq!(body["destination"]["quantity"], 4);

    let (_, body) = srv
        .get(&clerk, &format!("/stock/parts/{part}/warehouses/{a}"))
        .await;
    assert_eq!(body["quantity"], 6);

    let (status, body) = srv.get(&clerk, &format!("/stock/parts/{part}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 10);
    assert_eq!(body["entries"].as_array().unwrap().len(), 2);

    let (status, body) = srv.get(&clerk, &format!("/stock/warehouses/{b}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entries"][0]["quantity"], 4);

    let (status, body) = srv
        .get(&clerk, &format!("/stock/parts/{part}/movements?limit=1"))
        .await;
    assert_eq!(status, StatusCode::OK);
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["type"], "inventory.stock.transferred");
    assert_eq!(items[0]["from_warehouse_id"], a);
}

#[tokio::test]
async fn insufficient_stock_is_409_and_changes_nothing() {
    let srv = TestServer::spawn().await;
    let admin = mint_jwt(vec![Role::ADMIN], true);
    let (part, a, b) = seed_catalog(&srv, &admin).await;

    let (status, _) = srv
        .post(
            &admin,
            "/stock/receive",
            json!({ "part_id": part, "warehouse_id": a, "quantity": 6 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = srv
        .post(
            &admin,
            "/stock/transfer",
            json!({
                "part_id": part,
                "from_warehouse_id": a,
                "to_warehouse_id": b,
                "quantity": 10,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "insufficient_stock");

    let (_, body) = srv
        .get(&admin, &format!("/stock/parts/{part}/warehouses/{a}"))
        .await;
    assert_eq!(body["quantity"], 6);
    let (_, body) = srv
        .get(&admin, &format!("/stock/parts/{part}/warehouses/{b}"))
        .await;
    assert_eq!(body["quantity"], 0);
}

#[tokio::test]
async fn invalid_movements_map_to_client_errors() {
    let srv = TestServer::spawn().await;
    let admin = mint_jwt(vec![Role::ADMIN], true);
    let (part, a, _) = seed_catalog(&srv, &admin).await;

    let transfer = |from: i64, to: i64, quantity: i64| {
        json!({
            "part_id": part,
            "from_warehouse_id": from,
            "to_warehouse_id": to,
            "quantity": quantity,
        })
    };

    let (status, body) = srv.post(&admin, "/stock/transfer", transfer(a, a, 1)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "same_warehouse");

    let (status, body) = srv.post(&admin, "/stock/transfer", transfer(a, 999, 0)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_quantity");

    let (status, body) = srv.post(&admin, "/stock/transfer", transfer(a, 999, 1)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "unknown_warehouse");

    let (status, body) = srv
        .post(
            &admin,
            "/stock/receive",
            json!({ "part_id": "NOPE", "warehouse_id": a, "quantity": 1 }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "unknown_part");

    let (status, body) = srv
        .get(&admin, &format!("/stock/parts/{part}/warehouses/north"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_id");

    let (status, body) = srv
        .post(&admin, "/parts", json!({ "id": "P1", "name": "Duplicate" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn malformed_bodies_get_json_error_bodies() {
    let srv = TestServer::spawn().await;
    let admin = mint_jwt(vec![Role::ADMIN], true);
    let (part, a, _) = seed_catalog(&srv, &admin).await;

    let (status, body) = srv
        .post(&admin, "/stock/receive", json!({ "part_id": part, "warehouse_id": a }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "invalid_body");
    assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));

    let (status, body) = srv
        .post(
            &admin,
            "/stock/receive",
            json!({ "part_id": part, "warehouse_id": a, "quantity": "five" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "invalid_body");

    let res = srv
        .client
        .post(format!("{}/stock/transfer", srv.base_url))
        .bearer_auth(&admin)
        .header("content-type", "application/json")
        .body("{\"part_id\": ")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_body");

    assert_eq!(
        srv.get(&admin, &format!("/stock/parts/{part}/warehouses/{a}")).await.1["quantity"],
        0
    );
}
