use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use mercado_auth::AccessClaims;
use mercado_core::{TenantId, UserId};
use reqwest::StatusCode;
use serde_json::json;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(jwt_secret: &str) -> Self {
        // Build app (same router as prod), but bind to an ephemeral port.
        let app = mercado_api::app::build_app(jwt_secret.to_string());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn register_and_login(
    client: &reqwest::Client,
    base_url: &str,
    tenant: &str,
    email: &str,
    password: &str,
) -> String {
    let res = client
        .post(format!("{}/auth/registro", base_url))
        .json(&json!({
            "tenant_id": tenant,
            "email": email,
            "password": password,
            "nombre": "Ana",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .post(format!("{}/auth/login", base_url))
        .json(&json!({ "tenant_id": tenant, "email": email, "password": password }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["expires_in"].as_i64().unwrap(), 3600);
    body["token"].as_str().unwrap().to_string()
}

async fn create_product(
    client: &reqwest::Client,
    base_url: &str,
    token: &str,
    codigo: &str,
    precio: &str,
    stock: u64,
) {
    let res = client
        .post(format!("{}/productos", base_url))
        .bearer_auth(token)
        .json(&json!({
            "codigo": codigo,
            "nombre": format!("Producto {codigo}"),
            "precio": precio,
            "stock": stock,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn health_is_public_and_protected_routes_require_auth() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/health", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/compras", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"].as_str().unwrap(), "missing_credential");
}

#[tokio::test]
async fn options_preflight_succeeds_without_credentials() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    let res = client
        .request(reqwest::Method::OPTIONS, format!("{}/compras", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn register_login_purchase_end_to_end() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    let token = register_and_login(&client, &srv.base_url, "t1", "a@x.com", "password1").await;
    create_product(&client, &srv.base_url, &token, "P1", "10.00", 5).await;

    let res = client
        .post(format!("{}/compras", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "productos": [{ "codigo": "P1", "cantidad": 2 }],
            "direccion_entrega": "Calle 1",
            "metodo_pago": "tarjeta",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let compra: serde_json::Value = res.json().await.unwrap();
    assert_eq!(compra["total"].as_str().unwrap(), "20.00");
    assert_eq!(compra["estado"].as_str().unwrap(), "confirmada");
    assert_eq!(compra["productos"][0]["precio_unitario"].as_str().unwrap(), "10.00");
    assert_eq!(compra["productos"][0]["subtotal"].as_str().unwrap(), "20.00");
    let compra_id = compra["compra_id"].as_str().unwrap().to_string();

    // Stock was debited.
    let res = client
        .get(format!("{}/productos/P1", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let product: serde_json::Value = res.json().await.unwrap();
    assert_eq!(product["stock"].as_u64().unwrap(), 3);

    // The purchase is fetchable by id and listed.
    let res = client
        .get(format!("{}/compras/{}", srv.base_url, compra_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/compras", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let listing: serde_json::Value = res.json().await.unwrap();
    assert_eq!(listing["count"].as_u64().unwrap(), 1);
    assert_eq!(
        listing["compras"][0]["compra_id"].as_str().unwrap(),
        compra_id
    );

    let res = client
        .get(format!("{}/auth/me", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let me: serde_json::Value = res.json().await.unwrap();
    assert_eq!(me["email"].as_str().unwrap(), "a@x.com");
    assert_eq!(me["tenantId"].as_str().unwrap(), "t1");
}

#[tokio::test]
async fn duplicate_registration_conflicts_within_a_tenant_only() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    let body = json!({
        "tenant_id": "t1",
        "email": "a@x.com",
        "password": "password1",
        "nombre": "Ana",
    });
    let res = client
        .post(format!("{}/auth/registro", srv.base_url))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .post(format!("{}/auth/registro", srv.base_url))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // Same email under another tenant is fine.
    let res = client
        .post(format!("{}/auth/registro", srv.base_url))
        .json(&json!({
            "tenant_id": "t2",
            "email": "a@x.com",
            "password": "password1",
            "nombre": "Ana",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn bad_password_and_unknown_user_are_indistinguishable() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();
    register_and_login(&client, &srv.base_url, "t1", "a@x.com", "password1").await;

    let mut bodies = Vec::new();
    for (email, password) in [("a@x.com", "wrongpass1"), ("nobody@x.com", "password1")] {
        let res = client
            .post(format!("{}/auth/login", srv.base_url))
            .json(&json!({ "tenant_id": "t1", "email": email, "password": password }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        bodies.push(res.json::<serde_json::Value>().await.unwrap());
    }
    assert_eq!(bodies[0], bodies[1]);
}

#[tokio::test]
async fn expired_token_is_rejected_with_a_distinct_code() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let client = reqwest::Client::new();

    let now = Utc::now().timestamp();
    let claims = AccessClaims {
        sub: UserId::new(),
        email: "a@x.com".to_string(),
        tenant_id: TenantId::new("t1").unwrap(),
        iat: now - 7200,
        exp: now - 3600,
    };
    let stale = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .unwrap();

    let res = client
        .get(format!("{}/compras", srv.base_url))
        .bearer_auth(stale)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"].as_str().unwrap(), "token_expired");

    // A token signed with another secret is invalid, not expired.
    let forged = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &AccessClaims {
            iat: now,
            exp: now + 3600,
            ..claims
        },
        &EncodingKey::from_secret(b"other-secret"),
    )
    .unwrap();
    let res = client
        .get(format!("{}/compras", srv.base_url))
        .bearer_auth(forged)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"].as_str().unwrap(), "token_invalid");
}

#[tokio::test]
async fn tenant_isolation_blocks_cross_tenant_reads() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    let token1 = register_and_login(&client, &srv.base_url, "t1", "a@x.com", "password1").await;
    let token2 = register_and_login(&client, &srv.base_url, "t2", "b@x.com", "password1").await;

    create_product(&client, &srv.base_url, &token1, "P1", "10.00", 5).await;

    let res = client
        .get(format!("{}/productos/P1", srv.base_url))
        .bearer_auth(&token2)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn insufficient_stock_rejects_the_whole_purchase() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    let token = register_and_login(&client, &srv.base_url, "t1", "a@x.com", "password1").await;
    create_product(&client, &srv.base_url, &token, "P1", "10.00", 5).await;
    create_product(&client, &srv.base_url, &token, "P2", "5.00", 1).await;

    let res = client
        .post(format!("{}/compras", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "productos": [
                { "codigo": "P1", "cantidad": 2 },
                { "codigo": "P2", "cantidad": 3 },
            ],
            "direccion_entrega": "Calle 1",
            "metodo_pago": "tarjeta",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"].as_str().unwrap(), "insufficient_stock");

    // Nothing was debited and nothing was recorded.
    let res = client
        .get(format!("{}/productos/P1", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let product: serde_json::Value = res.json().await.unwrap();
    assert_eq!(product["stock"].as_u64().unwrap(), 5);

    let res = client
        .get(format!("{}/compras", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let listing: serde_json::Value = res.json().await.unwrap();
    assert_eq!(listing["count"].as_u64().unwrap(), 0);
}

#[tokio::test]
async fn listing_pages_are_newest_first_and_disjoint() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    let token = register_and_login(&client, &srv.base_url, "t1", "a@x.com", "password1").await;
    create_product(&client, &srv.base_url, &token, "P1", "1.00", 100).await;

    let mut placed = Vec::new();
    for _ in 0..3 {
        let res = client
            .post(format!("{}/compras", srv.base_url))
            .bearer_auth(&token)
            .json(&json!({
                "productos": [{ "codigo": "P1", "cantidad": 1 }],
                "direccion_entrega": "Calle 1",
                "metodo_pago": "tarjeta",
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        let compra: serde_json::Value = res.json().await.unwrap();
        placed.push(compra["compra_id"].as_str().unwrap().to_string());
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let res = client
        .get(format!("{}/compras?limit=2", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let first: serde_json::Value = res.json().await.unwrap();
    assert_eq!(first["count"].as_u64().unwrap(), 2);
    assert_eq!(first["compras"][0]["compra_id"].as_str().unwrap(), placed[2]);
    assert_eq!(first["compras"][1]["compra_id"].as_str().unwrap(), placed[1]);
    let cursor = first["pagination"]["lastKey"].as_str().unwrap();

    let res = client
        .get(format!("{}/compras?limit=2&lastKey={}", srv.base_url, cursor))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let second: serde_json::Value = res.json().await.unwrap();
    assert_eq!(second["count"].as_u64().unwrap(), 1);
    assert_eq!(second["compras"][0]["compra_id"].as_str().unwrap(), placed[0]);

    // Asking for someone else's purchases is forbidden.
    let other = UserId::new();
    let res = client
        .get(format!("{}/compras?usuario_id={}", srv.base_url, other))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}
