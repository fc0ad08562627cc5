//! End-to-end test harness for the Redis Shop storefront.
//!
//! [`TestContext::spawn`] starts two in-process servers on ephemeral ports:
//!
//! - a fake commerce service speaking the same JSON contract as the real one,
//!   recording every request it receives
//! - the storefront itself, configured to talk to the fake
//!
//! Tests then drive the storefront with a `reqwest` client that keeps cookies
//! but does not follow redirects, so guards and actions can be asserted on.
//!
//! ```rust,ignore
//! let ctx = TestContext::spawn().await;
//! let response = ctx.get("/cart").await;
//! assert_eq!(response.status(), 303);
//! ```

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, Query, Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use redis_shop_storefront::config::{ApiConfig, StorefrontConfig};
use redis_shop_storefront::{routes, state::AppState};
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::{Value, json};
use url::Url;

/// Email of the one account the fake service knows.
pub const USER_EMAIL: &str = "user@example.com";
/// Password of that account.
pub const USER_PASSWORD: &str = "password123";

const USER_ID: i32 = 1;
const SESSION_SECRET: &str = "kQ9#vL2$wX7!pR4@mZ8&tY1*nB5^cF3%";

/// A request received by the fake commerce service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub cache_control: Option<String>,
}

/// Shared state of the fake commerce service.
#[derive(Default)]
pub struct FakeCommerce {
    calls: Mutex<Vec<RecordedCall>>,
    sessions: Mutex<HashMap<String, i32>>,
    carts: Mutex<HashMap<i32, Vec<(i32, u32)>>>,
    issued: Mutex<u32>,
}

impl FakeCommerce {
    /// Every request received so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Requests received for `path`.
    pub fn calls_to(&self, path: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.path == path)
            .collect()
    }

    /// Forget every issued token, as if sessions expired server-side.
    pub fn revoke_sessions(&self) {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn user_for(&self, headers: &HeaderMap) -> Option<i32> {
        let token = headers
            .get(header::AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")?;
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(token)
            .copied()
    }

    fn cart_json(&self, user: i32) -> Value {
        let carts = self.carts.lock().unwrap_or_else(PoisonError::into_inner);
        let entries: Vec<Value> = carts
            .get(&user)
            .into_iter()
            .flatten()
            .map(|(pid, qty)| json!({ "pid": pid, "qty": qty }))
            .collect();
        Value::Array(entries)
    }
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

fn product_json(id: i32) -> Option<Value> {
    let (name, price, stock) = match id {
        1 => ("Phone", 50_000, 10),
        2 => ("Laptop", 80_000, 0),
        7 => ("Headphones", 15_000, 25),
        _ => return None,
    };
    Some(json!({ "id": id, "name": name, "price": price, "stock": stock }))
}

async fn record(State(fake): State<Arc<FakeCommerce>>, request: Request, next: Next) -> Response {
    let call = recorded_call(&request);
    fake.calls
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(call);
    next.run(request).await
}

fn recorded_call(request: &Request) -> RecordedCall {
    let header_value = |name: header::HeaderName| {
        request
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    };
    RecordedCall {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        query: request.uri().query().map(String::from),
        authorization: header_value(header::AUTHORIZATION),
        cache_control: header_value(header::CACHE_CONTROL),
    }
}

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

async fn login(State(fake): State<Arc<FakeCommerce>>, Json(body): Json<LoginBody>) -> Response {
    if body.email != USER_EMAIL || body.password != USER_PASSWORD {
        return detail(StatusCode::UNAUTHORIZED, "Invalid credentials");
    }

    let token = {
        let mut issued = fake.issued.lock().unwrap_or_else(PoisonError::into_inner);
        *issued += 1;
        format!("tok-{USER_ID}-{}", *issued)
    };
    fake.sessions
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(token.clone(), USER_ID);

    Json(json!({ "token": token })).into_response()
}

async fn me(State(fake): State<Arc<FakeCommerce>>, headers: HeaderMap) -> Response {
    match fake.user_for(&headers) {
        Some(user) => Json(json!({ "user_id": user })).into_response(),
        None => detail(StatusCode::UNAUTHORIZED, "Invalid or expired session"),
    }
}

async fn product(Path(id): Path<i32>) -> Response {
    product_json(id).map_or_else(
        || detail(StatusCode::NOT_FOUND, "Product not found"),
        |data| Json(json!({ "source": "redis", "data": data })).into_response(),
    )
}

async fn homepage() -> Json<Value> {
    Json(json!({
        "source": "cache",
        "data": { "banners": ["Summer sale"], "featured": [1, 99, 2] }
    }))
}

#[derive(Deserialize)]
struct AddQuery {
    pid: i32,
    qty: u32,
}

async fn add_to_cart(
    State(fake): State<Arc<FakeCommerce>>,
    headers: HeaderMap,
    Query(query): Query<AddQuery>,
) -> Response {
    let Some(user) = fake.user_for(&headers) else {
        return detail(StatusCode::UNAUTHORIZED, "Invalid or expired session");
    };
    if product_json(query.pid).is_none() {
        return detail(StatusCode::NOT_FOUND, "Product not found");
    }

    fake.carts
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .entry(user)
        .or_default()
        .push((query.pid, query.qty));

    Json(json!({ "message": "Added to cart", "cart": fake.cart_json(user) })).into_response()
}

async fn cart(State(fake): State<Arc<FakeCommerce>>, headers: HeaderMap) -> Response {
    match fake.user_for(&headers) {
        Some(user) => Json(json!({ "cart": fake.cart_json(user) })).into_response(),
        None => detail(StatusCode::UNAUTHORIZED, "Invalid or expired session"),
    }
}

fn fake_commerce_router(fake: Arc<FakeCommerce>) -> Router {
    Router::new()
        .route("/", get(|| async { Json(json!({ "status": "ok" })) }))
        .route("/login", post(login))
        .route("/me", get(me))
        .route("/product/{id}", get(product))
        .route("/homepage", get(homepage))
        .route("/cart/add", post(add_to_cart))
        .route("/cart", get(cart))
        .layer(middleware::from_fn_with_state(fake.clone(), record))
        .with_state(fake)
}

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local address");
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .expect("server error");
    });
    addr
}

/// A running storefront wired to a fake commerce service.
pub struct TestContext {
    pub client: reqwest::Client,
    pub storefront_url: String,
    pub commerce: Arc<FakeCommerce>,
}

impl TestContext {
    /// Start both servers with the view cache disabled.
    pub async fn spawn() -> Self {
        Self::spawn_with_view_cache(None).await
    }

    /// Start both servers, caching rendered cart pages for `ttl`.
    pub async fn spawn_with_view_cache(ttl: Option<Duration>) -> Self {
        let commerce = Arc::new(FakeCommerce::default());
        let commerce_addr = serve(fake_commerce_router(commerce.clone())).await;

        let config = StorefrontConfig {
            host: "127.0.0.1".parse().expect("valid host"),
            port: 0,
            base_url: "http://localhost:3000".to_string(),
            session_secret: SecretString::from(SESSION_SECRET),
            api: ApiConfig {
                base_url: Url::parse(&format!("http://{commerce_addr}")).expect("valid url"),
            },
            view_cache_ttl: ttl,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };
        let storefront_addr = serve(routes::app(AppState::new(&config))).await;

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("build client");

        Self {
            client,
            storefront_url: format!("http://{storefront_addr}"),
            commerce,
        }
    }

    /// Absolute storefront URL for `path`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.storefront_url)
    }

    /// GET a storefront page.
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("storefront request")
    }

    /// POST a form to the storefront.
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("storefront request")
    }

    /// Sign in as the known user.
    pub async fn login(&self) -> reqwest::Response {
        self.post_form(
            "/login",
            &[("email", USER_EMAIL), ("password", USER_PASSWORD)],
        )
        .await
    }
}

/// `Location` header of a redirect response.
pub fn location(response: &reqwest::Response) -> Option<&str> {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
}
